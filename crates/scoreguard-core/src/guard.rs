//! Role-scoped navigation guard
//!
//! Every navigation is run through [`RouteGuard`]. The decision depends only
//! on the session passed in and the destination, so it is recomputed each
//! time rather than cached: a logout between two navigations must be seen by
//! the second one.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::role::Role;
use crate::session::{Session, SessionStore};

/// Path of the login entry point
pub const LOGIN_ENTRY: &str = "/login";

/// Outcome of the authorization check for a protected view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum GuardState {
    /// No session; go to the login entry point
    Unauthenticated,
    /// Session for another portal; go to the session's own portal
    WrongRole { actual: Role },
    /// Render the destination
    Authorized,
}

impl GuardState {
    /// Navigation this state resolves to for a given destination
    pub fn action(&self, destination: &str) -> Navigation {
        match self {
            GuardState::Unauthenticated => Navigation::Redirect(LOGIN_ENTRY.to_string()),
            GuardState::WrongRole { actual } => Navigation::Redirect(actual.home()),
            GuardState::Authorized => Navigation::Render(destination.to_string()),
        }
    }
}

/// What the shell should do with a navigation attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "path")]
pub enum Navigation {
    Render(String),
    Redirect(String),
}

impl Navigation {
    pub fn path(&self) -> &str {
        match self {
            Navigation::Render(path) | Navigation::Redirect(path) => path,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Navigation::Redirect(_))
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Navigation::Render(path) => write!(f, "render {}", path),
            Navigation::Redirect(path) => write!(f, "redirect -> {}", path),
        }
    }
}

/// Client-side route table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/login` or `/login/{role}`; `None` for the bare entry point
    Login(Option<Role>),
    /// `/{role}`
    Portal(Role),
    /// Anything else
    Fallback,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["login"] => Route::Login(None),
            ["login", role] => match role.parse::<Role>() {
                Ok(role) => Route::Login(Some(role)),
                Err(_) => Route::Fallback,
            },
            [role] => match role.parse::<Role>() {
                Ok(role) => Route::Portal(role),
                Err(_) => Route::Fallback,
            },
            _ => Route::Fallback,
        }
    }

    /// Role a session must hold to render this route
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::Portal(role) => Some(*role),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Login(None) => LOGIN_ENTRY.to_string(),
            Route::Login(Some(role)) => role.login_path(),
            Route::Portal(role) => role.home(),
            Route::Fallback => "*".to_string(),
        }
    }
}

/// Stateless authorization check
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    /// The three-state check for a destination requiring `required`
    pub fn evaluate(session: Option<&Session>, required: Option<Role>) -> GuardState {
        match (session, required) {
            (None, _) => GuardState::Unauthenticated,
            (Some(session), Some(required)) if session.role() != required => {
                GuardState::WrongRole {
                    actual: session.role(),
                }
            }
            (Some(_), _) => GuardState::Authorized,
        }
    }

    /// Resolve a navigation to `path` against the route table
    pub fn navigate(session: Option<&Session>, path: &str) -> Navigation {
        let route = Route::parse(path);
        let decision = match route {
            Route::Portal(role) => Self::evaluate(session, Some(role)).action(&route.path()),
            Route::Login(portal) => match (session, portal) {
                // An authenticated user never sees a login form.
                (Some(session), _) => Navigation::Redirect(session.role().home()),
                (None, None) => Navigation::Redirect(Role::Citizen.login_path()),
                (None, Some(role)) => Navigation::Render(role.login_path()),
            },
            Route::Fallback => match session {
                Some(session) => Navigation::Redirect(session.role().home()),
                None => Navigation::Redirect(LOGIN_ENTRY.to_string()),
            },
        };

        tracing::debug!("navigate {} -> {}", path, decision);
        decision
    }

    /// Follow redirects until a view renders
    pub fn resolve(session: Option<&Session>, path: &str) -> String {
        let mut current = path.to_string();
        // The table never chains more than three hops (`*` -> /login -> /login/citizen).
        for _ in 0..4 {
            match Self::navigate(session, &current) {
                Navigation::Render(path) => return path,
                Navigation::Redirect(next) => current = next,
            }
        }
        current
    }

    /// Navigate using whatever session the store holds right now
    pub fn navigate_with(store: &SessionStore, path: &str) -> Navigation {
        Self::navigate(store.current().as_ref(), path)
    }
}
