//! Portal login
//!
//! A login form is bound to one portal variant. A successful login whose role
//! does not match that variant is rejected without touching the session.

use scoreguard_core::{Navigation, Role, RouteGuard, SessionStore, LOGIN_ENTRY};
use std::sync::Arc;

use crate::api::AuthApi;
use crate::error::{ApiError, AuthFailure, Result};

pub struct LoginFlow<A: AuthApi> {
    api: Arc<A>,
    session: Arc<SessionStore>,
}

impl<A: AuthApi> LoginFlow<A> {
    pub fn new(api: Arc<A>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// Where opening the login page for `portal` leads
    pub fn open(&self, portal: Role) -> Navigation {
        RouteGuard::navigate_with(&self.session, &portal.login_path())
    }

    /// Submit credentials through the `portal` login form.
    ///
    /// On success the session is established and the portal home is returned.
    pub async fn submit(&self, portal: Role, email: &str, password: &str) -> Result<Navigation> {
        let grant = match self.api.login(email, password).await {
            Ok(grant) => grant,
            Err(ApiError::Core(e)) => return Err(ApiError::Core(e)),
            Err(e) => {
                tracing::debug!("Login rejected: {}", e);
                return Err(ApiError::AuthFailure(AuthFailure::InvalidCredentials));
            }
        };

        if grant.user.role != portal {
            tracing::warn!(
                "Login for {} portal returned {} account, discarding",
                portal,
                grant.user.role
            );
            return Err(ApiError::RoleMismatch { portal });
        }

        let session = self.session.establish(grant.user, grant.token)?;
        Ok(Navigation::Redirect(session.role().home()))
    }

    pub fn logout(&self) -> Navigation {
        self.session.clear();
        Navigation::Redirect(LOGIN_ENTRY.to_string())
    }
}
