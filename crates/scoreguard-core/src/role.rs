//! Portal roles and the user record issued by the auth endpoint

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three portals a session may be scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Bank,
    Admin,
}

impl Role {
    /// All roles, in portal order
    pub const ALL: [Role; 3] = [Role::Citizen, Role::Bank, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Bank => "bank",
            Role::Admin => "admin",
        }
    }

    /// Path of this role's portal view
    pub fn home(&self) -> String {
        format!("/{}", self.as_str())
    }

    /// Path of this role's login form
    pub fn login_path(&self) -> String {
        format!("/login/{}", self.as_str())
    }

    /// Human title of the portal
    pub fn portal_title(&self) -> &'static str {
        match self {
            Role::Citizen => "Citizen Portal",
            Role::Bank => "Bank Dashboard",
            Role::Admin => "Admin Console",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "citizen" => Ok(Role::Citizen),
            "bank" => Ok(Role::Bank),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {:?}", other)),
        }
    }
}

/// Authenticated user as issued by `/auth/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque identifier; the service sends either a string or a number
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub role: Role,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: None,
            role,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name if present, email otherwise
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Uint(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("Citizen".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_paths() {
        assert_eq!(Role::Bank.home(), "/bank");
        assert_eq!(Role::Admin.login_path(), "/login/admin");
    }

    #[test]
    fn test_user_accepts_numeric_id() {
        let user: User =
            serde_json::from_str(r#"{"id": 42, "email": "a@b.c", "role": "bank"}"#).unwrap();
        assert_eq!(user.id, "42");
        assert_eq!(user.role, Role::Bank);
        assert!(user.name.is_none());
        assert_eq!(user.display_name(), "a@b.c");
    }

    #[test]
    fn test_user_rejects_unknown_role() {
        let parsed =
            serde_json::from_str::<User>(r#"{"id": "1", "email": "a@b.c", "role": "root"}"#);
        assert!(parsed.is_err());

        let empty = serde_json::from_str::<User>(r#"{"id": "1", "email": "a@b.c", "role": ""}"#);
        assert!(empty.is_err());
    }
}
