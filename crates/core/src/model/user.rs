use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::UserId;

/// The only authorization axis the client looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public user profile as returned by the auth endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: Role,
}

impl User {
    /// Full name when present and non-blank, otherwise the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.email)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_backend_profile() {
        let user: User = serde_json::from_str(
            r#"{"id":"u1","email":"ada@example.com","full_name":null,"role":"student"}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.display_name(), "ada@example.com");
    }

    #[test]
    fn display_name_prefers_full_name() {
        let user = User {
            id: UserId::new("u2"),
            email: "grace@example.com".into(),
            full_name: Some("Grace Hopper".into()),
            role: Role::Admin,
        };
        assert_eq!(user.display_name(), "Grace Hopper");
        assert!(user.is_admin());
    }
}
