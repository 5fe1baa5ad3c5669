//! User entity - operators and administrators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::UserId;

/// Reserved username of the bootstrap administrator
pub const BOOTSTRAP_USERNAME: &str = "admin";

/// A person who can log in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,

    /// Unique login name (case-sensitive)
    pub username: String,

    /// bcrypt hash; never serialized into command output
    #[serde(skip)]
    pub password_hash: String,

    pub full_name: String,

    #[serde(default)]
    pub is_admin: bool,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new, unsaved user with an already-hashed password
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        full_name: impl Into<String>,
        is_admin: bool,
    ) -> Self {
        Self {
            id: None,
            username: username.into(),
            password_hash: password_hash.into(),
            full_name: full_name.into(),
            is_admin,
            created_at: Utc::now(),
        }
    }

    pub fn role_label(&self) -> &'static str {
        if self.is_admin {
            "admin"
        } else {
            "operator"
        }
    }
}

impl Entity for User {
    type Id = UserId;
    const KIND: &'static str = "user";

    fn id(&self) -> Option<UserId> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("op1", "$2b$04$secret", "Operator One", false);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("Operator One"));
    }

    #[test]
    fn test_new_user_is_unsaved() {
        let user = User::new("op1", "h", "Operator One", true);
        assert!(user.is_new());
        assert_eq!(user.role_label(), "admin");
    }
}
