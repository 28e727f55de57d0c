use chrono::{DateTime, Utc};
use serde::Serialize;

use super::password::Password;

/// Database model for users table
#[derive(Debug, Clone, Serialize)]
pub struct UserModel {
    pub id: i64, // Assigned by the store on insert
    pub username: String,
    pub email: String,
    #[serde(skip)]
    pub password: Password,
    pub bio: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserModel {
    /// Creates an unsaved user; id and timestamps are overwritten by the store
    pub fn new(username: String, email: String, bio: String) -> Self {
        let now = Utc::now();

        Self {
            id: 0,
            username,
            email,
            password: Password::default(),
            bio,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_is_never_serialized() {
        let mut user = UserModel::new(
            "alice".to_string(),
            "alice@x.com".to_string(),
            String::new(),
        );
        user.password = Password::from_hash("$argon2id$v=19$fake".to_string());

        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("alice@x.com"));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
    }
}
