use serde::{Deserialize, Serialize};

use super::models::UserModel;

/// Request payload for registering a new user. No Debug: it carries the plaintext password.
#[derive(Deserialize)]
pub struct RegisterUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: String,
}

/// Request payload for editing a profile. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub bio: Option<String>,
}

/// Response wrapping a user; the password hash is never part of it
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserModel,
}
