use serde::Deserialize;

/// Request payload for logging in. No Debug: it carries the plaintext password.
#[derive(Deserialize)]
pub struct CreateTokenRequest {
    pub username: String,
    pub password: String,
}
