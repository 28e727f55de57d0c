use chrono::{DateTime, Utc};
use serde::Serialize;

/// Scope for tokens that authenticate API requests
pub const SCOPE_AUTHENTICATION: &str = "authentication";

/// Database model for tokens table. Only the digest of the token is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenModel {
    pub hash: Vec<u8>, // SHA-256 of the plaintext
    pub user_id: i64,
    pub expiry: DateTime<Utc>,
    pub scope: String,
}

impl TokenModel {
    /// Checks if the token is past its deadline
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry <= now
    }
}

/// A freshly minted token. The plaintext exists only here and is handed to
/// the client once; storage only ever sees `record`.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    #[serde(rename = "token")]
    pub plaintext: String,
    pub expiry: DateTime<Utc>,
    #[serde(skip)]
    pub record: TokenModel,
}
