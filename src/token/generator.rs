use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use super::models::{IssuedToken, TokenModel};
use crate::shared::AppError;

/// Bytes of randomness behind each token
const TOKEN_BYTES: usize = 32;

/// Digest stored in place of a token plaintext
pub fn hash_token(plaintext: &str) -> Vec<u8> {
    Sha256::digest(plaintext.as_bytes()).to_vec()
}

/// Mints a new token for `user_id` valid for `ttl` within `scope`.
/// Input is checked before any randomness is drawn or anything is stored.
#[instrument(skip(ttl))]
pub fn generate_token(user_id: i64, ttl: Duration, scope: &str) -> Result<IssuedToken, AppError> {
    if scope.trim().is_empty() {
        warn!("Rejected token request with empty scope");
        return Err(AppError::Validation("token scope must not be empty".to_string()));
    }
    if ttl <= Duration::zero() {
        warn!(ttl_seconds = ttl.num_seconds(), "Rejected token request with non-positive ttl");
        return Err(AppError::Validation(
            "token time to live must be positive".to_string(),
        ));
    }

    let expiry = Utc::now().checked_add_signed(ttl).ok_or_else(|| {
        warn!(ttl_seconds = ttl.num_seconds(), "Rejected token request with out of range ttl");
        AppError::Validation("token time to live is too large".to_string())
    })?;

    let bytes: [u8; TOKEN_BYTES] = rand::random();
    let plaintext = hex::encode(bytes);

    debug!(expiry = %expiry, "Generated token material");

    Ok(IssuedToken {
        record: TokenModel {
            hash: hash_token(&plaintext),
            user_id,
            expiry,
            scope: scope.to_string(),
        },
        plaintext,
        expiry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::models::SCOPE_AUTHENTICATION;
    use rstest::rstest;

    #[test]
    fn test_generate_token() {
        let before = Utc::now();
        let token = generate_token(7, Duration::hours(24), SCOPE_AUTHENTICATION).unwrap();

        assert_eq!(token.plaintext.len(), TOKEN_BYTES * 2);
        assert_eq!(token.record.user_id, 7);
        assert_eq!(token.record.scope, SCOPE_AUTHENTICATION);
        assert_eq!(token.record.hash, hash_token(&token.plaintext));
        assert_eq!(token.record.expiry, token.expiry);
        assert!(token.expiry >= before + Duration::hours(24));
        assert!(token.expiry <= Utc::now() + Duration::hours(24));
    }

    #[test]
    fn test_stored_hash_does_not_contain_plaintext() {
        let token = generate_token(1, Duration::minutes(5), SCOPE_AUTHENTICATION).unwrap();

        assert_eq!(token.record.hash.len(), 32);
        assert_ne!(token.record.hash, token.plaintext.as_bytes());
    }

    #[test]
    fn test_tokens_are_unique() {
        let first = generate_token(1, Duration::minutes(5), SCOPE_AUTHENTICATION).unwrap();
        let second = generate_token(1, Duration::minutes(5), SCOPE_AUTHENTICATION).unwrap();

        assert_ne!(first.plaintext, second.plaintext);
        assert_ne!(first.record.hash, second.record.hash);
    }

    #[rstest]
    #[case("", Duration::hours(1))]
    #[case("   ", Duration::hours(1))]
    #[case(SCOPE_AUTHENTICATION, Duration::zero())]
    #[case(SCOPE_AUTHENTICATION, Duration::seconds(-30))]
    fn test_rejects_malformed_input(#[case] scope: &str, #[case] ttl: Duration) {
        let result = generate_token(1, ttl, scope);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_expiry_past_calendar_range_is_rejected() {
        let result = generate_token(1, Duration::hours(100_000_000_000), SCOPE_AUTHENTICATION);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
