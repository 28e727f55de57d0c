use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::TokenModel;
use crate::shared::AppError;

/// Trait for token repository operations.
/// Lookups by token go through `UserRepository::get_user_for_token`, which joins to the owner.
#[async_trait]
pub trait TokenRepository {
    async fn insert_token(&self, token: &TokenModel) -> Result<(), AppError>;
    /// Removes every token of `user_id` in `scope`, returning how many went away
    async fn delete_all_for_user(&self, scope: &str, user_id: i64) -> Result<u64, AppError>;
}

/// In-memory implementation of TokenRepository for development and testing
pub struct InMemoryTokenRepository {
    tokens: Mutex<HashMap<Vec<u8>, TokenModel>>,
}

impl Default for InMemoryTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Resolves a digest to its owner if the token is in `scope` and still valid at `now`
    pub fn active_user_id(&self, scope: &str, hash: &[u8], now: DateTime<Utc>) -> Option<i64> {
        let tokens = self.tokens.lock().unwrap();
        tokens
            .get(hash)
            .filter(|token| token.scope == scope && !token.is_expired_at(now))
            .map(|token| token.user_id)
    }

    /// Returns the current number of stored tokens, expired ones included
    pub fn token_count(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    #[instrument(skip(self, token))]
    async fn insert_token(&self, token: &TokenModel) -> Result<(), AppError> {
        debug!(user_id = token.user_id, scope = %token.scope, "Storing token in memory");

        let mut tokens = self.tokens.lock().unwrap();
        if tokens.contains_key(&token.hash) {
            warn!(user_id = token.user_id, "Token digest already exists in memory");
            return Err(AppError::DatabaseError("Token already exists".to_string()));
        }
        tokens.insert(token.hash.clone(), token.clone());

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all_for_user(&self, scope: &str, user_id: i64) -> Result<u64, AppError> {
        let mut tokens = self.tokens.lock().unwrap();
        let initial_count = tokens.len();

        tokens.retain(|_, token| !(token.scope == scope && token.user_id == user_id));

        let removed = (initial_count - tokens.len()) as u64;
        debug!(tokens_removed = removed, "Tokens revoked from memory");
        Ok(removed)
    }
}

/// PostgreSQL implementation of token repository
pub struct PostgresTokenRepository {
    pool: PgPool,
}

impl PostgresTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for PostgresTokenRepository {
    #[instrument(skip(self, token))]
    async fn insert_token(&self, token: &TokenModel) -> Result<(), AppError> {
        debug!(user_id = token.user_id, scope = %token.scope, "Storing token in database");

        sqlx::query("INSERT INTO tokens (hash, user_id, expiry, scope) VALUES ($1, $2, $3, $4)")
            .bind(&token.hash)
            .bind(token.user_id)
            .bind(token.expiry)
            .bind(&token.scope)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id = token.user_id, "Failed to store token in database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_all_for_user(&self, scope: &str, user_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM tokens WHERE scope = $1 AND user_id = $2")
            .bind(scope)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, user_id, "Failed to revoke tokens in database");
                AppError::DatabaseError(e.to_string())
            })?;

        debug!(tokens_removed = result.rows_affected(), "Tokens revoked from database");
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::models::SCOPE_AUTHENTICATION;
    use chrono::Duration;

    mod helpers {
        use super::*;

        pub fn create_test_token(hash: u8, user_id: i64, scope: &str, ttl: Duration) -> TokenModel {
            TokenModel {
                hash: vec![hash; 32],
                user_id,
                expiry: Utc::now() + ttl,
                scope: scope.to_string(),
            }
        }
    }

    use helpers::*;

    #[tokio::test]
    async fn test_insert_and_resolve_token() {
        let repo = InMemoryTokenRepository::new();
        let token = create_test_token(1, 10, SCOPE_AUTHENTICATION, Duration::hours(1));

        repo.insert_token(&token).await.unwrap();

        let owner = repo.active_user_id(SCOPE_AUTHENTICATION, &token.hash, Utc::now());
        assert_eq!(owner, Some(10));
    }

    #[tokio::test]
    async fn test_expired_token_does_not_resolve() {
        let repo = InMemoryTokenRepository::new();
        let token = create_test_token(1, 10, SCOPE_AUTHENTICATION, Duration::seconds(-1));

        repo.insert_token(&token).await.unwrap();

        // Still stored, but treated as absent
        assert_eq!(repo.token_count(), 1);
        assert_eq!(
            repo.active_user_id(SCOPE_AUTHENTICATION, &token.hash, Utc::now()),
            None
        );
    }

    #[tokio::test]
    async fn test_token_does_not_resolve_in_other_scope() {
        let repo = InMemoryTokenRepository::new();
        let token = create_test_token(1, 10, SCOPE_AUTHENTICATION, Duration::hours(1));

        repo.insert_token(&token).await.unwrap();

        assert_eq!(repo.active_user_id("password-reset", &token.hash, Utc::now()), None);
    }

    #[tokio::test]
    async fn test_duplicate_digest_rejected() {
        let repo = InMemoryTokenRepository::new();
        let token = create_test_token(1, 10, SCOPE_AUTHENTICATION, Duration::hours(1));

        repo.insert_token(&token).await.unwrap();
        let result = repo.insert_token(&token).await;

        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn test_delete_all_for_user_only_touches_scope_and_user() {
        let repo = InMemoryTokenRepository::new();
        repo.insert_token(&create_test_token(1, 10, SCOPE_AUTHENTICATION, Duration::hours(1)))
            .await
            .unwrap();
        repo.insert_token(&create_test_token(2, 10, SCOPE_AUTHENTICATION, Duration::hours(1)))
            .await
            .unwrap();
        repo.insert_token(&create_test_token(3, 10, "password-reset", Duration::hours(1)))
            .await
            .unwrap();
        repo.insert_token(&create_test_token(4, 20, SCOPE_AUTHENTICATION, Duration::hours(1)))
            .await
            .unwrap();

        let removed = repo
            .delete_all_for_user(SCOPE_AUTHENTICATION, 10)
            .await
            .unwrap();

        assert_eq!(removed, 2);
        assert_eq!(repo.token_count(), 2);
        assert_eq!(
            repo.active_user_id(SCOPE_AUTHENTICATION, &[4; 32], Utc::now()),
            Some(20)
        );
    }

    #[tokio::test]
    async fn test_delete_all_for_user_is_idempotent() {
        let repo = InMemoryTokenRepository::new();

        let removed = repo
            .delete_all_for_user(SCOPE_AUTHENTICATION, 99)
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }
}
