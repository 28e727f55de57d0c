use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    generator::{generate_token, hash_token},
    models::IssuedToken,
    repository::TokenRepository,
};
use crate::{
    shared::AppError,
    user::{models::UserModel, repository::UserRepository},
};

/// Service for issuing, resolving and revoking bearer tokens
pub struct TokenService {
    tokens: Arc<dyn TokenRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
}

impl TokenService {
    pub fn new(
        tokens: Arc<dyn TokenRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
    ) -> Self {
        Self { tokens, users }
    }

    /// Mints a token, stores its digest and hands back the plaintext.
    /// The plaintext cannot be recovered from storage afterwards.
    #[instrument(skip(self, ttl))]
    pub async fn issue_token(
        &self,
        user_id: i64,
        ttl: Duration,
        scope: &str,
    ) -> Result<IssuedToken, AppError> {
        let issued = generate_token(user_id, ttl, scope)?;
        self.tokens.insert_token(&issued.record).await?;

        info!(user_id, scope = %scope, expiry = %issued.expiry, "Token issued");
        Ok(issued)
    }

    /// Resolves a presented token to its owner.
    /// Unknown and expired tokens are both `None`.
    #[instrument(skip(self, plaintext))]
    pub async fn lookup_user_by_token(
        &self,
        scope: &str,
        plaintext: &str,
    ) -> Result<Option<UserModel>, AppError> {
        if scope.trim().is_empty() || plaintext.is_empty() {
            return Err(AppError::Validation(
                "token scope and value are required".to_string(),
            ));
        }

        let user = self
            .users
            .get_user_for_token(scope, &hash_token(plaintext))
            .await?;

        match &user {
            Some(user) => debug!(user_id = user.id, "Token resolved"),
            None => debug!("Token did not resolve to a user"),
        }
        Ok(user)
    }

    /// Drops every token the user holds in `scope`. Succeeds when there were none.
    #[instrument(skip(self))]
    pub async fn revoke_all(&self, scope: &str, user_id: i64) -> Result<u64, AppError> {
        if scope.trim().is_empty() {
            return Err(AppError::Validation("token scope must not be empty".to_string()));
        }

        let removed = self.tokens.delete_all_for_user(scope, user_id).await?;

        info!(user_id, scope = %scope, tokens_removed = removed, "Tokens revoked");
        Ok(removed)
    }
}
