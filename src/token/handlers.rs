use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, instrument, warn};

use super::{
    models::{IssuedToken, SCOPE_AUTHENTICATION},
    service::TokenService,
    types::CreateTokenRequest,
};
use crate::{
    auth::{require_user, RequestContext},
    shared::{ApiJson, AppError, AppState},
    user::service::UserService,
};

/// HTTP handler for logging in
///
/// POST /tokens/authentication
/// Returns the token plaintext and its expiry
#[instrument(name = "create_authentication_token", skip(state, request))]
pub async fn create_authentication_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateTokenRequest>,
) -> Result<(StatusCode, Json<IssuedToken>), AppError> {
    info!(username = %request.username, "Login attempt");

    let users = UserService::new(state.user_repository.clone());
    let user = users
        .verify_credentials(&request.username, &request.password)
        .await?
        .ok_or_else(|| {
            warn!(username = %request.username, "Login rejected");
            AppError::Unauthorized("invalid credentials".to_string())
        })?;

    let tokens = TokenService::new(state.token_repository.clone(), state.user_repository.clone());
    let issued = tokens
        .issue_token(user.id, state.token_ttl, SCOPE_AUTHENTICATION)
        .await?;

    Ok((StatusCode::CREATED, Json(issued)))
}

/// HTTP handler for logging out everywhere
///
/// DELETE /tokens/authentication
/// Revokes all authentication tokens of the caller
#[instrument(name = "revoke_authentication_tokens", skip(state, ctx))]
pub async fn revoke_authentication_tokens(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<StatusCode, AppError> {
    let user = require_user(&ctx.identity)?;

    let tokens = TokenService::new(state.token_repository.clone(), state.user_repository.clone());
    tokens.revoke_all(SCOPE_AUTHENTICATION, user.id).await?;

    Ok(StatusCode::NO_CONTENT)
}
