use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::{info, instrument};

use super::{
    service::UserService,
    types::{RegisterUserRequest, UpdateProfileRequest, UserResponse},
};
use crate::{
    auth::{require_user, RequestContext},
    shared::{ApiJson, AppError, AppState},
};

/// HTTP handler for registering a new user
///
/// POST /users
/// Returns the created user without its password hash
#[instrument(name = "register_user", skip(state, request))]
pub async fn register_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    info!(username = %request.username, "Registering new user");

    let service = UserService::new(state.user_repository.clone());
    let user = service.register(request).await?;

    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

/// HTTP handler for editing the caller's own profile
///
/// PATCH /users/me
#[instrument(name = "update_profile", skip(state, ctx, request))]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(request): ApiJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let current = require_user(&ctx.identity)?;

    let service = UserService::new(state.user_repository.clone());
    let user = service.update_profile(&current.username, request).await?;

    Ok(Json(UserResponse { user }))
}
