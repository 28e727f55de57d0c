use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, VARY},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument, warn};

use super::identity::{CurrentUser, Identity, RequestContext};
use crate::{
    shared::{AppError, AppState},
    token::{models::SCOPE_AUTHENTICATION, service::TokenService},
};

/// Extracts the token from an `Authorization: Bearer <token>` value.
/// Anything other than exactly two space-separated parts is rejected.
fn parse_bearer(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

async fn resolve_identity(state: &AppState, headers: &HeaderMap) -> Result<Identity, AppError> {
    let header = match headers.get(AUTHORIZATION) {
        Some(header) => header,
        None => return Ok(Identity::Anonymous),
    };

    let token = header.to_str().ok().and_then(parse_bearer).ok_or_else(|| {
        warn!("Invalid Authorization header format (expected Bearer token)");
        AppError::Unauthorized("Invalid authorization header format".to_string())
    })?;

    let service = TokenService::new(state.token_repository.clone(), state.user_repository.clone());
    let user = service
        .lookup_user_by_token(SCOPE_AUTHENTICATION, token)
        .await?
        .ok_or_else(|| {
            warn!("Bearer token is unknown or expired");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;

    Ok(Identity::User(CurrentUser {
        id: user.id,
        username: user.username,
    }))
}

/// Bearer authentication middleware - resolves the caller into a `RequestContext`.
/// Requests without a credential continue as `Identity::Anonymous`; malformed,
/// unknown or expired credentials are rejected with 401 before reaching handlers.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), auth::authenticate))
/// Handlers then extract Extension(ctx): Extension<RequestContext>.
#[instrument(skip(state, req, next), fields(uri = %req.uri()))]
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let mut response = match resolve_identity(&state, req.headers()).await {
        Ok(identity) => {
            debug!(user_id = ?identity.user_id(), "Request identity resolved");
            req.extensions_mut().insert(RequestContext { identity });
            next.run(req).await
        }
        Err(e) => e.into_response(),
    };

    response
        .headers_mut()
        .append(VARY, HeaderValue::from_static("Authorization"));
    response
}
