use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{auth, shared::AppState, token, user, workout};

/// Builds the full API router. Every route runs behind bearer authentication,
/// which lets anonymous callers through for handlers to gate.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/users", post(user::register_user))
        .route("/users/me", patch(user::update_profile))
        .route(
            "/tokens/authentication",
            post(token::create_authentication_token).delete(token::revoke_authentication_tokens),
        )
        .route("/workouts", post(workout::create_workout))
        .route(
            "/workouts/:id",
            get(workout::get_workout)
                .put(workout::update_workout)
                .delete(workout::delete_workout),
        )
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::authenticate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn health_check() -> &'static str {
    "OK"
}
