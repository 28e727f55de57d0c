use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use tracing::{info, instrument};

use super::{
    service::WorkoutService,
    types::{CreateWorkoutRequest, UpdateWorkoutRequest, WorkoutResponse},
};
use crate::{
    auth::RequestContext,
    shared::{ApiJson, ApiPath, AppError, AppState},
};

/// HTTP handler for fetching a workout. Reads are public.
///
/// GET /workouts/{id}
#[instrument(name = "get_workout", skip(state))]
pub async fn get_workout(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<WorkoutResponse>, AppError> {
    let service = WorkoutService::new(state.workout_repository.clone());
    let workout = service.get_workout(id).await?;

    Ok(Json(WorkoutResponse { workout }))
}

/// HTTP handler for creating a workout owned by the caller
///
/// POST /workouts
#[instrument(name = "create_workout", skip(state, ctx, request))]
pub async fn create_workout(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiJson(request): ApiJson<CreateWorkoutRequest>,
) -> Result<(StatusCode, Json<WorkoutResponse>), AppError> {
    let service = WorkoutService::new(state.workout_repository.clone());
    let workout = service.create_workout(&ctx.identity, request).await?;

    info!(
        workout_id = workout.id,
        entries = workout.entries.len(),
        "Workout created successfully"
    );

    Ok((StatusCode::CREATED, Json(WorkoutResponse { workout })))
}

/// HTTP handler for updating a workout
///
/// PUT /workouts/{id}
#[instrument(name = "update_workout", skip(state, ctx, request))]
pub async fn update_workout(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateWorkoutRequest>,
) -> Result<Json<WorkoutResponse>, AppError> {
    let service = WorkoutService::new(state.workout_repository.clone());
    let workout = service.update_workout(&ctx.identity, id, request).await?;

    Ok(Json(WorkoutResponse { workout }))
}

/// HTTP handler for deleting a workout
///
/// DELETE /workouts/{id}
#[instrument(name = "delete_workout", skip(state, ctx))]
pub async fn delete_workout(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, AppError> {
    let service = WorkoutService::new(state.workout_repository.clone());
    service.delete_workout(&ctx.identity, id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::Request,
        routing::{get, post},
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    /// Router with a fixed caller in place of the authentication middleware
    fn create_app(ctx: RequestContext) -> Router {
        let app_state = AppStateBuilder::new().build();

        Router::new()
            .route("/workouts", post(create_workout))
            .route(
                "/workouts/:id",
                get(get_workout).put(update_workout).delete(delete_workout),
            )
            .layer(Extension(ctx))
            .with_state(app_state)
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn error_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    const LEG_DAY: &str = r#"{
        "title": "Leg Day",
        "entries": [{"exercise_name": "Squat", "sets": 3, "reps": 10, "order_index": 0}]
    }"#;

    #[tokio::test]
    async fn test_create_workout_handler() {
        let app = create_app(RequestContext::for_user(1, "alice"));

        let response = app
            .oneshot(json_request("POST", "/workouts", LEG_DAY))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let created: WorkoutResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(created.workout.id, 1);
        assert_eq!(created.workout.user_id, 1);
        assert_eq!(created.workout.entries[0].exercise_name, "Squat");
        assert_ne!(created.workout.entries[0].id, 0);
    }

    #[tokio::test]
    async fn test_anonymous_create_is_unauthorized() {
        let app = create_app(RequestContext::anonymous());

        let response = app
            .oneshot(json_request("POST", "/workouts", LEG_DAY))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_get_missing_workout_is_not_found() {
        let app = create_app(RequestContext::anonymous());

        let response = app
            .oneshot(json_request("GET", "/workouts/7", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() {
        let app = create_app(RequestContext::anonymous());

        let response = app
            .oneshot(json_request("GET", "/workouts/abc", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_body(response).await,
            serde_json::json!({"error": "invalid resource id"})
        );
    }

    #[tokio::test]
    async fn test_invalid_payload_is_rejected() {
        let app = create_app(RequestContext::for_user(1, "alice"));

        let response = app
            .oneshot(json_request("POST", "/workouts", r#"{"entries": 5}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error_body(response).await,
            serde_json::json!({"error": "invalid request payload"})
        );
    }
}
