//! Test action helpers - one HTTP call per helper
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestApp;

/// Status and decoded JSON body (Null for empty bodies)
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
    pub vary: Option<String>,
}

impl TestApp {
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> ApiResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let vary = response
            .headers()
            .get("vary")
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        ApiResponse { status, body, vary }
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> ApiResponse {
        self.send(
            "POST",
            "/users",
            None,
            Some(json!({"username": username, "email": email, "password": password})),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> ApiResponse {
        self.send(
            "POST",
            "/tokens/authentication",
            None,
            Some(json!({"username": username, "password": password})),
        )
        .await
    }

    /// Registers and logs in, returning the bearer token
    pub async fn register_and_login(&self, username: &str) -> String {
        let registered = self
            .register(username, &format!("{}@x.com", username), "secret1")
            .await;
        assert_eq!(registered.status, StatusCode::CREATED);

        let login = self.login(username, "secret1").await;
        assert_eq!(login.status, StatusCode::CREATED);
        login.body["token"].as_str().unwrap().to_string()
    }

    pub async fn logout(&self, token: &str) -> ApiResponse {
        self.send("DELETE", "/tokens/authentication", Some(token), None)
            .await
    }

    pub async fn create_workout(&self, token: Option<&str>, workout: Value) -> ApiResponse {
        self.send("POST", "/workouts", token, Some(workout)).await
    }

    pub async fn get_workout(&self, token: Option<&str>, id: i64) -> ApiResponse {
        self.send("GET", &format!("/workouts/{}", id), token, None)
            .await
    }

    pub async fn update_workout(&self, token: Option<&str>, id: i64, patch: Value) -> ApiResponse {
        self.send("PUT", &format!("/workouts/{}", id), token, Some(patch))
            .await
    }

    pub async fn delete_workout(&self, token: Option<&str>, id: i64) -> ApiResponse {
        self.send("DELETE", &format!("/workouts/{}", id), token, None)
            .await
    }
}

pub fn leg_day() -> Value {
    json!({
        "title": "Leg Day",
        "description": "Squats and friends",
        "duration_minutes": 45,
        "calories_burned": 400,
        "entries": [
            {"exercise_name": "Squat", "sets": 3, "reps": 10, "order_index": 0}
        ]
    })
}
