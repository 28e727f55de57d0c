use chrono::Duration;
use std::sync::Arc;

use gofit::{
    build_router,
    token::repository::InMemoryTokenRepository,
    user::repository::InMemoryUserRepository,
    workout::repository::InMemoryWorkoutRepository,
    AppState,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestApp {
    pub router: axum::Router,
    pub users: Arc<InMemoryUserRepository>,
    pub tokens: Arc<InMemoryTokenRepository>,
    pub workouts: Arc<InMemoryWorkoutRepository>,
}

pub struct TestAppBuilder {
    token_ttl: Duration,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            token_ttl: Duration::hours(24),
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn build(self) -> TestApp {
        let tokens = Arc::new(InMemoryTokenRepository::new());
        let users = Arc::new(InMemoryUserRepository::new(tokens.clone()));
        let workouts = Arc::new(InMemoryWorkoutRepository::new());

        let state = AppState::new(
            users.clone(),
            tokens.clone(),
            workouts.clone(),
            self.token_ttl,
        );

        TestApp {
            router: build_router(state),
            users,
            tokens,
            workouts,
        }
    }
}
