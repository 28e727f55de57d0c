// Library crate for the workout tracking API
// This file exposes the public API for the binary and integration tests

pub mod auth;
pub mod config;
pub mod routes;
pub mod shared;
pub mod token;
pub mod user;
pub mod workout;

// Re-export commonly used types for easier access in tests
pub use auth::{Identity, RequestContext};
pub use config::Config;
pub use routes::build_router;
pub use shared::{AppError, AppState};
