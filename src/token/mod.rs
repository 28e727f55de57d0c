// Public API - what other modules can use
pub use handlers::{create_authentication_token, revoke_authentication_tokens};
pub use models::{IssuedToken, TokenModel, SCOPE_AUTHENTICATION};
pub use service::TokenService;

// Internal modules
pub mod generator;
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
