// Public API - what other modules can use
pub use handlers::{register_user, update_profile};
pub use models::UserModel;
pub use password::{Password, PasswordError};
pub use service::UserService;

// Internal modules
mod handlers;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod types;
