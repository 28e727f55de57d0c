// Public API - what other modules can use
pub use handlers::{create_workout, delete_workout, get_workout, update_workout};
pub use models::{WorkoutEntryModel, WorkoutModel};
pub use service::WorkoutService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
