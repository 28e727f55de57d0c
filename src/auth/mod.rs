// Public API - what other modules can use
pub use gate::{authorize_owner, require_user};
pub use identity::{CurrentUser, Identity, RequestContext};
pub use middleware::authenticate;

mod gate;
pub mod identity;
mod middleware;
