use tracing::warn;

use super::identity::{CurrentUser, Identity};
use crate::shared::AppError;

/// Allows only identified callers through
pub fn require_user(identity: &Identity) -> Result<&CurrentUser, AppError> {
    match identity {
        Identity::User(user) => Ok(user),
        Identity::Anonymous => {
            warn!("Anonymous caller attempted an authenticated action");
            Err(AppError::Unauthorized(
                "You must be authenticated to access this resource".to_string(),
            ))
        }
    }
}

/// Allows a mutation only when the caller owns the resource.
/// Anonymous callers are turned away before ownership is looked at.
pub fn authorize_owner(identity: &Identity, owner_id: i64) -> Result<&CurrentUser, AppError> {
    let user = require_user(identity)?;

    if user.id != owner_id {
        warn!(user_id = user.id, owner_id, "Caller does not own the resource");
        return Err(AppError::Forbidden(
            "You do not have permission to modify this resource".to_string(),
        ));
    }

    Ok(user)
}
