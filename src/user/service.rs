use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{info, instrument, warn};

use super::{
    models::UserModel,
    password::Password,
    repository::UserRepository,
    types::{RegisterUserRequest, UpdateProfileRequest},
};
use crate::shared::AppError;

const MIN_PASSWORD_LENGTH: usize = 6;
// Column widths of the users table
const MAX_USERNAME_LENGTH: usize = 50;
const MAX_EMAIL_LENGTH: usize = 255;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

fn validate_email(email: &str) -> Result<(), AppError> {
    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(AppError::Validation(format!(
            "email must be at most {} characters",
            MAX_EMAIL_LENGTH
        )));
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(AppError::Validation("invalid email format".to_string()));
    }
    Ok(())
}

fn validate_registration(request: &RegisterUserRequest) -> Result<(), AppError> {
    if request.username.trim().is_empty() || request.email.is_empty() || request.password.is_empty()
    {
        return Err(AppError::Validation("missing required fields".to_string()));
    }
    if request.username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(AppError::Validation(format!(
            "username must be at most {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    validate_email(&request.email)?;
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Hashes off the async executor; argon2 is deliberately slow
async fn hash_password(plaintext: String) -> Result<Password, AppError> {
    let hashed = tokio::task::spawn_blocking(move || {
        let mut password = Password::default();
        password.set(&plaintext).map(|_| password)
    })
    .await
    .map_err(|e| {
        warn!(error = %e, "Password hashing task failed");
        AppError::Internal
    })??;

    Ok(hashed)
}

async fn verify_password(password: Password, candidate: String) -> Result<bool, AppError> {
    let matched = tokio::task::spawn_blocking(move || password.matches(&candidate))
        .await
        .map_err(|e| {
            warn!(error = %e, "Password verification task failed");
            AppError::Internal
        })?;

    Ok(matched?)
}

/// Service for registration, credential checks and profile edits
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Validates the request, hashes the password and stores the new user
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: RegisterUserRequest) -> Result<UserModel, AppError> {
        validate_registration(&request)?;

        let mut user = UserModel::new(request.username, request.email, request.bio);
        user.password = hash_password(request.password).await?;

        let created = self.repository.create_user(&user).await?;

        info!(user_id = created.id, "User registered");
        Ok(created)
    }

    /// Returns the user when the password matches.
    ///
    /// Unknown usernames and wrong passwords both come back as `None` so callers
    /// cannot tell them apart; only infrastructure failures are errors.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserModel>, AppError> {
        let user = match self.repository.get_user_by_username(username).await? {
            Some(user) => user,
            None => {
                warn!(username = %username, "Login attempt for unknown user");
                return Ok(None);
            }
        };

        if verify_password(user.password.clone(), password.to_string()).await? {
            Ok(Some(user))
        } else {
            warn!(user_id = user.id, "Login attempt with wrong password");
            Ok(None)
        }
    }

    /// Applies the present fields of `request` to the user's profile
    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        username: &str,
        request: UpdateProfileRequest,
    ) -> Result<UserModel, AppError> {
        let mut user = self
            .repository
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(email) = request.email {
            validate_email(&email)?;
            user.email = email;
        }
        if let Some(bio) = request.bio {
            user.bio = bio;
        }

        let updated = self.repository.update_user(&user).await?;

        info!(user_id = updated.id, "Profile updated");
        Ok(updated)
    }
}
