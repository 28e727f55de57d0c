use argon2::{
    password_hash::{self, rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    Hashing(String),

    #[error("Failed to verify password: {0}")]
    Verification(String),
}

/// A user's password as stored: only the salted argon2 hash in PHC string form.
/// The plaintext is only ever borrowed for the duration of `set` / `matches`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

impl Password {
    /// Wraps a hash loaded from storage
    pub fn from_hash(hash: String) -> Self {
        Self { hash }
    }

    /// Hashes `plaintext` with a fresh salt, replacing any previous hash
    pub fn set(&mut self, plaintext: &str) -> Result<(), PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| {
                warn!(error = %e, "Password hashing failed");
                PasswordError::Hashing(e.to_string())
            })?;

        self.hash = hash.to_string();
        Ok(())
    }

    /// Checks a candidate against the stored hash.
    ///
    /// A wrong password is `Ok(false)`; an error means the stored hash itself is unusable.
    pub fn matches(&self, candidate: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(&self.hash).map_err(|e| {
            warn!(error = %e, "Stored password hash is malformed");
            PasswordError::Verification(e.to_string())
        })?;

        match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => {
                debug!("Password candidate did not match");
                Ok(false)
            }
            Err(e) => {
                warn!(error = %e, "Password verification failed");
                Err(PasswordError::Verification(e.to_string()))
            }
        }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn is_set(&self) -> bool {
        !self.hash.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}
