use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument, warn};

use super::{models::UserModel, password::Password};
use crate::shared::AppError;
use crate::token::repository::InMemoryTokenRepository;

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    /// Inserts the user and returns it with the store-assigned id and timestamps
    async fn create_user(&self, user: &UserModel) -> Result<UserModel, AppError>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError>;
    /// Rewrites email, password hash and bio of the user with the same username.
    /// Id, username and created_at never change.
    async fn update_user(&self, user: &UserModel) -> Result<UserModel, AppError>;
    /// Resolves a token digest in `scope` to its owner, ignoring expired tokens
    async fn get_user_for_token(
        &self,
        scope: &str,
        token_hash: &[u8],
    ) -> Result<Option<UserModel>, AppError>;
}

struct UserTable {
    users: BTreeMap<i64, UserModel>,
    next_id: i64,
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    table: Mutex<UserTable>,
    tokens: Arc<InMemoryTokenRepository>,
}

impl InMemoryUserRepository {
    /// Creates an empty repository that resolves bearer tokens through `tokens`
    pub fn new(tokens: Arc<InMemoryTokenRepository>) -> Self {
        Self {
            table: Mutex::new(UserTable {
                users: BTreeMap::new(),
                next_id: 1,
            }),
            tokens,
        }
    }

    /// Returns the current number of users in the repository
    pub fn user_count(&self) -> usize {
        self.table.lock().unwrap().users.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<UserModel, AppError> {
        debug!(username = %user.username, "Creating user in memory");

        let mut table = self.table.lock().unwrap();
        if table.users.values().any(|u| u.username == user.username) {
            warn!(username = %user.username, "Username already taken in memory");
            return Err(AppError::Conflict("username already taken".to_string()));
        }

        let now = Utc::now();
        let mut created = user.clone();
        created.id = table.next_id;
        created.created_at = now;
        created.updated_at = now;

        table.next_id += 1;
        table.users.insert(created.id, created.clone());

        debug!(user_id = created.id, "User created successfully in memory");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let table = self.table.lock().unwrap();
        let user = table
            .users
            .values()
            .find(|u| u.username == username)
            .cloned();

        if user.is_none() {
            debug!(username = %username, "User not found in memory");
        }
        Ok(user)
    }

    #[instrument(skip(self, user))]
    async fn update_user(&self, user: &UserModel) -> Result<UserModel, AppError> {
        debug!(username = %user.username, "Updating user in memory");

        let mut table = self.table.lock().unwrap();
        let existing = match table.users.values_mut().find(|u| u.username == user.username) {
            Some(existing) => existing,
            None => {
                warn!(username = %user.username, "User not found for update in memory");
                return Err(AppError::NotFound("User not found".to_string()));
            }
        };

        existing.email = user.email.clone();
        existing.password = user.password.clone();
        existing.bio = user.bio.clone();
        existing.updated_at = Utc::now();

        Ok(existing.clone())
    }

    #[instrument(skip(self, token_hash))]
    async fn get_user_for_token(
        &self,
        scope: &str,
        token_hash: &[u8],
    ) -> Result<Option<UserModel>, AppError> {
        let user_id = match self.tokens.active_user_id(scope, token_hash, Utc::now()) {
            Some(user_id) => user_id,
            None => {
                debug!("No active token matched in memory");
                return Ok(None);
            }
        };

        let table = self.table.lock().unwrap();
        Ok(table.users.get(&user_id).cloned())
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> UserModel {
    UserModel {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password: Password::from_hash(row.get("password_hash")),
        bio: row.get("bio"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user))]
    async fn create_user(&self, user: &UserModel) -> Result<UserModel, AppError> {
        debug!(username = %user.username, "Creating user in database");

        let row = sqlx::query(
            "INSERT INTO users (username, email, password_hash, bio) VALUES ($1, $2, $3, $4) \
             RETURNING id, created_at, updated_at",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(user.password.hash())
        .bind(&user.bio)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                warn!(username = %user.username, "Username already taken in database");
                AppError::Conflict("username already taken".to_string())
            }
            _ => {
                warn!(error = %e, "Failed to create user in database");
                AppError::DatabaseError(e.to_string())
            }
        })?;

        let mut created = user.clone();
        created.id = row.get("id");
        created.created_at = row.get("created_at");
        created.updated_at = row.get("updated_at");

        debug!(user_id = created.id, "User created successfully in database");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, username, email, password_hash, bio, created_at, updated_at \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, username = %username, "Failed to fetch user from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.as_ref().map(user_from_row))
    }

    #[instrument(skip(self, user))]
    async fn update_user(&self, user: &UserModel) -> Result<UserModel, AppError> {
        debug!(username = %user.username, "Updating user in database");

        let row = sqlx::query(
            "UPDATE users SET email = $1, password_hash = $2, bio = $3, updated_at = NOW() \
             WHERE username = $4 \
             RETURNING id, username, email, password_hash, bio, created_at, updated_at",
        )
        .bind(&user.email)
        .bind(user.password.hash())
        .bind(&user.bio)
        .bind(&user.username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, username = %user.username, "Failed to update user in database");
            AppError::DatabaseError(e.to_string())
        })?;

        match row {
            Some(row) => Ok(user_from_row(&row)),
            None => {
                warn!(username = %user.username, "User not found for update");
                Err(AppError::NotFound("User not found".to_string()))
            }
        }
    }

    #[instrument(skip(self, token_hash))]
    async fn get_user_for_token(
        &self,
        scope: &str,
        token_hash: &[u8],
    ) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(
            "SELECT u.id, u.username, u.email, u.password_hash, u.bio, u.created_at, u.updated_at \
             FROM users u \
             INNER JOIN tokens t ON u.id = t.user_id \
             WHERE t.scope = $1 AND t.hash = $2 AND t.expiry > $3",
        )
        .bind(scope)
        .bind(token_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to resolve token owner from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.as_ref().map(user_from_row))
    }
}
