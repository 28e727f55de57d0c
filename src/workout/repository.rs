use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::models::{WorkoutEntryModel, WorkoutModel};
use crate::shared::AppError;

/// Trait for workout aggregate operations.
/// A workout and its entries are always written and removed together.
#[async_trait]
pub trait WorkoutRepository {
    /// Inserts the workout and its entries in one transaction and returns the
    /// aggregate with every id assigned
    async fn create_workout(
        &self,
        owner_id: i64,
        workout: &WorkoutModel,
    ) -> Result<WorkoutModel, AppError>;
    /// Loads the workout with entries sorted by `order_index`
    async fn get_workout_by_id(&self, id: i64) -> Result<Option<WorkoutModel>, AppError>;
    /// Updates the parent fields and replaces the entry list wholesale
    async fn update_workout(&self, workout: &WorkoutModel) -> Result<WorkoutModel, AppError>;
    /// Owner of the workout, without loading entries
    async fn get_workout_owner(&self, id: i64) -> Result<Option<i64>, AppError>;
    async fn delete_workout(&self, id: i64) -> Result<(), AppError>;
}

fn sort_entries(entries: &mut [WorkoutEntryModel]) {
    entries.sort_by_key(|entry| (entry.order_index, entry.id));
}

struct WorkoutTable {
    workouts: BTreeMap<i64, WorkoutModel>,
    next_workout_id: i64,
    next_entry_id: i64,
}

impl WorkoutTable {
    /// Assigns ids to `entries` the way the entry insert loop would, failing on
    /// the first entry the table's check constraint refuses. Ids drawn before a
    /// failure stay consumed, like a database sequence.
    fn stage_entries(
        &mut self,
        entries: &[WorkoutEntryModel],
    ) -> Result<Vec<WorkoutEntryModel>, AppError> {
        let mut staged = Vec::with_capacity(entries.len());
        for entry in entries {
            let mut entry = entry.clone();
            entry.id = self.next_entry_id;
            self.next_entry_id += 1;

            if !entry.is_measured() {
                warn!(
                    exercise_name = %entry.exercise_name,
                    "Entry violates reps/duration constraint in memory"
                );
                return Err(AppError::DatabaseError(
                    "workout entry must have reps or duration_seconds".to_string(),
                ));
            }
            staged.push(entry);
        }
        Ok(staged)
    }
}

/// In-memory implementation of WorkoutRepository for development and testing.
/// Writes are staged and only become visible once every entry has been accepted.
pub struct InMemoryWorkoutRepository {
    table: Mutex<WorkoutTable>,
}

impl Default for InMemoryWorkoutRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryWorkoutRepository {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(WorkoutTable {
                workouts: BTreeMap::new(),
                next_workout_id: 1,
                next_entry_id: 1,
            }),
        }
    }

    /// Returns the current number of stored workouts
    pub fn workout_count(&self) -> usize {
        self.table.lock().unwrap().workouts.len()
    }

    /// Returns the number of stored entries across all workouts
    pub fn entry_count(&self) -> usize {
        self.table
            .lock()
            .unwrap()
            .workouts
            .values()
            .map(|w| w.entries.len())
            .sum()
    }
}

#[async_trait]
impl WorkoutRepository for InMemoryWorkoutRepository {
    #[instrument(skip(self, workout))]
    async fn create_workout(
        &self,
        owner_id: i64,
        workout: &WorkoutModel,
    ) -> Result<WorkoutModel, AppError> {
        debug!(title = %workout.title, entries = workout.entries.len(), "Creating workout in memory");

        let mut table = self.table.lock().unwrap();
        let workout_id = table.next_workout_id;
        table.next_workout_id += 1;

        let entries = table.stage_entries(&workout.entries)?;

        let mut created = workout.clone();
        created.id = workout_id;
        created.user_id = owner_id;
        created.entries = entries;
        table.workouts.insert(workout_id, created.clone());

        sort_entries(&mut created.entries);
        info!(workout_id, owner_id, "Workout created in memory");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_workout_by_id(&self, id: i64) -> Result<Option<WorkoutModel>, AppError> {
        let table = self.table.lock().unwrap();
        let workout = table.workouts.get(&id).cloned().map(|mut workout| {
            sort_entries(&mut workout.entries);
            workout
        });

        if workout.is_none() {
            debug!(workout_id = id, "Workout not found in memory");
        }
        Ok(workout)
    }

    #[instrument(skip(self, workout), fields(workout_id = workout.id))]
    async fn update_workout(&self, workout: &WorkoutModel) -> Result<WorkoutModel, AppError> {
        let mut table = self.table.lock().unwrap();
        let owner_id = match table.workouts.get(&workout.id) {
            Some(existing) => existing.user_id,
            None => {
                warn!("Workout not found for update in memory");
                return Err(AppError::NotFound("Workout not found".to_string()));
            }
        };

        let entries = table.stage_entries(&workout.entries)?;

        let mut updated = workout.clone();
        updated.user_id = owner_id;
        updated.entries = entries;
        table.workouts.insert(workout.id, updated.clone());

        sort_entries(&mut updated.entries);
        debug!(entries = updated.entries.len(), "Workout updated in memory");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn get_workout_owner(&self, id: i64) -> Result<Option<i64>, AppError> {
        let table = self.table.lock().unwrap();
        Ok(table.workouts.get(&id).map(|w| w.user_id))
    }

    #[instrument(skip(self))]
    async fn delete_workout(&self, id: i64) -> Result<(), AppError> {
        let mut table = self.table.lock().unwrap();
        if table.workouts.remove(&id).is_none() {
            warn!(workout_id = id, "Workout not found for deletion in memory");
            return Err(AppError::NotFound("Workout not found".to_string()));
        }

        debug!(workout_id = id, "Workout deleted from memory");
        Ok(())
    }
}

/// PostgreSQL implementation of workout repository
pub struct PostgresWorkoutRepository {
    pool: PgPool,
}

impl PostgresWorkoutRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn storage_error(action: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        warn!(error = %e, "Failed to {} in database", action);
        AppError::DatabaseError(e.to_string())
    }
}

/// Inserts entries in caller order inside `tx`, returning them with ids assigned
async fn insert_entries(
    tx: &mut Transaction<'_, Postgres>,
    workout_id: i64,
    entries: &[WorkoutEntryModel],
) -> Result<Vec<WorkoutEntryModel>, AppError> {
    let mut inserted = Vec::with_capacity(entries.len());
    for entry in entries {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO workout_entries \
             (workout_id, exercise_name, sets, reps, duration_seconds, weight, notes, order_index) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(workout_id)
        .bind(&entry.exercise_name)
        .bind(entry.sets)
        .bind(entry.reps)
        .bind(entry.duration_seconds)
        .bind(entry.weight)
        .bind(&entry.notes)
        .bind(entry.order_index)
        .fetch_one(&mut **tx)
        .await
        .map_err(storage_error("insert workout entry"))?;

        let mut entry = entry.clone();
        entry.id = id;
        inserted.push(entry);
    }
    Ok(inserted)
}

#[async_trait]
impl WorkoutRepository for PostgresWorkoutRepository {
    #[instrument(skip(self, workout))]
    async fn create_workout(
        &self,
        owner_id: i64,
        workout: &WorkoutModel,
    ) -> Result<WorkoutModel, AppError> {
        debug!(title = %workout.title, entries = workout.entries.len(), "Creating workout in database");

        // Dropping `tx` on any early return rolls the whole aggregate back
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage_error("begin transaction"))?;

        let workout_id: i64 = sqlx::query_scalar(
            "INSERT INTO workouts (user_id, title, description, duration_minutes, calories_burned) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(owner_id)
        .bind(&workout.title)
        .bind(&workout.description)
        .bind(workout.duration_minutes)
        .bind(workout.calories_burned)
        .fetch_one(&mut *tx)
        .await
        .map_err(storage_error("insert workout"))?;

        let entries = insert_entries(&mut tx, workout_id, &workout.entries).await?;

        tx.commit()
            .await
            .map_err(storage_error("commit workout"))?;

        let mut created = workout.clone();
        created.id = workout_id;
        created.user_id = owner_id;
        created.entries = entries;
        sort_entries(&mut created.entries);

        info!(workout_id, owner_id, "Workout created in database");
        Ok(created)
    }

    #[instrument(skip(self))]
    async fn get_workout_by_id(&self, id: i64) -> Result<Option<WorkoutModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, user_id, title, description, duration_minutes, calories_burned \
             FROM workouts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("fetch workout"))?;

        let row = match row {
            Some(row) => row,
            None => {
                debug!(workout_id = id, "Workout not found in database");
                return Ok(None);
            }
        };

        let entries = sqlx::query_as::<_, WorkoutEntryModel>(
            "SELECT id, exercise_name, sets, reps, duration_seconds, weight, notes, order_index \
             FROM workout_entries WHERE workout_id = $1 ORDER BY order_index, id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("fetch workout entries"))?;

        Ok(Some(WorkoutModel {
            id: row.get("id"),
            user_id: row.get("user_id"),
            title: row.get("title"),
            description: row.get("description"),
            duration_minutes: row.get("duration_minutes"),
            calories_burned: row.get("calories_burned"),
            entries,
        }))
    }

    #[instrument(skip(self, workout), fields(workout_id = workout.id))]
    async fn update_workout(&self, workout: &WorkoutModel) -> Result<WorkoutModel, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage_error("begin transaction"))?;

        // The UPDATE takes the row lock, so concurrent replacements of the
        // entry list queue up behind each other instead of interleaving
        let owner_id: Option<i64> = sqlx::query_scalar(
            "UPDATE workouts \
             SET title = $1, description = $2, duration_minutes = $3, calories_burned = $4 \
             WHERE id = $5 RETURNING user_id",
        )
        .bind(&workout.title)
        .bind(&workout.description)
        .bind(workout.duration_minutes)
        .bind(workout.calories_burned)
        .bind(workout.id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage_error("update workout"))?;

        let owner_id = match owner_id {
            Some(owner_id) => owner_id,
            None => {
                warn!("Workout not found for update");
                return Err(AppError::NotFound("Workout not found".to_string()));
            }
        };

        sqlx::query("DELETE FROM workout_entries WHERE workout_id = $1")
            .bind(workout.id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error("clear workout entries"))?;

        let entries = insert_entries(&mut tx, workout.id, &workout.entries).await?;

        tx.commit()
            .await
            .map_err(storage_error("commit workout update"))?;

        let mut updated = workout.clone();
        updated.user_id = owner_id;
        updated.entries = entries;
        sort_entries(&mut updated.entries);

        debug!(entries = updated.entries.len(), "Workout updated in database");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn get_workout_owner(&self, id: i64) -> Result<Option<i64>, AppError> {
        sqlx::query_scalar("SELECT user_id FROM workouts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error("fetch workout owner"))
    }

    #[instrument(skip(self))]
    async fn delete_workout(&self, id: i64) -> Result<(), AppError> {
        // Entries go with the parent through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM workouts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_error("delete workout"))?;

        if result.rows_affected() == 0 {
            warn!(workout_id = id, "Workout not found for deletion");
            return Err(AppError::NotFound("Workout not found".to_string()));
        }

        debug!(workout_id = id, "Workout deleted from database");
        Ok(())
    }
}
