use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    models::{WorkoutEntryModel, WorkoutModel},
    repository::WorkoutRepository,
    types::{CreateWorkoutRequest, UpdateWorkoutRequest},
};
use crate::{
    auth::{authorize_owner, require_user, Identity},
    shared::AppError,
};

// Column widths of the workouts and workout_entries tables
const MAX_TITLE_LENGTH: usize = 255;
const MAX_EXERCISE_NAME_LENGTH: usize = 255;

fn validate_entry(entry: &WorkoutEntryModel) -> Result<(), AppError> {
    if entry.exercise_name.trim().is_empty() {
        return Err(AppError::Validation("exercise_name is required".to_string()));
    }
    if entry.exercise_name.chars().count() > MAX_EXERCISE_NAME_LENGTH {
        return Err(AppError::Validation(format!(
            "exercise_name must be at most {} characters",
            MAX_EXERCISE_NAME_LENGTH
        )));
    }
    if entry.sets <= 0 {
        return Err(AppError::Validation("sets must be positive".to_string()));
    }
    if entry.reps.is_some_and(|reps| reps <= 0)
        || entry.duration_seconds.is_some_and(|seconds| seconds <= 0)
    {
        return Err(AppError::Validation(
            "reps and duration_seconds must be positive when present".to_string(),
        ));
    }
    if entry.weight.is_some_and(|weight| !weight.is_finite() || weight < 0.0) {
        return Err(AppError::Validation(
            "weight must be a non-negative number".to_string(),
        ));
    }
    if !entry.is_measured() {
        return Err(AppError::Validation(format!(
            "entry '{}' needs reps or duration_seconds",
            entry.exercise_name
        )));
    }
    Ok(())
}

fn validate_workout(workout: &WorkoutModel) -> Result<(), AppError> {
    if workout.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    if workout.title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::Validation(format!(
            "title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    if workout.duration_minutes < 0 || workout.calories_burned < 0 {
        return Err(AppError::Validation(
            "duration_minutes and calories_burned must not be negative".to_string(),
        ));
    }
    workout.entries.iter().try_for_each(validate_entry)
}

/// Service for workout business logic. Reads are public; every mutation is
/// gated on the caller owning the workout.
pub struct WorkoutService {
    repository: Arc<dyn WorkoutRepository + Send + Sync>,
}

impl WorkoutService {
    pub fn new(repository: Arc<dyn WorkoutRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn get_workout(&self, id: i64) -> Result<WorkoutModel, AppError> {
        self.repository
            .get_workout_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Workout not found".to_string()))
    }

    /// Creates a workout owned by the caller
    #[instrument(skip(self, identity, request))]
    pub async fn create_workout(
        &self,
        identity: &Identity,
        request: CreateWorkoutRequest,
    ) -> Result<WorkoutModel, AppError> {
        let user = require_user(identity)?;

        let workout = WorkoutModel {
            id: 0,
            user_id: user.id,
            title: request.title,
            description: request.description,
            duration_minutes: request.duration_minutes,
            calories_burned: request.calories_burned,
            entries: request.entries.into_iter().map(Into::into).collect(),
        };
        validate_workout(&workout)?;

        let created = self.repository.create_workout(user.id, &workout).await?;

        info!(workout_id = created.id, user_id = user.id, "Workout created");
        Ok(created)
    }

    /// Resolves the owner and checks it against the caller
    async fn authorize_mutation(&self, identity: &Identity, id: i64) -> Result<(), AppError> {
        require_user(identity)?;

        let owner_id = self
            .repository
            .get_workout_owner(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Workout not found".to_string()))?;

        authorize_owner(identity, owner_id)?;
        Ok(())
    }

    /// Merges the present fields of `request` into the stored aggregate and
    /// writes the whole aggregate back
    #[instrument(skip(self, identity, request))]
    pub async fn update_workout(
        &self,
        identity: &Identity,
        id: i64,
        request: UpdateWorkoutRequest,
    ) -> Result<WorkoutModel, AppError> {
        self.authorize_mutation(identity, id).await?;

        let mut workout = self.get_workout(id).await?;

        if let Some(title) = request.title {
            workout.title = title;
        }
        if let Some(description) = request.description {
            workout.description = description;
        }
        if let Some(duration_minutes) = request.duration_minutes {
            workout.duration_minutes = duration_minutes;
        }
        if let Some(calories_burned) = request.calories_burned {
            workout.calories_burned = calories_burned;
        }
        if let Some(entries) = request.entries {
            debug!(entries = entries.len(), "Replacing workout entries");
            workout.entries = entries.into_iter().map(Into::into).collect();
        }
        validate_workout(&workout)?;

        let updated = self.repository.update_workout(&workout).await?;

        info!(workout_id = id, "Workout updated");
        Ok(updated)
    }

    #[instrument(skip(self, identity))]
    pub async fn delete_workout(&self, identity: &Identity, id: i64) -> Result<(), AppError> {
        self.authorize_mutation(identity, id).await.inspect_err(|e| {
            warn!(workout_id = id, error = %e, "Workout deletion refused");
        })?;

        self.repository.delete_workout(id).await?;

        info!(workout_id = id, "Workout deleted");
        Ok(())
    }
}
