use serde::{Deserialize, Serialize};

use super::models::{WorkoutEntryModel, WorkoutModel};

/// One entry of a workout as submitted by a client; ids are assigned by the store
#[derive(Debug, Clone, Deserialize)]
pub struct WorkoutEntryRequest {
    pub exercise_name: String,
    pub sets: i32,
    pub reps: Option<i32>,
    pub duration_seconds: Option<i32>,
    pub weight: Option<f64>,
    #[serde(default)]
    pub notes: String,
    pub order_index: i32,
}

impl From<WorkoutEntryRequest> for WorkoutEntryModel {
    fn from(request: WorkoutEntryRequest) -> Self {
        Self {
            id: 0,
            exercise_name: request.exercise_name,
            sets: request.sets,
            reps: request.reps,
            duration_seconds: request.duration_seconds,
            weight: request.weight,
            notes: request.notes,
            order_index: request.order_index,
        }
    }
}

/// Request payload for creating a workout
#[derive(Debug, Deserialize)]
pub struct CreateWorkoutRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration_minutes: i32,
    #[serde(default)]
    pub calories_burned: i32,
    #[serde(default)]
    pub entries: Vec<WorkoutEntryRequest>,
}

/// Request payload for updating a workout. Absent fields keep their stored
/// value; a present `entries` list replaces all existing entries.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateWorkoutRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub calories_burned: Option<i32>,
    pub entries: Option<Vec<WorkoutEntryRequest>>,
}

/// Response wrapping a workout aggregate
#[derive(Debug, Serialize, Deserialize)]
pub struct WorkoutResponse {
    pub workout: WorkoutModel,
}
