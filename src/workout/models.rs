use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for workouts table, hydrated with its entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutModel {
    pub id: i64,
    pub user_id: i64, // Owner
    pub title: String,
    pub description: String,
    pub duration_minutes: i32,
    pub calories_burned: i32,
    pub entries: Vec<WorkoutEntryModel>,
}

/// Database model for workout_entries table
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct WorkoutEntryModel {
    pub id: i64,
    pub exercise_name: String,
    pub sets: i32,
    pub reps: Option<i32>,             // None for timed exercises
    pub duration_seconds: Option<i32>, // None for rep-counted exercises
    pub weight: Option<f64>,
    pub notes: String,
    pub order_index: i32, // Caller-assigned, never renumbered by the store
}

impl WorkoutEntryModel {
    /// Mirrors the table's check constraint: an entry is measured by reps, by time, or both
    pub fn is_measured(&self) -> bool {
        self.reps.is_some() || self.duration_seconds.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(reps: Option<i32>, duration_seconds: Option<i32>) -> WorkoutEntryModel {
        WorkoutEntryModel {
            id: 0,
            exercise_name: "Plank".to_string(),
            sets: 3,
            reps,
            duration_seconds,
            weight: None,
            notes: String::new(),
            order_index: 0,
        }
    }

    #[test]
    fn test_entry_measurement() {
        assert!(entry(Some(10), None).is_measured());
        assert!(entry(None, Some(60)).is_measured());
        assert!(entry(Some(10), Some(60)).is_measured());
        assert!(!entry(None, None).is_measured());
    }

    #[test]
    fn test_absent_optionals_serialize_as_null() {
        let json = serde_json::to_value(entry(None, Some(60))).unwrap();
        assert!(json["reps"].is_null());
        assert!(json["weight"].is_null());
        assert_eq!(json["duration_seconds"], 60);
    }
}
