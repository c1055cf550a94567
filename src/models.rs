//! Routine and workout data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One performed (or planned) set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetData {
    #[serde(default, deserialize_with = "coerce_reps")]
    pub reps: u32,
    /// Negative for assisted variations
    #[serde(default, deserialize_with = "coerce_weight")]
    pub weight: f64,
}

impl SetData {
    pub const ZERO: SetData = SetData { reps: 0, weight: 0.0 };

    pub fn new(reps: u32, weight: f64) -> Self {
        Self { reps, weight }
    }

    pub fn volume(&self) -> f64 {
        self.reps as f64 * self.weight
    }
}

impl Default for SetData {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Accepts integer, real or null reps, truncated and clamped at zero
fn coerce_reps<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    if !value.is_finite() || value <= 0.0 {
        return Ok(0);
    }
    Ok(value.trunc().min(u32::MAX as f64) as u32)
}

fn coerce_weight<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Planned exercise inside a routine template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineExercise {
    pub name: String,
    pub target_sets: u32,
    pub target_reps: u32,
}

impl RoutineExercise {
    pub fn new(name: impl Into<String>, target_sets: u32, target_reps: u32) -> Self {
        Self {
            name: name.into(),
            target_sets,
            target_reps,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    pub name: String,
    /// Traversal order during a workout
    pub exercises: Vec<RoutineExercise>,
}

impl Routine {
    pub fn new(name: impl Into<String>, exercises: Vec<RoutineExercise>) -> Self {
        Self {
            name: name.into(),
            exercises,
        }
    }

    pub fn key(&self) -> String {
        routine_key(&self.name)
    }
}

/// Storage key for a routine name: lowercase, spaces as underscores.
///
/// Names normalizing to the same key share one document. Surrounding
/// whitespace is not stripped here.
pub fn routine_key(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutExercise {
    pub name: String,
    pub sets: Vec<SetData>,
}

impl WorkoutExercise {
    pub fn new(name: impl Into<String>, sets: Vec<SetData>) -> Self {
        Self {
            name: name.into(),
            sets,
        }
    }

    pub fn volume(&self) -> f64 {
        self.sets.iter().map(SetData::volume).sum()
    }
}

/// One concrete session against a routine
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    pub routine_name: String,
    pub date: DateTime<Utc>,
    /// Aligned by position with the routine's exercises
    pub exercises: Vec<WorkoutExercise>,
}

impl Workout {
    pub fn new(routine_name: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            routine_name: routine_name.into(),
            date,
            exercises: Vec::new(),
        }
    }

    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routine_key() {
        assert_eq!(routine_key("Push Day"), "push_day");
        assert_eq!(routine_key("push_day"), "push_day");
        assert_eq!(routine_key("Upper Body A"), "upper_body_a");
    }

    #[test]
    fn test_routine_key_collision() {
        assert_eq!(routine_key("Leg Day"), routine_key("leg day"));
    }

    #[test]
    fn test_routine_key_keeps_surrounding_spaces() {
        assert_eq!(routine_key(" Push Day "), "_push_day_");
    }

    #[test]
    fn test_set_volume() {
        assert_eq!(SetData::new(10, 60.0).volume(), 600.0);
        assert_eq!(SetData::new(5, -20.0).volume(), -100.0);
    }

    #[test]
    fn test_set_defaults_missing_fields() {
        let set: SetData = serde_json::from_str("{}").unwrap();
        assert_eq!(set, SetData::ZERO);

        let set: SetData = serde_json::from_str(r#"{"reps": 8}"#).unwrap();
        assert_eq!(set, SetData::new(8, 0.0));
    }

    #[test]
    fn test_set_coerces_numbers() {
        let set: SetData = serde_json::from_str(r#"{"reps": 8.0, "weight": 60}"#).unwrap();
        assert_eq!(set, SetData::new(8, 60.0));

        let set: SetData = serde_json::from_str(r#"{"reps": -3, "weight": -12.5}"#).unwrap();
        assert_eq!(set, SetData::new(0, -12.5));
    }

    #[test]
    fn test_set_null_fields_read_as_zero() {
        let set: SetData = serde_json::from_str(r#"{"reps": 8, "weight": null}"#).unwrap();
        assert_eq!(set, SetData::new(8, 0.0));

        let set: SetData = serde_json::from_str(r#"{"reps": null, "weight": 40}"#).unwrap();
        assert_eq!(set, SetData::new(0, 40.0));
    }

    #[test]
    fn test_set_serializes_like_stored_documents() {
        let json = serde_json::to_value(SetData::new(10, 62.5)).unwrap();
        assert_eq!(json, serde_json::json!({"reps": 10, "weight": 62.5}));
    }

    #[test]
    fn test_workout_volume() {
        let exercise = WorkoutExercise::new(
            "Bench Press",
            vec![SetData::new(10, 60.0), SetData::new(8, 70.0)],
        );
        assert_eq!(exercise.volume(), 1160.0);
    }
}
