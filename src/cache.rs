//! Session cache - in-progress workout snapshots for resumption

use chrono::Utc;
use tracing::debug;

use crate::error::Result;
use crate::models::{Workout, routine_key};
use crate::storage::{CacheDocument, Category, ExerciseSets, Storage};
use crate::user::User;

/// Cached workout plus the exercise cursor it was left at
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub workout: Workout,
    pub cursor: usize,
}

#[derive(Debug, Clone)]
pub struct SessionCache {
    storage: Storage,
}

impl SessionCache {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Cached workout for a routine.
    ///
    /// Missing, corrupt and empty entries all read as `None`. A negative
    /// cursor reads as 0.
    pub fn get(&self, user: &User, routine: &str) -> Result<Option<CacheEntry>> {
        let key = routine_key(routine);
        let doc: CacheDocument = self
            .storage
            .read_or_default(user, Category::TempWorkouts, &key)?;
        if doc.workout.is_empty() {
            return Ok(None);
        }

        let mut workout = Workout::new(routine, Utc::now());
        workout.exercises = doc.workout.into_exercises();
        let cursor = usize::try_from(doc.exercise_index).unwrap_or(0);
        Ok(Some(CacheEntry { workout, cursor }))
    }

    pub fn put(&self, user: &User, routine: &str, workout: &Workout, cursor: usize) -> Result<()> {
        let doc = CacheDocument {
            exercise_index: cursor as i64,
            workout: ExerciseSets::from(workout),
        };
        self.storage
            .write_document(user, Category::TempWorkouts, &routine_key(routine), &doc)?;
        debug!("Cached '{}' at exercise {}", routine, cursor);
        Ok(())
    }

    pub fn delete(&self, user: &User, routine: &str) -> Result<()> {
        if self
            .storage
            .delete_document(user, Category::TempWorkouts, &routine_key(routine))?
        {
            debug!("Dropped cached workout for '{}'", routine);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SetData, WorkoutExercise};
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, SessionCache, User) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(temp_dir.path()).unwrap();
        let user = User::from_email("lifter@example.com").unwrap();
        (temp_dir, SessionCache::new(storage), user)
    }

    fn sample_workout() -> Workout {
        let mut workout = Workout::new("Push Day", Utc::now());
        workout.exercises = vec![
            WorkoutExercise::new("Overhead Press", vec![SetData::new(10, 40.0)]),
            WorkoutExercise::new("Bench Press", vec![SetData::new(8, 60.0), SetData::new(8, 62.5)]),
        ];
        workout
    }

    #[test]
    fn test_get_absent() {
        let (_dir, cache, user) = setup();
        assert!(cache.get(&user, "Push Day").unwrap().is_none());
    }

    #[test]
    fn test_put_then_get() {
        let (_dir, cache, user) = setup();
        let workout = sample_workout();

        cache.put(&user, "Push Day", &workout, 1).unwrap();
        let entry = cache.get(&user, "Push Day").unwrap().unwrap();

        assert_eq!(entry.cursor, 1);
        assert_eq!(entry.workout.routine_name, "Push Day");
        assert_eq!(entry.workout.exercises, workout.exercises);
    }

    #[test]
    fn test_put_overwrites() {
        let (_dir, cache, user) = setup();
        let mut workout = sample_workout();
        cache.put(&user, "Push Day", &workout, 0).unwrap();

        workout.exercises[0].sets[0].reps = 12;
        cache.put(&user, "Push Day", &workout, 1).unwrap();

        let entry = cache.get(&user, "Push Day").unwrap().unwrap();
        assert_eq!(entry.cursor, 1);
        assert_eq!(entry.workout.exercises[0].sets[0].reps, 12);
    }

    #[test]
    fn test_keyed_by_normalized_routine() {
        let (dir, cache, user) = setup();
        cache.put(&user, "Push Day", &sample_workout(), 0).unwrap();

        let path = dir.path().join("temp_workouts").join("lifter").join("push_day.json");
        assert!(path.is_file());
        assert!(cache.get(&user, "push_day").unwrap().is_some());
    }

    #[test]
    fn test_document_format() {
        let (dir, cache, user) = setup();
        cache.put(&user, "Push Day", &sample_workout(), 1).unwrap();

        let path = dir.path().join("temp_workouts").join("lifter").join("push_day.json");
        let raw = fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["exercise_index"], 1);
        assert_eq!(value["workout"]["Bench Press"][1]["weight"], 62.5);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_dir, cache, user) = setup();
        cache.put(&user, "Push Day", &sample_workout(), 0).unwrap();

        cache.delete(&user, "Push Day").unwrap();
        cache.delete(&user, "Push Day").unwrap();
        assert!(cache.get(&user, "Push Day").unwrap().is_none());
    }

    #[test]
    fn test_empty_or_corrupt_entries_read_as_absent() {
        let (dir, cache, user) = setup();
        let folder = dir.path().join("temp_workouts").join("lifter");
        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("empty.json"), r#"{"exercise_index": 2, "workout": {}}"#).unwrap();
        fs::write(folder.join("corrupt.json"), "{").unwrap();

        assert!(cache.get(&user, "empty").unwrap().is_none());
        assert!(cache.get(&user, "corrupt").unwrap().is_none());
    }

    #[test]
    fn test_negative_cursor_reads_as_zero() {
        let (dir, cache, user) = setup();
        let folder = dir.path().join("temp_workouts").join("lifter");
        fs::create_dir_all(&folder).unwrap();
        fs::write(
            folder.join("legs.json"),
            r#"{"exercise_index": -1, "workout": {"Squat": [{"reps": 5, "weight": 100}]}}"#,
        )
        .unwrap();

        let entry = cache.get(&user, "legs").unwrap().unwrap();
        assert_eq!(entry.cursor, 0);
    }
}
