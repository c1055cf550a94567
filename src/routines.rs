//! Routine store - CRUD over routine templates

use tracing::info;

use crate::error::{Error, Result};
use crate::models::{Routine, routine_key};
use crate::storage::{Category, RoutineDocument, Storage};
use crate::user::User;

#[derive(Debug, Clone)]
pub struct RoutineStore {
    storage: Storage,
}

impl RoutineStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Stored routine keys
    pub fn list(&self, user: &User) -> Result<Vec<String>> {
        self.storage.list_documents(user, Category::Routines)
    }

    /// Load a routine by display name or key
    pub fn get(&self, user: &User, name: &str) -> Result<Routine> {
        let key = routine_key(name);
        let doc: RoutineDocument = self
            .storage
            .read_document(user, Category::Routines, &key)
            .map_err(|e| match e {
                Error::NotFound { .. } => Error::not_found("routine", name),
                other => other,
            })?;
        Ok(doc.into_routine(&key))
    }

    /// Save under the normalized key, replacing any routine sharing it
    pub fn save(&self, user: &User, routine: &Routine) -> Result<()> {
        let key = routine.key();
        if routine.name.trim().is_empty() {
            return Err(Error::InvalidRoutine("routine name is empty".to_string()));
        }
        self.storage
            .write_document(user, Category::Routines, &key, &RoutineDocument::from(routine))?;
        info!("Saved routine '{}' as {}", routine.name, key);
        Ok(())
    }

    pub fn delete(&self, user: &User, name: &str) -> Result<()> {
        let key = routine_key(name);
        if self.storage.delete_document(user, Category::Routines, &key)? {
            info!("Deleted routine {}", key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoutineExercise;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, RoutineStore, User) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(temp_dir.path()).unwrap();
        let user = User::from_email("lifter@example.com").unwrap();
        (temp_dir, RoutineStore::new(storage), user)
    }

    fn push_day() -> Routine {
        Routine::new(
            "Push Day",
            vec![
                RoutineExercise::new("Bench Press", 3, 8),
                RoutineExercise::new("Overhead Press", 3, 10),
                RoutineExercise::new("Tricep Dip", 2, 12),
            ],
        )
    }

    #[test]
    fn test_save_and_get_round_trip() {
        let (_dir, store, user) = setup();
        let routine = push_day();

        store.save(&user, &routine).unwrap();
        let loaded = store.get(&user, "push_day").unwrap();

        assert_eq!(loaded.exercises, routine.exercises);
        assert_eq!(loaded.name, "Push Day");
    }

    #[test]
    fn test_get_by_display_name() {
        let (_dir, store, user) = setup();
        store.save(&user, &push_day()).unwrap();

        let loaded = store.get(&user, "Push Day").unwrap();
        assert_eq!(loaded.exercises.len(), 3);
    }

    #[test]
    fn test_list_returns_keys() {
        let (_dir, store, user) = setup();
        store.save(&user, &push_day()).unwrap();
        store
            .save(&user, &Routine::new("Leg Day", vec![RoutineExercise::new("Squat", 5, 5)]))
            .unwrap();

        let names = store.list(&user).unwrap();
        assert_eq!(names, vec!["leg_day".to_string(), "push_day".to_string()]);
    }

    #[test]
    fn test_colliding_names_overwrite() {
        let (_dir, store, user) = setup();
        store.save(&user, &push_day()).unwrap();
        store
            .save(&user, &Routine::new("push day", vec![RoutineExercise::new("Dip", 3, 10)]))
            .unwrap();

        assert_eq!(store.list(&user).unwrap().len(), 1);
        let loaded = store.get(&user, "Push Day").unwrap();
        assert_eq!(loaded.exercises, vec![RoutineExercise::new("Dip", 3, 10)]);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let (_dir, store, user) = setup();
        let err = store.get(&user, "Nope").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_get_missing_fields_is_malformed() {
        let (dir, store, user) = setup();
        let folder = dir.path().join("routines").join("lifter");
        fs::create_dir_all(&folder).unwrap();
        fs::write(
            folder.join("broken.json"),
            r#"{"exercises": [{"exercise_name": "Squat", "reps": 5}]}"#,
        )
        .unwrap();

        let err = store.get(&user, "broken").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_reads_documents_without_display_name() {
        let (dir, store, user) = setup();
        let folder = dir.path().join("routines").join("lifter");
        fs::create_dir_all(&folder).unwrap();
        fs::write(
            folder.join("legacy.json"),
            r#"{"exercises": [{"exercise_name": "Squat", "sets": 5, "reps": 5}]}"#,
        )
        .unwrap();

        let routine = store.get(&user, "legacy").unwrap();
        assert_eq!(routine.name, "legacy");
        assert_eq!(routine.exercises, vec![RoutineExercise::new("Squat", 5, 5)]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_dir, store, user) = setup();
        store.save(&user, &push_day()).unwrap();

        store.delete(&user, "Push Day").unwrap();
        store.delete(&user, "Push Day").unwrap();
        assert!(store.list(&user).unwrap().is_empty());
    }

    #[test]
    fn test_save_rejects_empty_name() {
        let (_dir, store, user) = setup();
        let result = store.save(&user, &Routine::new("  ", vec![]));
        assert!(matches!(result, Err(Error::InvalidRoutine(_))));
    }
}
