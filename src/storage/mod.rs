//! Storage module - per-user JSON documents on local disk
//!
//! Layout: `<root>/<category>/<user>/<name>.json`. Writes are whole-file
//! overwrites; there is no locking.

pub mod documents;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::user::User;

pub use documents::{CacheDocument, ExerciseSets, RoutineDocument, RoutineExerciseDocument};

const EXTENSION: &str = "json";

/// Document category, one directory per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Routines,
    History,
    TempWorkouts,
}

impl Category {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Routines => "routines",
            Category::History => "history",
            Category::TempWorkouts => "temp_workouts",
        }
    }

    /// Resource name used in `NotFound` errors
    fn kind(&self) -> &'static str {
        match self {
            Category::Routines => "routine",
            Category::History => "history document",
            Category::TempWorkouts => "cached workout",
        }
    }
}

/// JSON document store rooted at a data directory
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Open or create the data directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| Error::WriteFailure {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn folder_path(&self, user: &User, category: Category) -> PathBuf {
        self.root.join(category.dir_name()).join(user.as_str())
    }

    /// User's category directory, created on demand
    fn folder(&self, user: &User, category: Category) -> Result<PathBuf> {
        let folder = self.folder_path(user, category);
        fs::create_dir_all(&folder).map_err(|source| Error::WriteFailure {
            path: folder.clone(),
            source,
        })?;
        Ok(folder)
    }

    pub fn document_path(&self, user: &User, category: Category, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self
            .folder_path(user, category)
            .join(format!("{}.{}", name, EXTENSION)))
    }

    pub fn exists(&self, user: &User, category: Category, name: &str) -> Result<bool> {
        Ok(self.document_path(user, category, name)?.is_file())
    }

    /// Read and decode a document.
    ///
    /// Absent files give `NotFound`; unparsable or mistyped content gives
    /// `Malformed`.
    pub fn read_document<T: DeserializeOwned>(
        &self,
        user: &User,
        category: Category,
        name: &str,
    ) -> Result<T> {
        let path = self.document_path(user, category, name)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::not_found(category.kind(), name));
            }
            Err(source) => return Err(Error::Io { path, source }),
        };
        serde_json::from_str(&content).map_err(|e| Error::malformed(path, e))
    }

    /// Read a document, treating absent or corrupt content as the default.
    ///
    /// Only I/O failures other than a missing file are returned.
    pub fn read_or_default<T: DeserializeOwned + Default>(
        &self,
        user: &User,
        category: Category,
        name: &str,
    ) -> Result<T> {
        match self.read_document(user, category, name) {
            Ok(value) => Ok(value),
            Err(Error::NotFound { .. }) => Ok(T::default()),
            Err(Error::Malformed { path, reason }) => {
                warn!("Ignoring corrupt document {:?}: {}", path, reason);
                Ok(T::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn write_document<T: Serialize>(
        &self,
        user: &User,
        category: Category,
        name: &str,
        value: &T,
    ) -> Result<()> {
        validate_name(name)?;
        let path = self
            .folder(user, category)?
            .join(format!("{}.{}", name, EXTENSION));
        let bytes = to_json_pretty(value).map_err(|e| Error::WriteFailure {
            path: path.clone(),
            source: std::io::Error::other(e),
        })?;
        fs::write(&path, bytes).map_err(|source| Error::WriteFailure {
            path: path.clone(),
            source,
        })?;
        debug!("Wrote {:?}", path);
        Ok(())
    }

    /// Remove a document; returns whether it existed
    pub fn delete_document(&self, user: &User, category: Category, name: &str) -> Result<bool> {
        let path = self.document_path(user, category, name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Deleted {:?}", path);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(Error::WriteFailure { path, source }),
        }
    }

    /// Names of all documents in a category, sorted
    pub fn list_documents(&self, user: &User, category: Category) -> Result<Vec<String>> {
        let folder = self.folder(user, category)?;
        let entries = fs::read_dir(&folder).map_err(|source| Error::Io {
            path: folder.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| Error::Io {
                path: folder.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Pretty JSON with 4-space indentation
fn to_json_pretty<T: Serialize>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn setup() -> (TempDir, Storage, User) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::open(temp_dir.path().join("data")).unwrap();
        let user = User::from_email("test.user@example.com").unwrap();
        (temp_dir, storage, user)
    }

    #[test]
    fn test_write_and_read_document() {
        let (_dir, storage, user) = setup();
        let doc = json!({"exercises": [{"exercise_name": "Squat", "sets": 3, "reps": 5}]});

        storage.write_document(&user, Category::Routines, "legs", &doc).unwrap();
        let loaded: Value = storage.read_document(&user, Category::Routines, "legs").unwrap();

        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_layout_on_disk() {
        let (_dir, storage, user) = setup();
        storage
            .write_document(&user, Category::TempWorkouts, "push_day", &json!({}))
            .unwrap();

        let expected = storage
            .root()
            .join("temp_workouts")
            .join("test_user")
            .join("push_day.json");
        assert!(expected.is_file());
    }

    #[test]
    fn test_written_json_uses_four_space_indent() {
        let (_dir, storage, user) = setup();
        storage
            .write_document(&user, Category::History, "doc", &json!({"a": 1}))
            .unwrap();

        let path = storage.document_path(&user, Category::History, "doc").unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, "{\n    \"a\": 1\n}");
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (_dir, storage, user) = setup();
        let result: Result<Value> = storage.read_document(&user, Category::Routines, "nope");
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_read_corrupt_is_malformed() {
        let (_dir, storage, user) = setup();
        let path = storage.document_path(&user, Category::History, "broken").unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let result: Result<Value> = storage.read_document(&user, Category::History, "broken");
        assert!(result.unwrap_err().is_malformed());
    }

    #[test]
    fn test_read_or_default_is_lenient() {
        let (_dir, storage, user) = setup();
        let path = storage.document_path(&user, Category::History, "broken").unwrap();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[1, 2").unwrap();

        let corrupt: Vec<u32> = storage
            .read_or_default(&user, Category::History, "broken")
            .unwrap();
        let missing: Vec<u32> = storage
            .read_or_default(&user, Category::History, "missing")
            .unwrap();

        assert!(corrupt.is_empty());
        assert!(missing.is_empty());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_dir, storage, user) = setup();
        storage
            .write_document(&user, Category::Routines, "legs", &json!({}))
            .unwrap();

        assert!(storage.delete_document(&user, Category::Routines, "legs").unwrap());
        assert!(!storage.delete_document(&user, Category::Routines, "legs").unwrap());
        assert!(!storage.exists(&user, Category::Routines, "legs").unwrap());
    }

    #[test]
    fn test_list_documents_creates_folder_and_filters() {
        let (_dir, storage, user) = setup();
        assert!(storage.list_documents(&user, Category::Routines).unwrap().is_empty());

        storage.write_document(&user, Category::Routines, "pull", &json!({})).unwrap();
        storage.write_document(&user, Category::Routines, "legs", &json!({})).unwrap();
        let folder = storage.root().join("routines").join("test_user");
        fs::write(folder.join("notes.txt"), "ignored").unwrap();

        let names = storage.list_documents(&user, Category::Routines).unwrap();
        assert_eq!(names, vec!["legs".to_string(), "pull".to_string()]);
    }

    #[test]
    fn test_users_are_isolated() {
        let (_dir, storage, user) = setup();
        let other = User::from_email("other@example.com").unwrap();
        storage.write_document(&user, Category::Routines, "legs", &json!({})).unwrap();

        assert!(storage.list_documents(&other, Category::Routines).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_path_like_names() {
        let (_dir, storage, user) = setup();
        let result = storage.write_document(&user, Category::Routines, "../escape", &json!({}));
        assert!(matches!(result, Err(Error::InvalidName(_))));
    }
}
