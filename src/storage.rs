use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::ObjectivesFile;

const DATA_FILE: &str = "objectives.json";

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        StorageError::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        StorageError::Json(value)
    }
}

/// JSON persistence under the app data dir. The whole objective list is the
/// unit of persistence; every save rewrites the full file (no patching).
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn load_objectives(&self) -> Result<ObjectivesFile, StorageError> {
        self.load_json(self.root.join(DATA_FILE))
    }

    pub fn save_objectives(&self, data: &ObjectivesFile) -> Result<(), StorageError> {
        self.write_atomic(self.root.join(DATA_FILE), data)
    }

    fn load_json<T: DeserializeOwned>(&self, path: PathBuf) -> Result<T, StorageError> {
        let mut file = File::open(path)?;
        let mut buf = String::new();
        file.read_to_string(&mut buf)?;
        Ok(serde_json::from_str(&buf)?)
    }

    fn write_atomic<T: Serialize>(&self, path: PathBuf, data: &T) -> Result<(), StorageError> {
        let temp_path = path.with_extension("tmp");
        let json = serde_json::to_vec_pretty(data)?;
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(temp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Objective, Priority};

    fn make_objective(id: i64, timer_end: Option<i64>) -> Objective {
        Objective {
            id,
            text: format!("objective-{id}"),
            priority: Priority::Low,
            tags: vec!["work".to_string()],
            completed: false,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            timer_end,
        }
    }

    #[test]
    fn save_and_load_round_trips_the_full_list() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().unwrap();

        let file = ObjectivesFile {
            objectives: vec![make_objective(1, None), make_objective(2, Some(999))],
        };
        storage.save_objectives(&file).unwrap();

        let loaded = storage.load_objectives().unwrap();
        assert_eq!(loaded.objectives.len(), 2);
        assert_eq!(loaded.objectives[0].id, 1);
        assert_eq!(loaded.objectives[1].timer_end, Some(999));
    }

    #[test]
    fn load_fails_when_no_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        assert!(storage.load_objectives().is_err());
    }

    #[test]
    fn atomic_write_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().unwrap();
        storage
            .save_objectives(&ObjectivesFile {
                objectives: vec![make_objective(1, None)],
            })
            .unwrap();

        assert!(dir.path().join("objectives.json").is_file());
        assert!(!dir.path().join("objectives.tmp").exists());
    }

    #[test]
    fn save_fails_when_target_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().unwrap();
        fs::create_dir_all(dir.path().join("objectives.json")).unwrap();

        let result = storage.save_objectives(&ObjectivesFile {
            objectives: Vec::new(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn load_fails_on_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().unwrap();
        fs::write(dir.path().join("objectives.json"), b"not json").unwrap();

        let err = storage.load_objectives().unwrap_err();
        assert!(matches!(err, StorageError::Json(_)));
        assert!(err.to_string().starts_with("json error"));
    }
}
