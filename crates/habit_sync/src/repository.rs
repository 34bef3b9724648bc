use std::fs;
use std::path::{Path, PathBuf};

use habit_core::Habit;
use parking_lot::RwLock;

use crate::error::{Result, SyncError};

/// Storage backend for habit snapshots. The engine never calls this; the
/// service loads a snapshot, hands it to the engine, and saves mutations.
pub trait HabitRepository: Send + Sync {
    fn load_habits(&self) -> Result<Vec<Habit>>;
    fn save_habits(&self, habits: &[Habit]) -> Result<()>;
}

/// Habit list kept as a pretty-printed JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SyncError {
        SyncError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl HabitRepository for JsonFileRepository {
    fn load_habits(&self) -> Result<Vec<Habit>> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "habit store missing, starting empty");
            return Ok(Vec::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|err| self.io_error(err))?;
        let habits: Vec<Habit> = serde_json::from_str(&text).map_err(|source| SyncError::Serde {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), count = habits.len(), "loaded habits");
        Ok(habits)
    }

    fn save_habits(&self, habits: &[Habit]) -> Result<()> {
        let text = serde_json::to_string_pretty(habits).map_err(|source| SyncError::Serde {
            path: self.path.clone(),
            source,
        })?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
            }
        }
        let tmp = self.temp_path();
        fs::write(&tmp, text).map_err(|err| self.io_error(err))?;
        fs::rename(&tmp, &self.path).map_err(|err| self.io_error(err))?;
        tracing::debug!(path = %self.path.display(), count = habits.len(), "saved habits");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    habits: RwLock<Vec<Habit>>,
}

impl MemoryRepository {
    pub fn new(habits: Vec<Habit>) -> Self {
        Self {
            habits: RwLock::new(habits),
        }
    }

    pub fn snapshot(&self) -> Vec<Habit> {
        self.habits.read().clone()
    }
}

impl HabitRepository for MemoryRepository {
    fn load_habits(&self) -> Result<Vec<Habit>> {
        Ok(self.habits.read().clone())
    }

    fn save_habits(&self, habits: &[Habit]) -> Result<()> {
        *self.habits.write() = habits.to_vec();
        Ok(())
    }
}
