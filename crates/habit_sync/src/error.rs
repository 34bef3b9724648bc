use std::path::PathBuf;

use habit_core::{DateKey, HabitId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("unable to access habit store at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("habit store at {} is not valid habit JSON", path.display())]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown habit `{0}`")]
    UnknownHabit(HabitId),
    #[error("habit `{id}` starts on {start}, cannot record {date}")]
    BeforeStart {
        id: HabitId,
        start: DateKey,
        date: DateKey,
    },
}

pub type Result<T> = std::result::Result<T, SyncError>;
