pub mod error;
pub mod reconcile;
pub mod repository;
pub mod service;

pub use crate::error::{Result, SyncError};
pub use crate::reconcile::{reconcile, reconcile_all};
pub use crate::repository::{HabitRepository, JsonFileRepository, MemoryRepository};
pub use crate::service::{DayReport, HabitService, HabitServiceBuilder, ReportEntry};
