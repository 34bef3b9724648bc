//! Habit scheduling, carry-over and streak engine.
//!
//! Everything here is a pure function over a borrowed snapshot of habit
//! records. Converting the wall clock into a habit-day happens once, through
//! [`habit_day_key`]; the rest of the crate works on [`DateKey`]s.

pub mod activity;
pub mod calendar;
pub mod cycle;
pub mod habit;
pub mod progress;
pub mod schedule;
pub mod status;

pub use crate::activity::is_active_on;
pub use crate::calendar::{habit_day_key, habit_day_key_at, DateKey, DateKeyError, ResetTime};
pub use crate::cycle::{cycle_start, LOOKBACK_DAYS};
pub use crate::habit::{Frequency, Habit, HabitId};
pub use crate::progress::{app_streak, day_progress, day_view, habit_streak, DayEntry, DayProgress};
pub use crate::schedule::{is_scheduled, most_recent_occurrence};
pub use crate::status::{classify, classify_carried, HabitStatus};
