use chrono::NaiveDateTime;
use habit_core::{
    app_streak, cycle_start, day_progress, day_view, habit_day_key, habit_streak, DateKey, DayProgress, Habit,
    HabitId, HabitStatus, ResetTime,
};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::instrument;

use crate::error::{Result, SyncError};
use crate::reconcile::reconcile_all;
use crate::repository::{HabitRepository, MemoryRepository};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportEntry {
    pub habit: Habit,
    pub key: DateKey,
    pub status: HabitStatus,
    pub streak: u32,
}

/// Everything a day screen needs, computed from one snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayReport {
    pub viewing: DateKey,
    pub today: DateKey,
    pub entries: Vec<ReportEntry>,
    pub progress: DayProgress,
    pub app_streak: u32,
}

/// Holds the last-known-good habit snapshot and applies user actions to it.
///
/// Every mutation is applied to a copy and persisted before it replaces the
/// snapshot, so a failed save leaves readers on the previous state.
pub struct HabitService {
    repository: Box<dyn HabitRepository>,
    reset: ResetTime,
    habits: RwLock<Vec<Habit>>,
}

pub struct HabitServiceBuilder {
    repository: Option<Box<dyn HabitRepository>>,
    reset: ResetTime,
}

impl HabitServiceBuilder {
    pub fn new() -> Self {
        Self {
            repository: None,
            reset: ResetTime::default(),
        }
    }

    pub fn with_repository(mut self, repository: Box<dyn HabitRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_reset_time(mut self, reset: ResetTime) -> Self {
        self.reset = reset;
        self
    }

    pub fn build(self) -> Result<HabitService> {
        let service = HabitService {
            repository: self
                .repository
                .unwrap_or_else(|| Box::new(MemoryRepository::default())),
            reset: self.reset,
            habits: RwLock::new(Vec::new()),
        };
        service.reload()?;
        Ok(service)
    }
}

impl Default for HabitServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HabitService {
    pub fn builder() -> HabitServiceBuilder {
        HabitServiceBuilder::new()
    }

    pub fn reset_time(&self) -> ResetTime {
        self.reset
    }

    /// The habit-day that `now` (local wall clock) falls in.
    pub fn today(&self, now: NaiveDateTime) -> DateKey {
        habit_day_key(now, self.reset)
    }

    pub fn reload(&self) -> Result<()> {
        match self.repository.load_habits() {
            Ok(habits) => {
                tracing::info!(count = habits.len(), "habit snapshot loaded");
                *self.habits.write() = habits;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%err, "reload failed, keeping last snapshot");
                Err(err)
            }
        }
    }

    pub fn habits(&self) -> Vec<Habit> {
        self.habits.read().clone()
    }

    pub fn habit(&self, id: &HabitId) -> Result<Habit> {
        self.habits
            .read()
            .iter()
            .find(|habit| &habit.id == id)
            .cloned()
            .ok_or_else(|| SyncError::UnknownHabit(id.clone()))
    }

    pub fn day_report(&self, viewing: DateKey, now: NaiveDateTime) -> DayReport {
        let today = self.today(now);
        let habits = self.habits.read();
        let entries = day_view(&habits, viewing, today);
        let progress = day_progress(&entries);
        let entries = entries
            .into_iter()
            .map(|entry| ReportEntry {
                habit: entry.habit.clone(),
                key: entry.key,
                status: entry.status,
                streak: habit_streak(entry.habit, today),
            })
            .collect();
        DayReport {
            viewing,
            today,
            entries,
            progress,
            app_streak: app_streak(&habits, today),
        }
    }

    pub fn app_streak(&self, now: NaiveDateTime) -> u32 {
        app_streak(&self.habits.read(), self.today(now))
    }

    /// Check or uncheck the occurrence shown on `viewing`.
    ///
    /// On today's view the action lands on the habit's open cycle, so
    /// finishing carried-over work closes the day it was carried from.
    #[instrument(skip(self), fields(habit = %id))]
    pub fn toggle_completion(&self, id: &HabitId, viewing: DateKey, now: NaiveDateTime) -> Result<Habit> {
        let today = self.today(now);
        self.mutate(id, |habit| {
            let target = attribution_key(habit, viewing, today);
            ensure_not_before_start(habit, target)?;
            if !habit.completion_history.remove(&target) {
                habit.completion_history.insert(target);
            }
            tracing::debug!(%target, done = habit.completion_history.contains(&target), "toggled completion");
            Ok(())
        })
    }

    /// Add `amount` (negative to undo) to the occurrence shown on `viewing`.
    #[instrument(skip(self), fields(habit = %id))]
    pub fn log_increment(
        &self,
        id: &HabitId,
        amount: f64,
        viewing: DateKey,
        now: NaiveDateTime,
    ) -> Result<Habit> {
        let today = self.today(now);
        self.mutate(id, |habit| {
            let target = attribution_key(habit, viewing, today);
            ensure_not_before_start(habit, target)?;
            let total = habit.amount_on(target) + amount;
            if total > 0.0 {
                habit.increment_history.insert(target, total);
            } else {
                habit.increment_history.remove(&target);
            }
            tracing::debug!(%target, total, goal = habit.goal(), "logged increment");
            Ok(())
        })
    }

    #[instrument(skip(self), fields(habit = %id))]
    pub fn skip(&self, id: &HabitId, key: DateKey) -> Result<Habit> {
        self.mutate(id, |habit| {
            ensure_not_before_start(habit, key)?;
            habit.skipped_dates.insert(key);
            Ok(())
        })
    }

    #[instrument(skip(self), fields(habit = %id))]
    pub fn unskip(&self, id: &HabitId, key: DateKey) -> Result<Habit> {
        self.mutate(id, |habit| {
            habit.skipped_dates.remove(&key);
            Ok(())
        })
    }

    #[instrument(skip(self), fields(habit = %id))]
    pub fn snooze(&self, id: &HabitId, until: DateKey) -> Result<Habit> {
        self.mutate(id, |habit| {
            habit.snoozed_until = Some(until);
            Ok(())
        })
    }

    #[instrument(skip(self), fields(habit = %id))]
    pub fn clear_snooze(&self, id: &HabitId) -> Result<Habit> {
        self.mutate(id, |habit| {
            habit.snoozed_until = None;
            Ok(())
        })
    }

    /// Fold a refetched server list into the snapshot and persist it.
    #[instrument(skip_all, fields(count = remote.len()))]
    pub fn apply_remote(&self, remote: Vec<Habit>) -> Result<()> {
        let mut guard = self.habits.write();
        let merged = reconcile_all(&guard, remote);
        self.repository.save_habits(&merged).map_err(|err| {
            tracing::warn!(%err, "failed to persist reconciled habits");
            err
        })?;
        *guard = merged;
        Ok(())
    }

    fn mutate<F>(&self, id: &HabitId, apply: F) -> Result<Habit>
    where
        F: FnOnce(&mut Habit) -> Result<()>,
    {
        let mut guard = self.habits.write();
        let mut next = guard.clone();
        let habit = next
            .iter_mut()
            .find(|habit| &habit.id == id)
            .ok_or_else(|| SyncError::UnknownHabit(id.clone()))?;
        apply(habit)?;
        let updated = habit.clone();
        self.repository.save_habits(&next).map_err(|err| {
            tracing::warn!(%err, "failed to persist habit change, snapshot unchanged");
            err
        })?;
        *guard = next;
        Ok(updated)
    }
}

fn attribution_key(habit: &Habit, viewing: DateKey, today: DateKey) -> DateKey {
    if viewing == today {
        cycle_start(habit, today)
    } else {
        viewing
    }
}

fn ensure_not_before_start(habit: &Habit, date: DateKey) -> Result<()> {
    if date < habit.start_date {
        return Err(SyncError::BeforeStart {
            id: habit.id.clone(),
            start: habit.start_date,
            date,
        });
    }
    Ok(())
}
