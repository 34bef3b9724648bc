use serde::Serialize;

use crate::activity::is_active_on;
use crate::calendar::DateKey;
use crate::cycle::{cycle_start, LOOKBACK_DAYS};
use crate::habit::Habit;
use crate::schedule::is_scheduled;
use crate::status::{classify, classify_carried, HabitStatus};

/// A habit shown on a day view, with the occurrence it was classified against.
#[derive(Debug, Clone, Serialize)]
pub struct DayEntry<'a> {
    pub habit: &'a Habit,
    pub key: DateKey,
    pub status: HabitStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayProgress {
    pub progress_earned: f64,
    pub progress_total: u32,
    pub progress_skipped: u32,
    pub points_earned: u32,
    pub points_possible: u32,
}

impl DayProgress {
    pub fn ratio(&self) -> f64 {
        if self.progress_total == 0 {
            0.0
        } else {
            self.progress_earned / f64::from(self.progress_total)
        }
    }
}

/// Habits visible on `viewing`, each classified in input order.
///
/// On today's view a keep-until-done habit is keyed to the occurrence it
/// carries, so leftover work reads as active rather than missed. Snooze and
/// skip still apply to today itself.
pub fn day_view(habits: &[Habit], viewing: DateKey, today: DateKey) -> Vec<DayEntry<'_>> {
    let viewing_today = viewing == today;
    habits
        .iter()
        .filter(|habit| is_active_on(habit, viewing, today))
        .map(|habit| {
            if viewing_today && habit.keep_until {
                let key = cycle_start(habit, viewing);
                return DayEntry {
                    habit,
                    key,
                    status: classify_carried(habit, key, today),
                };
            }
            DayEntry {
                habit,
                key: viewing,
                status: classify(habit, viewing, viewing_today, today),
            }
        })
        .collect()
}

pub fn day_progress(entries: &[DayEntry<'_>]) -> DayProgress {
    let mut progress = DayProgress::default();
    for entry in entries {
        if entry.status.is_set_aside() {
            progress.progress_skipped += 1;
            continue;
        }
        progress.progress_total += 1;
        progress.points_possible += entry.habit.reward_points;
        progress.progress_earned += credit(entry);
        if entry.status == HabitStatus::Completed {
            progress.points_earned += entry.habit.reward_points;
        }
    }
    progress
}

fn credit(entry: &DayEntry<'_>) -> f64 {
    let habit = entry.habit;
    let checked = entry.status == HabitStatus::Completed && habit.completion_history.contains(&entry.key);
    if checked {
        return 1.0;
    }
    if habit.increment {
        return (habit.amount_on(entry.key) / habit.goal()).clamp(0.0, 1.0);
    }
    if entry.status == HabitStatus::Completed {
        1.0
    } else {
        0.0
    }
}

/// Consecutive habit-days, ending today, on which at least one habit was
/// checked off. Zero when nothing was checked off today.
pub fn app_streak(habits: &[Habit], today: DateKey) -> u32 {
    let mut streak = 0;
    for offset in 0..LOOKBACK_DAYS {
        let day = today.sub_days(offset);
        if !habits.iter().any(|habit| habit.completion_history.contains(&day)) {
            break;
        }
        streak += 1;
    }
    streak
}

/// Completed occurrences in a row for one habit, counting back from today.
///
/// Today's still-open occurrence and skipped days are passed over without
/// breaking the run.
pub fn habit_streak(habit: &Habit, today: DateKey) -> u32 {
    let mut streak = 0;
    for offset in 0..LOOKBACK_DAYS {
        let day = today.sub_days(offset);
        if day < habit.start_date {
            break;
        }
        if !is_scheduled(habit, day) {
            continue;
        }
        if habit.is_completed_on(day) {
            streak += 1;
        } else if offset != 0 && !habit.is_skipped_on(day) {
            break;
        }
    }
    streak
}
