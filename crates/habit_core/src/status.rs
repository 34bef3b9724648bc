use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calendar::DateKey;
use crate::habit::Habit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitStatus {
    Completed,
    Skipped,
    Snoozed,
    Active,
    Missed,
}

impl HabitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Skipped => "skipped",
            Self::Snoozed => "snoozed",
            Self::Active => "active",
            Self::Missed => "missed",
        }
    }

    /// Skipped and snoozed habits are left out of progress totals.
    pub fn is_set_aside(&self) -> bool {
        matches!(self, Self::Skipped | Self::Snoozed)
    }
}

impl fmt::Display for HabitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a habit already known to be active on `key`.
///
/// `today` must be a habit-day key derived with the reset time, not the
/// naive calendar date, or the missed check is off by one around the reset.
pub fn classify(habit: &Habit, key: DateKey, is_viewing_today: bool, today: DateKey) -> HabitStatus {
    if habit.snoozed_until.is_some_and(|until| key <= until) {
        return HabitStatus::Snoozed;
    }
    if habit.completion_history.contains(&key) || habit.increment_goal_reached(key) {
        return HabitStatus::Completed;
    }
    if habit.is_skipped_on(key) {
        return HabitStatus::Skipped;
    }
    if !is_viewing_today && key < today {
        return HabitStatus::Missed;
    }
    HabitStatus::Active
}

/// Classify a keep-until-done habit on today's view, where the open
/// occurrence `cycle_key` may predate `today`.
///
/// Completion is read from the carried occurrence; snooze and skip are read
/// from `today`, since they set aside a day rather than an occurrence.
pub fn classify_carried(habit: &Habit, cycle_key: DateKey, today: DateKey) -> HabitStatus {
    if habit.snoozed_until.is_some_and(|until| today <= until) {
        return HabitStatus::Snoozed;
    }
    if habit.completion_history.contains(&cycle_key) || habit.increment_goal_reached(cycle_key) {
        return HabitStatus::Completed;
    }
    if habit.is_skipped_on(today) {
        return HabitStatus::Skipped;
    }
    HabitStatus::Active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::Frequency;

    fn key(raw: &str) -> DateKey {
        raw.parse().unwrap()
    }

    fn daily() -> Habit {
        Habit::new("daily", "Read", key("2024-03-01")).with_frequency(Frequency::Daily)
    }

    #[test]
    fn completion_outranks_missed() {
        let mut habit = daily();
        habit.completion_history.insert(key("2024-03-05"));
        let status = classify(&habit, key("2024-03-05"), false, key("2024-03-10"));
        assert_eq!(status, HabitStatus::Completed);
    }

    #[test]
    fn past_incomplete_day_is_missed() {
        let habit = daily();
        assert_eq!(
            classify(&habit, key("2024-03-05"), false, key("2024-03-10")),
            HabitStatus::Missed
        );
        assert_eq!(
            classify(&habit, key("2024-03-10"), true, key("2024-03-10")),
            HabitStatus::Active
        );
    }

    #[test]
    fn viewing_today_is_never_missed() {
        let habit = daily();
        // a carried-over occurrence keyed in the past but shown on today's view
        assert_eq!(
            classify(&habit, key("2024-03-08"), true, key("2024-03-10")),
            HabitStatus::Active
        );
    }

    #[test]
    fn partial_increment_is_still_active() {
        let mut habit = daily().with_increment_goal(10.0);
        habit.increment_history.insert(key("2024-03-10"), 4.0);
        assert_eq!(
            classify(&habit, key("2024-03-10"), true, key("2024-03-10")),
            HabitStatus::Active
        );
        habit.increment_history.insert(key("2024-03-10"), 10.0);
        assert_eq!(
            classify(&habit, key("2024-03-10"), true, key("2024-03-10")),
            HabitStatus::Completed
        );
    }

    #[test]
    fn snooze_wins_through_its_last_day() {
        let mut habit = daily();
        habit.snoozed_until = Some(key("2024-03-10"));
        habit.completion_history.insert(key("2024-03-10"));
        assert_eq!(
            classify(&habit, key("2024-03-10"), true, key("2024-03-10")),
            HabitStatus::Snoozed
        );
        assert_eq!(
            classify(&habit, key("2024-03-11"), false, key("2024-03-10")),
            HabitStatus::Active
        );
    }

    #[test]
    fn skip_outranks_missed_but_not_completion() {
        let mut habit = daily();
        habit.skipped_dates.insert(key("2024-03-05"));
        assert_eq!(
            classify(&habit, key("2024-03-05"), false, key("2024-03-10")),
            HabitStatus::Skipped
        );
        habit.completion_history.insert(key("2024-03-05"));
        assert_eq!(
            classify(&habit, key("2024-03-05"), false, key("2024-03-10")),
            HabitStatus::Completed
        );
    }

    #[test]
    fn carried_occurrence_reads_snooze_and_skip_from_today() {
        let mut habit = daily();
        habit.keep_until = true;
        habit.snoozed_until = Some(key("2024-03-05"));
        habit.skipped_dates.insert(key("2024-03-01"));
        let today = key("2024-03-10");
        assert_eq!(classify_carried(&habit, key("2024-03-01"), today), HabitStatus::Active);

        habit.snoozed_until = Some(today);
        assert_eq!(classify_carried(&habit, key("2024-03-01"), today), HabitStatus::Snoozed);

        habit.snoozed_until = None;
        habit.skipped_dates.insert(today);
        assert_eq!(classify_carried(&habit, key("2024-03-01"), today), HabitStatus::Skipped);

        habit.completion_history.insert(key("2024-03-01"));
        assert_eq!(classify_carried(&habit, key("2024-03-01"), today), HabitStatus::Completed);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&HabitStatus::Missed).unwrap(), "\"missed\"");
    }
}
