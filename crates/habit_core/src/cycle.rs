use crate::calendar::DateKey;
use crate::habit::Habit;
use crate::schedule::{is_scheduled, most_recent_occurrence};

/// How far back any backward day scan is allowed to walk.
pub const LOOKBACK_DAYS: i64 = 365;

/// The occurrence that a completion or increment made while viewing
/// `viewing` should be attributed to.
///
/// Keep-until-done habits resolve to the oldest scheduled day that is still
/// open, walking back until the most recent completed occurrence closes the
/// scan. Everything else resolves to the latest scheduled day.
pub fn cycle_start(habit: &Habit, viewing: DateKey) -> DateKey {
    if habit.is_one_time() {
        return habit.start_date;
    }
    if habit.keep_until {
        if let Some(open) = oldest_open_occurrence(habit, viewing) {
            return open;
        }
    }
    most_recent_occurrence(habit, viewing).unwrap_or_else(|| viewing.max(habit.start_date))
}

fn oldest_open_occurrence(habit: &Habit, viewing: DateKey) -> Option<DateKey> {
    let mut oldest = None;
    for offset in 0..LOOKBACK_DAYS {
        let day = viewing.sub_days(offset);
        if day < habit.start_date {
            break;
        }
        if !is_scheduled(habit, day) {
            continue;
        }
        if habit.is_completed_on(day) {
            break;
        }
        oldest = Some(day);
    }
    oldest
}
