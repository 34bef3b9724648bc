use crate::calendar::DateKey;
use crate::cycle::cycle_start;
use crate::habit::Habit;
use crate::schedule::is_scheduled;

/// Whether the habit belongs on the view for `viewing`, given the real
/// current habit-day `today`.
///
/// Carried-over work only ever shows up on `today`. Browsing another date
/// shows what was scheduled there, never a duplicate of a carried occurrence.
pub fn is_active_on(habit: &Habit, viewing: DateKey, today: DateKey) -> bool {
    if viewing < habit.start_date {
        return false;
    }
    if habit.snoozed_until.is_some_and(|until| viewing < until) {
        return false;
    }

    if habit.is_one_time() {
        if !habit.keep_until {
            return viewing == habit.start_date;
        }
        let start = cycle_start(habit, viewing);
        if habit.is_completed_on(start) {
            return viewing == start;
        }
        return viewing == habit.start_date || (viewing == today && viewing > habit.start_date);
    }

    if habit.keep_until {
        let start = cycle_start(habit, viewing);
        if start < viewing && !habit.is_completed_on(start) {
            return viewing == today;
        }
    }

    is_scheduled(habit, viewing)
}
