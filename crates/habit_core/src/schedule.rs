use chrono::{Datelike, NaiveDate};

use crate::calendar::DateKey;
use crate::habit::{Frequency, Habit};

/// Whether `key` is a nominal occurrence of the habit, ignoring completion
/// and snooze state.
///
/// Monthly habits match on the start date's day-of-month only; a habit
/// started on the 31st never fires in a shorter month.
pub fn is_scheduled(habit: &Habit, key: DateKey) -> bool {
    if key < habit.start_date {
        return false;
    }
    match habit.frequency {
        Frequency::None => key == habit.start_date,
        Frequency::Daily => true,
        Frequency::Weekly => habit.occurs_on(key.weekday()),
        Frequency::Monthly => key.day_of_month() == habit.start_date.day_of_month(),
    }
}

/// Most recent scheduled day on or before `on_or_before`, never earlier than
/// the start date. Returns `None` when nothing in range is scheduled.
pub fn most_recent_occurrence(habit: &Habit, on_or_before: DateKey) -> Option<DateKey> {
    if on_or_before < habit.start_date {
        return None;
    }
    match habit.frequency {
        Frequency::None => Some(habit.start_date),
        Frequency::Daily => Some(on_or_before),
        Frequency::Weekly => (0..7)
            .map(|offset| on_or_before.sub_days(offset))
            .take_while(|day| *day >= habit.start_date)
            .find(|day| is_scheduled(habit, *day)),
        Frequency::Monthly => most_recent_monthly(habit, on_or_before),
    }
}

fn most_recent_monthly(habit: &Habit, on_or_before: DateKey) -> Option<DateKey> {
    let target_day = habit.start_date.day_of_month();
    let date = on_or_before.date();
    let (mut year, mut month) = (date.year(), date.month());
    if date.day() < target_day {
        (year, month) = previous_month(year, month);
    }
    // every day-of-month up to 31 exists somewhere in any 12 consecutive months
    for _ in 0..12 {
        if let Some(candidate) = NaiveDate::from_ymd_opt(year, month, target_day) {
            let candidate = DateKey::new(candidate);
            return (candidate >= habit.start_date).then_some(candidate);
        }
        (year, month) = previous_month(year, month);
    }
    None
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn key(raw: &str) -> DateKey {
        raw.parse().unwrap()
    }

    #[test]
    fn one_time_habit_only_on_start_date() {
        let habit = Habit::new("once", "File taxes", key("2024-03-10"));
        assert!(is_scheduled(&habit, key("2024-03-10")));
        assert!(!is_scheduled(&habit, key("2024-03-09")));
        assert!(!is_scheduled(&habit, key("2024-03-11")));
    }

    #[test]
    fn daily_habit_starts_on_start_date() {
        let habit = Habit::new("daily", "Meditate", key("2024-03-10")).with_frequency(Frequency::Daily);
        assert!(!is_scheduled(&habit, key("2024-03-09")));
        assert!(is_scheduled(&habit, key("2024-03-10")));
        assert!(is_scheduled(&habit, key("2025-07-04")));
    }

    #[test]
    fn weekly_habit_fires_only_on_selected_days() {
        // 2024-03-11 is a Monday
        let start = key("2024-03-11");
        let habit = Habit::new("weekly", "Gym", start)
            .with_frequency(Frequency::Weekly)
            .with_days([Weekday::Mon, Weekday::Wed]);
        for offset in 0..(8 * 7) {
            let day = start.add_days(offset);
            let expected = matches!(day.weekday(), Weekday::Mon | Weekday::Wed);
            assert_eq!(is_scheduled(&habit, day), expected, "{day}");
        }
        assert!(!is_scheduled(&habit, key("2024-03-06")), "Wednesday before start");
    }

    #[test]
    fn weekly_habit_without_days_never_fires() {
        let habit = Habit::new("weekly", "Gym", key("2024-03-11")).with_frequency(Frequency::Weekly);
        assert!((0..14).all(|offset| !is_scheduled(&habit, key("2024-03-11").add_days(offset))));
        assert_eq!(most_recent_occurrence(&habit, key("2024-03-30")), None);
    }

    #[test]
    fn monthly_habit_on_31st_skips_short_months() {
        let habit = Habit::new("monthly", "Budget", key("2024-01-31")).with_frequency(Frequency::Monthly);
        let mut fired = Vec::new();
        let mut day = key("2024-01-01");
        while day <= key("2024-12-31") {
            if is_scheduled(&habit, day) {
                fired.push(day.to_string());
            }
            day = day.add_days(1);
        }
        assert_eq!(
            fired,
            vec![
                "2024-01-31", "2024-03-31", "2024-05-31", "2024-07-31", "2024-08-31",
                "2024-10-31", "2024-12-31",
            ]
        );
    }

    #[test]
    fn monthly_habit_on_29th_skips_non_leap_february() {
        let habit = Habit::new("monthly", "Review", key("2023-01-29")).with_frequency(Frequency::Monthly);
        assert!(!(1..=28).any(|d| is_scheduled(&habit, DateKey::from_ymd(2023, 2, d).unwrap())));
        assert!(is_scheduled(&habit, key("2024-02-29")));
    }

    #[test]
    fn most_recent_weekly_occurrence_scans_back_a_week() {
        let habit = Habit::new("weekly", "Gym", key("2024-03-11"))
            .with_frequency(Frequency::Weekly)
            .with_days([Weekday::Mon, Weekday::Wed]);
        assert_eq!(most_recent_occurrence(&habit, key("2024-03-17")), Some(key("2024-03-13")));
        assert_eq!(most_recent_occurrence(&habit, key("2024-03-13")), Some(key("2024-03-13")));
        assert_eq!(most_recent_occurrence(&habit, key("2024-03-12")), Some(key("2024-03-11")));
        assert_eq!(most_recent_occurrence(&habit, key("2024-03-10")), None);
    }

    #[test]
    fn most_recent_monthly_occurrence_steps_into_previous_month() {
        let habit = Habit::new("monthly", "Rent", key("2024-01-15")).with_frequency(Frequency::Monthly);
        assert_eq!(most_recent_occurrence(&habit, key("2024-03-20")), Some(key("2024-03-15")));
        assert_eq!(most_recent_occurrence(&habit, key("2024-03-10")), Some(key("2024-02-15")));
        assert_eq!(most_recent_occurrence(&habit, key("2024-01-20")), Some(key("2024-01-15")));

        let end_of_month = Habit::new("monthly", "Backup", key("2024-01-31")).with_frequency(Frequency::Monthly);
        assert_eq!(
            most_recent_occurrence(&end_of_month, key("2024-05-10")),
            Some(key("2024-03-31"))
        );
    }

    #[test]
    fn one_time_occurrence_is_its_start_date() {
        let habit = Habit::new("once", "Dentist", key("2024-03-10"));
        assert_eq!(most_recent_occurrence(&habit, key("2024-04-01")), Some(key("2024-03-10")));
        assert_eq!(most_recent_occurrence(&habit, key("2024-03-01")), None);
    }
}
