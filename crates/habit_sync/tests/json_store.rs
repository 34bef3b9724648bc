use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use habit_core::{DateKey, HabitId, HabitStatus, ResetTime};
use habit_sync::{HabitService, JsonFileRepository};
use tempfile::tempdir;

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, contents).expect("write fixture");
}

fn key(raw: &str) -> DateKey {
    raw.parse().expect("date key")
}

fn at(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M").expect("timestamp")
}

const FIXTURE: &str = r#"[
  {
    "id": "water",
    "title": "Drink water",
    "startDate": "2024-03-01",
    "frequency": "Daily",
    "increment": true,
    "incrementGoal": 8,
    "incrementHistory": { "2024-03-09": 8 },
    "rewardPoints": 2
  },
  {
    "id": "gym",
    "title": "Gym",
    "startDate": "2024-03-04",
    "frequency": "Weekly",
    "selectedDays": ["Monday", "Wednesday"],
    "keepUntil": true,
    "completionHistory": ["2024-03-04"]
  },
  {
    "id": "taxes",
    "title": "File taxes",
    "startDate": "2024-03-08",
    "frequency": "sometimes",
    "keepUntil": true,
    "rewardPoints": 10
  },
  {
    "id": "budget",
    "title": "Monthly budget",
    "startDate": "2024-01-31",
    "frequency": "Monthly",
    "snoozedUntil": "2024-03-31"
  }
]"#;

#[test]
fn day_report_and_mutations_round_trip_through_json() {
    let temp = tempdir().expect("tempdir");
    let store = temp.path().join("data").join("habits.json");
    write_file(&store, FIXTURE);

    // 02:30 on the 11th still belongs to Sunday the 10th with a 03:00 reset
    let reset = ResetTime::new(3, 0).expect("reset time");
    let now = at("2024-03-11 02:30");
    let service = HabitService::builder()
        .with_repository(Box::new(JsonFileRepository::new(&store)))
        .with_reset_time(reset)
        .build()
        .expect("build service");
    let today = service.today(now);
    assert_eq!(today, key("2024-03-10"));

    let report = service.day_report(today, now);
    let shown: Vec<(&str, HabitStatus)> = report
        .entries
        .iter()
        .map(|entry| (entry.habit.id.as_str(), entry.status))
        .collect();
    assert_eq!(
        shown,
        vec![
            ("water", HabitStatus::Active),
            ("gym", HabitStatus::Active),
            ("taxes", HabitStatus::Active),
        ]
    );
    let gym = &report.entries[1];
    assert_eq!(gym.key, key("2024-03-06"), "Wednesday's session carried to Sunday");
    assert_eq!(report.entries[0].streak, 1);
    assert_eq!(report.progress.progress_total, 3);
    assert_eq!(report.app_streak, 0);

    service
        .toggle_completion(&HabitId::from("taxes"), today, now)
        .expect("complete taxes");
    service
        .log_increment(&HabitId::from("water"), 8.0, today, now)
        .expect("log water");

    let reopened = HabitService::builder()
        .with_repository(Box::new(JsonFileRepository::new(&store)))
        .with_reset_time(reset)
        .build()
        .expect("reopen service");
    let taxes = reopened.habit(&HabitId::from("taxes")).expect("taxes");
    assert!(taxes.completion_history.contains(&key("2024-03-08")));

    let report = reopened.day_report(today, now);
    let ids: Vec<&str> = report.entries.iter().map(|entry| entry.habit.id.as_str()).collect();
    assert_eq!(ids, vec!["water", "gym"], "completed one-time goal stays on its own day");
    assert_eq!(report.entries[0].status, HabitStatus::Completed);
    assert_eq!(report.entries[0].streak, 2);
    assert_eq!(report.progress.points_earned, 2);

    let history = reopened.day_report(key("2024-03-08"), now);
    assert!(history
        .entries
        .iter()
        .any(|entry| entry.habit.id.as_str() == "taxes" && entry.status == HabitStatus::Completed));
}
