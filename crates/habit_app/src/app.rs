use std::fmt::{self, Write as _};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use habit_core::{DateKey, HabitStatus, ResetTime};
use habit_sync::{DayReport, HabitService, JsonFileRepository};
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub(crate) data_path: PathBuf,
    pub(crate) reset: ResetTime,
    pub(crate) view_date: Option<DateKey>,
    pub(crate) json: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_lookup(|name| std::env::var(name).ok()))
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup("HABIT_DATA_PATH") {
            if !path.trim().is_empty() {
                config.data_path = PathBuf::from(path.trim());
            }
        }
        if let Some(raw) = lookup("HABIT_RESET_TIME") {
            match raw.parse::<ResetTime>() {
                Ok(reset) => config.reset = reset,
                Err(err) => warn!(%err, "ignoring HABIT_RESET_TIME"),
            }
        }
        if let Some(raw) = lookup("HABIT_VIEW_DATE") {
            match raw.parse::<DateKey>() {
                Ok(date) => config.view_date = Some(date),
                Err(err) => warn!(%err, "ignoring HABIT_VIEW_DATE"),
            }
        }
        if let Some(raw) = lookup("HABIT_OUTPUT") {
            config.json = raw.trim().eq_ignore_ascii_case("json");
        }
        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("habits.json"),
            reset: ResetTime::default(),
            view_date: None,
            json: false,
        }
    }
}

pub fn run(config: AppConfig) -> Result<()> {
    info!(
        path = %config.data_path.display(),
        reset = %config.reset,
        "loading habits"
    );
    let service = HabitService::builder()
        .with_repository(Box::new(JsonFileRepository::new(&config.data_path)))
        .with_reset_time(config.reset)
        .build()
        .with_context(|| format!("failed to load habits from {}", config.data_path.display()))?;

    let now = Local::now().naive_local();
    let viewing = config.view_date.unwrap_or_else(|| service.today(now));
    let report = service.day_report(viewing, now);

    if config.json {
        let text = serde_json::to_string_pretty(&report).context("failed to encode day report")?;
        println!("{text}");
    } else {
        let text = render_report(&report).context("failed to render day report")?;
        print!("{text}");
    }
    Ok(())
}

pub(crate) fn render_report(report: &DayReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    if report.viewing == report.today {
        writeln!(out, "Today ({})", report.viewing)?;
    } else {
        writeln!(out, "{}", report.viewing)?;
    }

    if report.entries.is_empty() {
        writeln!(out, "  nothing scheduled")?;
    }
    for entry in &report.entries {
        let habit = &entry.habit;
        write!(out, "  {} {}", status_marker(entry.status), display_title(habit))?;
        if habit.increment {
            write!(out, " ({}/{})", habit.amount_on(entry.key), habit.goal())?;
        }
        if entry.key != report.viewing {
            write!(out, " [from {}]", entry.key)?;
        }
        if entry.streak > 1 {
            write!(out, " x{}", entry.streak)?;
        }
        writeln!(out)?;
    }

    let progress = &report.progress;
    writeln!(
        out,
        "Progress: {:.1}/{} ({} set aside), {}/{} points",
        progress.progress_earned,
        progress.progress_total,
        progress.progress_skipped,
        progress.points_earned,
        progress.points_possible
    )?;
    writeln!(out, "Streak: {} day(s)", report.app_streak)?;
    Ok(out)
}

fn display_title(habit: &habit_core::Habit) -> &str {
    if habit.title.is_empty() {
        habit.id.as_str()
    } else {
        &habit.title
    }
}

fn status_marker(status: HabitStatus) -> &'static str {
    match status {
        HabitStatus::Completed => "[x]",
        HabitStatus::Skipped => "[-]",
        HabitStatus::Snoozed => "[z]",
        HabitStatus::Active => "[ ]",
        HabitStatus::Missed => "[!]",
    }
}
