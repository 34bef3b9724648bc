use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::Weekday;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::calendar::DateKey;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HabitId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for HabitId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Recurrence rule. `None` is a one-time goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Frequency {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Unknown names fall back to a one-time goal.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" => Frequency::Daily,
            "weekly" => Frequency::Weekly,
            "monthly" => Frequency::Monthly,
            "none" | "" => Frequency::None,
            other => {
                tracing::debug!(frequency = other, "unrecognised frequency, treating as one-time");
                Frequency::None
            }
        }
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FrequencyVisitor;

        impl<'de> Visitor<'de> for FrequencyVisitor {
            type Value = Frequency;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a frequency name")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Frequency, E> {
                Ok(Frequency::parse_lenient(v))
            }

            fn visit_bool<E: de::Error>(self, _: bool) -> Result<Frequency, E> {
                Ok(Frequency::None)
            }

            fn visit_i64<E: de::Error>(self, _: i64) -> Result<Frequency, E> {
                Ok(Frequency::None)
            }

            fn visit_u64<E: de::Error>(self, _: u64) -> Result<Frequency, E> {
                Ok(Frequency::None)
            }

            fn visit_f64<E: de::Error>(self, _: f64) -> Result<Frequency, E> {
                Ok(Frequency::None)
            }

            fn visit_none<E: de::Error>(self) -> Result<Frequency, E> {
                Ok(Frequency::None)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Frequency, E> {
                Ok(Frequency::None)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Frequency, D::Error> {
                d.deserialize_any(self)
            }
        }

        deserializer.deserialize_any(FrequencyVisitor)
    }
}

/// A habit record as materialized from the backend.
///
/// The engine only reads these; every mutation happens in the persistence
/// layer, which hands the engine a fresh snapshot afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    #[serde(default)]
    pub title: String,
    pub start_date: DateKey,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default, with = "weekday_names")]
    pub selected_days: Vec<Weekday>,
    #[serde(default)]
    pub keep_until: bool,
    #[serde(default)]
    pub increment: bool,
    #[serde(default)]
    pub increment_goal: Option<f64>,
    #[serde(default)]
    pub increment_history: BTreeMap<DateKey, f64>,
    #[serde(default)]
    pub completion_history: BTreeSet<DateKey>,
    #[serde(default)]
    pub skipped_dates: BTreeSet<DateKey>,
    #[serde(default)]
    pub snoozed_until: Option<DateKey>,
    #[serde(default)]
    pub reward_points: u32,
}

impl Habit {
    pub fn new(id: impl Into<HabitId>, title: impl Into<String>, start_date: DateKey) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start_date,
            frequency: Frequency::None,
            selected_days: Vec::new(),
            keep_until: false,
            increment: false,
            increment_goal: None,
            increment_history: BTreeMap::new(),
            completion_history: BTreeSet::new(),
            skipped_dates: BTreeSet::new(),
            snoozed_until: None,
            reward_points: 0,
        }
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_days(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.selected_days = days.into_iter().collect();
        self
    }

    pub fn keeping_until_done(mut self) -> Self {
        self.keep_until = true;
        self
    }

    pub fn with_increment_goal(mut self, goal: f64) -> Self {
        self.increment = true;
        self.increment_goal = Some(goal);
        self
    }

    pub fn with_reward_points(mut self, points: u32) -> Self {
        self.reward_points = points;
        self
    }

    pub fn is_one_time(&self) -> bool {
        self.frequency == Frequency::None
    }

    pub fn occurs_on(&self, weekday: Weekday) -> bool {
        self.selected_days.contains(&weekday)
    }

    /// Effective increment target; unset or non-positive goals count as 1.
    pub fn goal(&self) -> f64 {
        match self.increment_goal {
            Some(goal) if goal > 0.0 => goal,
            _ => 1.0,
        }
    }

    pub fn amount_on(&self, key: DateKey) -> f64 {
        self.increment_history.get(&key).copied().unwrap_or(0.0)
    }

    pub fn increment_goal_reached(&self, key: DateKey) -> bool {
        self.increment && self.amount_on(key) >= self.goal()
    }

    /// Checkbox completion, or the increment goal met for that day.
    pub fn is_completed_on(&self, key: DateKey) -> bool {
        self.completion_history.contains(&key) || self.increment_goal_reached(key)
    }

    pub fn is_skipped_on(&self, key: DateKey) -> bool {
        self.skipped_dates.contains(&key)
    }
}

mod weekday_names {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(days.iter().map(|day| full_name(*day)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Weekday>, D::Error> {
        let names = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
        let mut days = Vec::with_capacity(names.len());
        for name in names {
            match name.trim().parse::<Weekday>() {
                Ok(day) if !days.contains(&day) => days.push(day),
                Ok(_) => {}
                Err(_) => tracing::debug!(name = %name, "ignoring unrecognised weekday"),
            }
        }
        Ok(days)
    }

    fn full_name(day: Weekday) -> &'static str {
        match day {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}
