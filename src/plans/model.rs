//! Generated plan documents.
//!
//! A plan is immutable once written; a regeneration produces a new document
//! that supersedes the old one for the same `(user, week_start)` key.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::model::DayOfWeek;

/// The structured document the generator must return.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanDocument {
    /// One entry per scheduled training day, rest days omitted.
    pub training_days: Vec<TrainingDay>,
    /// Seven day-by-day meal outlines; fewer is tolerated and rendered as-is.
    #[serde(default)]
    pub meal_plan: Vec<MealDay>,
    #[serde(default)]
    pub shopping_list: Vec<String>,
    /// Free-text coaching notes appended after the schedule.
    #[serde(default)]
    pub recommendations: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingDay {
    pub day: DayOfWeek,
    /// Session label, e.g. "Easy run", "Intervals", "Long run".
    pub session: String,
    /// Human-readable volume, e.g. "8 km" or "45 min".
    #[serde(default)]
    pub volume: Option<String>,
    /// Workout detail blocks, one line each.
    #[serde(default)]
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealDay {
    pub day: DayOfWeek,
    #[serde(default)]
    pub meals: Vec<String>,
}

/// A stored plan row: the document plus the keys and provenance columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRecord {
    pub plan_id: Uuid,
    pub user_id: i64,
    /// Monday of the week the plan covers.
    pub week_start: NaiveDate,
    pub document: PlanDocument,
    /// Snapshot hash of the profile state that produced this document.
    pub profile_hash: String,
    /// 1 for the first plan of a session, incremented per regeneration.
    pub generation: u32,
}

impl PlanRecord {
    pub fn new(
        user_id: i64,
        week_start: NaiveDate,
        document: PlanDocument,
        profile_hash: impl Into<String>,
        generation: u32,
    ) -> Self {
        Self {
            plan_id: Uuid::new_v4(),
            user_id,
            week_start,
            document,
            profile_hash: profile_hash.into(),
            generation,
        }
    }
}

/// Monday of the week following `today`: plans always start on a fresh week.
pub fn week_start_after(today: NaiveDate) -> NaiveDate {
    let days_until_monday = 7 - today.weekday().num_days_from_monday() as i64;
    today + Duration::days(days_until_monday)
}
