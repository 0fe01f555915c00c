//! Durable runner profile: the union of everything the questionnaire
//! collects, keyed by the Telegram user identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    Onboarding,
    Active,
}

impl Default for ProfileStatus {
    fn default() -> Self {
        Self::Onboarding
    }
}

/// Day names as the questionnaire and the plan schedule use them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

pub const ALL_DAYS: [DayOfWeek; 7] = [
    DayOfWeek::Monday,
    DayOfWeek::Tuesday,
    DayOfWeek::Wednesday,
    DayOfWeek::Thursday,
    DayOfWeek::Friday,
    DayOfWeek::Saturday,
    DayOfWeek::Sunday,
];

impl DayOfWeek {
    /// Parses a user-supplied day name; accepts full names and the usual
    /// three-letter abbreviations, case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "mon" | "monday" => Some(Self::Monday),
            "tue" | "tues" | "tuesday" => Some(Self::Tuesday),
            "wed" | "wednesday" => Some(Self::Wednesday),
            "thu" | "thur" | "thurs" | "thursday" => Some(Self::Thursday),
            "fri" | "friday" => Some(Self::Friday),
            "sat" | "saturday" => Some(Self::Saturday),
            "sun" | "sunday" => Some(Self::Sunday),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }
}

/// Everything collected during onboarding plus record-keeping fields.
///
/// Optional fields stay `None` until their step has been answered, so the
/// same struct serves both the mid-onboarding upsert and the final record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerProfile {
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub target_date: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub weekly_volume_km: Option<f64>,
    #[serde(default)]
    pub sessions_per_week: Option<i64>,
    #[serde(default)]
    pub preferred_days: Vec<DayOfWeek>,
    #[serde(default)]
    pub long_run_day: Option<DayOfWeek>,
    #[serde(default)]
    pub motivation: Option<String>,
    #[serde(default)]
    pub injuries: Option<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    #[serde(default)]
    pub dietary_restrictions: Option<String>,
    #[serde(default)]
    pub meals_per_day: Option<i64>,
    #[serde(default)]
    pub food_dislikes: Option<String>,
    #[serde(default)]
    pub sleep_hours: Option<i64>,
    #[serde(default)]
    pub stress_level: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(default)]
    pub status: ProfileStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RunnerProfile {
    /// Fresh record for a user who just said hello.
    pub fn new(user_id: i64, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            name: name.into(),
            age: None,
            height_cm: None,
            weight_kg: None,
            goal: None,
            target_date: None,
            experience: None,
            weekly_volume_km: None,
            sessions_per_week: None,
            preferred_days: Vec::new(),
            long_run_day: None,
            motivation: None,
            injuries: None,
            equipment: None,
            dietary_restrictions: None,
            meals_per_day: None,
            food_dislikes: None,
            sleep_hours: None,
            stress_level: None,
            additional_info: None,
            status: ProfileStatus::Onboarding,
            created_at: now,
            updated_at: now,
        }
    }

    /// SHA-256 over the canonical JSON of the collected fields.
    ///
    /// Record-keeping columns (timestamps, status) are excluded so the hash
    /// identifies the questionnaire content that produced a plan.
    pub fn snapshot_hash(&self) -> String {
        let mut value = serde_json::to_value(self).expect("profile serializes");
        if let Some(map) = value.as_object_mut() {
            map.remove("status");
            map.remove("created_at");
            map.remove("updated_at");
        }
        let payload = serde_json::to_vec(&value).expect("profile value serializes");
        let digest = Sha256::digest(&payload);
        format!("{:x}", digest)
    }
}
