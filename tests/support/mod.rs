//! Shared fixtures: a scripted generator and an in-memory store so the
//! full chat flow can run without the network.

// Not every test target uses every helper.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use async_trait::async_trait;

use stridecoach::bot::{CoachBot, Reply};
use stridecoach::generator::{GeneratorError, PlanGenerator, PlanRequest};
use stridecoach::plans::model::{MealDay, PlanDocument, PlanRecord, TrainingDay};
use stridecoach::profile::model::{DayOfWeek, RunnerProfile};
use stridecoach::storage::ProfileStore;
use stridecoach::telegram::User;

pub const CHAT_ID: i64 = 1001;
pub const USER_ID: i64 = 500;

pub fn user() -> User {
    serde_json::from_str(
        r#"{"id": 500, "first_name": "Alex", "last_name": "Moreno", "username": "alex_runs"}"#,
    )
    .expect("fixture user deserializes")
}

/// Valid answers aligned with the step order, name through additional info.
pub fn valid_answers() -> Vec<&'static str> {
    vec![
        "Alex",
        "34",
        "181",
        "74.5",
        "Half marathon",
        "mid October",
        "Intermediate",
        "30",
        "4",
        "mon, tue, thu, sat",
        "sat",
        "break 1:45 this season",
        "none",
        "road, plus a gym membership",
        "vegetarian",
        "3",
        "mushrooms",
        "7",
        "Moderate",
        "I travel for work about once a month",
    ]
}

pub fn sample_plan() -> PlanDocument {
    PlanDocument {
        training_days: vec![
            TrainingDay {
                day: DayOfWeek::Tuesday,
                session: "Intervals".into(),
                volume: Some("8 km".into()),
                details: vec!["6x400m at 5k pace".into()],
            },
            TrainingDay {
                day: DayOfWeek::Saturday,
                session: "Long run".into(),
                volume: Some("16 km".into()),
                details: vec![],
            },
        ],
        meal_plan: vec![MealDay {
            day: DayOfWeek::Tuesday,
            meals: vec!["Oats with berries".into()],
        }],
        shopping_list: vec!["Oats".into()],
        recommendations: "Easy pace means conversational.".into(),
    }
}

/// Generator that pops pre-scripted outcomes and records every request.
#[derive(Clone, Default)]
pub struct ScriptedGenerator {
    inner: Arc<Mutex<ScriptedState>>,
}

#[derive(Default)]
struct ScriptedState {
    outcomes: VecDeque<Result<PlanDocument, GeneratorError>>,
    requests: Vec<PlanRequest>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_ok(&self, document: PlanDocument) {
        self.inner.lock().unwrap().outcomes.push_back(Ok(document));
    }

    pub fn push_err(&self, err: GeneratorError) {
        self.inner.lock().unwrap().outcomes.push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<PlanRequest> {
        self.inner.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl PlanGenerator for ScriptedGenerator {
    async fn generate(&self, request: &PlanRequest) -> Result<PlanDocument, GeneratorError> {
        let mut state = self.inner.lock().unwrap();
        state.requests.push(request.clone());
        state
            .outcomes
            .pop_front()
            .unwrap_or(Err(GeneratorError::EmptyChoices))
    }
}

/// In-memory stand-in for the hosted store, with per-operation failure
/// switches to drive the apology paths.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    profiles: HashMap<i64, RunnerProfile>,
    plans: Vec<PlanRecord>,
    completed: Vec<i64>,
    fail_profile_upsert: bool,
    fail_plan_insert: bool,
    fail_rpc: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile(&self, user_id: i64) -> Option<RunnerProfile> {
        self.inner.lock().unwrap().profiles.get(&user_id).cloned()
    }

    pub fn plans(&self) -> Vec<PlanRecord> {
        self.inner.lock().unwrap().plans.clone()
    }

    pub fn completed(&self) -> Vec<i64> {
        self.inner.lock().unwrap().completed.clone()
    }

    pub fn set_fail_profile_upsert(&self, fail: bool) {
        self.inner.lock().unwrap().fail_profile_upsert = fail;
    }

    pub fn set_fail_plan_insert(&self, fail: bool) {
        self.inner.lock().unwrap().fail_plan_insert = fail;
    }

    pub fn set_fail_rpc(&self, fail: bool) {
        self.inner.lock().unwrap().fail_rpc = fail;
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn upsert_profile(&self, profile: &RunnerProfile) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_profile_upsert {
            bail!("scripted profile upsert failure");
        }
        state.profiles.insert(profile.user_id, profile.clone());
        Ok(())
    }

    async fn fetch_profile(&self, user_id: i64) -> Result<Option<RunnerProfile>> {
        Ok(self.inner.lock().unwrap().profiles.get(&user_id).cloned())
    }

    async fn insert_plan(&self, record: &PlanRecord) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_plan_insert {
            bail!("scripted plan insert failure");
        }
        // Upsert semantics on (user_id, week_start): supersede, not merge.
        state
            .plans
            .retain(|p| !(p.user_id == record.user_id && p.week_start == record.week_start));
        state.plans.push(record.clone());
        Ok(())
    }

    async fn complete_onboarding(&self, user_id: i64) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_rpc {
            bail!("scripted rpc failure");
        }
        if let Some(profile) = state.profiles.get_mut(&user_id) {
            profile.status = stridecoach::profile::ProfileStatus::Active;
        }
        state.completed.push(user_id);
        Ok(())
    }
}

pub fn fixture() -> (
    CoachBot<ScriptedGenerator, MemoryStore>,
    ScriptedGenerator,
    MemoryStore,
) {
    let generator = ScriptedGenerator::new();
    let store = MemoryStore::new();
    let bot = CoachBot::new(generator.clone(), store.clone());
    (bot, generator, store)
}

/// Runs /start plus every questionnaire answer; returns the replies from
/// the final (terminal) answer.
pub async fn drive_full_questionnaire(
    bot: &mut CoachBot<ScriptedGenerator, MemoryStore>,
) -> Vec<Reply> {
    let user = user();
    let mut last = bot.handle_message(CHAT_ID, &user, "/start").await;
    for answer in valid_answers() {
        last = bot.handle_message(CHAT_ID, &user, answer).await;
    }
    last
}

/// Joined text of a reply batch, for fragment assertions.
pub fn joined_text(replies: &[Reply]) -> String {
    replies
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join("\n---\n")
}
