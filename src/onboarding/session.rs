//! Ephemeral per-chat session state.
//!
//! A session exists from first contact (or explicit restart) until the
//! user confirms a plan or cancels. It is owned exclusively by the bot
//! process; nothing here is shared across chats.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profile::model::RunnerProfile;

use super::validate::{Answer, AnswerMap};
use super::Step;

/// Where the session currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// One pending question; `step` identifies it.
    Asking { step: Step },
    /// A plan has been delivered; the small post-plan machine runs.
    Reviewing { review: ReviewStage },
}

/// The post-plan feedback machine: confirmation ends the session, an edit
/// request leads to regeneration and back to confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStage {
    AwaitingConfirmation,
    AwaitingEditRequest,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: Uuid,
    pub chat_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub stage: Stage,
    pub answers: AnswerMap,
    /// Counts generations for this session; the first plan is generation 1.
    pub generation: u32,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(chat_id: i64, user_id: i64, user_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4(),
            chat_id,
            user_id,
            user_name: user_name.into(),
            stage: Stage::Asking {
                step: Step::first(),
            },
            answers: AnswerMap::new(),
            generation: 0,
            started_at: now,
            updated_at: now,
        }
    }

    /// The pending question, when still in the questionnaire.
    pub fn current_step(&self) -> Option<Step> {
        match self.stage {
            Stage::Asking { step } => Some(step),
            Stage::Reviewing { .. } => None,
        }
    }

    pub fn review_stage(&self) -> Option<ReviewStage> {
        match self.stage {
            Stage::Reviewing { review } => Some(review),
            Stage::Asking { .. } => None,
        }
    }

    /// Records a validated answer for the pending step and advances.
    /// Returns the next step, or `None` when the questionnaire is done
    /// (the caller runs the terminal action).
    pub fn record_answer(&mut self, step: Step, answer: Answer) -> Option<Step> {
        self.answers.insert(step.field(), answer);
        self.updated_at = Utc::now();
        match step.next() {
            Some(next) => {
                self.stage = Stage::Asking { step: next };
                Some(next)
            }
            None => None,
        }
    }

    /// Jumps to the static predecessor, keeping every collected answer so
    /// re-answering overwrites rather than clears. Returns the step now
    /// pending, or `None` if already at the first question.
    pub fn step_back(&mut self) -> Option<Step> {
        let step = self.current_step()?;
        let prev = step.prev()?;
        self.stage = Stage::Asking { step: prev };
        self.updated_at = Utc::now();
        Some(prev)
    }

    pub fn enter_review(&mut self) {
        self.stage = Stage::Reviewing {
            review: ReviewStage::AwaitingConfirmation,
        };
        self.updated_at = Utc::now();
    }

    pub fn set_review(&mut self, review: ReviewStage) {
        self.stage = Stage::Reviewing { review };
        self.updated_at = Utc::now();
    }

    /// Folds the accumulated answers into a durable profile record.
    pub fn build_profile(&self) -> RunnerProfile {
        let mut profile = RunnerProfile::new(self.user_id, self.user_name.clone());
        let answers = &self.answers;
        if let Some(name) = answers.get(Step::Name.field()).and_then(Answer::as_text) {
            profile.name = name.to_string();
        }
        profile.age = answers.get(Step::Age.field()).and_then(Answer::as_integer);
        profile.height_cm = answers
            .get(Step::Height.field())
            .and_then(Answer::as_number);
        profile.weight_kg = answers
            .get(Step::Weight.field())
            .and_then(Answer::as_number);
        profile.goal = text_answer(answers, Step::Goal);
        profile.target_date = text_answer(answers, Step::TargetDate);
        profile.experience = text_answer(answers, Step::Experience);
        profile.weekly_volume_km = answers
            .get(Step::WeeklyVolume.field())
            .and_then(Answer::as_number);
        profile.sessions_per_week = answers
            .get(Step::SessionsPerWeek.field())
            .and_then(Answer::as_integer);
        profile.preferred_days = answers
            .get(Step::PreferredDays.field())
            .and_then(Answer::as_days)
            .map(<[_]>::to_vec)
            .unwrap_or_default();
        profile.long_run_day = answers
            .get(Step::LongRunDay.field())
            .and_then(Answer::as_day);
        profile.motivation = text_answer(answers, Step::Motivation);
        profile.injuries = text_answer(answers, Step::Injuries);
        profile.equipment = text_answer(answers, Step::Equipment);
        profile.dietary_restrictions = text_answer(answers, Step::Dietary);
        profile.meals_per_day = answers
            .get(Step::MealsPerDay.field())
            .and_then(Answer::as_integer);
        profile.food_dislikes = text_answer(answers, Step::FoodDislikes);
        profile.sleep_hours = answers
            .get(Step::SleepHours.field())
            .and_then(Answer::as_integer);
        profile.stress_level = text_answer(answers, Step::StressLevel);
        profile.additional_info = text_answer(answers, Step::AdditionalInfo);
        profile
    }
}

fn text_answer(answers: &AnswerMap, step: Step) -> Option<String> {
    answers
        .get(step.field())
        .and_then(Answer::as_text)
        .map(str::to_string)
}

/// In-memory session registry keyed by chat id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<i64, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh session for the chat, discarding any prior one
    /// (explicit restart semantics).
    pub fn start(&mut self, chat_id: i64, user_id: i64, user_name: &str) -> &mut Session {
        let session = Session::new(chat_id, user_id, user_name);
        self.sessions.insert(chat_id, session);
        self.sessions
            .get_mut(&chat_id)
            .expect("session was just inserted")
    }

    pub fn get_mut(&mut self, chat_id: i64) -> Option<&mut Session> {
        self.sessions.get_mut(&chat_id)
    }

    pub fn remove(&mut self, chat_id: i64) -> Option<Session> {
        self.sessions.remove(&chat_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::model::DayOfWeek;

    #[test]
    fn new_session_asks_the_first_question() {
        let session = Session::new(1, 10, "Alex");
        assert_eq!(session.current_step(), Some(Step::Name));
        assert_eq!(session.generation, 0);
    }

    #[test]
    fn record_answer_advances_linearly() {
        let mut session = Session::new(1, 10, "Alex");
        let next = session.record_answer(Step::Name, Answer::Text("Alex".into()));
        assert_eq!(next, Some(Step::Age));
        assert_eq!(session.current_step(), Some(Step::Age));
    }

    #[test]
    fn step_back_keeps_collected_answers() {
        let mut session = Session::new(1, 10, "Alex");
        session.record_answer(Step::Name, Answer::Text("Alex".into()));
        session.record_answer(Step::Age, Answer::Integer(34));
        assert_eq!(session.current_step(), Some(Step::Height));

        assert_eq!(session.step_back(), Some(Step::Age));
        assert_eq!(
            session.answers.get(Step::Age.field()),
            Some(&Answer::Integer(34))
        );

        // Re-answering overwrites.
        session.record_answer(Step::Age, Answer::Integer(35));
        assert_eq!(
            session.answers.get(Step::Age.field()),
            Some(&Answer::Integer(35))
        );
    }

    #[test]
    fn step_back_stops_at_the_first_question() {
        let mut session = Session::new(1, 10, "Alex");
        assert_eq!(session.step_back(), None);
        assert_eq!(session.current_step(), Some(Step::Name));
    }

    #[test]
    fn build_profile_folds_typed_answers() {
        let mut session = Session::new(1, 77, "Fallback Name");
        session.record_answer(Step::Name, Answer::Text("Alex".into()));
        session.record_answer(Step::Age, Answer::Integer(34));
        session.record_answer(Step::Height, Answer::Number(181.0));
        session.record_answer(
            Step::PreferredDays,
            Answer::Days(vec![DayOfWeek::Monday, DayOfWeek::Saturday]),
        );
        session.record_answer(Step::LongRunDay, Answer::Day(DayOfWeek::Saturday));

        let profile = session.build_profile();
        assert_eq!(profile.user_id, 77);
        assert_eq!(profile.name, "Alex");
        assert_eq!(profile.age, Some(34));
        assert_eq!(profile.height_cm, Some(181.0));
        assert_eq!(
            profile.preferred_days,
            vec![DayOfWeek::Monday, DayOfWeek::Saturday]
        );
        assert_eq!(profile.long_run_day, Some(DayOfWeek::Saturday));
        assert_eq!(profile.weight_kg, None);
    }

    #[test]
    fn store_restart_discards_previous_session() {
        let mut store = SessionStore::new();
        let first_id = store.start(5, 50, "Alex").session_id;
        store
            .get_mut(5)
            .unwrap()
            .record_answer(Step::Name, Answer::Text("Alex".into()));
        let second_id = store.start(5, 50, "Alex").session_id;
        assert_ne!(first_id, second_id);
        assert_eq!(store.get_mut(5).unwrap().current_step(), Some(Step::Name));
        assert_eq!(store.len(), 1);
    }
}
