//! Update dispatch: routes commands, free text, and button presses through
//! the questionnaire and the post-plan review loop.
//!
//! Handlers return reply values instead of sending anything themselves, so
//! the whole flow can be driven in tests with a scripted generator and an
//! in-memory store.

use chrono::Utc;
use tracing::{info, warn};

use crate::generator::{PlanGenerator, PlanRequest};
use crate::onboarding::{
    validate_answer, ReviewStage, SessionStore, Stage, Step,
};
use crate::plans::model::{week_start_after, PlanDocument, PlanRecord};
use crate::plans::render::render_plan;
use crate::storage::ProfileStore;
use crate::telegram::{InlineKeyboardMarkup, User};

use super::replies::{self, CALLBACK_ANSWER_PREFIX};

/// One outbound message: text plus an optional inline keyboard.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// The bot's conversational core. Owns the session registry; storage and
/// generation are reached through their trait seams.
pub struct CoachBot<G, S> {
    sessions: SessionStore,
    generator: G,
    store: S,
}

impl<G: PlanGenerator, S: ProfileStore> CoachBot<G, S> {
    pub fn new(generator: G, store: S) -> Self {
        Self {
            sessions: SessionStore::new(),
            generator,
            store,
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Entry point for text messages.
    pub async fn handle_message(&mut self, chat_id: i64, from: &User, text: &str) -> Vec<Reply> {
        let text = text.trim();
        match text {
            "/start" => self.start(chat_id, from).await,
            "/help" => vec![Reply::text(replies::help_text())],
            "/cancel" => self.cancel(chat_id),
            "/back" => self.back(chat_id),
            _ => self.answer_input(chat_id, text).await,
        }
    }

    /// Entry point for inline-button presses. The transport acknowledges
    /// the callback query; this only advances the flow.
    pub async fn handle_callback(&mut self, chat_id: i64, _from: &User, data: &str) -> Vec<Reply> {
        match data {
            replies::CALLBACK_BACK => self.back(chat_id),
            replies::CALLBACK_REVIEW_CONFIRM => self.confirm(chat_id).await,
            replies::CALLBACK_REVIEW_EDIT => self.request_edit(chat_id),
            _ => match data.strip_prefix(CALLBACK_ANSWER_PREFIX) {
                Some(value) => self.answer_input(chat_id, value).await,
                // Stale or unknown button; acknowledged upstream, nothing to say.
                None => Vec::new(),
            },
        }
    }

    async fn start(&mut self, chat_id: i64, from: &User) -> Vec<Reply> {
        let name = from.full_name();
        let profile = crate::profile::model::RunnerProfile::new(from.id, name.clone());
        if let Err(err) = self.store.upsert_profile(&profile).await {
            warn!(chat_id, error = %err, "profile upsert failed on /start");
            return vec![Reply::text(replies::storage_apology())];
        }
        let session = self.sessions.start(chat_id, from.id, &name);
        info!(chat_id, user_id = from.id, session_id = %session.session_id, "onboarding started");
        vec![
            Reply::text(replies::welcome(&from.first_name)),
            ask(Step::first()),
        ]
    }

    fn cancel(&mut self, chat_id: i64) -> Vec<Reply> {
        match self.sessions.remove(chat_id) {
            Some(session) => {
                info!(chat_id, session_id = %session.session_id, "session cancelled");
                vec![Reply::text(replies::cancelled())]
            }
            None => vec![Reply::text(replies::nothing_to_cancel())],
        }
    }

    fn back(&mut self, chat_id: i64) -> Vec<Reply> {
        let Some(session) = self.sessions.get_mut(chat_id) else {
            return vec![Reply::text(replies::no_session_hint())];
        };
        match session.stage {
            Stage::Asking { .. } => match session.step_back() {
                Some(step) => vec![ask(step)],
                None => vec![
                    Reply::text(replies::already_at_first_question()),
                    ask(Step::first()),
                ],
            },
            Stage::Reviewing { .. } => vec![review_reply()],
        }
    }

    fn request_edit(&mut self, chat_id: i64) -> Vec<Reply> {
        let Some(session) = self.sessions.get_mut(chat_id) else {
            return vec![Reply::text(replies::no_session_hint())];
        };
        match session.stage {
            Stage::Reviewing { .. } => {
                session.set_review(ReviewStage::AwaitingEditRequest);
                vec![Reply::text(replies::edit_request_prompt())]
            }
            Stage::Asking { .. } => Vec::new(),
        }
    }

    async fn answer_input(&mut self, chat_id: i64, text: &str) -> Vec<Reply> {
        let stage = match self.sessions.get_mut(chat_id) {
            Some(session) => session.stage,
            None => return vec![Reply::text(replies::no_session_hint())],
        };
        match stage {
            Stage::Asking { step } => self.answer_step(chat_id, step, text).await,
            Stage::Reviewing {
                review: ReviewStage::AwaitingConfirmation,
            } => vec![review_reply()],
            Stage::Reviewing {
                review: ReviewStage::AwaitingEditRequest,
            } => self.regenerate(chat_id, text).await,
        }
    }

    async fn answer_step(&mut self, chat_id: i64, step: Step, text: &str) -> Vec<Reply> {
        let outcome = {
            let session = self
                .sessions
                .get_mut(chat_id)
                .expect("session checked by caller");
            validate_answer(step, text, &session.answers)
                .map(|answer| session.record_answer(step, answer))
        };
        match outcome {
            Err(diagnostic) => {
                // Re-emit the pending prompt with the diagnostic; no state change.
                vec![Reply {
                    text: format!("{diagnostic}\n\n{}", step.prompt()),
                    keyboard: replies::step_keyboard(step),
                }]
            }
            Ok(Some(next)) => vec![ask(next)],
            Ok(None) => self.finish_onboarding(chat_id).await,
        }
    }

    /// Terminal action: persist the profile, request the plan, deliver it,
    /// and move the session into review.
    async fn finish_onboarding(&mut self, chat_id: i64) -> Vec<Reply> {
        let profile = match self.sessions.get_mut(chat_id) {
            Some(session) => session.build_profile(),
            None => return vec![Reply::text(replies::no_session_hint())],
        };

        if let Err(err) = self.store.upsert_profile(&profile).await {
            warn!(chat_id, error = %err, "profile upsert failed at terminal step");
            return vec![
                Reply::text(replies::storage_apology()),
                Reply::text(replies::retry_terminal_hint()),
            ];
        }

        let mut replies_out = vec![Reply::text(replies::generating())];
        match self
            .generator
            .generate(&PlanRequest::initial(profile.clone()))
            .await
        {
            Err(err) => {
                warn!(chat_id, error = %err, "plan generation failed");
                replies_out.push(Reply::text(replies::generator_apology(&err)));
                replies_out.push(Reply::text(replies::retry_terminal_hint()));
            }
            Ok(document) => {
                replies_out.extend(
                    self.deliver_plan(chat_id, &profile, document)
                        .await,
                );
            }
        }
        replies_out
    }

    /// Regeneration path: the durable profile record, plus the user's edit
    /// request. Falls back to the session's answers if the read fails.
    async fn regenerate(&mut self, chat_id: i64, feedback: &str) -> Vec<Reply> {
        let (user_id, fallback) = match self.sessions.get_mut(chat_id) {
            Some(session) => (session.user_id, session.build_profile()),
            None => return vec![Reply::text(replies::no_session_hint())],
        };
        let profile = match self.store.fetch_profile(user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => fallback,
            Err(err) => {
                warn!(chat_id, error = %err, "profile read failed, using session answers");
                fallback
            }
        };

        match self
            .generator
            .generate(&PlanRequest::regeneration(profile.clone(), feedback))
            .await
        {
            Err(err) => {
                warn!(chat_id, error = %err, "plan regeneration failed");
                if let Some(session) = self.sessions.get_mut(chat_id) {
                    session.set_review(ReviewStage::AwaitingConfirmation);
                }
                vec![
                    Reply::text(replies::generator_apology(&err)),
                    Reply::with_keyboard(
                        replies::previous_plan_stands(),
                        replies::review_keyboard(),
                    ),
                ]
            }
            Ok(document) => self.deliver_plan(chat_id, &profile, document).await,
        }
    }

    /// Stores the (possibly superseding) plan row, renders the document,
    /// and parks the session at the confirmation question.
    async fn deliver_plan(
        &mut self,
        chat_id: i64,
        profile: &crate::profile::model::RunnerProfile,
        document: PlanDocument,
    ) -> Vec<Reply> {
        let week_start = week_start_after(Utc::now().date_naive());
        let generation = self
            .sessions
            .get_mut(chat_id)
            .map(|session| session.generation + 1)
            .unwrap_or(1);
        let record = PlanRecord::new(
            profile.user_id,
            week_start,
            document.clone(),
            profile.snapshot_hash(),
            generation,
        );

        let mut replies_out = Vec::new();
        if let Err(err) = self.store.insert_plan(&record).await {
            warn!(chat_id, error = %err, "plan row write failed");
            replies_out.push(Reply::text(replies::plan_save_failed_note()));
        }

        if let Some(session) = self.sessions.get_mut(chat_id) {
            session.generation = generation;
            session.set_review(ReviewStage::AwaitingConfirmation);
            info!(
                chat_id,
                session_id = %session.session_id,
                generation,
                week_start = %week_start,
                "plan delivered"
            );
        }

        replies_out.push(Reply::text(render_plan(&document, week_start)));
        replies_out.push(review_reply());
        replies_out
    }

    /// Confirmation ends the session; the stored procedure flips the
    /// profile to active server-side.
    async fn confirm(&mut self, chat_id: i64) -> Vec<Reply> {
        let user_id = match self.sessions.get_mut(chat_id) {
            Some(session) if session.review_stage().is_some() => session.user_id,
            Some(_) => return Vec::new(),
            None => return vec![Reply::text(replies::no_session_hint())],
        };

        if let Err(err) = self.store.complete_onboarding(user_id).await {
            warn!(chat_id, error = %err, "complete_onboarding rpc failed");
            return vec![
                Reply::text(replies::storage_apology()),
                review_reply(),
            ];
        }

        if let Some(session) = self.sessions.remove(chat_id) {
            info!(chat_id, session_id = %session.session_id, "onboarding confirmed");
        }
        vec![Reply::text(replies::confirmed_farewell())]
    }
}

fn ask(step: Step) -> Reply {
    Reply {
        text: step.prompt().to_string(),
        keyboard: replies::step_keyboard(step),
    }
}

fn review_reply() -> Reply {
    Reply::with_keyboard(replies::review_prompt(), replies::review_keyboard())
}
