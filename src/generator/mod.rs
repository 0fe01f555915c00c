//! Plan generation against an OpenAI-compatible chat-completions endpoint.
//!
//! The production implementation talks to DeepSeek; the `PlanGenerator`
//! trait exists so flows can be driven by a scripted generator in tests.

pub mod client;
pub mod prompt;

use async_trait::async_trait;
use thiserror::Error;

use crate::plans::model::PlanDocument;
use crate::profile::model::RunnerProfile;

/// What the generator is asked to produce.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub profile: RunnerProfile,
    /// User's edit request when regenerating; `None` for the first plan.
    pub feedback: Option<String>,
}

impl PlanRequest {
    pub fn initial(profile: RunnerProfile) -> Self {
        Self {
            profile,
            feedback: None,
        }
    }

    pub fn regeneration(profile: RunnerProfile, feedback: impl Into<String>) -> Self {
        Self {
            profile,
            feedback: Some(feedback.into()),
        }
    }
}

/// The error signal a generation call can end in.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generator API key is not configured")]
    MissingApiKey,

    #[error("generation timed out")]
    Timeout,

    #[error("generator endpoint returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("transport error talking to the generator: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generator response carried no choices")]
    EmptyChoices,

    #[error("generator returned a malformed plan document: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate(&self, request: &PlanRequest) -> Result<PlanDocument, GeneratorError>;
}

pub use client::DeepSeekGenerator;
pub use prompt::{build_user_prompt, parse_plan_document, SYSTEM_PROMPT};
