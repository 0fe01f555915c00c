//! DeepSeek chat-completions client.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::config::GeneratorSettings;
use crate::plans::model::PlanDocument;

use super::prompt::{build_user_prompt, parse_plan_document, SYSTEM_PROMPT};
use super::{GeneratorError, PlanGenerator, PlanRequest};

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

pub struct DeepSeekGenerator {
    http: reqwest::Client,
    settings: GeneratorSettings,
}

impl DeepSeekGenerator {
    pub fn new(http: reqwest::Client, settings: GeneratorSettings) -> Self {
        Self { http, settings }
    }
}

#[async_trait::async_trait]
impl PlanGenerator for DeepSeekGenerator {
    async fn generate(&self, request: &PlanRequest) -> Result<PlanDocument, GeneratorError> {
        if self.settings.api_key.trim().is_empty() {
            return Err(GeneratorError::MissingApiKey);
        }

        let payload = json!({
            "model": self.settings.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": build_user_prompt(&request.profile, request.feedback.as_deref()),
                },
            ],
        });

        let response = self
            .http
            .post(&self.settings.api_url)
            .bearer_auth(&self.settings.api_key)
            .timeout(Duration::from_secs(self.settings.timeout_secs))
            .json(&payload)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "generator endpoint rejected the request");
            return Err(GeneratorError::Upstream {
                status: status.as_u16(),
                body: truncate(&body, 500),
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(classify_transport_error)?;
        let content = completion
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .filter(|content| !content.trim().is_empty())
            .ok_or(GeneratorError::EmptyChoices)?;

        info!(model = %self.settings.model, "received generator response");
        parse_plan_document(content)
    }
}

fn classify_transport_error(err: reqwest::Error) -> GeneratorError {
    if err.is_timeout() {
        GeneratorError::Timeout
    } else {
        GeneratorError::Transport(err)
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        text.chars().take(limit).collect()
    }
}
