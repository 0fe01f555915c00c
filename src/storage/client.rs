//! PostgREST-dialect REST client for the hosted store.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::config::StorageSettings;
use crate::plans::model::PlanRecord;
use crate::profile::model::RunnerProfile;

use super::ProfileStore;

const PROFILES_TABLE: &str = "profiles";
const PLANS_TABLE: &str = "plans";

pub struct SupabaseStore {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseStore {
    pub fn new(http: reqwest::Client, settings: &StorageSettings) -> Self {
        Self {
            http,
            base_url: settings.url.trim_end_matches('/').to_string(),
            service_key: settings.service_key.clone(),
        }
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn expect_success(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        bail!("storage rejected {what}: {status} {body}");
    }
}

#[async_trait]
impl ProfileStore for SupabaseStore {
    async fn upsert_profile(&self, profile: &RunnerProfile) -> Result<()> {
        let url = format!("{}?on_conflict=user_id", self.rest_url(PROFILES_TABLE));
        let response = self
            .authed(self.http.post(&url))
            .header("Prefer", "resolution=merge-duplicates")
            .json(profile)
            .send()
            .await
            .context("storage unreachable while upserting profile")?;
        Self::expect_success(response, "profile upsert").await?;
        debug!(user_id = profile.user_id, "profile upserted");
        Ok(())
    }

    async fn fetch_profile(&self, user_id: i64) -> Result<Option<RunnerProfile>> {
        let url = format!(
            "{}?user_id=eq.{}&limit=1",
            self.rest_url(PROFILES_TABLE),
            user_id
        );
        let response = self
            .authed(self.http.get(&url))
            .send()
            .await
            .context("storage unreachable while reading profile")?;
        let response = Self::expect_success(response, "profile read").await?;
        let mut rows: Vec<RunnerProfile> = response
            .json()
            .await
            .context("storage returned a malformed profile row")?;
        Ok(rows.pop())
    }

    async fn insert_plan(&self, record: &PlanRecord) -> Result<()> {
        let url = format!(
            "{}?on_conflict=user_id,week_start",
            self.rest_url(PLANS_TABLE)
        );
        let response = self
            .authed(self.http.post(&url))
            .header("Prefer", "resolution=merge-duplicates")
            .json(record)
            .send()
            .await
            .context("storage unreachable while writing plan")?;
        Self::expect_success(response, "plan write").await?;
        debug!(
            user_id = record.user_id,
            week_start = %record.week_start,
            generation = record.generation,
            "plan stored"
        );
        Ok(())
    }

    async fn complete_onboarding(&self, user_id: i64) -> Result<()> {
        let url = self.rest_url("rpc/complete_onboarding");
        let response = self
            .authed(self.http.post(&url))
            .json(&json!({ "p_user_id": user_id }))
            .send()
            .await
            .context("storage unreachable while completing onboarding")?;
        Self::expect_success(response, "complete_onboarding rpc").await?;
        debug!(user_id, "onboarding completed server-side");
        Ok(())
    }
}
