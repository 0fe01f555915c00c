//! Durable storage for profiles and plans.
//!
//! The production backend is a hosted Postgres exposed over the PostgREST
//! dialect (Supabase). Persistence is deliberately thin: upserts, one point
//! read, and a single server-side stored procedure invoked via RPC. The
//! `ProfileStore` trait is the seam tests drive the bot through.

pub mod client;

use anyhow::Result;
use async_trait::async_trait;

use crate::plans::model::PlanRecord;
use crate::profile::model::RunnerProfile;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Creates or replaces the profile row keyed by `user_id`.
    async fn upsert_profile(&self, profile: &RunnerProfile) -> Result<()>;

    /// Point read; `None` when the user has never onboarded.
    async fn fetch_profile(&self, user_id: i64) -> Result<Option<RunnerProfile>>;

    /// Writes a plan row keyed `(user_id, week_start)`; an existing row for
    /// the same key is superseded wholesale.
    async fn insert_plan(&self, record: &PlanRecord) -> Result<()>;

    /// Invokes the `complete_onboarding` stored procedure, which flips the
    /// profile status to `active` and stamps the activation time.
    async fn complete_onboarding(&self, user_id: i64) -> Result<()>;
}

pub use client::SupabaseStore;
