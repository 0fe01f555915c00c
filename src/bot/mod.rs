//! Chat-facing layer: command/text/callback dispatch, the onboarding
//! drive-through, and the post-plan review loop.

pub mod dispatcher;
pub mod replies;

pub use dispatcher::{CoachBot, Reply};
