//! Relay between flood-monitoring callers and a generative AI service
//!
//! Forwards forecast prompts and flood photos to Gemini (or answers with
//! canned reports in degraded mode) and hands the reply text to a completion
//! handler exactly once.

pub mod ai;
pub mod assessment;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod forecast;
pub mod models;
pub mod prompts;
pub mod relay;
pub mod weather;

pub use error::{Error, Result};
pub use relay::{ContentGenerationRelay, PendingRequest, RelayMode};
