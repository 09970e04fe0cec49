//! Generative content service integration
//!
//! The relay talks to the external service only through [`ContentService`].
//! Gemini is the live implementation; [`MockContentClient`] scripts outcomes
//! for tests and harnesses.

pub mod gemini;
pub mod mock;

pub use gemini::GeminiContentClient;
pub use mock::{MockContentClient, MockOutcome};

use crate::models::ContentRequest;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ContentService: Send + Sync {
    /// Run one request with the given credential.
    ///
    /// `Ok(None)` means the service succeeded but produced no text.
    async fn generate(&self, credential: &str, request: &ContentRequest) -> Result<Option<String>>;
}
