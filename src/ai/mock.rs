use super::ContentService;
use crate::models::ContentRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the mock does for one call.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Text(String),
    /// Succeeds without any text.
    Empty,
    /// Fails with `Error::AiProvider(message)`.
    Fail(String),
    /// Replies with the request's own prompt.
    Echo,
    Panic,
}

/// A request as the mock saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub credential: String,
    pub prompt: String,
    pub has_image: bool,
}

/// Scriptable [`ContentService`]. Outcomes are consumed in call order; once
/// the script runs out every call echoes its prompt.
#[derive(Clone, Default)]
pub struct MockContentClient {
    script: Arc<Mutex<VecDeque<(Duration, MockOutcome)>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockContentClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(self, outcome: MockOutcome) -> Self {
        self.with_outcome_after(Duration::ZERO, outcome)
    }

    /// Queue an outcome that is produced only after `latency` has elapsed.
    pub fn with_outcome_after(self, latency: Duration, outcome: MockOutcome) -> Self {
        self.script.lock().unwrap().push_back((latency, outcome));
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_outcome(MockOutcome::Text(text.into()))
    }

    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.with_outcome(MockOutcome::Fail(message.into()))
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentService for MockContentClient {
    async fn generate(&self, credential: &str, request: &ContentRequest) -> Result<Option<String>> {
        self.calls.lock().unwrap().push(RecordedCall {
            credential: credential.to_string(),
            prompt: request.prompt().to_string(),
            has_image: request.image().is_some(),
        });

        let (latency, outcome) = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((Duration::ZERO, MockOutcome::Echo));

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match outcome {
            MockOutcome::Text(text) => Ok(Some(text)),
            MockOutcome::Empty => Ok(None),
            MockOutcome::Fail(message) => Err(Error::AiProvider(message)),
            MockOutcome::Echo => Ok(Some(request.prompt().to_string())),
            MockOutcome::Panic => panic!("mock content service panicked"),
        }
    }
}
