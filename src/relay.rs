//! Request/response relay between a caller and the generative content service.
//!
//! Every operation returns immediately and delivers exactly one string to its
//! completion handler later: the service text, [`NO_RESPONSE_TEXT`], or
//! `"Error: <message>"`. There is no separate error channel and no
//! cancellation.

use crate::ai::{ContentService, GeminiContentClient};
use crate::config::Config;
use crate::dispatch::{CompletionContext, InlineContext};
use crate::models::{ContentRequest, RasterImage};
use crate::prompts::{
    CANNED_FORECAST_REPORT, CANNED_IMAGE_REPORT, ERROR_PREFIX, FLOOD_IMAGE_ANALYSIS,
    NO_RESPONSE_TEXT,
};
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayMode {
    /// Forward requests to the content service.
    Live,
    /// Skip the service and answer with canned text after a fixed delay.
    Degraded,
}

impl RelayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelayMode::Live => "live",
            RelayMode::Degraded => "degraded",
        }
    }
}

impl fmt::Display for RelayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelayMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(RelayMode::Live),
            "degraded" | "offline" => Ok(RelayMode::Degraded),
            other => Err(Error::Config(format!(
                "Unknown relay mode '{}'. Expected 'live' or 'degraded'",
                other
            ))),
        }
    }
}

/// Simulated latency of degraded-mode answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegradedTiming {
    pub forecast_delay: Duration,
    pub image_delay: Duration,
}

impl Default for DegradedTiming {
    fn default() -> Self {
        Self {
            forecast_delay: Duration::from_millis(1200),
            image_delay: Duration::from_millis(1500),
        }
    }
}

#[derive(Clone)]
enum Backend {
    Live(Arc<dyn ContentService>),
    Degraded(DegradedTiming),
}

/// Which canned answer a request maps to in degraded mode.
#[derive(Debug, Clone, Copy)]
enum Canned {
    Forecast,
    ImageAnalysis,
}

impl Canned {
    fn resolve(self, timing: &DegradedTiming) -> (Duration, &'static str) {
        match self {
            Canned::Forecast => (timing.forecast_delay, CANNED_FORECAST_REPORT),
            Canned::ImageAnalysis => (timing.image_delay, CANNED_IMAGE_REPORT),
        }
    }
}

/// Handle to an in-flight relay request.
///
/// Dropping it does not stop the request; the handler still fires.
#[derive(Debug)]
pub struct PendingRequest {
    id: Uuid,
    done: oneshot::Receiver<()>,
}

impl PendingRequest {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait until the completion handler has run.
    ///
    /// Returns `false` if the completion was discarded because the caller's
    /// completion context was already gone.
    pub async fn finished(self) -> bool {
        self.done.await.is_ok()
    }
}

/// Relays text and image requests to a content service (or canned answers)
/// and hands the resulting text to a completion handler.
#[derive(Clone)]
pub struct ContentGenerationRelay {
    backend: Backend,
    context: Arc<dyn CompletionContext>,
    runtime: Handle,
}

impl ContentGenerationRelay {
    /// Relay that forwards to `service`.
    ///
    /// Must be called from within a tokio runtime; requests are spawned onto
    /// that runtime even when issued later from other threads.
    pub fn live(service: Arc<dyn ContentService>) -> Result<Self> {
        Self::with_backend(Backend::Live(service))
    }

    /// Relay that answers with canned reports after the default delays.
    pub fn degraded() -> Result<Self> {
        Self::with_backend(Backend::Degraded(DegradedTiming::default()))
    }

    /// Build a relay as described by `config`. Live mode talks to Gemini.
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.mode {
            RelayMode::Live => {
                let client = GeminiContentClient::new(config.model.clone())
                    .with_base_url(config.base_url.clone())
                    .with_timeout(config.http_timeout);
                Self::live(Arc::new(client))
            }
            RelayMode::Degraded => Self::degraded(),
        }
    }

    fn with_backend(backend: Backend) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|e| {
            Error::Config(format!("Relay must be created inside a tokio runtime: {}", e))
        })?;

        Ok(Self {
            backend,
            context: Arc::new(InlineContext),
            runtime,
        })
    }

    /// Deliver completions through `context` instead of on the relay task.
    pub fn with_completion_context(mut self, context: Arc<dyn CompletionContext>) -> Self {
        self.context = context;
        self
    }

    /// Override degraded-mode delays. No effect on a live relay.
    pub fn with_degraded_timing(mut self, timing: DegradedTiming) -> Self {
        if let Backend::Degraded(current) = &mut self.backend {
            *current = timing;
        }
        self
    }

    pub fn mode(&self) -> RelayMode {
        match self.backend {
            Backend::Live(_) => RelayMode::Live,
            Backend::Degraded(_) => RelayMode::Degraded,
        }
    }

    /// Send `prompt` to the service and deliver its text to `on_complete`.
    pub fn generate_from_text<F>(
        &self,
        credential: impl Into<String>,
        prompt: impl Into<String>,
        on_complete: F,
    ) -> PendingRequest
    where
        F: FnOnce(String) + Send + 'static,
    {
        self.dispatch(
            credential.into(),
            ContentRequest::text(prompt),
            Canned::Forecast,
            on_complete,
        )
    }

    /// Ask the service to assess `image` for flooding, using the fixed
    /// analysis prompt, and deliver its text to `on_complete`.
    pub fn analyze_image<F>(
        &self,
        credential: impl Into<String>,
        image: RasterImage,
        on_complete: F,
    ) -> PendingRequest
    where
        F: FnOnce(String) + Send + 'static,
    {
        self.dispatch(
            credential.into(),
            ContentRequest::multimodal(FLOOD_IMAGE_ANALYSIS, image),
            Canned::ImageAnalysis,
            on_complete,
        )
    }

    fn dispatch<F>(
        &self,
        credential: String,
        request: ContentRequest,
        canned: Canned,
        on_complete: F,
    ) -> PendingRequest
    where
        F: FnOnce(String) + Send + 'static,
    {
        let id = Uuid::new_v4();
        let (done_tx, done_rx) = oneshot::channel();
        let (issued_tx, issued_rx) = oneshot::channel::<()>();
        let backend = self.backend.clone();
        let context = Arc::clone(&self.context);

        debug!(%id, kind = request.kind(), mode = %self.mode(), "Relay request pending");

        self.runtime.spawn(async move {
            let text = match backend {
                Backend::Live(service) => run_live(service, credential, request).await,
                Backend::Degraded(timing) => {
                    let (delay, report) = canned.resolve(&timing);
                    tokio::time::sleep(delay).await;
                    report.to_string()
                }
            };

            debug!(%id, "Relay request completed");

            // Never deliver while the issuing call is still on the caller's stack.
            let _ = issued_rx.await;

            context.post(Box::new(move || {
                on_complete(text);
                let _ = done_tx.send(());
            }));
        });

        let pending = PendingRequest { id, done: done_rx };
        let _ = issued_tx.send(());
        pending
    }
}

/// Run the service call on its own task so that a panic inside the service
/// still produces a completion.
async fn run_live(
    service: Arc<dyn ContentService>,
    credential: String,
    request: ContentRequest,
) -> String {
    let outcome =
        tokio::spawn(async move { service.generate(&credential, &request).await }).await;

    match outcome {
        Ok(result) => completion_text(result),
        Err(join_error) => format!("{}{}", ERROR_PREFIX, join_error),
    }
}

/// Render a service outcome as the text a completion handler receives.
pub fn completion_text(result: Result<Option<String>>) -> String {
    match result {
        Ok(Some(text)) if !text.is_empty() => text,
        Ok(_) => NO_RESPONSE_TEXT.to_string(),
        Err(e) => format!("{}{}", ERROR_PREFIX, e),
    }
}
