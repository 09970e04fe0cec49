use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
use crate::ai::ContentService;
use crate::models::ContentRequest;
use crate::Result;
use async_trait::async_trait;
use base64::Engine as _;
use std::time::Duration;

/// [`ContentService`] backed by Gemini's `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiContentClient {
    http: GeminiHttpClient,
}

impl GeminiContentClient {
    pub fn new(model: String) -> Self {
        Self::new_with_client(model, reqwest::Client::new())
    }

    pub fn new_with_client(model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(model, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }

    fn build_request(request: &ContentRequest) -> Result<GenerateContentRequest> {
        let mut parts = Vec::with_capacity(2);

        if let Some(image) = request.image() {
            let jpeg = image.to_jpeg()?;
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: "image/jpeg".to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(jpeg),
                },
            });
        }

        parts.push(Part::Text {
            text: request.prompt().to_string(),
        });

        Ok(GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
        })
    }
}

#[async_trait]
impl ContentService for GeminiContentClient {
    async fn generate(&self, credential: &str, request: &ContentRequest) -> Result<Option<String>> {
        tracing::debug!(
            "Sending {} request to Gemini (model: {})",
            request.kind(),
            self.model()
        );

        let body = Self::build_request(request)?;
        let response: GenerateContentResponse =
            self.http.generate_content(credential, &body).await?;

        Ok(response.first_text())
    }
}
