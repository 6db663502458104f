//! Gemini Backend Implementation
//!
//! Integration with Google's Gemini `generateContent` API for image
//! understanding.
//!
//! # Features
//!
//! - Async HTTP communication with the Gemini REST API
//! - Inline base64 image payloads
//! - Quota/rate-limit detection so the gateway can fail over
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use platewise_vision::GeminiClient;
//!
//! let client = GeminiClient::new(
//!     "https://generativelanguage.googleapis.com",
//!     "gemini-1.5-flash",
//! ).unwrap();
//! ```

use crate::{mentions_quota, VisionBackend, VisionError, VisionRequest};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Gemini API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default multimodal model
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Default timeout for vision requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default sampling temperature; low for stable structured output
pub const DEFAULT_TEMPERATURE: f32 = 0.4;

/// Gemini API client
///
/// Makes a single request per call. Credential rotation is handled by
/// [`crate::KeyRotationGateway`].
pub struct GeminiClient {
    endpoint: String,
    model: String,
    client: reqwest::Client,
    temperature: f32,
}

/// Request body for the generateContent API
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

/// Response from the generateContent API
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// # Parameters
    ///
    /// - `endpoint`: API base URL (e.g., "https://generativelanguage.googleapis.com")
    /// - `model`: Model to use (e.g., "gemini-1.5-flash")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, VisionError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new Gemini client with a custom request timeout
    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, VisionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VisionError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
            temperature: DEFAULT_TEMPERATURE,
        })
    }

    /// Create a client against the public endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, VisionError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Model name
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.model)
    }

    fn build_body<'a>(&self, request: &'a VisionRequest) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: &request.prompt,
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: &request.mime_type,
                            data: BASE64.encode(&request.image),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        }
    }
}

/// Map a non-success response to an error
fn classify_failure(status: StatusCode, body: String) -> VisionError {
    if status == StatusCode::TOO_MANY_REQUESTS || mentions_quota(&body) {
        return VisionError::QuotaExceeded(body);
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => VisionError::Auth(body),
        // Gemini reports invalid keys as 400 INVALID_ARGUMENT
        StatusCode::BAD_REQUEST if body.contains("API_KEY_INVALID") || body.contains("API key not valid") => {
            VisionError::Auth(body)
        }
        _ => VisionError::Http {
            status: status.as_u16(),
            body,
        },
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(response: GenerateContentResponse) -> Result<String, VisionError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(VisionError::InvalidResponse(format!("Prompt blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| VisionError::InvalidResponse("Response has no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(VisionError::InvalidResponse(format!(
            "Candidate has no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

#[async_trait]
impl VisionBackend for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, api_key: &str, request: &VisionRequest) -> Result<String, VisionError> {
        let body = self.build_body(request);

        debug!(
            model = %self.model,
            image_bytes = request.image.len(),
            prompt_chars = request.prompt.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VisionError::Timeout
                } else {
                    VisionError::Communication(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(classify_failure(status, error_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| VisionError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_client_creation() {
        let client = GeminiClient::new("https://example.test/", "gemini-1.5-pro").unwrap();
        assert_eq!(client.endpoint, "https://example.test");
        assert_eq!(client.model(), "gemini-1.5-pro");
        assert_eq!(
            client.url(),
            "https://example.test/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let client = GeminiClient::default_endpoint(DEFAULT_MODEL).unwrap();
        let request = VisionRequest::new("Describe this meal", vec![0xFF, 0xD8, 0xFF], "image/jpeg");
        let json = serde_json::to_value(client.build_body(&request)).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "Describe this meal");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], "/9j/");
        assert!(json["generationConfig"]["temperature"].is_number());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"{\"name\":"},{"text":"\"Soup\"}"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), r#"{"name":"Soup"}"#);
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(matches!(extract_text(response), Err(VisionError::InvalidResponse(_))));
    }

    #[test]
    fn test_extract_text_empty_candidate() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#).unwrap();
        let err = extract_text(response).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, String::new()),
            VisionError::QuotaExceeded(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, "RESOURCE_EXHAUSTED".into()),
            VisionError::QuotaExceeded(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, "API key not valid. Please pass a valid API key.".into()),
            VisionError::Auth(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "boom".into()),
            VisionError::Http { status: 500, .. }
        ));
    }
}
