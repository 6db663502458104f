//! Platewise Vision Layer
//!
//! Access to the multimodal model that turns a meal photo into a nutrition
//! estimate, plus the credential failover that sits in front of it.
//!
//! # Architecture
//!
//! ```text
//! VisionClassifier → KeyRotationGateway → VisionBackend (Gemini) → provider
//! ```
//!
//! # Backends
//!
//! - `MockBackend`: Deterministic mock for testing and demo mode
//! - `GeminiClient`: Google Gemini `generateContent` API
//!
//! # Examples
//!
//! ```
//! use platewise_vision::{MockBackend, VisionBackend, VisionRequest};
//!
//! # async fn example() {
//! let backend = MockBackend::new(r#"{"name": "Toast"}"#);
//! let request = VisionRequest::new("describe", vec![0xFF, 0xD8], "image/jpeg");
//! let text = backend.generate("key-1", &request).await.unwrap();
//! assert!(text.contains("Toast"));
//! # }
//! ```

#![warn(missing_docs)]

pub mod classifier;
pub mod credentials;
pub mod gateway;
pub mod gemini;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub use classifier::VisionClassifier;
pub use credentials::{mask_secret, CredentialPool};
pub use gateway::{Clock, CredentialStatus, GatewayError, KeyRotationGateway, ManualClock, SystemClock};
pub use gemini::GeminiClient;

/// Errors that can occur while calling the vision provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VisionError {
    /// Credential quota or rate limit exhausted
    #[error("Quota exhausted: {0}")]
    QuotaExceeded(String),

    /// Credential rejected
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Network or transport failure
    #[error("Communication error: {0}")]
    Communication(String),

    /// Response could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request exceeded its deadline
    #[error("Request timed out")]
    Timeout,
}

impl VisionError {
    /// Whether this error signals quota or rate-limit exhaustion
    ///
    /// HTTP 429 always qualifies; otherwise the message is searched for
    /// "quota", "rate limit" or "resource exhausted".
    pub fn is_quota_exhausted(&self) -> bool {
        match self {
            VisionError::QuotaExceeded(_) => true,
            VisionError::Http { status, body } => *status == 429 || mentions_quota(body),
            VisionError::Communication(msg) | VisionError::InvalidResponse(msg) => {
                mentions_quota(msg)
            }
            VisionError::Auth(_) | VisionError::Timeout => false,
        }
    }
}

/// Case-insensitive check for provider quota wording
pub fn mentions_quota(text: &str) -> bool {
    let lower = text.to_lowercase();
    ["quota", "rate limit", "rate-limit", "resource exhausted", "resource_exhausted"]
        .iter()
        .any(|needle| lower.contains(needle))
}

/// An image plus the instruction prompt sent with it
#[derive(Debug, Clone, PartialEq)]
pub struct VisionRequest {
    /// Instruction text
    pub prompt: String,
    /// Raw image bytes
    pub image: Vec<u8>,
    /// MIME type of the image (e.g. "image/jpeg")
    pub mime_type: String,
}

impl VisionRequest {
    /// Create a new request
    pub fn new(prompt: impl Into<String>, image: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image,
            mime_type: mime_type.into(),
        }
    }
}

/// A multimodal model endpoint
///
/// Implementations make exactly one call per invocation; credential
/// selection and failover belong to [`KeyRotationGateway`].
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Send the request with the given credential and return the model's text
    async fn generate(&self, api_key: &str, request: &VisionRequest) -> Result<String, VisionError>;
}

/// Scripted outcome for a [`MockBackend`] credential
#[derive(Debug, Clone, PartialEq)]
pub enum MockOutcome {
    /// Return this text
    Respond(String),
    /// Fail with a quota error
    Quota,
    /// Fail with a non-quota error
    Fail(VisionError),
}

/// Mock vision backend for deterministic testing
///
/// Returns a default response unless an outcome was scripted for the
/// credential used. Records which credentials and prompts were used, in
/// order.
///
/// # Examples
///
/// ```
/// use platewise_vision::{MockBackend, MockOutcome};
///
/// let mut backend = MockBackend::new("fallback");
/// backend.add_outcome("key-1", MockOutcome::Quota);
/// assert_eq!(backend.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockBackend {
    default_response: String,
    outcomes: Arc<Mutex<HashMap<String, MockOutcome>>>,
    calls: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    /// Create a MockBackend with a fixed response for all credentials
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            outcomes: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script the outcome for a specific credential
    pub fn add_outcome(&mut self, api_key: impl Into<String>, outcome: MockOutcome) {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(api_key.into(), outcome);
    }

    /// Number of calls made
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Credentials used, in call order
    pub fn keys_used(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Prompt of the most recent call
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap_or_else(PoisonError::into_inner).last().cloned()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("{}")
    }
}

#[async_trait]
impl VisionBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, api_key: &str, request: &VisionRequest) -> Result<String, VisionError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(api_key.to_string());
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.prompt.clone());

        let outcome = self
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(api_key)
            .cloned();

        match outcome {
            Some(MockOutcome::Respond(text)) => Ok(text),
            Some(MockOutcome::Quota) => Err(VisionError::QuotaExceeded(
                "Resource has been exhausted (e.g. check quota).".to_string(),
            )),
            Some(MockOutcome::Fail(e)) => Err(e),
            None => Ok(self.default_response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> VisionRequest {
        VisionRequest::new("prompt", vec![1, 2, 3], "image/png")
    }

    #[test]
    fn test_quota_detection() {
        assert!(VisionError::QuotaExceeded("x".into()).is_quota_exhausted());
        assert!(VisionError::Http { status: 429, body: String::new() }.is_quota_exhausted());
        assert!(VisionError::Http {
            status: 403,
            body: "Quota exceeded for quota metric".into()
        }
        .is_quota_exhausted());
        assert!(VisionError::Communication("RESOURCE_EXHAUSTED".into()).is_quota_exhausted());
        assert!(VisionError::Communication("Rate limit reached".into()).is_quota_exhausted());
    }

    #[test]
    fn test_non_quota_errors() {
        assert!(!VisionError::Auth("API key not valid".into()).is_quota_exhausted());
        assert!(!VisionError::Timeout.is_quota_exhausted());
        assert!(!VisionError::Http { status: 400, body: "bad request".into() }.is_quota_exhausted());
        assert!(!VisionError::Communication("connection refused".into()).is_quota_exhausted());
    }

    #[tokio::test]
    async fn test_mock_backend_default() {
        let backend = MockBackend::new("Test response");
        assert_eq!(backend.last_prompt(), None);
        let result = backend.generate("k", &request()).await;
        assert_eq!(result.unwrap(), "Test response");
        assert_eq!(backend.call_count(), 1);
        assert_eq!(backend.last_prompt().as_deref(), Some("prompt"));
    }

    #[tokio::test]
    async fn test_mock_backend_scripted_outcomes() {
        let mut backend = MockBackend::default();
        backend.add_outcome("a", MockOutcome::Quota);
        backend.add_outcome("b", MockOutcome::Respond("hello".into()));
        backend.add_outcome("c", MockOutcome::Fail(VisionError::Timeout));

        assert!(backend.generate("a", &request()).await.unwrap_err().is_quota_exhausted());
        assert_eq!(backend.generate("b", &request()).await.unwrap(), "hello");
        assert_eq!(backend.generate("c", &request()).await.unwrap_err(), VisionError::Timeout);
        assert_eq!(backend.keys_used(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mock_backend_clone_shares_calls() {
        let backend1 = MockBackend::new("x");
        let backend2 = backend1.clone();
        backend1.generate("k", &request()).await.unwrap();
        assert_eq!(backend2.call_count(), 1);
    }
}
