//! Error types for the analyzer

use platewise_vision::{GatewayError, VisionError};
use thiserror::Error;

/// Errors that can occur while analyzing a meal photo
///
/// Only the primary classifier path produces these. Failures of the
/// corroborating lookups are absorbed by the reconciler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    /// No vision API credential is configured
    #[error("No vision API credentials configured")]
    NotConfigured,

    /// Every credential is cooling down after quota exhaustion
    #[error("All vision API credentials are rate limited")]
    AllCredentialsExhausted,

    /// Image rejected before any call was made
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Classifier did not answer in time
    #[error("Classifier timeout")]
    Timeout,

    /// Classifier call failed (network, auth, provider error)
    #[error("Classifier failure: {0}")]
    ClassifierFailure(String),

    /// Classifier answered with unparsable or incomplete JSON
    #[error("Invalid classifier response: {0}")]
    InvalidResponseShape(String),

    /// Reading the input failed
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalyzerError {
    /// Message suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            AnalyzerError::NotConfigured => {
                "Photo analysis is not configured. Set GEMINI_API_KEY (or add api_keys to the config file), \
                 or run with --demo to see sample output."
                    .to_string()
            }
            AnalyzerError::AllCredentialsExhausted => {
                "Photo analysis is temporarily unavailable because the daily quota has been reached. \
                 Please try again later."
                    .to_string()
            }
            AnalyzerError::InvalidImage(reason) => {
                format!("That file can't be analyzed: {}. Use a JPEG, PNG, WebP or GIF photo.", reason)
            }
            AnalyzerError::Timeout => "The analysis took too long. Please try again.".to_string(),
            AnalyzerError::ClassifierFailure(_) | AnalyzerError::InvalidResponseShape(_) => {
                "The meal could not be analyzed right now. Please try again with a clearer photo.".to_string()
            }
            AnalyzerError::Io(reason) => format!("Could not read the image: {}", reason),
            AnalyzerError::Config(reason) => format!("Configuration problem: {}", reason),
        }
    }

    /// Whether retrying later can succeed without user action
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AnalyzerError::AllCredentialsExhausted
                | AnalyzerError::Timeout
                | AnalyzerError::ClassifierFailure(_)
                | AnalyzerError::InvalidResponseShape(_)
        )
    }
}

impl From<GatewayError> for AnalyzerError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::NotConfigured => AnalyzerError::NotConfigured,
            GatewayError::AllCredentialsExhausted => AnalyzerError::AllCredentialsExhausted,
            GatewayError::Call(VisionError::Timeout) => AnalyzerError::Timeout,
            GatewayError::Call(e) => AnalyzerError::ClassifierFailure(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_errors_stay_distinct() {
        assert_eq!(AnalyzerError::from(GatewayError::NotConfigured), AnalyzerError::NotConfigured);
        assert_eq!(
            AnalyzerError::from(GatewayError::AllCredentialsExhausted),
            AnalyzerError::AllCredentialsExhausted
        );
        assert_eq!(
            AnalyzerError::from(GatewayError::Call(VisionError::Timeout)),
            AnalyzerError::Timeout
        );
        assert!(matches!(
            AnalyzerError::from(GatewayError::Call(VisionError::Auth("bad".into()))),
            AnalyzerError::ClassifierFailure(_)
        ));
    }

    #[test]
    fn test_user_messages_differ() {
        let not_configured = AnalyzerError::NotConfigured.user_message();
        let exhausted = AnalyzerError::AllCredentialsExhausted.user_message();
        assert!(not_configured.contains("not configured"));
        assert!(exhausted.contains("try again later"));
        assert_ne!(not_configured, exhausted);
        assert!(!AnalyzerError::NotConfigured.is_transient());
        assert!(AnalyzerError::AllCredentialsExhausted.is_transient());
    }
}
