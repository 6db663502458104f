//! Error types for the CLI application.

use platewise_analyzer::AnalyzerError;
use platewise_catalog::CatalogError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis failed; shown with the analyzer's user-facing message
    #[error("{}", .0.user_message())]
    Analysis(#[from] AnalyzerError),

    /// Food database or brand catalog error
    #[error("Food lookup failed: {0}")]
    Catalog(#[from] CatalogError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Ctrl-C arrived before the command finished
    #[error("Interrupted")]
    Interrupted,
}
