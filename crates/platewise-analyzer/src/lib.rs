//! Platewise Analyzer
//!
//! Turns a meal photo into a reconciled nutrition estimate.
//!
//! # Architecture
//!
//! ```text
//! Image → MealAnalyzer → VisionClassifier (KeyRotationGateway) → parser
//!       → NutritionReconciler (brand table, food database, ingredient sum)
//!       → AnalysisReport
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use platewise_analyzer::{AnalyzerConfig, MealAnalyzer, PromptBuilder};
//! use platewise_vision::CredentialPool;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AnalyzerConfig::default();
//! let pool = CredentialPool::from_config_and_env(&config.vision.api_keys);
//! let analyzer = MealAnalyzer::from_config(config, pool)?;
//!
//! let report = analyzer.analyze_file(Path::new("lunch.jpg"), &PromptBuilder::new()).await?;
//! println!("{}: {} kcal", report.estimate.name, report.estimate.nutrition.calories);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod config;
mod error;
mod image;
mod parser;
mod prompt;
mod reconciler;
mod types;

#[cfg(test)]
mod tests;

pub use analyzer::{load_brand_table, MealAnalyzer};
pub use config::{AnalyzerConfig, ReconcilerConfig, VisionConfig};
pub use error::AnalyzerError;
pub use image::{validate_image, ImageFormat};
pub use parser::{extract_json_object, parse_classifier_response, DEFAULT_CONFIDENCE};
pub use prompt::PromptBuilder;
pub use reconciler::{Decision, NutritionReconciler};
pub use types::{AnalysisReport, Ingredient, MealAnalysis, MealType};
