//! Platewise Domain Layer
//!
//! Core value objects and pure computations for meal nutrition resolution.
//! This crate performs no I/O and has a single external dependency (`uuid`).
//!
//! ## Key Concepts
//!
//! - **NutritionFacts**: Seven nutrient figures (kcal, grams, milligrams)
//! - **Confidence**: A score clamped to [0, 100]
//! - **Provenance**: Which source determined the final figures
//! - **Verification**: The outcome of cross-referencing against other sources
//! - **Variance**: Average percentage difference between two estimates
//!
//! ## Architecture
//!
//! Infrastructure (HTTP clients, credential rotation, catalogs) lives in
//! other crates and depends on the types defined here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod barcode;
pub mod confidence;
pub mod estimate;
pub mod nutrition;
pub mod provenance;
pub mod variance;

// Re-exports for convenience
pub use barcode::{validate_barcode, BarcodeError};
pub use confidence::Confidence;
pub use estimate::{AnalysisId, NutritionEstimate};
pub use nutrition::{Nutrient, NutritionFacts};
pub use provenance::{Provenance, Verification};
pub use variance::{blend, variance_percent};
