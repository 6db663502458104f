//! Nutrition estimate - the unit flowing through the resolution pipeline

use crate::{Confidence, NutritionFacts, Provenance, Verification};
use std::fmt;

/// Unique identifier for an analysis based on UUIDv7
///
/// Time-ordered, so identifiers sort chronologically in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnalysisId(u128);

impl AnalysisId {
    /// Generate a new UUIDv7-based AnalysisId
    ///
    /// # Examples
    ///
    /// ```
    /// use platewise_domain::AnalysisId;
    ///
    /// let id = AnalysisId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Parse an AnalysisId from its string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid analysis id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Milliseconds since the Unix epoch encoded in the id
    pub fn timestamp(&self) -> u64 {
        (self.0 >> 80) as u64
    }
}

impl Default for AnalysisId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// A nutrition estimate with confidence and provenance
///
/// Estimates are immutable once built; each pipeline stage produces a new
/// instance through the `with_*` methods.
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionEstimate {
    /// Food or meal name
    pub name: String,
    /// Confidence in the figures
    pub confidence: Confidence,
    /// Nutrition figures
    pub nutrition: NutritionFacts,
    /// Source that determined the figures
    pub provenance: Provenance,
    /// Cross-referencing outcome
    pub verification: Verification,
}

impl NutritionEstimate {
    /// Create an unverified estimate
    pub fn new(
        name: impl Into<String>,
        confidence: impl Into<Confidence>,
        nutrition: NutritionFacts,
        provenance: Provenance,
    ) -> Self {
        Self {
            name: name.into(),
            confidence: confidence.into(),
            nutrition,
            provenance,
            verification: Verification::NotAttempted,
        }
    }

    /// Copy with a different confidence
    pub fn with_confidence(&self, confidence: Confidence) -> Self {
        Self {
            confidence,
            ..self.clone()
        }
    }

    /// Copy with different figures and provenance
    pub fn with_nutrition(&self, nutrition: NutritionFacts, provenance: Provenance) -> Self {
        Self {
            nutrition,
            provenance,
            ..self.clone()
        }
    }

    /// Copy with a verification outcome
    pub fn with_verification(&self, verification: Verification) -> Self {
        Self {
            verification,
            ..self.clone()
        }
    }

    /// Variance against the compared secondary source, if any
    pub fn variance_percent(&self) -> Option<f64> {
        self.verification.variance_percent()
    }

    /// Copy with figures rounded to integers for display
    pub fn for_display(&self) -> Self {
        Self {
            nutrition: self.nutrition.rounded_for_display(),
            ..self.clone()
        }
    }
}
