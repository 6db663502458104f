//! Provenance and verification tracking

use crate::NutritionFacts;
use std::fmt;

/// Source that ultimately determined an estimate's figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Vision model estimate
    Ai,
    /// Static brand catalog hit
    BrandDatabase,
    /// Open Food Facts product
    OpenFoodFacts,
    /// Sum of the detected ingredients' own figures
    IngredientEstimation,
    /// Weighted average of the vision estimate and a secondary source
    Blended,
}

impl Provenance {
    /// Stable snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Ai => "ai",
            Provenance::BrandDatabase => "brand_database",
            Provenance::OpenFoodFacts => "open_food_facts",
            Provenance::IngredientEstimation => "ingredient_estimation",
            Provenance::Blended => "blended",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of cross-referencing an estimate against secondary sources
///
/// The variants are mutually exclusive. A variance is recorded only when a
/// secondary source was actually compared.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    /// No reconciliation ran
    NotAttempted,

    /// Lookups ran but none returned data
    NoMatchFound,

    /// Secondary figures adopted verbatim
    Matched {
        /// Source whose figures were adopted
        source: Provenance,
        /// Average percentage difference against the vision estimate
        variance_percent: f64,
    },

    /// Figures blended between the vision estimate and a secondary source
    Blended {
        /// Secondary source used for blending
        source: Provenance,
        /// Average percentage difference against the vision estimate
        variance_percent: f64,
    },

    /// Secondary source disagreed too much; vision figures kept
    Discrepancy {
        /// Disagreeing source
        source: Provenance,
        /// Average percentage difference against the vision estimate
        variance_percent: f64,
        /// The disagreeing figures, retained for transparency
        alternative: NutritionFacts,
    },
}

impl Verification {
    /// Variance against the compared source, if one was compared
    pub fn variance_percent(&self) -> Option<f64> {
        match self {
            Verification::Matched { variance_percent, .. }
            | Verification::Blended { variance_percent, .. }
            | Verification::Discrepancy { variance_percent, .. } => Some(*variance_percent),
            Verification::NotAttempted | Verification::NoMatchFound => None,
        }
    }

    /// Secondary source that was compared, if any
    pub fn compared_source(&self) -> Option<Provenance> {
        match self {
            Verification::Matched { source, .. }
            | Verification::Blended { source, .. }
            | Verification::Discrepancy { source, .. } => Some(*source),
            Verification::NotAttempted | Verification::NoMatchFound => None,
        }
    }

    /// Whether any secondary source returned data
    pub fn online_data_found(&self) -> bool {
        self.compared_source().is_some()
    }

    /// Short label for display
    pub fn label(&self) -> &'static str {
        match self {
            Verification::NotAttempted => "unverified",
            Verification::NoMatchFound => "no_match_found",
            Verification::Matched { .. } => "matched",
            Verification::Blended { .. } => "blended",
            Verification::Discrepancy { .. } => "discrepancy",
        }
    }
}
