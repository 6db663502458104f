//! Analysis types

use platewise_domain::{AnalysisId, Confidence, NutritionEstimate, NutritionFacts, Provenance};
use std::fmt;

/// Meal category reported by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealType {
    /// Breakfast
    Breakfast,
    /// Lunch
    Lunch,
    /// Dinner
    Dinner,
    /// Snack
    Snack,
}

impl MealType {
    /// Parse a classifier label, ignoring case and surrounding space
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "breakfast" | "brunch" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" | "supper" => Some(MealType::Dinner),
            "snack" | "dessert" => Some(MealType::Snack),
            _ => None,
        }
    }

    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ingredient detected in the photo
#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    /// Ingredient name
    pub name: String,

    /// Free-text amount ("150 g", "1 cup")
    pub amount: Option<String>,

    /// The ingredient's own figures, when the classifier gave them
    pub nutrition: Option<NutritionFacts>,
}

impl Ingredient {
    /// Create an ingredient without figures
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: None,
            nutrition: None,
        }
    }

    /// Attach figures
    pub fn with_nutrition(mut self, nutrition: NutritionFacts) -> Self {
        self.nutrition = Some(nutrition);
        self
    }

    /// Attach an amount
    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }
}

/// The classifier's structured answer
#[derive(Debug, Clone, PartialEq)]
pub struct MealAnalysis {
    /// Meal name
    pub name: String,

    /// Self-reported confidence
    pub confidence: Confidence,

    /// Estimated figures for the whole meal
    pub nutrition: NutritionFacts,

    /// Detected ingredients
    pub ingredients: Vec<Ingredient>,

    /// Dietary suggestions
    pub suggestions: Vec<String>,

    /// Health score (0-10)
    pub health_score: Option<u8>,

    /// Meal category
    pub meal_type: Option<MealType>,
}

impl MealAnalysis {
    /// The raw estimate, before any cross-referencing
    pub fn to_estimate(&self) -> NutritionEstimate {
        NutritionEstimate::new(self.name.clone(), self.confidence, self.nutrition, Provenance::Ai)
    }
}

/// Result of one photo analysis
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Analysis identifier (time-ordered)
    pub id: AnalysisId,

    /// Parsed classifier answer
    pub analysis: MealAnalysis,

    /// Reconciled estimate
    pub estimate: NutritionEstimate,

    /// Produced from canned demo data, not a real classifier
    pub demo: bool,

    /// Wall time spent (milliseconds)
    pub elapsed_ms: u64,
}
