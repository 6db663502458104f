//! Nutrition facts value object

use std::fmt;

/// One of the seven tracked nutrient keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nutrient {
    /// Energy in kcal
    Calories,
    /// Protein in grams
    Protein,
    /// Carbohydrates in grams
    Carbs,
    /// Fat in grams
    Fat,
    /// Dietary fiber in grams
    Fiber,
    /// Sugars in grams
    Sugar,
    /// Sodium in milligrams
    Sodium,
}

impl Nutrient {
    /// All nutrients in display order
    pub const ALL: [Nutrient; 7] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbs,
        Nutrient::Fat,
        Nutrient::Fiber,
        Nutrient::Sugar,
        Nutrient::Sodium,
    ];

    /// Keys compared when computing variance between two estimates
    pub const MACROS: [Nutrient; 4] = [
        Nutrient::Calories,
        Nutrient::Protein,
        Nutrient::Carbs,
        Nutrient::Fat,
    ];

    /// Wire name of the nutrient (matches the classifier JSON keys)
    pub fn as_str(&self) -> &'static str {
        match self {
            Nutrient::Calories => "calories",
            Nutrient::Protein => "protein",
            Nutrient::Carbs => "carbs",
            Nutrient::Fat => "fat",
            Nutrient::Fiber => "fiber",
            Nutrient::Sugar => "sugar",
            Nutrient::Sodium => "sodium",
        }
    }

    /// Display unit
    pub fn unit(&self) -> &'static str {
        match self {
            Nutrient::Calories => "kcal",
            Nutrient::Sodium => "mg",
            _ => "g",
        }
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nutrition figures for a food or meal
///
/// All values are non-negative. Values built from external data go through
/// [`NutritionFacts::new`] or [`NutritionFacts::set`], which clamp negatives
/// and non-finite numbers to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NutritionFacts {
    /// Energy (kcal)
    pub calories: f64,
    /// Protein (g)
    pub protein: f64,
    /// Carbohydrates (g)
    pub carbs: f64,
    /// Fat (g)
    pub fat: f64,
    /// Fiber (g)
    pub fiber: f64,
    /// Sugar (g)
    pub sugar: f64,
    /// Sodium (mg)
    pub sodium: f64,
}

impl NutritionFacts {
    /// Create nutrition facts from macro figures; fiber, sugar and sodium start at zero
    pub fn new(calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        let mut facts = Self::default();
        facts.set(Nutrient::Calories, calories);
        facts.set(Nutrient::Protein, protein);
        facts.set(Nutrient::Carbs, carbs);
        facts.set(Nutrient::Fat, fat);
        facts
    }

    /// Builder-style setter for a single nutrient
    pub fn with(mut self, nutrient: Nutrient, value: f64) -> Self {
        self.set(nutrient, value);
        self
    }

    /// Get a nutrient value
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::Carbs => self.carbs,
            Nutrient::Fat => self.fat,
            Nutrient::Fiber => self.fiber,
            Nutrient::Sugar => self.sugar,
            Nutrient::Sodium => self.sodium,
        }
    }

    /// Set a nutrient value, clamping negatives and NaN to zero
    pub fn set(&mut self, nutrient: Nutrient, value: f64) {
        let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
        match nutrient {
            Nutrient::Calories => self.calories = value,
            Nutrient::Protein => self.protein = value,
            Nutrient::Carbs => self.carbs = value,
            Nutrient::Fat => self.fat = value,
            Nutrient::Fiber => self.fiber = value,
            Nutrient::Sugar => self.sugar = value,
            Nutrient::Sodium => self.sodium = value,
        }
    }

    /// A nutrient is present when it carries a strictly positive figure
    pub fn is_present(&self, nutrient: Nutrient) -> bool {
        self.get(nutrient) > 0.0
    }

    /// True when no nutrient is present
    pub fn is_empty(&self) -> bool {
        Nutrient::ALL.iter().all(|n| !self.is_present(*n))
    }

    /// Apply `f` to every nutrient
    pub fn map(&self, mut f: impl FnMut(Nutrient, f64) -> f64) -> Self {
        let mut out = Self::default();
        for nutrient in Nutrient::ALL {
            out.set(nutrient, f(nutrient, self.get(nutrient)));
        }
        out
    }

    /// Scale every nutrient by `factor` (e.g. per-100g → per-portion)
    pub fn scaled(&self, factor: f64) -> Self {
        self.map(|_, v| v * factor)
    }

    /// Sum a sequence of nutrition facts
    pub fn sum<'a>(items: impl IntoIterator<Item = &'a NutritionFacts>) -> Self {
        items.into_iter().fold(Self::default(), |mut acc, item| {
            for nutrient in Nutrient::ALL {
                acc.set(nutrient, acc.get(nutrient) + item.get(nutrient));
            }
            acc
        })
    }

    /// Round every nutrient to one decimal place
    pub fn round_to_tenth(&self) -> Self {
        self.map(|_, v| round_to_tenth(v))
    }

    /// Round every nutrient to an integer for display
    pub fn rounded_for_display(&self) -> Self {
        self.map(|_, v| v.round())
    }
}

/// Round to one decimal place
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_negative_values() {
        let facts = NutritionFacts::new(-10.0, 5.0, f64::NAN, 3.0);
        assert_eq!(facts.calories, 0.0);
        assert_eq!(facts.protein, 5.0);
        assert_eq!(facts.carbs, 0.0);
        assert_eq!(facts.fat, 3.0);
    }

    #[test]
    fn test_presence_is_strictly_positive() {
        let facts = NutritionFacts::new(100.0, 0.0, 10.0, 0.0);
        assert!(facts.is_present(Nutrient::Calories));
        assert!(!facts.is_present(Nutrient::Protein));
        assert!(!facts.is_present(Nutrient::Sodium));
        assert!(!facts.is_empty());
        assert!(NutritionFacts::default().is_empty());
    }

    #[test]
    fn test_sum() {
        let a = NutritionFacts::new(100.0, 5.0, 10.0, 2.0).with(Nutrient::Sodium, 120.0);
        let b = NutritionFacts::new(50.0, 1.5, 4.0, 1.0).with(Nutrient::Fiber, 2.0);
        let total = NutritionFacts::sum([&a, &b]);
        assert_eq!(total.calories, 150.0);
        assert_eq!(total.protein, 6.5);
        assert_eq!(total.fiber, 2.0);
        assert_eq!(total.sodium, 120.0);
    }

    #[test]
    fn test_rounding() {
        let facts = NutritionFacts::new(512.46, 19.04, 47.55, 20.5);
        let tenth = facts.round_to_tenth();
        assert_eq!(tenth.calories, 512.5);
        assert_eq!(tenth.protein, 19.0);

        let display = facts.rounded_for_display();
        assert_eq!(display.calories, 512.0);
        assert_eq!(display.carbs, 48.0);
    }

    #[test]
    fn test_scaled() {
        let per_100g = NutritionFacts::new(250.0, 10.0, 30.0, 8.0);
        let portion = per_100g.scaled(1.5);
        assert_eq!(portion.calories, 375.0);
        assert_eq!(portion.fat, 12.0);
    }
}
