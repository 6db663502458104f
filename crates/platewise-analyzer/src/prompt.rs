//! Vision prompt for meal analysis

use crate::types::MealType;

/// Builds the prompt sent alongside the meal photo
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    notes: Option<String>,
    meal_type: Option<MealType>,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add user-supplied notes ("large portion", "no dressing")
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        if !notes.trim().is_empty() {
            self.notes = Some(notes.trim().to_string());
        }
        self
    }

    /// Hint the expected meal category
    pub fn with_meal_type(mut self, meal_type: MealType) -> Self {
        self.meal_type = Some(meal_type);
        self
    }

    /// Build the complete prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(ANALYSIS_INSTRUCTIONS);
        prompt.push_str("\n\n");

        if let Some(meal_type) = self.meal_type {
            prompt.push_str(&format!("The user logged this as {}.\n", meal_type));
        }
        if let Some(notes) = &self.notes {
            prompt.push_str("Notes from the user:\n---\n");
            prompt.push_str(notes);
            prompt.push_str("\n---\n");
        }
        if self.meal_type.is_some() || self.notes.is_some() {
            prompt.push('\n');
        }

        prompt.push_str(OUTPUT_FORMAT_REMINDER);
        prompt
    }
}

const ANALYSIS_INSTRUCTIONS: &str = r#"Analyze the food in this photo and estimate its nutrition for the portion shown.

Rules:
- Name the dish as specifically as possible; include the brand or restaurant when packaging or branding is visible (e.g. "McDonald's Big Mac")
- Estimate the whole visible portion, not 100 g
- Calories in kcal; protein, carbs, fat, fiber and sugar in grams; sodium in milligrams
- List the main ingredients with an approximate amount and their own nutrition figures
- confidence is 0-100 and reflects how sure you are of the identification and portion
- healthScore is 0-10
- mealType is one of breakfast, lunch, dinner, snack"#;

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (a single JSON object, no additional text):
{
  "name": "dish name",
  "confidence": 0-100,
  "nutrition": {"calories": 0, "protein": 0, "carbs": 0, "fat": 0, "fiber": 0, "sugar": 0, "sodium": 0},
  "ingredients": [
    {"name": "ingredient", "amount": "150 g", "nutrition": {"calories": 0, "protein": 0, "carbs": 0, "fat": 0}}
  ],
  "suggestions": ["short dietary suggestion"],
  "healthScore": 0-10,
  "mealType": "lunch"
}

Remember: Return ONLY valid JSON, no markdown code blocks, no explanations."#;
