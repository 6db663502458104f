//! Parse classifier output into a meal analysis

use crate::error::AnalyzerError;
use crate::types::{Ingredient, MealAnalysis, MealType};
use platewise_domain::{Confidence, Nutrient, NutritionFacts};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Confidence assumed when the classifier does not report one
pub const DEFAULT_CONFIDENCE: f64 = 70.0;

/// Parse the classifier's text into a [`MealAnalysis`]
///
/// The first well-formed JSON object in the text is used, so surrounding
/// prose and markdown fences are tolerated. A missing `name` or `nutrition`
/// is a hard failure, as is a `nutrition` object with no recognised figure.
/// Explicit zeros are kept.
pub fn parse_classifier_response(response: &str) -> Result<MealAnalysis, AnalyzerError> {
    let obj = extract_json_object(response).ok_or_else(|| {
        AnalyzerError::InvalidResponseShape("No JSON object found in classifier response".to_string())
    })?;

    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AnalyzerError::InvalidResponseShape("Missing or invalid 'name'".to_string()))?
        .to_string();

    let nutrition = obj
        .get("nutrition")
        .and_then(Value::as_object)
        .and_then(parse_nutrition)
        .ok_or_else(|| AnalyzerError::InvalidResponseShape("Missing or unrecognised 'nutrition'".to_string()))?;

    let confidence = obj
        .get("confidence")
        .and_then(number_like)
        .map(|c| if c > 0.0 && c <= 1.0 { c * 100.0 } else { c })
        .unwrap_or(DEFAULT_CONFIDENCE);

    let ingredients = obj
        .get("ingredients")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .enumerate()
                .filter_map(|(idx, item)| {
                    let parsed = parse_ingredient(item);
                    if parsed.is_none() {
                        warn!("Skipping unrecognized ingredient {}", idx);
                    }
                    parsed
                })
                .collect()
        })
        .unwrap_or_default();

    let suggestions = obj
        .get("suggestions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let health_score = field(&obj, &["healthScore", "health_score"])
        .and_then(number_like)
        .map(|s| s.round().clamp(0.0, 10.0) as u8);

    let meal_type = field(&obj, &["mealType", "meal_type"])
        .and_then(Value::as_str)
        .and_then(MealType::parse);

    let analysis = MealAnalysis {
        name,
        confidence: Confidence::new(confidence),
        nutrition,
        ingredients,
        suggestions,
        health_score,
        meal_type,
    };

    debug!(
        name = %analysis.name,
        confidence = analysis.confidence.value(),
        ingredients = analysis.ingredients.len(),
        "Parsed classifier response"
    );

    Ok(analysis)
}

/// Find the first well-formed JSON object embedded in `text`
///
/// One pass collects every balanced `{...}` span; spans are then tried in
/// order of their opening brace.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let mut open: Vec<usize> = Vec::new();
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in text.char_indices() {
        // Quotes only matter inside a candidate object
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(idx),
            '}' => {
                if let Some(start) = open.pop() {
                    spans.push((start, idx + 1));
                }
            }
            _ => {}
        }
    }

    spans.sort_unstable_by_key(|(start, _)| *start);
    spans
        .into_iter()
        .find_map(|(start, end)| match serde_json::from_str::<Value>(&text[start..end]) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        })
}

fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| obj.get(*name))
}

/// A number, or a string starting with one ("25g", "1,200 mg")
fn number_like(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            let numeric: String = cleaned
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            numeric.parse::<f64>().ok()
        }
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

fn nutrient_keys(nutrient: Nutrient) -> &'static [&'static str] {
    match nutrient {
        Nutrient::Calories => &["calories", "kcal", "energy"],
        Nutrient::Protein => &["protein"],
        Nutrient::Carbs => &["carbs", "carbohydrates"],
        Nutrient::Fat => &["fat"],
        Nutrient::Fiber => &["fiber", "fibre"],
        Nutrient::Sugar => &["sugar", "sugars"],
        Nutrient::Sodium => &["sodium"],
    }
}

/// Missing or malformed nutrients count as zero; `None` when no nutrient
/// key carries a number at all
fn parse_nutrition(obj: &Map<String, Value>) -> Option<NutritionFacts> {
    let mut facts = NutritionFacts::default();
    let mut recognised = false;
    for nutrient in Nutrient::ALL {
        if let Some(value) = field(obj, nutrient_keys(nutrient)).and_then(number_like) {
            facts.set(nutrient, value);
            recognised = true;
        }
    }
    recognised.then(|| facts.round_to_tenth())
}

fn parse_ingredient(value: &Value) -> Option<Ingredient> {
    match value {
        Value::String(name) if !name.trim().is_empty() => Some(Ingredient::new(name.trim())),
        Value::Object(obj) => {
            let name = obj.get("name").and_then(Value::as_str).map(str::trim).filter(|n| !n.is_empty())?;

            let amount = field(obj, &["amount", "quantity", "portion"]).and_then(|v| match v {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

            // Figures may be nested under "nutrition" or given inline
            let nutrition = obj
                .get("nutrition")
                .and_then(Value::as_object)
                .map_or_else(|| parse_nutrition(obj), parse_nutrition);

            Some(Ingredient {
                name: name.to_string(),
                amount,
                nutrition,
            })
        }
        _ => None,
    }
}
