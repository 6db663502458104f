//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use platewise_analyzer::AnalysisReport;
use platewise_catalog::{BrandMatch, FoodProduct};
use platewise_domain::{Nutrient, NutritionEstimate, NutritionFacts, Verification};
use platewise_vision::CredentialStatus;
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self { format, color_enabled }
    }

    /// Format an analysis report.
    pub fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&report_json(report))?),
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Quiet => Ok(quiet_line(&report.estimate.name, &report.estimate.nutrition)),
        }
    }

    fn format_report_table(&self, report: &AnalysisReport) -> String {
        let estimate = report.estimate.for_display();
        let mut out = String::new();

        if report.demo {
            out.push_str(&self.warning("Demo mode: sample output, no photo was analyzed"));
            out.push('\n');
        }
        out.push_str(&self.colorize(&estimate.name, "cyan"));
        out.push_str(&format!(
            "\nConfidence: {:.0}%   Source: {}   Verification: {}\n",
            estimate.confidence.value(),
            estimate.provenance,
            self.verification_label(&estimate.verification),
        ));

        out.push_str(&nutrition_table(&estimate.nutrition));
        out.push('\n');

        if let Verification::Discrepancy {
            source, alternative, ..
        } = &report.estimate.verification
        {
            out.push_str(&self.warning(&format!(
                "{} suggests {:.0} kcal, {:.0} g protein, {:.0} g carbs, {:.0} g fat",
                source,
                alternative.calories.round(),
                alternative.protein.round(),
                alternative.carbs.round(),
                alternative.fat.round()
            )));
            out.push('\n');
        }

        let analysis = &report.analysis;
        if !analysis.ingredients.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Ingredient", "Amount", "Calories"]);
            for ingredient in &analysis.ingredients {
                builder.push_record([
                    ingredient.name.clone(),
                    ingredient.amount.clone().unwrap_or_else(|| "-".to_string()),
                    ingredient
                        .nutrition
                        .map(|n| format!("{:.0}", n.calories.round()))
                        .unwrap_or_else(|| "-".to_string()),
                ]);
            }
            out.push_str(&styled(builder));
            out.push('\n');
        }

        if let Some(score) = analysis.health_score {
            out.push_str(&format!("Health score: {}/10\n", score));
        }
        for suggestion in &analysis.suggestions {
            out.push_str(&self.info(suggestion));
            out.push('\n');
        }

        out.push_str(&format!("Analyzed in {} ms", report.elapsed_ms));
        out
    }

    /// Format food database products.
    pub fn format_products(&self, products: &[FoodProduct]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let items: Vec<Value> = products.iter().map(product_json).collect();
                Ok(serde_json::to_string_pretty(&items)?)
            }
            OutputFormat::Table => {
                if products.is_empty() {
                    return Ok(self.colorize("No products found.", "yellow"));
                }

                let mut builder = Builder::default();
                builder.push_record(["Barcode", "Product", "Serving", "Basis", "Calories", "Protein", "Carbs", "Fat"]);
                for product in products {
                    let nutrition = product.portion_nutrition().rounded_for_display();
                    builder.push_record([
                        product.barcode.clone().unwrap_or_else(|| "-".to_string()),
                        product.display_name(),
                        product.serving_size.clone().unwrap_or_else(|| "-".to_string()),
                        portion_basis(product).to_string(),
                        format!("{:.0}", nutrition.calories),
                        format!("{:.0} g", nutrition.protein),
                        format!("{:.0} g", nutrition.carbs),
                        format!("{:.0} g", nutrition.fat),
                    ]);
                }
                Ok(styled(builder))
            }
            OutputFormat::Quiet => Ok(products
                .iter()
                .map(|p| quiet_line(&p.display_name(), &p.portion_nutrition()))
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format a brand catalog hit.
    pub fn format_brand_match(&self, found: &BrandMatch) -> Result<String> {
        let estimate = found.to_estimate();
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&estimate_json(&estimate))?),
            OutputFormat::Table => Ok(format!(
                "{}\nConfidence: {:.0}%\n{}",
                self.colorize(&estimate.name, "cyan"),
                estimate.confidence.value(),
                nutrition_table(&estimate.nutrition.rounded_for_display())
            )),
            OutputFormat::Quiet => Ok(quiet_line(&estimate.name, &estimate.nutrition)),
        }
    }

    /// Format credential slots.
    pub fn format_keys(&self, slots: &[CredentialStatus]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let items: Vec<Value> = slots
                    .iter()
                    .map(|s| {
                        json!({
                            "slot": s.id,
                            "key": s.masked,
                            "available": s.is_available(),
                            "cooldown_remaining_secs": s.cooldown_remaining.map(|d| d.as_secs()),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&items)?)
            }
            OutputFormat::Table => {
                if slots.is_empty() {
                    return Ok(self.warning("No vision API keys configured. Set GEMINI_API_KEY or add api_keys to the config file."));
                }

                let mut builder = Builder::default();
                builder.push_record(["Slot", "Key", "Status"]);
                for slot in slots {
                    let status = match slot.cooldown_remaining {
                        Some(remaining) => format!("cooling down ({} min left)", remaining.as_secs() / 60),
                        None => "available".to_string(),
                    };
                    builder.push_record([slot.id.to_string(), slot.masked.clone(), status]);
                }
                Ok(styled(builder))
            }
            OutputFormat::Quiet => Ok(slots.iter().map(|s| s.masked.clone()).collect::<Vec<_>>().join("\n")),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn verification_label(&self, verification: &Verification) -> String {
        let label = match verification.variance_percent() {
            Some(variance) => format!("{} ({:.1}% variance)", verification.label(), variance),
            None => verification.label().to_string(),
        };
        match verification {
            Verification::Matched { .. } => self.colorize(&label, "green"),
            Verification::Discrepancy { .. } => self.colorize(&label, "yellow"),
            _ => label,
        }
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn styled(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn nutrition_table(nutrition: &NutritionFacts) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Nutrient", "Amount"]);
    for nutrient in Nutrient::ALL {
        builder.push_record([
            nutrient.as_str().to_string(),
            format!("{} {}", nutrition.get(nutrient), nutrient.unit()),
        ]);
    }
    styled(builder)
}

/// What the portion figures of a product refer to
fn portion_basis(product: &FoodProduct) -> &'static str {
    if product.has_serving_figures() {
        "per serving"
    } else {
        "per 100 g"
    }
}

fn quiet_line(name: &str, nutrition: &NutritionFacts) -> String {
    format!("{}\t{:.0}", name, nutrition.calories.round())
}

/// JSON object keyed by nutrient name
pub fn nutrition_json(nutrition: &NutritionFacts) -> Value {
    let map = Nutrient::ALL
        .iter()
        .map(|n| (n.as_str().to_string(), json!(nutrition.get(*n))))
        .collect::<serde_json::Map<_, _>>();
    Value::Object(map)
}

fn verification_json(verification: &Verification) -> Value {
    let mut value = json!({
        "status": verification.label(),
        "source": verification.compared_source().map(|s| s.as_str()),
        "variance_percent": verification.variance_percent(),
    });
    if let Verification::Discrepancy { alternative, .. } = verification {
        value["alternative"] = nutrition_json(alternative);
    }
    value
}

fn estimate_json(estimate: &NutritionEstimate) -> Value {
    json!({
        "name": estimate.name,
        "confidence": estimate.confidence.value(),
        "provenance": estimate.provenance.as_str(),
        "nutrition": nutrition_json(&estimate.nutrition),
        "verification": verification_json(&estimate.verification),
    })
}

fn report_json(report: &AnalysisReport) -> Value {
    let analysis = &report.analysis;
    let ingredients: Vec<Value> = analysis
        .ingredients
        .iter()
        .map(|i| {
            json!({
                "name": i.name,
                "amount": i.amount,
                "nutrition": i.nutrition.as_ref().map(nutrition_json),
            })
        })
        .collect();

    json!({
        "id": report.id.to_string(),
        "demo": report.demo,
        "elapsed_ms": report.elapsed_ms,
        "estimate": estimate_json(&report.estimate),
        "analysis": {
            "name": analysis.name,
            "confidence": analysis.confidence.value(),
            "nutrition": nutrition_json(&analysis.nutrition),
            "ingredients": ingredients,
            "suggestions": analysis.suggestions,
            "health_score": analysis.health_score,
            "meal_type": analysis.meal_type.map(|m| m.as_str()),
        },
    })
}

fn product_json(product: &FoodProduct) -> Value {
    json!({
        "barcode": product.barcode,
        "name": product.name,
        "brand": product.brand,
        "serving_size": product.serving_size,
        "per_100g": nutrition_json(&product.per_100g),
        "per_serving": product.per_serving.as_ref().map(nutrition_json),
    })
}
