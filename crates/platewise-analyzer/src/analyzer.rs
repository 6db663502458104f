//! Meal photo analysis pipeline

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::image::validate_image;
use crate::parser::parse_classifier_response;
use crate::prompt::PromptBuilder;
use crate::reconciler::NutritionReconciler;
use crate::types::AnalysisReport;
use platewise_catalog::{BrandLookupTable, FoodDatabase, OpenFoodFactsClient};
use platewise_domain::AnalysisId;
use platewise_vision::{
    CredentialPool, GeminiClient, KeyRotationGateway, MockBackend, VisionClassifier, VisionRequest,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info};

/// Canned classifier answer used in demo mode
const DEMO_RESPONSE: &str = r#"{
  "name": "Grilled Chicken Caesar Salad",
  "confidence": 82,
  "nutrition": {"calories": 470, "protein": 38, "carbs": 18, "fat": 27, "fiber": 4, "sugar": 4, "sodium": 890},
  "ingredients": [
    {"name": "romaine lettuce", "amount": "100 g", "nutrition": {"calories": 17, "protein": 1.2, "carbs": 3.3, "fat": 0.3, "fiber": 2.1}},
    {"name": "grilled chicken breast", "amount": "140 g", "nutrition": {"calories": 230, "protein": 43, "carbs": 0, "fat": 5}},
    {"name": "parmesan", "amount": "25 g", "nutrition": {"calories": 100, "protein": 9, "carbs": 1, "fat": 7, "sodium": 390}},
    {"name": "caesar dressing", "amount": "2 tbsp", "nutrition": {"calories": 150, "protein": 1, "carbs": 1, "fat": 16, "sodium": 300}},
    {"name": "croutons", "amount": "15 g", "nutrition": {"calories": 65, "protein": 2, "carbs": 10, "fat": 2, "sodium": 120}}
  ],
  "suggestions": ["Ask for the dressing on the side", "Add a whole-grain roll for more fiber"],
  "healthScore": 7,
  "mealType": "lunch"
}"#;

/// Key used by the demo gateway; never sent anywhere
const DEMO_KEY: &str = "demo-offline-key";

/// Analyzes meal photos: classify, parse, reconcile
pub struct MealAnalyzer {
    classifier: VisionClassifier,
    reconciler: NutritionReconciler,
    config: AnalyzerConfig,
    demo: bool,
}

impl MealAnalyzer {
    /// Create an analyzer from its parts
    pub fn new(classifier: VisionClassifier, reconciler: NutritionReconciler, config: AnalyzerConfig) -> Self {
        Self {
            classifier,
            reconciler,
            config,
            demo: false,
        }
    }

    /// Build the production analyzer: Gemini behind the gateway, Open Food
    /// Facts and the brand table as corroborating sources
    pub fn from_config(config: AnalyzerConfig, pool: CredentialPool) -> Result<Self, AnalyzerError> {
        config.validate().map_err(AnalyzerError::Config)?;

        let backend = GeminiClient::with_timeout(
            config.vision.endpoint.clone(),
            config.vision.model.clone(),
            config.classifier_timeout(),
        )
        .map_err(|e| AnalyzerError::Config(e.to_string()))?
        .with_temperature(config.vision.temperature);

        let gateway = KeyRotationGateway::new(pool).with_cooldown(config.vision.cooldown());
        info!(
            credentials = gateway.len(),
            model = %config.vision.model,
            "Vision gateway ready"
        );

        let database: Arc<dyn FoodDatabase> = Arc::new(
            OpenFoodFactsClient::new(&config.food_database).map_err(|e| AnalyzerError::Config(e.to_string()))?,
        );

        let reconciler = NutritionReconciler::new(
            Arc::new(load_brand_table(&config)?),
            Some(database),
            config.reconciler.clone(),
        );

        let classifier = VisionClassifier::new(Arc::new(backend), Arc::new(gateway));
        Ok(Self::new(classifier, reconciler, config))
    }

    /// Analyzer over canned data; reports are flagged as demo output
    ///
    /// Makes no network calls: the food database is disabled and the
    /// classifier is a mock.
    pub fn demo(config: AnalyzerConfig) -> Self {
        let backend = MockBackend::new(DEMO_RESPONSE);
        let gateway = KeyRotationGateway::new(CredentialPool::new([DEMO_KEY]));
        let classifier = VisionClassifier::new(Arc::new(backend), Arc::new(gateway));
        let reconciler = NutritionReconciler::offline(Arc::new(BrandLookupTable::builtin()), config.reconciler.clone());

        Self {
            classifier,
            reconciler,
            config,
            demo: true,
        }
    }

    /// Whether this analyzer serves canned data
    pub fn is_demo(&self) -> bool {
        self.demo
    }

    /// The classifier, for credential status reporting
    pub fn classifier(&self) -> &VisionClassifier {
        &self.classifier
    }

    /// Analyze an image file
    pub async fn analyze_file(&self, path: &Path, prompt: &PromptBuilder) -> Result<AnalysisReport, AnalyzerError> {
        let image = tokio::fs::read(path)
            .await
            .map_err(|e| AnalyzerError::Io(format!("{}: {}", path.display(), e)))?;
        self.analyze(&image, prompt).await
    }

    /// Analyze an image, sending `prompt` (user hints included) with it
    ///
    /// Dropping the returned future cancels the classifier call and any
    /// lookups still in flight.
    pub async fn analyze(&self, image: &[u8], prompt: &PromptBuilder) -> Result<AnalysisReport, AnalyzerError> {
        let start = Instant::now();
        let id = AnalysisId::new();

        let format = validate_image(image, self.config.max_image_bytes)?;
        info!(id = %id, bytes = image.len(), mime = format.mime_type(), demo = self.demo, "Analyzing meal photo");

        let request = VisionRequest::new(prompt.build(), image.to_vec(), format.mime_type());

        let response = timeout(self.config.classifier_timeout(), self.classifier.classify(&request))
            .await
            .map_err(|_| AnalyzerError::Timeout)??;
        debug!(id = %id, chars = response.len(), "Classifier responded");

        let analysis = parse_classifier_response(&response)?;
        let raw = analysis.to_estimate();

        let estimate = if self.config.verify {
            self.reconciler.reconcile(&raw, &analysis.ingredients).await
        } else {
            debug!(id = %id, "Verification disabled, returning raw estimate");
            raw
        };

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            id = %id,
            name = %estimate.name,
            provenance = %estimate.provenance,
            verification = estimate.verification.label(),
            elapsed_ms,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            id,
            analysis,
            estimate,
            demo: self.demo,
            elapsed_ms,
        })
    }
}

/// Built-in brand table, extended or replaced by the configured catalog
pub fn load_brand_table(config: &AnalyzerConfig) -> Result<BrandLookupTable, AnalyzerError> {
    let Some(path) = &config.brand_catalog else {
        return Ok(BrandLookupTable::builtin());
    };

    let custom = BrandLookupTable::from_file(path).map_err(|e| AnalyzerError::Config(e.to_string()))?;
    if config.replace_builtin_brands {
        return Ok(custom);
    }

    let mut table = BrandLookupTable::builtin();
    table.extend(custom);
    Ok(table)
}
