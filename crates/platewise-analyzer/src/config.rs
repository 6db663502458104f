//! Configuration for the analyzer

use platewise_catalog::FoodDatabaseConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Thresholds and adjustments applied by the reconciler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// Per-lookup timeout (seconds)
    pub lookup_timeout_secs: u64,

    /// Variance below which the external figures are adopted
    pub trust_below: f64,

    /// Variance below which the figures are blended
    pub blend_below: f64,

    /// Confidence boost when adopting external figures
    pub trusted_boost: f64,

    /// Confidence ceiling after adopting external figures
    pub trusted_ceiling: f64,

    /// Confidence boost when blending
    pub blended_boost: f64,

    /// Confidence ceiling after blending
    pub blended_ceiling: f64,

    /// Weight of the external source when blending (0.0-1.0)
    pub blend_external_weight: f64,

    /// Confidence penalty when the external source is distrusted
    pub distrust_penalty: f64,

    /// Penalty does not push a score below this floor
    pub distrust_floor: f64,

    /// Confidence nudge when no source returned data
    pub no_match_nudge: f64,

    /// Confidence assigned to a food database hit
    pub database_confidence: f64,

    /// Confidence assigned to the ingredient-sum estimate
    pub ingredient_confidence: f64,

    /// Whether to query the food database at all
    pub use_food_database: bool,
}

impl ReconcilerConfig {
    /// Get the lookup timeout as a Duration
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.lookup_timeout_secs == 0 {
            return Err("lookup_timeout_secs must be greater than 0".to_string());
        }
        if self.trust_below < 0.0 || self.trust_below > self.blend_below {
            return Err("trust_below must be between 0 and blend_below".to_string());
        }
        if !(0.0..=1.0).contains(&self.blend_external_weight) {
            return Err("blend_external_weight must be between 0.0 and 1.0".to_string());
        }
        for (name, value) in [
            ("trusted_ceiling", self.trusted_ceiling),
            ("blended_ceiling", self.blended_ceiling),
            ("distrust_floor", self.distrust_floor),
            ("database_confidence", self.database_confidence),
            ("ingredient_confidence", self.ingredient_confidence),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(format!("{} must be between 0 and 100", name));
            }
        }
        for (name, value) in [
            ("trusted_boost", self.trusted_boost),
            ("blended_boost", self.blended_boost),
            ("distrust_penalty", self.distrust_penalty),
            ("no_match_nudge", self.no_match_nudge),
        ] {
            if value < 0.0 {
                return Err(format!("{} cannot be negative", name));
            }
        }
        Ok(())
    }

    /// Strict preset: external figures must agree closely to be trusted
    pub fn strict() -> Self {
        Self {
            trust_below: 10.0,
            blend_below: 20.0,
            ..Self::default()
        }
    }

    /// Lenient preset: wider agreement bands
    pub fn lenient() -> Self {
        Self {
            trust_below: 20.0,
            blend_below: 40.0,
            ..Self::default()
        }
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            lookup_timeout_secs: 10,
            trust_below: 15.0,
            blend_below: 30.0,
            trusted_boost: 8.0,
            trusted_ceiling: 99.0,
            blended_boost: 5.0,
            blended_ceiling: 95.0,
            blend_external_weight: 0.6,
            distrust_penalty: 3.0,
            distrust_floor: 60.0,
            no_match_nudge: 5.0,
            database_confidence: 85.0,
            ingredient_confidence: 70.0,
            use_food_database: true,
        }
    }
}

/// Vision provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// API base URL
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Cooldown for an exhausted credential (seconds)
    pub cooldown_secs: u64,

    /// API keys in priority order; merged with the environment
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub api_keys: Vec<String>,
}

impl VisionConfig {
    /// Get the cooldown as a Duration
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model cannot be empty".to_string());
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(format!("endpoint must be an http(s) URL, got '{}'", self.endpoint));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be between 0.0 and 2.0".to_string());
        }
        if self.cooldown_secs == 0 {
            return Err("cooldown_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            endpoint: platewise_vision::gemini::DEFAULT_ENDPOINT.to_string(),
            model: platewise_vision::gemini::DEFAULT_MODEL.to_string(),
            temperature: platewise_vision::gemini::DEFAULT_TEMPERATURE,
            cooldown_secs: platewise_vision::gateway::DEFAULT_COOLDOWN.as_secs(),
            api_keys: Vec::new(),
        }
    }
}

/// Configuration for the meal analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Largest accepted image (bytes)
    pub max_image_bytes: usize,

    /// Maximum time for the classifier call, failover included (seconds)
    pub classifier_timeout_secs: u64,

    /// Cross-reference the estimate against secondary sources
    pub verify: bool,

    /// Extra brand catalog (TOML)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_catalog: Option<PathBuf>,

    /// Use only the extra brand catalog, dropping the built-in one
    pub replace_builtin_brands: bool,

    /// Reconciler settings
    pub reconciler: ReconcilerConfig,

    /// Vision provider settings
    pub vision: VisionConfig,

    /// Food database settings
    pub food_database: FoodDatabaseConfig,
}

impl AnalyzerConfig {
    /// Get the classifier timeout as a Duration
    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(self.classifier_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_image_bytes == 0 {
            return Err("max_image_bytes must be greater than 0".to_string());
        }
        if self.classifier_timeout_secs == 0 {
            return Err("classifier_timeout_secs must be greater than 0".to_string());
        }
        if self.replace_builtin_brands && self.brand_catalog.is_none() {
            return Err("replace_builtin_brands requires brand_catalog".to_string());
        }
        self.reconciler.validate()?;
        self.vision.validate()?;
        self.food_database.validate()?;
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: 10 * 1024 * 1024,
            classifier_timeout_secs: 30,
            verify: true,
            brand_catalog: None,
            replace_builtin_brands: false,
            reconciler: ReconcilerConfig::default(),
            vision: VisionConfig::default(),
            food_database: FoodDatabaseConfig::default(),
        }
    }
}
