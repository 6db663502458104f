//! Nutrition reconciliation
//!
//! Combines the vision estimate with up to three corroborating sources:
//!
//! 1. the brand lookup table (by meal name)
//! 2. the food database (by meal name)
//! 3. the sum of the detected ingredients' own figures
//!
//! The lookups run concurrently, each under its own timeout. A lookup that
//! fails or times out counts as "no result" and never aborts the
//! reconciliation; [`NutritionReconciler::reconcile`] always returns an
//! estimate.
//!
//! The best candidate (highest confidence, ties resolved in the order
//! above) is compared with the vision estimate and the variance decides
//! the outcome:
//!
//! | variance          | outcome                                        |
//! |-------------------|------------------------------------------------|
//! | `< trust_below`   | adopt the candidate's figures                  |
//! | `< blend_below`   | weighted average, external source weighted 60% |
//! | otherwise         | keep the vision figures, record the alternative |

use crate::config::ReconcilerConfig;
use crate::types::Ingredient;
use platewise_catalog::{BrandLookupTable, FoodDatabase};
use platewise_domain::{
    blend, variance_percent, Confidence, NutritionEstimate, NutritionFacts, Provenance, Verification,
};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A corroborating source that produced no usable answer
#[derive(Error, Debug, Clone, PartialEq)]
enum LookupUnavailable {
    #[error("{0}")]
    Failed(String),

    #[error("timed out")]
    TimedOut,
}

/// How a reconciliation ended once a match was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// External figures adopted
    Trusted,
    /// Figures blended
    Blended,
    /// External figures rejected
    Distrusted,
}

impl Decision {
    /// Classify a variance against the configured thresholds
    pub fn for_variance(variance: f64, config: &ReconcilerConfig) -> Self {
        if variance < config.trust_below {
            Decision::Trusted
        } else if variance < config.blend_below {
            Decision::Blended
        } else {
            Decision::Distrusted
        }
    }
}

/// Reconciles a vision estimate against secondary sources
#[derive(Clone)]
pub struct NutritionReconciler {
    brands: Arc<BrandLookupTable>,
    database: Option<Arc<dyn FoodDatabase>>,
    config: ReconcilerConfig,
}

impl NutritionReconciler {
    /// Create a reconciler
    ///
    /// Without a database, or with `use_food_database` off, the database
    /// lookup yields no result.
    pub fn new(
        brands: Arc<BrandLookupTable>,
        database: Option<Arc<dyn FoodDatabase>>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            brands,
            database,
            config,
        }
    }

    /// Reconciler using only offline sources
    pub fn offline(brands: Arc<BrandLookupTable>, config: ReconcilerConfig) -> Self {
        Self::new(brands, None, config)
    }

    /// Active configuration
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Reconcile `ai` against the corroborating sources
    pub async fn reconcile(&self, ai: &NutritionEstimate, ingredients: &[Ingredient]) -> NutritionEstimate {
        debug!(name = %ai.name, state = "LookupsInFlight", "Starting reconciliation");

        let (brand, database, ingredient_sum) = tokio::join!(
            self.guarded("brand_database", self.lookup_brand(&ai.name)),
            self.guarded("open_food_facts", self.lookup_database(&ai.name)),
            self.guarded("ingredient_estimation", self.sum_ingredients(&ai.name, ingredients)),
        );

        let best = select_best([brand, database, ingredient_sum]);

        let Some(best) = best else {
            info!(name = %ai.name, state = "NoMatchFound", "No corroborating source returned data");
            return NutritionEstimate {
                name: ai.name.clone(),
                confidence: ai.confidence.nudge(self.config.no_match_nudge),
                nutrition: ai.nutrition,
                provenance: Provenance::Ai,
                verification: Verification::NoMatchFound,
            };
        };

        debug!(
            source = %best.provenance,
            confidence = best.confidence.value(),
            state = "MatchFound",
            "Selected best match"
        );

        let variance = variance_percent(&ai.nutrition, &best.nutrition);
        let decision = Decision::for_variance(variance, &self.config);
        debug!(
            source = %best.provenance,
            variance,
            state = "VarianceComputed",
            "Compared with best match"
        );

        let result = self.apply(ai, &best, variance, decision);
        info!(
            name = %ai.name,
            source = %best.provenance,
            variance,
            decision = ?decision,
            confidence = result.confidence.value(),
            state = "Done",
            "Reconciliation finished"
        );
        result
    }

    fn apply(
        &self,
        ai: &NutritionEstimate,
        best: &NutritionEstimate,
        variance: f64,
        decision: Decision,
    ) -> NutritionEstimate {
        let source = best.provenance;
        let config = &self.config;

        match decision {
            Decision::Trusted => NutritionEstimate {
                name: ai.name.clone(),
                confidence: ai.confidence.boost(config.trusted_boost, config.trusted_ceiling),
                nutrition: best.nutrition,
                provenance: source,
                verification: Verification::Matched {
                    source,
                    variance_percent: variance,
                },
            },
            Decision::Blended => NutritionEstimate {
                name: ai.name.clone(),
                confidence: ai.confidence.boost(config.blended_boost, config.blended_ceiling),
                nutrition: blend(&ai.nutrition, &best.nutrition, config.blend_external_weight),
                provenance: Provenance::Blended,
                verification: Verification::Blended {
                    source,
                    variance_percent: variance,
                },
            },
            Decision::Distrusted => {
                warn!(
                    name = %ai.name,
                    source = %source,
                    variance,
                    "Secondary source disagrees with the vision estimate"
                );
                NutritionEstimate {
                    name: ai.name.clone(),
                    confidence: ai.confidence.penalize(config.distrust_penalty, config.distrust_floor),
                    nutrition: ai.nutrition,
                    provenance: Provenance::Ai,
                    verification: Verification::Discrepancy {
                        source,
                        variance_percent: variance,
                        alternative: best.nutrition,
                    },
                }
            }
        }
    }

    /// Run one lookup under the configured timeout, absorbing failures
    async fn guarded<F>(&self, source: &'static str, lookup: F) -> Option<NutritionEstimate>
    where
        F: Future<Output = Result<Option<NutritionEstimate>, LookupUnavailable>>,
    {
        let outcome = tokio::time::timeout(self.config.lookup_timeout(), lookup)
            .await
            .unwrap_or(Err(LookupUnavailable::TimedOut));

        match outcome {
            Ok(Some(estimate)) => {
                debug!(source, confidence = estimate.confidence.value(), "Lookup returned data");
                Some(estimate)
            }
            Ok(None) => {
                debug!(source, "Lookup found nothing");
                None
            }
            Err(e) => {
                warn!(source, error = %e, "Lookup unavailable, continuing without it");
                None
            }
        }
    }

    async fn lookup_brand(&self, name: &str) -> Result<Option<NutritionEstimate>, LookupUnavailable> {
        Ok(self.brands.lookup(name).map(|m| m.to_estimate()))
    }

    async fn lookup_database(&self, name: &str) -> Result<Option<NutritionEstimate>, LookupUnavailable> {
        let database = match &self.database {
            Some(db) if self.config.use_food_database => db,
            _ => return Ok(None),
        };

        let products = database
            .search_by_name(name, 5)
            .await
            .map_err(|e| LookupUnavailable::Failed(e.to_string()))?;

        Ok(products
            .into_iter()
            .find(|p| p.has_nutrition())
            .map(|p| p.to_estimate(Confidence::new(self.config.database_confidence))))
    }

    async fn sum_ingredients(
        &self,
        name: &str,
        ingredients: &[Ingredient],
    ) -> Result<Option<NutritionEstimate>, LookupUnavailable> {
        let figures: Vec<&NutritionFacts> = ingredients.iter().filter_map(|i| i.nutrition.as_ref()).collect();
        if figures.is_empty() {
            return Ok(None);
        }

        let total = NutritionFacts::sum(figures).round_to_tenth();
        if total.is_empty() {
            return Ok(None);
        }

        Ok(Some(NutritionEstimate::new(
            name,
            self.config.ingredient_confidence,
            total,
            Provenance::IngredientEstimation,
        )))
    }
}

/// Highest confidence wins; on ties the earlier candidate is kept
fn select_best<const N: usize>(candidates: [Option<NutritionEstimate>; N]) -> Option<NutritionEstimate> {
    candidates.into_iter().flatten().fold(None, |best, candidate| match best {
        Some(current) if current.confidence >= candidate.confidence => Some(current),
        _ => Some(candidate),
    })
}
