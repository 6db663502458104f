//! Platewise Catalog
//!
//! Secondary nutrition sources used to corroborate a vision estimate:
//!
//! - [`BrandLookupTable`]: static table of branded products, no network
//! - [`OpenFoodFactsClient`]: the Open Food Facts public database
//! - [`InMemoryFoodDatabase`]: fixed product list for tests and offline use
//!
//! Database clients implement [`FoodDatabase`] so the reconciler can be
//! exercised without a network.

#![warn(missing_docs)]

pub mod brand;
pub mod config;
pub mod memory;
pub mod open_food_facts;

use async_trait::async_trait;
use platewise_domain::{BarcodeError, Confidence, NutritionEstimate, NutritionFacts, Provenance};
use thiserror::Error;

pub use brand::{BrandCatalogEntry, BrandLookupTable, BrandMatch, BRAND_MATCH_CONFIDENCE};
pub use config::FoodDatabaseConfig;
pub use memory::InMemoryFoodDatabase;
pub use open_food_facts::OpenFoodFactsClient;

/// Errors that can occur while querying a catalog
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Barcode rejected before any network call
    #[error("Invalid barcode: {0}")]
    InvalidBarcode(#[from] BarcodeError),

    /// Network or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded its deadline
    #[error("Request timed out")]
    Timeout,

    /// Non-success HTTP status
    #[error("API error {status}: {body}")]
    Api {
        /// Status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Response could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Catalog definition or client configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A packaged food product
#[derive(Debug, Clone, PartialEq)]
pub struct FoodProduct {
    /// Barcode, when known
    pub barcode: Option<String>,
    /// Product name
    pub name: String,
    /// Brand name(s)
    pub brand: Option<String>,
    /// Declared serving size (free text, e.g. "30 g")
    pub serving_size: Option<String>,
    /// Figures per 100 g / 100 ml
    pub per_100g: NutritionFacts,
    /// Figures per declared serving, when the database provides them
    pub per_serving: Option<NutritionFacts>,
}

impl FoodProduct {
    /// Figures for one portion: per serving when available, else per 100 g
    pub fn portion_nutrition(&self) -> NutritionFacts {
        match self.per_serving {
            Some(serving) if self.has_serving_figures() => serving,
            _ => self.per_100g,
        }
    }

    /// Whether [`portion_nutrition`](Self::portion_nutrition) is per serving
    pub fn has_serving_figures(&self) -> bool {
        self.per_serving.is_some_and(|s| !s.is_empty())
    }

    /// Whether any usable figure is present
    pub fn has_nutrition(&self) -> bool {
        !self.portion_nutrition().is_empty()
    }

    /// Display name including the brand
    pub fn display_name(&self) -> String {
        match &self.brand {
            Some(brand) if !brand.is_empty() => format!("{} ({})", self.name, brand),
            _ => self.name.clone(),
        }
    }

    /// Express the product as an estimate
    pub fn to_estimate(&self, confidence: Confidence) -> NutritionEstimate {
        NutritionEstimate::new(
            self.display_name(),
            confidence,
            self.portion_nutrition(),
            Provenance::OpenFoodFacts,
        )
    }
}

/// A searchable food database
#[async_trait]
pub trait FoodDatabase: Send + Sync {
    /// Source name for logging
    fn name(&self) -> &str;

    /// Look up a product by barcode
    ///
    /// Returns `Ok(None)` when the database has no such product.
    ///
    /// # Errors
    ///
    /// [`CatalogError::InvalidBarcode`] for malformed codes (no network call),
    /// other variants for transport or parse failures.
    async fn lookup_barcode(&self, barcode: &str) -> Result<Option<FoodProduct>, CatalogError>;

    /// Search by free-text name, ranked as the database ranks them
    async fn search_by_name(&self, query: &str, limit: usize) -> Result<Vec<FoodProduct>, CatalogError>;
}
