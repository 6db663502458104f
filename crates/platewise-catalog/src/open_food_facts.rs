//! Open Food Facts API client
//!
//! Barcode lookups use the v2 product endpoint, name searches use the
//! legacy `cgi/search.pl` endpoint, which ranks results by popularity.
//! Both are read-only and unauthenticated; the service asks clients to
//! identify themselves with a descriptive `User-Agent`.

use crate::config::FoodDatabaseConfig;
use crate::{CatalogError, FoodDatabase, FoodProduct};
use async_trait::async_trait;
use platewise_domain::{validate_barcode, Nutrient, NutritionFacts};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Public Open Food Facts instance
pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";

const USER_AGENT: &str = concat!("Platewise/", env!("CARGO_PKG_VERSION"), " (nutrition lookup)");

const PRODUCT_FIELDS: &str = "code,product_name,brands,serving_size,nutriments";

const KJ_PER_KCAL: f64 = 4.184;

/// Sodium is 40% of salt by mass
const SALT_TO_SODIUM: f64 = 0.4;

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    product: Option<OffProduct>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<OffProduct>,
}

#[derive(Debug, Deserialize)]
struct OffProduct {
    code: Option<String>,
    product_name: Option<String>,
    brands: Option<String>,
    serving_size: Option<String>,
    #[serde(default)]
    nutriments: Map<String, Value>,
}

impl OffProduct {
    fn into_product(self) -> Option<FoodProduct> {
        let name = self.product_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;
        let per_100g = nutriments_for(&self.nutriments, "_100g");
        let per_serving = Some(nutriments_for(&self.nutriments, "_serving"))
            .filter(|n| !n.is_empty())
            .or_else(|| {
                // Derive from the per-100 g figures when the label states grams
                let grams = self.serving_size.as_deref().and_then(serving_grams)?;
                Some(per_100g.scaled(grams / 100.0).round_to_tenth()).filter(|n| !n.is_empty())
            });

        Some(FoodProduct {
            barcode: self.code.filter(|c| !c.is_empty()),
            name,
            brand: self.brands.map(|b| b.trim().to_string()).filter(|b| !b.is_empty()),
            serving_size: self.serving_size.filter(|s| !s.trim().is_empty()),
            per_100g,
            per_serving,
        })
    }
}

/// Gram weight stated in a serving size ("30 g", "1 cup (240g)")
///
/// The first number directly followed by a `g` unit wins; other units
/// ("250 ml", "1 kg") yield `None`.
fn serving_grams(serving_size: &str) -> Option<f64> {
    let text = serving_size.to_lowercase();
    let mut rest = text.as_str();

    while let Some(start) = rest.find(|c: char| c.is_ascii_digit()) {
        let after_start = &rest[start..];
        let len = after_start
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
            .unwrap_or(after_start.len());
        let (digits, tail) = after_start.split_at(len);
        let unit = tail.trim_start();

        if let Some(after_unit) = unit.strip_prefix('g') {
            if !after_unit.starts_with(|c: char| c.is_alphabetic()) {
                let grams = digits.replace(',', ".").parse::<f64>().ok();
                if let Some(grams) = grams.filter(|g| g.is_finite() && *g > 0.0) {
                    return Some(grams);
                }
            }
        }
        rest = tail;
    }
    None
}

/// Numbers arrive as JSON numbers or numeric strings
fn number(nutriments: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = match nutriments.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

/// Map Open Food Facts nutriment keys with the given suffix
fn nutriments_for(nutriments: &Map<String, Value>, suffix: &str) -> NutritionFacts {
    let get = |key: &str| number(nutriments, &format!("{}{}", key, suffix));

    let calories = get("energy-kcal").or_else(|| {
        get("energy-kj")
            .or_else(|| get("energy"))
            .map(|kj| kj / KJ_PER_KCAL)
    });
    let sodium_g = get("sodium").or_else(|| get("salt").map(|salt| salt * SALT_TO_SODIUM));

    NutritionFacts::default()
        .with(Nutrient::Calories, calories.unwrap_or(0.0))
        .with(Nutrient::Protein, get("proteins").unwrap_or(0.0))
        .with(Nutrient::Carbs, get("carbohydrates").unwrap_or(0.0))
        .with(Nutrient::Fat, get("fat").unwrap_or(0.0))
        .with(Nutrient::Fiber, get("fiber").unwrap_or(0.0))
        .with(Nutrient::Sugar, get("sugars").unwrap_or(0.0))
        .with(Nutrient::Sodium, sodium_g.unwrap_or(0.0) * 1000.0)
        .round_to_tenth()
}

/// Open Food Facts client
pub struct OpenFoodFactsClient {
    base_url: String,
    client: reqwest::Client,
    page_size: usize,
}

impl OpenFoodFactsClient {
    /// Create a client from configuration
    pub fn new(config: &FoodDatabaseConfig) -> Result<Self, CatalogError> {
        config.validate().map_err(CatalogError::Config)?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CatalogError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            page_size: config.search_page_size,
        })
    }

    /// Client against the public instance with default settings
    pub fn with_defaults() -> Result<Self, CatalogError> {
        Self::new(&FoodDatabaseConfig::default())
    }

    /// Base URL in use
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<Option<T>, CatalogError> {
        debug!(url = %url, "Querying Open Food Facts");

        let response = self.client.get(&url).query(query).send().await.map_err(|e| {
            if e.is_timeout() {
                CatalogError::Timeout
            } else {
                CatalogError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[async_trait]
impl FoodDatabase for OpenFoodFactsClient {
    fn name(&self) -> &str {
        "open_food_facts"
    }

    async fn lookup_barcode(&self, barcode: &str) -> Result<Option<FoodProduct>, CatalogError> {
        let code = validate_barcode(barcode)?;
        let url = format!("{}/api/v2/product/{}.json", self.base_url, code);

        let response: Option<ProductResponse> = self
            .get_json(url, &[("fields", PRODUCT_FIELDS.to_string())])
            .await?;

        let product = response
            .filter(|r| r.status == 1)
            .and_then(|r| r.product)
            .and_then(|p| p.into_product())
            .map(|mut p| {
                p.barcode.get_or_insert_with(|| code.to_string());
                p
            });

        debug!(barcode = code, found = product.is_some(), "Barcode lookup finished");
        Ok(product)
    }

    async fn search_by_name(&self, query: &str, limit: usize) -> Result<Vec<FoodProduct>, CatalogError> {
        let query = query.trim();
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let url = format!("{}/cgi/search.pl", self.base_url);
        let params = [
            ("search_terms", query.to_string()),
            ("search_simple", "1".to_string()),
            ("action", "process".to_string()),
            ("json", "1".to_string()),
            ("page_size", limit.max(self.page_size).to_string()),
            ("fields", PRODUCT_FIELDS.to_string()),
        ];

        let response: Option<SearchResponse> = self.get_json(url, &params).await?;
        let products: Vec<FoodProduct> = response
            .map(|r| r.products)
            .unwrap_or_default()
            .into_iter()
            .filter_map(OffProduct::into_product)
            .take(limit)
            .collect();

        debug!(query, results = products.len(), "Name search finished");
        Ok(products)
    }
}
