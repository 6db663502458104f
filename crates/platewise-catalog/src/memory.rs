//! In-memory food database
//!
//! Serves a fixed product list. Failure and latency can be injected so the
//! reconciler's tolerance of slow or broken sources can be tested.

use crate::{CatalogError, FoodDatabase, FoodProduct};
use async_trait::async_trait;
use platewise_domain::validate_barcode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fixed product list implementing [`FoodDatabase`]
#[derive(Debug, Clone, Default)]
pub struct InMemoryFoodDatabase {
    products: Vec<FoodProduct>,
    failure: Option<CatalogError>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl InMemoryFoodDatabase {
    /// Create a database over the given products (search order = list order)
    pub fn new(products: Vec<FoodProduct>) -> Self {
        Self {
            products,
            ..Default::default()
        }
    }

    /// Fail every query with `error`
    pub fn with_failure(mut self, error: CatalogError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queries received so far (shared between clones)
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn begin(&self) -> Result<(), CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl FoodDatabase for InMemoryFoodDatabase {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn lookup_barcode(&self, barcode: &str) -> Result<Option<FoodProduct>, CatalogError> {
        let code = validate_barcode(barcode)?;
        self.begin().await?;
        Ok(self
            .products
            .iter()
            .find(|p| p.barcode.as_deref() == Some(code))
            .cloned())
    }

    async fn search_by_name(&self, query: &str, limit: usize) -> Result<Vec<FoodProduct>, CatalogError> {
        self.begin().await?;
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .products
            .iter()
            .filter(|p| {
                let name = p.display_name().to_lowercase();
                terms.iter().any(|t| name.contains(t.as_str()))
            })
            .take(limit)
            .cloned()
            .collect())
    }
}
