//! Configuration for the food database client

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Open Food Facts client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodDatabaseConfig {
    /// API base URL
    pub base_url: String,

    /// Request timeout (seconds)
    pub timeout_secs: u64,

    /// Results requested per name search
    pub search_page_size: usize,
}

impl FoodDatabaseConfig {
    /// Get the request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!("base_url must be an http(s) URL, got '{}'", self.base_url));
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.search_page_size == 0 || self.search_page_size > 100 {
            return Err("search_page_size must be between 1 and 100".to_string());
        }
        Ok(())
    }
}

impl Default for FoodDatabaseConfig {
    fn default() -> Self {
        Self {
            base_url: crate::open_food_facts::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            search_page_size: 5,
        }
    }
}
