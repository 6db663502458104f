//! Brand lookup table
//!
//! Static table of branded products (restaurant chains, packaged goods)
//! with known per-serving nutrition. Lookups are purely in-memory.
//!
//! A description matches an entry when it contains the brand name AND one
//! of that brand's item patterns, both compared case-insensitively. Brands
//! and items are scanned in table order and the first hit wins, so more
//! specific item patterns must come before generic ones.
//!
//! Additional entries can be loaded from TOML:
//!
//! ```toml
//! [[brands]]
//! name = "Joe's Diner"
//!
//! [[brands.items]]
//! pattern = "house burger"
//! calories = 720
//! protein = 38
//! carbs = 52
//! fat = 40
//! ```

use crate::CatalogError;
use platewise_domain::{Confidence, Nutrient, NutritionEstimate, NutritionFacts, Provenance};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Confidence assigned to every brand match
pub const BRAND_MATCH_CONFIDENCE: f64 = 95.0;

/// One item of a brand
#[derive(Debug, Clone, PartialEq)]
pub struct BrandCatalogEntry {
    /// Brand name as displayed
    pub brand: String,
    /// Lowercase substring identifying the item
    pub item_name_pattern: String,
    /// Display name of the item
    pub item_name: String,
    /// Per-serving figures
    pub nutrition: NutritionFacts,
}

#[derive(Debug, Clone)]
struct Brand {
    name: String,
    needle: String,
    items: Vec<BrandCatalogEntry>,
}

/// A successful brand lookup
#[derive(Debug, Clone, PartialEq)]
pub struct BrandMatch {
    /// Matched brand
    pub brand: String,
    /// Matched item display name
    pub item: String,
    /// Per-serving figures
    pub nutrition: NutritionFacts,
    /// Always [`BRAND_MATCH_CONFIDENCE`]
    pub confidence: Confidence,
}

impl BrandMatch {
    /// Express the match as an estimate
    pub fn to_estimate(&self) -> NutritionEstimate {
        NutritionEstimate::new(
            format!("{} {}", self.brand, self.item),
            self.confidence,
            self.nutrition,
            Provenance::BrandDatabase,
        )
    }
}

/// (pattern, display name, [calories, protein, carbs, fat, fiber, sugar, sodium])
type BuiltinItem = (&'static str, &'static str, [f64; 7]);

const BUILTIN: &[(&str, &[BuiltinItem])] = &[
    (
        "McDonald's",
        &[
            ("big mac", "Big Mac", [550.0, 25.0, 45.0, 30.0, 3.0, 9.0, 1010.0]),
            ("quarter pounder", "Quarter Pounder with Cheese", [520.0, 30.0, 42.0, 26.0, 2.0, 10.0, 1140.0]),
            ("mcchicken", "McChicken", [400.0, 14.0, 39.0, 21.0, 1.0, 5.0, 560.0]),
            ("mcnugget", "Chicken McNuggets (10 pc)", [410.0, 23.0, 26.0, 24.0, 1.0, 0.0, 840.0]),
            ("egg mcmuffin", "Egg McMuffin", [310.0, 17.0, 30.0, 13.0, 2.0, 3.0, 770.0]),
            ("mcflurry", "McFlurry with Oreo", [510.0, 12.0, 80.0, 17.0, 1.0, 64.0, 250.0]),
            ("fries", "French Fries (medium)", [320.0, 5.0, 43.0, 15.0, 4.0, 0.0, 260.0]),
        ],
    ),
    (
        "Burger King",
        &[
            ("whopper jr", "Whopper Jr.", [330.0, 16.0, 28.0, 18.0, 1.0, 7.0, 490.0]),
            ("whopper", "Whopper", [670.0, 31.0, 54.0, 40.0, 2.0, 12.0, 1000.0]),
            ("chicken fries", "Chicken Fries (9 pc)", [280.0, 13.0, 20.0, 17.0, 1.0, 1.0, 850.0]),
            ("fries", "French Fries (medium)", [380.0, 5.0, 53.0, 17.0, 4.0, 1.0, 570.0]),
        ],
    ),
    (
        "Starbucks",
        &[
            ("caramel frappuccino", "Caramel Frappuccino (grande)", [380.0, 5.0, 54.0, 16.0, 0.0, 54.0, 230.0]),
            ("caramel macchiato", "Caramel Macchiato (grande)", [250.0, 10.0, 35.0, 7.0, 0.0, 33.0, 150.0]),
            ("cappuccino", "Cappuccino (grande)", [140.0, 9.0, 14.0, 5.0, 0.0, 12.0, 120.0]),
            ("latte", "Caffe Latte (grande)", [190.0, 13.0, 19.0, 7.0, 0.0, 18.0, 170.0]),
            ("croissant", "Butter Croissant", [260.0, 5.0, 28.0, 14.0, 1.0, 6.0, 310.0]),
        ],
    ),
    (
        "Subway",
        &[
            ("italian bmt", "Italian B.M.T. (6 inch)", [410.0, 20.0, 45.0, 16.0, 3.0, 6.0, 1210.0]),
            ("veggie delite", "Veggie Delite (6 inch)", [230.0, 9.0, 44.0, 2.5, 5.0, 6.0, 310.0]),
            ("turkey", "Oven Roasted Turkey (6 inch)", [280.0, 18.0, 46.0, 3.5, 5.0, 6.0, 760.0]),
        ],
    ),
    (
        "Chipotle",
        &[
            ("burrito bowl", "Chicken Burrito Bowl", [665.0, 43.0, 54.0, 28.0, 12.0, 5.0, 1600.0]),
            ("burrito", "Chicken Burrito", [1000.0, 55.0, 105.0, 38.0, 14.0, 7.0, 2300.0]),
            ("chips and guacamole", "Chips & Guacamole", [770.0, 10.0, 81.0, 47.0, 14.0, 2.0, 565.0]),
        ],
    ),
    (
        "KFC",
        &[
            ("famous bowl", "Famous Bowl", [740.0, 26.0, 81.0, 35.0, 6.0, 3.0, 2350.0]),
            ("popcorn chicken", "Popcorn Nuggets (large)", [620.0, 31.0, 37.0, 39.0, 2.0, 0.0, 1820.0]),
            ("original recipe", "Original Recipe Chicken Breast", [390.0, 39.0, 11.0, 21.0, 2.0, 0.0, 1190.0]),
        ],
    ),
    (
        "Taco Bell",
        &[
            ("crunchwrap", "Crunchwrap Supreme", [530.0, 16.0, 71.0, 21.0, 6.0, 6.0, 1200.0]),
            ("chalupa", "Chalupa Supreme (beef)", [350.0, 13.0, 30.0, 20.0, 3.0, 4.0, 550.0]),
            ("crunchy taco", "Crunchy Taco", [170.0, 8.0, 13.0, 10.0, 3.0, 1.0, 310.0]),
        ],
    ),
    (
        "Coca-Cola",
        &[
            ("zero", "Coca-Cola Zero Sugar (330 ml)", [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 40.0]),
            ("coca-cola", "Coca-Cola Classic (330 ml)", [139.0, 0.0, 35.0, 0.0, 0.0, 35.0, 10.0]),
        ],
    ),
];

fn facts_from_array(values: [f64; 7]) -> NutritionFacts {
    Nutrient::ALL
        .iter()
        .zip(values)
        .fold(NutritionFacts::default(), |facts, (nutrient, value)| facts.with(*nutrient, value))
}

/// TOML representation of a catalog file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Brands in match order
    #[serde(default)]
    pub brands: Vec<BrandDefinition>,
}

/// TOML representation of a brand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandDefinition {
    /// Brand name
    pub name: String,
    /// Items in match order
    #[serde(default)]
    pub items: Vec<ItemDefinition>,
}

/// TOML representation of an item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Substring identifying the item
    pub pattern: String,
    /// Display name; defaults to the pattern
    #[serde(default)]
    pub name: Option<String>,
    /// Energy (kcal)
    pub calories: f64,
    /// Protein (g)
    pub protein: f64,
    /// Carbohydrates (g)
    pub carbs: f64,
    /// Fat (g)
    pub fat: f64,
    /// Fiber (g)
    #[serde(default)]
    pub fiber: f64,
    /// Sugar (g)
    #[serde(default)]
    pub sugar: f64,
    /// Sodium (mg)
    #[serde(default)]
    pub sodium: f64,
}

/// In-memory brand catalog
#[derive(Debug, Clone)]
pub struct BrandLookupTable {
    brands: Vec<Brand>,
}

impl BrandLookupTable {
    /// Table with the built-in catalog
    pub fn builtin() -> Self {
        let brands = BUILTIN
            .iter()
            .map(|(name, items)| Brand {
                name: name.to_string(),
                needle: name.to_lowercase(),
                items: items
                    .iter()
                    .map(|(pattern, item_name, values)| BrandCatalogEntry {
                        brand: name.to_string(),
                        item_name_pattern: pattern.to_string(),
                        item_name: item_name.to_string(),
                        nutrition: facts_from_array(*values),
                    })
                    .collect(),
            })
            .collect();
        Self { brands }
    }

    /// Empty table
    pub fn empty() -> Self {
        Self { brands: Vec::new() }
    }

    /// Parse a catalog from TOML
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| CatalogError::Config(format!("Invalid brand catalog: {}", e)))?;
        Self::from_definitions(file.brands)
    }

    /// Load a catalog file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    fn from_definitions(definitions: Vec<BrandDefinition>) -> Result<Self, CatalogError> {
        let mut brands = Vec::with_capacity(definitions.len());
        for def in definitions {
            let name = def.name.trim().to_string();
            if name.is_empty() {
                return Err(CatalogError::Config("Brand name cannot be empty".to_string()));
            }

            let mut items = Vec::with_capacity(def.items.len());
            for item in def.items {
                let pattern = item.pattern.trim().to_lowercase();
                if pattern.is_empty() {
                    return Err(CatalogError::Config(format!("Empty item pattern for brand '{}'", name)));
                }
                let nutrition = NutritionFacts::default()
                    .with(Nutrient::Calories, item.calories)
                    .with(Nutrient::Protein, item.protein)
                    .with(Nutrient::Carbs, item.carbs)
                    .with(Nutrient::Fat, item.fat)
                    .with(Nutrient::Fiber, item.fiber)
                    .with(Nutrient::Sugar, item.sugar)
                    .with(Nutrient::Sodium, item.sodium);
                items.push(BrandCatalogEntry {
                    brand: name.clone(),
                    item_name: item.name.unwrap_or_else(|| item.pattern.trim().to_string()),
                    item_name_pattern: pattern,
                    nutrition,
                });
            }

            brands.push(Brand {
                needle: name.to_lowercase(),
                name,
                items,
            });
        }
        Ok(Self { brands })
    }

    /// Append another table's brands after this one's
    pub fn extend(&mut self, other: BrandLookupTable) {
        self.brands.extend(other.brands);
    }

    /// Number of brands
    pub fn brand_count(&self) -> usize {
        self.brands.len()
    }

    /// All entries in match order
    pub fn entries(&self) -> impl Iterator<Item = &BrandCatalogEntry> {
        self.brands.iter().flat_map(|b| b.items.iter())
    }

    /// Find the first (brand, item) pair mentioned in `text`
    pub fn lookup(&self, text: &str) -> Option<BrandMatch> {
        let haystack = text.to_lowercase();

        let found = self
            .brands
            .iter()
            .filter(|brand| haystack.contains(&brand.needle))
            .find_map(|brand| {
                brand
                    .items
                    .iter()
                    .find(|item| haystack.contains(&item.item_name_pattern))
            });

        match found {
            Some(entry) => {
                debug!(brand = %entry.brand, item = %entry.item_name, "Brand catalog hit");
                Some(BrandMatch {
                    brand: entry.brand.clone(),
                    item: entry.item_name.clone(),
                    nutrition: entry.nutrition,
                    confidence: Confidence::new(BRAND_MATCH_CONFIDENCE),
                })
            }
            None => None,
        }
    }
}

impl Default for BrandLookupTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_mac_match() {
        let table = BrandLookupTable::builtin();
        let hit = table.lookup("McDonald's Big Mac with fries").unwrap();
        assert_eq!(hit.brand, "McDonald's");
        assert_eq!(hit.item, "Big Mac");
        assert_eq!(hit.nutrition.calories, 550.0);
        assert_eq!(hit.confidence.value(), 95.0);
    }

    #[test]
    fn test_case_insensitive() {
        let table = BrandLookupTable::builtin();
        let hit = table.lookup("STARBUCKS CARAMEL FRAPPUCCINO").unwrap();
        assert_eq!(hit.item, "Caramel Frappuccino (grande)");
    }

    #[test]
    fn test_brand_required() {
        let table = BrandLookupTable::builtin();
        assert!(table.lookup("homemade big mac").is_none());
        assert!(table.lookup("grilled salmon with rice").is_none());
    }

    #[test]
    fn test_item_required() {
        let table = BrandLookupTable::builtin();
        assert!(table.lookup("McDonald's salad").is_none());
    }

    #[test]
    fn test_first_item_wins() {
        let table = BrandLookupTable::builtin();
        let hit = table.lookup("Burger King Whopper Jr meal").unwrap();
        assert_eq!(hit.item, "Whopper Jr.");
        let hit = table.lookup("Chipotle burrito bowl").unwrap();
        assert_eq!(hit.item, "Chicken Burrito Bowl");
    }

    #[test]
    fn test_to_estimate() {
        let estimate = BrandLookupTable::builtin()
            .lookup("KFC Famous Bowl")
            .unwrap()
            .to_estimate();
        assert_eq!(estimate.name, "KFC Famous Bowl");
        assert_eq!(estimate.provenance, Provenance::BrandDatabase);
        assert_eq!(estimate.confidence.value(), 95.0);
    }

    #[test]
    fn test_builtin_entries_have_nutrition() {
        let table = BrandLookupTable::builtin();
        assert!(table.brand_count() >= 8);
        for entry in table.entries() {
            assert!(!entry.nutrition.is_empty(), "{} {}", entry.brand, entry.item_name);
            assert_eq!(entry.item_name_pattern, entry.item_name_pattern.to_lowercase());
        }
    }

    #[test]
    fn test_from_toml_and_extend() {
        let custom = BrandLookupTable::from_toml(
            r#"
            [[brands]]
            name = "Joe's Diner"

            [[brands.items]]
            pattern = "House Burger"
            calories = 720
            protein = 38
            carbs = 52
            fat = 40
            sodium = 1300
            "#,
        )
        .unwrap();

        let mut table = BrandLookupTable::builtin();
        let builtin_brands = table.brand_count();
        table.extend(custom);
        assert_eq!(table.brand_count(), builtin_brands + 1);

        let hit = table.lookup("a joe's diner house burger").unwrap();
        assert_eq!(hit.brand, "Joe's Diner");
        assert_eq!(hit.item, "House Burger");
        assert_eq!(hit.nutrition.sodium, 1300.0);
        assert_eq!(hit.nutrition.fiber, 0.0);
    }

    #[test]
    fn test_from_toml_rejects_empty_pattern() {
        let result = BrandLookupTable::from_toml(
            r#"
            [[brands]]
            name = "Acme"
            [[brands.items]]
            pattern = "  "
            calories = 1
            protein = 1
            carbs = 1
            fat = 1
            "#,
        );
        assert!(matches!(result, Err(CatalogError::Config(_))));
    }

    #[test]
    fn test_from_toml_invalid_syntax() {
        assert!(matches!(
            BrandLookupTable::from_toml("[[brands]\nname="),
            Err(CatalogError::Config(_))
        ));
    }
}
