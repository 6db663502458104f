//! End-to-end analysis: classifier through the gateway, then reconciliation

use platewise_analyzer::{AnalyzerConfig, AnalyzerError, MealAnalyzer, NutritionReconciler, PromptBuilder};
use platewise_catalog::{BrandLookupTable, FoodProduct, InMemoryFoodDatabase};
use platewise_domain::{NutritionFacts, Provenance, Verification};
use platewise_vision::{CredentialPool, KeyRotationGateway, MockBackend, MockOutcome, VisionClassifier};
use std::sync::Arc;

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
const KEYS: [&str; 3] = ["key-one-000001", "key-two-000002", "key-three-00003"];

const DINER_CATALOG: &str = r#"
[[brands]]
name = "Corner Diner"

[[brands.items]]
pattern = "club burger"
name = "Club Burger"
calories = 510.0
protein = 19.0
carbs = 48.0
fat = 21.0
"#;

const BURGER_RESPONSE: &str = r#"```json
{"name": "Corner Diner Club Burger", "confidence": 80,
 "nutrition": {"calories": 500, "protein": 20, "carbs": 50, "fat": 20}}
```"#;

fn analyzer(backend: MockBackend, keys: &[&str], brands: BrandLookupTable, database: InMemoryFoodDatabase) -> MealAnalyzer {
    let gateway = KeyRotationGateway::new(CredentialPool::new(keys.iter().copied()));
    let classifier = VisionClassifier::new(Arc::new(backend), Arc::new(gateway));
    let config = AnalyzerConfig::default();
    let reconciler = NutritionReconciler::new(Arc::new(brands), Some(Arc::new(database)), config.reconciler.clone());
    MealAnalyzer::new(classifier, reconciler, config)
}

#[tokio::test]
async fn test_brand_match_adopted_after_failover() {
    let mut backend = MockBackend::new(BURGER_RESPONSE);
    backend.add_outcome(KEYS[0], MockOutcome::Quota);

    // A weaker database hit must lose to the brand entry
    let database = InMemoryFoodDatabase::new(vec![FoodProduct {
        barcode: None,
        name: "Club Burger".to_string(),
        brand: None,
        serving_size: None,
        per_100g: NutritionFacts::new(250.0, 12.0, 20.0, 13.0),
        per_serving: None,
    }]);

    let brands = BrandLookupTable::from_toml(DINER_CATALOG).unwrap();
    let analyzer = analyzer(backend.clone(), &KEYS, brands, database);
    let report = analyzer.analyze(JPEG, &PromptBuilder::new()).await.unwrap();

    assert_eq!(backend.keys_used(), vec![KEYS[0].to_string(), KEYS[1].to_string()]);
    assert!(!report.demo);

    let estimate = &report.estimate;
    assert_eq!(estimate.name, "Corner Diner Club Burger");
    assert_eq!(estimate.nutrition, NutritionFacts::new(510.0, 19.0, 48.0, 21.0));
    assert_eq!(estimate.provenance, Provenance::BrandDatabase);
    assert_eq!(estimate.confidence.value(), 88.0);
    match estimate.verification {
        Verification::Matched {
            source,
            variance_percent,
        } => {
            assert_eq!(source, Provenance::BrandDatabase);
            assert!((variance_percent - 4.11).abs() < 0.01);
        }
        ref other => panic!("expected a match, got {:?}", other),
    }

    // The raw classifier figures stay available on the report
    assert_eq!(report.analysis.nutrition, NutritionFacts::new(500.0, 20.0, 50.0, 20.0));
}

#[tokio::test]
async fn test_uncorroborated_estimate_is_unchanged() {
    let response = r#"{"name": "Grandma's Lentil Stew", "confidence": 64,
        "nutrition": {"calories": 380, "protein": 21, "carbs": 52, "fat": 9, "fiber": 14}}"#;
    let analyzer = analyzer(
        MockBackend::new(response),
        &KEYS,
        BrandLookupTable::empty(),
        InMemoryFoodDatabase::new(vec![]),
    );

    let report = analyzer.analyze(JPEG, &PromptBuilder::new()).await.unwrap();
    assert_eq!(report.estimate.nutrition, report.analysis.nutrition);
    assert_eq!(report.estimate.nutrition.fiber, 14.0);
    assert_eq!(report.estimate.provenance, Provenance::Ai);
    assert_eq!(report.estimate.verification, Verification::NoMatchFound);
    assert_eq!(report.estimate.confidence.value(), 69.0);
}

#[tokio::test]
async fn test_no_credentials() {
    let backend = MockBackend::new(BURGER_RESPONSE);
    let analyzer = analyzer(
        backend.clone(),
        &[],
        BrandLookupTable::empty(),
        InMemoryFoodDatabase::new(vec![]),
    );

    let err = analyzer.analyze(JPEG, &PromptBuilder::new()).await.unwrap_err();
    assert_eq!(err, AnalyzerError::NotConfigured);
    assert!(!err.is_transient());
    assert!(err.user_message().contains("--demo"));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn test_every_credential_exhausted() {
    let mut backend = MockBackend::new(BURGER_RESPONSE);
    for key in KEYS {
        backend.add_outcome(key, MockOutcome::Quota);
    }
    let analyzer = analyzer(
        backend.clone(),
        &KEYS,
        BrandLookupTable::empty(),
        InMemoryFoodDatabase::new(vec![]),
    );

    let err = analyzer.analyze(JPEG, &PromptBuilder::new()).await.unwrap_err();
    assert_eq!(err, AnalyzerError::AllCredentialsExhausted);
    assert!(err.is_transient());
    assert_eq!(backend.call_count(), 3);

    // Every key is now cooling down, so the next request makes no call
    let err = analyzer.analyze(JPEG, &PromptBuilder::new()).await.unwrap_err();
    assert_eq!(err, AnalyzerError::AllCredentialsExhausted);
    assert_eq!(backend.call_count(), 3);
    assert!(analyzer.classifier().gateway().status().iter().all(|s| !s.is_available()));
}

#[tokio::test]
async fn test_unusable_response_is_a_hard_failure() {
    let analyzer = analyzer(
        MockBackend::new("Sorry, I can't tell what food this is."),
        &KEYS,
        BrandLookupTable::builtin(),
        InMemoryFoodDatabase::new(vec![]),
    );

    let err = analyzer.analyze(JPEG, &PromptBuilder::new()).await.unwrap_err();
    assert!(matches!(err, AnalyzerError::InvalidResponseShape(_)));
}

#[tokio::test]
async fn test_missing_file() {
    let analyzer = MealAnalyzer::demo(AnalyzerConfig::default());
    let err = analyzer
        .analyze_file(std::path::Path::new("/nonexistent/lunch.jpg"), &PromptBuilder::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::Io(_)));
}
