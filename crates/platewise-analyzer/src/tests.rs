//! Reconciliation properties

#[cfg(test)]
mod tests {
    use crate::{Decision, Ingredient, NutritionReconciler, ReconcilerConfig};
    use platewise_catalog::BrandLookupTable;
    use platewise_domain::{
        variance_percent, Confidence, NutritionEstimate, NutritionFacts, Provenance, Verification,
    };
    use proptest::prelude::*;
    use std::sync::Arc;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap()
    }

    /// Reconcile with the ingredient sum as the only corroborating source
    fn reconcile_against(ai: &NutritionEstimate, other: NutritionFacts) -> NutritionEstimate {
        let reconciler =
            NutritionReconciler::offline(Arc::new(BrandLookupTable::empty()), ReconcilerConfig::default());
        let ingredients = vec![Ingredient::new("everything").with_nutrition(other)];
        runtime().block_on(reconciler.reconcile(ai, &ingredients))
    }

    fn facts() -> impl Strategy<Value = NutritionFacts> {
        (1u32..1500, 1u32..80, 1u32..200, 1u32..80)
            .prop_map(|(c, p, cb, f)| NutritionFacts::new(c as f64, p as f64, cb as f64, f as f64))
    }

    #[test]
    fn test_blended_figures() {
        let ai = NutritionEstimate::new("Pasta", 70.0, NutritionFacts::new(600.0, 20.0, 80.0, 20.0), Provenance::Ai);
        let other = NutritionFacts::new(500.0, 16.0, 70.0, 16.0);
        // (20 + 25 + 14.29 + 25) / 4 = 21.07
        assert_eq!(
            Decision::for_variance(variance_percent(&ai.nutrition, &other), &ReconcilerConfig::default()),
            Decision::Blended
        );

        let result = reconcile_against(&ai, other);
        assert_eq!(result.provenance, Provenance::Blended);
        assert_eq!(result.nutrition, NutritionFacts::new(540.0, 17.6, 74.0, 17.6));
        assert_eq!(result.confidence.value(), 75.0);
        assert!(result.variance_percent().is_some());
    }

    #[test]
    fn test_discrepancy_retains_alternative() {
        let ai = NutritionEstimate::new("Curry", 80.0, NutritionFacts::new(700.0, 30.0, 60.0, 35.0), Provenance::Ai);
        let other = NutritionFacts::new(350.0, 12.0, 30.0, 15.0);

        let result = reconcile_against(&ai, other);
        assert_eq!(result.nutrition, ai.nutrition);
        assert_eq!(result.provenance, Provenance::Ai);
        assert_eq!(result.confidence.value(), 77.0);
        match result.verification {
            Verification::Discrepancy {
                source,
                alternative,
                variance_percent,
            } => {
                assert_eq!(source, Provenance::IngredientEstimation);
                assert_eq!(alternative, other);
                assert!(variance_percent >= 30.0);
            }
            other => panic!("expected discrepancy, got {:?}", other),
        }
    }

    #[test]
    fn test_distrust_floor() {
        let ai = NutritionEstimate::new("Curry", 61.0, NutritionFacts::new(700.0, 30.0, 60.0, 35.0), Provenance::Ai);
        let result = reconcile_against(&ai, NutritionFacts::new(350.0, 12.0, 30.0, 15.0));
        assert_eq!(result.confidence.value(), 60.0);
    }

    #[test]
    fn test_trusted_ceiling() {
        let ai = NutritionEstimate::new("Rice", 95.0, NutritionFacts::new(200.0, 4.0, 44.0, 0.5), Provenance::Ai);
        let result = reconcile_against(&ai, NutritionFacts::new(205.0, 4.2, 45.0, 0.4));
        assert!(matches!(result.verification, Verification::Matched { .. }));
        assert_eq!(result.confidence.value(), 99.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_outcome_follows_variance(ai_facts in facts(), other in facts(), confidence in 1.0f64..100.0) {
            let ai = NutritionEstimate::new("Meal", confidence, ai_facts, Provenance::Ai);
            let variance = variance_percent(&ai_facts, &other);
            let result = reconcile_against(&ai, other);

            prop_assert!((0.0..=100.0).contains(&result.confidence.value()));
            prop_assert_eq!(result.variance_percent(), Some(variance));

            match Decision::for_variance(variance, &ReconcilerConfig::default()) {
                Decision::Trusted => {
                    prop_assert_eq!(result.nutrition, other);
                    prop_assert_eq!(result.provenance, Provenance::IngredientEstimation);
                }
                Decision::Blended => {
                    prop_assert_eq!(result.provenance, Provenance::Blended);
                    prop_assert_eq!(
                        result.nutrition.calories,
                        ((other.calories * 0.6 + ai_facts.calories * 0.4) * 10.0).round() / 10.0
                    );
                    prop_assert_eq!(
                        result.nutrition.fat,
                        ((other.fat * 0.6 + ai_facts.fat * 0.4) * 10.0).round() / 10.0
                    );
                }
                Decision::Distrusted => {
                    prop_assert_eq!(result.nutrition, ai_facts);
                    prop_assert!(result.confidence < Confidence::new(confidence));
                    let retained = matches!(
                        result.verification,
                        Verification::Discrepancy { alternative, .. } if alternative == other
                    );
                    prop_assert!(retained);
                }
            }
        }

        #[test]
        fn prop_no_match_keeps_figures(ai_facts in facts(), confidence in 0.0f64..100.0) {
            let reconciler =
                NutritionReconciler::offline(Arc::new(BrandLookupTable::empty()), ReconcilerConfig::default());
            let ai = NutritionEstimate::new("Meal", confidence, ai_facts, Provenance::Ai);
            let result = runtime().block_on(reconciler.reconcile(&ai, &[]));

            prop_assert_eq!(result.nutrition, ai_facts);
            prop_assert_eq!(result.verification, Verification::NoMatchFound);
            prop_assert!(result.confidence >= ai.confidence);
            prop_assert!(result.confidence.value() <= 100.0);
        }
    }
}
