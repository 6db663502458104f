//! Variance and blending between two nutrition estimates
//!
//! "Variance" here is the average percentage difference across the macro
//! keys both estimates can be compared on, used as a trust threshold. It is
//! not a statistical variance.

use crate::nutrition::round_to_tenth;
use crate::{Nutrient, NutritionFacts};

/// Variance reported when the two estimates share no comparable macro key
pub const NO_OVERLAP_VARIANCE: f64 = 100.0;

/// Average percentage difference between two estimates
///
/// For every key in [`Nutrient::MACROS`] present (strictly positive) in both,
/// the difference is `|a - b| / min(a, b) * 100`. A key that is zero on both
/// sides agrees exactly and counts as 0. A key that is zero on one side
/// only is skipped. The result is the mean over the counted keys, or
/// [`NO_OVERLAP_VARIANCE`] when none can be compared.
///
/// Dividing by the smaller figure makes the measure symmetric and never
/// understates a disagreement.
///
/// # Examples
///
/// ```
/// use platewise_domain::{variance_percent, NutritionFacts};
///
/// let ai = NutritionFacts::new(500.0, 20.0, 50.0, 20.0);
/// let brand = NutritionFacts::new(510.0, 19.0, 48.0, 21.0);
/// let v = variance_percent(&ai, &brand);
/// assert!((v - 4.1).abs() < 0.1);
/// ```
pub fn variance_percent(a: &NutritionFacts, b: &NutritionFacts) -> f64 {
    let diffs: Vec<f64> = Nutrient::MACROS
        .iter()
        .filter_map(|n| match (a.is_present(*n), b.is_present(*n)) {
            (true, true) => {
                let (x, y) = (a.get(*n), b.get(*n));
                Some((x - y).abs() / x.min(y) * 100.0)
            }
            (false, false) => Some(0.0),
            _ => None,
        })
        .collect();

    if diffs.is_empty() {
        return NO_OVERLAP_VARIANCE;
    }

    diffs.iter().sum::<f64>() / diffs.len() as f64
}

/// Weighted average of two estimates, rounded to one decimal per nutrient
///
/// Each nutrient becomes `round(secondary * secondary_weight + primary *
/// (1 - secondary_weight), 1)`.
pub fn blend(primary: &NutritionFacts, secondary: &NutritionFacts, secondary_weight: f64) -> NutritionFacts {
    let w = secondary_weight.clamp(0.0, 1.0);
    primary.map(|n, p| round_to_tenth(secondary.get(n) * w + p * (1.0 - w)))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn facts() -> impl Strategy<Value = NutritionFacts> {
        (0.0f64..2000.0, 0.0f64..150.0, 0.0f64..300.0, 0.0f64..150.0)
            .prop_map(|(c, p, cb, f)| NutritionFacts::new(c, p, cb, f))
    }

    proptest! {
        /// Property: variance(A, B) == variance(B, A)
        #[test]
        fn test_variance_is_symmetric(a in facts(), b in facts()) {
            let ab = variance_percent(&a, &b);
            let ba = variance_percent(&b, &a);
            prop_assert!((ab - ba).abs() < 1e-9, "{} != {}", ab, ba);
        }

        /// Property: variance is never negative
        #[test]
        fn test_variance_non_negative(a in facts(), b in facts()) {
            prop_assert!(variance_percent(&a, &b) >= 0.0);
        }

        /// Property: every blended nutrient lies between its two inputs
        #[test]
        fn test_blend_stays_between_inputs(ai in facts(), other in facts(), w in 0.0f64..=1.0) {
            let blended = blend(&ai, &other, w);
            for n in Nutrient::ALL {
                let (lo, hi) = (ai.get(n).min(other.get(n)), ai.get(n).max(other.get(n)));
                let v = blended.get(n);
                prop_assert!(v >= lo - 0.05 && v <= hi + 0.05, "{:?}: {} outside [{}, {}]", n, v, lo, hi);
            }
        }

        /// Property: blending an estimate with itself only rounds it
        #[test]
        fn test_blend_with_self_is_rounding(x in facts(), w in 0.0f64..=1.0) {
            prop_assert_eq!(blend(&x, &x, w), x.round_to_tenth());
        }
    }
}
