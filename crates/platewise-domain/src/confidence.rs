//! Confidence score module

use std::fmt;

/// Upper bound of the confidence scale
pub const MAX_CONFIDENCE: f64 = 100.0;

/// Confidence score in [0, 100]
///
/// Every constructor and adjustment clamps, so a `Confidence` can never hold
/// an out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Confidence(f64);

impl Confidence {
    /// Create a confidence score, clamping into [0, 100]
    ///
    /// Non-finite inputs become 0.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, MAX_CONFIDENCE))
        } else {
            Self(0.0)
        }
    }

    /// Raw score
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Raise by `amount`, capped at `ceiling`
    ///
    /// The result is `min(value + amount, ceiling)`, so a score already above
    /// the ceiling is pulled down to it.
    pub fn boost(self, amount: f64, ceiling: f64) -> Self {
        Self::new((self.0 + amount).min(ceiling))
    }

    /// Raise by `amount`, capped only by the scale maximum
    pub fn nudge(self, amount: f64) -> Self {
        Self::new(self.0 + amount)
    }

    /// Lower by `amount`, not dropping below `floor` when starting above it
    ///
    /// A score already at or below the floor still takes the full penalty:
    /// a penalty never leaves the score unchanged or raises it.
    pub fn penalize(self, amount: f64, floor: f64) -> Self {
        let lowered = self.0 - amount;
        if self.0 > floor {
            Self::new(lowered.max(floor))
        } else {
            Self::new(lowered)
        }
    }
}

impl From<f64> for Confidence {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps() {
        assert_eq!(Confidence::new(150.0).value(), 100.0);
        assert_eq!(Confidence::new(-5.0).value(), 0.0);
        assert_eq!(Confidence::new(f64::NAN).value(), 0.0);
        assert_eq!(Confidence::new(72.5).value(), 72.5);
    }

    #[test]
    fn test_boost_caps_at_ceiling() {
        assert_eq!(Confidence::new(80.0).boost(8.0, 99.0).value(), 88.0);
        assert_eq!(Confidence::new(95.0).boost(8.0, 99.0).value(), 99.0);
        assert_eq!(Confidence::new(100.0).boost(8.0, 99.0).value(), 99.0);
    }

    #[test]
    fn test_nudge() {
        assert_eq!(Confidence::new(70.0).nudge(5.0).value(), 75.0);
        assert_eq!(Confidence::new(98.0).nudge(5.0).value(), 100.0);
    }

    #[test]
    fn test_penalize_floors_scores_above_floor() {
        assert_eq!(Confidence::new(80.0).penalize(3.0, 60.0).value(), 77.0);
        assert_eq!(Confidence::new(61.0).penalize(3.0, 60.0).value(), 60.0);
    }

    #[test]
    fn test_penalize_always_lowers() {
        assert_eq!(Confidence::new(60.0).penalize(3.0, 60.0).value(), 57.0);
        assert_eq!(Confidence::new(40.0).penalize(3.0, 60.0).value(), 37.0);
        assert_eq!(Confidence::new(1.0).penalize(3.0, 60.0).value(), 0.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Confidence::new(87.4).to_string(), "87%");
    }
}
