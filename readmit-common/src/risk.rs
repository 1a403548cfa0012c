//! Risk tier classification
//!
//! Buckets a readmission probability into a discrete tier with a fixed
//! advisory string. One boundary policy is canonical across the tools:
//! the index is the probability truncated to a percent, and tier bounds
//! are strict upper bounds (index < 30 is LOW, 30..59 is MEDIUM, 60 and
//! up is HIGH).

use serde::{Deserialize, Serialize};

/// Discrete risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        }
    }

    /// Fixed advisory string attached to every assessment in this tier
    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskTier::Low => "Continue routine follow-up and outpatient care.",
            RiskTier::Medium => "Consider enhanced discharge planning and close follow-up.",
            RiskTier::High => {
                "Recommend intensive transitional care and early follow-up within 7 days."
            }
        }
    }

    /// Get all tiers in ascending severity order
    pub fn all_variants() -> &'static [RiskTier] {
        &[RiskTier::Low, RiskTier::Medium, RiskTier::High]
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Tier cutpoints, kept as data so variant drift is a configuration diff
///
/// `medium_cutpoint` is the lowest index classified MEDIUM;
/// `high_cutpoint` is the lowest index classified HIGH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskPolicy {
    pub medium_cutpoint: u8,
    pub high_cutpoint: u8,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            medium_cutpoint: 30,
            high_cutpoint: 60,
        }
    }
}

/// One scored submission; created per request, never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub probability: f64,
    /// 0..=100, truncation of probability x 100
    pub risk_index: u8,
    pub risk_tier: RiskTier,
    pub recommendation: String,
}

impl RiskPolicy {
    /// Cutpoints must be ordered and within the index range
    pub fn check(&self) -> crate::Result<()> {
        if self.medium_cutpoint == 0
            || self.medium_cutpoint >= self.high_cutpoint
            || self.high_cutpoint > 100
        {
            return Err(crate::Error::Config(format!(
                "invalid risk cutpoints: medium {} / high {}",
                self.medium_cutpoint, self.high_cutpoint
            )));
        }
        Ok(())
    }

    /// Classify a model probability
    ///
    /// Total over all finite inputs; values outside [0,1] are clamped
    /// before banding.
    pub fn classify(&self, probability: f64) -> RiskAssessment {
        let p = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let risk_index = (p * 100.0) as u8;
        let risk_tier = if risk_index < self.medium_cutpoint {
            RiskTier::Low
        } else if risk_index < self.high_cutpoint {
            RiskTier::Medium
        } else {
            RiskTier::High
        };
        RiskAssessment {
            probability: p,
            risk_index,
            risk_tier,
            recommendation: risk_tier.recommendation().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_bands() {
        let policy = RiskPolicy::default();
        assert_eq!(policy.classify(0.0).risk_tier, RiskTier::Low);
        assert_eq!(policy.classify(0.29).risk_tier, RiskTier::Low);
        assert_eq!(policy.classify(0.45).risk_tier, RiskTier::Medium);
        assert_eq!(policy.classify(0.59).risk_tier, RiskTier::Medium);
        assert_eq!(policy.classify(0.85).risk_tier, RiskTier::High);
        assert_eq!(policy.classify(1.0).risk_tier, RiskTier::High);
    }

    #[test]
    fn test_strict_upper_boundaries() {
        // Exactly 30 is the first MEDIUM index and exactly 60 the first
        // HIGH index under the canonical strict-upper-bound policy.
        let policy = RiskPolicy::default();
        let at_medium = policy.classify(0.30);
        assert_eq!(at_medium.risk_index, 30);
        assert_eq!(at_medium.risk_tier, RiskTier::Medium);
        let at_high = policy.classify(0.60);
        assert_eq!(at_high.risk_index, 60);
        assert_eq!(at_high.risk_tier, RiskTier::High);
    }

    #[test]
    fn test_index_truncates() {
        let policy = RiskPolicy::default();
        assert_eq!(policy.classify(0.299).risk_index, 29);
        assert_eq!(policy.classify(0.999).risk_index, 99);
        assert_eq!(policy.classify(1.0).risk_index, 100);
    }

    #[test]
    fn test_high_tier_scenario() {
        let policy = RiskPolicy::default();
        let assessment = policy.classify(0.65);
        assert_eq!(assessment.risk_index, 65);
        assert_eq!(assessment.risk_tier, RiskTier::High);
        assert_eq!(
            assessment.recommendation,
            "Recommend intensive transitional care and early follow-up within 7 days."
        );
    }

    #[test]
    fn test_monotonic_in_probability() {
        let policy = RiskPolicy::default();
        let mut previous = RiskTier::Low;
        for step in 0..=1000 {
            let tier = policy.classify(step as f64 / 1000.0).risk_tier;
            assert!(tier >= previous, "tier dropped at p={}", step as f64 / 1000.0);
            previous = tier;
        }
    }

    #[test]
    fn test_out_of_range_probability_clamped() {
        let policy = RiskPolicy::default();
        assert_eq!(policy.classify(-0.5).risk_index, 0);
        assert_eq!(policy.classify(1.5).risk_index, 100);
        assert_eq!(policy.classify(f64::NAN).risk_index, 0);
    }

    #[test]
    fn test_policy_check() {
        assert!(RiskPolicy::default().check().is_ok());
        assert!(RiskPolicy {
            medium_cutpoint: 60,
            high_cutpoint: 30
        }
        .check()
        .is_err());
        assert!(RiskPolicy {
            medium_cutpoint: 30,
            high_cutpoint: 101
        }
        .check()
        .is_err());
    }

    #[test]
    fn test_tier_serde_uppercase() {
        assert_eq!(serde_json::to_string(&RiskTier::High).unwrap(), "\"HIGH\"");
        let parsed: RiskTier = serde_json::from_str("\"MEDIUM\"").unwrap();
        assert_eq!(parsed, RiskTier::Medium);
    }
}
