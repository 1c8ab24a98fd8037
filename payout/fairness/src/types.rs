use serde::{Deserialize, Serialize};
use std::fmt;

use bounty_model::ChallengeId;

/// Qualitative band for a fairness score. Bands are contiguous and
/// exhaustive over [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FairnessCategory {
    /// Score >= 0.85.
    Excellent,
    /// Score >= 0.70.
    Good,
    /// Score >= 0.50.
    Fair,
    /// Score >= 0.30.
    Poor,
    /// Score < 0.30.
    Critical,
}

impl FairnessCategory {
    /// Map a score in [0, 1] to its band.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            FairnessCategory::Excellent
        } else if score >= 0.70 {
            FairnessCategory::Good
        } else if score >= 0.50 {
            FairnessCategory::Fair
        } else if score >= 0.30 {
            FairnessCategory::Poor
        } else {
            FairnessCategory::Critical
        }
    }
}

impl fmt::Display for FairnessCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FairnessCategory::Excellent => write!(f, "Excellent"),
            FairnessCategory::Good => write!(f, "Good"),
            FairnessCategory::Fair => write!(f, "Fair"),
            FairnessCategory::Poor => write!(f, "Poor"),
            FairnessCategory::Critical => write!(f, "Critical"),
        }
    }
}

/// One observation about a distribution. Severity is carried by which list
/// of the assessment the flag appears in (red / yellow / green).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairnessFlag {
    /// Stable machine-readable code, e.g. "extreme_concentration".
    pub code: String,
    /// Human-readable detail.
    pub detail: String,
}

impl FairnessFlag {
    pub fn new(code: &str, detail: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            detail: detail.into(),
        }
    }
}

/// The complete fairness evaluation of one distribution.
///
/// Recomputing from the same payout amounts always yields the same
/// assessment; the score is a pure function of (gini, red count,
/// green count).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessAssessment {
    pub challenge_id: ChallengeId,
    /// Inequality of the distribution: 0.0 perfectly equal, 1.0 maximally
    /// concentrated.
    pub gini: f64,
    /// Derived compliance signal in [0, 1].
    pub score: f64,
    pub category: FairnessCategory,
    /// Blocking findings.
    pub red_flags: Vec<FairnessFlag>,
    /// Warnings.
    pub yellow_flags: Vec<FairnessFlag>,
    /// Positive signals.
    pub green_flags: Vec<FairnessFlag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_cover_unit_interval() {
        assert_eq!(FairnessCategory::from_score(1.0), FairnessCategory::Excellent);
        assert_eq!(FairnessCategory::from_score(0.85), FairnessCategory::Excellent);
        assert_eq!(FairnessCategory::from_score(0.84), FairnessCategory::Good);
        assert_eq!(FairnessCategory::from_score(0.70), FairnessCategory::Good);
        assert_eq!(FairnessCategory::from_score(0.69), FairnessCategory::Fair);
        assert_eq!(FairnessCategory::from_score(0.50), FairnessCategory::Fair);
        assert_eq!(FairnessCategory::from_score(0.49), FairnessCategory::Poor);
        assert_eq!(FairnessCategory::from_score(0.30), FairnessCategory::Poor);
        assert_eq!(FairnessCategory::from_score(0.29), FairnessCategory::Critical);
        assert_eq!(FairnessCategory::from_score(0.0), FairnessCategory::Critical);
    }

    #[test]
    fn category_display() {
        assert_eq!(FairnessCategory::Excellent.to_string(), "Excellent");
        assert_eq!(FairnessCategory::Critical.to_string(), "Critical");
    }
}
