use tracing::debug;

use bounty_model::ChallengeId;

use crate::gini::gini_coefficient;
use crate::types::{FairnessAssessment, FairnessCategory, FairnessFlag};

/// Default compliance gate: distributions scoring below this are flagged
/// for review.
pub const DEFAULT_FAIRNESS_THRESHOLD: f64 = 0.70;

/// Gini level treated as extreme concentration (red).
const GINI_RED: f64 = 0.8;
/// Gini level treated as elevated concentration (yellow).
const GINI_YELLOW: f64 = 0.5;
/// Gini level treated as an even distribution (green).
const GINI_GREEN: f64 = 0.2;
/// Share of the total above which a single recipient draws a warning.
const TOP_SHARE_YELLOW: f64 = 0.75;
/// Recipient count treated as broad participation (green).
const BROAD_PARTICIPATION: usize = 3;

/// Combine inequality and qualitative flags into one [0, 1] score.
///
/// `score = clamp(1.0 - gini * 0.3 - red * 0.15 + green * 0.05, 0.0, 1.0)`
///
/// Inequality alone can cost at most 0.3, each red flag costs three times
/// what a green flag earns, and the clamp keeps the result readable as a
/// probability-like quantity.
pub fn fairness_score(gini: f64, red_flag_count: usize, green_flag_count: usize) -> f64 {
    let raw = 1.0 - gini * 0.3 - red_flag_count as f64 * 0.15 + green_flag_count as f64 * 0.05;
    raw.clamp(0.0, 1.0)
}

/// Whether a score clears the compliance threshold.
pub fn passes_threshold(score: f64, threshold: f64) -> bool {
    score >= threshold
}

/// Evaluate a completed distribution's payout amounts.
///
/// Pure and deterministic: the same amounts always produce the same
/// assessment. Callers log the result as an audit event when it must be
/// auditable.
pub fn assess_distribution(challenge_id: ChallengeId, amounts: &[u64]) -> FairnessAssessment {
    let gini = gini_coefficient(amounts);
    let n = amounts.len();
    let total: u128 = amounts.iter().map(|&a| a as u128).sum();

    let mut red_flags = Vec::new();
    let mut yellow_flags = Vec::new();
    let mut green_flags = Vec::new();

    if gini > GINI_RED {
        red_flags.push(FairnessFlag::new(
            "extreme_concentration",
            format!("gini coefficient {gini:.3} exceeds {GINI_RED}"),
        ));
    } else if gini > GINI_YELLOW {
        yellow_flags.push(FairnessFlag::new(
            "elevated_concentration",
            format!("gini coefficient {gini:.3} exceeds {GINI_YELLOW}"),
        ));
    }

    let zero_recipients = amounts.iter().filter(|&&a| a == 0).count();
    if zero_recipients > 0 && zero_recipients < n {
        red_flags.push(FairnessFlag::new(
            "unpaid_recipient",
            format!("{zero_recipients} recipient(s) allocated nothing while others were paid"),
        ));
    }

    if n > 1 && total > 0 {
        let top = amounts.iter().copied().max().unwrap_or(0);
        let top_share = top as f64 / total as f64;
        if top_share > TOP_SHARE_YELLOW {
            yellow_flags.push(FairnessFlag::new(
                "dominant_recipient",
                format!("top recipient holds {:.1}% of the payout", top_share * 100.0),
            ));
        }
    }

    if n >= 2 && gini < GINI_GREEN {
        green_flags.push(FairnessFlag::new(
            "even_distribution",
            format!("gini coefficient {gini:.3} below {GINI_GREEN}"),
        ));
    }
    let paid = n - zero_recipients;
    if paid >= BROAD_PARTICIPATION {
        green_flags.push(FairnessFlag::new(
            "broad_participation",
            format!("{paid} recipients shared the payout"),
        ));
    }

    let score = fairness_score(gini, red_flags.len(), green_flags.len());
    let category = FairnessCategory::from_score(score);

    debug!(
        challenge_id,
        gini,
        score,
        %category,
        red = red_flags.len(),
        yellow = yellow_flags.len(),
        green = green_flags.len(),
        "distribution assessed"
    );

    FairnessAssessment {
        challenge_id,
        gini,
        score,
        category,
        red_flags,
        yellow_flags,
        green_flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_formula() {
        assert_eq!(fairness_score(0.0, 0, 0), 1.0);
        assert!((fairness_score(0.5, 0, 0) - 0.85).abs() < 1e-12);
        assert!((fairness_score(0.0, 2, 0) - 0.70).abs() < 1e-12);
        assert!((fairness_score(0.0, 0, 2) - 1.0).abs() < 1e-12); // clamped
        assert!((fairness_score(1.0, 0, 1) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_score_clamped_to_zero() {
        assert_eq!(fairness_score(1.0, 10, 0), 0.0);
    }

    #[test]
    fn test_score_monotone_in_gini() {
        let mut last = f64::INFINITY;
        for step in 0..=10 {
            let gini = step as f64 / 10.0;
            let score = fairness_score(gini, 1, 1);
            assert!(score < last, "score must strictly decrease as gini rises");
            last = score;
        }
    }

    #[test]
    fn test_score_monotone_in_flags() {
        // More red flags: lower (until the clamp).
        assert!(fairness_score(0.3, 1, 0) < fairness_score(0.3, 0, 0));
        assert!(fairness_score(0.3, 2, 0) < fairness_score(0.3, 1, 0));
        // More green flags: higher (until the clamp).
        assert!(fairness_score(0.3, 0, 1) > fairness_score(0.3, 0, 0));
    }

    #[test]
    fn test_threshold_gate() {
        assert!(passes_threshold(0.70, DEFAULT_FAIRNESS_THRESHOLD));
        assert!(passes_threshold(0.95, DEFAULT_FAIRNESS_THRESHOLD));
        assert!(!passes_threshold(0.69, DEFAULT_FAIRNESS_THRESHOLD));
    }

    #[test]
    fn test_even_distribution_assessment() {
        let assessment = assess_distribution(1, &[25_000, 25_000, 25_000, 25_000]);
        assert_eq!(assessment.gini, 0.0);
        assert!(assessment.red_flags.is_empty());
        assert!(assessment.yellow_flags.is_empty());
        // Even spread + broad participation.
        assert_eq!(assessment.green_flags.len(), 2);
        assert_eq!(assessment.category, FairnessCategory::Excellent);
    }

    #[test]
    fn test_winner_take_all_assessment() {
        let assessment = assess_distribution(2, &[0, 0, 0, 0, 1_000_000]);
        // gini = 4/5 = 0.8: not red by itself, but the unpaid recipients are.
        assert!(assessment
            .red_flags
            .iter()
            .any(|f| f.code == "unpaid_recipient"));
        assert!(assessment
            .yellow_flags
            .iter()
            .any(|f| f.code == "dominant_recipient"));
        assert!(assessment.score < 0.70);
    }

    #[test]
    fn test_solo_recipient_is_clean() {
        let assessment = assess_distribution(3, &[100_000]);
        assert_eq!(assessment.gini, 0.0);
        assert!(assessment.red_flags.is_empty());
        assert!(assessment.yellow_flags.is_empty());
        assert_eq!(assessment.category, FairnessCategory::Excellent);
    }

    #[test]
    fn test_deterministic() {
        let a = assess_distribution(4, &[40_000, 33_333, 26_667]);
        let b = assess_distribution(4, &[40_000, 33_333, 26_667]);
        assert_eq!(a, b);
    }
}
