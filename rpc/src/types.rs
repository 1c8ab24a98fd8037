use serde::{Deserialize, Serialize};

use bounty_audit::Event;
use bounty_fairness::{FairnessAssessment, FairnessFlag};
use bounty_model::{Challenge, Contribution, Payment, PaymentSplit, PaymentSummary};

/// Request to create a challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChallengeRequest {
    pub sponsor: String,
    pub title: String,
    /// Bounty in currency minor units.
    pub bounty: u64,
}

/// Request to record a contribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordContributionRequest {
    pub challenge_id: u64,
    pub contributor: String,
    /// Category name, e.g. "implementation" or "review".
    pub category: String,
}

/// Request to complete a challenge and distribute its bounty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteChallengeRequest {
    pub challenge_id: u64,
    /// Acting identity; must be the challenge's sponsor.
    pub actor: String,
}

/// Response for a challenge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub id: u64,
    pub sponsor: String,
    pub title: String,
    pub bounty: u64,
    pub status: String,
}

impl From<&Challenge> for ChallengeResponse {
    fn from(challenge: &Challenge) -> Self {
        Self {
            id: challenge.id,
            sponsor: challenge.sponsor.clone(),
            title: challenge.title.clone(),
            bounty: challenge.bounty,
            status: challenge.status.to_string(),
        }
    }
}

/// Response for a recorded contribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionResponse {
    pub id: u64,
    pub challenge_id: u64,
    pub contributor: String,
    pub category: String,
    pub weight: u32,
}

impl From<&Contribution> for ContributionResponse {
    fn from(contribution: &Contribution) -> Self {
        Self {
            id: contribution.id,
            challenge_id: contribution.challenge_id,
            contributor: contribution.contributor.clone(),
            category: contribution.category.to_string(),
            weight: contribution.weight,
        }
    }
}

/// One payment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: u64,
    pub challenge_id: u64,
    pub contributor: String,
    pub amount: u64,
    pub method: String,
    pub status: String,
}

impl From<&Payment> for PaymentResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id,
            challenge_id: payment.challenge_id,
            contributor: payment.contributor.clone(),
            amount: payment.amount,
            method: payment.method.to_string(),
            status: payment.status.to_string(),
        }
    }
}

/// One split entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitResponse {
    pub contributor: String,
    pub contribution_id: u64,
    pub weight: u64,
    pub percentage: f64,
    pub amount: u64,
}

impl From<&PaymentSplit> for SplitResponse {
    fn from(split: &PaymentSplit) -> Self {
        Self {
            contributor: split.contributor.clone(),
            contribution_id: split.contribution_id,
            weight: split.weight,
            percentage: split.percentage,
            amount: split.amount,
        }
    }
}

/// Summary of one distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub challenge_id: u64,
    pub total_amount: u64,
    pub recipient_count: usize,
    pub splits: Vec<SplitResponse>,
}

impl From<&PaymentSummary> for SummaryResponse {
    fn from(summary: &PaymentSummary) -> Self {
        Self {
            challenge_id: summary.challenge_id,
            total_amount: summary.total_amount,
            recipient_count: summary.recipient_count,
            splits: summary.splits.iter().map(SplitResponse::from).collect(),
        }
    }
}

/// Response for a completed distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub challenge: ChallengeResponse,
    pub payments: Vec<PaymentResponse>,
    pub summary: SummaryResponse,
}

/// One fairness flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagResponse {
    pub code: String,
    pub detail: String,
}

impl From<&FairnessFlag> for FlagResponse {
    fn from(flag: &FairnessFlag) -> Self {
        Self {
            code: flag.code.clone(),
            detail: flag.detail.clone(),
        }
    }
}

/// Response for a fairness audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairnessResponse {
    pub challenge_id: u64,
    pub gini: f64,
    pub score: f64,
    pub category: String,
    pub passes_threshold: bool,
    pub red_flags: Vec<FlagResponse>,
    pub yellow_flags: Vec<FlagResponse>,
    pub green_flags: Vec<FlagResponse>,
}

impl FairnessResponse {
    pub fn from_assessment(assessment: &FairnessAssessment, passes: bool) -> Self {
        Self {
            challenge_id: assessment.challenge_id,
            gini: assessment.gini,
            score: assessment.score,
            category: assessment.category.to_string(),
            passes_threshold: passes,
            red_flags: assessment.red_flags.iter().map(FlagResponse::from).collect(),
            yellow_flags: assessment
                .yellow_flags
                .iter()
                .map(FlagResponse::from)
                .collect(),
            green_flags: assessment
                .green_flags
                .iter()
                .map(FlagResponse::from)
                .collect(),
        }
    }
}

/// One audit event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventResponse {
    pub id: u64,
    pub actor: String,
    pub entity_type: String,
    pub entity_id: u64,
    pub action: String,
    pub content_hash: Option<String>,
    pub created_at: String,
}

impl From<&Event> for EventResponse {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            actor: event.actor.clone(),
            entity_type: event.entity_type.to_string(),
            entity_id: event.entity_id,
            action: event.action.to_string(),
            content_hash: event.content_hash.clone(),
            created_at: event.created_at.to_rfc3339(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub challenge_count: usize,
    pub event_count: usize,
    pub version: String,
}
