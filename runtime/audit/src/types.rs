use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use bounty_model::{ActorId, EventId};

/// Kind of entity an event is recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Challenge,
    Contribution,
    Payment,
}

impl EntityType {
    /// Parse from a case-insensitive name, for query surfaces.
    pub fn parse(name: &str) -> Option<EntityType> {
        match name.to_lowercase().as_str() {
            "challenge" => Some(EntityType::Challenge),
            "contribution" => Some(EntityType::Contribution),
            "payment" => Some(EntityType::Payment),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Challenge => write!(f, "Challenge"),
            EntityType::Contribution => write!(f, "Contribution"),
            EntityType::Payment => write!(f, "Payment"),
        }
    }
}

/// Action label recorded on an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    ChallengeCreated,
    ChallengeClosed,
    ContributionRecorded,
    ChallengeCompleted,
    FairnessAssessed,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditAction::ChallengeCreated => write!(f, "CHALLENGE_CREATED"),
            AuditAction::ChallengeClosed => write!(f, "CHALLENGE_CLOSED"),
            AuditAction::ContributionRecorded => write!(f, "CONTRIBUTION_RECORDED"),
            AuditAction::ChallengeCompleted => write!(f, "CHALLENGE_COMPLETED"),
            AuditAction::FairnessAssessed => write!(f, "FAIRNESS_ASSESSED"),
        }
    }
}

/// One immutable audit record.
///
/// Events are only ever appended; the full ordered sequence for an entity
/// is its complete audit trail. When a snapshot was supplied at emission
/// time, `content_hash` is the canonical hash of that snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub actor: ActorId,
    pub entity_type: EntityType,
    pub entity_id: u64,
    pub action: AuditAction,
    pub content_hash: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Errors from the audit log.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt event log: {0}")]
    Corrupt(String),
}

pub type AuditResult<T> = Result<T, AuditError>;
