use serde::{Deserialize, Serialize};

use bounty_audit::AuditError;
use bounty_model::{
    ActorId, Challenge, ChallengeId, ChallengeStatus, Payment, PaymentMethod, PaymentSummary,
};
use bounty_split::SplitError;
use bounty_store::StoreError;

/// Engine-level configuration, derived from the marketplace config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Payment method assigned to created payments.
    pub default_method: PaymentMethod,
    /// Compliance gate for fairness scores.
    pub fairness_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_method: PaymentMethod::Fiat,
            fairness_threshold: bounty_fairness::scorer::DEFAULT_FAIRNESS_THRESHOLD,
        }
    }
}

/// Everything returned to the caller of a successful completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionReceipt {
    pub challenge: Challenge,
    pub payments: Vec<Payment>,
    pub summary: PaymentSummary,
}

/// The engine's unified error taxonomy. Every error is structural
/// (authorization, state, or data); none is transient, so the engine never
/// retries internally. Completion is safely retryable by construction: a
/// clean retry either finds the challenge already completed or re-attempts
/// from `InProgress`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Acting identity is not permitted to perform the mutation.
    #[error("actor {actor:?} is not the sponsor of challenge {challenge_id}")]
    Unauthorized {
        challenge_id: ChallengeId,
        actor: ActorId,
    },

    #[error("challenge {0} not found")]
    ChallengeNotFound(ChallengeId),

    /// Conflict: the challenge was already distributed. Idempotent callers
    /// may treat this as success.
    #[error("challenge {0} is already completed")]
    AlreadyCompleted(ChallengeId),

    /// The challenge has not seen enough activity to complete (still
    /// `Open`) or was closed without distribution.
    #[error("challenge {challenge_id} is {status}: not enough activity to complete")]
    NotReady {
        challenge_id: ChallengeId,
        status: ChallengeStatus,
    },

    /// Degenerate split input — a caller-side sequencing bug, not a
    /// transient condition.
    #[error("invalid distribution input: {0}")]
    Validation(#[from] SplitError),

    /// A snapshot failed hash verification: evidence of tampering or
    /// corruption, distinct from ordinary validation.
    #[error("integrity violation: snapshot hash {actual} does not match recorded {expected}")]
    Integrity { expected: String, actual: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("audit log error: {0}")]
    Audit(#[from] AuditError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
