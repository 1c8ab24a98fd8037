use bounty_model::{ChallengeId, ChallengeStatus};

/// Errors produced by the marketplace store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("challenge {0} not found")]
    ChallengeNotFound(ChallengeId),

    #[error("challenge {challenge_id} is {status}, expected {expected}")]
    InvalidStatus {
        challenge_id: ChallengeId,
        status: ChallengeStatus,
        expected: ChallengeStatus,
    },

    #[error("challenge {0} is finalized and no longer accepts contributions")]
    ChallengeFinalized(ChallengeId),

    #[error("bounty of challenge {0} is locked: contributions already exist")]
    BountyLocked(ChallengeId),

    #[error("bounty amount must be positive")]
    ZeroBounty,

    #[error("challenge {0} already has payments")]
    PaymentsExist(ChallengeId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt store snapshot: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
