use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::category::ContributionCategory;

/// Store-assigned challenge identifier.
pub type ChallengeId = u64;
/// Store-assigned contribution identifier.
pub type ContributionId = u64;
/// Store-assigned payment identifier.
pub type PaymentId = u64;
/// Append-sequence event identifier.
pub type EventId = u64;

/// Opaque, already-authenticated identity supplied by the identity provider.
/// The core never inspects it beyond equality checks.
pub type ActorId = String;

/// Lifecycle state of a challenge.
///
/// `Completed` and `Closed` are terminal. The only path into `Completed`
/// is the distribution transaction; `Closed` is the no-distribution exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeStatus {
    /// Funded but no contributions recorded yet.
    Open,
    /// At least one contribution recorded; eligible for completion.
    InProgress,
    /// Distribution executed; payments exist. Terminal.
    Completed,
    /// Withdrawn without distribution. Terminal.
    Closed,
}

impl ChallengeStatus {
    /// Whether the challenge can still accept contributions or edits.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChallengeStatus::Completed | ChallengeStatus::Closed)
    }
}

impl fmt::Display for ChallengeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeStatus::Open => write!(f, "Open"),
            ChallengeStatus::InProgress => write!(f, "InProgress"),
            ChallengeStatus::Completed => write!(f, "Completed"),
            ChallengeStatus::Closed => write!(f, "Closed"),
        }
    }
}

/// A funded unit of work posted by a sponsor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: ChallengeId,
    pub sponsor: ActorId,
    pub title: String,
    /// Bounty amount in currency minor units. Immutable once any
    /// contribution exists against the challenge.
    pub bounty: u64,
    pub status: ChallengeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A unit of recorded work tied to a challenge and a contributor.
///
/// The weight is resolved from the category table once, at creation, and
/// never changes afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: ContributionId,
    pub challenge_id: ChallengeId,
    pub contributor: ActorId,
    pub category: ContributionCategory,
    pub weight: u32,
    pub created_at: DateTime<Utc>,
}

/// How a payment will eventually be settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Fiat,
    Crypto,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Fiat => write!(f, "Fiat"),
            PaymentMethod::Crypto => write!(f, "Crypto"),
        }
    }
}

/// Settlement status of a payment. The core only ever creates `Pending`;
/// the transitions to `Completed`/`Failed` belong to the external
/// settlement process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Completed => write!(f, "Completed"),
            PaymentStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// A durable record of one contributor's share of a completed challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub challenge_id: ChallengeId,
    pub contributor: ActorId,
    /// Amount in currency minor units.
    pub amount: u64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Reference assigned by the external settlement rail, if any.
    pub settlement_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An ephemeral, computed allocation of a bounty to one contributor.
///
/// For a given challenge the amounts sum exactly to the bounty; the
/// percentages are display values and sum to 100 within float rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSplit {
    pub contributor: ActorId,
    /// The contributor's lowest contribution id — stable key after
    /// same-contributor aggregation.
    pub contribution_id: ContributionId,
    /// Aggregated weight across the contributor's contributions.
    pub weight: u64,
    pub percentage: f64,
    /// Amount in currency minor units.
    pub amount: u64,
}

/// Summary of one distribution, returned to the completion caller and
/// embedded in the completion audit snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub challenge_id: ChallengeId,
    pub total_amount: u64,
    pub recipient_count: usize,
    pub splits: Vec<PaymentSplit>,
}
