use std::collections::BTreeMap;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use bounty_model::{
    ActorId, Challenge, ChallengeId, ChallengeStatus, Contribution, ContributionCategory,
    ContributionId, Payment, PaymentId, PaymentMethod, PaymentSplit, PaymentStatus,
};

use crate::types::{StoreError, StoreResult};

/// The marketplace's durable store: challenges, contributions, payments.
///
/// Plain `&mut self` mutators with validate-then-apply semantics — an
/// operation that returns an error leaves the store untouched. Services
/// wrap the store in `Arc<RwLock<MarketStore>>`; the challenge status
/// transition inside [`MarketStore::commit_completion`] is the
/// serialization point for concurrent completion attempts.
#[derive(Debug, Serialize, Deserialize)]
pub struct MarketStore {
    challenges: BTreeMap<ChallengeId, Challenge>,
    contributions: BTreeMap<ContributionId, Contribution>,
    payments: BTreeMap<PaymentId, Payment>,
    next_challenge_id: ChallengeId,
    next_contribution_id: ContributionId,
    next_payment_id: PaymentId,
}

impl MarketStore {
    /// Create an empty store. Ids start at 1.
    pub fn new() -> Self {
        Self {
            challenges: BTreeMap::new(),
            contributions: BTreeMap::new(),
            payments: BTreeMap::new(),
            next_challenge_id: 1,
            next_contribution_id: 1,
            next_payment_id: 1,
        }
    }

    // --- Challenges ---

    /// Create a new challenge in `Open` status.
    pub fn create_challenge(
        &mut self,
        sponsor: &ActorId,
        title: &str,
        bounty: u64,
    ) -> StoreResult<Challenge> {
        if bounty == 0 {
            return Err(StoreError::ZeroBounty);
        }

        let now = Utc::now();
        let challenge = Challenge {
            id: self.next_challenge_id,
            sponsor: sponsor.clone(),
            title: title.to_string(),
            bounty,
            status: ChallengeStatus::Open,
            created_at: now,
            updated_at: now,
        };
        self.next_challenge_id += 1;
        self.challenges.insert(challenge.id, challenge.clone());

        debug!(challenge_id = challenge.id, bounty, "challenge created");
        Ok(challenge)
    }

    pub fn get_challenge(&self, id: ChallengeId) -> Option<&Challenge> {
        self.challenges.get(&id)
    }

    pub fn challenge_count(&self) -> usize {
        self.challenges.len()
    }

    /// All challenges in ascending id order.
    pub fn challenges(&self) -> impl Iterator<Item = &Challenge> {
        self.challenges.values()
    }

    /// Change the bounty of a challenge that has no contributions yet.
    ///
    /// Once any contribution exists the bounty is locked for good.
    pub fn update_bounty(&mut self, id: ChallengeId, bounty: u64) -> StoreResult<Challenge> {
        if bounty == 0 {
            return Err(StoreError::ZeroBounty);
        }
        let has_contributions = self.has_contributions(id);
        let challenge = self
            .challenges
            .get_mut(&id)
            .ok_or(StoreError::ChallengeNotFound(id))?;

        if challenge.status.is_terminal() {
            return Err(StoreError::ChallengeFinalized(id));
        }
        if has_contributions {
            return Err(StoreError::BountyLocked(id));
        }

        challenge.bounty = bounty;
        challenge.updated_at = Utc::now();
        Ok(challenge.clone())
    }

    /// Close a challenge without distribution (the no-payout terminal path).
    pub fn close_challenge(&mut self, id: ChallengeId) -> StoreResult<Challenge> {
        let challenge = self
            .challenges
            .get_mut(&id)
            .ok_or(StoreError::ChallengeNotFound(id))?;

        if challenge.status.is_terminal() {
            return Err(StoreError::ChallengeFinalized(id));
        }

        challenge.status = ChallengeStatus::Closed;
        challenge.updated_at = Utc::now();
        info!(challenge_id = id, "challenge closed without distribution");
        Ok(challenge.clone())
    }

    // --- Contributions ---

    /// Record a contribution against a challenge.
    ///
    /// The payout weight is resolved from the category table here, once;
    /// it never changes afterward. The first contribution moves the
    /// challenge from `Open` to `InProgress`.
    pub fn record_contribution(
        &mut self,
        challenge_id: ChallengeId,
        contributor: &ActorId,
        category: ContributionCategory,
    ) -> StoreResult<Contribution> {
        let challenge = self
            .challenges
            .get_mut(&challenge_id)
            .ok_or(StoreError::ChallengeNotFound(challenge_id))?;

        if challenge.status.is_terminal() {
            return Err(StoreError::ChallengeFinalized(challenge_id));
        }

        let now = Utc::now();
        if challenge.status == ChallengeStatus::Open {
            challenge.status = ChallengeStatus::InProgress;
            challenge.updated_at = now;
            debug!(challenge_id, "first contribution, challenge in progress");
        }

        let contribution = Contribution {
            id: self.next_contribution_id,
            challenge_id,
            contributor: contributor.clone(),
            category,
            weight: category.weight(),
            created_at: now,
        };
        self.next_contribution_id += 1;
        self.contributions
            .insert(contribution.id, contribution.clone());

        debug!(
            contribution_id = contribution.id,
            challenge_id,
            weight = contribution.weight,
            "contribution recorded"
        );
        Ok(contribution)
    }

    /// Contributions for a challenge, ascending id order.
    pub fn contributions_for(&self, challenge_id: ChallengeId) -> Vec<Contribution> {
        self.contributions
            .values()
            .filter(|c| c.challenge_id == challenge_id)
            .cloned()
            .collect()
    }

    pub fn has_contributions(&self, challenge_id: ChallengeId) -> bool {
        self.contributions
            .values()
            .any(|c| c.challenge_id == challenge_id)
    }

    pub fn contribution_count(&self) -> usize {
        self.contributions.len()
    }

    // --- Payments ---

    /// Payments created for a challenge, ascending id order.
    pub fn payments_for(&self, challenge_id: ChallengeId) -> Vec<Payment> {
        self.payments
            .values()
            .filter(|p| p.challenge_id == challenge_id)
            .cloned()
            .collect()
    }

    /// Payments addressed to a contributor, ascending id order.
    pub fn payments_to(&self, contributor: &str) -> Vec<Payment> {
        self.payments
            .values()
            .filter(|p| p.contributor == contributor)
            .cloned()
            .collect()
    }

    pub fn payment_count(&self) -> usize {
        self.payments.len()
    }

    // --- Completion ---

    /// Atomically apply a distribution: create one pending payment per
    /// split and move the challenge to `Completed`.
    ///
    /// The `InProgress` check is the optimistic precondition — under the
    /// caller's write lock, a concurrent second completion attempt finds
    /// the challenge already `Completed` and gets `InvalidStatus` instead
    /// of a duplicate payment set. All effects happen inside this single
    /// `&mut self` call, so they are indivisible: an error return means
    /// nothing was applied.
    pub fn commit_completion(
        &mut self,
        challenge_id: ChallengeId,
        splits: &[PaymentSplit],
        method: PaymentMethod,
    ) -> StoreResult<(Challenge, Vec<Payment>)> {
        let challenge = self
            .challenges
            .get(&challenge_id)
            .ok_or(StoreError::ChallengeNotFound(challenge_id))?;

        if challenge.status != ChallengeStatus::InProgress {
            return Err(StoreError::InvalidStatus {
                challenge_id,
                status: challenge.status,
                expected: ChallengeStatus::InProgress,
            });
        }
        if self.payments.values().any(|p| p.challenge_id == challenge_id) {
            // Unreachable while the status guard holds; refuse regardless.
            return Err(StoreError::PaymentsExist(challenge_id));
        }

        let now = Utc::now();
        let mut created = Vec::with_capacity(splits.len());
        for split in splits {
            let payment = Payment {
                id: self.next_payment_id,
                challenge_id,
                contributor: split.contributor.clone(),
                amount: split.amount,
                method,
                status: PaymentStatus::Pending,
                settlement_ref: None,
                created_at: now,
                updated_at: now,
            };
            self.next_payment_id += 1;
            self.payments.insert(payment.id, payment.clone());
            created.push(payment);
        }

        let challenge = self.challenges.get_mut(&challenge_id).unwrap();
        challenge.status = ChallengeStatus::Completed;
        challenge.updated_at = now;

        info!(
            challenge_id,
            payments = created.len(),
            total = created.iter().map(|p| p.amount).sum::<u64>(),
            "challenge completed, payments created"
        );
        Ok((challenge.clone(), created))
    }

    // --- Persistence ---

    /// Persist the whole store as pretty JSON.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a previously persisted store and re-validate its referential
    /// integrity.
    pub fn from_file<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let store: MarketStore = serde_json::from_str(&contents)?;
        store.validate()?;
        Ok(store)
    }

    /// Check cross-references and id counters of a loaded snapshot.
    pub fn validate(&self) -> StoreResult<()> {
        for contribution in self.contributions.values() {
            if !self.challenges.contains_key(&contribution.challenge_id) {
                return Err(StoreError::Corrupt(format!(
                    "contribution {} references missing challenge {}",
                    contribution.id, contribution.challenge_id
                )));
            }
        }
        for payment in self.payments.values() {
            if !self.challenges.contains_key(&payment.challenge_id) {
                return Err(StoreError::Corrupt(format!(
                    "payment {} references missing challenge {}",
                    payment.id, payment.challenge_id
                )));
            }
        }

        let max_challenge = self.challenges.keys().max().copied().unwrap_or(0);
        let max_contribution = self.contributions.keys().max().copied().unwrap_or(0);
        let max_payment = self.payments.keys().max().copied().unwrap_or(0);
        if self.next_challenge_id <= max_challenge
            || self.next_contribution_id <= max_contribution
            || self.next_payment_id <= max_payment
        {
            return Err(StoreError::Corrupt(
                "id counter behind existing records".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for MarketStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sponsor() -> ActorId {
        "sponsor-a".to_string()
    }

    fn contributor(name: &str) -> ActorId {
        name.to_string()
    }

    fn store_with_challenge(bounty: u64) -> (MarketStore, ChallengeId) {
        let mut store = MarketStore::new();
        let challenge = store
            .create_challenge(&sponsor(), "Fix the parser", bounty)
            .unwrap();
        (store, challenge.id)
    }

    fn split(contributor_name: &str, contribution_id: u64, amount: u64) -> PaymentSplit {
        PaymentSplit {
            contributor: contributor_name.to_string(),
            contribution_id,
            weight: 10,
            percentage: 0.0,
            amount,
        }
    }

    // --- Challenge lifecycle ---

    #[test]
    fn test_create_challenge_starts_open() {
        let (store, id) = store_with_challenge(100_000);
        let challenge = store.get_challenge(id).unwrap();
        assert_eq!(challenge.status, ChallengeStatus::Open);
        assert_eq!(challenge.bounty, 100_000);
        assert_eq!(store.challenge_count(), 1);
    }

    #[test]
    fn test_create_challenge_zero_bounty_rejected() {
        let mut store = MarketStore::new();
        assert!(matches!(
            store.create_challenge(&sponsor(), "t", 0),
            Err(StoreError::ZeroBounty)
        ));
    }

    #[test]
    fn test_first_contribution_flips_to_in_progress() {
        let (mut store, id) = store_with_challenge(100_000);
        store
            .record_contribution(id, &contributor("alice"), ContributionCategory::Implementation)
            .unwrap();
        assert_eq!(
            store.get_challenge(id).unwrap().status,
            ChallengeStatus::InProgress
        );
    }

    #[test]
    fn test_contribution_weight_from_category() {
        let (mut store, id) = store_with_challenge(100_000);
        let contribution = store
            .record_contribution(id, &contributor("alice"), ContributionCategory::Review)
            .unwrap();
        assert_eq!(contribution.weight, ContributionCategory::Review.weight());
    }

    #[test]
    fn test_contribution_to_missing_challenge() {
        let mut store = MarketStore::new();
        assert!(matches!(
            store.record_contribution(99, &contributor("alice"), ContributionCategory::Triage),
            Err(StoreError::ChallengeNotFound(99))
        ));
    }

    #[test]
    fn test_bounty_update_before_contributions() {
        let (mut store, id) = store_with_challenge(100_000);
        let updated = store.update_bounty(id, 200_000).unwrap();
        assert_eq!(updated.bounty, 200_000);
    }

    #[test]
    fn test_bounty_locked_after_contribution() {
        let (mut store, id) = store_with_challenge(100_000);
        store
            .record_contribution(id, &contributor("alice"), ContributionCategory::Testing)
            .unwrap();
        assert!(matches!(
            store.update_bounty(id, 200_000),
            Err(StoreError::BountyLocked(_))
        ));
        // Unchanged.
        assert_eq!(store.get_challenge(id).unwrap().bounty, 100_000);
    }

    #[test]
    fn test_close_challenge() {
        let (mut store, id) = store_with_challenge(100_000);
        let closed = store.close_challenge(id).unwrap();
        assert_eq!(closed.status, ChallengeStatus::Closed);
        // Terminal: no further contributions.
        assert!(matches!(
            store.record_contribution(id, &contributor("alice"), ContributionCategory::Triage),
            Err(StoreError::ChallengeFinalized(_))
        ));
    }

    #[test]
    fn test_close_twice_rejected() {
        let (mut store, id) = store_with_challenge(100_000);
        store.close_challenge(id).unwrap();
        assert!(matches!(
            store.close_challenge(id),
            Err(StoreError::ChallengeFinalized(_))
        ));
    }

    // --- Completion ---

    #[test]
    fn test_commit_completion_happy_path() {
        let (mut store, id) = store_with_challenge(100_000);
        store
            .record_contribution(id, &contributor("alice"), ContributionCategory::Implementation)
            .unwrap();

        let splits = vec![split("alice", 1, 60_000), split("bob", 2, 40_000)];
        let (challenge, payments) = store
            .commit_completion(id, &splits, PaymentMethod::Fiat)
            .unwrap();

        assert_eq!(challenge.status, ChallengeStatus::Completed);
        assert_eq!(payments.len(), 2);
        assert!(payments.iter().all(|p| p.status == PaymentStatus::Pending));
        assert!(payments.iter().all(|p| p.method == PaymentMethod::Fiat));
        assert!(payments.iter().all(|p| p.settlement_ref.is_none()));
        assert_eq!(store.payments_for(id).len(), 2);
    }

    #[test]
    fn test_commit_completion_requires_in_progress() {
        let (mut store, id) = store_with_challenge(100_000);
        // Still Open: no contributions.
        let splits = vec![split("alice", 1, 100_000)];
        let err = store
            .commit_completion(id, &splits, PaymentMethod::Fiat)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidStatus {
                status: ChallengeStatus::Open,
                ..
            }
        ));
        assert_eq!(store.payment_count(), 0);
    }

    #[test]
    fn test_commit_completion_only_once() {
        let (mut store, id) = store_with_challenge(100_000);
        store
            .record_contribution(id, &contributor("alice"), ContributionCategory::Implementation)
            .unwrap();
        let splits = vec![split("alice", 1, 100_000)];
        store
            .commit_completion(id, &splits, PaymentMethod::Fiat)
            .unwrap();

        // The losing side of a completion race sees the status conflict.
        let err = store
            .commit_completion(id, &splits, PaymentMethod::Fiat)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidStatus {
                status: ChallengeStatus::Completed,
                ..
            }
        ));
        assert_eq!(store.payments_for(id).len(), 1);
    }

    #[test]
    fn test_completed_challenge_rejects_contributions() {
        let (mut store, id) = store_with_challenge(100_000);
        store
            .record_contribution(id, &contributor("alice"), ContributionCategory::Implementation)
            .unwrap();
        store
            .commit_completion(
                id,
                &[split("alice", 1, 100_000)],
                PaymentMethod::Fiat,
            )
            .unwrap();

        assert!(matches!(
            store.record_contribution(id, &contributor("bob"), ContributionCategory::Review),
            Err(StoreError::ChallengeFinalized(_))
        ));
    }

    #[test]
    fn test_payments_to_contributor() {
        let (mut store, id) = store_with_challenge(100_000);
        store
            .record_contribution(id, &contributor("alice"), ContributionCategory::Implementation)
            .unwrap();
        store
            .commit_completion(
                id,
                &[split("alice", 1, 60_000), split("bob", 2, 40_000)],
                PaymentMethod::Crypto,
            )
            .unwrap();

        let alice_payments = store.payments_to("alice");
        assert_eq!(alice_payments.len(), 1);
        assert_eq!(alice_payments[0].amount, 60_000);
        assert!(store.payments_to("nobody").is_empty());
    }

    // --- Persistence ---

    #[test]
    fn test_file_roundtrip() {
        let (mut store, id) = store_with_challenge(100_000);
        store
            .record_contribution(id, &contributor("alice"), ContributionCategory::Implementation)
            .unwrap();
        store
            .commit_completion(
                id,
                &[split("alice", 1, 100_000)],
                PaymentMethod::Fiat,
            )
            .unwrap();

        let tmp = std::env::temp_dir().join("bounty_store_roundtrip.json");
        store.to_file(&tmp).expect("write should succeed");
        let loaded = MarketStore::from_file(&tmp).expect("read should succeed");
        let _ = std::fs::remove_file(&tmp);

        assert_eq!(loaded.challenge_count(), 1);
        assert_eq!(loaded.contribution_count(), 1);
        assert_eq!(loaded.payment_count(), 1);
        assert_eq!(
            loaded.get_challenge(id).unwrap().status,
            ChallengeStatus::Completed
        );

        // Id sequence continues after reload.
        let mut loaded = loaded;
        let next = loaded
            .create_challenge(&sponsor(), "Another", 5_000)
            .unwrap();
        assert_eq!(next.id, id + 1);
    }

    #[test]
    fn test_validate_rejects_dangling_contribution() {
        let (mut store, id) = store_with_challenge(100_000);
        store
            .record_contribution(id, &contributor("alice"), ContributionCategory::Implementation)
            .unwrap();

        let tmp = std::env::temp_dir().join("bounty_store_dangling.json");
        store.to_file(&tmp).unwrap();

        // Remove the challenge from the snapshot on disk.
        let contents = std::fs::read_to_string(&tmp).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        value["challenges"]
            .as_object_mut()
            .unwrap()
            .clear();
        std::fs::write(&tmp, serde_json::to_string_pretty(&value).unwrap()).unwrap();

        let result = MarketStore::from_file(&tmp);
        let _ = std::fs::remove_file(&tmp);
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }
}
