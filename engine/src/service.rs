use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use bounty_audit::{verify_hash, AuditAction, EntityType, Event, EventLog};
use bounty_fairness::{assess_distribution, passes_threshold, FairnessAssessment};
use bounty_model::{
    ActorId, Challenge, ChallengeId, ChallengeStatus, Contribution, ContributionCategory,
    PaymentSplit, PaymentSummary,
};
use bounty_split::calculate_split;
use bounty_store::MarketStore;

use crate::types::{CompletionReceipt, EngineConfig, EngineError, EngineResult};

/// The marketplace's coordinating service: split computation, the
/// distribution transaction, fairness audits, and the audit trail, all
/// over explicitly injected storage handles.
///
/// Lock discipline: operations that touch both stores take the market
/// store lock first, then the event log lock. The distribution
/// transaction holds the market store write lock across its whole
/// check-compute-apply sequence, which makes the challenge status
/// transition the serialization point between concurrent completion
/// attempts.
pub struct DistributionService {
    store: Arc<RwLock<MarketStore>>,
    events: Arc<RwLock<EventLog>>,
    config: EngineConfig,
}

impl DistributionService {
    pub fn new(
        store: Arc<RwLock<MarketStore>>,
        events: Arc<RwLock<EventLog>>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            events,
            config,
        }
    }

    /// Convenience constructor over fresh in-memory state.
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::new(
            Arc::new(RwLock::new(MarketStore::new())),
            Arc::new(RwLock::new(EventLog::new())),
            config,
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared handle to the market store (for persistence at the binary
    /// edge).
    pub fn store(&self) -> Arc<RwLock<MarketStore>> {
        self.store.clone()
    }

    /// Shared handle to the event log (for persistence at the binary edge).
    pub fn events(&self) -> Arc<RwLock<EventLog>> {
        self.events.clone()
    }

    // --- Challenge intake (called by the marketplace surfaces) ---

    /// Post a new challenge and record the audit event.
    pub fn create_challenge(
        &self,
        sponsor: &ActorId,
        title: &str,
        bounty: u64,
    ) -> EngineResult<Challenge> {
        let mut store = self.store.write();
        let challenge = store.create_challenge(sponsor, title, bounty)?;

        let snapshot = serde_json::to_value(&challenge)?;
        self.events.write().append(
            sponsor,
            EntityType::Challenge,
            challenge.id,
            AuditAction::ChallengeCreated,
            Some(&snapshot),
            None,
        );
        Ok(challenge)
    }

    /// Record a contribution (weight pre-resolved from the category table)
    /// and its audit event.
    pub fn record_contribution(
        &self,
        challenge_id: ChallengeId,
        contributor: &ActorId,
        category: ContributionCategory,
    ) -> EngineResult<Contribution> {
        let mut store = self.store.write();
        let contribution = store.record_contribution(challenge_id, contributor, category)?;

        let snapshot = serde_json::to_value(&contribution)?;
        self.events.write().append(
            contributor,
            EntityType::Contribution,
            contribution.id,
            AuditAction::ContributionRecorded,
            Some(&snapshot),
            None,
        );
        Ok(contribution)
    }

    /// Close a challenge without distribution. Sponsor-only.
    pub fn close_challenge(
        &self,
        challenge_id: ChallengeId,
        actor: &ActorId,
    ) -> EngineResult<Challenge> {
        let mut store = self.store.write();

        let sponsor = store
            .get_challenge(challenge_id)
            .ok_or(EngineError::ChallengeNotFound(challenge_id))?
            .sponsor
            .clone();
        if sponsor != *actor {
            return Err(EngineError::Unauthorized {
                challenge_id,
                actor: actor.clone(),
            });
        }

        let challenge = store.close_challenge(challenge_id)?;
        self.events.write().append(
            actor,
            EntityType::Challenge,
            challenge_id,
            AuditAction::ChallengeClosed,
            None,
            None,
        );
        Ok(challenge)
    }

    // --- The distribution transaction ---

    /// Complete a challenge: the one-time, irreversible conversion from
    /// `InProgress` to `Completed` with payments created.
    ///
    /// Preconditions, first failure wins: the challenge must exist (its
    /// sponsor cannot be resolved otherwise), the acting identity must be
    /// the sponsor, and the status must be `InProgress` — `Completed`
    /// yields [`EngineError::AlreadyCompleted`], `Open`/`Closed` yield
    /// [`EngineError::NotReady`].
    ///
    /// The store write lock is held across the whole sequence, so either
    /// every effect (payments, status flip, audit event) is applied or
    /// none is, and a concurrent second invocation observes the conflict
    /// rather than a duplicate distribution.
    pub fn complete_challenge(
        &self,
        challenge_id: ChallengeId,
        actor: &ActorId,
    ) -> EngineResult<CompletionReceipt> {
        let mut store = self.store.write();

        let (sponsor, status, bounty) = {
            let challenge = store
                .get_challenge(challenge_id)
                .ok_or(EngineError::ChallengeNotFound(challenge_id))?;
            (
                challenge.sponsor.clone(),
                challenge.status,
                challenge.bounty,
            )
        };

        if sponsor != *actor {
            warn!(challenge_id, actor = %actor, "completion attempt by non-sponsor");
            return Err(EngineError::Unauthorized {
                challenge_id,
                actor: actor.clone(),
            });
        }
        match status {
            ChallengeStatus::InProgress => {}
            ChallengeStatus::Completed => {
                return Err(EngineError::AlreadyCompleted(challenge_id))
            }
            ChallengeStatus::Open | ChallengeStatus::Closed => {
                return Err(EngineError::NotReady {
                    challenge_id,
                    status,
                })
            }
        }

        // Authoritative split over the contributions as of this moment.
        let contributions = store.contributions_for(challenge_id);
        let splits = calculate_split(&contributions, bounty)?;

        let (challenge, payments) =
            store.commit_completion(challenge_id, &splits, self.config.default_method)?;

        let summary = PaymentSummary {
            challenge_id,
            total_amount: bounty,
            recipient_count: splits.len(),
            splits,
        };

        // The audit record is part of the unit of work, emitted before the
        // store lock is released.
        let snapshot = serde_json::to_value(&summary)?;
        self.events.write().append(
            actor,
            EntityType::Challenge,
            challenge_id,
            AuditAction::ChallengeCompleted,
            Some(&snapshot),
            None,
        );

        info!(
            challenge_id,
            total = summary.total_amount,
            recipients = summary.recipient_count,
            "distribution transaction committed"
        );

        Ok(CompletionReceipt {
            challenge,
            payments,
            summary,
        })
    }

    // --- Read-only projections ---

    /// Preview the split a completion would produce right now. Never
    /// creates payments or events.
    pub fn preview_split(&self, challenge_id: ChallengeId) -> EngineResult<Vec<PaymentSplit>> {
        let store = self.store.read();
        let bounty = store
            .get_challenge(challenge_id)
            .ok_or(EngineError::ChallengeNotFound(challenge_id))?
            .bounty;
        let contributions = store.contributions_for(challenge_id);
        Ok(calculate_split(&contributions, bounty)?)
    }

    // --- Fairness ---

    /// Audit a completed distribution for inequality, recording the
    /// assessment in the audit trail.
    pub fn fairness_audit(
        &self,
        challenge_id: ChallengeId,
        actor: &ActorId,
    ) -> EngineResult<FairnessAssessment> {
        let amounts: Vec<u64> = {
            let store = self.store.read();
            let status = store
                .get_challenge(challenge_id)
                .ok_or(EngineError::ChallengeNotFound(challenge_id))?
                .status;
            if status != ChallengeStatus::Completed {
                return Err(EngineError::NotReady {
                    challenge_id,
                    status,
                });
            }
            store
                .payments_for(challenge_id)
                .iter()
                .map(|p| p.amount)
                .collect()
        };

        let assessment = assess_distribution(challenge_id, &amounts);

        let snapshot = serde_json::to_value(&assessment)?;
        self.events.write().append(
            actor,
            EntityType::Challenge,
            challenge_id,
            AuditAction::FairnessAssessed,
            Some(&snapshot),
            None,
        );

        Ok(assessment)
    }

    /// Whether an assessment clears the configured compliance threshold.
    pub fn passes_compliance(&self, assessment: &FairnessAssessment) -> bool {
        passes_threshold(assessment.score, self.config.fairness_threshold)
    }

    // --- Audit trail queries ---

    /// Complete chronological trail for one entity.
    pub fn trail(&self, entity_type: EntityType, entity_id: u64) -> Vec<Event> {
        self.events.read().trail(entity_type, entity_id)
    }

    /// Most recent events by one actor, newest first.
    pub fn actor_activity(&self, actor: &str, limit: usize) -> Vec<Event> {
        self.events.read().by_actor(actor, limit)
    }

    /// System-wide recent events, newest first.
    pub fn recent_events(&self, limit: usize) -> Vec<Event> {
        self.events.read().recent(limit)
    }

    /// Verify a snapshot against its recorded hash, raising an integrity
    /// error on mismatch. Never silently ignored: a mismatch is evidence
    /// of tampering or corruption.
    pub fn verify_snapshot(
        &self,
        snapshot: &serde_json::Value,
        expected: &str,
    ) -> EngineResult<()> {
        if verify_hash(snapshot, expected) {
            Ok(())
        } else {
            let actual = bounty_audit::content_hash(snapshot);
            warn!(expected, actual, "snapshot failed hash verification");
            Err(EngineError::Integrity {
                expected: expected.to_string(),
                actual,
            })
        }
    }
}
