use serde::{Deserialize, Serialize};

use bounty_audit::{sha256_hex, EntityType, Event};
use bounty_fairness::FairnessAssessment;
use bounty_model::{ActorId, ChallengeId, PaymentSummary};
use bounty_split::calculate_split;

use crate::service::DistributionService;
use crate::types::{EngineError, EngineResult};

/// Content hash of one attachment handed to the report renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIntegrity {
    pub name: String,
    pub sha256: String,
}

/// Everything the external report renderer needs for one completed
/// challenge. The engine guarantees the pieces are internally consistent:
/// the summary is recomputed from the recorded contributions, the
/// assessment is freshly evaluated (and event-logged), and every event in
/// the trail carrying a hash can be verified against its snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBundle {
    pub challenge_id: ChallengeId,
    pub event_trail: Vec<Event>,
    pub fairness: FairnessAssessment,
    pub summary: PaymentSummary,
    pub file_hashes: Vec<FileIntegrity>,
}

/// Hash attachments for the report renderer.
pub fn file_integrity_hashes(files: &[(String, Vec<u8>)]) -> Vec<FileIntegrity> {
    files
        .iter()
        .map(|(name, bytes)| FileIntegrity {
            name: name.clone(),
            sha256: sha256_hex(bytes),
        })
        .collect()
}

impl DistributionService {
    /// Assemble the certificate bundle for a completed challenge.
    ///
    /// Requires a `Completed` challenge. Emits one fairness-assessment
    /// event (via [`DistributionService::fairness_audit`]); everything
    /// else is read-only.
    pub fn report_bundle(
        &self,
        challenge_id: ChallengeId,
        actor: &ActorId,
        attachments: &[(String, Vec<u8>)],
    ) -> EngineResult<ReportBundle> {
        // Fails with NotReady unless the challenge is completed.
        let fairness = self.fairness_audit(challenge_id, actor)?;

        let summary = {
            let store = self.store();
            let store = store.read();
            let bounty = store
                .get_challenge(challenge_id)
                .ok_or(EngineError::ChallengeNotFound(challenge_id))?
                .bounty;
            let contributions = store.contributions_for(challenge_id);
            // Deterministic: reproduces the split that was committed.
            let splits = calculate_split(&contributions, bounty)?;
            PaymentSummary {
                challenge_id,
                total_amount: bounty,
                recipient_count: splits.len(),
                splits,
            }
        };

        let event_trail = self.trail(EntityType::Challenge, challenge_id);

        Ok(ReportBundle {
            challenge_id,
            event_trail,
            fairness,
            summary,
            file_hashes: file_integrity_hashes(attachments),
        })
    }
}
