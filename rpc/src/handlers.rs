use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;

use crate::types::*;

/// The bounty marketplace JSON-RPC API trait.
///
/// Using jsonrpsee's `#[rpc]` proc macro to generate the server implementation.
/// Each method is prefixed with `bounty_` in the JSON-RPC namespace.
#[rpc(server)]
pub trait BountyApi {
    /// Post a new challenge.
    #[method(name = "bounty_createChallenge")]
    fn create_challenge(&self, req: CreateChallengeRequest) -> RpcResult<ChallengeResponse>;

    /// Record a contribution against a challenge.
    #[method(name = "bounty_recordContribution")]
    fn record_contribution(
        &self,
        req: RecordContributionRequest,
    ) -> RpcResult<ContributionResponse>;

    /// Complete a challenge: distribute its bounty and create payments.
    #[method(name = "bounty_completeChallenge")]
    fn complete_challenge(&self, req: CompleteChallengeRequest) -> RpcResult<CompletionResponse>;

    /// Preview the split a completion would produce. Read-only.
    #[method(name = "bounty_previewSplit")]
    fn preview_split(&self, challenge_id: u64) -> RpcResult<Vec<SplitResponse>>;

    /// Audit a completed distribution for fairness.
    #[method(name = "bounty_fairnessAudit")]
    fn fairness_audit(&self, challenge_id: u64, actor: String) -> RpcResult<FairnessResponse>;

    /// The chronological audit trail for one entity.
    #[method(name = "bounty_getTrail")]
    fn get_trail(&self, entity_type: String, entity_id: u64) -> RpcResult<Vec<EventResponse>>;

    /// Recent events by one actor, newest first.
    #[method(name = "bounty_getActorActivity")]
    fn get_actor_activity(&self, actor: String, limit: u64) -> RpcResult<Vec<EventResponse>>;

    /// System-wide recent events, newest first.
    #[method(name = "bounty_getRecentEvents")]
    fn get_recent_events(&self, limit: u64) -> RpcResult<Vec<EventResponse>>;

    /// Health check endpoint.
    #[method(name = "bounty_health")]
    fn health(&self) -> RpcResult<HealthResponse>;
}
