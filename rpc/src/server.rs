use std::net::SocketAddr;
use std::sync::Arc;

use jsonrpsee::core::RpcResult;
use jsonrpsee::server::ServerBuilder;
use jsonrpsee::types::ErrorObjectOwned;

use bounty_audit::EntityType;
use bounty_engine::{DistributionService, EngineError};
use bounty_model::ContributionCategory;

use crate::handlers::BountyApiServer;
use crate::types::*;

/// JSON-RPC error codes per engine error kind.
const CODE_UNAUTHORIZED: i32 = -32001;
const CODE_NOT_FOUND: i32 = -32002;
const CODE_STATE_CONFLICT: i32 = -32003;
const CODE_VALIDATION: i32 = -32004;
const CODE_INTEGRITY: i32 = -32005;
const CODE_INVALID_PARAMS: i32 = -32602;
const CODE_INTERNAL: i32 = -32000;

/// Map an engine error onto a typed JSON-RPC error object.
fn map_engine_error(err: EngineError) -> ErrorObjectOwned {
    let code = match &err {
        EngineError::Unauthorized { .. } => CODE_UNAUTHORIZED,
        EngineError::ChallengeNotFound(_) => CODE_NOT_FOUND,
        EngineError::AlreadyCompleted(_) | EngineError::NotReady { .. } => CODE_STATE_CONFLICT,
        EngineError::Validation(_) => CODE_VALIDATION,
        EngineError::Integrity { .. } => CODE_INTEGRITY,
        EngineError::Store(_) | EngineError::Audit(_) | EngineError::Serialization(_) => {
            CODE_INTERNAL
        }
    };
    ErrorObjectOwned::owned(code, err.to_string(), None::<()>)
}

/// The bounty marketplace RPC server.
pub struct RpcServer {
    port: u16,
    service: Arc<DistributionService>,
}

impl RpcServer {
    /// Create a new RPC server on the given port over a shared engine.
    pub fn new(port: u16, service: Arc<DistributionService>) -> Self {
        Self { port, service }
    }

    /// Start the JSON-RPC HTTP server. Blocks until the server is shut down.
    pub async fn start(self) -> Result<SocketAddr, Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = format!("0.0.0.0:{}", self.port).parse()?;
        let server = ServerBuilder::default().build(addr).await?;

        let rpc_impl = RpcImpl {
            service: self.service.clone(),
        };

        let addr = server.local_addr()?;
        tracing::info!(%addr, "bounty RPC server starting");

        let handle = server.start(rpc_impl.into_rpc());
        handle.stopped().await;

        Ok(addr)
    }
}

/// Internal implementation of the RPC trait backed by the engine.
struct RpcImpl {
    service: Arc<DistributionService>,
}

impl BountyApiServer for RpcImpl {
    fn create_challenge(&self, req: CreateChallengeRequest) -> RpcResult<ChallengeResponse> {
        let challenge = self
            .service
            .create_challenge(&req.sponsor, &req.title, req.bounty)
            .map_err(map_engine_error)?;
        Ok(ChallengeResponse::from(&challenge))
    }

    fn record_contribution(
        &self,
        req: RecordContributionRequest,
    ) -> RpcResult<ContributionResponse> {
        let category = ContributionCategory::parse(&req.category).ok_or_else(|| {
            ErrorObjectOwned::owned(
                CODE_INVALID_PARAMS,
                format!("unknown contribution category: {}", req.category),
                None::<()>,
            )
        })?;

        let contribution = self
            .service
            .record_contribution(req.challenge_id, &req.contributor, category)
            .map_err(map_engine_error)?;
        Ok(ContributionResponse::from(&contribution))
    }

    fn complete_challenge(&self, req: CompleteChallengeRequest) -> RpcResult<CompletionResponse> {
        let receipt = self
            .service
            .complete_challenge(req.challenge_id, &req.actor)
            .map_err(map_engine_error)?;

        Ok(CompletionResponse {
            challenge: ChallengeResponse::from(&receipt.challenge),
            payments: receipt.payments.iter().map(PaymentResponse::from).collect(),
            summary: SummaryResponse::from(&receipt.summary),
        })
    }

    fn preview_split(&self, challenge_id: u64) -> RpcResult<Vec<SplitResponse>> {
        let splits = self
            .service
            .preview_split(challenge_id)
            .map_err(map_engine_error)?;
        Ok(splits.iter().map(SplitResponse::from).collect())
    }

    fn fairness_audit(&self, challenge_id: u64, actor: String) -> RpcResult<FairnessResponse> {
        let assessment = self
            .service
            .fairness_audit(challenge_id, &actor)
            .map_err(map_engine_error)?;
        let passes = self.service.passes_compliance(&assessment);
        Ok(FairnessResponse::from_assessment(&assessment, passes))
    }

    fn get_trail(&self, entity_type: String, entity_id: u64) -> RpcResult<Vec<EventResponse>> {
        let entity_type = EntityType::parse(&entity_type).ok_or_else(|| {
            ErrorObjectOwned::owned(
                CODE_INVALID_PARAMS,
                format!("unknown entity type: {entity_type}"),
                None::<()>,
            )
        })?;

        let events = self.service.trail(entity_type, entity_id);
        Ok(events.iter().map(EventResponse::from).collect())
    }

    fn get_actor_activity(&self, actor: String, limit: u64) -> RpcResult<Vec<EventResponse>> {
        let events = self.service.actor_activity(&actor, limit as usize);
        Ok(events.iter().map(EventResponse::from).collect())
    }

    fn get_recent_events(&self, limit: u64) -> RpcResult<Vec<EventResponse>> {
        let events = self.service.recent_events(limit as usize);
        Ok(events.iter().map(EventResponse::from).collect())
    }

    fn health(&self) -> RpcResult<HealthResponse> {
        let challenge_count = self.service.store().read().challenge_count();
        let event_count = self.service.events().read().len();
        Ok(HealthResponse {
            status: "ok".to_string(),
            challenge_count,
            event_count,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}
