use accrual_client::{AccrualApi, AccrualOrderStatus, PollOutcome};
use log::*;
use loyalty_engine::{
    db_types::OrderNumber,
    reconciliation::{
        AccrualVerdict, PollResult, ReconcileConfig, ReconcileHandle, ReconciliationEngine, VerdictSource,
        VerdictStatus,
    },
    SqliteDatabase,
};
use tokio::sync::watch;

/// Bridges the accrual HTTP client into the engine's verdict vocabulary.
#[derive(Clone)]
pub struct RemoteVerdictSource {
    api: AccrualApi,
}

impl RemoteVerdictSource {
    pub fn new(api: AccrualApi) -> Self {
        Self { api }
    }
}

impl VerdictSource for RemoteVerdictSource {
    async fn fetch_verdict(&self, number: &OrderNumber) -> PollResult {
        match self.api.order_status(number.as_str()).await {
            PollOutcome::Verdict(verdict) => PollResult::Verdict(AccrualVerdict {
                status: verdict_status(verdict.status),
                accrual: verdict.accrual,
            }),
            PollOutcome::NotRegistered => PollResult::NotRegistered,
            PollOutcome::RateLimited(delay) => PollResult::RateLimited(delay),
            PollOutcome::Unavailable => PollResult::Unavailable,
        }
    }
}

fn verdict_status(status: AccrualOrderStatus) -> VerdictStatus {
    match status {
        AccrualOrderStatus::Registered => VerdictStatus::Registered,
        AccrualOrderStatus::Processing => VerdictStatus::Processing,
        AccrualOrderStatus::Invalid => VerdictStatus::Invalid,
        AccrualOrderStatus::Processed => VerdictStatus::Processed,
    }
}

/// Starts the reconciliation worker. The returned handle drives the shutdown handshake; keep it until the server
/// exits and then call [`ReconcileHandle::stop`].
pub fn start_reconcile_worker(db: SqliteDatabase, api: AccrualApi, config: ReconcileConfig) -> ReconcileHandle {
    let grace = config.shutdown_grace;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine = ReconciliationEngine::new(db, RemoteVerdictSource::new(api), config);
    info!("♻️ Starting order reconciliation worker");
    let handle = tokio::spawn(engine.run(shutdown_rx));
    ReconcileHandle::new(shutdown_tx, handle, grace)
}
