use std::time::Duration;

use log::*;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::MissedTickBehavior,
};

use crate::{
    db_types::{Order, OrderStatus},
    reconciliation::verdict::{PollResult, VerdictSource},
    traits::{LedgerError, OrderManagement},
};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ReconcileConfig {
    /// Time between sweeps. The interval is measured from the *end* of a sweep, so a slow sweep can never overlap
    /// the next one.
    pub poll_interval: Duration,
    /// How long [`ReconcileHandle::stop`] waits for the task to drain before abandoning it.
    pub shutdown_grace: Duration,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self { poll_interval: DEFAULT_POLL_INTERVAL, shutdown_grace: DEFAULT_SHUTDOWN_GRACE }
    }
}

/// What a single sweep accomplished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    /// The sweep visited every unreconciled order.
    Completed { finalized: usize, pending: usize },
    /// The accrual service applied backpressure. The sweep stopped immediately; the remaining orders were not
    /// polled, and the whole schedule must pause for the given duration.
    RateLimited(Duration),
}

enum Disposition {
    Finalized,
    Pending,
    RateLimited(Duration),
}

/// The core of the gateway: drives every non-terminal order towards its final verdict.
///
/// The engine owns no per-order timers. One schedule, one sweep at a time, oldest order first. See the module docs
/// for the backpressure contract.
pub struct ReconciliationEngine<B, C> {
    db: B,
    source: C,
    config: ReconcileConfig,
}

impl<B, C> ReconciliationEngine<B, C>
where
    B: OrderManagement,
    C: VerdictSource,
{
    pub fn new(db: B, source: C, config: ReconcileConfig) -> Self {
        Self { db, source, config }
    }

    /// Runs sweeps on the configured cadence until `shutdown` fires (or its sender is dropped).
    ///
    /// The loop has exactly two suspension points outside a sweep: the interval timer and the rate-limit cool-down.
    /// Both race against the shutdown signal, so a stop request is honoured without starting another sweep.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut timer = tokio::time::interval(self.config.poll_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("♻️ Order reconciliation engine started (sweep interval {}s)", self.config.poll_interval.as_secs());
        loop {
            tokio::select! {
                _ = timer.tick() => {},
                _ = shutdown.changed() => break,
            }
            match self.sweep().await {
                Ok(SweepOutcome::Completed { finalized, pending }) => {
                    if finalized + pending > 0 {
                        debug!("♻️ Sweep complete. {finalized} orders finalized, {pending} still pending");
                    }
                },
                Ok(SweepOutcome::RateLimited(cooldown)) => {
                    warn!(
                        "♻️ Accrual service applied backpressure. Suspending all polling for {}s",
                        cooldown.as_secs()
                    );
                    tokio::select! {
                        _ = tokio::time::sleep(cooldown) => timer.reset(),
                        _ = shutdown.changed() => break,
                    }
                },
                Err(e) => {
                    error!("♻️ Could not run reconciliation sweep: {e}. Retrying on the next tick");
                },
            }
        }
        info!("♻️ Order reconciliation engine stopped");
    }

    /// One pass over all unreconciled orders, oldest upload first.
    ///
    /// Per-order ledger failures are logged and the order is left for the next sweep; only a failure to *list* the
    /// orders aborts the sweep with an error. A rate-limit response aborts the sweep immediately without touching
    /// the remaining orders.
    pub async fn sweep(&self) -> Result<SweepOutcome, LedgerError> {
        let orders = self.db.fetch_unreconciled_orders().await?;
        if orders.is_empty() {
            trace!("♻️ Nothing to reconcile");
            return Ok(SweepOutcome::Completed { finalized: 0, pending: 0 });
        }
        debug!("♻️ Sweeping {} unreconciled orders", orders.len());
        let mut finalized = 0;
        let mut pending = 0;
        for order in &orders {
            match self.reconcile_order(order).await {
                Disposition::Finalized => finalized += 1,
                Disposition::Pending => pending += 1,
                Disposition::RateLimited(cooldown) => return Ok(SweepOutcome::RateLimited(cooldown)),
            }
        }
        Ok(SweepOutcome::Completed { finalized, pending })
    }

    async fn reconcile_order(&self, order: &Order) -> Disposition {
        // The NEW -> PROCESSING transition is committed before any external call, so a restart mid-sweep retries
        // the order instead of losing it.
        if order.status == OrderStatus::New {
            if let Err(e) = self.db.mark_order_processing(&order.number).await {
                error!("♻️ Could not move order {} into PROCESSING: {e}. It will be retried on the next sweep", order.number);
                return Disposition::Pending;
            }
        }
        match self.source.fetch_verdict(&order.number).await {
            PollResult::Verdict(verdict) => match verdict.status.final_order_status() {
                Some(status) => {
                    let accrual = match status {
                        OrderStatus::Processed => Some(verdict.accrual.unwrap_or_default()),
                        _ => None,
                    };
                    match self.db.finalize_order(&order.number, status, accrual).await {
                        Ok(order) => {
                            info!("♻️ Order {} reconciled as {}", order.number, order.status);
                            Disposition::Finalized
                        },
                        Err(e @ LedgerError::TerminalWriteConflict { .. }) => {
                            // The stored verdict stands; this one is discarded.
                            error!("♻️ {e}");
                            Disposition::Pending
                        },
                        Err(e) => {
                            error!(
                                "♻️ Could not finalize order {}: {e}. It will be retried on the next sweep",
                                order.number
                            );
                            Disposition::Pending
                        },
                    }
                },
                None => {
                    trace!("♻️ Order {} is still {} upstream", order.number, verdict.status);
                    Disposition::Pending
                },
            },
            PollResult::NotRegistered => {
                trace!("♻️ Order {} is not registered with the accrual service yet", order.number);
                Disposition::Pending
            },
            PollResult::RateLimited(cooldown) => Disposition::RateLimited(cooldown),
            PollResult::Unavailable => {
                debug!("♻️ Accrual service unavailable for order {}. It will be retried on the next sweep", order.number);
                Disposition::Pending
            },
        }
    }
}

/// The shutdown handshake for a running engine: send the stop signal, then wait for the task to drain.
///
/// If the task does not finish within the configured grace period (for example because an outbound call is stuck
/// right at its deadline), it is abandoned with [`JoinHandle::abort`]. Every ledger write the engine performs is
/// idempotent, so an aborted in-flight write is safe to retry after a restart.
pub struct ReconcileHandle {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
    grace: Duration,
}

impl ReconcileHandle {
    pub fn new(shutdown: watch::Sender<bool>, handle: JoinHandle<()>, grace: Duration) -> Self {
        Self { shutdown, handle, grace }
    }

    pub async fn stop(mut self) {
        let _ = self.shutdown.send(true);
        match tokio::time::timeout(self.grace, &mut self.handle).await {
            Ok(_) => info!("♻️ Reconciliation worker drained cleanly"),
            Err(_) => {
                warn!("♻️ Reconciliation worker did not drain within {}s. Abandoning it", self.grace.as_secs());
                self.handle.abort();
            },
        }
    }
}
