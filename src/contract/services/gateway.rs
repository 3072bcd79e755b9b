//! Serialized persistence gateway.
//!
//! All durable operations funnel through a single worker task so the
//! store never observes two operations concurrently; two updates to the
//! same contract are applied in submission order. Callers submit jobs
//! over a channel: acknowledged jobs reply through a oneshot, while
//! fire-and-forget writes log their failures and move on.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::contract::domain::{
    Contract, NewContractRecord, NewRefundRecord, ParticipantId, ParticipantStats, RefundEntry,
};
use crate::contract::ports::{ContractStore, ContractStoreError, ContractStoreResult};

/// How long shutdown waits for queued writes before aborting the worker.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

enum StorageJob {
    InsertContract {
        record: NewContractRecord,
        reply: oneshot::Sender<ContractStoreResult<Contract>>,
    },
    UpdateContract {
        contract: Box<Contract>,
    },
    LoadActive {
        reply: oneshot::Sender<ContractStoreResult<Vec<Contract>>>,
    },
    InsertRefund {
        record: NewRefundRecord,
    },
    RefundsFor {
        recipient: ParticipantId,
        reply: oneshot::Sender<ContractStoreResult<Vec<RefundEntry>>>,
    },
    DeleteRefundsFor {
        recipient: ParticipantId,
    },
    UpsertStats {
        stats: Box<ParticipantStats>,
    },
    StatsFor {
        participant: ParticipantId,
        reply: oneshot::Sender<ContractStoreResult<Option<ParticipantStats>>>,
    },
    TopBySpent {
        limit: u32,
        reply: oneshot::Sender<ContractStoreResult<Vec<ParticipantStats>>>,
    },
    TopByEarned {
        limit: u32,
        reply: oneshot::Sender<ContractStoreResult<Vec<ParticipantStats>>>,
    },
    Shutdown,
}

/// Handle to the serialized storage worker.
pub struct StorageGateway {
    tx: mpsc::UnboundedSender<StorageJob>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl StorageGateway {
    /// Spawns the worker task over the given store.
    #[must_use]
    pub fn spawn(store: Arc<dyn ContractStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(store, rx));
        Self {
            tx,
            worker: Mutex::new(Some(worker)),
        }
    }

    fn submit(&self, job: StorageJob) -> bool {
        if self.tx.send(job).is_err() {
            warn!("storage gateway is not running; write dropped");
            return false;
        }
        true
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<ContractStoreResult<T>>) -> StorageJob,
    ) -> ContractStoreResult<T> {
        let (reply, response) = oneshot::channel();
        if self.tx.send(build(reply)).is_err() {
            return Err(ContractStoreError::GatewayClosed);
        }
        response
            .await
            .map_err(|_| ContractStoreError::GatewayClosed)?
    }

    /// Inserts a contract and waits for the store-assigned id.
    ///
    /// The one synchronous join point with durability: creation cannot
    /// proceed without the generated identifier.
    ///
    /// # Errors
    ///
    /// Returns the store's error, or
    /// [`ContractStoreError::GatewayClosed`] when the worker is gone.
    pub async fn insert_contract(
        &self,
        record: NewContractRecord,
    ) -> ContractStoreResult<Contract> {
        self.request(|reply| StorageJob::InsertContract { record, reply })
            .await
    }

    /// Persists a contract's mutable fields. Fire-and-forget: durability
    /// is eventual but ordered.
    pub fn update_contract(&self, contract: &Contract) {
        self.submit(StorageJob::UpdateContract {
            contract: Box::new(contract.clone()),
        });
    }

    /// Loads every non-terminal contract for cache hydration.
    ///
    /// # Errors
    ///
    /// Returns the store's error, or
    /// [`ContractStoreError::GatewayClosed`] when the worker is gone.
    pub async fn load_active(&self) -> ContractStoreResult<Vec<Contract>> {
        self.request(|reply| StorageJob::LoadActive { reply }).await
    }

    /// Queues a pending refund. Fire-and-forget.
    pub fn insert_refund(&self, record: NewRefundRecord) {
        self.submit(StorageJob::InsertRefund { record });
    }

    /// Returns a recipient's pending refunds, oldest first.
    ///
    /// # Errors
    ///
    /// Returns the store's error, or
    /// [`ContractStoreError::GatewayClosed`] when the worker is gone.
    pub async fn refunds_for(
        &self,
        recipient: ParticipantId,
    ) -> ContractStoreResult<Vec<RefundEntry>> {
        self.request(|reply| StorageJob::RefundsFor { recipient, reply })
            .await
    }

    /// Deletes a recipient's pending refunds. Fire-and-forget.
    pub fn delete_refunds_for(&self, recipient: ParticipantId) {
        self.submit(StorageJob::DeleteRefundsFor { recipient });
    }

    /// Upserts a participant's aggregate counters. Fire-and-forget.
    pub fn upsert_stats(&self, stats: &ParticipantStats) {
        self.submit(StorageJob::UpsertStats {
            stats: Box::new(stats.clone()),
        });
    }

    /// Returns a participant's aggregate counters, if recorded.
    ///
    /// # Errors
    ///
    /// Returns the store's error, or
    /// [`ContractStoreError::GatewayClosed`] when the worker is gone.
    pub async fn stats_for(
        &self,
        participant: ParticipantId,
    ) -> ContractStoreResult<Option<ParticipantStats>> {
        self.request(|reply| StorageJob::StatsFor { participant, reply })
            .await
    }

    /// Returns the top spenders, highest first.
    ///
    /// # Errors
    ///
    /// Returns the store's error, or
    /// [`ContractStoreError::GatewayClosed`] when the worker is gone.
    pub async fn top_by_spent(&self, limit: u32) -> ContractStoreResult<Vec<ParticipantStats>> {
        self.request(|reply| StorageJob::TopBySpent { limit, reply })
            .await
    }

    /// Returns the top earners, highest first.
    ///
    /// # Errors
    ///
    /// Returns the store's error, or
    /// [`ContractStoreError::GatewayClosed`] when the worker is gone.
    pub async fn top_by_earned(&self, limit: u32) -> ContractStoreResult<Vec<ParticipantStats>> {
        self.request(|reply| StorageJob::TopByEarned { limit, reply })
            .await
    }

    /// Drains queued jobs, then stops the worker.
    ///
    /// Jobs submitted before this call are flushed; the wait is bounded
    /// by [`DRAIN_TIMEOUT`], after which the worker is aborted.
    pub async fn shutdown(&self) {
        drop(self.tx.send(StorageJob::Shutdown));
        let handle = self.worker.lock().ok().and_then(|mut slot| slot.take());
        let Some(mut handle) = handle else {
            return;
        };
        if tokio::time::timeout(DRAIN_TIMEOUT, &mut handle).await.is_err() {
            warn!("storage worker did not drain in time; aborting");
            handle.abort();
        }
    }
}

async fn run_worker(
    store: Arc<dyn ContractStore>,
    mut rx: mpsc::UnboundedReceiver<StorageJob>,
) {
    while let Some(job) = rx.recv().await {
        match job {
            StorageJob::InsertContract { record, reply } => {
                drop(reply.send(store.insert_contract(record).await));
            }
            StorageJob::UpdateContract { contract } => {
                if let Err(err) = store.update_contract(&contract).await {
                    error!(contract = %contract.id(), error = %err, "contract update failed");
                }
            }
            StorageJob::LoadActive { reply } => {
                drop(reply.send(store.load_active().await));
            }
            StorageJob::InsertRefund { record } => {
                if let Err(err) = store.insert_refund(record).await {
                    error!(error = %err, "refund insert failed");
                }
            }
            StorageJob::RefundsFor { recipient, reply } => {
                drop(reply.send(store.refunds_for(recipient).await));
            }
            StorageJob::DeleteRefundsFor { recipient } => {
                if let Err(err) = store.delete_refunds_for(recipient).await {
                    error!(recipient = %recipient, error = %err, "refund delete failed");
                }
            }
            StorageJob::UpsertStats { stats } => {
                if let Err(err) = store.upsert_stats(&stats).await {
                    error!(participant = %stats.participant(), error = %err, "stats upsert failed");
                }
            }
            StorageJob::StatsFor { participant, reply } => {
                drop(reply.send(store.stats_for(participant).await));
            }
            StorageJob::TopBySpent { limit, reply } => {
                drop(reply.send(store.top_by_spent(limit).await));
            }
            StorageJob::TopByEarned { limit, reply } => {
                drop(reply.send(store.top_by_earned(limit).await));
            }
            StorageJob::Shutdown => break,
        }
    }
    debug!("storage worker stopped");
}
