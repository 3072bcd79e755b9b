//! Contract lifecycle engine.
//!
//! The board owns the authoritative in-memory cache of all non-terminal
//! contracts and coordinates every transition against the escrow ledger
//! and the storage gateway. Reads are concurrent; every mutation runs
//! under a single coordinator lock, which is what rules out
//! double-accept, double-complete, and double-expire races.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use mockable::Clock;
use tracing::{error, info, warn};

use crate::config::BoardConfig;
use crate::contract::domain::{
    Coins, Contract, ContractId, ContractKind, ContractMetadata, ContractStatus,
    NewContractRecord, NewRefundRecord, Participant, ParticipantId,
};
use crate::contract::ports::{BoardNotifier, EscrowLedger};
use crate::contract::services::{ContractBoardError, StatsLedger, StorageGateway};

type Cache = HashMap<ContractId, Contract>;

/// Result type for board operations.
pub type BoardResult<T> = Result<T, ContractBoardError>;

/// The contract lifecycle engine.
pub struct ContractBoard<C>
where
    C: Clock + Send + Sync,
{
    config: BoardConfig,
    gateway: Arc<StorageGateway>,
    ledger: Arc<dyn EscrowLedger>,
    notifier: Arc<dyn BoardNotifier>,
    stats: Arc<StatsLedger>,
    clock: Arc<C>,
    cache: RwLock<Cache>,
    coordinator: tokio::sync::Mutex<()>,
}

impl<C> ContractBoard<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a board over the given collaborators. The cache starts
    /// empty; call [`ContractBoard::load_from_store`] to hydrate it.
    #[must_use]
    pub fn new(
        config: BoardConfig,
        gateway: Arc<StorageGateway>,
        ledger: Arc<dyn EscrowLedger>,
        notifier: Arc<dyn BoardNotifier>,
        stats: Arc<StatsLedger>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            config,
            gateway,
            ledger,
            notifier,
            stats,
            clock,
            cache: RwLock::new(HashMap::new()),
            coordinator: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns the board configuration.
    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        &self.config
    }

    fn cache_read(&self) -> RwLockReadGuard<'_, Cache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache_write(&self) -> RwLockWriteGuard<'_, Cache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hydrates the cache with every non-terminal contract in the store.
    ///
    /// # Errors
    ///
    /// Returns [`ContractBoardError::PersistenceFailure`] when the load
    /// fails; the cache is left unchanged.
    pub async fn load_from_store(&self) -> BoardResult<usize> {
        let contracts = self.gateway.load_active().await?;
        let _guard = self.coordinator.lock().await;
        let count = contracts.len();
        let mut cache = self.cache_write();
        for contract in contracts {
            cache.insert(contract.id(), contract);
        }
        drop(cache);
        info!(count, "loaded active contracts into cache");
        Ok(count)
    }

    /// Creates a contract, escrowing `reward + tax` from the contractor.
    ///
    /// The debit is reversed in full if the store rejects the insert; on
    /// success the contract is cached `Open` and announced. Tax is a
    /// permanent sink from the moment of debit.
    ///
    /// # Errors
    ///
    /// Short-circuits on the first failed step: kind disabled, reward
    /// out of range, mismatched metadata, contractor limit reached,
    /// insufficient funds, or persistence failure.
    pub async fn create(
        &self,
        contractor: Participant,
        kind: ContractKind,
        reward: Coins,
        metadata: ContractMetadata,
    ) -> BoardResult<Contract> {
        let policy = self.config.policy(kind);
        if !policy.enabled {
            return Err(ContractBoardError::KindDisabled(kind));
        }
        if reward < policy.min_reward || reward > policy.max_reward {
            return Err(ContractBoardError::RewardOutOfRange {
                reward,
                min: policy.min_reward,
                max: policy.max_reward,
            });
        }
        if metadata.kind() != kind {
            return Err(ContractBoardError::MetadataMismatch {
                expected: kind,
                actual: metadata.kind(),
            });
        }

        let _guard = self.coordinator.lock().await;

        let active = self.count_active_by_contractor(contractor.id());
        let limit = usize::try_from(self.config.contract_limit).unwrap_or(usize::MAX);
        if active >= limit {
            return Err(ContractBoardError::LimitReached {
                limit: self.config.contract_limit,
            });
        }

        let tax = reward.tax_at(policy.tax_rate_bps);
        let total_cost = reward + tax;
        self.ledger.withdraw(contractor.id(), total_cost).await?;

        let now = self.clock.utc();
        let record = NewContractRecord {
            kind,
            contractor: contractor.clone(),
            reward,
            tax_paid: tax,
            created_at: now,
            expires_at: now + policy.lifetime(),
            metadata,
        };

        let contract = match self.gateway.insert_contract(record).await {
            Ok(contract) => contract,
            Err(err) => {
                // Compensate: the escrow debit must not outlive a failed
                // insert.
                if let Err(refund_err) = self.ledger.deposit(contractor.id(), total_cost).await {
                    error!(
                        contractor = %contractor.id(),
                        amount = %total_cost,
                        error = %refund_err,
                        "failed to reverse escrow debit after persistence failure",
                    );
                }
                return Err(ContractBoardError::PersistenceFailure(err));
            }
        };

        self.cache_write().insert(contract.id(), contract.clone());
        self.stats.record_spent(&contractor, total_cost);
        self.notifier.contract_created(&contract);
        info!(contract = %contract.id(), kind = %kind, reward = %reward, tax = %tax, "contract created");
        Ok(contract)
    }

    /// Accepts an open contract on behalf of `worker`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractBoardError::NotFound`] when the id is not
    /// cached, [`ContractBoardError::AlreadyTaken`] when the contract is
    /// not `Open`, or [`ContractBoardError::SelfDealing`] when the
    /// worker posted it.
    pub async fn accept(&self, worker: Participant, id: ContractId) -> BoardResult<Contract> {
        let _guard = self.coordinator.lock().await;

        let mut contract = self
            .cached(id)
            .ok_or(ContractBoardError::NotFound(id))?;
        if contract.status() != ContractStatus::Open {
            return Err(ContractBoardError::AlreadyTaken(id));
        }
        if contract.is_contractor(worker.id()) {
            return Err(ContractBoardError::SelfDealing);
        }

        contract.accept(worker)?;
        self.cache_write().insert(id, contract.clone());
        self.gateway.update_contract(&contract);
        self.notifier.contract_accepted(&contract);
        Ok(contract)
    }

    /// Cancels a contract. Only the contractor may cancel, and only
    /// while the contract is active; the net reward (never the tax) is
    /// queued in the contractor's mailbox.
    ///
    /// # Errors
    ///
    /// Returns [`ContractBoardError::NotFound`] when the id is not
    /// cached, or [`ContractBoardError::NotYours`] when `actor` is not
    /// the contractor.
    pub async fn cancel(&self, actor: ParticipantId, id: ContractId) -> BoardResult<Contract> {
        let _guard = self.coordinator.lock().await;

        let mut contract = self
            .cached(id)
            .ok_or(ContractBoardError::NotFound(id))?;
        if !contract.is_contractor(actor) {
            return Err(ContractBoardError::NotYours(id));
        }

        contract.transition_to(ContractStatus::Cancelled)?;
        self.cache_write().remove(&id);
        self.gateway.update_contract(&contract);
        self.gateway.insert_refund(NewRefundRecord {
            recipient: contract.contractor().id(),
            amount: contract.reward(),
            reason: format!("Cancelled contract {id} refund"),
            created_at: self.clock.utc(),
        });
        self.notifier.contract_cancelled(&contract);
        Ok(contract)
    }

    /// Completes a contract and pays the worker the full net reward.
    ///
    /// The single payout path: called only by a fulfilment collaborator
    /// that has independently verified the contract's terms. When the
    /// synchronous ledger credit fails, the payout falls back to the
    /// worker's mailbox instead of being lost.
    ///
    /// # Errors
    ///
    /// Returns [`ContractBoardError::NotFound`] when the id is not
    /// cached, [`ContractBoardError::NotYours`] when `worker` is not the
    /// assigned worker, or a domain error when the contract was never
    /// accepted.
    pub async fn complete(&self, id: ContractId, worker: &Participant) -> BoardResult<Contract> {
        let _guard = self.coordinator.lock().await;

        let mut contract = self
            .cached(id)
            .ok_or(ContractBoardError::NotFound(id))?;
        if contract.worker().map(Participant::id) != Some(worker.id()) {
            return Err(ContractBoardError::NotYours(id));
        }

        contract.transition_to(ContractStatus::Completed)?;
        self.cache_write().remove(&id);
        self.gateway.update_contract(&contract);

        let reward = contract.reward();
        if let Err(err) = self.ledger.deposit(worker.id(), reward).await {
            warn!(
                contract = %id,
                worker = %worker.id(),
                error = %err,
                "synchronous payout failed; queued in mailbox",
            );
            self.gateway.insert_refund(NewRefundRecord {
                recipient: worker.id(),
                amount: reward,
                reason: format!("Completed contract {id} payout"),
                created_at: self.clock.utc(),
            });
        }
        self.stats.record_earned(worker, reward);
        self.notifier.contract_completed(&contract);
        info!(contract = %id, worker = %worker.id(), reward = %reward, "contract completed");
        Ok(contract)
    }

    /// Pauses an accepted liveness-tracked contract because its target
    /// became unreachable. Driven by the liveness tracker.
    ///
    /// # Errors
    ///
    /// Returns [`ContractBoardError::NotFound`] when the id is not
    /// cached, or a domain error when the contract is not `Accepted`.
    pub async fn pause(&self, id: ContractId) -> BoardResult<Contract> {
        self.track_transition(id, ContractStatus::Paused).await
    }

    /// Resumes a paused contract because its target is reachable again.
    ///
    /// # Errors
    ///
    /// Returns [`ContractBoardError::NotFound`] when the id is not
    /// cached, or a domain error when the contract is not `Paused`.
    pub async fn resume(&self, id: ContractId) -> BoardResult<Contract> {
        self.track_transition(id, ContractStatus::Accepted).await
    }

    async fn track_transition(
        &self,
        id: ContractId,
        to: ContractStatus,
    ) -> BoardResult<Contract> {
        let _guard = self.coordinator.lock().await;

        let mut contract = self
            .cached(id)
            .ok_or(ContractBoardError::NotFound(id))?;
        contract.transition_to(to)?;
        self.cache_write().insert(id, contract.clone());
        self.gateway.update_contract(&contract);
        if to == ContractStatus::Paused {
            self.notifier.contract_paused(&contract);
        } else {
            self.notifier.contract_resumed(&contract);
        }
        Ok(contract)
    }

    /// Rewrites a contract's metadata payload on behalf of a fulfilment
    /// collaborator. Status and worker are untouchable through this
    /// path.
    ///
    /// # Errors
    ///
    /// Returns [`ContractBoardError::NotFound`] when the id is not
    /// cached, or a domain error when the payload kind mismatches.
    pub async fn update_metadata(
        &self,
        id: ContractId,
        metadata: ContractMetadata,
    ) -> BoardResult<()> {
        let _guard = self.coordinator.lock().await;

        let mut contract = self
            .cached(id)
            .ok_or(ContractBoardError::NotFound(id))?;
        contract.set_metadata(metadata)?;
        self.cache_write().insert(id, contract.clone());
        self.gateway.update_contract(&contract);
        Ok(())
    }

    /// Expires every cached contract whose expiration has passed.
    ///
    /// Each lapsed contract is removed from the cache before any side
    /// effect, so a racing accept or cancel either won the race already
    /// or fails with not-found. Returns the number of contracts expired;
    /// running twice in succession expires each contract exactly once.
    pub async fn sweep_expired(&self) -> usize {
        let _guard = self.coordinator.lock().await;
        let now = self.clock.utc();

        let lapsed: Vec<Contract> = self
            .cache_read()
            .values()
            .filter(|contract| contract.is_active() && contract.is_expired(now))
            .cloned()
            .collect();
        if lapsed.is_empty() {
            return 0;
        }

        let mut expired = 0;
        for mut contract in lapsed {
            let id = contract.id();
            self.cache_write().remove(&id);
            if let Err(err) = contract.transition_to(ContractStatus::Expired) {
                error!(contract = %id, error = %err, "expiration transition rejected");
                continue;
            }
            self.gateway.update_contract(&contract);
            self.gateway.insert_refund(NewRefundRecord {
                recipient: contract.contractor().id(),
                amount: contract.reward(),
                reason: format!("Expired contract {id} ({}) refund", contract.kind()),
                created_at: now,
            });
            self.notifier.contract_expired(&contract);
            expired += 1;
        }
        info!(expired, "expiration sweep finished");
        expired
    }

    fn cached(&self, id: ContractId) -> Option<Contract> {
        self.cache_read().get(&id).cloned()
    }

    /// Returns the cached contract with the given id, if live.
    #[must_use]
    pub fn contract(&self, id: ContractId) -> Option<Contract> {
        self.cached(id)
    }

    /// Returns all open contracts of a kind, newest first.
    #[must_use]
    pub fn open_by_kind(&self, kind: ContractKind) -> Vec<Contract> {
        let mut open: Vec<Contract> = self
            .cache_read()
            .values()
            .filter(|contract| {
                contract.kind() == kind && contract.status() == ContractStatus::Open
            })
            .cloned()
            .collect();
        open.sort_by_key(|contract| std::cmp::Reverse((contract.created_at(), contract.id())));
        open
    }

    /// Returns every live contract assigned to the given worker.
    #[must_use]
    pub fn by_worker(&self, worker: ParticipantId) -> Vec<Contract> {
        self.cache_read()
            .values()
            .filter(|contract| contract.worker().map(Participant::id) == Some(worker))
            .cloned()
            .collect()
    }

    /// Counts the contractor's live contracts. Paused contracts count.
    #[must_use]
    pub fn count_active_by_contractor(&self, contractor: ParticipantId) -> usize {
        self.cache_read()
            .values()
            .filter(|contract| contract.is_active() && contract.is_contractor(contractor))
            .count()
    }
}
