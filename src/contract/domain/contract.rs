//! Contract aggregate root.

use super::{
    Coins, ContractDomainError, ContractId, ContractKind, ContractMetadata, ContractStatus,
    Participant, ParticipantId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An escrow-backed task contract.
///
/// Kind, contractor, reward, tax, and timestamps are fixed at creation.
/// The worker is set exactly once, on acceptance. Metadata may be
/// rewritten by fulfilment collaborators; status changes go through the
/// validated state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    id: ContractId,
    kind: ContractKind,
    contractor: Participant,
    worker: Option<Participant>,
    status: ContractStatus,
    reward: Coins,
    tax_paid: Coins,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    metadata: ContractMetadata,
}

/// Payload for inserting a new contract; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContractRecord {
    /// Task kind, fixed at creation.
    pub kind: ContractKind,
    /// Posting participant.
    pub contractor: Participant,
    /// Net reward escrowed for the worker.
    pub reward: Coins,
    /// Tax consumed at creation; recorded for audit, never refunded.
    pub tax_paid: Coins,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
    /// Kind-specific payload.
    pub metadata: ContractMetadata,
}

/// Parameter object for reconstructing a persisted contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedContractData {
    /// Persisted contract identifier.
    pub id: ContractId,
    /// Persisted task kind.
    pub kind: ContractKind,
    /// Persisted contractor record.
    pub contractor: Participant,
    /// Persisted worker record, if accepted.
    pub worker: Option<Participant>,
    /// Persisted lifecycle status.
    pub status: ContractStatus,
    /// Persisted net reward.
    pub reward: Coins,
    /// Persisted tax amount.
    pub tax_paid: Coins,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted expiration timestamp.
    pub expires_at: DateTime<Utc>,
    /// Persisted metadata payload.
    pub metadata: ContractMetadata,
}

impl Contract {
    /// Builds the live aggregate for a freshly inserted record.
    ///
    /// New contracts always start `Open` with no worker.
    #[must_use]
    pub fn from_new(id: ContractId, record: NewContractRecord) -> Self {
        Self {
            id,
            kind: record.kind,
            contractor: record.contractor,
            worker: None,
            status: ContractStatus::Open,
            reward: record.reward,
            tax_paid: record.tax_paid,
            created_at: record.created_at,
            expires_at: record.expires_at,
            metadata: record.metadata,
        }
    }

    /// Reconstructs a contract from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`ContractDomainError::WorkerInvariantViolated`] when the
    /// stored worker presence contradicts the stored status: a worker
    /// is mandatory once accepted, forbidden while open, and optional
    /// in terminal states (a cancelled contract keeps the worker it
    /// had).
    pub fn from_persisted(data: PersistedContractData) -> Result<Self, ContractDomainError> {
        let worker_mismatch = (data.status.requires_worker() && data.worker.is_none())
            || (data.status == ContractStatus::Open && data.worker.is_some());
        if worker_mismatch {
            return Err(ContractDomainError::WorkerInvariantViolated {
                contract: data.id,
                status: data.status,
            });
        }
        Ok(Self {
            id: data.id,
            kind: data.kind,
            contractor: data.contractor,
            worker: data.worker,
            status: data.status,
            reward: data.reward,
            tax_paid: data.tax_paid,
            created_at: data.created_at,
            expires_at: data.expires_at,
            metadata: data.metadata,
        })
    }

    /// Returns the contract identifier.
    #[must_use]
    pub const fn id(&self) -> ContractId {
        self.id
    }

    /// Returns the task kind.
    #[must_use]
    pub const fn kind(&self) -> ContractKind {
        self.kind
    }

    /// Returns the posting contractor.
    #[must_use]
    pub const fn contractor(&self) -> &Participant {
        &self.contractor
    }

    /// Returns the accepted worker, if any.
    #[must_use]
    pub const fn worker(&self) -> Option<&Participant> {
        self.worker.as_ref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ContractStatus {
        self.status
    }

    /// Returns the net reward escrowed for the worker.
    #[must_use]
    pub const fn reward(&self) -> Coins {
        self.reward
    }

    /// Returns the tax consumed at creation.
    #[must_use]
    pub const fn tax_paid(&self) -> Coins {
        self.tax_paid
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the expiration timestamp.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the kind-specific payload.
    #[must_use]
    pub const fn metadata(&self) -> &ContractMetadata {
        &self.metadata
    }

    /// Returns `true` while the contract is non-terminal.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Returns `true` once the expiration timestamp has passed `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Returns `true` when the given participant is the contractor.
    #[must_use]
    pub fn is_contractor(&self, participant: ParticipantId) -> bool {
        self.contractor.id() == participant
    }

    /// Accepts the contract: records the worker and moves `Open` to
    /// `Accepted` in one step, preserving the worker-presence invariant.
    ///
    /// # Errors
    ///
    /// Returns [`ContractDomainError::SelfDealing`] when the worker is
    /// the contractor, or [`ContractDomainError::InvalidTransition`] if
    /// the contract is not `Open`.
    pub fn accept(&mut self, worker: Participant) -> Result<(), ContractDomainError> {
        if worker.id() == self.contractor.id() {
            return Err(ContractDomainError::SelfDealing(self.id));
        }
        if self.status != ContractStatus::Open {
            return Err(ContractDomainError::InvalidTransition {
                contract: self.id,
                from: self.status,
                to: ContractStatus::Accepted,
            });
        }
        self.worker = Some(worker);
        self.status = ContractStatus::Accepted;
        Ok(())
    }

    /// Moves the contract to a new status via the validated state
    /// machine. Acceptance must go through [`Contract::accept`] so the
    /// worker is recorded atomically with the transition.
    ///
    /// # Errors
    ///
    /// Returns [`ContractDomainError::InvalidTransition`] when the state
    /// machine forbids the change, or
    /// [`ContractDomainError::WorkerInvariantViolated`] when the target
    /// status requires a worker and none is set.
    pub fn transition_to(&mut self, to: ContractStatus) -> Result<(), ContractDomainError> {
        if !self.status.can_transition_to(to) {
            return Err(ContractDomainError::InvalidTransition {
                contract: self.id,
                from: self.status,
                to,
            });
        }
        if to.requires_worker() && self.worker.is_none() {
            return Err(ContractDomainError::WorkerInvariantViolated {
                contract: self.id,
                status: to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Replaces the metadata payload; the only mutation fulfilment
    /// collaborators are allowed.
    ///
    /// # Errors
    ///
    /// Returns [`ContractDomainError::MetadataKindMismatch`] when the
    /// payload does not belong to this contract's kind.
    pub fn set_metadata(&mut self, metadata: ContractMetadata) -> Result<(), ContractDomainError> {
        if metadata.kind() != self.kind {
            return Err(ContractDomainError::MetadataKindMismatch {
                contract: self.id,
                expected: self.kind,
                actual: metadata.kind(),
            });
        }
        self.metadata = metadata;
        Ok(())
    }
}
