//! Row models and domain conversions for the SQLite adapter.

use super::schema::{contracts, participant_stats, refund_mail};
use crate::contract::domain::{
    Coins, Contract, ContractDomainError, ContractId, ContractKind, ContractMetadata,
    ContractStatus, NewContractRecord, NewRefundRecord, Participant, ParticipantId,
    ParticipantStats, PersistedContractData, RefundEntry, RefundId,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use thiserror::Error;
use uuid::Uuid;

/// Errors converting stored rows back into domain values.
#[derive(Debug, Error)]
pub(super) enum RowError {
    /// A stored identity was not a valid UUID.
    #[error("invalid participant id: {0}")]
    Identity(#[from] uuid::Error),

    /// A stored enum string was unknown.
    #[error("{0}")]
    Enumeration(String),

    /// A stored timestamp was outside the representable range.
    #[error("invalid timestamp: {0}")]
    Timestamp(i64),

    /// A stored metadata payload did not parse.
    #[error("invalid metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    /// The row violated a domain invariant.
    #[error(transparent)]
    Domain(#[from] ContractDomainError),

    /// A stored counter did not fit its domain type.
    #[error("counter out of range: {0}")]
    Counter(i64),
}

fn millis_to_utc(millis: i64) -> Result<DateTime<Utc>, RowError> {
    DateTime::from_timestamp_millis(millis).ok_or(RowError::Timestamp(millis))
}

fn parse_participant_id(raw: &str) -> Result<ParticipantId, RowError> {
    Ok(ParticipantId::from_uuid(Uuid::parse_str(raw)?))
}

fn counter(raw: i64) -> Result<u32, RowError> {
    u32::try_from(raw).map_err(|_| RowError::Counter(raw))
}

/// Queryable contract row. Field order matches the table definition.
#[derive(Debug, Queryable)]
pub(super) struct ContractRow {
    pub(super) id: i64,
    pub(super) kind: String,
    pub(super) status: String,
    pub(super) contractor_id: String,
    pub(super) contractor_name: String,
    pub(super) worker_id: Option<String>,
    pub(super) worker_name: Option<String>,
    pub(super) reward: i64,
    pub(super) tax_paid: i64,
    pub(super) created_at: i64,
    pub(super) expires_at: i64,
    pub(super) metadata: String,
}

impl TryFrom<ContractRow> for Contract {
    type Error = RowError;

    fn try_from(row: ContractRow) -> Result<Self, Self::Error> {
        let kind = ContractKind::try_from(row.kind.as_str())
            .map_err(|err| RowError::Enumeration(err.to_string()))?;
        let status = ContractStatus::try_from(row.status.as_str())
            .map_err(|err| RowError::Enumeration(err.to_string()))?;
        let worker = match (row.worker_id, row.worker_name) {
            (Some(id), Some(name)) => Some(Participant::new(parse_participant_id(&id)?, name)),
            _ => None,
        };
        let metadata: ContractMetadata = serde_json::from_str(&row.metadata)?;
        let contract = Contract::from_persisted(PersistedContractData {
            id: ContractId::new(row.id),
            kind,
            contractor: Participant::new(
                parse_participant_id(&row.contractor_id)?,
                row.contractor_name,
            ),
            worker,
            status,
            reward: Coins::new(row.reward),
            tax_paid: Coins::new(row.tax_paid),
            created_at: millis_to_utc(row.created_at)?,
            expires_at: millis_to_utc(row.expires_at)?,
            metadata,
        })?;
        Ok(contract)
    }
}

/// Insertable contract row.
#[derive(Debug, Insertable)]
#[diesel(table_name = contracts)]
pub(super) struct NewContractRow {
    pub(super) kind: String,
    pub(super) status: String,
    pub(super) contractor_id: String,
    pub(super) contractor_name: String,
    pub(super) worker_id: Option<String>,
    pub(super) worker_name: Option<String>,
    pub(super) reward: i64,
    pub(super) tax_paid: i64,
    pub(super) created_at: i64,
    pub(super) expires_at: i64,
    pub(super) metadata: String,
}

impl NewContractRow {
    pub(super) fn from_record(record: &NewContractRecord) -> Result<Self, serde_json::Error> {
        Ok(Self {
            kind: record.kind.as_str().to_owned(),
            status: ContractStatus::Open.as_str().to_owned(),
            contractor_id: record.contractor.id().to_string(),
            contractor_name: record.contractor.display_name().to_owned(),
            worker_id: None,
            worker_name: None,
            reward: record.reward.amount(),
            tax_paid: record.tax_paid.amount(),
            created_at: record.created_at.timestamp_millis(),
            expires_at: record.expires_at.timestamp_millis(),
            metadata: serde_json::to_string(&record.metadata)?,
        })
    }
}

/// Changeset for the mutable contract columns.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = contracts)]
#[diesel(treat_none_as_null = true)]
pub(super) struct ContractChangeset {
    pub(super) status: String,
    pub(super) worker_id: Option<String>,
    pub(super) worker_name: Option<String>,
    pub(super) metadata: String,
}

impl ContractChangeset {
    pub(super) fn from_contract(contract: &Contract) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status: contract.status().as_str().to_owned(),
            worker_id: contract.worker().map(|worker| worker.id().to_string()),
            worker_name: contract
                .worker()
                .map(|worker| worker.display_name().to_owned()),
            metadata: serde_json::to_string(contract.metadata())?,
        })
    }
}

/// Queryable refund row.
#[derive(Debug, Queryable)]
pub(super) struct RefundRow {
    pub(super) id: i64,
    pub(super) recipient_id: String,
    pub(super) amount: i64,
    pub(super) reason: String,
    pub(super) created_at: i64,
}

impl TryFrom<RefundRow> for RefundEntry {
    type Error = RowError;

    fn try_from(row: RefundRow) -> Result<Self, Self::Error> {
        Ok(RefundEntry::from_persisted(
            RefundId::new(row.id),
            parse_participant_id(&row.recipient_id)?,
            Coins::new(row.amount),
            row.reason,
            millis_to_utc(row.created_at)?,
        ))
    }
}

/// Insertable refund row.
#[derive(Debug, Insertable)]
#[diesel(table_name = refund_mail)]
pub(super) struct NewRefundRow {
    pub(super) recipient_id: String,
    pub(super) amount: i64,
    pub(super) reason: String,
    pub(super) created_at: i64,
}

impl NewRefundRow {
    pub(super) fn from_record(record: &NewRefundRecord) -> Self {
        Self {
            recipient_id: record.recipient.to_string(),
            amount: record.amount.amount(),
            reason: record.reason.clone(),
            created_at: record.created_at.timestamp_millis(),
        }
    }
}

/// Stats row, used for select, insert, and upsert alike.
#[derive(Debug, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = participant_stats)]
pub(super) struct StatsRow {
    pub(super) participant_id: String,
    pub(super) display_name: String,
    pub(super) total_spent: i64,
    pub(super) total_earned: i64,
    pub(super) contracts_posted: i64,
    pub(super) contracts_completed: i64,
}

impl StatsRow {
    pub(super) fn from_stats(stats: &ParticipantStats) -> Self {
        Self {
            participant_id: stats.participant().to_string(),
            display_name: stats.display_name().to_owned(),
            total_spent: stats.total_spent().amount(),
            total_earned: stats.total_earned().amount(),
            contracts_posted: i64::from(stats.contracts_posted()),
            contracts_completed: i64::from(stats.contracts_completed()),
        }
    }
}

impl TryFrom<StatsRow> for ParticipantStats {
    type Error = RowError;

    fn try_from(row: StatsRow) -> Result<Self, Self::Error> {
        Ok(ParticipantStats::from_persisted(
            parse_participant_id(&row.participant_id)?,
            row.display_name,
            Coins::new(row.total_spent),
            Coins::new(row.total_earned),
            counter(row.contracts_posted)?,
            counter(row.contracts_completed)?,
        ))
    }
}
