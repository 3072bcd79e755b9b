//! SQLite-backed [`ContractStore`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;

use super::models::{
    ContractChangeset, ContractRow, NewContractRow, NewRefundRow, RefundRow, StatsRow,
};
use super::pool::{SqlitePool, build_pool, get_conn, run_blocking};
use super::schema::{contracts, participant_stats, refund_mail};
use crate::contract::domain::{
    Contract, ContractId, ContractStatus, NewContractRecord, NewRefundRecord, ParticipantId,
    ParticipantStats, RefundEntry, RefundId,
};
use crate::contract::ports::{ContractStore, ContractStoreError, ContractStoreResult};

const CREATE_CONTRACTS: &str = "\
    CREATE TABLE IF NOT EXISTS contracts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kind TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'open',
        contractor_id TEXT NOT NULL,
        contractor_name TEXT NOT NULL,
        worker_id TEXT,
        worker_name TEXT,
        reward BIGINT NOT NULL,
        tax_paid BIGINT NOT NULL,
        created_at BIGINT NOT NULL,
        expires_at BIGINT NOT NULL,
        metadata TEXT NOT NULL
    )";

const CREATE_REFUND_MAIL: &str = "\
    CREATE TABLE IF NOT EXISTS refund_mail (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        recipient_id TEXT NOT NULL,
        amount BIGINT NOT NULL,
        reason TEXT NOT NULL,
        created_at BIGINT NOT NULL
    )";

const CREATE_PARTICIPANT_STATS: &str = "\
    CREATE TABLE IF NOT EXISTS participant_stats (
        participant_id TEXT PRIMARY KEY,
        display_name TEXT NOT NULL,
        total_spent BIGINT NOT NULL DEFAULT 0,
        total_earned BIGINT NOT NULL DEFAULT 0,
        contracts_posted BIGINT NOT NULL DEFAULT 0,
        contracts_completed BIGINT NOT NULL DEFAULT 0
    )";

const CREATE_INDEXES: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_contracts_status ON contracts(status)",
    "CREATE INDEX IF NOT EXISTS idx_refund_mail_recipient ON refund_mail(recipient_id)",
];

const ACTIVE_STATUSES: [&str; 3] = [
    ContractStatus::Open.as_str(),
    ContractStatus::Accepted.as_str(),
    ContractStatus::Paused.as_str(),
];

/// Diesel/SQLite implementation of the contract store.
#[derive(Debug, Clone)]
pub struct SqliteContractStore {
    pool: SqlitePool,
}

impl SqliteContractStore {
    /// Opens (or creates) the database at `database_url` and ensures the
    /// schema exists.
    ///
    /// # Errors
    ///
    /// Returns [`ContractStoreError::Persistence`] when the pool cannot
    /// be built or the schema statements fail.
    pub fn connect(database_url: &str) -> ContractStoreResult<Self> {
        Self::connect_with_pool_size(database_url, 4)
    }

    /// Opens the database with an explicit pool size.
    ///
    /// A size of 1 pins all access to a single connection, which keeps
    /// `:memory:` databases coherent across operations.
    ///
    /// # Errors
    ///
    /// Returns [`ContractStoreError::Persistence`] when the pool cannot
    /// be built or the schema statements fail.
    pub fn connect_with_pool_size(
        database_url: &str,
        pool_size: u32,
    ) -> ContractStoreResult<Self> {
        let pool = build_pool(database_url, pool_size)?;
        let mut conn = get_conn(&pool)?;
        for statement in [CREATE_CONTRACTS, CREATE_REFUND_MAIL, CREATE_PARTICIPANT_STATS] {
            sql_query(statement)
                .execute(&mut conn)
                .map_err(ContractStoreError::persistence)?;
        }
        for statement in CREATE_INDEXES {
            sql_query(statement)
                .execute(&mut conn)
                .map_err(ContractStoreError::persistence)?;
        }
        drop(conn);
        Ok(Self { pool })
    }
}

fn persistence<E>(err: E) -> ContractStoreError
where
    E: std::error::Error + Send + Sync + 'static,
{
    ContractStoreError::persistence(err)
}

#[async_trait]
impl ContractStore for SqliteContractStore {
    async fn insert_contract(&self, record: NewContractRecord) -> ContractStoreResult<Contract> {
        let pool = self.pool.clone();
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let row = NewContractRow::from_record(&record).map_err(persistence)?;
            let id: i64 = diesel::insert_into(contracts::table)
                .values(&row)
                .returning(contracts::id)
                .get_result(&mut conn)
                .map_err(persistence)?;
            Ok(Contract::from_new(ContractId::new(id), record))
        })
        .await
    }

    async fn update_contract(&self, contract: &Contract) -> ContractStoreResult<()> {
        let pool = self.pool.clone();
        let id = contract.id();
        let changeset = ContractChangeset::from_contract(contract).map_err(persistence)?;
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let affected = diesel::update(contracts::table.find(id.value()))
                .set(&changeset)
                .execute(&mut conn)
                .map_err(persistence)?;
            if affected == 0 {
                return Err(ContractStoreError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn load_active(&self) -> ContractStoreResult<Vec<Contract>> {
        let pool = self.pool.clone();
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let rows: Vec<ContractRow> = contracts::table
                .filter(contracts::status.eq_any(ACTIVE_STATUSES))
                .load(&mut conn)
                .map_err(persistence)?;
            rows.into_iter()
                .map(|row| Contract::try_from(row).map_err(persistence))
                .collect()
        })
        .await
    }

    async fn insert_refund(&self, record: NewRefundRecord) -> ContractStoreResult<RefundEntry> {
        let pool = self.pool.clone();
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let row = NewRefundRow::from_record(&record);
            let id: i64 = diesel::insert_into(refund_mail::table)
                .values(&row)
                .returning(refund_mail::id)
                .get_result(&mut conn)
                .map_err(persistence)?;
            Ok(RefundEntry::from_new(RefundId::new(id), record))
        })
        .await
    }

    async fn refunds_for(
        &self,
        recipient: ParticipantId,
    ) -> ContractStoreResult<Vec<RefundEntry>> {
        let pool = self.pool.clone();
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let rows: Vec<RefundRow> = refund_mail::table
                .filter(refund_mail::recipient_id.eq(recipient.to_string()))
                .order(refund_mail::created_at.asc())
                .load(&mut conn)
                .map_err(persistence)?;
            rows.into_iter()
                .map(|row| RefundEntry::try_from(row).map_err(persistence))
                .collect()
        })
        .await
    }

    async fn delete_refunds_for(&self, recipient: ParticipantId) -> ContractStoreResult<()> {
        let pool = self.pool.clone();
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            diesel::delete(
                refund_mail::table.filter(refund_mail::recipient_id.eq(recipient.to_string())),
            )
            .execute(&mut conn)
            .map_err(persistence)?;
            Ok(())
        })
        .await
    }

    async fn upsert_stats(&self, stats: &ParticipantStats) -> ContractStoreResult<()> {
        let pool = self.pool.clone();
        let row = StatsRow::from_stats(stats);
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            diesel::insert_into(participant_stats::table)
                .values(&row)
                .on_conflict(participant_stats::participant_id)
                .do_update()
                .set(&row)
                .execute(&mut conn)
                .map_err(persistence)?;
            Ok(())
        })
        .await
    }

    async fn stats_for(
        &self,
        participant: ParticipantId,
    ) -> ContractStoreResult<Option<ParticipantStats>> {
        let pool = self.pool.clone();
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let row: Option<StatsRow> = participant_stats::table
                .find(participant.to_string())
                .first(&mut conn)
                .optional()
                .map_err(persistence)?;
            row.map(|found| ParticipantStats::try_from(found).map_err(persistence))
                .transpose()
        })
        .await
    }

    async fn top_by_spent(&self, limit: u32) -> ContractStoreResult<Vec<ParticipantStats>> {
        let pool = self.pool.clone();
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let rows: Vec<StatsRow> = participant_stats::table
                .order(participant_stats::total_spent.desc())
                .limit(i64::from(limit))
                .load(&mut conn)
                .map_err(persistence)?;
            rows.into_iter()
                .map(|row| ParticipantStats::try_from(row).map_err(persistence))
                .collect()
        })
        .await
    }

    async fn top_by_earned(&self, limit: u32) -> ContractStoreResult<Vec<ParticipantStats>> {
        let pool = self.pool.clone();
        run_blocking(move || {
            let mut conn = get_conn(&pool)?;
            let rows: Vec<StatsRow> = participant_stats::table
                .order(participant_stats::total_earned.desc())
                .limit(i64::from(limit))
                .load(&mut conn)
                .map_err(persistence)?;
            rows.into_iter()
                .map(|row| ParticipantStats::try_from(row).map_err(persistence))
                .collect()
        })
        .await
    }
}
