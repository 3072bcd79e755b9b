//! Tests for the serialized storage gateway.

use std::sync::Arc;

use mockable::Clock;
use rstest::{fixture, rstest};

use crate::contract::adapters::memory::InMemoryContractStore;
use crate::contract::domain::{
    Coins, ContractKind, NewContractRecord, NewRefundRecord, Participant,
};
use crate::contract::ports::{ContractStore, ContractStoreError};
use crate::contract::services::StorageGateway;
use crate::contract::tests::support::{TestClock, gathering_metadata, participant};

#[fixture]
fn store() -> Arc<InMemoryContractStore> {
    Arc::new(InMemoryContractStore::new())
}

fn record(contractor: &Participant) -> NewContractRecord {
    let now = TestClock::new().utc();
    NewContractRecord {
        kind: ContractKind::ItemGathering,
        contractor: contractor.clone(),
        reward: Coins::new(100),
        tax_paid: Coins::new(3),
        created_at: now,
        expires_at: now + chrono::Duration::hours(48),
        metadata: gathering_metadata(),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn insert_returns_store_assigned_ids_in_order(store: Arc<InMemoryContractStore>) {
    let gateway = StorageGateway::spawn(store);
    let contractor = participant("poster");

    let first = gateway
        .insert_contract(record(&contractor))
        .await
        .expect("first insert");
    let second = gateway
        .insert_contract(record(&contractor))
        .await
        .expect("second insert");

    assert!(second.id().value() > first.id().value());
    gateway.shutdown().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fire_and_forget_writes_land_before_later_reads(store: Arc<InMemoryContractStore>) {
    let gateway = StorageGateway::spawn(store);
    let recipient = participant("poster");
    let now = TestClock::new().utc();

    for amount in [10, 20, 30] {
        gateway.insert_refund(NewRefundRecord {
            recipient: recipient.id(),
            amount: Coins::new(amount),
            reason: "test refund".to_owned(),
            created_at: now,
        });
    }
    let entries = gateway
        .refunds_for(recipient.id())
        .await
        .expect("refund lookup");

    assert_eq!(entries.len(), 3, "queued writes precede the read");
    gateway.shutdown().await;
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn shutdown_drains_queued_jobs(store: Arc<InMemoryContractStore>) {
    let gateway = StorageGateway::spawn(store.clone());
    let recipient = participant("poster");
    let now = TestClock::new().utc();

    for _ in 0..50 {
        gateway.insert_refund(NewRefundRecord {
            recipient: recipient.id(),
            amount: Coins::new(1),
            reason: "drain test".to_owned(),
            created_at: now,
        });
    }
    gateway.shutdown().await;

    let entries = store
        .refunds_for(recipient.id())
        .await
        .expect("direct store read");
    assert_eq!(entries.len(), 50, "shutdown must drain the queue first");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn requests_after_shutdown_report_the_gateway_closed(store: Arc<InMemoryContractStore>) {
    let gateway = StorageGateway::spawn(store);
    gateway.shutdown().await;

    let contractor = participant("poster");
    let result = gateway.insert_contract(record(&contractor)).await;

    assert!(matches!(result, Err(ContractStoreError::GatewayClosed)));
}
