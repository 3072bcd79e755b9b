//! End-to-end lifecycle flows over the in-memory adapters.
//!
//! These tests wire the board exactly as a host process would and walk
//! contracts through their full lifecycles, checking that escrow,
//! payouts, and the refund mailbox balance out.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use std::sync::Arc;

use contract_board::config::BoardConfig;
use contract_board::contract::adapters::memory::{
    InMemoryContractStore, InMemoryLedger, NoopNotifier,
};
use contract_board::contract::domain::{
    Coins, ContractKind, ContractMetadata, ContractStatus, Participant, ParticipantId,
};
use contract_board::contract::ports::EscrowLedger;
use contract_board::contract::services::{ContractBoard, Mailbox, StatsLedger, StorageGateway};
use mockable::DefaultClock;

struct App {
    board: Arc<ContractBoard<DefaultClock>>,
    gateway: Arc<StorageGateway>,
    ledger: Arc<InMemoryLedger>,
    mailbox: Mailbox,
    stats: Arc<StatsLedger>,
}

fn app() -> App {
    let store = Arc::new(InMemoryContractStore::new());
    let gateway = Arc::new(StorageGateway::spawn(store));
    let ledger = Arc::new(InMemoryLedger::new());
    let notifier = Arc::new(NoopNotifier);
    let stats = Arc::new(StatsLedger::new(gateway.clone()));
    let board = Arc::new(ContractBoard::new(
        BoardConfig::default(),
        gateway.clone(),
        ledger.clone(),
        notifier.clone(),
        stats.clone(),
        Arc::new(DefaultClock),
    ));
    let mailbox = Mailbox::new(gateway.clone(), ledger.clone(), notifier);
    App {
        board,
        gateway,
        ledger,
        mailbox,
        stats,
    }
}

fn funded(app: &App, name: &str, balance: i64) -> Participant {
    let participant = Participant::new(ParticipantId::new(), name);
    app.ledger.set_balance(participant.id(), Coins::new(balance));
    participant
}

fn bounty_on(target: &Participant) -> ContractMetadata {
    ContractMetadata::BountyHunt {
        target: target.clone(),
        anonymous: false,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn bounty_runs_from_posting_to_payout() {
    let app = app();
    let contractor = funded(&app, "poster", 1_000);
    let worker = funded(&app, "hunter", 0);
    let target = Participant::new(ParticipantId::new(), "target");

    let contract = app
        .board
        .create(
            contractor.clone(),
            ContractKind::BountyHunt,
            Coins::new(100),
            bounty_on(&target),
        )
        .await
        .expect("posting should succeed");
    assert_eq!(
        app.ledger.balance(contractor.id()).await.expect("balance"),
        Coins::new(895),
        "reward plus five percent tax leaves escrow"
    );

    app.board
        .accept(worker.clone(), contract.id())
        .await
        .expect("accept should succeed");
    app.board
        .complete(contract.id(), &worker)
        .await
        .expect("completion should succeed");

    assert_eq!(
        app.ledger.balance(worker.id()).await.expect("balance"),
        Coins::new(100)
    );
    let stats = app
        .stats
        .stats_for(worker.id())
        .await
        .expect("stats lookup")
        .expect("worker has stats");
    assert_eq!(stats.total_earned(), Coins::new(100));
    app.gateway.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_contract_refunds_through_the_mailbox() {
    let app = app();
    let contractor = funded(&app, "poster", 1_000);
    let target = Participant::new(ParticipantId::new(), "target");

    let contract = app
        .board
        .create(
            contractor.clone(),
            ContractKind::BountyHunt,
            Coins::new(200),
            bounty_on(&target),
        )
        .await
        .expect("posting should succeed");
    app.board
        .cancel(contractor.id(), contract.id())
        .await
        .expect("cancel should succeed");

    let collected = app
        .mailbox
        .collect_all(&contractor)
        .await
        .expect("collection should succeed");

    assert_eq!(collected, Coins::new(200), "tax stays sunk");
    assert_eq!(
        app.ledger.balance(contractor.id()).await.expect("balance"),
        Coins::new(990),
        "ten coins of tax never come back"
    );
    app.gateway.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn item_contract_metadata_tracks_submission() {
    let app = app();
    let contractor = funded(&app, "poster", 1_000);
    let worker = funded(&app, "gatherer", 0);

    let contract = app
        .board
        .create(
            contractor,
            ContractKind::ItemGathering,
            Coins::new(100),
            ContractMetadata::ItemGathering {
                material: "oak_log".to_owned(),
                amount: 64,
                submitted: false,
            },
        )
        .await
        .expect("posting should succeed");
    app.board
        .accept(worker.clone(), contract.id())
        .await
        .expect("accept should succeed");

    app.board
        .update_metadata(
            contract.id(),
            ContractMetadata::ItemGathering {
                material: "oak_log".to_owned(),
                amount: 64,
                submitted: true,
            },
        )
        .await
        .expect("metadata update should succeed");
    let completed = app
        .board
        .complete(contract.id(), &worker)
        .await
        .expect("completion should succeed");

    assert_eq!(completed.status(), ContractStatus::Completed);
    match completed.metadata() {
        ContractMetadata::ItemGathering { submitted, .. } => assert!(submitted),
        other => panic!("unexpected metadata kind: {:?}", other.kind()),
    }
    app.gateway.shutdown().await;
}
