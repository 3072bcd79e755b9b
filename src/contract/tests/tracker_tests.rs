//! Tests for bounty target liveness tracking.

use std::sync::Arc;
use std::time::Duration;

use rstest::{fixture, rstest};

use crate::contract::domain::{Coins, Contract, ContractKind, ContractStatus, Participant};
use crate::contract::ports::EscrowLedger;
use crate::contract::services::{ContractBoardError, LivenessTracker};
use crate::contract::tests::support::{
    Harness, RecordingNotifier, ScriptedDirectory, TestClock, bounty_metadata,
    gathering_metadata, participant,
};

struct TrackerHarness {
    inner: Harness,
    directory: Arc<ScriptedDirectory>,
    tracker: Arc<LivenessTracker<TestClock>>,
}

#[fixture]
fn harness() -> TrackerHarness {
    let inner = Harness::new();
    let directory = Arc::new(ScriptedDirectory::default());
    // An hour-long interval keeps the background loop quiet so the
    // tests drive each probe by hand.
    let tracker = Arc::new(LivenessTracker::new(
        inner.board.clone(),
        directory.clone(),
        inner.notifier.clone(),
        Duration::from_secs(3_600),
    ));
    TrackerHarness {
        inner,
        directory,
        tracker,
    }
}

async fn tracked_bounty(
    harness: &TrackerHarness,
    target: &Participant,
    worker: &Participant,
) -> Contract {
    let contractor = harness.inner.funded_participant("poster", Coins::new(1_000));
    let contract = harness
        .inner
        .board
        .create(
            contractor,
            ContractKind::BountyHunt,
            Coins::new(100),
            bounty_metadata(target),
        )
        .await
        .expect("creation should succeed");
    harness
        .inner
        .board
        .accept(worker.clone(), contract.id())
        .await
        .expect("accept should succeed");
    harness
        .tracker
        .start_session(worker.id(), contract.id())
        .expect("tracking should start");
    contract
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn untracked_kinds_cannot_start_a_session(harness: TrackerHarness) {
    let contractor = harness.inner.funded_participant("poster", Coins::new(1_000));
    let contract = harness
        .inner
        .board
        .create(
            contractor,
            ContractKind::ItemGathering,
            Coins::new(100),
            gathering_metadata(),
        )
        .await
        .expect("creation should succeed");

    let result = harness
        .tracker
        .start_session(participant("worker").id(), contract.id());

    assert!(matches!(result, Err(ContractBoardError::NotTrackable(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unreachable_target_pauses_the_contract_once(harness: TrackerHarness) {
    let target = participant("target");
    let worker = participant("hunter");
    let contract = tracked_bounty(&harness, &target, &worker).await;

    assert!(harness.tracker.probe_once(worker.id()).await);
    assert!(harness.tracker.probe_once(worker.id()).await);

    let paused = harness
        .inner
        .board
        .contract(contract.id())
        .expect("contract stays live");
    assert_eq!(paused.status(), ContractStatus::Paused);
    assert_eq!(
        RecordingNotifier::count(&harness.inner.notifier.paused),
        1,
        "pause announces once per transition"
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn returning_target_resumes_the_contract(harness: TrackerHarness) {
    let target = participant("target");
    let worker = participant("hunter");
    let contract = tracked_bounty(&harness, &target, &worker).await;
    assert!(harness.tracker.probe_once(worker.id()).await);

    harness.directory.set_reachable(target.id(), true);
    assert!(harness.tracker.probe_once(worker.id()).await);

    let resumed = harness
        .inner
        .board
        .contract(contract.id())
        .expect("contract stays live");
    assert_eq!(resumed.status(), ContractStatus::Accepted);
    assert_eq!(RecordingNotifier::count(&harness.inner.notifier.resumed), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn probe_ends_when_the_contract_leaves_the_board(harness: TrackerHarness) {
    let target = participant("target");
    let worker = participant("hunter");
    let contract = tracked_bounty(&harness, &target, &worker).await;

    let contractor_id = contract.contractor().id();
    harness
        .inner
        .board
        .cancel(contractor_id, contract.id())
        .await
        .expect("cancel should succeed");

    assert!(!harness.tracker.probe_once(worker.id()).await);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn elimination_of_the_target_completes_the_contract(harness: TrackerHarness) {
    let target = participant("target");
    let worker = harness.inner.funded_participant("hunter", Coins::ZERO);
    let contract = tracked_bounty(&harness, &target, &worker).await;
    harness.directory.set_reachable(target.id(), true);

    let completed = harness
        .tracker
        .report_elimination(&worker, target.id())
        .await
        .expect("elimination should complete the contract");

    assert_eq!(completed.map(|c| c.id()), Some(contract.id()));
    let balance = harness
        .inner
        .ledger
        .balance(worker.id())
        .await
        .expect("balance lookup");
    assert_eq!(balance, Coins::new(100));
    assert!(!harness.tracker.probe_once(worker.id()).await, "session ended");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn elimination_of_a_bystander_is_ignored(harness: TrackerHarness) {
    let target = participant("target");
    let worker = participant("hunter");
    let contract = tracked_bounty(&harness, &target, &worker).await;

    let outcome = harness
        .tracker
        .report_elimination(&worker, participant("bystander").id())
        .await
        .expect("unrelated reports are not errors");

    assert!(outcome.is_none());
    let live = harness
        .inner
        .board
        .contract(contract.id())
        .expect("contract stays live");
    assert_eq!(live.status(), ContractStatus::Accepted);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn elimination_after_cancellation_is_ignored(harness: TrackerHarness) {
    let target = participant("target");
    let worker = participant("hunter");
    let contract = tracked_bounty(&harness, &target, &worker).await;

    let contractor_id = contract.contractor().id();
    harness
        .inner
        .board
        .cancel(contractor_id, contract.id())
        .await
        .expect("cancel should succeed");

    let outcome = harness
        .tracker
        .report_elimination(&worker, target.id())
        .await
        .expect("a report on a dead contract is not an error");

    assert!(outcome.is_none());
    assert!(
        !harness.tracker.probe_once(worker.id()).await,
        "the stale session is dropped with the report"
    );
    assert_eq!(
        RecordingNotifier::count(&harness.inner.notifier.completed),
        0
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sessions_only_start_once_a_worker_accepts(harness: TrackerHarness) {
    let contractor = harness.inner.funded_participant("poster", Coins::new(1_000));
    let target = participant("target");
    let contract = harness
        .inner
        .board
        .create(
            contractor,
            ContractKind::BountyHunt,
            Coins::new(100),
            bounty_metadata(&target),
        )
        .await
        .expect("creation should succeed");

    let result = harness
        .tracker
        .start_session(participant("hunter").id(), contract.id());

    assert!(matches!(result, Err(ContractBoardError::NotTrackable(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stopping_a_session_ends_its_probes(harness: TrackerHarness) {
    let target = participant("target");
    let worker = participant("hunter");
    tracked_bounty(&harness, &target, &worker).await;

    harness.tracker.stop_session(worker.id());

    assert!(!harness.tracker.probe_once(worker.id()).await);
}
