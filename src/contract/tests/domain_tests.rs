//! Unit tests for the contract domain types.

use chrono::Duration;
use eyre::ensure;
use mockable::Clock;
use rstest::{fixture, rstest};

use crate::contract::domain::{
    Coins, Contract, ContractDomainError, ContractId, ContractKind, ContractStatus,
    NewContractRecord, Participant, ParticipantId,
};
use crate::contract::tests::support::{TestClock, bounty_metadata, gathering_metadata, participant};

#[fixture]
fn clock() -> TestClock {
    TestClock::new()
}

fn new_record(clock: &TestClock, contractor: &Participant) -> NewContractRecord {
    let now = clock.utc();
    NewContractRecord {
        kind: ContractKind::ItemGathering,
        contractor: contractor.clone(),
        reward: Coins::new(100),
        tax_paid: Coins::new(5),
        created_at: now,
        expires_at: now + Duration::hours(48),
        metadata: gathering_metadata(),
    }
}

#[rstest]
fn new_contract_opens_without_worker(clock: TestClock) {
    let contractor = participant("poster");
    let contract = Contract::from_new(ContractId::new(1), new_record(&clock, &contractor));

    assert_eq!(contract.status(), ContractStatus::Open);
    assert!(contract.worker().is_none());
    assert!(contract.is_active());
    assert_eq!(contract.reward(), Coins::new(100));
    assert_eq!(contract.tax_paid(), Coins::new(5));
}

#[rstest]
fn accept_assigns_worker_and_status_together(clock: TestClock) {
    let contractor = participant("poster");
    let worker = participant("taker");
    let mut contract = Contract::from_new(ContractId::new(1), new_record(&clock, &contractor));

    contract.accept(worker.clone()).expect("open contract accepts");

    assert_eq!(contract.status(), ContractStatus::Accepted);
    assert_eq!(contract.worker().map(Participant::id), Some(worker.id()));
}

#[rstest]
fn contractor_cannot_accept_own_contract(clock: TestClock) {
    let contractor = participant("poster");
    let mut contract = Contract::from_new(ContractId::new(1), new_record(&clock, &contractor));

    let result = contract.accept(contractor.clone());

    assert!(matches!(result, Err(ContractDomainError::SelfDealing(_))));
    assert_eq!(contract.status(), ContractStatus::Open);
    assert!(contract.worker().is_none());
}

#[rstest]
fn open_contract_cannot_complete(clock: TestClock) {
    let contractor = participant("poster");
    let mut contract = Contract::from_new(ContractId::new(1), new_record(&clock, &contractor));

    let result = contract.transition_to(ContractStatus::Completed);

    assert!(matches!(
        result,
        Err(ContractDomainError::InvalidTransition { .. })
    ));
}

#[rstest]
fn expiry_is_strictly_after_deadline(clock: TestClock) {
    let contractor = participant("poster");
    let contract = Contract::from_new(ContractId::new(1), new_record(&clock, &contractor));

    assert!(!contract.is_expired(contract.expires_at()));
    assert!(contract.is_expired(contract.expires_at() + Duration::milliseconds(1)));
}

#[rstest]
fn metadata_rewrite_must_keep_the_kind(clock: TestClock) {
    let contractor = participant("poster");
    let target = participant("target");
    let mut contract = Contract::from_new(ContractId::new(1), new_record(&clock, &contractor));

    let result = contract.set_metadata(bounty_metadata(&target));

    assert!(matches!(
        result,
        Err(ContractDomainError::MetadataKindMismatch { .. })
    ));
}

#[rstest]
fn accepted_contract_walks_pause_resume_complete(clock: TestClock) -> eyre::Result<()> {
    let contractor = participant("poster");
    let worker = participant("taker");
    let mut contract = Contract::from_new(ContractId::new(1), new_record(&clock, &contractor));

    contract.accept(worker)?;
    contract.transition_to(ContractStatus::Paused)?;
    ensure!(contract.is_active(), "paused contracts stay active");
    contract.transition_to(ContractStatus::Accepted)?;
    contract.transition_to(ContractStatus::Completed)?;
    ensure!(contract.status().is_terminal(), "completion is terminal");
    ensure!(
        contract.worker().is_some(),
        "completion keeps the worker on record"
    );
    Ok(())
}

#[rstest]
#[case(100, 500, 5)]
#[case(100, 0, 0)]
#[case(1, 500, 0)]
#[case(1_000_000, 300, 30_000)]
#[case(333, 400, 13)]
fn tax_rounds_down_in_basis_points(#[case] reward: i64, #[case] bps: u32, #[case] tax: i64) {
    assert_eq!(Coins::new(reward).tax_at(bps), Coins::new(tax));
}

#[rstest]
fn participant_ids_are_unique() {
    assert_ne!(ParticipantId::new(), ParticipantId::new());
}
