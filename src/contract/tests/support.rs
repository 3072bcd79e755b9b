//! Shared fixtures for the contract service tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, Local, Utc};
use mockable::Clock;

use crate::config::BoardConfig;
use crate::contract::adapters::memory::{InMemoryContractStore, InMemoryLedger};
use crate::contract::domain::{Coins, Contract, ContractMetadata, Participant, ParticipantId};
use crate::contract::ports::BoardNotifier;
use crate::contract::services::{ContractBoard, StatsLedger, StorageGateway};

/// Deterministic clock the tests can advance by hand.
pub struct TestClock {
    now: RwLock<DateTime<Utc>>,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            now: RwLock::new(Utc::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.write().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for TestClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Notifier that counts every announcement, for asserting that lifecycle
/// events fire exactly once per transition.
#[derive(Default)]
pub struct RecordingNotifier {
    pub created: AtomicUsize,
    pub accepted: AtomicUsize,
    pub cancelled: AtomicUsize,
    pub completed: AtomicUsize,
    pub paused: AtomicUsize,
    pub resumed: AtomicUsize,
    pub expired: AtomicUsize,
    pub refreshed: AtomicUsize,
    pub collected: AtomicUsize,
}

impl RecordingNotifier {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl BoardNotifier for RecordingNotifier {
    fn contract_created(&self, _contract: &Contract) {
        self.created.fetch_add(1, Ordering::SeqCst);
    }

    fn contract_accepted(&self, _contract: &Contract) {
        self.accepted.fetch_add(1, Ordering::SeqCst);
    }

    fn contract_cancelled(&self, _contract: &Contract) {
        self.cancelled.fetch_add(1, Ordering::SeqCst);
    }

    fn contract_completed(&self, _contract: &Contract) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn contract_paused(&self, _contract: &Contract) {
        self.paused.fetch_add(1, Ordering::SeqCst);
    }

    fn contract_resumed(&self, _contract: &Contract) {
        self.resumed.fetch_add(1, Ordering::SeqCst);
    }

    fn contract_expired(&self, _contract: &Contract) {
        self.expired.fetch_add(1, Ordering::SeqCst);
    }

    fn tracking_refreshed(&self, _worker: ParticipantId, _contract: &Contract, _reachable: bool) {
        self.refreshed.fetch_add(1, Ordering::SeqCst);
    }

    fn refunds_collected(&self, _recipient: ParticipantId, _total: Coins, _entries: usize) {
        self.collected.fetch_add(1, Ordering::SeqCst);
    }
}

/// Target directory the tests steer by marking participants reachable.
#[derive(Default)]
pub struct ScriptedDirectory {
    reachable: RwLock<HashSet<ParticipantId>>,
}

impl ScriptedDirectory {
    pub fn set_reachable(&self, participant: ParticipantId, reachable: bool) {
        let mut set = self
            .reachable
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if reachable {
            set.insert(participant);
        } else {
            set.remove(&participant);
        }
    }
}

#[async_trait::async_trait]
impl crate::contract::ports::TargetDirectory for ScriptedDirectory {
    async fn is_reachable(&self, participant: ParticipantId) -> bool {
        self.reachable
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&participant)
    }
}

/// A fully wired board over in-memory adapters.
pub struct Harness {
    pub board: Arc<ContractBoard<TestClock>>,
    pub gateway: Arc<StorageGateway>,
    pub store: Arc<InMemoryContractStore>,
    pub ledger: Arc<InMemoryLedger>,
    pub notifier: Arc<RecordingNotifier>,
    pub stats: Arc<StatsLedger>,
    pub clock: Arc<TestClock>,
}

impl Harness {
    pub fn with_config(config: BoardConfig) -> Self {
        let store = Arc::new(InMemoryContractStore::new());
        let gateway = Arc::new(StorageGateway::spawn(store.clone()));
        let ledger = Arc::new(InMemoryLedger::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let stats = Arc::new(StatsLedger::new(gateway.clone()));
        let clock = Arc::new(TestClock::new());
        let board = Arc::new(ContractBoard::new(
            config,
            gateway.clone(),
            ledger.clone(),
            notifier.clone(),
            stats.clone(),
            clock.clone(),
        ));
        Self {
            board,
            gateway,
            store,
            ledger,
            notifier,
            stats,
            clock,
        }
    }

    pub fn new() -> Self {
        Self::with_config(BoardConfig::default())
    }

    /// Gives the participant a balance and returns them.
    pub fn funded_participant(&self, name: &str, balance: Coins) -> Participant {
        let participant = participant(name);
        self.ledger.set_balance(participant.id(), balance);
        participant
    }
}

pub fn participant(name: &str) -> Participant {
    Participant::new(ParticipantId::new(), name)
}

pub fn bounty_metadata(target: &Participant) -> ContractMetadata {
    ContractMetadata::BountyHunt {
        target: target.clone(),
        anonymous: false,
    }
}

pub fn gathering_metadata() -> ContractMetadata {
    ContractMetadata::ItemGathering {
        material: "iron_ingot".to_owned(),
        amount: 32,
        submitted: false,
    }
}
