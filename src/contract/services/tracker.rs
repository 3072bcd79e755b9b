//! Target liveness tracking for bounty-hunt contracts.
//!
//! Each accepted bounty-hunt contract gets a probe task that polls the
//! target directory. An unreachable target pauses the contract; a
//! reachable one resumes it. Pause and resume fire on the transition
//! only, never repeatedly while the target stays in one state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use mockable::Clock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::contract::domain::{Contract, ContractId, ContractStatus, Participant, ParticipantId};
use crate::contract::ports::{BoardNotifier, TargetDirectory};
use crate::contract::services::{ContractBoard, ContractBoardError};

struct TrackingSession {
    contract_id: ContractId,
    target: ParticipantId,
    probe: Option<JoinHandle<()>>,
}

/// Watches bounty targets and pauses or resumes their contracts as
/// they drop out of reach and come back.
pub struct LivenessTracker<C>
where
    C: Clock + Send + Sync + 'static,
{
    board: Arc<ContractBoard<C>>,
    directory: Arc<dyn TargetDirectory>,
    notifier: Arc<dyn BoardNotifier>,
    probe_interval: Duration,
    sessions: Mutex<HashMap<ParticipantId, TrackingSession>>,
}

impl<C> LivenessTracker<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Creates a tracker with no active sessions.
    #[must_use]
    pub fn new(
        board: Arc<ContractBoard<C>>,
        directory: Arc<dyn TargetDirectory>,
        notifier: Arc<dyn BoardNotifier>,
        probe_interval: Duration,
    ) -> Self {
        Self {
            board,
            directory,
            notifier,
            probe_interval,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> std::sync::MutexGuard<'_, HashMap<ParticipantId, TrackingSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts tracking the given contract's target on behalf of its
    /// worker, replacing any session the worker already had. The probe
    /// loop keeps only a weak handle on the tracker, so dropping the
    /// tracker ends every loop.
    ///
    /// # Errors
    ///
    /// Returns [`ContractBoardError::NotFound`] when the contract is
    /// not live, or [`ContractBoardError::NotTrackable`] when its kind
    /// carries no target to track or no worker has accepted it yet.
    pub fn start_session(
        self: &Arc<Self>,
        worker: ParticipantId,
        contract_id: ContractId,
    ) -> Result<(), ContractBoardError> {
        let contract = self
            .board
            .contract(contract_id)
            .ok_or(ContractBoardError::NotFound(contract_id))?;
        if !contract.kind().is_liveness_tracked() {
            return Err(ContractBoardError::NotTrackable(contract_id));
        }
        if !Self::tracks(&contract) {
            return Err(ContractBoardError::NotTrackable(contract_id));
        }
        let target = contract
            .metadata()
            .bounty_target_id()
            .ok_or(ContractBoardError::NotTrackable(contract_id))?;

        self.stop_session(worker);

        let probe = Self::spawn_probe(Arc::downgrade(self), worker, self.probe_interval);
        self.sessions().insert(
            worker,
            TrackingSession {
                contract_id,
                target,
                probe: Some(probe),
            },
        );
        debug!(%worker, contract = %contract_id, %target, "tracking session started");
        Ok(())
    }

    /// Returns `true` while the contract is in a phase the tracker
    /// acts on: accepted or paused, never open or terminal.
    fn tracks(contract: &Contract) -> bool {
        matches!(
            contract.status(),
            ContractStatus::Accepted | ContractStatus::Paused
        )
    }

    fn spawn_probe(
        tracker: Weak<Self>,
        worker: ParticipantId,
        interval: Duration,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(tracker) = tracker.upgrade() else {
                    break;
                };
                if !tracker.probe_once(worker).await {
                    break;
                }
            }
        })
    }

    /// Runs one probe pass for the worker's session. Returns `false`
    /// once the session is gone or its contract has left the board,
    /// which ends the probe loop.
    pub async fn probe_once(&self, worker: ParticipantId) -> bool {
        let Some((contract_id, target)) = self
            .sessions()
            .get(&worker)
            .map(|session| (session.contract_id, session.target))
        else {
            return false;
        };

        let Some(contract) = self.board.contract(contract_id) else {
            self.stop_session(worker);
            return false;
        };
        if !contract.status().is_active() {
            self.stop_session(worker);
            return false;
        }

        let reachable = self.directory.is_reachable(target).await;
        let result = if reachable {
            if contract.status() == ContractStatus::Paused {
                self.board.resume(contract_id).await.map(|_| ())
            } else {
                self.notifier.tracking_refreshed(worker, &contract, reachable);
                Ok(())
            }
        } else if contract.status() == ContractStatus::Accepted {
            self.board.pause(contract_id).await.map(|_| ())
        } else {
            self.notifier.tracking_refreshed(worker, &contract, reachable);
            Ok(())
        };
        if let Err(err) = result {
            warn!(%worker, contract = %contract_id, error = %err, "liveness probe transition failed");
        }
        true
    }

    /// Reports that `actor` eliminated `subject`. Completes and returns
    /// the actor's tracked contract when `subject` is its target and the
    /// contract is still accepted or paused; any other report is
    /// unrelated or stale and `None` comes back. A stale session (its
    /// contract already cancelled, completed, or expired) is dropped on
    /// the spot rather than left for the next probe tick.
    ///
    /// # Errors
    ///
    /// Propagates the board error when the completion itself fails; the
    /// session stays live in that case.
    pub async fn report_elimination(
        &self,
        actor: &Participant,
        subject: ParticipantId,
    ) -> Result<Option<Contract>, ContractBoardError> {
        let matched = self
            .sessions()
            .get(&actor.id())
            .filter(|session| session.target == subject)
            .map(|session| session.contract_id);
        let Some(contract_id) = matched else {
            return Ok(None);
        };

        let live = self
            .board
            .contract(contract_id)
            .is_some_and(|contract| Self::tracks(&contract));
        if !live {
            self.stop_session(actor.id());
            return Ok(None);
        }

        let contract = self.board.complete(contract_id, actor).await?;
        self.stop_session(actor.id());
        Ok(Some(contract))
    }

    /// Ends the worker's tracking session, aborting its probe loop.
    pub fn stop_session(&self, worker: ParticipantId) {
        if let Some(session) = self.sessions().remove(&worker) {
            if let Some(probe) = session.probe {
                probe.abort();
            }
            debug!(%worker, contract = %session.contract_id, "tracking session stopped");
        }
    }

    /// Ends every tracking session.
    pub fn shutdown(&self) {
        let sessions = std::mem::take(&mut *self.sessions());
        for session in sessions.into_values() {
            if let Some(probe) = session.probe {
                probe.abort();
            }
        }
    }
}
