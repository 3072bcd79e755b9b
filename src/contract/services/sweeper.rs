//! Periodic expiration sweep.

use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::contract::services::ContractBoard;

/// Background task that expires lapsed contracts on a fixed interval.
pub struct ExpirationSweeper {
    handle: JoinHandle<()>,
}

impl ExpirationSweeper {
    /// Spawns the sweep loop. The first sweep runs after one full
    /// interval; a tick that overruns is delayed, not burst.
    #[must_use]
    pub fn start<C>(board: Arc<ContractBoard<C>>, interval: Duration) -> Self
    where
        C: Clock + Send + Sync + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let expired = board.sweep_expired().await;
                if expired > 0 {
                    debug!(expired, "sweep pass expired contracts");
                }
            }
        });
        Self { handle }
    }

    /// Stops the sweep loop. In-flight sweeps finish under the board's
    /// coordinator lock before the task is torn down.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for ExpirationSweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
