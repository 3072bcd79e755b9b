//! In-memory escrow ledger.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::contract::domain::{Coins, ParticipantId};
use crate::contract::ports::{EscrowLedger, LedgerError, LedgerResult};

/// In-memory [`EscrowLedger`] for tests and embedded deployments.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    balances: Arc<RwLock<HashMap<ParticipantId, Coins>>>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a participant's balance, for test setup.
    pub fn set_balance(&self, participant: ParticipantId, amount: Coins) {
        if let Ok(mut balances) = self.balances.write() {
            balances.insert(participant, amount);
        }
    }

    fn locked(
        &self,
    ) -> LedgerResult<std::sync::RwLockWriteGuard<'_, HashMap<ParticipantId, Coins>>> {
        self.balances
            .write()
            .map_err(|err| LedgerError::Unavailable(err.to_string()))
    }
}

#[async_trait]
impl EscrowLedger for InMemoryLedger {
    async fn balance(&self, participant: ParticipantId) -> LedgerResult<Coins> {
        let balances = self
            .balances
            .read()
            .map_err(|err| LedgerError::Unavailable(err.to_string()))?;
        Ok(balances.get(&participant).copied().unwrap_or(Coins::ZERO))
    }

    async fn withdraw(&self, participant: ParticipantId, amount: Coins) -> LedgerResult<()> {
        let mut balances = self.locked()?;
        let available = balances.get(&participant).copied().unwrap_or(Coins::ZERO);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                needed: amount,
                available,
            });
        }
        balances.insert(participant, available - amount);
        Ok(())
    }

    async fn deposit(&self, participant: ParticipantId, amount: Coins) -> LedgerResult<()> {
        let mut balances = self.locked()?;
        let current = balances.get(&participant).copied().unwrap_or(Coins::ZERO);
        balances.insert(participant, current + amount);
        Ok(())
    }
}
