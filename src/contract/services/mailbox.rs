//! Deferred-payment mailbox.
//!
//! Refunds from cancellation and expiry, and payouts that could not be
//! credited synchronously, accumulate here until the recipient collects
//! them. Collection deposits the total before deleting the entries, so
//! a crash between the two steps can only over-refund, never lose
//! money.

use std::sync::Arc;

use tracing::info;

use crate::contract::domain::{Coins, Participant, RefundEntry};
use crate::contract::ports::{BoardNotifier, EscrowLedger, LedgerError};
use crate::contract::services::{ContractBoardError, StorageGateway};

/// Holds queued refunds and payouts until their owner collects them.
pub struct Mailbox {
    gateway: Arc<StorageGateway>,
    ledger: Arc<dyn EscrowLedger>,
    notifier: Arc<dyn BoardNotifier>,
    /// Serialises collections so overlapping calls cannot both read the
    /// same entries before either deletion lands.
    coordinator: tokio::sync::Mutex<()>,
}

impl Mailbox {
    /// Creates a mailbox over the given gateway and ledger.
    #[must_use]
    pub fn new(
        gateway: Arc<StorageGateway>,
        ledger: Arc<dyn EscrowLedger>,
        notifier: Arc<dyn BoardNotifier>,
    ) -> Self {
        Self {
            gateway,
            ledger,
            notifier,
            coordinator: tokio::sync::Mutex::new(()),
        }
    }

    /// Returns the recipient's queued entries without collecting them.
    ///
    /// # Errors
    ///
    /// Returns [`ContractBoardError::PersistenceFailure`] when the read
    /// fails.
    pub async fn pending(&self, recipient: &Participant) -> Result<Vec<RefundEntry>, ContractBoardError> {
        Ok(self.gateway.refunds_for(recipient.id()).await?)
    }

    /// Deposits every queued entry for the recipient and clears the
    /// mailbox. Returns the total credited; an empty mailbox is a
    /// zero-total no-op. Overlapping calls run one at a time, so the
    /// later one finds the mailbox already emptied.
    ///
    /// # Errors
    ///
    /// Returns [`ContractBoardError::PersistenceFailure`] when the read
    /// fails, or a ledger error when the deposit is refused; entries are
    /// then left queued for a later attempt.
    pub async fn collect_all(&self, recipient: &Participant) -> Result<Coins, ContractBoardError> {
        let _guard = self.coordinator.lock().await;
        let entries = self.gateway.refunds_for(recipient.id()).await?;
        if entries.is_empty() {
            return Ok(Coins::ZERO);
        }

        let total = entries
            .iter()
            .try_fold(Coins::ZERO, |sum, entry| sum.checked_add(entry.amount()))
            .ok_or_else(|| {
                ContractBoardError::from(LedgerError::Unavailable(
                    "mailbox total overflows the ledger".to_owned(),
                ))
            })?;

        self.ledger.deposit(recipient.id(), total).await?;
        self.gateway.delete_refunds_for(recipient.id());
        self.notifier
            .refunds_collected(recipient.id(), total, entries.len());
        info!(recipient = %recipient.id(), total = %total, entries = entries.len(), "mailbox collected");
        Ok(total)
    }
}
