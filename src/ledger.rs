//! Interfaces to the platform's player registry and balance ledger.
//!
//! Tables read a participant's display name and balance through [`Roster`]
//! and report one net balance change per participant per hand through
//! [`BalanceLedger`]. [`InMemoryLedger`] implements both for hosting a table
//! without a platform behind it.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
#[cfg(all(not(feature = "std"), feature = "alloc"))]
use hashbrown::{HashMap, HashSet};
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::settlement::Outcome;
use crate::sync::Mutex;

/// Platform-wide participant identifier.
pub type ParticipantId = u32;

/// Identifier of a table.
pub type TableId = u32;

/// Per-table hand counter; together with the table and participant it keys
/// ledger adjustments.
pub type HandId = u64;

/// What the roster knows about a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    /// Name shown at the table.
    pub display_name: String,
    /// Balance available for wagering.
    pub balance: u64,
}

/// Read access to the platform's participant registry.
pub trait Roster: Send + Sync {
    /// Looks up a participant.
    fn get_participant(&self, id: ParticipantId) -> Option<ParticipantInfo>;
}

/// Why a balance adjustment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    /// A settled blackjack hand.
    BlackjackSettlement,
    /// A hand aborted before settlement; the wager went back to the player.
    Refund,
}

/// Context attached to a balance adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentMetadata {
    /// Table the hand was played at.
    pub table_id: TableId,
    /// Hand the adjustment settles.
    pub hand_id: HandId,
    /// Amount wagered (or refunded).
    pub bet: u64,
    /// Amount paid back, stake included.
    pub payout: u64,
    /// Settled outcome, absent for refunds.
    pub outcome: Option<Outcome>,
}

/// A single net balance change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceAdjustment {
    /// Whose balance changes.
    pub participant_id: ParticipantId,
    /// Signed change; `payout - bet` for a settled hand.
    pub net_amount: i64,
    /// Why the change happened.
    pub reason: AdjustmentReason,
    /// Hand context.
    pub metadata: AdjustmentMetadata,
}

impl BalanceAdjustment {
    /// The key under which repeated reports of this adjustment collapse.
    #[must_use]
    pub const fn idempotency_key(&self) -> (ParticipantId, TableId, HandId) {
        (
            self.participant_id,
            self.metadata.table_id,
            self.metadata.hand_id,
        )
    }
}

/// Write access to the platform's balance ledger.
pub trait BalanceLedger: Send + Sync {
    /// Applies `adjustment`.
    ///
    /// Implementations must treat a repeated [`BalanceAdjustment::idempotency_key`]
    /// as already applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the participant is unknown or the ledger cannot be reached.
    fn adjust_balance(&self, adjustment: BalanceAdjustment) -> Result<(), LedgerError>;
}

#[derive(Debug, Clone)]
struct Account {
    display_name: String,
    balance: i64,
}

#[derive(Debug, Default)]
struct LedgerBook {
    accounts: HashMap<ParticipantId, Account>,
    applied: HashSet<(ParticipantId, TableId, HandId)>,
    history: Vec<BalanceAdjustment>,
}

/// In-process roster and ledger.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    book: Mutex<LedgerBook>,
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens (or replaces) an account. Balances above `i64::MAX` are capped.
    pub fn open_account(&self, id: ParticipantId, display_name: impl Into<String>, balance: u64) {
        let account = Account {
            display_name: display_name.into(),
            balance: i64::try_from(balance).unwrap_or(i64::MAX),
        };
        self.book.lock().accounts.insert(id, account);
    }

    /// Returns a participant's ledger balance.
    pub fn balance(&self, id: ParticipantId) -> Option<i64> {
        self.book.lock().accounts.get(&id).map(|a| a.balance)
    }

    /// Returns every applied adjustment in order.
    pub fn history(&self) -> Vec<BalanceAdjustment> {
        self.book.lock().history.clone()
    }
}

impl Roster for InMemoryLedger {
    fn get_participant(&self, id: ParticipantId) -> Option<ParticipantInfo> {
        self.book.lock().accounts.get(&id).map(|a| ParticipantInfo {
            display_name: a.display_name.clone(),
            balance: u64::try_from(a.balance).unwrap_or(0),
        })
    }
}

impl BalanceLedger for InMemoryLedger {
    fn adjust_balance(&self, adjustment: BalanceAdjustment) -> Result<(), LedgerError> {
        let mut book = self.book.lock();
        let key = adjustment.idempotency_key();

        if book.applied.contains(&key) {
            log::debug!("adjustment {key:?} already applied");
            return Ok(());
        }

        let account = book
            .accounts
            .get_mut(&adjustment.participant_id)
            .ok_or(LedgerError::ParticipantNotFound)?;
        account.balance = account.balance.saturating_add(adjustment.net_amount);

        book.applied.insert(key);
        book.history.push(adjustment);
        drop(book);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjustment(net_amount: i64, hand_id: HandId) -> BalanceAdjustment {
        BalanceAdjustment {
            participant_id: 7,
            net_amount,
            reason: AdjustmentReason::BlackjackSettlement,
            metadata: AdjustmentMetadata {
                table_id: 1,
                hand_id,
                bet: 10,
                payout: 0,
                outcome: Some(Outcome::Lose),
            },
        }
    }

    #[test]
    fn repeated_key_is_applied_once() {
        let ledger = InMemoryLedger::new();
        ledger.open_account(7, "Ada", 100);

        ledger.adjust_balance(adjustment(-10, 1)).unwrap();
        ledger.adjust_balance(adjustment(-10, 1)).unwrap();
        ledger.adjust_balance(adjustment(15, 2)).unwrap();

        assert_eq!(ledger.balance(7), Some(105));
        assert_eq!(ledger.history().len(), 2);
    }

    #[test]
    fn unknown_participant_is_rejected() {
        let ledger = InMemoryLedger::new();
        assert_eq!(
            ledger.adjust_balance(adjustment(5, 1)),
            Err(LedgerError::ParticipantNotFound)
        );
        assert!(ledger.get_participant(7).is_none());
    }

    #[test]
    fn roster_reports_display_name_and_balance() {
        let ledger = InMemoryLedger::new();
        ledger.open_account(3, "Lin", 40);
        assert_eq!(
            ledger.get_participant(3),
            Some(ParticipantInfo {
                display_name: "Lin".into(),
                balance: 40,
            })
        );
    }
}
