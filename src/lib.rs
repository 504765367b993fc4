//! A blackjack table engine with optional `no_std` support.
//!
//! The crate provides two table state machines that share one rule set:
//! [`SingleTable`] for one participant against the dealer, and
//! [`MultiTable`] for two to four participants who share a deck and a dealer
//! hand, act in a fixed turn order, and start once enough of them are ready.
//!
//! Balances live outside the engine. Tables read them through a [`Roster`]
//! and report each settled hand's net change to a [`BalanceLedger`];
//! [`InMemoryLedger`] implements both.
//!
//! With the `actor` feature, [`actor::spawn`] hosts a table on tokio so that
//! many clients can drive it concurrently.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use bjtable::{InMemoryLedger, SingleTable, TableEngine, TableOptions};
//!
//! let ledger = Arc::new(InMemoryLedger::new());
//! ledger.open_account(1, "Ada", 100);
//!
//! let mut table = SingleTable::new(1, 1, TableOptions::default(), 42, ledger.clone(), ledger);
//! table.place_bet(10).unwrap();
//! if table.stand().is_ok() {
//!     let results = table.play_dealer().unwrap();
//!     assert_eq!(results.len(), 1);
//! }
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(all(not(feature = "std"), not(feature = "alloc")))]
compile_error!(
    "`std` is disabled but `alloc` feature is not enabled. Enable `alloc` or keep `std` enabled."
);

extern crate alloc;

#[cfg(feature = "actor")]
#[cfg_attr(docsrs, doc(cfg(feature = "actor")))]
pub mod actor;
pub mod card;
pub mod dealer;
pub mod deck;
pub mod error;
pub mod events;
pub mod hand;
pub mod ledger;
pub mod options;
pub mod readiness;
pub mod settlement;
mod sync;
pub mod table;

pub use card::{Card, DECK_SIZE, Suit};
pub use dealer::{DealerAction, DealerPolicy, DealerStep};
pub use deck::Deck;
pub use error::{
    ActionError, BetError, DealerError, DeckExhausted, LedgerError, StartError, TableError,
};
pub use events::{DealtHand, InboundMessage, Refund, TableEvent};
pub use hand::{DealerHand, Hand, Valuation};
pub use ledger::{
    AdjustmentMetadata, AdjustmentReason, BalanceAdjustment, BalanceLedger, HandId,
    InMemoryLedger, ParticipantId, ParticipantInfo, Roster, TableId,
};
pub use options::{RoundingMode, TableOptions};
pub use readiness::{ReadinessRegistry, ReadySource};
pub use settlement::{MAX_STAKE, Outcome, SettlementEngine, SettlementResult};
pub use table::{
    MultiPhase, MultiTable, PhaseKind, Seat, SinglePhase, SingleTable, TableEngine, TurnState,
};
