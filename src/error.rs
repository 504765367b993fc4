//! Error types for table operations.
//!
//! Every rejection is synchronous and leaves the table untouched, except
//! [`DeckExhausted`], which aborts the hand and refunds placed bets.

use thiserror::Error;

/// The deck ran out of cards mid-hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no cards left in the deck")]
pub struct DeckExhausted;

/// Errors that can occur while placing a bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BetError {
    /// The table is not accepting bets.
    #[error("the table is not accepting bets")]
    WrongPhase,
    /// Another participant holds the turn.
    #[error("not this participant's turn")]
    NotYourTurn,
    /// Amount is zero, larger than the participant's balance, or above [`MAX_STAKE`](crate::MAX_STAKE).
    #[error("bet must be positive and no larger than the balance or the stake cap")]
    InvalidBet,
    /// A bet was already placed this hand.
    #[error("a bet was already placed this hand")]
    AlreadyPlaced,
    /// Participant is not seated at this table.
    #[error("participant not found")]
    ParticipantNotFound,
    /// The deck ran out while dealing; the hand was aborted.
    #[error("no cards left in the deck")]
    DeckExhausted,
}

/// Errors that can occur during hit, stand, skip, or double down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    /// Invalid table phase for this action.
    #[error("invalid table phase for this action")]
    WrongPhase,
    /// Another participant holds the turn.
    #[error("not this participant's turn")]
    NotYourTurn,
    /// Participant is not seated at this table.
    #[error("participant not found")]
    ParticipantNotFound,
    /// The participant must bet before acting.
    #[error("no bet placed yet")]
    NoBet,
    /// Double down is only allowed on the first two cards.
    #[error("cannot double down on this hand")]
    CannotDouble,
    /// Balance does not cover doubling the bet.
    #[error("insufficient balance for this action")]
    InsufficientBalance,
    /// The deck ran out while drawing; the hand was aborted.
    #[error("no cards left in the deck")]
    DeckExhausted,
}

/// Errors that can occur when starting a multi-player hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartError {
    /// A hand is already in progress.
    #[error("a hand is already in progress")]
    WrongPhase,
    /// Fewer or more ready participants than the table allows.
    #[error("{ready} ready participants is outside the allowed table size")]
    RosterSizeInvalid {
        /// Number of ready participants found.
        ready: usize,
    },
    /// The participant asking to start is not ready.
    #[error("the initiating participant is not ready")]
    NotReady,
    /// A ready participant is unknown to the roster.
    #[error("participant not found")]
    ParticipantNotFound,
    /// The deck ran out while dealing; the hand was aborted.
    #[error("no cards left in the deck")]
    DeckExhausted,
}

/// Errors that can occur while the dealer plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DealerError {
    /// The table is not in its dealer turn.
    #[error("invalid table phase for dealer play")]
    WrongPhase,
    /// The deck ran out while the dealer had to draw; the hand was aborted.
    #[error("no cards left in the deck")]
    DeckExhausted,
}

/// Errors returned by the external balance ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The ledger has no account for the participant.
    #[error("participant not found")]
    ParticipantNotFound,
    /// The ledger could not be reached.
    #[error("ledger unavailable")]
    Unavailable,
}

/// Any error a table can answer an inbound message with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TableError {
    /// Betting failed.
    #[error(transparent)]
    Bet(#[from] BetError),
    /// A player action failed.
    #[error(transparent)]
    Action(#[from] ActionError),
    /// Starting the hand failed.
    #[error(transparent)]
    Start(#[from] StartError),
    /// Dealer play failed.
    #[error(transparent)]
    Dealer(#[from] DealerError),
    /// The message has no meaning for this kind of table.
    #[error("message not supported by this table")]
    Unsupported,
    /// The table actor has shut down.
    #[error("table is closed")]
    Closed,
}

impl From<DeckExhausted> for BetError {
    fn from(_: DeckExhausted) -> Self {
        Self::DeckExhausted
    }
}

impl From<DeckExhausted> for ActionError {
    fn from(_: DeckExhausted) -> Self {
        Self::DeckExhausted
    }
}

impl From<DeckExhausted> for StartError {
    fn from(_: DeckExhausted) -> Self {
        Self::DeckExhausted
    }
}

impl From<DeckExhausted> for DealerError {
    fn from(_: DeckExhausted) -> Self {
        Self::DeckExhausted
    }
}
