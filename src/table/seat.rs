//! Table-local participant state.

extern crate alloc;

use alloc::string::String;

use crate::error::{ActionError, BetError};
use crate::hand::Hand;
use crate::ledger::{ParticipantId, ParticipantInfo};
use crate::settlement::MAX_STAKE;

/// Where a participant stands within the current hand.
///
/// States only move forward: `Waiting -> Acting -> {Standing | Busted}`, or
/// `Waiting -> Skipped`. They reset only when the table does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnState {
    /// Dealt in, no bet yet.
    Waiting,
    /// Bet placed, still drawing.
    Acting,
    /// Done drawing.
    Standing,
    /// Sat the hand out.
    Skipped,
    /// Went over 21.
    Busted,
}

impl TurnState {
    /// Returns whether the participant is done for this hand.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Standing | Self::Skipped | Self::Busted)
    }

    const fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Waiting, Self::Acting | Self::Skipped)
                | (Self::Acting, Self::Standing | Self::Busted)
        )
    }
}

/// A participant seated at a table.
#[derive(Debug, Clone)]
pub struct Seat {
    id: ParticipantId,
    display_name: String,
    balance: u64,
    bet: Option<u64>,
    doubled: bool,
    hand: Hand,
    turn_state: TurnState,
}

impl Seat {
    /// Seats a participant with the roster's view of them.
    #[must_use]
    pub fn new(id: ParticipantId, info: ParticipantInfo) -> Self {
        Self {
            id,
            display_name: info.display_name,
            balance: info.balance,
            bet: None,
            doubled: false,
            hand: Hand::new(),
            turn_state: TurnState::Waiting,
        }
    }

    /// Returns the participant ID.
    #[must_use]
    pub const fn id(&self) -> ParticipantId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Returns the table balance, net of any wager on the current hand.
    #[must_use]
    pub const fn balance(&self) -> u64 {
        self.balance
    }

    /// Returns the wager on the current hand.
    #[must_use]
    pub const fn bet(&self) -> Option<u64> {
        self.bet
    }

    /// Returns whether the wager was doubled.
    #[must_use]
    pub const fn is_doubled(&self) -> bool {
        self.doubled
    }

    /// Returns the participant's hand.
    #[must_use]
    pub const fn hand(&self) -> &Hand {
        &self.hand
    }

    /// Returns the participant's turn state.
    #[must_use]
    pub const fn turn_state(&self) -> TurnState {
        self.turn_state
    }

    pub(crate) fn hand_mut(&mut self) -> &mut Hand {
        &mut self.hand
    }

    /// Moves the turn state forward; backward moves are ignored.
    pub(crate) fn advance(&mut self, next: TurnState) -> bool {
        if self.turn_state.can_become(next) {
            self.turn_state = next;
            true
        } else {
            log::warn!(
                "participant {} cannot move from {:?} to {:?}",
                self.id,
                self.turn_state,
                next
            );
            false
        }
    }

    /// Validates a wager against the roster's current view of the participant,
    /// then takes that view and debits the wager. A rejection changes nothing.
    pub(crate) fn place_bet(
        &mut self,
        amount: u64,
        info: ParticipantInfo,
    ) -> Result<(), BetError> {
        if self.bet.is_some() {
            return Err(BetError::AlreadyPlaced);
        }
        if amount == 0 || amount > MAX_STAKE || amount > info.balance {
            return Err(BetError::InvalidBet);
        }

        self.display_name = info.display_name;
        self.balance = info.balance - amount;
        self.bet = Some(amount);
        Ok(())
    }

    /// Validates a double down without changing anything.
    pub(crate) fn check_double(&self) -> Result<u64, ActionError> {
        let bet = self.bet.ok_or(ActionError::NoBet)?;
        if self.doubled || self.hand.len() != 2 {
            return Err(ActionError::CannotDouble);
        }
        if self.balance < bet {
            return Err(ActionError::InsufficientBalance);
        }
        Ok(bet)
    }

    /// Debits the original wager a second time.
    pub(crate) fn double_bet(&mut self, extra: u64) {
        self.balance = self.balance.saturating_sub(extra);
        self.bet = self.bet.map(|bet| bet.saturating_add(extra));
        self.doubled = true;
    }

    /// Credits a payout.
    pub(crate) fn credit(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Returns the wager to the balance; used when a hand is aborted.
    pub(crate) fn refund(&mut self) -> Option<u64> {
        let bet = self.bet.take()?;
        self.balance = self.balance.saturating_add(bet);
        self.doubled = false;
        Some(bet)
    }

    /// Clears cards, wager and turn state for a new hand.
    pub(crate) fn clear_hand(&mut self) {
        self.hand.clear();
        self.bet = None;
        self.doubled = false;
        self.turn_state = TurnState::Waiting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, balance: u64) -> ParticipantInfo {
        ParticipantInfo {
            display_name: name.into(),
            balance,
        }
    }

    fn seat(balance: u64) -> Seat {
        Seat::new(1, info("Ada", balance))
    }

    #[test]
    fn bet_must_fit_balance_and_is_set_once() {
        let mut seat = seat(20);
        assert_eq!(seat.place_bet(0, info("Ada", 20)), Err(BetError::InvalidBet));
        assert_eq!(seat.place_bet(21, info("Ada", 20)), Err(BetError::InvalidBet));
        assert_eq!(seat.place_bet(20, info("Ada", 20)), Ok(()));
        assert_eq!(seat.balance(), 0);
        assert_eq!(seat.place_bet(1, info("Ada", 20)), Err(BetError::AlreadyPlaced));
    }

    #[test]
    fn rejected_bet_keeps_the_old_roster_view() {
        let mut seat = seat(20);
        assert_eq!(seat.place_bet(90, info("Ada L.", 50)), Err(BetError::InvalidBet));
        assert_eq!(seat.display_name(), "Ada");
        assert_eq!(seat.balance(), 20);

        seat.place_bet(30, info("Ada L.", 50)).unwrap();
        assert_eq!(seat.display_name(), "Ada L.");
        assert_eq!(seat.balance(), 20);
    }

    #[test]
    fn stakes_above_the_cap_are_invalid() {
        let mut seat = seat(u64::MAX);
        assert_eq!(
            seat.place_bet(MAX_STAKE + 1, info("Ada", u64::MAX)),
            Err(BetError::InvalidBet)
        );
        seat.place_bet(MAX_STAKE, info("Ada", u64::MAX)).unwrap();
        seat.double_bet(MAX_STAKE);
        assert_eq!(seat.bet(), Some(2 * MAX_STAKE));

        seat.credit(u64::MAX);
        assert_eq!(seat.balance(), u64::MAX);
    }

    #[test]
    fn turn_state_never_regresses() {
        let mut seat = seat(20);
        assert!(!seat.advance(TurnState::Standing));
        assert!(seat.advance(TurnState::Acting));
        assert!(seat.advance(TurnState::Busted));
        assert!(!seat.advance(TurnState::Acting));
        assert!(!seat.advance(TurnState::Skipped));
        assert_eq!(seat.turn_state(), TurnState::Busted);

        seat.clear_hand();
        assert_eq!(seat.turn_state(), TurnState::Waiting);
    }

    #[test]
    fn refund_restores_balance() {
        let mut seat = seat(50);
        seat.place_bet(20, info("Ada", 50)).unwrap();
        seat.double_bet(20);
        assert_eq!(seat.bet(), Some(40));
        assert_eq!(seat.refund(), Some(40));
        assert_eq!(seat.balance(), 50);
        assert_eq!(seat.refund(), None);
    }
}
