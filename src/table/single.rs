//! One participant against the dealer.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::card::Card;
use crate::dealer::DealerStep;
use crate::deck::Deck;
use crate::error::{ActionError, BetError, DealerError, TableError};
use crate::events::{InboundMessage, TableEvent};
use crate::hand::DealerHand;
use crate::ledger::{BalanceLedger, HandId, ParticipantId, ParticipantInfo, Roster, TableId};
use crate::options::TableOptions;
use crate::settlement::SettlementResult;

use super::{PhaseKind, Seat, TableCore, TableEngine, TurnState};

/// Phase of a single-player table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinglePhase {
    /// Waiting for a wager.
    Betting,
    /// The participant is hitting, standing, or doubling.
    PlayerActing,
    /// The dealer plays next.
    DealerTurn,
    /// The hand is settled.
    Settlement,
}

/// A private table: one participant, one dealer, one fresh deck per hand.
///
/// ```
/// use std::sync::Arc;
/// use bjtable::{InMemoryLedger, SinglePhase, SingleTable, TableOptions};
///
/// let ledger = Arc::new(InMemoryLedger::new());
/// ledger.open_account(1, "Ada", 100);
///
/// let mut table = SingleTable::new(7, 1, TableOptions::default(), 42, ledger.clone(), ledger);
/// table.place_bet(10).unwrap();
/// assert_ne!(table.phase(), SinglePhase::Betting);
/// ```
pub struct SingleTable {
    core: TableCore,
    phase: SinglePhase,
    seat: [Seat; 1],
    result: Option<SettlementResult>,
}

impl SingleTable {
    /// Creates a table for `participant_id`, shuffling with `seed`.
    #[must_use]
    pub fn new(
        table_id: TableId,
        participant_id: ParticipantId,
        options: TableOptions,
        seed: u64,
        roster: Arc<dyn Roster>,
        ledger: Arc<dyn BalanceLedger>,
    ) -> Self {
        let info = roster
            .get_participant(participant_id)
            .unwrap_or(ParticipantInfo {
                display_name: alloc::string::String::new(),
                balance: 0,
            });

        Self {
            core: TableCore::new(table_id, options, seed, roster, ledger),
            phase: SinglePhase::Betting,
            seat: [Seat::new(participant_id, info)],
            result: None,
        }
    }

    /// Uses `deck` instead of a fresh shuffle for the next hand.
    pub fn stack_next_deck(&mut self, deck: Deck) {
        self.core.stack_next_deck(deck);
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> SinglePhase {
        self.phase
    }

    /// Returns the participant's seat.
    #[must_use]
    pub const fn seat(&self) -> &Seat {
        &self.seat[0]
    }

    /// Returns the dealer's hand.
    #[must_use]
    pub const fn dealer_hand(&self) -> &DealerHand {
        self.core.dealer()
    }

    /// Returns the number of undealt cards.
    #[must_use]
    pub fn cards_remaining(&self) -> usize {
        self.core.deck().len()
    }

    /// Returns the current hand counter.
    #[must_use]
    pub const fn hand_id(&self) -> HandId {
        self.core.hand_id()
    }

    /// Returns the settlement of the last hand, until reset.
    #[must_use]
    pub const fn result(&self) -> Option<&SettlementResult> {
        self.result.as_ref()
    }

    /// Places a wager and deals the opening cards.
    ///
    /// A natural blackjack skips straight to the dealer turn.
    ///
    /// # Errors
    ///
    /// Returns an error outside the betting phase, if the amount is zero or
    /// above the balance or [`MAX_STAKE`](crate::MAX_STAKE), if the roster no
    /// longer knows the participant, or if the deck runs out while dealing
    /// (the bet is then refunded).
    pub fn place_bet(&mut self, amount: u64) -> Result<(), BetError> {
        if self.phase != SinglePhase::Betting {
            return Err(BetError::WrongPhase);
        }

        let info = self
            .core
            .roster()
            .get_participant(self.seat[0].id())
            .ok_or(BetError::ParticipantNotFound)?;
        self.seat[0].place_bet(amount, info)?;
        self.seat[0].advance(TurnState::Acting);

        self.core.emit(TableEvent::BetPlaced {
            participant_id: self.seat[0].id(),
            amount,
            balance: self.seat[0].balance(),
        });

        if self.core.deal_opening(&mut self.seat).is_err() {
            self.abort();
            return Err(BetError::DeckExhausted);
        }

        if self.seat[0].hand().is_blackjack() {
            log::debug!("participant {} dealt a natural", self.seat[0].id());
            self.finish_player(TurnState::Standing);
        } else {
            self.phase = SinglePhase::PlayerActing;
        }
        Ok(())
    }

    /// Draws a card. Busting settles at once; reaching 21 stands.
    ///
    /// # Errors
    ///
    /// Returns an error outside the acting phase or if the deck runs out.
    pub fn hit(&mut self) -> Result<Card, ActionError> {
        if self.phase != SinglePhase::PlayerActing {
            return Err(ActionError::WrongPhase);
        }

        let Ok(card) = self.core.draw_to(&mut self.seat[0]) else {
            self.abort();
            return Err(ActionError::DeckExhausted);
        };

        let hand = self.seat[0].hand();
        if hand.is_bust() {
            self.finish_player(TurnState::Busted);
        } else if hand.value() == 21 {
            self.finish_player(TurnState::Standing);
        }
        Ok(card)
    }

    /// Keeps the current hand and hands over to the dealer.
    ///
    /// # Errors
    ///
    /// Returns an error outside the acting phase.
    pub fn stand(&mut self) -> Result<(), ActionError> {
        if self.phase != SinglePhase::PlayerActing {
            return Err(ActionError::WrongPhase);
        }
        self.finish_player(TurnState::Standing);
        Ok(())
    }

    /// Doubles the wager, draws exactly one card, and stands.
    ///
    /// # Errors
    ///
    /// Returns an error outside the acting phase, after a hit, when the
    /// balance cannot cover the original bet again, or if the deck runs out.
    pub fn double_down(&mut self) -> Result<Card, ActionError> {
        if self.phase != SinglePhase::PlayerActing {
            return Err(ActionError::WrongPhase);
        }

        let extra = self.seat[0].check_double()?;
        self.seat[0].double_bet(extra);
        self.core.emit(TableEvent::BetPlaced {
            participant_id: self.seat[0].id(),
            amount: extra.saturating_mul(2),
            balance: self.seat[0].balance(),
        });

        let Ok(card) = self.core.draw_to(&mut self.seat[0]) else {
            self.abort();
            return Err(ActionError::DeckExhausted);
        };

        if self.seat[0].hand().is_bust() {
            self.finish_player(TurnState::Busted);
        } else {
            self.finish_player(TurnState::Standing);
        }
        Ok(card)
    }

    /// Ends the participant's turn; a bust settles without the dealer drawing.
    fn finish_player(&mut self, state: TurnState) {
        self.seat[0].advance(state);

        if state == TurnState::Busted {
            self.core.reveal_dealer();
            self.settle();
        } else {
            self.phase = SinglePhase::DealerTurn;
        }
    }

    fn settle(&mut self) {
        self.result = self.core.settle(&mut self.seat).first().copied();
        self.phase = SinglePhase::Settlement;
    }

    fn abort(&mut self) {
        self.core.abort(&mut self.seat);
        self.seat[0].clear_hand();
        self.result = None;
        self.phase = SinglePhase::Betting;
    }
}

impl TableEngine for SingleTable {
    fn handle(&mut self, message: InboundMessage) -> Result<(), TableError> {
        if message.participant_id() != self.seat[0].id() {
            return Err(ActionError::NotYourTurn.into());
        }

        match message {
            InboundMessage::Bet { amount, .. } => self.place_bet(amount)?,
            InboundMessage::Hit { .. } => {
                self.hit()?;
            }
            InboundMessage::Stand { .. } => self.stand()?,
            InboundMessage::DoubleDown { .. } => {
                self.double_down()?;
            }
            InboundMessage::Ready { .. }
            | InboundMessage::StartTable { .. }
            | InboundMessage::Skip { .. } => return Err(TableError::Unsupported),
        }
        Ok(())
    }

    fn drain_events(&mut self) -> Vec<TableEvent> {
        self.core.drain_events()
    }

    fn phase_kind(&self) -> PhaseKind {
        match self.phase {
            SinglePhase::Betting => PhaseKind::Idle,
            SinglePhase::PlayerActing => PhaseKind::PlayerTurns,
            SinglePhase::DealerTurn => PhaseKind::DealerTurn,
            SinglePhase::Settlement => PhaseKind::Settled,
        }
    }

    fn current_turn(&self) -> Option<ParticipantId> {
        (self.phase == SinglePhase::PlayerActing).then(|| self.seat[0].id())
    }

    fn dealer_step(&mut self) -> Result<DealerStep, DealerError> {
        if self.phase != SinglePhase::DealerTurn {
            return Err(DealerError::WrongPhase);
        }

        match self.core.dealer_step(true) {
            Ok(DealerStep::Done) => {
                self.settle();
                Ok(DealerStep::Done)
            }
            Ok(step) => Ok(step),
            Err(_) => {
                self.abort();
                Err(DealerError::DeckExhausted)
            }
        }
    }

    fn expire_turn(&mut self) -> Option<ParticipantId> {
        if self.phase != SinglePhase::PlayerActing {
            return None;
        }
        log::warn!("participant {} timed out, standing", self.seat[0].id());
        self.finish_player(TurnState::Standing);
        Some(self.seat[0].id())
    }

    fn reset(&mut self) -> bool {
        if self.phase != SinglePhase::Settlement {
            return false;
        }
        self.seat[0].clear_hand();
        self.result = None;
        self.core.next_hand();
        self.phase = SinglePhase::Betting;
        true
    }

    fn settlement(&self) -> Vec<SettlementResult> {
        self.result.into_iter().collect()
    }
}
