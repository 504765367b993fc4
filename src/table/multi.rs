//! Two to four participants sharing one dealer hand and one deck.
//!
//! A hand runs in two passes over the fixed join order. In the betting pass
//! each participant in turn either bets or skips; in the acting pass each
//! bettor hits, stands, or doubles until their hand resolves. The turn pointer
//! only ever moves forward to the next participant who is not finished,
//! wrapping around, so nobody who stood, busted, or skipped is visited again.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::card::Card;
use crate::dealer::DealerStep;
use crate::deck::Deck;
use crate::error::{ActionError, BetError, DealerError, StartError, TableError};
use crate::events::{InboundMessage, TableEvent};
use crate::hand::DealerHand;
use crate::ledger::{BalanceLedger, HandId, ParticipantId, Roster, TableId};
use crate::options::TableOptions;
use crate::readiness::{ReadinessRegistry, ReadySource};
use crate::settlement::SettlementResult;

use super::{PhaseKind, Seat, TableCore, TableEngine, TurnState};

/// Phase of a shared table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiPhase {
    /// Collecting ready signals.
    Waiting,
    /// Opening cards are going out.
    Dealing,
    /// Participants bet and act in turn.
    PlayerTurns,
    /// Every participant is finished; the dealer plays.
    DealerTurn,
    /// Results are out.
    Settlement,
}

/// A shared table.
pub struct MultiTable {
    core: TableCore,
    registry: Arc<ReadinessRegistry>,
    phase: MultiPhase,
    seats: Vec<Seat>,
    current: Option<usize>,
    lobby: Vec<ParticipantId>,
    results: Vec<SettlementResult>,
}

impl MultiTable {
    /// Creates an empty table, shuffling with `seed`.
    #[must_use]
    pub fn new(
        table_id: TableId,
        options: TableOptions,
        seed: u64,
        roster: Arc<dyn Roster>,
        ledger: Arc<dyn BalanceLedger>,
    ) -> Self {
        Self {
            core: TableCore::new(table_id, options, seed, roster, ledger),
            registry: Arc::new(ReadinessRegistry::new()),
            phase: MultiPhase::Waiting,
            seats: Vec::new(),
            current: None,
            lobby: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Uses `deck` instead of a fresh shuffle for the next hand.
    pub fn stack_next_deck(&mut self, deck: Deck) {
        self.core.stack_next_deck(deck);
    }

    /// Returns the registry the start gate reads, for cache sources to feed.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ReadinessRegistry> {
        &self.registry
    }

    /// Returns the current phase.
    #[must_use]
    pub const fn phase(&self) -> MultiPhase {
        self.phase
    }

    /// Returns the seats in turn order.
    #[must_use]
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Returns the seat of `id`, if seated.
    #[must_use]
    pub fn seat(&self, id: ParticipantId) -> Option<&Seat> {
        self.seats.iter().find(|seat| seat.id() == id)
    }

    /// Returns who holds the turn.
    #[must_use]
    pub fn current_turn(&self) -> Option<ParticipantId> {
        self.current
            .and_then(|index| self.seats.get(index))
            .map(Seat::id)
    }

    /// Returns the shared dealer hand.
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

    /// Returns the results of the last settlement, until reset.
    #[must_use]
    pub fn results(&self) -> &[SettlementResult] {
        &self.results
    }

    /// Records a live ready signal.
    pub fn ready(&mut self, id: ParticipantId) {
        self.mark_ready(id, ReadySource::LiveEvent);
    }

    /// Records a ready signal from any source.
    pub fn mark_ready(&mut self, id: ParticipantId, source: ReadySource) {
        if !self.lobby.contains(&id) {
            self.lobby.push(id);
        }
        if self.registry.mark_ready(id, source) {
            self.core.emit(TableEvent::ParticipantReady {
                participant_id: id,
                ready_count: self.registry.ready_count(&self.lobby),
            });
        }
    }

    /// Seats the ready members of `roster` and deals the opening cards.
    ///
    /// # Errors
    ///
    /// Returns an error outside the waiting phase, if `initiator` is not
    /// ready, if the ready count is outside the configured range, if the
    /// roster cannot resolve a participant, or if the deck runs out.
    pub fn start(
        &mut self,
        initiator: ParticipantId,
        roster: &[ParticipantId],
    ) -> Result<(), StartError> {
        if self.phase != MultiPhase::Waiting {
            return Err(StartError::WrongPhase);
        }

        let options = self.core.options();
        let ready = self.registry.start_gate(
            roster,
            initiator,
            options.min_players,
            options.max_players,
        )?;

        let seats = ready
            .iter()
            .map(|&id| {
                self.core
                    .roster()
                    .get_participant(id)
                    .map(|info| Seat::new(id, info))
                    .ok_or(StartError::ParticipantNotFound)
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.seats = seats;
        self.phase = MultiPhase::Dealing;
        log::info!(
            "table {}: starting hand {} with {:?}",
            self.core.table_id(),
            self.core.hand_id(),
            ready
        );

        if self.core.deal_opening(&mut self.seats).is_err() {
            self.abort();
            return Err(StartError::DeckExhausted);
        }

        self.phase = MultiPhase::PlayerTurns;
        self.set_turn(Some(0));
        Ok(())
    }

    /// Places the current participant's wager and passes the turn on.
    ///
    /// # Errors
    ///
    /// Returns an error outside player turns, out of turn, if the amount is
    /// zero, above the balance or above [`MAX_STAKE`](crate::MAX_STAKE), or if a
    /// bet is already down.
    pub fn bet(&mut self, id: ParticipantId, amount: u64) -> Result<(), BetError> {
        if self.phase != MultiPhase::PlayerTurns {
            return Err(BetError::WrongPhase);
        }
        let index = self.index_of(id).ok_or(BetError::ParticipantNotFound)?;
        if self.current != Some(index) {
            return Err(BetError::NotYourTurn);
        }

        let info = self
            .core
            .roster()
            .get_participant(id)
            .ok_or(BetError::ParticipantNotFound)?;

        let seat = &mut self.seats[index];
        seat.place_bet(amount, info)?;
        seat.advance(TurnState::Acting);
        let balance = seat.balance();
        if seat.hand().is_blackjack() {
            log::debug!("participant {id} holds a natural");
            seat.advance(TurnState::Standing);
        }

        self.core.emit(TableEvent::BetPlaced {
            participant_id: id,
            amount,
            balance,
        });
        self.advance_turn(index);
        Ok(())
    }

    /// Sits the current participant out of this hand. Only legal before betting.
    ///
    /// # Errors
    ///
    /// Returns an error outside player turns, out of turn, or after a bet.
    pub fn skip(&mut self, id: ParticipantId) -> Result<(), ActionError> {
        let index = self.turn_index(id)?;
        if self.seats[index].turn_state() != TurnState::Waiting {
            return Err(ActionError::WrongPhase);
        }

        self.seats[index].advance(TurnState::Skipped);
        log::debug!("participant {id} skips hand {}", self.core.hand_id());
        self.advance_turn(index);
        Ok(())
    }

    /// Draws a card for the current participant.
    ///
    /// The participant keeps the turn unless the card busts them or makes 21.
    ///
    /// # Errors
    ///
    /// Returns an error outside player turns, out of turn, before a bet, or
    /// when the deck runs out (the hand is then aborted).
    pub fn hit(&mut self, id: ParticipantId) -> Result<Card, ActionError> {
        let index = self.acting_index(id)?;

        let Ok(card) = self.core.draw_to(&mut self.seats[index]) else {
            self.abort();
            return Err(ActionError::DeckExhausted);
        };

        let hand = self.seats[index].hand();
        if hand.is_bust() {
            self.finish(index, TurnState::Busted);
        } else if hand.value() == 21 {
            self.finish(index, TurnState::Standing);
        }
        Ok(card)
    }

    /// Ends the current participant's turn.
    ///
    /// # Errors
    ///
    /// Returns an error outside player turns, out of turn, or before a bet.
    pub fn stand(&mut self, id: ParticipantId) -> Result<(), ActionError> {
        let index = self.acting_index(id)?;
        self.finish(index, TurnState::Standing);
        Ok(())
    }

    /// Doubles the current participant's wager for exactly one card.
    ///
    /// # Errors
    ///
    /// Returns an error outside player turns, out of turn, before a bet,
    /// after a hit, when the balance cannot match the bet, or when the deck
    /// runs out.
    pub fn double_down(&mut self, id: ParticipantId) -> Result<Card, ActionError> {
        let index = self.acting_index(id)?;

        let extra = self.seats[index].check_double()?;
        self.seats[index].double_bet(extra);
        self.core.emit(TableEvent::BetPlaced {
            participant_id: id,
            amount: extra.saturating_mul(2),
            balance: self.seats[index].balance(),
        });

        let Ok(card) = self.core.draw_to(&mut self.seats[index]) else {
            self.abort();
            return Err(ActionError::DeckExhausted);
        };

        if self.seats[index].hand().is_bust() {
            self.finish(index, TurnState::Busted);
        } else {
            self.finish(index, TurnState::Standing);
        }
        Ok(card)
    }

    fn index_of(&self, id: ParticipantId) -> Option<usize> {
        self.seats.iter().position(|seat| seat.id() == id)
    }

    /// Resolves `id` to a seat index if they hold the turn.
    fn turn_index(&self, id: ParticipantId) -> Result<usize, ActionError> {
        if self.phase != MultiPhase::PlayerTurns {
            return Err(ActionError::WrongPhase);
        }
        let index = self.index_of(id).ok_or(ActionError::ParticipantNotFound)?;
        if self.current != Some(index) {
            return Err(ActionError::NotYourTurn);
        }
        Ok(index)
    }

    /// Like [`Self::turn_index`], but the participant must also have bet.
    fn acting_index(&self, id: ParticipantId) -> Result<usize, ActionError> {
        let index = self.turn_index(id)?;
        if self.seats[index].turn_state() != TurnState::Acting {
            return Err(ActionError::NoBet);
        }
        Ok(index)
    }

    fn finish(&mut self, index: usize, state: TurnState) {
        self.seats[index].advance(state);
        self.advance_turn(index);
    }

    /// Moves the turn to the next unfinished seat after `from`, wrapping and
    /// checking `from` itself last. Hands over to the dealer when none is left.
    fn advance_turn(&mut self, from: usize) {
        let count = self.seats.len();
        let next = (1..=count)
            .map(|offset| (from + offset) % count)
            .find(|&index| !self.seats[index].turn_state().is_finished());

        if next.is_none() {
            self.phase = MultiPhase::DealerTurn;
        }
        self.set_turn(next);
    }

    fn set_turn(&mut self, index: Option<usize>) {
        self.current = index;
        let current_turn = self.current_turn();
        log::debug!(
            "table {}: turn passes to {current_turn:?}",
            self.core.table_id()
        );
        self.core.emit(TableEvent::TurnAdvanced { current_turn });
    }

    fn settle(&mut self) {
        self.results = self.core.settle(&mut self.seats);
        self.phase = MultiPhase::Settlement;
    }

    fn seat_ids(&self) -> Vec<ParticipantId> {
        self.seats.iter().map(Seat::id).collect()
    }

    /// Forgets the seated participants' readiness and empties the table.
    fn clear_table(&mut self) {
        let ids = self.seat_ids();
        self.registry.clear(&ids);
        self.lobby.retain(|id| !ids.contains(id));
        self.seats.clear();
        self.current = None;
        self.phase = MultiPhase::Waiting;
    }

    fn abort(&mut self) {
        self.core.abort(&mut self.seats);
        self.results.clear();
        self.clear_table();
    }
}

impl TableEngine for MultiTable {
    fn handle(&mut self, message: InboundMessage) -> Result<(), TableError> {
        match message {
            InboundMessage::Ready { participant_id } => self.ready(participant_id),
            InboundMessage::StartTable {
                participant_id,
                roster,
            } => self.start(participant_id, &roster)?,
            InboundMessage::Bet {
                participant_id,
                amount,
                ..
            } => self.bet(participant_id, amount)?,
            InboundMessage::Hit { participant_id } => {
                self.hit(participant_id)?;
            }
            InboundMessage::Stand { participant_id } => self.stand(participant_id)?,
            InboundMessage::Skip { participant_id } => self.skip(participant_id)?,
            InboundMessage::DoubleDown { participant_id } => {
                self.double_down(participant_id)?;
            }
        }
        Ok(())
    }

    fn drain_events(&mut self) -> Vec<TableEvent> {
        self.core.drain_events()
    }

    fn phase_kind(&self) -> PhaseKind {
        match self.phase {
            MultiPhase::Waiting | MultiPhase::Dealing => PhaseKind::Idle,
            MultiPhase::PlayerTurns => PhaseKind::PlayerTurns,
            MultiPhase::DealerTurn => PhaseKind::DealerTurn,
            MultiPhase::Settlement => PhaseKind::Settled,
        }
    }

    fn current_turn(&self) -> Option<ParticipantId> {
        Self::current_turn(self)
    }

    fn dealer_step(&mut self) -> Result<DealerStep, DealerError> {
        if self.phase != MultiPhase::DealerTurn {
            return Err(DealerError::WrongPhase);
        }

        let any_live = self
            .seats
            .iter()
            .any(|seat| seat.turn_state() == TurnState::Standing);

        match self.core.dealer_step(any_live) {
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
        if self.phase != MultiPhase::PlayerTurns {
            return None;
        }
        let index = self.current?;
        let id = self.seats.get(index)?.id();

        match self.seats[index].turn_state() {
            TurnState::Waiting => {
                log::warn!("participant {id} timed out before betting, skipping");
                self.seats[index].advance(TurnState::Skipped);
                self.advance_turn(index);
            }
            TurnState::Acting => {
                log::warn!("participant {id} timed out, standing");
                self.finish(index, TurnState::Standing);
            }
            TurnState::Standing | TurnState::Skipped | TurnState::Busted => return None,
        }
        Some(id)
    }

    fn reset(&mut self) -> bool {
        if self.phase != MultiPhase::Settlement {
            return false;
        }
        log::info!(
            "table {}: hand {} closed",
            self.core.table_id(),
            self.core.hand_id()
        );
        self.results.clear();
        self.clear_table();
        self.core.next_hand();
        true
    }

    fn settlement(&self) -> Vec<SettlementResult> {
        self.results.clone()
    }
}
