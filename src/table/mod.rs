//! Table state machines.
//!
//! [`SingleTable`] pits one participant against the dealer; [`MultiTable`]
//! seats two to four participants against one shared dealer hand. Both keep
//! every rule check synchronous: a rejected request returns an error and
//! leaves the table exactly as it was.
//!
//! Tables are plain `&mut self` state machines. Serializing requests from
//! many clients is the job of whoever owns the table, usually
//! [`TableActor`](crate::actor::TableActor).

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::card::Card;
use crate::dealer::{DealerPolicy, DealerStep};
use crate::deck::Deck;
use crate::error::{DealerError, DeckExhausted, TableError};
use crate::events::{DealtHand, InboundMessage, Refund, TableEvent};
use crate::hand::DealerHand;
use crate::ledger::{
    AdjustmentMetadata, AdjustmentReason, BalanceAdjustment, BalanceLedger, HandId, ParticipantId,
    Roster, TableId,
};
use crate::options::TableOptions;
use crate::settlement::{SettlementEngine, SettlementResult};

mod multi;
mod seat;
mod single;

pub use multi::{MultiPhase, MultiTable};
pub use seat::{Seat, TurnState};
pub use single::{SinglePhase, SingleTable};

/// Coarse phase shared by both table kinds, enough for a host to drive them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    /// Between hands: betting (single) or waiting for ready players (multi).
    Idle,
    /// Participants are acting.
    PlayerTurns,
    /// The dealer must play before settlement.
    DealerTurn,
    /// The hand is settled and waits for a reset.
    Settled,
}

/// The operations a host needs to run a table.
pub trait TableEngine: Send {
    /// Applies one inbound message.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason; the table is unchanged unless the
    /// error is a deck exhaustion, which aborts the hand.
    fn handle(&mut self, message: InboundMessage) -> Result<(), TableError>;

    /// Takes the events produced since the last call.
    fn drain_events(&mut self) -> Vec<TableEvent>;

    /// Returns the coarse phase.
    fn phase_kind(&self) -> PhaseKind;

    /// Returns who holds the turn, if anyone.
    fn current_turn(&self) -> Option<ParticipantId>;

    /// Advances the dealer by one card, settling once the dealer stands.
    ///
    /// # Errors
    ///
    /// Returns an error outside the dealer turn, or when the deck runs out.
    fn dealer_step(&mut self) -> Result<DealerStep, DealerError>;

    /// Applies the implicit action for a participant whose turn window elapsed.
    ///
    /// Returns the participant whose turn was expired.
    fn expire_turn(&mut self) -> Option<ParticipantId>;

    /// Clears a settled hand so the next one can start.
    ///
    /// Returns `false` if the table was not settled.
    fn reset(&mut self) -> bool;

    /// Plays the dealer to completion and returns the settlement.
    ///
    /// # Errors
    ///
    /// Returns an error outside the dealer turn, or when the deck runs out.
    fn play_dealer(&mut self) -> Result<Vec<SettlementResult>, DealerError> {
        loop {
            if self.dealer_step()? == DealerStep::Done {
                return Ok(self.settlement());
            }
        }
    }

    /// Returns the results of the last settled hand.
    fn settlement(&self) -> Vec<SettlementResult>;
}

/// State and services both table kinds share.
pub(crate) struct TableCore {
    table_id: TableId,
    hand_id: HandId,
    options: TableOptions,
    policy: DealerPolicy,
    settlement: SettlementEngine,
    rng: ChaCha8Rng,
    stacked: Option<Deck>,
    deck: Deck,
    dealer: DealerHand,
    roster: Arc<dyn Roster>,
    ledger: Arc<dyn BalanceLedger>,
    events: Vec<TableEvent>,
}

impl TableCore {
    pub(crate) fn new(
        table_id: TableId,
        options: TableOptions,
        seed: u64,
        roster: Arc<dyn Roster>,
        ledger: Arc<dyn BalanceLedger>,
    ) -> Self {
        Self {
            table_id,
            hand_id: 1,
            policy: DealerPolicy::from_options(&options),
            settlement: SettlementEngine::from_options(&options),
            options,
            rng: ChaCha8Rng::seed_from_u64(seed),
            stacked: None,
            deck: Deck::from_draws(&[]),
            dealer: DealerHand::new(),
            roster,
            ledger,
            events: Vec::new(),
        }
    }

    pub(crate) const fn table_id(&self) -> TableId {
        self.table_id
    }

    pub(crate) const fn hand_id(&self) -> HandId {
        self.hand_id
    }

    pub(crate) const fn options(&self) -> &TableOptions {
        &self.options
    }

    pub(crate) const fn deck(&self) -> &Deck {
        &self.deck
    }

    pub(crate) const fn dealer(&self) -> &DealerHand {
        &self.dealer
    }

    pub(crate) fn roster(&self) -> &dyn Roster {
        self.roster.as_ref()
    }

    pub(crate) fn stack_next_deck(&mut self, deck: Deck) {
        self.stacked = Some(deck);
    }

    pub(crate) fn emit(&mut self, event: TableEvent) {
        self.events.push(event);
    }

    pub(crate) fn drain_events(&mut self) -> Vec<TableEvent> {
        core::mem::take(&mut self.events)
    }

    /// Takes a fresh deck for the new hand: the stacked one if any, else a new shuffle.
    fn fresh_deck(&mut self) {
        self.deck = match self.stacked.take() {
            Some(deck) => deck,
            None => Deck::shuffled(&mut self.rng),
        };
        self.dealer.clear();
    }

    /// Deals two cards to the dealer and to every seat, dealer first each round.
    pub(crate) fn deal_opening(&mut self, seats: &mut [Seat]) -> Result<(), DeckExhausted> {
        self.fresh_deck();

        for _ in 0..2 {
            let card = self.deck.draw()?;
            self.dealer.add_card(card);
            for seat in seats.iter_mut() {
                let card = self.deck.draw()?;
                seat.hand_mut().add_card(card);
            }
        }

        let hands = seats
            .iter()
            .map(|seat| DealtHand {
                participant_id: seat.id(),
                cards: seat.hand().cards().to_vec(),
                value: seat.hand().value(),
            })
            .collect();

        if let Some(&dealer_upcard) = self.dealer.up_card() {
            self.emit(TableEvent::HandDealt {
                hand_id: self.hand_id,
                dealer_upcard,
                hands,
            });
        }

        log::info!(
            "table {} hand {}: dealt {} seat(s), {} cards left",
            self.table_id,
            self.hand_id,
            seats.len(),
            self.deck.len()
        );
        Ok(())
    }

    /// Draws one card into `seat`'s hand.
    pub(crate) fn draw_to(&mut self, seat: &mut Seat) -> Result<Card, DeckExhausted> {
        let card = self.deck.draw()?;
        seat.hand_mut().add_card(card);

        log::debug!(
            "table {}: participant {} drew {card} ({})",
            self.table_id,
            seat.id(),
            seat.hand().value()
        );
        self.emit(TableEvent::HandUpdated {
            participant_id: seat.id(),
            new_card: card,
            hand_value: seat.hand().value(),
        });
        Ok(card)
    }

    /// Turns the hole card over once per hand.
    pub(crate) fn reveal_dealer(&mut self) {
        if self.dealer.is_hole_revealed() {
            return;
        }
        self.dealer.reveal_hole();
        self.emit(TableEvent::DealerRevealed {
            dealer_hand: self.dealer.cards().to_vec(),
            dealer_value: self.dealer.value(),
        });
    }

    /// Reveals, then draws at most one card under the house policy.
    ///
    /// With no live hand left the dealer stands on the opening cards.
    pub(crate) fn dealer_step(&mut self, any_live: bool) -> Result<DealerStep, DeckExhausted> {
        self.reveal_dealer();
        if !any_live {
            return Ok(DealerStep::Done);
        }

        let step = self.policy.step(&mut self.dealer, &mut self.deck)?;
        if let DealerStep::Drew(card) = step {
            log::debug!(
                "table {}: dealer drew {card} ({})",
                self.table_id,
                self.dealer.value()
            );
            self.emit(TableEvent::DealerDrew {
                card,
                dealer_value: self.dealer.value(),
            });
        }
        Ok(step)
    }

    /// Settles every seat that wagered, credits payouts, and reports the net
    /// change of each to the ledger.
    pub(crate) fn settle(&mut self, seats: &mut [Seat]) -> Vec<SettlementResult> {
        let mut results = Vec::with_capacity(seats.len());

        for seat in seats.iter_mut() {
            let Some(bet) = seat.bet() else {
                continue;
            };
            if seat.turn_state() == TurnState::Skipped {
                continue;
            }

            let result = self
                .settlement
                .settle(seat.id(), seat.hand(), &self.dealer, bet);
            seat.credit(result.payout);

            self.report(BalanceAdjustment {
                participant_id: seat.id(),
                net_amount: result.net(),
                reason: AdjustmentReason::BlackjackSettlement,
                metadata: AdjustmentMetadata {
                    table_id: self.table_id,
                    hand_id: self.hand_id,
                    bet,
                    payout: result.payout,
                    outcome: Some(result.outcome),
                },
            });
            results.push(result);
        }

        log::info!(
            "table {} hand {}: settled {} hand(s) against dealer {}",
            self.table_id,
            self.hand_id,
            results.len(),
            self.dealer.value()
        );
        self.emit(TableEvent::Settled {
            hand_id: self.hand_id,
            results: results.clone(),
        });
        results
    }

    /// Returns every placed bet and closes the hand without settling it.
    pub(crate) fn abort(&mut self, seats: &mut [Seat]) {
        let mut refunds = Vec::new();

        for seat in seats.iter_mut() {
            let Some(amount) = seat.refund() else {
                continue;
            };
            self.report(BalanceAdjustment {
                participant_id: seat.id(),
                net_amount: 0,
                reason: AdjustmentReason::Refund,
                metadata: AdjustmentMetadata {
                    table_id: self.table_id,
                    hand_id: self.hand_id,
                    bet: amount,
                    payout: amount,
                    outcome: None,
                },
            });
            refunds.push(Refund {
                participant_id: seat.id(),
                amount,
            });
        }

        log::warn!(
            "table {} hand {}: deck exhausted, refunded {} bet(s)",
            self.table_id,
            self.hand_id,
            refunds.len()
        );
        self.emit(TableEvent::HandAborted {
            hand_id: self.hand_id,
            refunds,
        });
        self.next_hand();
    }

    /// Sends one adjustment; failures are logged and announced, never retried.
    fn report(&mut self, adjustment: BalanceAdjustment) {
        if let Err(err) = self.ledger.adjust_balance(adjustment) {
            log::error!(
                "table {} hand {}: balance report for participant {} failed: {err}",
                self.table_id,
                self.hand_id,
                adjustment.participant_id
            );
            self.emit(TableEvent::BalanceReportFailed {
                participant_id: adjustment.participant_id,
                net_amount: adjustment.net_amount,
            });
        }
    }

    /// Clears the dealer and bumps the hand counter.
    pub(crate) fn next_hand(&mut self) {
        self.dealer.clear();
        self.deck = Deck::from_draws(&[]);
        self.hand_id += 1;
        self.emit(TableEvent::TableReset {
            next_hand_id: self.hand_id,
        });
    }
}
