//! Message contracts between clients and a table.
//!
//! Both enums are transport-agnostic; they serialize as internally tagged
//! JSON-style objects (`{"type": "hit", "participant_id": 3}`).

extern crate alloc;

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::card::Card;
use crate::ledger::{HandId, ParticipantId};
use crate::settlement::SettlementResult;

/// A request from a participant's client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// The participant's live client reports ready.
    Ready {
        /// Sender.
        participant_id: ParticipantId,
    },
    /// Start a shared hand with whoever in `roster` is ready.
    StartTable {
        /// Sender; must be ready.
        participant_id: ParticipantId,
        /// Candidate participants in join order.
        roster: Vec<ParticipantId>,
    },
    /// Wager on the current hand.
    Bet {
        /// Sender.
        participant_id: ParticipantId,
        /// Amount to wager.
        amount: u64,
        /// Auto-cashout multiplier some bonus games accept; ignored at blackjack.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        declared_cashout_multiplier: Option<f64>,
    },
    /// Take one more card.
    Hit {
        /// Sender.
        participant_id: ParticipantId,
    },
    /// Keep the current hand.
    Stand {
        /// Sender.
        participant_id: ParticipantId,
    },
    /// Sit this hand out.
    Skip {
        /// Sender.
        participant_id: ParticipantId,
    },
    /// Double the wager for exactly one more card.
    DoubleDown {
        /// Sender.
        participant_id: ParticipantId,
    },
}

impl InboundMessage {
    /// The participant who sent the message.
    #[must_use]
    pub const fn participant_id(&self) -> ParticipantId {
        match self {
            Self::Ready { participant_id }
            | Self::StartTable { participant_id, .. }
            | Self::Bet { participant_id, .. }
            | Self::Hit { participant_id }
            | Self::Stand { participant_id }
            | Self::Skip { participant_id }
            | Self::DoubleDown { participant_id } => *participant_id,
        }
    }
}

/// A participant's opening cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealtHand {
    /// Owner of the hand.
    pub participant_id: ParticipantId,
    /// The two opening cards.
    pub cards: Vec<Card>,
    /// Their blackjack value.
    pub value: u8,
}

/// A bet returned because the hand was aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    /// Who gets the bet back.
    pub participant_id: ParticipantId,
    /// Amount returned to the table balance.
    pub amount: u64,
}

/// A state change broadcast to everyone at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableEvent {
    /// A participant became ready.
    ParticipantReady {
        /// Who became ready.
        participant_id: ParticipantId,
        /// Ready participants known to the table so far.
        ready_count: usize,
    },
    /// Opening cards are out; the dealer's hole card stays hidden.
    HandDealt {
        /// Hand counter.
        hand_id: HandId,
        /// The dealer's face-up card.
        dealer_upcard: Card,
        /// Every participant's opening hand.
        hands: Vec<DealtHand>,
    },
    /// A wager was accepted.
    BetPlaced {
        /// Who bet.
        participant_id: ParticipantId,
        /// Total wager on the hand.
        amount: u64,
        /// Table balance after the debit.
        balance: u64,
    },
    /// A participant received a card.
    HandUpdated {
        /// Whose hand changed.
        participant_id: ParticipantId,
        /// The card received.
        new_card: Card,
        /// Hand value after the card.
        hand_value: u8,
    },
    /// The turn moved; `None` means the dealer plays next.
    TurnAdvanced {
        /// Participant now holding the turn.
        current_turn: Option<ParticipantId>,
    },
    /// The hole card is turned over.
    DealerRevealed {
        /// The dealer's cards.
        dealer_hand: Vec<Card>,
        /// Their value.
        dealer_value: u8,
    },
    /// The dealer drew a card under the house policy.
    DealerDrew {
        /// The card drawn.
        card: Card,
        /// Dealer value after the card.
        dealer_value: u8,
    },
    /// Every non-skipped participant is settled.
    #[serde(rename = "settlement_result")]
    Settled {
        /// Hand counter.
        hand_id: HandId,
        /// Per-participant results in seat order.
        results: Vec<SettlementResult>,
    },
    /// The deck ran out; bets were returned and the table reset.
    HandAborted {
        /// Hand counter.
        hand_id: HandId,
        /// Bets handed back.
        refunds: Vec<Refund>,
    },
    /// The ledger rejected a balance report.
    BalanceReportFailed {
        /// Whose report failed.
        participant_id: ParticipantId,
        /// The net amount that was not recorded.
        net_amount: i64,
    },
    /// The table is ready for the next hand.
    TableReset {
        /// Counter of the next hand.
        next_hand_id: HandId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_id_covers_every_message() {
        let messages = [
            InboundMessage::Ready { participant_id: 4 },
            InboundMessage::StartTable {
                participant_id: 4,
                roster: alloc::vec![4, 5],
            },
            InboundMessage::Bet {
                participant_id: 4,
                amount: 10,
                declared_cashout_multiplier: None,
            },
            InboundMessage::Hit { participant_id: 4 },
            InboundMessage::Stand { participant_id: 4 },
            InboundMessage::Skip { participant_id: 4 },
            InboundMessage::DoubleDown { participant_id: 4 },
        ];
        assert!(messages.iter().all(|m| m.participant_id() == 4));
    }
}
