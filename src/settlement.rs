//! Hand outcomes and payouts.

extern crate alloc;

use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::hand::{DealerHand, Hand};
use crate::ledger::ParticipantId;
use crate::options::{RoundingMode, TableOptions};

#[cfg(feature = "std")]
fn round_amount(amount: f64, mode: RoundingMode) -> u64 {
    match mode {
        RoundingMode::Up => amount.ceil() as u64,
        RoundingMode::Down => amount.floor() as u64,
        RoundingMode::Nearest => amount.round() as u64,
    }
}

#[cfg(all(not(feature = "std"), feature = "alloc"))]
fn round_amount(amount: f64, mode: RoundingMode) -> u64 {
    match mode {
        RoundingMode::Up => libm::ceil(amount) as u64,
        RoundingMode::Down => libm::floor(amount) as u64,
        RoundingMode::Nearest => libm::round(amount) as u64,
    }
}

/// Largest accepted wager.
///
/// A doubled wager at this size still pays out, and reports its net change,
/// within `i64`.
pub const MAX_STAKE: u64 = u64::MAX >> 3;

/// Result of a single hand against the dealer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Player beats the dealer or the dealer busts.
    Win,
    /// Player busts, the dealer has a higher value, or the dealer has a natural.
    Lose,
    /// Equal values; the stake is returned.
    Push,
    /// Player's natural beats a dealer without one.
    Blackjack,
}

/// Settlement of one participant's hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementResult {
    /// The participant this result belongs to.
    pub participant_id: ParticipantId,
    /// The outcome of the hand.
    pub outcome: Outcome,
    /// The amount wagered, including any double.
    pub bet: u64,
    /// The amount paid back to the participant, stake included.
    pub payout: u64,
    /// The participant's final hand value.
    pub player_value: u8,
    /// The dealer's final hand value.
    pub dealer_value: u8,
}

impl SettlementResult {
    /// Balance change to report to the ledger: `payout - bet`, clamped to `i64`.
    #[must_use]
    pub fn net(&self) -> i64 {
        let net = i128::from(self.payout) - i128::from(self.bet);
        i64::try_from(net).unwrap_or(if net < 0 { i64::MIN } else { i64::MAX })
    }
}

/// Computes outcomes and payouts against a final dealer hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettlementEngine {
    blackjack_pays: f64,
    rounding: RoundingMode,
}

impl Default for SettlementEngine {
    fn default() -> Self {
        Self::from_options(&TableOptions::default())
    }
}

impl SettlementEngine {
    /// Creates the engine configured by `options`.
    #[must_use]
    pub const fn from_options(options: &TableOptions) -> Self {
        Self {
            blackjack_pays: options.blackjack_pays,
            rounding: options.rounding_blackjack,
        }
    }

    /// Decides the outcome of `player` against `dealer`.
    #[must_use]
    pub fn outcome(&self, player: &Hand, dealer: &DealerHand) -> Outcome {
        let player_blackjack = player.is_blackjack();
        let dealer_blackjack = dealer.is_blackjack();

        if player.is_bust() {
            Outcome::Lose
        } else if player_blackjack && !dealer_blackjack {
            Outcome::Blackjack
        } else if dealer_blackjack && !player_blackjack {
            Outcome::Lose
        } else if dealer.is_bust() || player.value() > dealer.value() {
            Outcome::Win
        } else if player.value() == dealer.value() {
            Outcome::Push
        } else {
            Outcome::Lose
        }
    }

    /// Total amount returned for `outcome` on a wager of `bet`.
    #[must_use]
    pub fn payout(&self, outcome: Outcome, bet: u64) -> u64 {
        match outcome {
            Outcome::Lose => 0,
            Outcome::Push => bet,
            Outcome::Win => bet.saturating_mul(2),
            Outcome::Blackjack => {
                #[expect(
                    clippy::cast_precision_loss,
                    reason = "f64 has sufficient precision for table stakes"
                )]
                let winnings = (bet as f64) * self.blackjack_pays;
                bet.saturating_add(round_amount(winnings, self.rounding))
            }
        }
    }

    /// Settles one participant's hand.
    #[must_use]
    pub fn settle(
        &self,
        participant_id: ParticipantId,
        player: &Hand,
        dealer: &DealerHand,
        bet: u64,
    ) -> SettlementResult {
        let outcome = self.outcome(player, dealer);
        SettlementResult {
            participant_id,
            outcome,
            bet,
            payout: self.payout(outcome, bet),
            player_value: player.value(),
            dealer_value: dealer.value(),
        }
    }

    /// Settles every `(participant, hand, bet)` against the same dealer hand.
    pub fn settle_all<'a, I>(&self, dealer: &DealerHand, hands: I) -> Vec<SettlementResult>
    where
        I: IntoIterator<Item = (ParticipantId, &'a Hand, u64)>,
    {
        hands
            .into_iter()
            .map(|(id, hand, bet)| self.settle(id, hand, dealer, bet))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Suit};

    fn hand(ranks: &[u8]) -> Hand {
        let cards: Vec<Card> = ranks.iter().map(|&r| Card::new(Suit::Hearts, r)).collect();
        Hand::from_cards(&cards)
    }

    fn dealer(ranks: &[u8]) -> DealerHand {
        let mut dealer = DealerHand::new();
        for &rank in ranks {
            dealer.add_card(Card::new(Suit::Clubs, rank));
        }
        dealer
    }

    #[test]
    fn outcome_table() {
        let engine = SettlementEngine::default();
        let cases: [(&[u8], &[u8], Outcome); 8] = [
            (&[10, 9, 5], &[10, 6, 10], Outcome::Lose),
            (&[1, 13], &[9, 8], Outcome::Blackjack),
            (&[1, 13], &[1, 12], Outcome::Push),
            (&[7, 7, 7], &[1, 10], Outcome::Lose),
            (&[10, 8], &[10, 6, 9], Outcome::Win),
            (&[10, 8], &[10, 7], Outcome::Win),
            (&[10, 7], &[9, 8], Outcome::Push),
            (&[10, 7], &[10, 9], Outcome::Lose),
        ];

        for (player, dealer_cards, expected) in cases {
            assert_eq!(
                engine.outcome(&hand(player), &dealer(dealer_cards)),
                expected,
                "player {player:?} vs dealer {dealer_cards:?}"
            );
        }
    }

    #[test]
    fn payouts_and_net() {
        let engine = SettlementEngine::default();
        assert_eq!(engine.payout(Outcome::Win, 10), 20);
        assert_eq!(engine.payout(Outcome::Blackjack, 10), 25);
        assert_eq!(engine.payout(Outcome::Blackjack, 5), 12);
        assert_eq!(engine.payout(Outcome::Push, 10), 10);
        assert_eq!(engine.payout(Outcome::Lose, 10), 0);

        let result = engine.settle(1, &hand(&[1, 13]), &dealer(&[9, 8]), 10);
        assert_eq!(result.net(), 15);
        let push = engine.settle(1, &hand(&[10, 7]), &dealer(&[9, 8]), 10);
        assert_eq!(push.net(), 0);
    }

    #[test]
    fn large_stakes_do_not_overflow() {
        let engine = SettlementEngine::default();
        let bet = 6_000_000_000_000_000_000;

        let win = engine.settle(1, &hand(&[10, 9]), &dealer(&[10, 8]), bet);
        assert_eq!(win.outcome, Outcome::Win);
        assert_eq!(win.payout, 12_000_000_000_000_000_000);
        assert_eq!(win.net(), 6_000_000_000_000_000_000);

        let lose = engine.settle(1, &hand(&[10, 7]), &dealer(&[10, 8]), u64::MAX);
        assert_eq!(lose.net(), i64::MIN);
        assert_eq!(engine.payout(Outcome::Win, u64::MAX), u64::MAX);
        assert_eq!(engine.payout(Outcome::Blackjack, u64::MAX), u64::MAX);

        let doubled = engine.payout(Outcome::Win, 2 * MAX_STAKE);
        assert!(i64::try_from(doubled).is_ok());
    }

    #[test]
    fn blackjack_rounding_follows_options() {
        let options = TableOptions::default().with_rounding_blackjack(RoundingMode::Up);
        let engine = SettlementEngine::from_options(&options);
        assert_eq!(engine.payout(Outcome::Blackjack, 5), 13);
    }
}
