//! The dealer's fixed drawing policy.
//!
//! The policy is a pure function of the dealer's hand, so a presentation layer
//! can step it one card at a time and pace the draws however it likes.

extern crate alloc;

use alloc::vec::Vec;

use crate::card::Card;
use crate::deck::Deck;
use crate::error::DeckExhausted;
use crate::hand::DealerHand;
use crate::options::TableOptions;

/// What the dealer does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealerAction {
    /// Take another card.
    Draw,
    /// Stop drawing.
    Stand,
}

/// Result of a single dealer step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DealerStep {
    /// The dealer drew this card and may draw again.
    Drew(Card),
    /// The dealer stands; the hand is final.
    Done,
}

/// Draws below 17 and stands at 17 or higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DealerPolicy {
    stand_on_soft_17: bool,
}

impl Default for DealerPolicy {
    fn default() -> Self {
        Self {
            stand_on_soft_17: true,
        }
    }
}

impl DealerPolicy {
    /// Creates a policy; when `stand_on_soft_17` is false the dealer also hits soft 17.
    #[must_use]
    pub const fn new(stand_on_soft_17: bool) -> Self {
        Self { stand_on_soft_17 }
    }

    /// Creates the policy configured by `options`.
    #[must_use]
    pub const fn from_options(options: &TableOptions) -> Self {
        Self::new(options.stand_on_soft_17)
    }

    /// Decides the dealer's next action from the current hand alone.
    #[must_use]
    pub fn next_action(&self, dealer: &DealerHand) -> DealerAction {
        let value = dealer.value();

        if value > 17 {
            return DealerAction::Stand;
        }
        if value == 17 && (!dealer.is_soft() || self.stand_on_soft_17) {
            return DealerAction::Stand;
        }

        DealerAction::Draw
    }

    /// Advances the dealer by at most one card.
    ///
    /// # Errors
    ///
    /// Returns [`DeckExhausted`] if the dealer must draw from an empty deck.
    pub fn step(&self, dealer: &mut DealerHand, deck: &mut Deck) -> Result<DealerStep, DeckExhausted> {
        match self.next_action(dealer) {
            DealerAction::Stand => Ok(DealerStep::Done),
            DealerAction::Draw => {
                let card = deck.draw()?;
                dealer.add_card(card);
                Ok(DealerStep::Drew(card))
            }
        }
    }

    /// Plays the dealer's hand to completion and returns the cards drawn.
    ///
    /// # Errors
    ///
    /// Returns [`DeckExhausted`] if the dealer must draw from an empty deck.
    pub fn play(&self, dealer: &mut DealerHand, deck: &mut Deck) -> Result<Vec<Card>, DeckExhausted> {
        let mut drawn = Vec::new();
        while let DealerStep::Drew(card) = self.step(dealer, deck)? {
            drawn.push(card);
        }
        Ok(drawn)
    }
}
