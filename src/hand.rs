//! Hands and their blackjack value.
//!
//! A hand keeps a running hard total (every ace counted as 1) and the number
//! of aces. At most one ace can ever count as 11 without busting, so the best
//! total is the hard total plus 10 whenever that still fits under 21.

extern crate alloc;

use alloc::vec::Vec;

use crate::card::Card;

/// The value of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Valuation {
    /// Best total not above 21, or the all-aces-low total if every choice busts.
    pub total: u8,
    /// An ace is counted as 11 in `total`.
    pub soft: bool,
}

/// An ordered set of cards held by one participant.
///
/// Hands only grow by appending; they are never reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
    hard: u8,
    aces: u8,
}

impl Hand {
    /// Creates an empty hand.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cards: Vec::new(),
            hard: 0,
            aces: 0,
        }
    }

    /// Creates a hand holding `cards` in order.
    #[must_use]
    pub fn from_cards(cards: &[Card]) -> Self {
        let mut hand = Self::new();
        for &card in cards {
            hand.add_card(card);
        }
        hand
    }

    /// Appends a card.
    pub fn add_card(&mut self, card: Card) {
        if card.is_ace() {
            self.aces += 1;
            self.hard = self.hard.saturating_add(1);
        } else {
            self.hard = self.hard.saturating_add(card.points());
        }
        self.cards.push(card);
    }

    /// Returns the cards in deal order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Values the hand.
    #[must_use]
    pub const fn valuation(&self) -> Valuation {
        if self.aces > 0 && self.hard <= 11 {
            Valuation {
                total: self.hard + 10,
                soft: true,
            }
        } else {
            Valuation {
                total: self.hard,
                soft: false,
            }
        }
    }

    /// Returns the best total; see [`Valuation::total`].
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.valuation().total
    }

    /// Returns whether an ace counts as 11.
    #[must_use]
    pub const fn is_soft(&self) -> bool {
        self.valuation().soft
    }

    /// A natural: exactly two cards worth 21. Three-card 21s are not.
    #[must_use]
    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.value() == 21
    }

    /// Returns whether the hand is over 21.
    #[must_use]
    pub const fn is_bust(&self) -> bool {
        self.value() > 21
    }

    /// Returns the number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Returns whether the hand holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Empties the hand.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

/// The dealer's hand. The second card is the hole card and stays face down
/// until [`DealerHand::reveal_hole`].
///
/// Rule checks read the full hand through [`DealerHand::hand`]; only
/// [`DealerHand::visible_value`] respects the hole card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DealerHand {
    hand: Hand,
    hole_revealed: bool,
}

impl DealerHand {
    /// Creates an empty dealer hand.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            hand: Hand::new(),
            hole_revealed: false,
        }
    }

    /// Appends a card.
    pub fn add_card(&mut self, card: Card) {
        self.hand.add_card(card);
    }

    /// Returns the full hand, hole card included.
    #[must_use]
    pub const fn hand(&self) -> &Hand {
        &self.hand
    }

    /// Returns every card, hole card included.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        self.hand.cards()
    }

    /// Returns the face-up card.
    #[must_use]
    pub fn up_card(&self) -> Option<&Card> {
        self.hand.cards().first()
    }

    /// Returns whether the hole card is face up.
    #[must_use]
    pub const fn is_hole_revealed(&self) -> bool {
        self.hole_revealed
    }

    /// Turns the hole card face up.
    pub const fn reveal_hole(&mut self) {
        self.hole_revealed = true;
    }

    /// Value as the table sees it: the up card alone until the reveal.
    #[must_use]
    pub fn visible_value(&self) -> u8 {
        if self.hole_revealed {
            self.hand.value()
        } else {
            self.up_card().map_or(0, Card::points)
        }
    }

    /// Full value, hole card included.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.hand.value()
    }

    /// Returns whether an ace counts as 11.
    #[must_use]
    pub const fn is_soft(&self) -> bool {
        self.hand.is_soft()
    }

    /// Returns whether the dealer holds a natural.
    #[must_use]
    pub fn is_blackjack(&self) -> bool {
        self.hand.is_blackjack()
    }

    /// Returns whether the dealer went over 21.
    #[must_use]
    pub const fn is_bust(&self) -> bool {
        self.hand.is_bust()
    }

    /// Returns the number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.hand.len()
    }

    /// Returns whether the dealer holds no cards.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hand.is_empty()
    }

    /// Empties the hand and turns the hole card back down.
    pub fn clear(&mut self) {
        self.hand.clear();
        self.hole_revealed = false;
    }
}
