//! Property tests for hand valuation, dealer play, dealing, and payouts.

use std::collections::HashSet;
use std::sync::Arc;

use bjtable::{
    Card, DealerHand, DealerPolicy, DealerStep, Deck, Hand, InMemoryLedger, MultiPhase,
    MultiTable, Outcome, ParticipantId, ReadinessRegistry, ReadySource, Seat, SettlementEngine,
    Suit, TableEngine, TableError, TableEvent, TableOptions, TurnState,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn card_strategy() -> impl Strategy<Value = Card> {
    (1u8..=13, prop::sample::select(Suit::ALL.to_vec()))
        .prop_map(|(rank, suit)| Card::new(suit, rank))
}

fn source_strategy() -> impl Strategy<Value = ReadySource> {
    prop::sample::select(vec![
        ReadySource::LiveEvent,
        ReadySource::SessionCache,
        ReadySource::DeviceCache,
    ])
}

fn seated_table(seed: u64, ids: &[ParticipantId]) -> MultiTable {
    let ledger = Arc::new(InMemoryLedger::new());
    for &id in ids {
        ledger.open_account(id, "p", 100);
    }

    let options = TableOptions::default().with_players(1, 4);
    let mut table = MultiTable::new(1, options, seed, ledger.clone(), ledger);
    for &id in ids {
        table.ready(id);
    }
    table.start(ids[0], ids).unwrap();
    table
}

fn held_cards(table: &MultiTable) -> Vec<Card> {
    table
        .seats()
        .iter()
        .flat_map(|s| s.hand().cards().iter().copied())
        .chain(table.dealer_hand().cards().iter().copied())
        .collect()
}

/// Deck plus every hand is the full deck, with no card held twice.
fn conserves(table: &MultiTable) -> bool {
    let held = held_cards(table);
    let unique: HashSet<_> = held.iter().collect();
    unique.len() == held.len() && held.len() + table.cards_remaining() == 52
}

fn turns(events: &[TableEvent]) -> Vec<Option<ParticipantId>> {
    events
        .iter()
        .filter_map(|event| match event {
            TableEvent::TurnAdvanced { current_turn } => Some(*current_turn),
            _ => None,
        })
        .collect()
}

/// Best total: as many aces as possible count 11 without going over 21.
fn best_total(cards: &[Card]) -> u32 {
    let hard: u32 = cards
        .iter()
        .map(|c| if c.is_ace() { 1 } else { u32::from(c.points()) })
        .sum();
    let aces = cards.iter().filter(|c| c.is_ace()).count() as u32;

    (0..=aces)
        .map(|soft| hard + 10 * soft)
        .filter(|&total| total <= 21)
        .max()
        .unwrap_or(hard)
}

proptest! {
    #[test]
    fn hand_value_is_best_ace_assignment(cards in prop::collection::vec(card_strategy(), 1..=8)) {
        let hand = Hand::from_cards(&cards);
        prop_assert_eq!(u32::from(hand.value()), best_total(&cards));
    }

    #[test]
    fn blackjack_needs_exactly_two_cards(cards in prop::collection::vec(card_strategy(), 2..=5)) {
        let hand = Hand::from_cards(&cards);
        prop_assert_eq!(hand.is_blackjack(), cards.len() == 2 && hand.value() == 21);
    }

    #[test]
    fn dealer_draws_below_17_and_stops_at_17(seed in any::<u64>()) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut deck = Deck::shuffled(&mut rng);
        let mut dealer = DealerHand::new();
        dealer.add_card(deck.draw().unwrap());
        dealer.add_card(deck.draw().unwrap());
        dealer.reveal_hole();

        let policy = DealerPolicy::default();
        loop {
            let before = dealer.value();
            match policy.step(&mut dealer, &mut deck).unwrap() {
                DealerStep::Drew(_) => prop_assert!(before < 17),
                DealerStep::Done => {
                    prop_assert!(dealer.value() >= 17);
                    break;
                }
            }
        }
    }

    #[test]
    fn cards_are_conserved_through_a_hand(
        seed in any::<u64>(),
        players in 1u32..=4,
        hits in prop::collection::vec(any::<bool>(), 0..32),
    ) {
        let ids: Vec<_> = (1..=players).collect();
        let mut table = seated_table(seed, &ids);

        prop_assert_eq!(held_cards(&table).len(), 2 * (ids.len() + 1));
        prop_assert!(conserves(&table));

        let mut hits = hits.into_iter();
        while let Some(id) = table.current_turn() {
            let result = match table.seat(id).map(Seat::turn_state) {
                Some(TurnState::Waiting) => table.bet(id, 10).map_err(TableError::from),
                _ if hits.next().unwrap_or(false) => {
                    table.hit(id).map(drop).map_err(TableError::from)
                }
                _ => table.stand(id).map_err(TableError::from),
            };
            prop_assert!(result.is_ok(), "{:?}", result);
            prop_assert!(conserves(&table));
        }

        while table.phase() == MultiPhase::DealerTurn {
            table.dealer_step().unwrap();
            prop_assert!(conserves(&table));
        }
        prop_assert_eq!(table.phase(), MultiPhase::Settlement);
    }

    #[test]
    fn turns_visit_unfinished_seats_once_in_join_order(
        seed in any::<u64>(),
        decisions in prop::collection::vec(any::<bool>(), 1..=4),
        hits in prop::collection::vec(any::<bool>(), 0..24),
    ) {
        let ids: Vec<ParticipantId> = (1..=4).take(decisions.len()).collect();
        let mut table = seated_table(seed, &ids);

        for (&id, &bets) in ids.iter().zip(&decisions) {
            prop_assert_eq!(table.current_turn(), Some(id));
            if bets {
                table.bet(id, 10).unwrap();
            } else {
                table.skip(id).unwrap();
            }
        }

        // Naturals stand at the bet, so only these still act.
        let acting: Vec<_> = table
            .seats()
            .iter()
            .filter(|s| s.turn_state() == TurnState::Acting)
            .map(Seat::id)
            .collect();

        let mut hits = hits.into_iter();
        while let Some(id) = table.current_turn() {
            if hits.next().unwrap_or(false) {
                table.hit(id).unwrap();
            } else {
                table.stand(id).unwrap();
            }
        }

        let expected: Vec<_> = ids
            .iter()
            .chain(&acting)
            .map(|&id| Some(id))
            .chain([None])
            .collect();
        prop_assert_eq!(turns(&table.drain_events()), expected);
        prop_assert_eq!(table.phase(), MultiPhase::DealerTurn);
    }

    #[test]
    fn payouts_match_outcome_multipliers(bet in 1u64..1_000_000) {
        let engine = SettlementEngine::default();
        prop_assert_eq!(engine.payout(Outcome::Win, bet), 2 * bet);
        prop_assert_eq!(engine.payout(Outcome::Blackjack, bet), bet * 5 / 2);
        prop_assert_eq!(engine.payout(Outcome::Push, bet), bet);
        prop_assert_eq!(engine.payout(Outcome::Lose, bet), 0);
    }

    #[test]
    fn readiness_is_sticky_in_any_order(sources in prop::collection::vec(source_strategy(), 1..8)) {
        let registry = ReadinessRegistry::new();
        for source in sources {
            registry.mark_ready(7, source);
            prop_assert!(registry.is_ready(7));
            prop_assert_eq!(registry.ready_count(&[7, 8]), 1);
        }
    }
}
