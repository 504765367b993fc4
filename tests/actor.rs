//! Table actor tests. Time is paused, so timers fire as soon as the runtime idles.

#![cfg(feature = "actor")]

use std::sync::Arc;
use std::time::Duration;

use bjtable::actor::{self, TableHandle};
use bjtable::{
    ActionError, Card, Deck, InMemoryLedger, InboundMessage, MultiTable, Outcome, SingleTable,
    Suit, TableError, TableEvent, TableOptions,
};
use tokio::sync::broadcast;
use tokio::time::Instant;

const fn card(suit: Suit, rank: u8) -> Card {
    Card::new(suit, rank)
}

async fn wait_for(
    events: &mut broadcast::Receiver<TableEvent>,
    wanted: impl Fn(&TableEvent) -> bool,
) -> TableEvent {
    loop {
        let event = events.recv().await.unwrap();
        if wanted(&event) {
            return event;
        }
    }
}

fn single_table(options: TableOptions) -> (TableHandle, Arc<InMemoryLedger>) {
    let ledger = Arc::new(InMemoryLedger::new());
    ledger.open_account(1, "Ada", 100);

    let mut table = SingleTable::new(1, 1, options, 3, ledger.clone(), ledger.clone());
    table.stack_next_deck(Deck::from_draws(&[
        card(Suit::Spades, 6),
        card(Suit::Clubs, 10),
        card(Suit::Hearts, 5),
        card(Suit::Diamonds, 7),
        card(Suit::Diamonds, 9),
    ]));
    (actor::spawn(table, options), ledger)
}

const fn bet(participant_id: u32, amount: u64) -> InboundMessage {
    InboundMessage::Bet {
        participant_id,
        amount,
        declared_cashout_multiplier: None,
    }
}

#[tokio::test(start_paused = true)]
async fn stand_plays_dealer_then_resets_after_cooldown() {
    let options = TableOptions::default();
    let (handle, ledger) = single_table(options);
    let mut events = handle.subscribe();

    handle.send(bet(1, 10)).await.unwrap();
    handle
        .send(InboundMessage::Stand { participant_id: 1 })
        .await
        .unwrap();

    let TableEvent::Settled { results, .. } =
        wait_for(&mut events, |e| matches!(e, TableEvent::Settled { .. })).await
    else {
        unreachable!();
    };
    assert_eq!(results[0].outcome, Outcome::Lose);
    assert_eq!(ledger.balance(1), Some(90));

    let settled_at = Instant::now();
    let reset = wait_for(&mut events, |e| matches!(e, TableEvent::TableReset { .. })).await;
    assert_eq!(reset, TableEvent::TableReset { next_hand_id: 2 });
    assert!(settled_at.elapsed() >= options.settlement_cooldown);
}

#[tokio::test(start_paused = true)]
async fn idle_participant_is_stood_after_timeout() {
    let options = TableOptions::default().with_turn_timeout(Duration::from_secs(10));
    let (handle, _) = single_table(options);
    let mut events = handle.subscribe();

    handle.send(bet(1, 10)).await.unwrap();
    let bet_at = Instant::now();

    wait_for(&mut events, |e| matches!(e, TableEvent::DealerRevealed { .. })).await;
    assert!(bet_at.elapsed() >= Duration::from_secs(10));

    let settled = wait_for(&mut events, |e| matches!(e, TableEvent::Settled { .. })).await;
    assert!(matches!(settled, TableEvent::Settled { hand_id: 1, .. }));
}

#[tokio::test(start_paused = true)]
async fn rejected_traffic_does_not_extend_the_turn() {
    let options = TableOptions::default().with_turn_timeout(Duration::from_secs(10));
    let (handle, _) = single_table(options);
    let mut events = handle.subscribe();

    handle.send(bet(1, 10)).await.unwrap();
    let bet_at = Instant::now();

    for _ in 0..3 {
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(
            handle.send(InboundMessage::Hit { participant_id: 2 }).await,
            Err(TableError::Action(ActionError::NotYourTurn))
        );
    }

    // The window opened by the bet closed at 10s; the holder's turn is gone.
    assert_eq!(
        handle.send(InboundMessage::Hit { participant_id: 1 }).await,
        Err(TableError::Action(ActionError::WrongPhase))
    );

    wait_for(&mut events, |e| matches!(e, TableEvent::DealerRevealed { .. })).await;
    let settled = wait_for(&mut events, |e| matches!(e, TableEvent::Settled { .. })).await;
    assert!(matches!(settled, TableEvent::Settled { hand_id: 1, .. }));
    assert!(bet_at.elapsed() >= Duration::from_secs(18));
}

#[tokio::test(start_paused = true)]
async fn rejections_come_back_to_the_sender() {
    let (handle, _) = single_table(TableOptions::default());

    assert_eq!(
        handle.send(bet(2, 10)).await,
        Err(TableError::Action(ActionError::NotYourTurn))
    );
    assert_eq!(
        handle.send(InboundMessage::Hit { participant_id: 1 }).await,
        Err(TableError::Action(ActionError::WrongPhase))
    );
}

#[tokio::test(start_paused = true)]
async fn shared_table_skips_unresponsive_players() {
    let ledger = Arc::new(InMemoryLedger::new());
    ledger.open_account(1, "Ada", 100);
    ledger.open_account(2, "Bo", 100);

    let options = TableOptions::default();
    let table = MultiTable::new(9, options, 5, ledger.clone(), ledger);
    let handle = actor::spawn(table, options);
    let mut events = handle.subscribe();

    for id in [1, 2] {
        handle
            .send(InboundMessage::Ready { participant_id: id })
            .await
            .unwrap();
    }
    handle
        .send(InboundMessage::StartTable {
            participant_id: 1,
            roster: vec![1, 2],
        })
        .await
        .unwrap();

    // Nobody bets: both turns expire, the dealer reveals, and nobody is settled.
    let settled = wait_for(&mut events, |e| matches!(e, TableEvent::Settled { .. })).await;
    assert_eq!(
        settled,
        TableEvent::Settled {
            hand_id: 1,
            results: Vec::new()
        }
    );
}

#[tokio::test]
async fn closed_actor_rejects_messages() {
    let (handle, _) = single_table(TableOptions::default());

    assert!(handle.shutdown().await);
    assert_eq!(handle.send(bet(1, 10)).await, Err(TableError::Closed));

    tokio::task::yield_now().await;
    assert!(handle.is_closed());
}
