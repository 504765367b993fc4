//! Tokio host for a table.
//!
//! A [`TableActor`] owns one [`TableEngine`] and is its only writer. Clients
//! talk to it through a cloneable [`TableHandle`]: requests go through an
//! `mpsc` inbox and are answered on a `oneshot`, and every state change is
//! broadcast as a [`TableEvent`].
//!
//! Besides applying requests the actor keeps the table moving on its own:
//! it expires the current turn after [`TableOptions::turn_timeout`], plays the
//! dealer as soon as the last participant is done, and resets a settled table
//! after [`TableOptions::settlement_cooldown`].

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Instant, sleep_until};

use crate::error::TableError;
use crate::events::{InboundMessage, TableEvent};
use crate::ledger::ParticipantId;
use crate::options::TableOptions;
use crate::table::{PhaseKind, TableEngine};

const INBOX_CAPACITY: usize = 100;

/// A command for a running actor.
#[derive(Debug)]
pub enum ActorCommand {
    /// Apply a client message and report the outcome.
    Message {
        /// The request.
        message: InboundMessage,
        /// Receives `Ok` or the rejection reason.
        response: oneshot::Sender<Result<(), TableError>>,
    },
    /// Stop the actor after the commands already queued.
    Shutdown,
}

/// Client side of a running table.
#[derive(Debug, Clone)]
pub struct TableHandle {
    sender: mpsc::Sender<ActorCommand>,
    events: broadcast::Sender<TableEvent>,
}

impl TableHandle {
    /// Sends a message and waits for the table's verdict.
    ///
    /// # Errors
    ///
    /// Returns the table's rejection, or [`TableError::Closed`] if the actor
    /// has stopped.
    pub async fn send(&self, message: InboundMessage) -> Result<(), TableError> {
        let (response, verdict) = oneshot::channel();
        self.sender
            .send(ActorCommand::Message { message, response })
            .await
            .map_err(|_| TableError::Closed)?;

        verdict.await.map_err(|_| TableError::Closed)?
    }

    /// Subscribes to events broadcast from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TableEvent> {
        self.events.subscribe()
    }

    /// Asks the actor to stop. Returns `false` if it was already gone.
    pub async fn shutdown(&self) -> bool {
        self.sender.send(ActorCommand::Shutdown).await.is_ok()
    }

    /// Returns whether the actor is still running.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Serializes every request for one table.
pub struct TableActor<T> {
    engine: T,
    inbox: mpsc::Receiver<ActorCommand>,
    events: broadcast::Sender<TableEvent>,
    options: TableOptions,
    turn_deadline: Option<(ParticipantId, Instant)>,
    reset_at: Option<Instant>,
}

impl<T: TableEngine> TableActor<T> {
    /// Wraps `engine` and returns the actor with a handle to it.
    #[must_use]
    pub fn new(engine: T, options: TableOptions) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let (events, _) = broadcast::channel(options.event_capacity.max(1));

        let handle = TableHandle {
            sender,
            events: events.clone(),
        };
        let actor = Self {
            engine,
            inbox,
            events,
            options,
            turn_deadline: None,
            reset_at: None,
        };
        (actor, handle)
    }

    /// Runs until shut down or until every handle is dropped.
    pub async fn run(mut self) {
        log::info!("table actor starting");
        self.sync(false);

        loop {
            let deadline = self.next_deadline();
            let wake = deadline.unwrap_or_else(Instant::now);

            tokio::select! {
                command = self.inbox.recv() => match command {
                    Some(ActorCommand::Message { message, response }) => {
                        let holder = self.engine.current_turn();
                        let sender = message.participant_id();

                        let result = self.engine.handle(message);
                        if let Err(err) = &result {
                            log::warn!("rejected message from {sender}: {err}");
                        }
                        let acted = result.is_ok() && holder == Some(sender);
                        // The caller may have given up waiting.
                        let _ = response.send(result);
                        self.sync(acted);
                    }
                    Some(ActorCommand::Shutdown) | None => break,
                },
                () = sleep_until(wake), if deadline.is_some() => self.on_deadline(),
            }
        }

        log::info!("table actor stopped");
    }

    fn next_deadline(&self) -> Option<Instant> {
        match (self.reset_at, self.turn_deadline) {
            (Some(reset), _) => Some(reset),
            (None, Some((_, turn))) => Some(turn),
            (None, None) => None,
        }
    }

    fn on_deadline(&mut self) {
        let now = Instant::now();

        if self.reset_at.is_some_and(|at| at <= now) {
            self.reset_at = None;
            self.engine.reset();
        } else if let Some((id, at)) = self.turn_deadline
            && at <= now
        {
            self.turn_deadline = None;
            if self.engine.expire_turn().is_none() {
                log::debug!("turn deadline for {id} had nothing to expire");
            }
        }
        self.sync(false);
    }

    /// Drives automatic transitions, rearms timers, and publishes events.
    ///
    /// The turn window restarts when the turn changes hands, or when `acted`
    /// says the holder just made a successful move and kept the turn. Other
    /// traffic leaves the running window alone.
    fn sync(&mut self, acted: bool) {
        if self.engine.phase_kind() == PhaseKind::DealerTurn
            && let Err(err) = self.engine.play_dealer()
        {
            log::error!("dealer play failed: {err}");
        }

        match self.engine.phase_kind() {
            PhaseKind::Settled => {
                if self.reset_at.is_none() {
                    self.reset_at = Some(Instant::now() + self.options.settlement_cooldown);
                }
            }
            PhaseKind::Idle | PhaseKind::PlayerTurns | PhaseKind::DealerTurn => {
                self.reset_at = None;
            }
        }

        self.turn_deadline = match self.engine.current_turn() {
            Some(id) => match self.turn_deadline {
                Some((holder, at)) if holder == id && !acted => Some((holder, at)),
                _ => Some((id, Instant::now() + self.options.turn_timeout)),
            },
            None => None,
        };

        for event in self.engine.drain_events() {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }
}

/// Spawns an actor for `engine` on the current runtime.
#[must_use]
pub fn spawn<T>(engine: T, options: TableOptions) -> TableHandle
where
    T: TableEngine + 'static,
{
    let (actor, handle) = TableActor::new(engine, options);
    tokio::spawn(actor.run());
    handle
}
