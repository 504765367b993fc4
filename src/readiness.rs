//! Merges "ready" signals from independent sources into one roster.
//!
//! A participant counts as ready once any source has said so, and stays ready
//! until the table clears the registry at the end of the hand. Merging is an
//! idempotent OR, so signals may arrive in any order and any number of times.

extern crate alloc;

use alloc::vec::Vec;
#[cfg(all(not(feature = "std"), feature = "alloc"))]
use hashbrown::HashMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::StartError;
use crate::ledger::ParticipantId;
use crate::sync::Mutex;

/// Where a ready signal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadySource {
    /// Broadcast by the participant's client while connected.
    LiveEvent,
    /// Session-scoped flag persisted by the client.
    SessionCache,
    /// Device-scoped flag persisted by the client.
    DeviceCache,
}

impl ReadySource {
    const fn bit(self) -> u8 {
        match self {
            Self::LiveEvent => 0b001,
            Self::SessionCache => 0b010,
            Self::DeviceCache => 0b100,
        }
    }
}

/// Readiness for one shared table.
#[derive(Debug, Default)]
pub struct ReadinessRegistry {
    flags: Mutex<HashMap<ParticipantId, u8>>,
}

impl ReadinessRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flags: Mutex::new(HashMap::new()),
        }
    }

    /// Records that `source` reports `id` as ready.
    ///
    /// Returns `true` if this made the participant ready for the first time.
    pub fn mark_ready(&self, id: ParticipantId, source: ReadySource) -> bool {
        let newly_ready = self.flags.with(|flags| {
            let entry = flags.entry(id).or_insert(0);
            let was_ready = *entry != 0;
            *entry |= source.bit();
            !was_ready
        });

        if newly_ready {
            log::debug!("participant {id} ready via {source:?}");
        }
        newly_ready
    }

    /// Returns whether any source has reported `id` as ready.
    pub fn is_ready(&self, id: ParticipantId) -> bool {
        self.flags
            .with(|flags| flags.get(&id).is_some_and(|bits| *bits != 0))
    }

    /// Returns whether `source` specifically has reported `id` as ready.
    pub fn reported_by(&self, id: ParticipantId, source: ReadySource) -> bool {
        self.flags
            .with(|flags| flags.get(&id).is_some_and(|bits| bits & source.bit() != 0))
    }

    /// Counts the distinct ready participants in `roster`.
    pub fn ready_count(&self, roster: &[ParticipantId]) -> usize {
        self.ready_in(roster).len()
    }

    /// Returns the ready participants of `roster`, in roster order, without duplicates.
    pub fn ready_in(&self, roster: &[ParticipantId]) -> Vec<ParticipantId> {
        let mut ready: Vec<ParticipantId> = Vec::with_capacity(roster.len());
        self.flags.with(|flags| {
            for id in roster {
                if flags.get(id).is_some_and(|bits| *bits != 0) && !ready.contains(id) {
                    ready.push(*id);
                }
            }
        });
        ready
    }

    /// Evaluates the start gate against the current signals.
    ///
    /// Returns the ready participants in roster order when `initiator` is
    /// ready and their count is within `min..=max`.
    ///
    /// # Errors
    ///
    /// Returns [`StartError::NotReady`] if the initiator is not ready, or
    /// [`StartError::RosterSizeInvalid`] if the count is out of range.
    pub fn start_gate(
        &self,
        roster: &[ParticipantId],
        initiator: ParticipantId,
        min: usize,
        max: usize,
    ) -> Result<Vec<ParticipantId>, StartError> {
        let ready = self.ready_in(roster);

        if !ready.contains(&initiator) {
            return Err(StartError::NotReady);
        }
        if ready.len() < min || ready.len() > max {
            return Err(StartError::RosterSizeInvalid { ready: ready.len() });
        }

        Ok(ready)
    }

    /// Forgets every signal for `ids`.
    pub fn clear(&self, ids: &[ParticipantId]) {
        self.flags.with(|flags| {
            for id in ids {
                flags.remove(id);
            }
        });
    }
}
