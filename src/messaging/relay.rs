// Dance selection relay - Server side of the broadcast
// Forwards each selection unchanged to every other participant, no validation or ordering

use super::channels::{SelectionConsumer, SelectionProducer, create_selection_channel};
use crate::dance::{DanceId, PlayerId};
use ringbuf::traits::Producer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// "This player now dances X" (or stopped, when `dance` is None)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanceSelection {
    pub player: PlayerId,
    pub dance: Option<DanceId>,
}

impl DanceSelection {
    pub fn start(player: PlayerId, dance: DanceId) -> Self {
        Self {
            player,
            dance: Some(dance),
        }
    }

    pub fn stop(player: PlayerId) -> Self {
        Self {
            player,
            dance: None,
        }
    }
}

/// Fan-out of selections to connected participants
pub struct DanceRelay {
    participants: HashMap<PlayerId, SelectionProducer>,
    capacity: usize,
}

impl DanceRelay {
    pub fn new(capacity: usize) -> Self {
        Self {
            participants: HashMap::new(),
            capacity,
        }
    }

    /// Connect a participant; returns the queue its client reads from
    /// Re-joining replaces the previous queue
    pub fn join(&mut self, player: PlayerId) -> SelectionConsumer {
        let (tx, rx) = create_selection_channel(self.capacity);
        self.participants.insert(player, tx);
        tracing::debug!("{} joined the dance relay", player);
        rx
    }

    pub fn leave(&mut self, player: PlayerId) {
        self.participants.remove(&player);
    }

    /// Forward a selection to everyone except its sender
    /// Returns how many participants it was delivered to
    pub fn relay(&mut self, selection: &DanceSelection) -> usize {
        let mut delivered = 0;
        for (player, tx) in self.participants.iter_mut() {
            if *player == selection.player {
                continue;
            }
            match tx.try_push(selection.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => tracing::debug!("Queue for {} full, selection dropped", player),
            }
        }
        delivered
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }
}
