//! Character events
//!
//! One-shot notifications for audio, animation, camera and the respawn
//! sequencer. The controller publishes them on an [`EventDispatcher`] handed
//! to it at construction; listeners hold the receiving end of a channel.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use glam::Vec2;

use crate::physics::Side;

/// What happened to the character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementEvent {
    /// Ground (or coyote) jump fired
    Jumped,
    /// Entered the grounded state from the air
    Landed,
    /// Wall jump fired, launching toward `direction`
    WallJumped { direction: Side },
    /// A spring launched the character
    SpringLaunched,
    Died,
    /// The respawn point moved to `point`
    RespawnZoneEntered { point: Vec2 },
    PauseChanged { paused: bool },
}

/// Identifies which character an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CharacterId(pub u32);

/// An event stamped with its source and the simulation tick it happened on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterEvent {
    pub character: CharacterId,
    pub tick: u64,
    pub event: MovementEvent,
}

/// Fan-out of character events to any number of listeners.
///
/// Cloning a dispatcher shares the listener list, so a scene can keep one
/// handle and give clones to its characters.
#[derive(Debug, Clone, Default)]
pub struct EventDispatcher {
    subscribers: Arc<Mutex<Vec<Sender<CharacterEvent>>>>,
}

static_assertions::assert_impl_all!(EventDispatcher: Send, Sync);

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Dropping the receiver unsubscribes it.
    pub fn subscribe(&self) -> Receiver<CharacterEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(tx);
        rx
    }

    /// Send `event` to every live listener.
    pub fn publish(&self, event: CharacterEvent) {
        let mut subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        subscribers.retain(|tx| tx.send(event).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
