//! Per-(player, event kind) debounce
//!
//! A continuous gesture would otherwise fire every frame it is held.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::zone::PlayerId;
use crate::has_elapsed;

/// Event kinds that are debounced independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Basket,
}

#[derive(Debug, Clone, Default)]
pub struct CooldownGate {
    durations: HashMap<EventKind, f32>,
    last_fire: HashMap<(PlayerId, EventKind), f32>,
}

impl CooldownGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the cooldown for an event kind (seconds)
    pub fn with_cooldown(mut self, kind: EventKind, secs: f32) -> Self {
        self.durations.insert(kind, secs);
        self
    }

    pub fn cooldown(&self, kind: EventKind) -> f32 {
        self.durations.get(&kind).copied().unwrap_or(0.0)
    }

    /// Whether an event may fire now (does not record anything)
    pub fn allows(&self, player: PlayerId, kind: EventKind, now: f32) -> bool {
        match self.last_fire.get(&(player, kind)) {
            Some(&last) => has_elapsed(now, last, self.cooldown(kind)),
            None => true,
        }
    }

    pub fn record(&mut self, player: PlayerId, kind: EventKind, now: f32) {
        self.last_fire.insert((player, kind), now);
    }

    /// Forget all fire times (game reset)
    pub fn reset(&mut self) {
        self.last_fire.clear();
    }
}
