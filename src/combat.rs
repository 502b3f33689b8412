//! Per-turn combat bookkeeping.
//!
//! Tracks how many attacks each actor has made this turn so the
//! multiple-attack penalty can be applied automatically. The host calls
//! [`CombatSession::reset_turn`] from its turn-change hook.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::actor::ActorId;

/// Attack counters for one encounter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatSession {
    attacks: HashMap<ActorId, u32>,
}

impl CombatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one attack for the actor and return the count after it.
    pub fn record_attack(&mut self, actor: ActorId) -> u32 {
        let count = self.attacks.entry(actor).or_insert(0);
        *count += 1;
        *count
    }

    /// Clear the actor's counter at the start of their turn. Idempotent.
    pub fn reset_turn(&mut self, actor: ActorId) {
        self.attacks.remove(&actor);
    }

    /// Clear every counter (end of encounter).
    pub fn reset_all(&mut self) {
        self.attacks.clear();
    }

    /// Attacks the actor has already made this turn.
    pub fn attacks_this_turn(&self, actor: ActorId) -> u32 {
        self.attacks.get(&actor).copied().unwrap_or(0)
    }

    /// The penalty step for the actor's next attack, capped at the
    /// third-attack tier.
    pub fn map_step(&self, actor: ActorId) -> u32 {
        self.attacks_this_turn(actor).min(2)
    }
}
