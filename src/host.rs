//! The host boundary: persistence, effect application, and catalogs.
//!
//! The rules engine is host-agnostic. Whatever embeds it (a virtual
//! tabletop, a test harness, a server) implements [`GameHost`] to
//! persist actors and apply outcomes, and [`Catalog`] to supply the
//! content packs the creation wizard draws from.

use async_trait::async_trait;
use thiserror::Error;

use crate::actor::{Actor, ActorId};
use crate::checks::CheckOutcome;
use crate::effects::{ConditionEffect, NumericEffect};
use crate::items::{Item, ItemKind};

/// Errors crossing the host boundary.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Actor not found: {0}")]
    ActorNotFound(ActorId),
    #[error("Catalog entry not found: {0}")]
    EntryNotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Side effects the engine asks its host to perform.
#[async_trait]
pub trait GameHost: Send {
    /// Write the actor's current state to durable storage.
    async fn persist_actor(&mut self, actor: &Actor) -> Result<(), HostError>;

    /// Apply a condition to a target actor.
    async fn apply_condition(
        &mut self,
        target: ActorId,
        effect: &ConditionEffect,
    ) -> Result<(), HostError>;

    /// Apply numeric modifiers to a target actor.
    async fn apply_numeric_effects(
        &mut self,
        target: ActorId,
        effects: &[NumericEffect],
    ) -> Result<(), HostError>;

    /// Publish a resolved check outcome (chat log, event bus, ...).
    async fn post_outcome(&mut self, outcome: &CheckOutcome) -> Result<(), HostError>;
}

/// A read-only source of content-pack items.
pub trait Catalog {
    /// All entries of one kind.
    fn entries(&self, kind: ItemKind) -> Vec<Item>;

    /// Look up an entry by kind and name.
    fn find(&self, kind: ItemKind, name: &str) -> Option<Item>;

    /// Look up an entry and copy it as a fresh owned instance.
    fn instantiate(&self, kind: ItemKind, name: &str) -> Option<Item> {
        self.find(kind, name).map(|item| item.instantiate())
    }
}

/// Apply a resolved outcome through the host: conditions and numeric
/// modifiers for every successful target, then the outcome itself.
pub async fn apply_outcome<H: GameHost>(
    host: &mut H,
    outcome: &CheckOutcome,
) -> Result<(), HostError> {
    for target in &outcome.targets {
        if !target.degree.is_success() {
            continue;
        }
        for condition in &target.conditions {
            host.apply_condition(target.target, condition).await?;
        }
        if !target.numeric.is_empty() {
            host.apply_numeric_effects(target.target, &target.numeric)
                .await?;
        }
    }
    host.post_outcome(outcome).await
}
