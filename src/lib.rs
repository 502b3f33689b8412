//! Core rules engine for the Emberfall tabletop system.
//!
//! The engine is host-agnostic: it owns the rules math (derived stats,
//! d20 checks with degrees of success, the multiple-attack penalty,
//! effect extraction from rule text, character creation, starting-gold
//! accounting) and leaves rendering, storage, and tables to whatever
//! embeds it through the [`host::GameHost`] and [`host::Catalog`]
//! traits.
//!
//! # Example
//!
//! ```no_run
//! use emberfall_core::{Actor, CheckPolicy, CombatSession, MapMode};
//! use emberfall_core::checks::resolve_item_check;
//!
//! let mut attacker = Actor::new("Brakka");
//! attacker.recompute();
//! let defender = Actor::new("Bandit");
//!
//! let sword = attacker.items.first().cloned();
//! let mut session = CombatSession::new();
//! if let Some(sword) = sword {
//!     let outcome = resolve_item_check(
//!         &attacker,
//!         &sword,
//!         &[&defender],
//!         MapMode::Auto,
//!         &mut session,
//!         &CheckPolicy::default(),
//!         &mut rand::thread_rng(),
//!     );
//!     println!("{} rolled {}", outcome.source, outcome.roll.total);
//! }
//! ```

pub mod actor;
pub mod checks;
pub mod combat;
pub mod creation;
pub mod derived;
pub mod dice;
pub mod economy;
pub mod effects;
pub mod host;
pub mod items;
pub mod persist;
pub mod skills;
pub mod testing;

pub use actor::{
    Actor, ActorId, ActorKind, Application, ApplicationScores, Axis, AxisScores, BonusTarget,
};
pub use checks::{
    classify_degree, map_penalty, resolve_check, resolve_item_check, CheckError, CheckOutcome,
    CheckPolicy, CheckSpec, Degree, MapMode, RollAction, RollOutcome,
};
pub use combat::CombatSession;
pub use creation::{
    CreationState, CreationWizard, WizardAction, WizardError, WizardOutcome, WizardSummary,
};
pub use effects::{ConditionEffect, EffectDuration, EffectProfile, NumericEffect, OutcomeEffects};
pub use host::{apply_outcome, Catalog, GameHost, HostError};
pub use items::{Item, ItemId, ItemKind};
pub use skills::Skill;
