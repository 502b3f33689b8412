//! Check resolution: d20 rolls, degrees of success, and item usage.
//!
//! A check rolls one d20, adds the attribute terms the check names, and
//! classifies the total against a difficulty class into four degrees.
//! Item checks extend this with the multiple-attack penalty, damage
//! rolls, and per-outcome effect extraction from the item's rule text.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::actor::{Actor, ActorId, Application, Axis};
use crate::combat::CombatSession;
use crate::dice::DiceExpression;
use crate::effects::{extract_outcome_effects, ConditionEffect, EffectProfile, NumericEffect};
use crate::items::{Item, ItemId, ItemKind};
use crate::skills::Skill;

/// Errors surfaced when dispatching a roll action.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Actor does not own item {0}")]
    UnknownItem(ItemId),
}

/// Margin needed above the DC for a critical success.
const CRITICAL_MARGIN: i32 = 10;
/// How far below the DC still counts as a success at a cost.
const COST_MARGIN: i32 = 4;

// ============================================================================
// Degrees of success
// ============================================================================

/// The four-step outcome ladder for a resolved check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degree {
    CriticalSuccess,
    Success,
    SuccessWithCost,
    Failure,
}

impl Degree {
    pub fn is_success(self) -> bool {
        !matches!(self, Degree::Failure)
    }

    pub fn is_critical(self) -> bool {
        matches!(self, Degree::CriticalSuccess)
    }

    pub fn label(self) -> &'static str {
        match self {
            Degree::CriticalSuccess => "Critical Success",
            Degree::Success => "Success",
            Degree::SuccessWithCost => "Success at a Cost",
            Degree::Failure => "Failure",
        }
    }
}

/// Classify a check total against a difficulty class.
///
/// A missing or zero DC means the attempt cannot fail outright.
pub fn classify_degree(total: i32, dc: i32) -> Degree {
    if dc <= 0 {
        return Degree::Success;
    }
    let margin = total - dc;
    if margin >= CRITICAL_MARGIN {
        Degree::CriticalSuccess
    } else if margin >= 0 {
        Degree::Success
    } else if margin >= -COST_MARGIN {
        Degree::SuccessWithCost
    } else {
        Degree::Failure
    }
}

/// Penalty for the attack at a given penalty step (0, 1, 2+).
pub fn map_penalty(step: u32, agile: bool) -> i32 {
    match step {
        0 => 0,
        1 => {
            if agile {
                -4
            } else {
                -5
            }
        }
        _ => {
            if agile {
                -8
            } else {
                -10
            }
        }
    }
}

// ============================================================================
// Check rolls
// ============================================================================

/// One labeled additive term of a check total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollTerm {
    pub label: String,
    pub value: i32,
}

/// A resolved d20 roll with its itemized terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRoll {
    pub label: String,
    pub d20: i32,
    pub terms: Vec<RollTerm>,
    pub total: i32,
}

/// Flat penalty for rolling a skill without training.
const UNTRAINED_PENALTY: i32 = -4;

/// What to add to a d20 for a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSpec {
    pub axis: Option<Axis>,
    pub application: Option<Application>,
    pub bonus: i32,
    /// Untrained checks take a flat penalty.
    pub trained: bool,
    pub map_step: u32,
    pub agile: bool,
    pub label: String,
}

impl Default for CheckSpec {
    fn default() -> Self {
        Self {
            axis: None,
            application: None,
            bonus: 0,
            trained: true,
            map_step: 0,
            agile: false,
            label: "Check".to_string(),
        }
    }
}

/// Roll one check for the actor.
pub fn resolve_check(actor: &Actor, spec: &CheckSpec, rng: &mut impl Rng) -> CheckRoll {
    let d20 = rng.gen_range(1..=20);
    let mut terms = vec![RollTerm {
        label: "Level".to_string(),
        value: actor.level,
    }];

    if let Some(axis) = spec.axis {
        terms.push(RollTerm {
            label: axis.name().to_string(),
            value: actor.axes.get(axis),
        });
    }
    if let Some(application) = spec.application {
        terms.push(RollTerm {
            label: application.name().to_string(),
            value: actor.applications.get(application),
        });
    }
    if spec.bonus != 0 {
        terms.push(RollTerm {
            label: "Bonus".to_string(),
            value: spec.bonus,
        });
    }
    if !spec.trained {
        terms.push(RollTerm {
            label: "Untrained".to_string(),
            value: UNTRAINED_PENALTY,
        });
    }
    let penalty = map_penalty(spec.map_step, spec.agile);
    if penalty != 0 {
        terms.push(RollTerm {
            label: "Multiple attack penalty".to_string(),
            value: penalty,
        });
    }

    let total = d20 + terms.iter().map(|t| t.value).sum::<i32>();
    CheckRoll {
        label: spec.label.clone(),
        d20,
        terms,
        total,
    }
}

/// Roll a skill check using the actor's training for that skill.
pub fn resolve_skill_check(
    actor: &Actor,
    skill: Skill,
    map_step: u32,
    rng: &mut impl Rng,
) -> CheckRoll {
    let rank = actor.skills.get(&skill).copied().unwrap_or_default();
    let spec = CheckSpec {
        axis: Some(skill.axis()),
        application: Some(skill.application()),
        bonus: rank.bonus,
        trained: rank.trained,
        map_step,
        agile: false,
        label: skill.name().to_string(),
    };
    resolve_check(actor, &spec, rng)
}

/// Roll initiative: d20 plus the derived initiative value.
pub fn roll_initiative(actor: &Actor, rng: &mut impl Rng) -> CheckRoll {
    let d20 = rng.gen_range(1..=20);
    let terms = vec![RollTerm {
        label: "Initiative".to_string(),
        value: actor.derived.initiative,
    }];
    CheckRoll {
        label: "Initiative".to_string(),
        d20,
        total: d20 + actor.derived.initiative,
        terms,
    }
}

// ============================================================================
// Damage
// ============================================================================

/// A resolved damage roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRoll {
    pub formula: String,
    pub rolls: Vec<u32>,
    pub bonus: i32,
    pub total: i32,
    pub critical: bool,
}

/// Roll an item's damage, if it has a usable formula.
///
/// A critical hit doubles the whole total, flat bonus included. A
/// malformed formula is logged and treated as no damage.
pub fn resolve_damage(
    actor: &Actor,
    item: &Item,
    critical: bool,
    rng: &mut impl Rng,
) -> Option<DamageRoll> {
    let formula = item.damage_formula()?;
    let expr = match DiceExpression::parse(formula) {
        Ok(expr) => expr,
        Err(err) => {
            warn!(item = %item.name, %formula, %err, "unparsable damage formula");
            return None;
        }
    };

    let roll = expr.roll_with_rng(rng);
    let bonus = actor.bonuses.damage;
    let base = roll.total + bonus;
    Some(DamageRoll {
        formula: formula.to_string(),
        rolls: roll.rolls,
        bonus,
        total: if critical { base * 2 } else { base },
        critical,
    })
}

// ============================================================================
// Item checks
// ============================================================================

/// How the multiple-attack penalty step is chosen for an item check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MapMode {
    /// Take the step from the combat session and record the attack.
    #[default]
    Auto,
    /// Use a fixed step without touching the session.
    Manual(u32),
}

/// Toggles for outcome handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckPolicy {
    /// Whether a success at a cost still deals damage.
    pub damage_on_cost: bool,
}

impl Default for CheckPolicy {
    fn default() -> Self {
        Self {
            damage_on_cost: true,
        }
    }
}

/// The result of one item check against one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOutcome {
    pub target: ActorId,
    pub target_name: String,
    pub dc: i32,
    pub degree: Degree,
    pub damage: Option<DamageRoll>,
    pub conditions: Vec<ConditionEffect>,
    pub numeric: Vec<NumericEffect>,
}

/// The full result of a resolved check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub actor: ActorId,
    pub source: String,
    pub roll: CheckRoll,
    pub targets: Vec<TargetOutcome>,
    /// Degree against the item's own DC when rolled with no targets.
    pub unopposed: Option<Degree>,
}

/// Resolve using an item: one roll, compared per target.
///
/// Weapons and items whose roll block is flagged as an attack compare
/// against each target's armor class and accrue the multiple-attack
/// penalty; other items compare against the item's fixed DC.
pub fn resolve_item_check(
    actor: &Actor,
    item: &Item,
    targets: &[&Actor],
    map: MapMode,
    session: &mut CombatSession,
    policy: &CheckPolicy,
    rng: &mut impl Rng,
) -> CheckOutcome {
    let is_attack = item.roll.is_attack.unwrap_or_else(|| {
        matches!(
            item.kind,
            ItemKind::Weapon | ItemKind::Maneuver | ItemKind::Spell
        )
    });
    let agile = item.is_agile();

    let map_step = match map {
        MapMode::Auto => {
            if is_attack {
                session.map_step(actor.id)
            } else {
                0
            }
        }
        MapMode::Manual(step) => step.min(2),
    };

    let mut bonus = item.roll.bonus;
    if is_attack {
        bonus += actor.bonuses.attack;
    }

    let spec = CheckSpec {
        axis: Some(item.roll.axis.unwrap_or(Axis::Physical)),
        application: Some(item.roll.application.unwrap_or(Application::Conflict)),
        bonus,
        trained: true,
        map_step,
        agile,
        label: item.name.clone(),
    };
    let roll = resolve_check(actor, &spec, rng);

    if is_attack && map == MapMode::Auto {
        session.record_attack(actor.id);
    }

    let effects = extract_outcome_effects(&item.effect);
    let mut outcomes = Vec::new();
    for target in targets {
        let dc = if is_attack {
            target.derived.armor_class
        } else {
            item.dc
        };
        let degree = classify_degree(roll.total, dc);
        outcomes.push(target_outcome(
            actor, item, target, dc, degree, &effects, policy, rng,
        ));
    }

    let unopposed = if targets.is_empty() && !is_attack && item.dc > 0 {
        Some(classify_degree(roll.total, item.dc))
    } else {
        None
    };

    CheckOutcome {
        actor: actor.id,
        source: item.name.clone(),
        roll,
        targets: outcomes,
        unopposed,
    }
}

#[allow(clippy::too_many_arguments)]
fn target_outcome(
    actor: &Actor,
    item: &Item,
    target: &Actor,
    dc: i32,
    degree: Degree,
    effects: &crate::effects::OutcomeEffects,
    policy: &CheckPolicy,
    rng: &mut impl Rng,
) -> TargetOutcome {
    let empty = EffectProfile::default();
    let (damage, conditions, numeric): (Option<DamageRoll>, &EffectProfile, &EffectProfile) =
        match degree {
            Degree::Failure => (None, &empty, &empty),
            Degree::SuccessWithCost => {
                let damage = if policy.damage_on_cost {
                    resolve_damage(actor, item, false, rng)
                } else {
                    None
                };
                (damage, &effects.partial, &effects.partial)
            }
            Degree::Success => (
                resolve_damage(actor, item, false, rng),
                &effects.default,
                &effects.default,
            ),
            Degree::CriticalSuccess => {
                // each category falls back to the default text on its own:
                // a critical section naming only a condition still leaves
                // the default numeric modifiers in play
                let conditions = if effects.critical.conditions.is_empty() {
                    &effects.default
                } else {
                    &effects.critical
                };
                let numeric = if effects.critical.numeric.is_empty() {
                    &effects.default
                } else {
                    &effects.critical
                };
                (resolve_damage(actor, item, true, rng), conditions, numeric)
            }
        };

    TargetOutcome {
        target: target.id,
        target_name: target.name.clone(),
        dc,
        degree,
        damage,
        conditions: conditions.condition_effects(),
        numeric: numeric.numeric.clone(),
    }
}

// ============================================================================
// Roll actions
// ============================================================================

/// A serializable roll command, as issued by a host UI or agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RollAction {
    Check { spec: CheckSpec },
    Skill { skill: Skill, map_step: u32 },
    ItemCheck { item: ItemId, map: MapMode },
    ItemDamage { item: ItemId, critical: bool },
    Initiative,
}

/// What a dispatched roll action produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollOutcome {
    Check(CheckOutcome),
    Damage(Option<DamageRoll>),
}

/// Dispatch a roll action for the actor.
pub fn execute_roll(
    actor: &Actor,
    action: &RollAction,
    targets: &[&Actor],
    session: &mut CombatSession,
    policy: &CheckPolicy,
    rng: &mut impl Rng,
) -> Result<RollOutcome, CheckError> {
    let plain = |roll: CheckRoll| {
        RollOutcome::Check(CheckOutcome {
            actor: actor.id,
            source: roll.label.clone(),
            roll,
            targets: Vec::new(),
            unopposed: None,
        })
    };

    match action {
        RollAction::Check { spec } => Ok(plain(resolve_check(actor, spec, rng))),
        RollAction::Skill { skill, map_step } => {
            Ok(plain(resolve_skill_check(actor, *skill, *map_step, rng)))
        }
        RollAction::Initiative => Ok(plain(roll_initiative(actor, rng))),
        RollAction::ItemCheck { item, map } => {
            let item = actor.item(*item).ok_or(CheckError::UnknownItem(*item))?;
            Ok(RollOutcome::Check(resolve_item_check(
                actor, item, targets, *map, session, policy, rng,
            )))
        }
        RollAction::ItemDamage { item, critical } => {
            let item = actor.item(*item).ok_or(CheckError::UnknownItem(*item))?;
            Ok(RollOutcome::Damage(resolve_damage(
                actor, item, *critical, rng,
            )))
        }
    }
}
