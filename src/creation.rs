//! The eight-step character creation wizard.
//!
//! Creation is a state machine stored in the actor's flag store, so a
//! half-built character survives a reload and resumes at the same step.
//! Every mutation validates against a candidate state first and commits
//! only on success; a rejected command leaves the actor untouched.
//!
//! The steps:
//! 1. attribute pools, 2. ancestry, 3. background, 4. class,
//! 5. maneuvers, 6. starting spell (casters), 7. equipment, 8. review.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::actor::{Actor, Application, ApplicationScores, Axis, AxisScores, BonusTarget};
use crate::derived;
use crate::economy::{self, STARTING_GOLD};
use crate::host::{Catalog, GameHost, HostError};
use crate::items::{Item, ItemId, ItemKind};

/// Each attribute pool distributes this many points.
pub const POOL_TOTAL: i32 = 6;
/// Smallest value a pool entry may take.
pub const POOL_MIN: i32 = 1;
/// Largest value a pool entry may take.
pub const POOL_MAX: i32 = 3;
/// Highest effective score at level one, ancestry bonuses included.
pub const LEVEL_ONE_CAP: i32 = 4;

pub const FIRST_STEP: u8 = 1;
pub const LAST_STEP: u8 = 8;

pub const ANCESTRY_TRAITS_REQUIRED: usize = 3;
pub const BACKGROUND_TALENTS_REQUIRED: usize = 1;
pub const CLASS_TALENTS_REQUIRED: usize = 2;

/// Flag key holding the in-progress creation state.
pub const CREATION_FLAG: &str = "creation";
/// Flag key marking a finished character.
pub const CREATION_COMPLETE_FLAG: &str = "creation_complete";

/// Class-name fragments that mark a class as a caster even when its
/// energy base is zero in a sparse content pack.
const CASTER_CLASS_KEYWORDS: [&str; 9] = [
    "mage",
    "wizard",
    "sorcer",
    "witch",
    "warlock",
    "cleric",
    "druid",
    "oracle",
    "thaumaturge",
];

// ============================================================================
// State
// ============================================================================

/// The wizard's persistent state, stored in the actor's flag store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreationState {
    pub step: u8,
    pub base_axes: AxisScores,
    pub base_applications: ApplicationScores,
    pub ancestry_primary: Option<BonusTarget>,
    pub ancestry_extra: Option<Application>,
}

impl Default for CreationState {
    fn default() -> Self {
        Self {
            step: FIRST_STEP,
            base_axes: AxisScores::new(2, 2, 2),
            base_applications: ApplicationScores::new(2, 2, 2),
            ancestry_primary: None,
            ancestry_extra: None,
        }
    }
}

impl CreationState {
    /// Load the state from the actor, or start fresh.
    pub fn load(actor: &Actor) -> Self {
        actor.get_flag(CREATION_FLAG).unwrap_or_default()
    }

    /// Store the state on the actor.
    pub fn store(&self, actor: &mut Actor) {
        actor.set_flag(CREATION_FLAG, self);
    }

    /// Axis scores with the ancestry bonus applied.
    pub fn effective_axes(&self) -> AxisScores {
        let mut axes = self.base_axes;
        if let Some(BonusTarget::Axis(axis)) = self.ancestry_primary {
            axes.set(axis, axes.get(axis) + 1);
        }
        axes
    }

    /// Application scores with ancestry bonuses applied.
    pub fn effective_applications(&self) -> ApplicationScores {
        let mut apps = self.base_applications;
        if let Some(BonusTarget::Application(app)) = self.ancestry_primary {
            apps.set(app, apps.get(app) + 1);
        }
        if let Some(app) = self.ancestry_extra {
            apps.set(app, apps.get(app) + 1);
        }
        apps
    }
}

/// Which attribute pool a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolKind {
    Axes,
    Applications,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PoolKind::Axes => "axes",
            PoolKind::Applications => "applications",
        })
    }
}

/// The singleton selections of steps two through four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SingletonKind {
    Ancestry,
    Background,
    Class,
}

impl SingletonKind {
    fn item_kind(self) -> ItemKind {
        match self {
            SingletonKind::Ancestry => ItemKind::Ancestry,
            SingletonKind::Background => ItemKind::Background,
            SingletonKind::Class => ItemKind::Class,
        }
    }
}

impl fmt::Display for SingletonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.item_kind().name())
    }
}

/// The repeatable selections of steps two through six.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceKind {
    AncestryTrait,
    BackgroundTalent,
    ClassTalent,
    Maneuver,
    Spell,
}

impl ChoiceKind {
    fn item_kind(self) -> ItemKind {
        match self {
            ChoiceKind::AncestryTrait => ItemKind::Trait,
            ChoiceKind::BackgroundTalent | ChoiceKind::ClassTalent => ItemKind::Talent,
            ChoiceKind::Maneuver => ItemKind::Maneuver,
            ChoiceKind::Spell => ItemKind::Spell,
        }
    }
}

impl fmt::Display for ChoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChoiceKind::AncestryTrait => "ancestry trait",
            ChoiceKind::BackgroundTalent => "background talent",
            ChoiceKind::ClassTalent => "class talent",
            ChoiceKind::Maneuver => "maneuver",
            ChoiceKind::Spell => "spell",
        })
    }
}

// ============================================================================
// Errors and requirements
// ============================================================================

/// Why a wizard command was rejected.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("The {pool} pool must total {expected}, got {got}")]
    PoolSum {
        pool: PoolKind,
        expected: i32,
        got: i32,
    },
    #[error("{pool} entry {key} is {value}, allowed range {min}..={max}")]
    PoolEntry {
        pool: PoolKind,
        key: String,
        value: i32,
        min: i32,
        max: i32,
    },
    #[error("{target} would exceed the level-one cap of {cap}")]
    CapExceeded { target: String, cap: i32 },
    #[error("No ancestry selected")]
    NoAncestry,
    #[error("Ancestry {ancestry} does not allow that primary bonus")]
    BonusNotAllowed { ancestry: String },
    #[error("Ancestry {ancestry} grants no extra application bonus")]
    ExtraBonusNotAvailable { ancestry: String },
    #[error("{name} is already selected")]
    DuplicateSelection { name: String },
    #[error("At most {max} {kind} selections allowed")]
    ChoiceLimit { kind: ChoiceKind, max: usize },
    #[error("Step {step} incomplete: {requirement}")]
    StepIncomplete {
        step: u8,
        requirement: StepRequirement,
    },
    #[error("Spending {spent:.1} gold exceeds the budget of {budget:.1}")]
    BudgetExceeded { spent: f64, budget: f64 },
    #[error("Missing prerequisite: {what}")]
    MissingPrerequisite { what: String },
    #[error("Actor does not own item {0}")]
    UnknownItem(ItemId),
    #[error(transparent)]
    Host(#[from] HostError),
}

/// What a step still needs before it counts as complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "requirement", rename_all = "snake_case")]
pub enum StepRequirement {
    AttributePools,
    AncestryChoice,
    AncestryPrimaryBonus,
    AncestryExtraBonus,
    AncestryTraits { have: usize, need: usize },
    BackgroundChoice,
    BackgroundTalent { have: usize, need: usize },
    ClassChoice,
    ClassPassive,
    ClassTalents { have: usize, need: usize },
    Maneuvers { axis: Axis, have: usize, need: usize },
    StartingSpell,
    StartingEquipment,
    GoldBudget { spent: f64, budget: f64 },
}

impl fmt::Display for StepRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepRequirement::AttributePools => write!(f, "distribute both attribute pools"),
            StepRequirement::AncestryChoice => write!(f, "choose an ancestry"),
            StepRequirement::AncestryPrimaryBonus => write!(f, "choose the ancestry bonus"),
            StepRequirement::AncestryExtraBonus => {
                write!(f, "choose the extra application bonus")
            }
            StepRequirement::AncestryTraits { have, need } => {
                write!(f, "select ancestry traits ({have}/{need})")
            }
            StepRequirement::BackgroundChoice => write!(f, "choose a background"),
            StepRequirement::BackgroundTalent { have, need } => {
                write!(f, "select background talents ({have}/{need})")
            }
            StepRequirement::ClassChoice => write!(f, "choose a class"),
            StepRequirement::ClassPassive => write!(f, "class passive feature missing"),
            StepRequirement::ClassTalents { have, need } => {
                write!(f, "select class talents ({have}/{need})")
            }
            StepRequirement::Maneuvers { axis, have, need } => {
                write!(f, "select {axis} maneuvers ({have}/{need})")
            }
            StepRequirement::StartingSpell => write!(f, "select a starting spell"),
            StepRequirement::StartingEquipment => write!(f, "buy starting equipment"),
            StepRequirement::GoldBudget { spent, budget } => {
                write!(f, "equipment costs {spent:.1} gold, budget is {budget:.1}")
            }
        }
    }
}

// ============================================================================
// Step predicates
// ============================================================================

fn validate_pool(
    pool: PoolKind,
    entries: &[(String, i32)],
    total: i32,
) -> Result<(), WizardError> {
    for (key, value) in entries {
        if !(POOL_MIN..=POOL_MAX).contains(value) {
            return Err(WizardError::PoolEntry {
                pool,
                key: key.clone(),
                value: *value,
                min: POOL_MIN,
                max: POOL_MAX,
            });
        }
    }
    if total != POOL_TOTAL {
        return Err(WizardError::PoolSum {
            pool,
            expected: POOL_TOTAL,
            got: total,
        });
    }
    Ok(())
}

fn validate_caps(state: &CreationState) -> Result<(), WizardError> {
    for (axis, value) in state.effective_axes().entries() {
        if value > LEVEL_ONE_CAP {
            return Err(WizardError::CapExceeded {
                target: axis.name().to_string(),
                cap: LEVEL_ONE_CAP,
            });
        }
    }
    for (app, value) in state.effective_applications().entries() {
        if value > LEVEL_ONE_CAP {
            return Err(WizardError::CapExceeded {
                target: app.name().to_string(),
                cap: LEVEL_ONE_CAP,
            });
        }
    }
    Ok(())
}

fn pools_valid(state: &CreationState) -> bool {
    let axes = state.base_axes;
    let apps = state.base_applications;
    axes.total() == POOL_TOTAL
        && apps.total() == POOL_TOTAL
        && axes
            .entries()
            .iter()
            .all(|(_, v)| (POOL_MIN..=POOL_MAX).contains(v))
        && apps
            .entries()
            .iter()
            .all(|(_, v)| (POOL_MIN..=POOL_MAX).contains(v))
}

fn count_sourced(actor: &Actor, kind: ItemKind, source: &str) -> usize {
    actor
        .items_of_kind(kind)
        .filter(|i| i.source.eq_ignore_ascii_case(source))
        .count()
}

fn is_caster(actor: &Actor) -> bool {
    match actor.class_item() {
        Some(class) => {
            class.class_data.base_energy > 0
                || CASTER_CLASS_KEYWORDS
                    .iter()
                    .any(|k| class.name.to_lowercase().contains(k))
        }
        None => false,
    }
}

/// Check one step's completion predicate.
pub fn check_step(actor: &Actor, state: &CreationState, step: u8) -> Result<(), StepRequirement> {
    match step {
        1 => {
            if pools_valid(state) {
                Ok(())
            } else {
                Err(StepRequirement::AttributePools)
            }
        }
        2 => {
            let ancestry = actor
                .ancestry_item()
                .ok_or(StepRequirement::AncestryChoice)?;
            if state.ancestry_primary.is_none() {
                return Err(StepRequirement::AncestryPrimaryBonus);
            }
            if ancestry.ancestry.extra_application && state.ancestry_extra.is_none() {
                return Err(StepRequirement::AncestryExtraBonus);
            }
            let have = actor.items_of_kind(ItemKind::Trait).count();
            if have < ANCESTRY_TRAITS_REQUIRED {
                return Err(StepRequirement::AncestryTraits {
                    have,
                    need: ANCESTRY_TRAITS_REQUIRED,
                });
            }
            Ok(())
        }
        3 => {
            if actor.details.background.is_empty() {
                return Err(StepRequirement::BackgroundChoice);
            }
            let have = count_sourced(actor, ItemKind::Talent, &actor.details.background);
            if have < BACKGROUND_TALENTS_REQUIRED {
                return Err(StepRequirement::BackgroundTalent {
                    have,
                    need: BACKGROUND_TALENTS_REQUIRED,
                });
            }
            Ok(())
        }
        4 => {
            if actor.class_item().is_none() {
                return Err(StepRequirement::ClassChoice);
            }
            if count_sourced(actor, ItemKind::Feature, &actor.details.class) == 0 {
                return Err(StepRequirement::ClassPassive);
            }
            let have = count_sourced(actor, ItemKind::Talent, &actor.details.class);
            if have < CLASS_TALENTS_REQUIRED {
                return Err(StepRequirement::ClassTalents {
                    have,
                    need: CLASS_TALENTS_REQUIRED,
                });
            }
            Ok(())
        }
        5 => {
            let axes = state.effective_axes();
            for (axis, score) in axes.entries() {
                let need = score.max(0) as usize;
                let have = actor
                    .items_of_kind(ItemKind::Maneuver)
                    .filter(|i| i.roll.axis == Some(axis))
                    .count();
                if have < need {
                    return Err(StepRequirement::Maneuvers { axis, have, need });
                }
            }
            Ok(())
        }
        6 => {
            if is_caster(actor) && actor.items_of_kind(ItemKind::Spell).count() == 0 {
                return Err(StepRequirement::StartingSpell);
            }
            Ok(())
        }
        7 => {
            if !actor.items.iter().any(|i| i.kind.is_gear()) {
                return Err(StepRequirement::StartingEquipment);
            }
            let spent = economy::spent_gold(&actor.items);
            if !economy::within_budget(spent) {
                return Err(StepRequirement::GoldBudget {
                    spent,
                    budget: STARTING_GOLD,
                });
            }
            Ok(())
        }
        _ => {
            for s in FIRST_STEP..LAST_STEP {
                check_step(actor, state, s)?;
            }
            Ok(())
        }
    }
}

/// Whether a step's predicate currently holds.
pub fn step_complete(actor: &Actor, state: &CreationState, step: u8) -> bool {
    check_step(actor, state, step).is_ok()
}

// ============================================================================
// The wizard
// ============================================================================

/// What a wizard command did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WizardOutcome {
    /// Navigation landed on a step.
    Moved { step: u8 },
    /// Forward navigation stopped at an incomplete step.
    Halted {
        step: u8,
        requirement: StepRequirement,
    },
    /// A selection was applied.
    Applied { warnings: Vec<String> },
    /// The command named no candidate.
    Cancelled,
    /// Creation is complete.
    Finished,
}

/// A serializable wizard command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
pub enum WizardAction {
    Advance,
    Retreat,
    GoToStep(u8),
    ApplyPools {
        axes: AxisScores,
        applications: ApplicationScores,
    },
    SetPrimaryBonus(BonusTarget),
    SetExtraBonus(Application),
    SelectSingleton {
        kind: SingletonKind,
        candidate: Option<Item>,
    },
    AddChoice {
        kind: ChoiceKind,
        candidate: Option<Item>,
    },
    BuyEquipment(Option<Item>),
    RemoveEquipment(ItemId),
    Finish,
}

/// Drives one actor through creation against a host and a catalog.
pub struct CreationWizard<'a, H: GameHost, C: Catalog> {
    actor: &'a mut Actor,
    host: &'a mut H,
    catalog: &'a C,
    state: CreationState,
}

impl<'a, H: GameHost, C: Catalog> CreationWizard<'a, H, C> {
    /// Open the wizard, resuming any stored state.
    pub fn new(actor: &'a mut Actor, host: &'a mut H, catalog: &'a C) -> Self {
        let state = CreationState::load(actor);
        Self {
            actor,
            host,
            catalog,
            state,
        }
    }

    pub fn state(&self) -> &CreationState {
        &self.state
    }

    pub fn actor(&self) -> &Actor {
        self.actor
    }

    async fn persist(&mut self) -> Result<(), WizardError> {
        self.state.store(self.actor);
        derived::recompute(self.actor);
        self.host.persist_actor(self.actor).await?;
        Ok(())
    }

    fn sync_scores(&mut self) {
        self.actor.axes = self.state.effective_axes();
        self.actor.applications = self.state.effective_applications();
    }

    /// Dispatch a serialized command.
    pub async fn apply(&mut self, action: WizardAction) -> Result<WizardOutcome, WizardError> {
        match action {
            WizardAction::Advance => self.advance().await,
            WizardAction::Retreat => self.retreat().await,
            WizardAction::GoToStep(step) => self.go_to_step(step).await,
            WizardAction::ApplyPools { axes, applications } => {
                self.apply_pools(axes, applications).await
            }
            WizardAction::SetPrimaryBonus(target) => self.set_primary_bonus(target).await,
            WizardAction::SetExtraBonus(app) => self.set_extra_bonus(app).await,
            WizardAction::SelectSingleton { kind, candidate } => {
                self.select_singleton(kind, candidate).await
            }
            WizardAction::AddChoice { kind, candidate } => self.add_choice(kind, candidate).await,
            WizardAction::BuyEquipment(candidate) => self.buy_equipment(candidate).await,
            WizardAction::RemoveEquipment(id) => self.remove_equipment(id).await,
            WizardAction::Finish => self.finish().await,
        }
    }

    /// Move to the next step if the current step is complete.
    pub async fn advance(&mut self) -> Result<WizardOutcome, WizardError> {
        let step = self.state.step;
        if let Err(requirement) = check_step(self.actor, &self.state, step) {
            return Err(WizardError::StepIncomplete { step, requirement });
        }
        self.state.step = (step + 1).min(LAST_STEP);
        self.persist().await?;
        Ok(WizardOutcome::Moved {
            step: self.state.step,
        })
    }

    /// Move back one step; always allowed.
    pub async fn retreat(&mut self) -> Result<WizardOutcome, WizardError> {
        self.state.step = self.state.step.saturating_sub(1).max(FIRST_STEP);
        self.persist().await?;
        Ok(WizardOutcome::Moved {
            step: self.state.step,
        })
    }

    /// Jump to a step. Backward jumps are unconditional; a forward jump
    /// validates every step along the way and halts at the first
    /// incomplete one, leaving the wizard parked there.
    pub async fn go_to_step(&mut self, step: u8) -> Result<WizardOutcome, WizardError> {
        let step = step.clamp(FIRST_STEP, LAST_STEP);
        if step > self.state.step {
            for s in self.state.step..step {
                if let Err(requirement) = check_step(self.actor, &self.state, s) {
                    self.state.step = s;
                    self.persist().await?;
                    return Ok(WizardOutcome::Halted {
                        step: s,
                        requirement,
                    });
                }
            }
        }
        self.state.step = step;
        self.persist().await?;
        Ok(WizardOutcome::Moved { step })
    }

    /// Distribute both attribute pools at once.
    pub async fn apply_pools(
        &mut self,
        axes: AxisScores,
        applications: ApplicationScores,
    ) -> Result<WizardOutcome, WizardError> {
        let axis_entries: Vec<(String, i32)> = axes
            .entries()
            .iter()
            .map(|(a, v)| (a.name().to_string(), *v))
            .collect();
        validate_pool(PoolKind::Axes, &axis_entries, axes.total())?;

        let app_entries: Vec<(String, i32)> = applications
            .entries()
            .iter()
            .map(|(a, v)| (a.name().to_string(), *v))
            .collect();
        validate_pool(PoolKind::Applications, &app_entries, applications.total())?;

        let mut candidate = self.state.clone();
        candidate.base_axes = axes;
        candidate.base_applications = applications;
        validate_caps(&candidate)?;

        self.state = candidate;
        self.sync_scores();
        self.persist().await?;
        Ok(WizardOutcome::Applied {
            warnings: Vec::new(),
        })
    }

    /// Pick the primary ancestry bonus from the ancestry's allowed targets.
    pub async fn set_primary_bonus(
        &mut self,
        target: BonusTarget,
    ) -> Result<WizardOutcome, WizardError> {
        let ancestry = self.actor.ancestry_item().ok_or(WizardError::NoAncestry)?;
        if !ancestry.ancestry.primary_options.contains(&target) {
            return Err(WizardError::BonusNotAllowed {
                ancestry: ancestry.name.clone(),
            });
        }

        let mut candidate = self.state.clone();
        candidate.ancestry_primary = Some(target);
        validate_caps(&candidate)?;

        self.state = candidate;
        self.sync_scores();
        self.persist().await?;
        Ok(WizardOutcome::Applied {
            warnings: Vec::new(),
        })
    }

    /// Pick the extra application bonus, for ancestries that grant one.
    pub async fn set_extra_bonus(
        &mut self,
        application: Application,
    ) -> Result<WizardOutcome, WizardError> {
        let ancestry = self.actor.ancestry_item().ok_or(WizardError::NoAncestry)?;
        if !ancestry.ancestry.extra_application {
            return Err(WizardError::ExtraBonusNotAvailable {
                ancestry: ancestry.name.clone(),
            });
        }

        let mut candidate = self.state.clone();
        candidate.ancestry_extra = Some(application);
        validate_caps(&candidate)?;

        self.state = candidate;
        self.sync_scores();
        self.persist().await?;
        Ok(WizardOutcome::Applied {
            warnings: Vec::new(),
        })
    }

    /// Replace a singleton selection, cascading away everything the old
    /// selection granted.
    pub async fn select_singleton(
        &mut self,
        kind: SingletonKind,
        candidate: Option<Item>,
    ) -> Result<WizardOutcome, WizardError> {
        let Some(candidate) = candidate else {
            return Ok(WizardOutcome::Cancelled);
        };

        let item_kind = kind.item_kind();
        let mut warnings = Vec::new();

        match kind {
            SingletonKind::Ancestry => {
                self.actor
                    .items
                    .retain(|i| i.kind != item_kind && i.kind != ItemKind::Trait);
                self.state.ancestry_primary = None;
                self.state.ancestry_extra = None;
                self.actor.details.ancestry = candidate.name.clone();
            }
            SingletonKind::Background => {
                let old = self.actor.details.background.clone();
                self.actor.items.retain(|i| {
                    i.kind != item_kind
                        && !(i.kind == ItemKind::Talent && i.source.eq_ignore_ascii_case(&old))
                });
                self.actor.details.background = candidate.name.clone();
            }
            SingletonKind::Class => {
                let old = self.actor.details.class.clone();
                self.actor.items.retain(|i| {
                    let granted = matches!(
                        i.kind,
                        ItemKind::Feature | ItemKind::Ability | ItemKind::Talent
                    ) && i.source.eq_ignore_ascii_case(&old);
                    i.kind != item_kind && !granted
                });
                self.actor.details.class = candidate.name.clone();

                let passive_name = format!("{} Passive", candidate.name);
                match self.catalog.instantiate(ItemKind::Feature, &passive_name) {
                    Some(mut passive) => {
                        passive.source = candidate.name.clone();
                        self.actor.items.push(passive);
                    }
                    None => {
                        warn!(class = %candidate.name, "no passive feature in catalog");
                        warnings.push(format!("No passive feature found for {}", candidate.name));
                    }
                }
            }
        }

        self.actor.items.push(candidate.instantiate());
        self.sync_scores();
        self.persist().await?;
        Ok(WizardOutcome::Applied { warnings })
    }

    /// Add one repeatable selection, enforcing prerequisites, duplicate
    /// names, and per-kind limits.
    pub async fn add_choice(
        &mut self,
        kind: ChoiceKind,
        candidate: Option<Item>,
    ) -> Result<WizardOutcome, WizardError> {
        let Some(candidate) = candidate else {
            return Ok(WizardOutcome::Cancelled);
        };

        let (source, limit) = match kind {
            ChoiceKind::AncestryTrait => {
                let ancestry = self
                    .actor
                    .ancestry_item()
                    .ok_or_else(|| WizardError::MissingPrerequisite {
                        what: "ancestry".to_string(),
                    })?;
                (ancestry.name.clone(), Some(ANCESTRY_TRAITS_REQUIRED))
            }
            ChoiceKind::BackgroundTalent => {
                if self.actor.details.background.is_empty() {
                    return Err(WizardError::MissingPrerequisite {
                        what: "background".to_string(),
                    });
                }
                (
                    self.actor.details.background.clone(),
                    Some(BACKGROUND_TALENTS_REQUIRED),
                )
            }
            ChoiceKind::ClassTalent => {
                if self.actor.class_item().is_none() {
                    return Err(WizardError::MissingPrerequisite {
                        what: "class".to_string(),
                    });
                }
                (self.actor.details.class.clone(), Some(CLASS_TALENTS_REQUIRED))
            }
            ChoiceKind::Maneuver | ChoiceKind::Spell => (String::new(), None),
        };

        let item_kind = kind.item_kind();
        let duplicate = self
            .actor
            .items_of_kind(item_kind)
            .any(|i| i.name.eq_ignore_ascii_case(&candidate.name));
        if duplicate {
            return Err(WizardError::DuplicateSelection {
                name: candidate.name.clone(),
            });
        }

        if let Some(max) = limit {
            let have = if source.is_empty() {
                self.actor.items_of_kind(item_kind).count()
            } else {
                count_sourced(self.actor, item_kind, &source)
            };
            if have >= max {
                return Err(WizardError::ChoiceLimit { kind, max });
            }
        }

        let mut owned = candidate.instantiate();
        owned.source = source;
        self.actor.items.push(owned);
        self.persist().await?;
        Ok(WizardOutcome::Applied {
            warnings: Vec::new(),
        })
    }

    /// Buy one equipment item against the starting-gold budget.
    pub async fn buy_equipment(
        &mut self,
        candidate: Option<Item>,
    ) -> Result<WizardOutcome, WizardError> {
        let Some(candidate) = candidate else {
            return Ok(WizardOutcome::Cancelled);
        };

        let cost = economy::price_to_gold(&candidate.price) * candidate.quantity.max(1) as f64;
        let spent = economy::spent_gold(&self.actor.items);
        if spent + cost > STARTING_GOLD {
            return Err(WizardError::BudgetExceeded {
                spent: spent + cost,
                budget: STARTING_GOLD,
            });
        }

        self.actor.items.push(candidate.instantiate());
        self.persist().await?;
        Ok(WizardOutcome::Applied {
            warnings: Vec::new(),
        })
    }

    /// Remove a purchased item by id.
    pub async fn remove_equipment(&mut self, id: ItemId) -> Result<WizardOutcome, WizardError> {
        let position = self
            .actor
            .items
            .iter()
            .position(|i| i.id == id)
            .ok_or(WizardError::UnknownItem(id))?;
        self.actor.items.remove(position);
        self.persist().await?;
        Ok(WizardOutcome::Applied {
            warnings: Vec::new(),
        })
    }

    /// Validate every step and mark the character complete.
    pub async fn finish(&mut self) -> Result<WizardOutcome, WizardError> {
        for step in FIRST_STEP..LAST_STEP {
            if let Err(requirement) = check_step(self.actor, &self.state, step) {
                self.state.step = step;
                self.persist().await?;
                return Ok(WizardOutcome::Halted { step, requirement });
            }
        }

        self.state.step = LAST_STEP;
        self.actor.set_flag(CREATION_COMPLETE_FLAG, true);
        self.persist().await?;
        Ok(WizardOutcome::Finished)
    }

    /// A read-only snapshot for rendering the wizard UI.
    pub fn summary(&self) -> WizardSummary {
        let axes = self.state.base_axes;
        let apps = self.state.base_applications;
        let actor = &*self.actor;

        let steps = (FIRST_STEP..=LAST_STEP)
            .map(|step| {
                let missing = check_step(actor, &self.state, step).err();
                StepStatus {
                    step,
                    complete: missing.is_none(),
                    missing,
                }
            })
            .collect();

        let effective_axes = self.state.effective_axes();
        let maneuvers_by_axis = Axis::all()
            .into_iter()
            .map(|axis| ManeuverCount {
                axis,
                owned: actor
                    .items_of_kind(ItemKind::Maneuver)
                    .filter(|i| i.roll.axis == Some(axis))
                    .count(),
                required: effective_axes.get(axis).max(0) as usize,
            })
            .collect();

        let spent = economy::spent_gold(&actor.items);
        let equipment = actor
            .items
            .iter()
            .filter(|i| i.kind.is_gear())
            .map(|i| EquipmentLine {
                id: i.id,
                name: i.name.clone(),
                quantity: i.quantity,
                price_gold: economy::price_to_gold(&i.price),
            })
            .collect();

        WizardSummary {
            step: self.state.step,
            axis_pool: PoolSummary {
                allocated: axes.total(),
                remaining: POOL_TOTAL - axes.total(),
                valid: pools_valid(&self.state),
            },
            application_pool: PoolSummary {
                allocated: apps.total(),
                remaining: POOL_TOTAL - apps.total(),
                valid: pools_valid(&self.state),
            },
            steps,
            ancestry: non_empty(&actor.details.ancestry),
            background: non_empty(&actor.details.background),
            class: non_empty(&actor.details.class),
            ancestry_profile: actor.ancestry_item().map(|i| i.ancestry.clone()),
            primary_bonus: self.state.ancestry_primary,
            extra_bonus: self.state.ancestry_extra,
            maneuvers_by_axis,
            spells: actor
                .items_of_kind(ItemKind::Spell)
                .map(|i| i.name.clone())
                .collect(),
            equipment,
            spent_gold: spent,
            budget: STARTING_GOLD,
            remaining_gold: STARTING_GOLD - spent,
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

// ============================================================================
// Summary types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSummary {
    pub allocated: i32,
    pub remaining: i32,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepStatus {
    pub step: u8,
    pub complete: bool,
    pub missing: Option<StepRequirement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverCount {
    pub axis: Axis,
    pub owned: usize,
    pub required: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentLine {
    pub id: ItemId,
    pub name: String,
    pub quantity: u32,
    pub price_gold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardSummary {
    pub step: u8,
    pub axis_pool: PoolSummary,
    pub application_pool: PoolSummary,
    pub steps: Vec<StepStatus>,
    pub ancestry: Option<String>,
    pub background: Option<String>,
    pub class: Option<String>,
    pub ancestry_profile: Option<crate::items::AncestryData>,
    pub primary_bonus: Option<BonusTarget>,
    pub extra_bonus: Option<Application>,
    pub maneuvers_by_axis: Vec<ManeuverCount>,
    pub spells: Vec<String>,
    pub equipment: Vec<EquipmentLine>,
    pub spent_gold: f64,
    pub budget: f64,
    pub remaining_gold: f64,
}
