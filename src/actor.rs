//! Actor entities: characters, NPCs, and monsters.
//!
//! An actor owns its items exclusively and carries a small namespaced
//! flag store used for creation state and other host-scoped values.
//! Derived fields are recomputed by [`crate::derived`] whenever base
//! fields or owned items change.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::items::{Item, ItemKind};
use crate::skills::Skill;

/// Unique identifier for an actor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct ActorId(pub Uuid);

impl ActorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of record an actor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActorKind {
    #[default]
    Character,
    Npc,
    Monster,
}

/// One of the three broad attribute axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Physical,
    Mental,
    Social,
}

impl Axis {
    pub fn name(self) -> &'static str {
        match self {
            Axis::Physical => "Physical",
            Axis::Mental => "Mental",
            Axis::Social => "Social",
        }
    }

    pub fn all() -> [Axis; 3] {
        [Axis::Physical, Axis::Mental, Axis::Social]
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the three cross-cutting skill applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Application {
    Conflict,
    Interaction,
    Resistance,
}

impl Application {
    pub fn name(self) -> &'static str {
        match self {
            Application::Conflict => "Conflict",
            Application::Interaction => "Interaction",
            Application::Resistance => "Resistance",
        }
    }

    pub fn all() -> [Application; 3] {
        [
            Application::Conflict,
            Application::Interaction,
            Application::Resistance,
        ]
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A creation bonus targets exactly one axis or one application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BonusTarget {
    Axis(Axis),
    Application(Application),
}

impl fmt::Display for BonusTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BonusTarget::Axis(a) => f.write_str(a.name()),
            BonusTarget::Application(a) => f.write_str(a.name()),
        }
    }
}

/// The three axis scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisScores {
    pub physical: i32,
    pub mental: i32,
    pub social: i32,
}

impl Default for AxisScores {
    fn default() -> Self {
        Self {
            physical: 1,
            mental: 1,
            social: 1,
        }
    }
}

impl AxisScores {
    pub fn new(physical: i32, mental: i32, social: i32) -> Self {
        Self {
            physical,
            mental,
            social,
        }
    }

    pub fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Physical => self.physical,
            Axis::Mental => self.mental,
            Axis::Social => self.social,
        }
    }

    pub fn set(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::Physical => self.physical = value,
            Axis::Mental => self.mental = value,
            Axis::Social => self.social = value,
        }
    }

    pub fn total(&self) -> i32 {
        self.physical + self.mental + self.social
    }

    pub fn entries(&self) -> [(Axis, i32); 3] {
        [
            (Axis::Physical, self.physical),
            (Axis::Mental, self.mental),
            (Axis::Social, self.social),
        ]
    }
}

/// The three application scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationScores {
    pub conflict: i32,
    pub interaction: i32,
    pub resistance: i32,
}

impl Default for ApplicationScores {
    fn default() -> Self {
        Self {
            conflict: 1,
            interaction: 1,
            resistance: 1,
        }
    }
}

impl ApplicationScores {
    pub fn new(conflict: i32, interaction: i32, resistance: i32) -> Self {
        Self {
            conflict,
            interaction,
            resistance,
        }
    }

    pub fn get(&self, application: Application) -> i32 {
        match application {
            Application::Conflict => self.conflict,
            Application::Interaction => self.interaction,
            Application::Resistance => self.resistance,
        }
    }

    pub fn set(&mut self, application: Application, value: i32) {
        match application {
            Application::Conflict => self.conflict = value,
            Application::Interaction => self.interaction = value,
            Application::Resistance => self.resistance = value,
        }
    }

    pub fn total(&self) -> i32 {
        self.conflict + self.interaction + self.resistance
    }

    pub fn entries(&self) -> [(Application, i32); 3] {
        [
            (Application::Conflict, self.conflict),
            (Application::Interaction, self.interaction),
            (Application::Resistance, self.resistance),
        ]
    }
}

/// A depletable resource pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Resource {
    pub value: i32,
    pub max: i32,
}

impl Resource {
    /// A pool filled to its maximum.
    pub fn full(max: i32) -> Self {
        Self { value: max, max }
    }
}

/// The actor's three resource pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Resources {
    pub hp: Resource,
    pub vigor: Resource,
    pub energy: Resource,
}

/// Training state and flat bonus for one skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SkillRank {
    pub trained: bool,
    pub bonus: i32,
}

/// Flat situational bonuses applied to attack and damage totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CombatBonuses {
    pub attack: i32,
    pub damage: i32,
}

/// Names of the actor's singleton selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ActorDetails {
    pub ancestry: String,
    pub class: String,
    pub background: String,
}

/// The four-value difficulty table for the actor's tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DcTable {
    pub mundane: i32,
    pub challenging: i32,
    pub legendary: i32,
    pub divine: i32,
}

impl Default for DcTable {
    fn default() -> Self {
        Self {
            mundane: 12,
            challenging: 15,
            legendary: 20,
            divine: 25,
        }
    }
}

/// Fields recomputed from base attributes and owned items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub tier: u8,
    pub armor_class: i32,
    pub initiative: i32,
    pub save_dc: i32,
    pub dc_table: DcTable,
    pub carry_max: i32,
    pub carry_slots: u32,
}

impl Default for DerivedStats {
    fn default() -> Self {
        Self {
            tier: 1,
            armor_class: 10,
            initiative: 0,
            save_dc: 10,
            dc_table: DcTable::default(),
            carry_max: 0,
            carry_slots: 0,
        }
    }
}

/// A character, NPC, or monster record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    #[serde(default)]
    pub kind: ActorKind,
    pub level: i32,
    #[serde(default)]
    pub axes: AxisScores,
    #[serde(default)]
    pub applications: ApplicationScores,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub skills: BTreeMap<Skill, SkillRank>,
    #[serde(default)]
    pub bonuses: CombatBonuses,
    /// Base movement in meters.
    #[serde(default = "default_movement")]
    pub movement: i32,
    #[serde(default)]
    pub details: ActorDetails,
    #[serde(default)]
    pub derived: DerivedStats,
    #[serde(default)]
    pub items: Vec<Item>,
    /// Namespaced key-value store scoped to this actor.
    #[serde(default)]
    pub flags: BTreeMap<String, Value>,
}

fn default_movement() -> i32 {
    9
}

impl Actor {
    /// Create a fresh level-1 actor with baseline scores.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            kind: ActorKind::Character,
            level: 1,
            axes: AxisScores::default(),
            applications: ApplicationScores::default(),
            resources: Resources::default(),
            skills: BTreeMap::new(),
            bonuses: CombatBonuses::default(),
            movement: default_movement(),
            details: ActorDetails::default(),
            derived: DerivedStats::default(),
            items: Vec::new(),
            flags: BTreeMap::new(),
        }
    }

    /// Iterate over owned items of one kind.
    pub fn items_of_kind(&self, kind: ItemKind) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |i| i.kind == kind)
    }

    /// The actor's sole class item, if one is owned.
    pub fn class_item(&self) -> Option<&Item> {
        self.items_of_kind(ItemKind::Class).next()
    }

    /// The actor's sole ancestry item, if one is owned.
    pub fn ancestry_item(&self) -> Option<&Item> {
        self.items_of_kind(ItemKind::Ancestry).next()
    }

    /// Look up an owned item by id.
    pub fn item(&self, id: crate::items::ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Read a typed value from the flag store.
    pub fn get_flag<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.flags
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Write a typed value into the flag store.
    pub fn set_flag<T: Serialize>(&mut self, key: &str, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            self.flags.insert(key.to_string(), v);
        }
    }

    /// Remove a flag if present.
    pub fn clear_flag(&mut self, key: &str) {
        self.flags.remove(key);
    }

    /// Recompute all derived fields from base attributes and owned items.
    pub fn recompute(&mut self) {
        crate::derived::recompute(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_actor_baseline() {
        let actor = Actor::new("Brakka");
        assert_eq!(actor.level, 1);
        assert_eq!(actor.axes, AxisScores::new(1, 1, 1));
        assert_eq!(actor.applications, ApplicationScores::new(1, 1, 1));
        assert_eq!(actor.movement, 9);
        assert!(actor.items.is_empty());
    }

    #[test]
    fn test_axis_access() {
        let mut axes = AxisScores::new(3, 2, 1);
        assert_eq!(axes.get(Axis::Physical), 3);
        assert_eq!(axes.total(), 6);
        axes.set(Axis::Social, 2);
        assert_eq!(axes.get(Axis::Social), 2);
    }

    #[test]
    fn test_flag_round_trip() {
        let mut actor = Actor::new("Flagbearer");
        actor.set_flag("counter", 3u32);
        assert_eq!(actor.get_flag::<u32>("counter"), Some(3));

        actor.clear_flag("counter");
        assert_eq!(actor.get_flag::<u32>("counter"), None);
    }

    #[test]
    fn test_flag_type_mismatch_is_none() {
        let mut actor = Actor::new("Mismatched");
        actor.set_flag("note", "not a number");
        assert_eq!(actor.get_flag::<u32>("note"), None);
    }

    #[test]
    fn test_actor_serde_round_trip() {
        let mut actor = Actor::new("Serial");
        actor.skills.insert(
            Skill::Perception,
            SkillRank {
                trained: true,
                bonus: 1,
            },
        );
        let json = serde_json::to_string(&actor).unwrap();
        let back: Actor = serde_json::from_str(&json).unwrap();
        assert_eq!(actor, back);
    }
}
