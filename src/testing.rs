//! In-memory host and catalog fixtures.
//!
//! Used by the crate's own tests and handy for embedders writing theirs:
//! a [`RecordingHost`] that captures every side effect, and a small
//! content pack covering two ancestries, two backgrounds, two classes,
//! maneuvers for every axis, spells, and gear.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::actor::{Actor, ActorId, Application, Axis, BonusTarget};
use crate::checks::CheckOutcome;
use crate::effects::{ConditionEffect, NumericEffect};
use crate::host::{Catalog, GameHost, HostError};
use crate::items::{AncestryData, ClassData, Item, ItemKind};

/// A host that records everything it is asked to do.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub actors: HashMap<ActorId, Actor>,
    pub conditions: Vec<(ActorId, ConditionEffect)>,
    pub numeric: Vec<(ActorId, NumericEffect)>,
    pub outcomes: Vec<CheckOutcome>,
}

#[async_trait]
impl GameHost for RecordingHost {
    async fn persist_actor(&mut self, actor: &Actor) -> Result<(), HostError> {
        self.actors.insert(actor.id, actor.clone());
        Ok(())
    }

    async fn apply_condition(
        &mut self,
        target: ActorId,
        effect: &ConditionEffect,
    ) -> Result<(), HostError> {
        self.conditions.push((target, effect.clone()));
        Ok(())
    }

    async fn apply_numeric_effects(
        &mut self,
        target: ActorId,
        effects: &[NumericEffect],
    ) -> Result<(), HostError> {
        for effect in effects {
            self.numeric.push((target, *effect));
        }
        Ok(())
    }

    async fn post_outcome(&mut self, outcome: &CheckOutcome) -> Result<(), HostError> {
        self.outcomes.push(outcome.clone());
        Ok(())
    }
}

/// A catalog backed by a plain vector.
#[derive(Debug, Default)]
pub struct FixtureCatalog {
    pub items: Vec<Item>,
}

impl Catalog for FixtureCatalog {
    fn entries(&self, kind: ItemKind) -> Vec<Item> {
        self.items.iter().filter(|i| i.kind == kind).cloned().collect()
    }

    fn find(&self, kind: ItemKind, name: &str) -> Option<Item> {
        self.items
            .iter()
            .find(|i| i.kind == kind && i.name.eq_ignore_ascii_case(name))
            .cloned()
    }
}

fn ancestry(name: &str, profile: AncestryData) -> Item {
    let mut item = Item::new(name, ItemKind::Ancestry);
    item.ancestry = profile;
    item
}

fn a_trait(name: &str) -> Item {
    Item::new(name, ItemKind::Trait)
}

fn talent(name: &str) -> Item {
    Item::new(name, ItemKind::Talent)
}

fn class(name: &str, data: ClassData) -> Item {
    let mut item = Item::new(name, ItemKind::Class);
    item.class_data = data;
    item
}

fn maneuver(name: &str, axis: Axis, is_attack: bool, damage: &str) -> Item {
    let mut item = Item::new(name, ItemKind::Maneuver);
    item.roll.axis = Some(axis);
    item.roll.application = Some(Application::Conflict);
    item.roll.is_attack = Some(is_attack);
    item.damage = damage.to_string();
    item
}

fn gear(name: &str, kind: ItemKind, price: &str) -> Item {
    let mut item = Item::new(name, kind);
    item.price = price.to_string();
    item
}

/// A content pack rich enough to carry a character through creation
/// and a skirmish.
pub fn sample_catalog() -> FixtureCatalog {
    let mut items = Vec::new();

    items.push(ancestry(
        "Duskborn",
        AncestryData {
            primary_options: vec![
                BonusTarget::Axis(Axis::Mental),
                BonusTarget::Application(Application::Interaction),
            ],
            extra_application: true,
        },
    ));
    items.push(ancestry(
        "Stonekin",
        AncestryData {
            primary_options: vec![
                BonusTarget::Axis(Axis::Physical),
                BonusTarget::Application(Application::Resistance),
            ],
            extra_application: false,
        },
    ));

    items.push(a_trait("Night Vision"));
    items.push(a_trait("Stone Sense"));
    items.push(a_trait("Silent Step"));
    items.push(a_trait("Iron Stomach"));

    items.push(Item::new("Caravan Guard", ItemKind::Background));
    items.push(Item::new("Temple Scribe", ItemKind::Background));

    items.push(talent("Watchful"));
    items.push(talent("Bookbound"));
    items.push(talent("Steady Hands"));
    items.push(talent("Shield Discipline"));
    items.push(talent("Second Wind"));
    items.push(talent("Ember Focus"));
    items.push(talent("Glyph Memory"));

    items.push(class(
        "Warden",
        ClassData {
            base_hp: 10,
            base_vigor: 4,
            base_energy: 0,
        },
    ));
    items.push(class(
        "Thaumaturge",
        ClassData {
            base_hp: 6,
            base_vigor: 2,
            base_energy: 6,
        },
    ));
    items.push(Item::new("Warden Passive", ItemKind::Feature));
    items.push(Item::new("Thaumaturge Passive", ItemKind::Feature));

    items.push(maneuver("Power Strike", Axis::Physical, true, "1d10"));
    items.push(maneuver("Sweep", Axis::Physical, true, "1d6"));
    items.push(maneuver("Brace", Axis::Physical, false, ""));
    items.push(maneuver("Feint Read", Axis::Mental, false, ""));
    items.push(maneuver("Battle Plan", Axis::Mental, false, ""));
    items.push(maneuver("Mind Spike", Axis::Mental, true, "1d8"));
    items.push(maneuver("Taunt", Axis::Social, false, ""));
    items.push(maneuver("Rally", Axis::Social, false, ""));
    items.push(maneuver("Menace", Axis::Social, false, ""));

    let mut ember = Item::new("Ember Lash", ItemKind::Spell);
    ember.roll.axis = Some(Axis::Mental);
    ember.roll.application = Some(Application::Conflict);
    ember.roll.is_attack = Some(true);
    ember.damage = "1d8".to_string();
    ember.effect = "A whip of flame. The target is Burning 2 rounds.\n\
                    Partial: the target is Shaken.\n\n\
                    Critical: the target is Burning 4 rounds and Exposed."
        .to_string();
    items.push(ember);

    let mut veil = Item::new("Veil of Frost", ItemKind::Spell);
    veil.roll.axis = Some(Axis::Mental);
    veil.roll.is_attack = Some(false);
    veil.dc = 15;
    veil.effect = "Targets caught in the veil are Slowed 1 round.".to_string();
    items.push(veil);

    let mut sword = gear("Longsword", ItemKind::Weapon, "15 O");
    sword.weapon.damage = "1d8".to_string();
    items.push(sword);

    let mut dagger = gear("Dagger", ItemKind::Weapon, "2 O");
    dagger.weapon.damage = "1d4".to_string();
    dagger.weapon.tags = vec!["agile".to_string()];
    items.push(dagger);

    let mut bow = gear("Shortbow", ItemKind::Weapon, "8 O");
    bow.weapon.damage = "1d6".to_string();
    items.push(bow);

    let mut greatsword = gear("Greatsword", ItemKind::Weapon, "25 O");
    greatsword.weapon.damage = "1d12".to_string();
    greatsword.weapon.tags = vec!["heavy".to_string()];
    greatsword.weapon.hands = 2;
    items.push(greatsword);

    let mut leather = gear("Leather Armor", ItemKind::Armor, "10 O");
    leather.armor.bonus = 1;
    items.push(leather);

    let mut plate = gear("Plate Harness", ItemKind::Armor, "28 O");
    plate.armor.bonus = 3;
    plate.armor.max_axis = 1;
    plate.armor.category = "heavy".to_string();
    items.push(plate);

    let mut round = gear("Round Shield", ItemKind::Shield, "5 O");
    round.shield.bonus = 1;
    items.push(round);

    let mut tower = gear("Tower Shield", ItemKind::Shield, "12 O");
    tower.shield.bonus = 2;
    items.push(tower);

    items.push(gear("Rope", ItemKind::Equipment, "5 P"));
    items.push(gear("Torch", ItemKind::Equipment, "1 O"));

    let mut rations = gear("Rations", ItemKind::Consumable, "5 P");
    rations.quantity = 5;
    items.push(rations);

    FixtureCatalog { items }
}

/// A fresh level-1 actor with baseline scores.
pub fn sample_actor(name: &str) -> Actor {
    let mut actor = Actor::new(name);
    actor.recompute();
    actor
}
