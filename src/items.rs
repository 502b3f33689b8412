//! Owned items: equipment, abilities, and rule elements.
//!
//! An item belongs to exactly one actor. Kind-specific data lives in
//! optional payload blocks with serde defaults, so partially-seeded
//! catalog entries always deserialize to something usable.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::actor::{Application, Axis, BonusTarget};

/// Unique identifier for an item.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of item kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Ancestry,
    Background,
    Class,
    Trait,
    Talent,
    Maneuver,
    Spell,
    Weapon,
    Armor,
    Shield,
    Equipment,
    Consumable,
    Rune,
    Feature,
    Ability,
    Condition,
    Disease,
    Toxin,
}

impl ItemKind {
    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Ancestry => "ancestry",
            ItemKind::Background => "background",
            ItemKind::Class => "class",
            ItemKind::Trait => "trait",
            ItemKind::Talent => "talent",
            ItemKind::Maneuver => "maneuver",
            ItemKind::Spell => "spell",
            ItemKind::Weapon => "weapon",
            ItemKind::Armor => "armor",
            ItemKind::Shield => "shield",
            ItemKind::Equipment => "equipment",
            ItemKind::Consumable => "consumable",
            ItemKind::Rune => "rune",
            ItemKind::Feature => "feature",
            ItemKind::Ability => "ability",
            ItemKind::Condition => "condition",
            ItemKind::Disease => "disease",
            ItemKind::Toxin => "toxin",
        }
    }

    /// Whether this kind counts as purchasable, carryable gear.
    pub fn is_gear(self) -> bool {
        matches!(
            self,
            ItemKind::Weapon
                | ItemKind::Armor
                | ItemKind::Shield
                | ItemKind::Equipment
                | ItemKind::Consumable
                | ItemKind::Rune
        )
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How an item resolves a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RollSpec {
    pub axis: Option<Axis>,
    pub application: Option<Application>,
    pub bonus: i32,
    /// Unset lets the item kind decide: weapons, maneuvers, and spells
    /// attack by default.
    pub is_attack: Option<bool>,
}

/// Weapon payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponData {
    pub damage: String,
    pub tags: Vec<String>,
    pub hands: u32,
}

impl Default for WeaponData {
    fn default() -> Self {
        Self {
            damage: String::new(),
            tags: Vec::new(),
            hands: 1,
        }
    }
}

/// Armor payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ArmorData {
    pub bonus: i32,
    /// Caps the physical axis contribution to armor class; 0 means uncapped.
    pub max_axis: i32,
    pub category: String,
}

/// Shield payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ShieldData {
    pub bonus: i32,
    pub kind: String,
}

/// Class payload: the base values feeding resource maxima.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClassData {
    pub base_hp: i32,
    pub base_vigor: i32,
    pub base_energy: i32,
}

/// Ancestry payload: which creation bonuses the ancestry allows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AncestryData {
    /// Allowed targets for the primary ancestry bonus.
    pub primary_options: Vec<BonusTarget>,
    /// Whether this ancestry also unlocks a free application bonus.
    pub extra_application: bool,
}

/// Name fragments that mark a weapon as long (two carry slots).
pub const LONG_WEAPON_KEYWORDS: [&str; 5] =
    ["bow", "crossbow", "staff", "greatsword", "halberd"];

/// An item owned by an actor or stored in a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    #[serde(default)]
    pub description: String,
    /// Free rule text scanned by the effect extractor.
    #[serde(default)]
    pub effect: String,
    #[serde(default)]
    pub category: String,
    /// Name of the singleton selection that granted this item, if any.
    /// Drives cascade removal when the granting selection changes.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub price: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub equipped: bool,
    /// Explicit carry-slot override; 0 means infer from kind.
    #[serde(default)]
    pub slot_cost: u32,
    /// Fixed difficulty class for non-attack checks; 0 means none.
    #[serde(default)]
    pub dc: i32,
    /// Damage formula such as `1d8+2`; empty means the item deals none.
    #[serde(default)]
    pub damage: String,
    #[serde(default)]
    pub roll: RollSpec,
    #[serde(default)]
    pub weapon: WeaponData,
    #[serde(default)]
    pub armor: ArmorData,
    #[serde(default)]
    pub shield: ShieldData,
    #[serde(default)]
    pub class_data: ClassData,
    #[serde(default)]
    pub ancestry: AncestryData,
}

fn default_quantity() -> u32 {
    1
}

impl Item {
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            kind,
            description: String::new(),
            effect: String::new(),
            category: String::new(),
            source: String::new(),
            price: String::new(),
            quantity: 1,
            equipped: false,
            slot_cost: 0,
            dc: 0,
            damage: String::new(),
            roll: RollSpec::default(),
            weapon: WeaponData::default(),
            armor: ArmorData::default(),
            shield: ShieldData::default(),
            class_data: ClassData::default(),
            ancestry: AncestryData::default(),
        }
    }

    /// Copy this item as a fresh owned instance with its own identity.
    pub fn instantiate(&self) -> Item {
        let mut copy = self.clone();
        copy.id = ItemId::new();
        copy
    }

    /// The damage formula to roll, if the item has one.
    pub fn damage_formula(&self) -> Option<&str> {
        if !self.damage.trim().is_empty() {
            Some(self.damage.trim())
        } else if !self.weapon.damage.trim().is_empty() {
            Some(self.weapon.damage.trim())
        } else {
            None
        }
    }

    /// Whether the weapon carries a given tag (case-insensitive substring).
    pub fn has_weapon_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.weapon
            .tags
            .iter()
            .any(|t| t.to_lowercase().contains(&tag))
    }

    /// Agile weapons take reduced multiple-attack penalties.
    pub fn is_agile(&self) -> bool {
        self.has_weapon_tag("agile")
    }

    /// Carry slots this item occupies.
    ///
    /// An explicit positive `slot_cost` always wins; otherwise the cost
    /// follows the type-specific rules.
    pub fn carry_cost(&self) -> u32 {
        if self.slot_cost > 0 {
            return self.slot_cost;
        }

        let name = self.name.to_lowercase();
        match self.kind {
            ItemKind::Consumable | ItemKind::Rune => 0,
            ItemKind::Equipment => self.quantity.max(1).div_ceil(3),
            ItemKind::Armor => {
                if self.armor.category.to_lowercase().contains("heavy") {
                    2
                } else {
                    1
                }
            }
            ItemKind::Shield => {
                if name.contains("tower") || self.shield.kind.to_lowercase().contains("heavy") {
                    2
                } else {
                    1
                }
            }
            ItemKind::Weapon => {
                let long = self.has_weapon_tag("two-handed")
                    || self.has_weapon_tag("heavy")
                    || LONG_WEAPON_KEYWORDS.iter().any(|k| name.contains(k));
                if long {
                    2
                } else {
                    1
                }
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instantiate_gets_fresh_id() {
        let template = Item::new("Longsword", ItemKind::Weapon);
        let owned = template.instantiate();
        assert_ne!(template.id, owned.id);
        assert_eq!(template.name, owned.name);
    }

    #[test]
    fn test_explicit_slot_cost_wins() {
        let mut item = Item::new("Odd Bundle", ItemKind::Consumable);
        item.slot_cost = 3;
        assert_eq!(item.carry_cost(), 3);
    }

    #[test]
    fn test_consumables_and_runes_are_free() {
        assert_eq!(Item::new("Healing Draught", ItemKind::Consumable).carry_cost(), 0);
        assert_eq!(Item::new("Ember Rune", ItemKind::Rune).carry_cost(), 0);
    }

    #[test]
    fn test_equipment_bundles_by_three() {
        let mut rope = Item::new("Rope", ItemKind::Equipment);
        rope.quantity = 1;
        assert_eq!(rope.carry_cost(), 1);
        rope.quantity = 3;
        assert_eq!(rope.carry_cost(), 1);
        rope.quantity = 4;
        assert_eq!(rope.carry_cost(), 2);
        rope.quantity = 0; // malformed quantity degrades to 1
        assert_eq!(rope.carry_cost(), 1);
    }

    #[test]
    fn test_heavy_armor_costs_two() {
        let mut plate = Item::new("Plate Harness", ItemKind::Armor);
        plate.armor.category = "Heavy".to_string();
        assert_eq!(plate.carry_cost(), 2);

        let leather = Item::new("Leather Jerkin", ItemKind::Armor);
        assert_eq!(leather.carry_cost(), 1);
    }

    #[test]
    fn test_tower_shield_costs_two() {
        let tower = Item::new("Tower Shield", ItemKind::Shield);
        assert_eq!(tower.carry_cost(), 2);

        let mut heavy = Item::new("Wall of Oak", ItemKind::Shield);
        heavy.shield.kind = "heavy".to_string();
        assert_eq!(heavy.carry_cost(), 2);

        let round = Item::new("Round Shield", ItemKind::Shield);
        assert_eq!(round.carry_cost(), 1);
    }

    #[test]
    fn test_long_weapons_cost_two() {
        assert_eq!(Item::new("Shortbow", ItemKind::Weapon).carry_cost(), 2);
        assert_eq!(Item::new("Greatsword", ItemKind::Weapon).carry_cost(), 2);
        assert_eq!(Item::new("Dagger", ItemKind::Weapon).carry_cost(), 1);

        let mut maul = Item::new("Maul", ItemKind::Weapon);
        maul.weapon.tags = vec!["Two-Handed".to_string()];
        assert_eq!(maul.carry_cost(), 2);
    }

    #[test]
    fn test_non_gear_costs_nothing() {
        assert_eq!(Item::new("Warden", ItemKind::Class).carry_cost(), 0);
        assert_eq!(Item::new("Ember Lash", ItemKind::Spell).carry_cost(), 0);
    }

    #[test]
    fn test_damage_formula_preference() {
        let mut item = Item::new("Flame Blade", ItemKind::Weapon);
        assert_eq!(item.damage_formula(), None);

        item.weapon.damage = "1d8".to_string();
        assert_eq!(item.damage_formula(), Some("1d8"));

        // top-level formula overrides the weapon block
        item.damage = "2d6".to_string();
        assert_eq!(item.damage_formula(), Some("2d6"));
    }

    #[test]
    fn test_item_deserializes_with_sparse_fields() {
        let json = r#"{"id":"00000000-0000-0000-0000-000000000001","name":"Torch","kind":"equipment"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.quantity, 1);
        assert!(!item.equipped);
        assert_eq!(item.carry_cost(), 1);
    }
}
