//! Derived-stats recomputation.
//!
//! A pure pass over an actor's base attributes and owned items that
//! rewrites the derived block: resource maxima, tier and difficulty
//! table, armor class, initiative, and carry accounting. Missing or
//! malformed inputs degrade to baseline values; this pass never fails.

use crate::actor::{Actor, DcTable};
use crate::items::ItemKind;

/// Tier for a given level: 1 below level 6, then one per five levels.
pub fn tier(level: i32) -> u8 {
    if level >= 16 {
        4
    } else if level >= 11 {
        3
    } else if level >= 6 {
        2
    } else {
        1
    }
}

/// The fixed difficulty table for a tier.
pub fn dc_table(tier: u8) -> DcTable {
    match tier {
        4 => DcTable {
            mundane: 30,
            challenging: 33,
            legendary: 38,
            divine: 43,
        },
        3 => DcTable {
            mundane: 24,
            challenging: 27,
            legendary: 32,
            divine: 37,
        },
        2 => DcTable {
            mundane: 18,
            challenging: 21,
            legendary: 26,
            divine: 31,
        },
        _ => DcTable {
            mundane: 12,
            challenging: 15,
            legendary: 20,
            divine: 25,
        },
    }
}

/// Recompute every derived field on the actor in place.
///
/// Idempotent: running it twice over an unchanged actor yields the same
/// derived block.
pub fn recompute(actor: &mut Actor) {
    let level = actor.level;
    let physical = actor.axes.physical;
    let mental = actor.axes.mental;
    let interaction = actor.applications.interaction;
    let resistance = actor.applications.resistance;

    let class = actor
        .class_item()
        .map(|c| c.class_data)
        .unwrap_or_default();

    actor.resources.hp.max = class.base_hp + (physical + resistance) * 5;
    actor.resources.vigor.max = class.base_vigor + (physical + interaction) + level;
    actor.resources.energy.max = class.base_energy + (mental + resistance) + level;

    actor.derived.tier = tier(level);
    actor.derived.dc_table = dc_table(actor.derived.tier);
    actor.derived.save_dc = 10 + level;

    // Best equipped armor by bonus; ties keep the first item in
    // collection order so the result is deterministic.
    let mut armor_bonus = 0;
    let mut armor_max_axis = 0;
    let mut armor_found = false;
    for item in actor
        .items
        .iter()
        .filter(|i| i.kind == ItemKind::Armor && i.equipped)
    {
        if !armor_found || item.armor.bonus > armor_bonus {
            armor_bonus = item.armor.bonus;
            armor_max_axis = item.armor.max_axis;
            armor_found = true;
        }
    }

    let limited_axis = if armor_max_axis > 0 {
        physical.min(armor_max_axis)
    } else {
        physical
    };

    let shield_bonus: i32 = actor
        .items
        .iter()
        .filter(|i| i.kind == ItemKind::Shield && i.equipped)
        .map(|i| i.shield.bonus)
        .sum();

    actor.derived.armor_class = 10 + level + armor_bonus + limited_axis + shield_bonus;
    actor.derived.initiative = level + mental + interaction;
    actor.derived.carry_max = (physical + resistance) + 6;
    actor.derived.carry_slots = actor.items.iter().map(|i| i.carry_cost()).sum();
}
