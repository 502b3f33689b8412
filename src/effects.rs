//! Effect extraction from free-form rule text.
//!
//! Rule text is narrative prose, not a formal DSL, so this module is a
//! heuristic scraper by design: it matches a fixed condition vocabulary,
//! nearby duration phrases, and sign-prefixed numeric modifiers, and it
//! splits out the `Partial:` and `Critical:` outcome sections so those
//! tiers can carry distinct consequences. Extraction never fails; text
//! that matches nothing yields empty results.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The fixed vocabulary of named conditions.
pub const CONDITIONS: [&str; 34] = [
    "Shaken",
    "Grappled",
    "Terrified",
    "Stunned",
    "Prone",
    "Blinded",
    "Weakened",
    "Confused",
    "Asleep",
    "Burning",
    "Energized",
    "Charmed",
    "Poisoned",
    "Exhausted",
    "Exposed",
    "Focused",
    "Frozen",
    "Immobilized",
    "Incapacitated",
    "Unconscious",
    "Invisible",
    "Slowed",
    "Cursed",
    "Marked",
    "Dying",
    "Nauseated",
    "Hidden",
    "Paralyzed",
    "Petrified",
    "Bleeding",
    "Winded",
    "Deafened",
    "Surprised",
    "Vulnerable",
];

/// How long an extracted condition lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectDuration {
    Rounds(u32),
    Seconds(u32),
}

/// A condition to apply to a target, with its parsed or default duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionEffect {
    pub name: String,
    pub duration: Option<EffectDuration>,
}

/// Actor fields a numeric modifier can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTarget {
    ArmorClass,
    Initiative,
    Movement,
    Attack,
    Damage,
}

impl EffectTarget {
    /// Stable field path for the host's persistent-effect records.
    pub fn field_path(self) -> &'static str {
        match self {
            EffectTarget::ArmorClass => "derived.armor_class",
            EffectTarget::Initiative => "derived.initiative",
            EffectTarget::Movement => "movement",
            EffectTarget::Attack => "bonuses.attack",
            EffectTarget::Damage => "bonuses.damage",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EffectTarget::ArmorClass => "Armor Class",
            EffectTarget::Initiative => "Initiative",
            EffectTarget::Movement => "Movement",
            EffectTarget::Attack => "Attack",
            EffectTarget::Damage => "Damage",
        }
    }
}

/// An additive numeric modifier extracted from rule text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericEffect {
    pub target: EffectTarget,
    pub value: i32,
}

struct ConditionPatterns {
    name: &'static str,
    word: Regex,
    rounds_short: Regex,
    turns: Regex,
    rounds: Regex,
    minutes: Regex,
    hours: Regex,
}

fn condition_patterns(name: &'static str) -> ConditionPatterns {
    let near = |unit: &str| {
        Regex::new(&format!(r"(?i){name}[^\n]*?(\d+)\s*{unit}")).expect("static pattern")
    };
    ConditionPatterns {
        name,
        word: Regex::new(&format!(r"(?i)\b{name}\b")).expect("static pattern"),
        rounds_short: near(r"R\b"),
        turns: near(r"turns?\b"),
        rounds: near(r"rounds?\b"),
        minutes: near(r"min"),
        hours: near(r"h\b"),
    }
}

lazy_static! {
    static ref CONDITION_TABLE: Vec<ConditionPatterns> =
        CONDITIONS.iter().copied().map(condition_patterns).collect();

    /// (target, keyword-first pattern, number-first pattern)
    static ref NUMERIC_TABLE: Vec<(EffectTarget, Regex, Regex)> = vec![
        (
            EffectTarget::ArmorClass,
            Regex::new(r"(?i)\b(?:AC|armor)\s*([+-]\s*\d+)").unwrap(),
            Regex::new(r"(?i)([+-]\s*\d+)\s*(?:AC|armor)\b").unwrap(),
        ),
        (
            EffectTarget::Initiative,
            Regex::new(r"(?i)\binitiative\s*([+-]\s*\d+)").unwrap(),
            Regex::new(r"(?i)([+-]\s*\d+)\s*initiative\b").unwrap(),
        ),
        (
            EffectTarget::Movement,
            Regex::new(r"(?i)\b(?:movement|speed)[^0-9+\-\n]*([+-]\s*\d+)\s*m\b").unwrap(),
            Regex::new(r"(?i)([+-]\s*\d+)\s*m\s*(?:movement|speed)\b").unwrap(),
        ),
        (
            EffectTarget::Attack,
            Regex::new(r"(?i)\b(?:attack|hit)\s*([+-]\s*\d+)").unwrap(),
            Regex::new(r"(?i)([+-]\s*\d+)\s*(?:attack|hit)\b").unwrap(),
        ),
        (
            EffectTarget::Damage,
            Regex::new(r"(?i)\bdamage\s*([+-]\s*\d+)").unwrap(),
            Regex::new(r"(?i)([+-]\s*\d+)\s*damage\b").unwrap(),
        ),
    ];

    static ref PARTIAL_SECTION_RE: Regex =
        Regex::new(r"(?is)\bpartial\s*:\s*(.*?)(?:\n\n|$)").unwrap();
    static ref CRITICAL_SECTION_RE: Regex =
        Regex::new(r"(?is)\bcritical\s*:\s*(.*?)(?:\n\n|$)").unwrap();
}

/// Conditions whose rule text rarely states a duration explicitly.
fn default_duration(name: &str) -> Option<EffectDuration> {
    match name {
        "Shaken" => Some(EffectDuration::Rounds(10)),
        "Stunned" | "Confused" | "Exposed" | "Frozen" | "Slowed" | "Surprised" => {
            Some(EffectDuration::Rounds(1))
        }
        _ => None,
    }
}

/// Find every vocabulary condition mentioned in the text.
pub fn find_conditions(text: &str) -> Vec<&'static str> {
    CONDITION_TABLE
        .iter()
        .filter(|p| p.word.is_match(text))
        .map(|p| p.name)
        .collect()
}

/// Extract explicit durations next to condition names.
///
/// Each unit class is scanned in order (round shorthand, turns, rounds,
/// minutes, hours) and a later class overwrites an earlier one for the
/// same condition, so the coarsest stated unit wins.
pub fn extract_condition_durations(text: &str) -> BTreeMap<String, EffectDuration> {
    let mut durations = BTreeMap::new();

    for patterns in CONDITION_TABLE.iter() {
        let mut put = |value: EffectDuration| {
            durations.insert(patterns.name.to_string(), value);
        };

        if let Some(n) = first_number(&patterns.rounds_short, text) {
            put(EffectDuration::Rounds(n));
        }
        if let Some(n) = first_number(&patterns.turns, text) {
            put(EffectDuration::Rounds(n));
        }
        if let Some(n) = first_number(&patterns.rounds, text) {
            put(EffectDuration::Rounds(n));
        }
        if let Some(n) = first_number(&patterns.minutes, text) {
            put(EffectDuration::Seconds(n * 60));
        }
        if let Some(n) = first_number(&patterns.hours, text) {
            put(EffectDuration::Seconds(n * 3600));
        }
    }

    durations
}

fn first_number(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Extract numeric modifiers (keyword and sign-prefixed number, either order).
pub fn extract_numeric_effects(text: &str) -> Vec<NumericEffect> {
    let mut effects = Vec::new();

    for (target, forward, backward) in NUMERIC_TABLE.iter() {
        let value = first_signed(forward, text).or_else(|| first_signed(backward, text));
        if let Some(value) = value {
            effects.push(NumericEffect {
                target: *target,
                value,
            });
        }
    }

    effects
}

fn first_signed(re: &Regex, text: &str) -> Option<i32> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().replace(char::is_whitespace, "").parse().ok())
}

/// The `Partial:` sub-section of the text, if present.
pub fn partial_section(text: &str) -> String {
    section(&PARTIAL_SECTION_RE, text)
}

/// The `Critical:` sub-section of the text, if present.
pub fn critical_section(text: &str) -> String {
    section(&CRITICAL_SECTION_RE, text)
}

fn section(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Everything extracted from one block of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EffectProfile {
    pub conditions: Vec<String>,
    pub durations: BTreeMap<String, EffectDuration>,
    pub numeric: Vec<NumericEffect>,
}

impl EffectProfile {
    /// Run the full extraction grammar over a block of text.
    pub fn extract(text: &str) -> Self {
        Self {
            conditions: find_conditions(text)
                .into_iter()
                .map(str::to_string)
                .collect(),
            durations: extract_condition_durations(text),
            numeric: extract_numeric_effects(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.numeric.is_empty()
    }

    /// Pair each extracted condition with its parsed or default duration.
    pub fn condition_effects(&self) -> Vec<ConditionEffect> {
        self.conditions
            .iter()
            .map(|name| ConditionEffect {
                name: name.clone(),
                duration: self
                    .durations
                    .get(name)
                    .copied()
                    .or_else(|| default_duration(name)),
            })
            .collect()
    }
}

/// Per-outcome-tier extraction of one item's rule text.
///
/// `default` scans the whole text; `partial` and `critical` re-run the
/// grammar scoped to their named sub-sections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OutcomeEffects {
    pub default: EffectProfile,
    pub partial: EffectProfile,
    pub critical: EffectProfile,
}

/// Extract all three outcome tiers from a block of rule text.
pub fn extract_outcome_effects(text: &str) -> OutcomeEffects {
    OutcomeEffects {
        default: EffectProfile::extract(text),
        partial: EffectProfile::extract(&partial_section(text)),
        critical: EffectProfile::extract(&critical_section(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_conditions_whole_word() {
        let hits = find_conditions("The target is Stunned and starts Burning.");
        assert_eq!(hits, vec!["Stunned", "Burning"]);

        // substring matches do not count
        assert!(find_conditions("unstunned prose").is_empty());
    }

    #[test]
    fn test_find_conditions_case_insensitive() {
        assert_eq!(find_conditions("the foe is BLINDED"), vec!["Blinded"]);
    }

    #[test]
    fn test_duration_rounds() {
        let durations = extract_condition_durations("Stunned for 2 rounds.");
        assert_eq!(durations.get("Stunned"), Some(&EffectDuration::Rounds(2)));
    }

    #[test]
    fn test_duration_short_form_and_turns() {
        let d = extract_condition_durations("Slowed 3 R");
        assert_eq!(d.get("Slowed"), Some(&EffectDuration::Rounds(3)));

        let d = extract_condition_durations("Shaken for 2 turns");
        assert_eq!(d.get("Shaken"), Some(&EffectDuration::Rounds(2)));
    }

    #[test]
    fn test_duration_minutes_and_hours() {
        let d = extract_condition_durations("Poisoned for 10 min");
        assert_eq!(d.get("Poisoned"), Some(&EffectDuration::Seconds(600)));

        let d = extract_condition_durations("Cursed for 2 h");
        assert_eq!(d.get("Cursed"), Some(&EffectDuration::Seconds(7200)));
    }

    #[test]
    fn test_duration_same_line_only() {
        let d = extract_condition_durations("Blinded.\nSomething else lasts 3 rounds.");
        assert_eq!(d.get("Blinded"), None);
    }

    #[test]
    fn test_coarser_unit_wins() {
        // both phrasings present: the later unit class overwrites
        let d = extract_condition_durations("Marked 2 rounds or 1 h in dim light");
        assert_eq!(d.get("Marked"), Some(&EffectDuration::Seconds(3600)));
    }

    #[test]
    fn test_numeric_effects_both_orders() {
        let fx = extract_numeric_effects("Gain AC +2 while braced.");
        assert_eq!(
            fx,
            vec![NumericEffect {
                target: EffectTarget::ArmorClass,
                value: 2
            }]
        );

        let fx = extract_numeric_effects("-1 attack until the end of the scene");
        assert_eq!(
            fx,
            vec![NumericEffect {
                target: EffectTarget::Attack,
                value: -1
            }]
        );
    }

    #[test]
    fn test_numeric_movement_requires_meters() {
        let fx = extract_numeric_effects("Speed +3 m while raging");
        assert_eq!(
            fx,
            vec![NumericEffect {
                target: EffectTarget::Movement,
                value: 3
            }]
        );

        assert!(extract_numeric_effects("speed +3 bursts").is_empty());
    }

    #[test]
    fn test_numeric_tolerates_spaced_sign() {
        let fx = extract_numeric_effects("Damage + 2 against marked foes");
        assert_eq!(
            fx,
            vec![NumericEffect {
                target: EffectTarget::Damage,
                value: 2
            }]
        );
    }

    #[test]
    fn test_sections() {
        let text = "Deal fire damage.\nPartial: the target is Slowed.\n\nCritical: the target is Burning 2 rounds.";
        assert_eq!(partial_section(text), "the target is Slowed.");
        assert_eq!(
            critical_section(text),
            "the target is Burning 2 rounds."
        );
        assert_eq!(partial_section("no sections here"), "");
    }

    #[test]
    fn test_outcome_effects_scoping() {
        let text = "The blade ignites.\nPartial: target is Exposed.\n\nCritical: target is Burning 3 rounds.";
        let fx = extract_outcome_effects(text);

        assert_eq!(fx.partial.conditions, vec!["Exposed".to_string()]);
        assert_eq!(fx.critical.conditions, vec!["Burning".to_string()]);
        assert_eq!(
            fx.critical.durations.get("Burning"),
            Some(&EffectDuration::Rounds(3))
        );
        // the default profile scans the whole text, sections included
        assert!(fx.default.conditions.contains(&"Exposed".to_string()));
    }

    #[test]
    fn test_condition_effects_fall_back_to_defaults() {
        let profile = EffectProfile::extract("The target is Stunned and Marked.");
        let effects = profile.condition_effects();

        let stunned = effects.iter().find(|e| e.name == "Stunned").unwrap();
        assert_eq!(stunned.duration, Some(EffectDuration::Rounds(1)));

        let marked = effects.iter().find(|e| e.name == "Marked").unwrap();
        assert_eq!(marked.duration, None);
    }

    #[test]
    fn test_extraction_never_fails_on_noise() {
        let profile = EffectProfile::extract("@@@ ### 12345 +++ ---");
        assert!(profile.is_empty());
        assert!(profile.durations.is_empty());
    }
}
