//! The fixed skill table.
//!
//! Every skill rolls a default axis/application pair; training state and
//! flat bonuses live on the actor.

use serde::{Deserialize, Serialize};

use crate::actor::{Application, Axis};

/// The skills of the system.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Stealth,
    Veiling,
    Perception,
    Thievery,
    Medicine,
    History,
    Athletics,
    Intimidation,
    Persuasion,
    AnimalHandling,
}

impl Skill {
    pub fn name(self) -> &'static str {
        match self {
            Skill::Stealth => "Stealth",
            Skill::Veiling => "Veiling",
            Skill::Perception => "Perception",
            Skill::Thievery => "Thievery",
            Skill::Medicine => "Medicine",
            Skill::History => "History",
            Skill::Athletics => "Athletics",
            Skill::Intimidation => "Intimidation",
            Skill::Persuasion => "Persuasion",
            Skill::AnimalHandling => "Animal Handling",
        }
    }

    /// The axis this skill rolls by default.
    pub fn axis(self) -> Axis {
        match self {
            Skill::Stealth | Skill::Thievery | Skill::Athletics => Axis::Physical,
            Skill::Veiling | Skill::Perception | Skill::Medicine | Skill::History => Axis::Mental,
            Skill::Intimidation | Skill::Persuasion | Skill::AnimalHandling => Axis::Social,
        }
    }

    /// The application this skill rolls by default.
    pub fn application(self) -> Application {
        match self {
            Skill::Athletics | Skill::Intimidation => Application::Conflict,
            Skill::Perception => Application::Resistance,
            _ => Application::Interaction,
        }
    }

    pub fn all() -> &'static [Skill] {
        &[
            Skill::Stealth,
            Skill::Veiling,
            Skill::Perception,
            Skill::Thievery,
            Skill::Medicine,
            Skill::History,
            Skill::Athletics,
            Skill::Intimidation,
            Skill::Persuasion,
            Skill::AnimalHandling,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_skill_has_defaults() {
        for skill in Skill::all() {
            // name/axis/application are total over the enum
            assert!(!skill.name().is_empty());
            let _ = skill.axis();
            let _ = skill.application();
        }
    }

    #[test]
    fn test_skill_serializes_as_snake_case() {
        let json = serde_json::to_string(&Skill::AnimalHandling).unwrap();
        assert_eq!(json, "\"animal_handling\"");
    }
}
