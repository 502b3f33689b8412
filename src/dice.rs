//! Dice formula parsing and rolling.
//!
//! Supports the `XdY+Z` notation used by damage formulas: any number of
//! die components plus integer modifiers, e.g. `1d8+2` or `2d6+1d4-1`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for dice parsing.
#[derive(Debug, Error)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
    #[error("No dice specified")]
    NoDice,
}

/// Largest die size a formula may name.
const MAX_DIE_SIDES: u32 = 100;

/// A single die component of a dice expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceComponent {
    pub count: u32,
    pub sides: u32,
}

/// A complete dice expression (e.g. `2d6+3`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceExpression {
    pub components: Vec<DiceComponent>,
    pub modifier: i32,
    pub original: String,
}

impl DiceExpression {
    /// Parse a dice notation string.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let notation = notation.trim().to_lowercase();
        if notation.is_empty() {
            return Err(DiceError::NoDice);
        }

        let mut components = Vec::new();
        let mut modifier: i32 = 0;
        let mut current = String::new();
        let mut sign: i32 = 1;

        for ch in notation.chars() {
            match ch {
                '+' | '-' => {
                    if !current.is_empty() {
                        Self::parse_component(&current, sign, &mut components, &mut modifier)?;
                        current.clear();
                    }
                    sign = if ch == '+' { 1 } else { -1 };
                }
                ' ' | '(' | ')' => continue,
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            Self::parse_component(&current, sign, &mut components, &mut modifier)?;
        }

        if components.is_empty() && modifier == 0 {
            return Err(DiceError::NoDice);
        }

        Ok(DiceExpression {
            components,
            modifier,
            original: notation,
        })
    }

    fn parse_component(
        s: &str,
        sign: i32,
        components: &mut Vec<DiceComponent>,
        modifier: &mut i32,
    ) -> Result<(), DiceError> {
        if let Some(d_pos) = s.find('d') {
            let count_str = &s[..d_pos];
            let sides_str = &s[d_pos + 1..];

            let count: u32 = if count_str.is_empty() {
                1
            } else {
                count_str
                    .parse()
                    .map_err(|_| DiceError::InvalidNotation(s.to_string()))?
            };

            let sides: u32 = sides_str
                .parse()
                .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;

            if !(2..=MAX_DIE_SIDES).contains(&sides) {
                return Err(DiceError::InvalidDieSize(sides));
            }
            if count == 0 {
                return Err(DiceError::InvalidNotation(s.to_string()));
            }

            components.push(DiceComponent { count, sides });
        } else {
            let value: i32 = s
                .parse()
                .map_err(|_| DiceError::InvalidNotation(s.to_string()))?;
            *modifier += sign * value;
        }

        Ok(())
    }

    /// Roll the expression with the thread RNG.
    pub fn roll(&self) -> DiceRoll {
        self.roll_with_rng(&mut rand::thread_rng())
    }

    /// Roll with a specific RNG (useful for deterministic tests).
    pub fn roll_with_rng<R: Rng>(&self, rng: &mut R) -> DiceRoll {
        let mut rolls = Vec::new();
        for component in &self.components {
            for _ in 0..component.count {
                rolls.push(rng.gen_range(1..=component.sides));
            }
        }

        let dice_total: i32 = rolls.iter().map(|&r| r as i32).sum();
        DiceRoll {
            notation: self.original.clone(),
            rolls,
            modifier: self.modifier,
            total: dice_total + self.modifier,
        }
    }
}

impl FromStr for DiceExpression {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpression::parse(s)
    }
}

impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

/// Result of rolling a dice expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub notation: String,
    pub rolls: Vec<u32>,
    pub modifier: i32,
    pub total: i32,
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dice = self
            .rolls
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        if self.modifier > 0 {
            write!(f, "[{dice}] + {} = {}", self.modifier, self.total)
        } else if self.modifier < 0 {
            write!(f, "[{dice}] - {} = {}", self.modifier.abs(), self.total)
        } else {
            write!(f, "[{dice}] = {}", self.total)
        }
    }
}

/// Convenience function to roll dice from a notation string.
pub fn roll(notation: &str) -> Result<DiceRoll, DiceError> {
    let expr = DiceExpression::parse(notation)?;
    Ok(expr.roll())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_simple() {
        let expr = DiceExpression::parse("1d20").unwrap();
        assert_eq!(expr.components.len(), 1);
        assert_eq!(expr.components[0], DiceComponent { count: 1, sides: 20 });
        assert_eq!(expr.modifier, 0);
    }

    #[test]
    fn test_parse_with_modifier() {
        let expr = DiceExpression::parse("1d8+2").unwrap();
        assert_eq!(expr.modifier, 2);

        let expr = DiceExpression::parse("2d6-2").unwrap();
        assert_eq!(expr.modifier, -2);
    }

    #[test]
    fn test_parse_multiple_components() {
        let expr = DiceExpression::parse("2d6+1d4+3").unwrap();
        assert_eq!(expr.components.len(), 2);
        assert_eq!(expr.modifier, 3);
    }

    #[test]
    fn test_parse_implicit_count() {
        let expr = DiceExpression::parse("d12").unwrap();
        assert_eq!(expr.components[0].count, 1);
        assert_eq!(expr.components[0].sides, 12);
    }

    #[test]
    fn test_parse_parenthesized() {
        // formulas pasted from rule text sometimes carry grouping
        let expr = DiceExpression::parse("(1d8+2)").unwrap();
        assert_eq!(expr.components.len(), 1);
        assert_eq!(expr.modifier, 2);
    }

    #[test]
    fn test_rejects_bad_notation() {
        assert!(DiceExpression::parse("").is_err());
        assert!(DiceExpression::parse("abc").is_err());
        assert!(DiceExpression::parse("0d6").is_err());
        assert!(matches!(
            DiceExpression::parse("1d1"),
            Err(DiceError::InvalidDieSize(1))
        ));
        assert!(matches!(
            DiceExpression::parse("1d500"),
            Err(DiceError::InvalidDieSize(500))
        ));
    }

    #[test]
    fn test_roll_range() {
        for _ in 0..100 {
            let result = roll("1d6+2").unwrap();
            assert!(result.total >= 3 && result.total <= 8);
        }
    }

    #[test]
    fn test_roll_is_deterministic_with_seed() {
        let expr = DiceExpression::parse("3d6+1").unwrap();
        let a = expr.roll_with_rng(&mut StdRng::seed_from_u64(7));
        let b = expr.roll_with_rng(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_eq!(a.rolls.len(), 3);
    }

    #[test]
    fn test_display() {
        let roll = DiceRoll {
            notation: "2d6+1".to_string(),
            rolls: vec![3, 5],
            modifier: 1,
            total: 9,
        };
        assert_eq!(roll.to_string(), "[3, 5] + 1 = 9");
    }
}
