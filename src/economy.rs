//! Starting-gold accounting and currency parsing.
//!
//! Prices in the data packs are free text using single-letter coin units
//! (`O` gold, `P` silver, `C` copper in the seeded packs; `g`/`s` are
//! accepted for English-labeled content). Parsing is additive over every
//! coin token found, with a bare-number fallback; unparsable text is
//! worth nothing.

use lazy_static::lazy_static;
use regex::Regex;

use crate::items::Item;

/// Fixed starting-gold budget for a new character.
pub const STARTING_GOLD: f64 = 30.0;

lazy_static! {
    static ref COIN_RE: Regex =
        Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(gp|sp|cp|g|o|s|p|c)\b").unwrap();
    static ref NUMBER_RE: Regex = Regex::new(r"\d+(?:[.,]\d+)?").unwrap();
}

/// Parse a free-text price into gold. Silver is a tenth, copper a
/// hundredth; all coin tokens in the text are summed.
pub fn price_to_gold(text: &str) -> f64 {
    let mut total = 0.0;
    let mut matched = false;

    for caps in COIN_RE.captures_iter(text) {
        let amount: f64 = caps[1].replace(',', ".").parse().unwrap_or(0.0);
        let unit = caps[2]
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or('g');
        let rate = match unit {
            'g' | 'o' => 1.0,
            's' | 'p' => 0.1,
            _ => 0.01,
        };
        total += amount * rate;
        matched = true;
    }

    if matched {
        return total;
    }

    // No unit token: fall back to a bare numeric parse.
    if let Ok(value) = text.trim().replace(',', ".").parse::<f64>() {
        return value;
    }
    NUMBER_RE
        .find(text)
        .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Total gold spent across an actor's gear, quantity included.
pub fn spent_gold(items: &[Item]) -> f64 {
    items
        .iter()
        .filter(|i| i.kind.is_gear())
        .map(|i| price_to_gold(&i.price) * i.quantity.max(1) as f64)
        .sum()
}

/// Whether a total spend fits the starting budget.
pub fn within_budget(spent: f64) -> bool {
    spent <= STARTING_GOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemKind;

    #[test]
    fn test_mixed_coin_string() {
        assert_eq!(price_to_gold("10 O, 5 P"), 10.5);
    }

    #[test]
    fn test_empty_string_is_zero() {
        assert_eq!(price_to_gold(""), 0.0);
    }

    #[test]
    fn test_copper_and_case() {
        assert_eq!(price_to_gold("250 c"), 2.5);
        assert_eq!(price_to_gold("3 G 5 S"), 3.5);
    }

    #[test]
    fn test_bare_number_fallback() {
        assert_eq!(price_to_gold("12"), 12.0);
        assert_eq!(price_to_gold("about 7 coins"), 7.0);
        assert_eq!(price_to_gold("priceless"), 0.0);
    }

    #[test]
    fn test_decimal_amounts() {
        assert_eq!(price_to_gold("1.5 O"), 1.5);
        assert_eq!(price_to_gold("2,5"), 2.5);
    }

    #[test]
    fn test_spent_gold_counts_quantity_and_gear_only() {
        let mut sword = Item::new("Longsword", ItemKind::Weapon);
        sword.price = "15 O".to_string();

        let mut rations = Item::new("Rations", ItemKind::Consumable);
        rations.price = "5 P".to_string();
        rations.quantity = 4;

        let mut talent = Item::new("Watchful", ItemKind::Talent);
        talent.price = "100 O".to_string(); // not gear, never counted

        let items = vec![sword, rations, talent];
        assert_eq!(spent_gold(&items), 15.0 + 0.5 * 4.0);
    }

    #[test]
    fn test_zero_quantity_counts_as_one() {
        let mut torch = Item::new("Torch", ItemKind::Equipment);
        torch.price = "1 O".to_string();
        torch.quantity = 0;
        assert_eq!(spent_gold(&[torch]), 1.0);
    }

    #[test]
    fn test_budget_boundary() {
        assert!(within_budget(STARTING_GOLD));
        assert!(!within_budget(STARTING_GOLD + 0.01));
    }
}
