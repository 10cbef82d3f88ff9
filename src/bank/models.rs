use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Question difficulty tiers, in ascending order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One multiple-choice quiz item. Immutable after catalog load; identity is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub choices: Vec<String>,
    pub correct_choice_index: usize,
    pub difficulty: Difficulty,
    pub category: String,
    pub book_reference: String,
}

impl Question {
    pub fn is_correct(&self, choice_index: usize) -> bool {
        choice_index == self.correct_choice_index
    }
}

/// Catalog breakdown, mirroring the question database's stats view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankStats {
    pub total: usize,
    pub by_difficulty: HashMap<Difficulty, usize>,
    pub by_category: HashMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn difficulty_parses_lowercase() {
        assert_eq!(Difficulty::from_str("easy").unwrap(), Difficulty::Easy);
        assert_eq!(Difficulty::from_str("hard").unwrap(), Difficulty::Hard);
        assert!(Difficulty::from_str("brutal").is_err());
    }

    #[test]
    fn difficulty_serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&Difficulty::Medium).unwrap(), "\"medium\"");
        let parsed: Difficulty = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, Difficulty::Medium);
    }
}
