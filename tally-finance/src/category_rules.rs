//! Ordered substring rules mapping merchant descriptions to categories.
//!
//! Rules are checked in declaration order and the first hit wins, so more
//! specific patterns ("UBER EATS") must come before broader ones ("UBER").

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tally_core::{Vocabulary, INCOME, TRANSFER};

use crate::error::Result;

/// Built-in rules, consulted after any user rules
const BUILTIN_RULES: &[(&str, &str)] = &[
    // Money moving between own accounts or arriving
    ("TRANSFER TO", TRANSFER),
    ("TRANSFER FROM", TRANSFER),
    ("INTERNAL TRANSFER", TRANSFER),
    ("PAYMENT THANK YOU", TRANSFER),
    ("AUTOPAY", TRANSFER),
    ("SALARY", INCOME),
    ("PAYROLL", INCOME),
    ("INTEREST CREDIT", INCOME),
    // Groceries
    ("WOOLWORTHS", "Groceries"),
    ("COLES", "Groceries"),
    ("ALDI", "Groceries"),
    ("HARRIS FARM", "Groceries"),
    ("COSTCO", "Groceries"),
    // Food delivery before rideshare
    ("UBER EATS", "Dining"),
    ("DOORDASH", "Dining"),
    ("MENULOG", "Dining"),
    ("MCDONALD", "Dining"),
    ("STARBUCKS", "Coffee"),
    ("GLORIA JEAN", "Coffee"),
    // Transport
    ("UBER", "Transport"),
    ("DIDI", "Transport"),
    ("OPAL", "Transport"),
    ("MYKI", "Transport"),
    ("AMPOL", "Fuel"),
    ("CALTEX", "Fuel"),
    ("SHELL", "Fuel"),
    // Subscriptions
    ("NETFLIX", "Subscriptions"),
    ("SPOTIFY", "Subscriptions"),
    ("DISNEY PLUS", "Subscriptions"),
    ("YOUTUBE", "Subscriptions"),
    ("APPLE.COM/BILL", "Subscriptions"),
    ("OPENAI", "Subscriptions"),
    ("GITHUB", "Subscriptions"),
    // Bills
    ("ORIGIN ENERGY", "Utilities"),
    ("TELSTRA", "Utilities"),
    ("OPTUS", "Utilities"),
    ("SYDNEY WATER", "Utilities"),
    ("CHEMIST WAREHOUSE", "Health"),
    ("PRICELINE PHARMACY", "Health"),
    ("BUPA", "Insurance"),
    ("NRMA", "Insurance"),
    // Shopping and home
    ("BUNNINGS", "Home"),
    ("IKEA", "Home"),
    ("AMAZON", "Shopping"),
    ("KMART", "Shopping"),
    ("JB HI-FI", "Shopping"),
    // Travel and going out
    ("QANTAS", "Travel"),
    ("JETSTAR", "Travel"),
    ("AIRBNB", "Travel"),
    ("HOYTS", "Entertainment"),
    ("TICKETEK", "Entertainment"),
    ("INTERNATIONAL TRANSACTION FEE", "Fees"),
    ("ACCOUNT FEE", "Fees"),
];

/// One `pattern -> category` rule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rule {
    pub pattern: String,
    pub category: String,
}

impl Rule {
    pub fn new(pattern: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            category: category.into(),
        }
    }

    /// Case-insensitive containment test
    pub fn matches(&self, description: &str) -> bool {
        description
            .to_lowercase()
            .contains(&self.pattern.to_lowercase())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Empty patterns would match everything and are dropped
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .filter(|r| !r.pattern.trim().is_empty())
                .collect(),
        }
    }

    pub fn builtin() -> Self {
        Self::new(BUILTIN_RULES.iter().map(|(p, c)| Rule::new(*p, *c)))
    }

    /// Append `fallback` after this set's own rules
    pub fn then(mut self, fallback: RuleSet) -> Self {
        self.rules.extend(fallback.rules);
        self
    }

    /// First rule, in declaration order, that matches `description` and
    /// whose category exists in `vocabulary`.
    pub fn first_match(&self, description: &str, vocabulary: &Vocabulary) -> Option<&Rule> {
        self.rules
            .iter()
            .filter(|r| vocabulary.contains(&r.category))
            .find(|r| r.matches(description))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// User categories file:
///
/// ```json
/// {
///   "categories": ["Groceries", "Coffee"],
///   "rules": [{ "pattern": "WOOLWORTH", "category": "Groceries" }],
///   "default_category": "Uncategorized"
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoriesConfig {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default, alias = "default")]
    pub default_category: Option<String>,
}

impl CategoriesConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())?;
        Self::from_json(&s)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// The configured vocabulary, if the file lists one
    pub fn vocabulary(&self) -> Option<Vocabulary> {
        if self.categories.is_empty() {
            None
        } else {
            Some(Vocabulary::from_names(&self.categories))
        }
    }

    /// User rules first, then the built-in table
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::new(self.rules.iter().cloned()).then(RuleSet::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_containment() {
        let r = Rule::new("woolworth", "Groceries");
        assert!(r.matches("WOOLWORTHS 1234 SYDNEY"));
        assert!(!r.matches("COLES 552"));
    }

    #[test]
    fn test_first_declared_rule_wins() {
        let v = Vocabulary::builtin();
        let rules = RuleSet::new([
            Rule::new("UBER", "Transport"),
            Rule::new("UBER EATS", "Dining"),
        ]);
        let hit = rules.first_match("UBER EATS SYDNEY", &v).unwrap();
        assert_eq!(hit.category, "Transport");

        let builtin = RuleSet::builtin();
        assert_eq!(builtin.first_match("UBER EATS SYDNEY", &v).unwrap().category, "Dining");
        assert_eq!(builtin.first_match("UBER *TRIP", &v).unwrap().category, "Transport");
    }

    #[test]
    fn test_rules_outside_vocabulary_are_skipped() {
        let v = Vocabulary::from_names(["Groceries"]);
        let rules = RuleSet::new([
            Rule::new("MARKET", "Farmers Market"),
            Rule::new("MARKET", "Groceries"),
        ]);
        assert_eq!(rules.first_match("CITY MARKET", &v).unwrap().category, "Groceries");
    }

    #[test]
    fn test_empty_patterns_dropped() {
        let rules = RuleSet::new([Rule::new("  ", "Groceries"), Rule::new("X", "Fees")]);
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_builtin_categories_exist_in_builtin_vocabulary() {
        let v = Vocabulary::builtin();
        for (_, cat) in BUILTIN_RULES {
            assert!(v.contains(cat), "{cat} missing from vocabulary");
        }
    }

    #[test]
    fn test_config_parsing_and_precedence() {
        let cfg = CategoriesConfig::from_json(
            r#"{
                "categories": ["Groceries", "Dining", "Transport"],
                "rules": [{"pattern": "UBER", "category": "Dining"}],
                "default": "Groceries"
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.default_category.as_deref(), Some("Groceries"));

        let v = cfg.vocabulary().unwrap();
        assert_eq!(v.len(), 4);

        // User rule shadows the built-in UBER -> Transport
        let rules = cfg.rule_set();
        assert_eq!(rules.first_match("UBER TRIP", &v).unwrap().category, "Dining");
        assert_eq!(rules.first_match("COLES 12", &v).unwrap().category, "Groceries");
    }

    #[test]
    fn test_config_defaults() {
        let cfg = CategoriesConfig::from_json("{}").unwrap();
        assert!(cfg.vocabulary().is_none());
        assert!(cfg.default_category.is_none());
        assert_eq!(cfg.rule_set().len(), RuleSet::builtin().len());
    }

    #[test]
    fn test_config_malformed() {
        assert!(CategoriesConfig::from_json("{\"rules\": 5}").is_err());
    }
}
