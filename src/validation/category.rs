//! Category table
//!
//! Issues are classified by matching their message text against an ordered
//! list of rules; the first match wins. This is best-effort: the engine's
//! wording can change at any time, so the table is meant to be extended, not
//! trusted as exhaustive.

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Deserialize;

use super::issue::Category;

/// One rule as written in TOML
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryRuleDef {
    pub category: Category,
    /// Alternatives; each is a set of substrings that must all appear
    #[serde(default)]
    pub any: Vec<Vec<String>>,
    /// Regex tried against the raw message
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryFile {
    rules: Vec<CategoryRuleDef>,
}

#[derive(Debug, Clone)]
struct CategoryRule {
    category: Category,
    any: Vec<Vec<String>>,
    pattern: Option<Regex>,
}

impl CategoryRule {
    fn compile(def: &CategoryRuleDef) -> Result<Self> {
        if def.any.iter().all(|alt| alt.is_empty()) && def.pattern.is_none() {
            bail!("Category rule for {} matches nothing", def.category);
        }
        let pattern = def
            .pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .with_context(|| format!("Invalid pattern in category rule for {}", def.category))?;

        Ok(Self {
            category: def.category,
            any: def
                .any
                .iter()
                .filter(|alt| !alt.is_empty())
                .map(|alt| alt.iter().map(|s| s.to_lowercase()).collect())
                .collect(),
            pattern,
        })
    }

    fn matches(&self, message: &str, lowered: &str) -> bool {
        self.any
            .iter()
            .any(|alt| alt.iter().all(|needle| lowered.contains(needle.as_str())))
            || self
                .pattern
                .as_ref()
                .is_some_and(|pattern| pattern.is_match(message))
    }
}

/// Ordered message-to-category rules
#[derive(Debug, Clone)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CategoryTable {
    /// The embedded rule table
    pub fn builtin() -> Self {
        let embedded_toml = include_str!("../../resources/categories.toml");

        let parsed = toml::from_str::<CategoryFile>(embedded_toml)
            .context("Failed to parse embedded category table")
            .and_then(|file| Self::from_defs(&file.rules));
        match parsed {
            Ok(table) => table,
            Err(e) => {
                log::warn!("{:#}. Using minimal fallback category table.", e);
                Self::minimal()
            }
        }
    }

    /// Compile rules in the given order
    pub fn from_defs(defs: &[CategoryRuleDef]) -> Result<Self> {
        let rules = defs
            .iter()
            .map(CategoryRule::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// User rules first, then the built-in table
    pub fn with_extra_rules(extra: &[CategoryRuleDef]) -> Result<Self> {
        let mut table = Self::from_defs(extra)?;
        table.rules.extend(Self::builtin().rules);
        Ok(table)
    }

    /// First matching category, or `Other`
    pub fn classify(&self, message: &str) -> Category {
        let lowered = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(message, &lowered))
            .map(|rule| rule.category)
            .unwrap_or(Category::Other)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Fallback used if the embedded table cannot be loaded
    fn minimal() -> Self {
        fn rule(category: Category, needles: &[&str]) -> CategoryRule {
            CategoryRule {
                category,
                any: vec![needles.iter().map(|s| s.to_string()).collect()],
                pattern: None,
            }
        }

        Self {
            rules: vec![
                rule(Category::UnusedConcept, &["not used"]),
                rule(Category::EmptyValue, &["empty", "value"]),
                rule(Category::Duplicate, &["duplicate"]),
                rule(Category::TimeWindow, &["time window"]),
                rule(Category::MissingCriteria, &["missing"]),
            ],
        }
    }
}
