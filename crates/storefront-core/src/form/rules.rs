//! Declarative field and cross-field rules.
//!
//! Rules are tagged variants, not closures, so a schema can be loaded from
//! configuration and compared in tests.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::schema::FieldId;

/// Local part, `@`, dot-separated domain labels, alphabetic TLD of 2+.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@(?:[a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
        .expect("email pattern is a valid regex")
});

// =============================================================================
// Field Rules
// =============================================================================

/// A single-field predicate.
///
/// ## TOML form
/// ```toml
/// rule = { kind = "min_chars", value = 3 }
/// rule = { kind = "email_syntax" }
/// rule = { kind = "contains_any_of", value = "!@#" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Rule {
    /// At least `n` characters (Unicode scalar values, not bytes).
    MinChars(usize),

    /// Well-formed `local@domain.tld` address.
    EmailSyntax,

    /// At least one ASCII digit.
    ContainsDigit,

    /// At least one character from the set.
    ContainsAnyOf(String),

    /// Parses as a whole number (surrounding whitespace ignored).
    WholeNumber,

    /// Parses as a whole number no smaller than the bound.
    AtLeast(i64),
}

impl Rule {
    /// Checks a raw field value against this rule.
    pub fn passes(&self, value: &str) -> bool {
        match self {
            Rule::MinChars(min) => value.chars().count() >= *min,
            Rule::EmailSyntax => is_email(value),
            Rule::ContainsDigit => value.chars().any(|c| c.is_ascii_digit()),
            Rule::ContainsAnyOf(set) => value.chars().any(|c| set.contains(c)),
            Rule::WholeNumber => value.trim().parse::<i64>().is_ok(),
            Rule::AtLeast(min) => value.trim().parse::<i64>().is_ok_and(|n| n >= *min),
        }
    }
}

fn is_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && EMAIL_PATTERN.is_match(value)
}

/// A rule paired with the message shown when it fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub rule: Rule,
    pub message: String,
}

impl FieldRule {
    pub fn new(rule: Rule, message: impl Into<String>) -> Self {
        FieldRule {
            rule,
            message: message.into(),
        }
    }
}

// =============================================================================
// Cross-Field Rules
// =============================================================================

/// A predicate over more than one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CrossCheck {
    /// Both fields hold exactly the same raw value.
    Equal { left: FieldId, right: FieldId },
}

impl CrossCheck {
    /// Fields whose change requires re-running this check.
    pub fn fields(&self) -> [FieldId; 2] {
        match self {
            CrossCheck::Equal { left, right } => [*left, *right],
        }
    }
}

/// A cross-field check, the field its error attaches to, and the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossFieldRule {
    pub check: CrossCheck,
    pub target: FieldId,
    pub message: String,
}

impl CrossFieldRule {
    /// `left == right`, error attached to `right`.
    pub fn equal(left: FieldId, right: FieldId, message: impl Into<String>) -> Self {
        CrossFieldRule {
            check: CrossCheck::Equal { left, right },
            target: right,
            message: message.into(),
        }
    }

    pub fn involves(&self, field: FieldId) -> bool {
        self.check.fields().contains(&field)
    }

    /// Evaluates the check; absent values read as empty.
    pub fn passes(&self, values: &BTreeMap<FieldId, String>) -> bool {
        let read = |field: &FieldId| values.get(field).map(String::as_str).unwrap_or("");
        match &self.check {
            CrossCheck::Equal { left, right } => read(left) == read(right),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PASSWORD_SPECIAL_CHARS;

    #[test]
    fn test_min_chars_counts_characters() {
        let rule = Rule::MinChars(3);
        assert!(rule.passes("Ann"));
        assert!(rule.passes("Zoë"));
        assert!(!rule.passes("Al"));
        assert!(!rule.passes(""));
    }

    #[test]
    fn test_email_syntax() {
        let rule = Rule::EmailSyntax;
        assert!(rule.passes("jane@x.com"));
        assert!(rule.passes("first.last+tag@mail.example.org"));

        assert!(!rule.passes(""));
        assert!(!rule.passes("jane"));
        assert!(!rule.passes("jane@"));
        assert!(!rule.passes("jane@x"));
        assert!(!rule.passes("jane@x.c"));
        assert!(!rule.passes(".jane@x.com"));
        assert!(!rule.passes("ja..ne@x.com"));
        assert!(!rule.passes("jane.@x.com"));
        assert!(!rule.passes("jane doe@x.com"));
    }

    #[test]
    fn test_character_class_rules() {
        assert!(Rule::ContainsDigit.passes("abc1"));
        assert!(!Rule::ContainsDigit.passes("abcd"));

        let special = Rule::ContainsAnyOf(PASSWORD_SPECIAL_CHARS.to_string());
        assert!(special.passes("Abcdefg1!"));
        assert!(special.passes("quote\"inside"));
        assert!(!special.passes("abcdefg1"));
        assert!(!special.passes("under_score"));
    }

    #[test]
    fn test_numeric_rules() {
        assert!(Rule::WholeNumber.passes("25"));
        assert!(Rule::WholeNumber.passes(" 25 "));
        assert!(!Rule::WholeNumber.passes("twenty"));
        assert!(!Rule::WholeNumber.passes("25.5"));

        assert!(Rule::AtLeast(18).passes("18"));
        assert!(!Rule::AtLeast(18).passes("17"));
        assert!(!Rule::AtLeast(18).passes("abc"));
    }

    #[test]
    fn test_cross_rule_equal() {
        let rule = CrossFieldRule::equal(FieldId::Password, FieldId::ConfirmPassword, "mismatch");
        assert_eq!(rule.target, FieldId::ConfirmPassword);
        assert!(rule.involves(FieldId::Password));
        assert!(rule.involves(FieldId::ConfirmPassword));
        assert!(!rule.involves(FieldId::Email));

        let mut values = BTreeMap::new();
        values.insert(FieldId::Password, "Secret1!".to_string());
        assert!(!rule.passes(&values));

        values.insert(FieldId::ConfirmPassword, "Secret1!".to_string());
        assert!(rule.passes(&values));

        values.insert(FieldId::ConfirmPassword, "secret1!".to_string());
        assert!(!rule.passes(&values));
    }
}
