//! Registration form schema: which fields exist, their defaults, their rules.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::rules::{CrossFieldRule, FieldRule, Rule};
use crate::error::{CoreError, ValidationError};
use crate::validation::ValidationResult;
use crate::{MINIMUM_AGE, PASSWORD_SPECIAL_CHARS};

// =============================================================================
// Field Id
// =============================================================================

/// The registration form's fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum FieldId {
    FullName,
    Email,
    Password,
    ConfirmPassword,
    Age,
}

impl FieldId {
    /// All fields in form order.
    pub const ALL: [FieldId; 5] = [
        FieldId::FullName,
        FieldId::Email,
        FieldId::Password,
        FieldId::ConfirmPassword,
        FieldId::Age,
    ];

    /// Wire name, as used in JSON and TOML.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::FullName => "fullName",
            FieldId::Email => "email",
            FieldId::Password => "password",
            FieldId::ConfirmPassword => "confirmPassword",
            FieldId::Age => "age",
        }
    }

    /// Whether the raw value must be kept out of logs.
    pub fn is_secret(&self) -> bool {
        matches!(self, FieldId::Password | FieldId::ConfirmPassword)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `fullName`, `fullname`, `full_name`, `full-name` and so on.
impl FromStr for FieldId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "fullname" | "name" => Ok(FieldId::FullName),
            "email" => Ok(FieldId::Email),
            "password" => Ok(FieldId::Password),
            "confirmpassword" | "confirm" => Ok(FieldId::ConfirmPassword),
            "age" => Ok(FieldId::Age),
            _ => Err(CoreError::UnknownField(s.to_string())),
        }
    }
}

// =============================================================================
// Field Spec
// =============================================================================

/// One field's default value and ordered rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: FieldId,

    /// Raw value at mount and after a reset.
    #[serde(default)]
    pub default: String,

    /// An optional field with a blank value skips its rules.
    #[serde(default)]
    pub optional: bool,

    #[serde(default)]
    pub rules: Vec<FieldRule>,
}

impl FieldSpec {
    pub fn new(field: FieldId) -> Self {
        FieldSpec {
            field,
            default: String::new(),
            optional: false,
            rules: Vec::new(),
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = value.into();
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn rule(mut self, rule: Rule, message: impl Into<String>) -> Self {
        self.rules.push(FieldRule::new(rule, message));
        self
    }

    /// Message of the first failing rule, if any.
    pub fn first_failure(&self, value: &str) -> Option<&str> {
        if self.optional && value.trim().is_empty() {
            return None;
        }

        self.rules
            .iter()
            .find(|r| !r.rule.passes(value))
            .map(|r| r.message.as_str())
    }
}

// =============================================================================
// Form Schema
// =============================================================================

/// Immutable form configuration shared by every form instance.
///
/// ## Registration Schema
/// ```text
/// fullName         MinChars(3)
/// email            EmailSyntax
/// password         MinChars(8) → ContainsDigit → ContainsAnyOf(specials)
/// confirmPassword  (no own rules)
/// age              optional: WholeNumber → AtLeast(18)
///
/// cross: password == confirmPassword  ──► error on confirmPassword
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSchema {
    fields: Vec<FieldSpec>,

    #[serde(default)]
    cross_rules: Vec<CrossFieldRule>,
}

impl FormSchema {
    /// Builds a schema, checking that every rule refers to a declared field.
    pub fn new(fields: Vec<FieldSpec>, cross_rules: Vec<CrossFieldRule>) -> ValidationResult<Self> {
        let schema = FormSchema {
            fields,
            cross_rules,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// The registration form as shipped.
    pub fn registration() -> Self {
        FormSchema {
            fields: vec![
                FieldSpec::new(FieldId::FullName).rule(Rule::MinChars(3), "Full name is required."),
                FieldSpec::new(FieldId::Email).rule(Rule::EmailSyntax, "Invalid email."),
                FieldSpec::new(FieldId::Password)
                    .rule(
                        Rule::MinChars(8),
                        "The password must be at least 8 characters long.",
                    )
                    .rule(
                        Rule::ContainsDigit,
                        "The password must contain at least one number.",
                    )
                    .rule(
                        Rule::ContainsAnyOf(PASSWORD_SPECIAL_CHARS.to_string()),
                        "The password must contain at least one special character.",
                    ),
                FieldSpec::new(FieldId::ConfirmPassword),
                FieldSpec::new(FieldId::Age)
                    .optional()
                    .rule(Rule::WholeNumber, "Age must be a whole number.")
                    .rule(
                        Rule::AtLeast(MINIMUM_AGE),
                        format!("You must be at least {} years old.", MINIMUM_AGE),
                    ),
            ],
            cross_rules: vec![CrossFieldRule::equal(
                FieldId::Password,
                FieldId::ConfirmPassword,
                "Passwords do not match.",
            )],
        }
    }

    /// Checks field uniqueness and that cross rules only name declared fields.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut declared = HashSet::new();
        for spec in &self.fields {
            if !declared.insert(spec.field) {
                return Err(ValidationError::Duplicate {
                    field: "form field".to_string(),
                    value: spec.field.to_string(),
                });
            }
        }

        for rule in &self.cross_rules {
            let referenced = rule.check.fields().into_iter().chain([rule.target]);
            for field in referenced {
                if !declared.contains(&field) {
                    return Err(ValidationError::UndeclaredField {
                        field: field.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn spec(&self, field: FieldId) -> Option<&FieldSpec> {
        self.fields.iter().find(|s| s.field == field)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn cross_rules(&self) -> &[CrossFieldRule] {
        &self.cross_rules
    }
}

impl Default for FormSchema {
    fn default() -> Self {
        Self::registration()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
