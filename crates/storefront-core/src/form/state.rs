//! # Form State
//!
//! Field values, touched flags, displayed errors and the submission phase of
//! one mounted registration form.
//!
//! ## Validation Flow
//! ```text
//! set_value(field, v)
//!   │
//!   ├── values[field] = v, touched += field
//!   ├── field_errors[field] = first failing rule of field
//!   └── for each cross rule involving field:
//!         cross_errors[target] = message   (target touched AND check fails)
//!                              = cleared   (otherwise)
//!
//! is_valid() = every field passes its rules AND every cross rule passes
//!              (computed over ALL fields, touched or not)
//! ```
//!
//! ## Submission Phase Machine
//! ```text
//!            begin_submit (valid, touched)
//!   ┌──────┐ ─────────────────────────► ┌────────────┐
//!   │ Idle │                            │ Submitting │──── begin_submit ──► AlreadySubmitting
//!   └──────┘ ◄──────── abort ────────── └─────┬──────┘
//!      ▲                                      │ complete_submit
//!      │ (Idle-equivalent)          ┌─────────┴─────────┐
//!      │                            ▼                   ▼
//!      │                     ┌───────────┐       ┌────────────┐
//!      └──── begin_submit ── │ Succeeded │       │   Failed   │ ── begin_submit ──►
//!                            └───────────┘       └────────────┘
//! ```
//!
//! Timers and signals live in the app layer; this type only records phase.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::schema::{FieldId, FormSchema};
use crate::error::{CoreError, CoreResult};

// =============================================================================
// Submission Id
// =============================================================================

/// Identifies one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        SubmissionId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Submission Phase
// =============================================================================

/// Where the form is in its submission lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "phase", rename_all = "snake_case")]
#[ts(export)]
pub enum SubmissionPhase {
    Idle,

    Submitting {
        #[ts(as = "String")]
        id: SubmissionId,
        #[serde(rename = "startedAt")]
        #[ts(as = "String")]
        started_at: DateTime<Utc>,
    },

    Succeeded {
        #[ts(as = "String")]
        id: SubmissionId,
    },

    Failed {
        #[ts(as = "String")]
        id: SubmissionId,
        message: String,
    },
}

impl SubmissionPhase {
    pub fn is_submitting(&self) -> bool {
        matches!(self, SubmissionPhase::Submitting { .. })
    }

    /// Idle, Succeeded and Failed all accept a new submit.
    pub fn accepts_submit(&self) -> bool {
        !self.is_submitting()
    }

    /// The form-level error shown after a failed attempt.
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            SubmissionPhase::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    fn pending_id(&self) -> Option<SubmissionId> {
        match self {
            SubmissionPhase::Submitting { id, .. } => Some(*id),
            _ => None,
        }
    }
}

impl Default for SubmissionPhase {
    fn default() -> Self {
        SubmissionPhase::Idle
    }
}

// =============================================================================
// Submission
// =============================================================================

/// Snapshot of the values handed to a submitter.
///
/// Later edits to the form do not affect a submission already started.
#[derive(Clone)]
pub struct Submission {
    pub id: SubmissionId,
    pub values: BTreeMap<FieldId, String>,
}

impl Submission {
    pub fn value(&self, field: FieldId) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }
}

impl fmt::Debug for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: BTreeMap<FieldId, &str> = self
            .values
            .iter()
            .map(|(field, value)| {
                let shown = if field.is_secret() { "***" } else { value.as_str() };
                (*field, shown)
            })
            .collect();

        f.debug_struct("Submission")
            .field("id", &self.id)
            .field("values", &values)
            .finish()
    }
}

// =============================================================================
// Form View
// =============================================================================

/// Everything the presentation layer renders for the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FormView {
    pub values: BTreeMap<FieldId, String>,
    pub errors: BTreeMap<FieldId, String>,
    pub touched: Vec<FieldId>,
    pub is_valid: bool,
    pub can_submit: bool,
    pub phase: SubmissionPhase,
}

// =============================================================================
// Form State
// =============================================================================

/// State of one registration form instance.
#[derive(Debug, Clone)]
pub struct FormState {
    schema: Arc<FormSchema>,
    values: BTreeMap<FieldId, String>,
    touched: BTreeSet<FieldId>,
    field_errors: BTreeMap<FieldId, String>,
    cross_errors: BTreeMap<FieldId, String>,
    phase: SubmissionPhase,
}

impl FormState {
    /// Mounts a form with every field at its default and nothing shown.
    pub fn new(schema: Arc<FormSchema>) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|spec| (spec.field, spec.default.clone()))
            .collect();

        FormState {
            schema,
            values,
            touched: BTreeSet::new(),
            field_errors: BTreeMap::new(),
            cross_errors: BTreeMap::new(),
            phase: SubmissionPhase::Idle,
        }
    }

    pub fn schema(&self) -> &Arc<FormSchema> {
        &self.schema
    }

    /// Records a change to one field and re-validates it eagerly.
    pub fn set_value(&mut self, field: FieldId, value: impl Into<String>) -> CoreResult<()> {
        self.ensure_declared(field)?;

        self.values.insert(field, value.into());
        self.touched.insert(field);
        self.refresh_field_error(field);
        self.refresh_cross_errors_involving(field);
        Ok(())
    }

    /// Restores one field's default, clears its touched flag and its own error.
    ///
    /// Other fields' rules are not re-run; cross rules involving the field are.
    pub fn reset_field(&mut self, field: FieldId) -> CoreResult<()> {
        let default = self
            .schema
            .spec(field)
            .map(|spec| spec.default.clone())
            .ok_or_else(|| CoreError::UnknownField(field.to_string()))?;

        self.values.insert(field, default);
        self.touched.remove(&field);
        self.field_errors.remove(&field);
        self.refresh_cross_errors_involving(field);
        Ok(())
    }

    pub fn value(&self, field: FieldId) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    /// Displayed error for a field; a cross-field message wins over the
    /// field's own.
    pub fn error(&self, field: FieldId) -> Option<&str> {
        self.cross_errors
            .get(&field)
            .or_else(|| self.field_errors.get(&field))
            .map(String::as_str)
    }

    /// All displayed errors, one per field.
    pub fn errors(&self) -> BTreeMap<FieldId, String> {
        self.schema
            .fields()
            .iter()
            .filter_map(|spec| {
                self.error(spec.field)
                    .map(|message| (spec.field, message.to_string()))
            })
            .collect()
    }

    pub fn is_touched(&self, field: FieldId) -> bool {
        self.touched.contains(&field)
    }

    pub fn has_touched_fields(&self) -> bool {
        !self.touched.is_empty()
    }

    /// Every field passes its rules and every cross rule passes.
    pub fn is_valid(&self) -> bool {
        self.invalid_fields().is_empty()
    }

    /// Fields failing their own rules or targeted by a failing cross rule,
    /// in form order.
    pub fn invalid_fields(&self) -> Vec<FieldId> {
        let cross_targets: BTreeSet<FieldId> = self
            .schema
            .cross_rules()
            .iter()
            .filter(|rule| !rule.passes(&self.values))
            .map(|rule| rule.target)
            .collect();

        self.schema
            .fields()
            .iter()
            .filter(|spec| {
                cross_targets.contains(&spec.field)
                    || spec.first_failure(self.value(spec.field)).is_some()
            })
            .map(|spec| spec.field)
            .collect()
    }

    /// Valid, at least one field touched, and not already submitting.
    pub fn can_submit(&self) -> bool {
        self.phase.accepts_submit() && self.has_touched_fields() && self.is_valid()
    }

    pub fn phase(&self) -> &SubmissionPhase {
        &self.phase
    }

    /// Starts a submission attempt.
    ///
    /// ## Errors
    /// Checked in this order:
    /// - [`CoreError::AlreadySubmitting`] while a submission is in flight
    /// - [`CoreError::NothingChanged`] when no field is touched
    /// - [`CoreError::InvalidForm`] when any rule fails; every field's error
    ///   is then shown, touched or not
    pub fn begin_submit(&mut self) -> CoreResult<Submission> {
        if self.phase.is_submitting() {
            return Err(CoreError::AlreadySubmitting);
        }
        if !self.has_touched_fields() {
            return Err(CoreError::NothingChanged);
        }

        let invalid = self.invalid_fields();
        if !invalid.is_empty() {
            self.surface_all_errors();
            return Err(CoreError::InvalidForm { fields: invalid });
        }

        let id = SubmissionId::new();
        self.phase = SubmissionPhase::Submitting {
            id,
            started_at: Utc::now(),
        };

        Ok(Submission {
            id,
            values: self.values.clone(),
        })
    }

    /// Settles the pending submission. Field values are kept either way.
    pub fn complete_submit(
        &mut self,
        id: SubmissionId,
        outcome: Result<(), String>,
    ) -> CoreResult<&SubmissionPhase> {
        self.ensure_pending(id)?;

        self.phase = match outcome {
            Ok(()) => SubmissionPhase::Succeeded { id },
            Err(message) => SubmissionPhase::Failed { id, message },
        };
        Ok(&self.phase)
    }

    /// Drops the pending submission and returns to Idle.
    pub fn abort_submit(&mut self, id: SubmissionId) -> CoreResult<()> {
        self.ensure_pending(id)?;
        self.phase = SubmissionPhase::Idle;
        Ok(())
    }

    pub fn view(&self) -> FormView {
        FormView {
            values: self.values.clone(),
            errors: self.errors(),
            touched: self.touched.iter().copied().collect(),
            is_valid: self.is_valid(),
            can_submit: self.can_submit(),
            phase: self.phase.clone(),
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn ensure_declared(&self, field: FieldId) -> CoreResult<()> {
        match self.schema.spec(field) {
            Some(_) => Ok(()),
            None => Err(CoreError::UnknownField(field.to_string())),
        }
    }

    fn ensure_pending(&self, id: SubmissionId) -> CoreResult<()> {
        match self.phase.pending_id() {
            Some(pending) if pending == id => Ok(()),
            _ => Err(CoreError::StaleSubmission(id)),
        }
    }

    fn refresh_field_error(&mut self, field: FieldId) {
        let failure = self
            .schema
            .spec(field)
            .and_then(|spec| spec.first_failure(self.value(field)))
            .map(str::to_string);

        match failure {
            Some(message) => self.field_errors.insert(field, message),
            None => self.field_errors.remove(&field),
        };
    }

    fn refresh_cross_errors_involving(&mut self, field: FieldId) {
        let targets: BTreeSet<FieldId> = self
            .schema
            .cross_rules()
            .iter()
            .filter(|rule| rule.involves(field) || rule.target == field)
            .map(|rule| rule.target)
            .collect();

        // A touched but blank target shows no mismatch until the user types.
        for target in targets {
            let shown = if self.is_touched(target) && !self.value(target).is_empty() {
                self.first_cross_failure(target)
            } else {
                None
            };

            match shown {
                Some(message) => self.cross_errors.insert(target, message),
                None => self.cross_errors.remove(&target),
            };
        }
    }

    fn first_cross_failure(&self, target: FieldId) -> Option<String> {
        self.schema
            .cross_rules()
            .iter()
            .filter(|rule| rule.target == target)
            .find(|rule| !rule.passes(&self.values))
            .map(|rule| rule.message.clone())
    }

    fn surface_all_errors(&mut self) {
        let fields: Vec<FieldId> = self.schema.fields().iter().map(|s| s.field).collect();

        for field in fields {
            self.refresh_field_error(field);
        }

        let targets: BTreeSet<FieldId> =
            self.schema.cross_rules().iter().map(|r| r.target).collect();
        for target in targets {
            match self.first_cross_failure(target) {
                Some(message) => self.cross_errors.insert(target, message),
                None => self.cross_errors.remove(&target),
            };
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
