//! # Registration Page Commands
//!
//! Every command returns the refreshed [`FormView`], so the presentation
//! layer re-renders from one value after each keystroke.

use serde::Serialize;
use storefront_core::{FieldId, FormView};
use tracing::debug;
use ts_rs::TS;

use crate::error::ApiError;
use crate::state::{PendingSubmission, RegistrationState};

/// Response to a submit that was accepted and is now in flight.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SubmitResponse {
    pub submission_id: String,
    pub form: FormView,
}

pub fn get_form(registration: &RegistrationState) -> FormView {
    registration.with_form(|form| form.view())
}

/// Records a field change and re-validates eagerly.
///
/// `field` accepts the wire name (`confirmPassword`) and loose spellings
/// such as `confirm_password`.
pub fn update_field(
    registration: &RegistrationState,
    field: &str,
    value: String,
) -> Result<FormView, ApiError> {
    let field: FieldId = field.parse()?;
    if field.is_secret() {
        debug!(%field, "update_field command");
    } else {
        debug!(%field, value = %value, "update_field command");
    }

    registration.with_form_mut(|form| {
        form.set_value(field, value)?;
        Ok::<FormView, ApiError>(form.view())
    })
}

/// Restores one field to its default.
pub fn reset_field(registration: &RegistrationState, field: &str) -> Result<FormView, ApiError> {
    let field: FieldId = field.parse()?;
    debug!(%field, "reset_field command");

    registration.with_form_mut(|form| {
        form.reset_field(field)?;
        Ok::<FormView, ApiError>(form.view())
    })
}

/// Starts a submission. Signals arrive later through the sink.
pub fn submit_registration(
    registration: &RegistrationState,
) -> Result<(PendingSubmission, SubmitResponse), ApiError> {
    debug!("submit_registration command");

    let pending = registration.submit()?;
    let response = SubmitResponse {
        submission_id: pending.id().to_string(),
        form: get_form(registration),
    };
    Ok((pending, response))
}
