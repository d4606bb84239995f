//! # Registration State
//!
//! Owns the mounted registration form and drives its submission task.
//!
//! ## Submission Task
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit()                                                               │
//! │    │  lock form ─► begin_submit() ─► Submitting, snapshot ─► unlock     │
//! │    ▼                                                                    │
//! │  tokio::spawn ──► select! ─┬─ cancel.cancelled() ──► abort ─► Idle      │
//! │                            │                          (no signals)      │
//! │                            └─ submitter.submit() ─┬─ Ok  ─► Succeeded   │
//! │                                                   │        Notify(ok)   │
//! │                                                   │        Navigate     │
//! │                                                   └─ Err ─► Failed      │
//! │                                                            Notify(err)  │
//! │                                                                         │
//! │  PendingSubmission { id, cancel, handle } goes back to the caller.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The form lock is only held inside synchronous closures, never across the
//! submitter's await, so edits stay possible while a submission is pending.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use storefront_core::{FormSchema, FormState, Submission, SubmissionId};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use ts_rs::TS;

use crate::config::StorefrontConfig;
use crate::error::ApiError;
use crate::signals::{Signal, SignalSink};
use crate::submit::{SimulatedSubmitter, SubmitError, Submitter};

/// How a submission task ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(tag = "outcome", rename_all = "camelCase")]
#[ts(export)]
pub enum SubmissionOutcome {
    Succeeded,
    Failed { message: String },
    Cancelled,
}

/// What to tell collaborators once a submission succeeds.
#[derive(Debug, Clone)]
struct SuccessSignals {
    destination: String,
    message: String,
}

/// Registration form plus everything its submission needs.
#[derive(Clone)]
pub struct RegistrationState {
    form: Arc<Mutex<FormState>>,
    submitter: Arc<dyn Submitter>,
    sink: Arc<dyn SignalSink>,
    success: Arc<SuccessSignals>,
}

impl RegistrationState {
    pub fn new(
        schema: Arc<FormSchema>,
        submitter: Arc<dyn Submitter>,
        sink: Arc<dyn SignalSink>,
        destination: impl Into<String>,
        success_message: impl Into<String>,
    ) -> Self {
        RegistrationState {
            form: Arc::new(Mutex::new(FormState::new(schema))),
            submitter,
            sink,
            success: Arc::new(SuccessSignals {
                destination: destination.into(),
                message: success_message.into(),
            }),
        }
    }

    /// Mounts the configured schema with the simulated submitter.
    pub fn from_config(config: &StorefrontConfig, sink: Arc<dyn SignalSink>) -> Self {
        Self::new(
            config.schema(),
            Arc::new(SimulatedSubmitter::new(config.submit_delay())),
            sink,
            config.registration.destination.clone(),
            config.registration.success_message.clone(),
        )
    }

    /// Executes a function with read access to the form.
    pub fn with_form<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&FormState) -> R,
    {
        let form = self.form.lock().expect("Form mutex poisoned");
        f(&form)
    }

    /// Executes a function with write access to the form.
    pub fn with_form_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut FormState) -> R,
    {
        let mut form = self.form.lock().expect("Form mutex poisoned");
        f(&mut form)
    }

    /// Starts a submission and spawns the task that settles it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self) -> Result<PendingSubmission, ApiError> {
        let submission = self.with_form_mut(|form| form.begin_submit())?;
        let id = submission.id;
        info!(submission_id = %id, "Registration submission started");

        let cancel = CancellationToken::new();
        let task = SubmissionTask {
            form: Arc::clone(&self.form),
            submitter: Arc::clone(&self.submitter),
            sink: Arc::clone(&self.sink),
            success: Arc::clone(&self.success),
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(task.run(submission));

        Ok(PendingSubmission { id, cancel, handle })
    }
}

// =============================================================================
// Pending Submission
// =============================================================================

/// Handle to a running submission task.
///
/// Dropping it detaches the task; the submission still settles.
#[derive(Debug)]
pub struct PendingSubmission {
    id: SubmissionId,
    cancel: CancellationToken,
    handle: JoinHandle<SubmissionOutcome>,
}

impl PendingSubmission {
    pub fn id(&self) -> SubmissionId {
        self.id
    }

    /// Requests cancellation. The form returns to Idle and no signal is sent,
    /// unless the submission already settled.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the task has finished, whatever the outcome.
    pub fn is_settled(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the task to settle.
    pub async fn wait(self) -> Result<SubmissionOutcome, ApiError> {
        self.handle
            .await
            .map_err(|e| ApiError::internal(format!("Submission task failed: {}", e)))
    }
}

// =============================================================================
// Submission Task
// =============================================================================

struct SubmissionTask {
    form: Arc<Mutex<FormState>>,
    submitter: Arc<dyn Submitter>,
    sink: Arc<dyn SignalSink>,
    success: Arc<SuccessSignals>,
    cancel: CancellationToken,
}

impl SubmissionTask {
    async fn run(self, submission: Submission) -> SubmissionOutcome {
        let result = tokio::select! {
            _ = self.cancel.cancelled() => None,
            result = self.submitter.submit(&submission) => Some(result),
        };

        self.settle(submission.id, result)
    }

    fn settle(
        &self,
        id: SubmissionId,
        result: Option<Result<(), SubmitError>>,
    ) -> SubmissionOutcome {
        let mut form = self.form.lock().expect("Form mutex poisoned");

        let Some(result) = result else {
            if let Err(e) = form.abort_submit(id) {
                warn!(submission_id = %id, error = %e, "Cancelled submission was not pending");
            }
            info!(submission_id = %id, "Registration submission cancelled");
            return SubmissionOutcome::Cancelled;
        };

        let outcome = result.map_err(|e| e.to_string());
        if let Err(e) = form.complete_submit(id, outcome.clone()) {
            warn!(submission_id = %id, error = %e, "Dropping result of stale submission");
            return SubmissionOutcome::Cancelled;
        }
        drop(form);

        match outcome {
            Ok(()) => {
                info!(submission_id = %id, destination = %self.success.destination, "Registration succeeded");
                self.sink.emit(Signal::success(self.success.message.clone()));
                self.sink.emit(Signal::navigate(self.success.destination.clone()));
                SubmissionOutcome::Succeeded
            }
            Err(message) => {
                warn!(submission_id = %id, error = %message, "Registration failed");
                self.sink.emit(Signal::error(message.clone()));
                SubmissionOutcome::Failed { message }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::signals::testing::RecordingSink;
    use crate::signals::NoticeLevel;
    use crate::submit::testing::FailingSubmitter;
    use storefront_core::{CoreError, FieldId, SubmissionPhase};

    const DELAY: Duration = Duration::from_millis(1000);

    fn state_with(submitter: Arc<dyn Submitter>) -> (RegistrationState, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let state = RegistrationState::new(
            Arc::new(FormSchema::registration()),
            submitter,
            sink.clone(),
            "/store",
            "Registration successful!",
        );
        (state, sink)
    }

    fn fill(state: &RegistrationState) {
        state.with_form_mut(|form| {
            form.set_value(FieldId::FullName, "Jane Doe").unwrap();
            form.set_value(FieldId::Email, "jane@x.com").unwrap();
            form.set_value(FieldId::Password, "Secret1!").unwrap();
            form.set_value(FieldId::ConfirmPassword, "Secret1!").unwrap();
            form.set_value(FieldId::Age, "25").unwrap();
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_registration_end_to_end() {
        let (state, sink) = state_with(Arc::new(SimulatedSubmitter::new(DELAY)));
        fill(&state);
        assert!(state.with_form(|f| f.is_valid() && f.can_submit()));
        assert_eq!(state.with_form(|f| f.phase().clone()), SubmissionPhase::Idle);

        let pending = state.submit().unwrap();
        assert!(state.with_form(|f| f.phase().is_submitting()));
        assert!(sink.signals().is_empty());

        let outcome = pending.wait().await.unwrap();
        assert_eq!(outcome, SubmissionOutcome::Succeeded);
        assert!(matches!(
            state.with_form(|f| f.phase().clone()),
            SubmissionPhase::Succeeded { .. }
        ));

        assert_eq!(
            sink.signals(),
            vec![
                Signal::success("Registration successful!"),
                Signal::navigate("/store"),
            ]
        );
        assert_eq!(sink.count(|s| matches!(s, Signal::Navigate { .. })), 1);
        assert_eq!(sink.count(|s| matches!(s, Signal::Notify { .. })), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_waits_for_the_delay() {
        let (state, sink) = state_with(Arc::new(SimulatedSubmitter::new(DELAY)));
        fill(&state);

        let _pending = state.submit().unwrap();
        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(state.with_form(|f| f.phase().is_submitting()));
        assert!(sink.signals().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(matches!(
            state.with_form(|f| f.phase().clone()),
            SubmissionPhase::Succeeded { .. }
        ));
        assert_eq!(sink.signals().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_submit_while_submitting_is_rejected() {
        let (state, sink) = state_with(Arc::new(SimulatedSubmitter::new(DELAY)));
        fill(&state);

        let pending = state.submit().unwrap();
        let err = state.submit().unwrap_err();
        assert_eq!(err.message, CoreError::AlreadySubmitting.to_string());

        pending.wait().await.unwrap();
        assert_eq!(sink.count(|s| matches!(s, Signal::Navigate { .. })), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_submission_keeps_fields_and_notifies() {
        let submitter = FailingSubmitter {
            delay: DELAY,
            error: SubmitError::Rejected("Email already registered".into()),
        };
        let (state, sink) = state_with(Arc::new(submitter));
        fill(&state);

        let outcome = state.submit().unwrap().wait().await.unwrap();
        assert_eq!(
            outcome,
            SubmissionOutcome::Failed {
                message: "Email already registered".into()
            }
        );

        state.with_form(|form| {
            assert_eq!(form.phase().failure_message(), Some("Email already registered"));
            assert_eq!(form.value(FieldId::Email), "jane@x.com");
            assert!(form.can_submit());
        });
        assert_eq!(
            sink.signals(),
            vec![Signal::Notify {
                level: NoticeLevel::Error,
                message: "Email already registered".into()
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_returns_to_idle_without_signals() {
        let (state, sink) = state_with(Arc::new(SimulatedSubmitter::new(DELAY)));
        fill(&state);

        let pending = state.submit().unwrap();
        pending.cancel();

        assert_eq!(pending.wait().await.unwrap(), SubmissionOutcome::Cancelled);
        assert_eq!(state.with_form(|f| f.phase().clone()), SubmissionPhase::Idle);
        assert!(sink.signals().is_empty());
        assert!(state.with_form(|f| f.can_submit()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_form_does_not_spawn() {
        let (state, sink) = state_with(Arc::new(SimulatedSubmitter::new(DELAY)));
        state.with_form_mut(|f| f.set_value(FieldId::Email, "jane@x.com").unwrap());

        let err = state.submit().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::ValidationError);
        assert_eq!(state.with_form(|f| f.phase().clone()), SubmissionPhase::Idle);
        assert!(state.with_form(|f| f.error(FieldId::FullName).is_some()));

        tokio::time::sleep(DELAY * 2).await;
        assert!(sink.signals().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_during_submission_do_not_change_snapshot() {
        let (state, _sink) = state_with(Arc::new(SimulatedSubmitter::new(DELAY)));
        fill(&state);

        let pending = state.submit().unwrap();
        state.with_form_mut(|f| f.set_value(FieldId::FullName, "Al").unwrap());

        assert_eq!(pending.wait().await.unwrap(), SubmissionOutcome::Succeeded);
        assert_eq!(state.with_form(|f| f.value(FieldId::FullName).to_string()), "Al");
    }
}
