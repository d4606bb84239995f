//! # Registration Submitters
//!
//! A [`Submitter`] receives the value snapshot of a started submission and
//! resolves once the attempt is settled. The shipped implementation only
//! waits; a networked one would plug in here.

use std::time::Duration;

use async_trait::async_trait;
use storefront_core::{FieldId, Submission};
use thiserror::Error;
use tracing::{debug, info};

/// Why a submission attempt failed.
#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    /// The receiving side refused the registration.
    #[error("{0}")]
    Rejected(String),

    /// The receiving side could not be reached.
    #[error("Registration service unavailable: {0}")]
    Unavailable(String),
}

/// Delivers a submission somewhere.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, submission: &Submission) -> Result<(), SubmitError>;
}

/// Waits a fixed delay and then accepts every submission.
#[derive(Debug, Clone)]
pub struct SimulatedSubmitter {
    delay: Duration,
}

impl SimulatedSubmitter {
    pub fn new(delay: Duration) -> Self {
        SimulatedSubmitter { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl Submitter for SimulatedSubmitter {
    async fn submit(&self, submission: &Submission) -> Result<(), SubmitError> {
        debug!(submission_id = %submission.id, delay_ms = self.delay.as_millis() as u64, "Simulating submission latency");
        tokio::time::sleep(self.delay).await;

        info!(
            submission_id = %submission.id,
            email = %submission.value(FieldId::Email),
            "Registration accepted"
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Fails every submission after a delay.
    pub struct FailingSubmitter {
        pub delay: Duration,
        pub error: SubmitError,
    }

    #[async_trait]
    impl Submitter for FailingSubmitter {
        async fn submit(&self, _submission: &Submission) -> Result<(), SubmitError> {
            tokio::time::sleep(self.delay).await;
            Err(self.error.clone())
        }
    }
}
