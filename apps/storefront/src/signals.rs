//! # Outbound Signals
//!
//! The registration flow tells its collaborators two things: where to
//! navigate and what to notify the user about. Both travel as [`Signal`]
//! values through a [`SignalSink`].
//!
//! ```text
//! RegistrationState ──emit──► SignalSink ──► router / toast (external)
//!                                 │
//!                                 ├── UnboundedSender<Signal>  (shell)
//!                                 ├── NoOpSink                 (headless)
//!                                 └── recording fake           (tests)
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;
use ts_rs::TS;

/// Severity of a user notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message for the external router or notification surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "camelCase")]
#[ts(export)]
pub enum Signal {
    /// Go to a fixed route; no parameters.
    Navigate { route: String },

    /// Show a transient notification.
    Notify { level: NoticeLevel, message: String },
}

impl Signal {
    pub fn navigate(route: impl Into<String>) -> Self {
        Signal::Navigate {
            route: route.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Signal::Notify {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Signal::Notify {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Receiver of navigation and notification signals.
pub trait SignalSink: Send + Sync {
    fn emit(&self, signal: Signal);
}

/// Sink that drops every signal.
pub struct NoOpSink;

impl SignalSink for NoOpSink {
    fn emit(&self, _signal: Signal) {}
}

impl SignalSink for mpsc::UnboundedSender<Signal> {
    fn emit(&self, signal: Signal) {
        if let Err(e) = self.send(signal) {
            warn!(signal = ?e.0, "Signal receiver dropped");
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_json_shape() {
        let json = serde_json::to_value(Signal::navigate("/store")).unwrap();
        assert_eq!(json["type"], "navigate");
        assert_eq!(json["route"], "/store");

        let json = serde_json::to_value(Signal::success("Registration successful!")).unwrap();
        assert_eq!(json["type"], "notify");
        assert_eq!(json["level"], "success");
    }

    #[tokio::test]
    async fn test_channel_sink_delivers() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.emit(Signal::error("Server unavailable"));

        assert_eq!(rx.recv().await, Some(Signal::error("Server unavailable")));
    }

    #[test]
    fn test_channel_sink_tolerates_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel::<Signal>();
        drop(rx);
        tx.emit(Signal::navigate("/store"));
    }
}
