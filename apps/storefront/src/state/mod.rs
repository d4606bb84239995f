//! # State Module
//!
//! One focused state type per page instead of a single `AppState`:
//!
//! ```text
//! ┌──────────────────────┐  ┌───────────────────────────┐  ┌──────────────────┐
//! │      CartState       │  │    RegistrationState      │  │ StorefrontConfig │
//! │                      │  │                           │  │                  │
//! │  Arc<Catalog>        │  │  Arc<Mutex<FormState>>    │  │  read-only       │
//! │  Arc<Mutex<Cart>>    │  │  Arc<dyn Submitter>       │  │                  │
//! │                      │  │  Arc<dyn SignalSink>      │  │                  │
//! └──────────────────────┘  └───────────────────────────┘  └──────────────────┘
//! ```
//!
//! The two are independent: nothing in the cart touches the form.

mod cart;
mod registration;

pub use cart::CartState;
pub use registration::{PendingSubmission, RegistrationState, SubmissionOutcome};
