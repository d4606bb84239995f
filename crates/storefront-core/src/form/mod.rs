//! # Registration Form Validator
//!
//! - [`rules`] - field rules and cross-field rules
//! - [`schema`] - field ids, per-field specs, the registration schema
//! - [`state`] - form values, displayed errors, submission phase

pub mod rules;
pub mod schema;
pub mod state;

pub use rules::{CrossCheck, CrossFieldRule, FieldRule, Rule};
pub use schema::{FieldId, FieldSpec, FormSchema};
pub use state::{FormState, FormView, Submission, SubmissionId, SubmissionPhase};
