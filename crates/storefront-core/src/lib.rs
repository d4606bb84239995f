//! # storefront-core: Pure Logic for the Storefront
//!
//! This crate holds the two state-management cores of the storefront demo:
//! the cart aggregation engine and the registration-form validator. Both are
//! pure: no timers, no I/O, no logging.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Presentation + Router (external)                   │   │
//! │  │      Store page ──► Cart panel        Register page ──► Toast   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands / signals                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/storefront                              │   │
//! │  │    CartState, RegistrationState, submission task, config       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ storefront-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │   form    │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │  Schema   │  │   │
//! │  │   │  Catalog  │  │           │  │ CartLine  │  │ FormState │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO TIMERS • NO LOGGING                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, catalog, star rating
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - Cart aggregation engine
//! - [`form`] - Schema rules, form state, submission phase machine
//! - [`validation`] - Catalog and input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use storefront_core::{Cart, Catalog, ProductId};
//!
//! let catalog = Catalog::demo();
//! let mut cart = Cart::new();
//!
//! let product = catalog.get(ProductId(1)).unwrap();
//! cart.add_to_cart(Arc::clone(product));
//! cart.add_to_cart(Arc::clone(product));
//!
//! assert_eq!(cart.line_count(), 1);
//! assert_eq!(cart.total().to_string(), "$39.98");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod form;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use form::{
    CrossFieldRule, FieldId, FieldRule, FieldSpec, FormSchema, FormState, FormView, Rule,
    Submission, SubmissionId, SubmissionPhase,
};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of slots in a star rating display.
pub const RATING_SLOTS: u8 = 5;

/// Characters accepted by the password "special character" rule.
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Minimum age accepted by the registration form.
pub const MINIMUM_AGE: i64 = 18;
