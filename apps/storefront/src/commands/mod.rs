//! # Commands Module
//!
//! Functions the presentation layer calls. Each takes only the state it
//! needs and returns a serializable DTO or an [`ApiError`](crate::error::ApiError).
//!
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── cart.rs      ◄─── list_products, get_cart, add_to_cart
//! └── register.rs  ◄─── get_form, update_field, reset_field, submit_registration
//! ```

pub mod cart;
pub mod register;

pub use cart::{CartLineDto, CartResponse, ProductDto};
pub use register::SubmitResponse;
