//! # Storefront Entry Point
//!
//! ```text
//! $ storefront --config ./storefront.toml
//! > products
//! > add 1
//! > set email jane@x.com
//! > submit
//! ```
//!
//! The setup lives in `lib.rs` so it can be tested.

#[tokio::main]
async fn main() -> std::io::Result<()> {
    storefront_app::run().await
}
