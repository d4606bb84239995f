//! # Store Page Commands
//!
//! Product listing and cart manipulation. Prices are formatted here, at the
//! presentation boundary, with the configured currency.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  Product 1   ★★★★⯨   $19.99               [ Add to Cart ]      │
//! │  Product 2   ★★★⯨☆   $29.99               [ Add to Cart ]      │
//! ├────────────────────────────────────────────────────────────────┤
//! │  Product 1               x2                 $39.98             │
//! │  ──────────────────────────────────────────────────            │
//! │  Total                                      $39.98             │
//! │                                        [ Checkout ]            │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use storefront_core::{Cart, CartLine, Product, ProductId, StarRating};
use tracing::debug;
use ts_rs::TS;

use crate::config::StorefrontConfig;
use crate::error::ApiError;
use crate::state::CartState;

// =============================================================================
// Response DTOs
// =============================================================================

/// A product card on the store page.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductDto {
    pub id: ProductId,
    pub name: String,
    #[ts(type = "number")]
    pub price_cents: i64,
    pub price: String,
    pub image_url: String,
    pub rating: f64,
    pub stars: StarRating,
}

impl ProductDto {
    fn build(product: &Product, config: &StorefrontConfig) -> Self {
        ProductDto {
            id: product.id,
            name: product.name.clone(),
            price_cents: product.price_cents,
            price: config.format_currency(product.price_cents),
            image_url: product.image_url.clone(),
            rating: product.rating,
            stars: product.stars(),
        }
    }
}

/// One row of the cart panel.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLineDto {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    #[ts(type = "number")]
    pub line_total_cents: i64,
    pub line_total: String,
}

impl CartLineDto {
    fn build(line: &CartLine, config: &StorefrontConfig) -> Self {
        let line_total = line.line_total().cents();
        CartLineDto {
            product_id: line.product.id,
            name: line.product.name.clone(),
            quantity: line.quantity,
            unit_price: config.format_currency(line.product.price_cents),
            line_total_cents: line_total,
            line_total: config.format_currency(line_total),
        }
    }
}

/// The cart panel.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartResponse {
    pub lines: Vec<CartLineDto>,
    pub line_count: usize,
    #[ts(type = "number")]
    pub total_quantity: u64,
    #[ts(type = "number")]
    pub total_cents: i64,
    pub total: String,
    pub can_checkout: bool,
}

impl CartResponse {
    pub fn build(cart: &Cart, config: &StorefrontConfig) -> Self {
        let total_cents = cart.total().cents();
        CartResponse {
            lines: cart
                .lines()
                .iter()
                .map(|line| CartLineDto::build(line, config))
                .collect(),
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            total_cents,
            total: config.format_currency(total_cents),
            can_checkout: cart.can_checkout(),
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

/// Lists the catalog in display order.
pub fn list_products(cart: &CartState, config: &StorefrontConfig) -> Vec<ProductDto> {
    cart.catalog()
        .products()
        .iter()
        .map(|product| ProductDto::build(product, config))
        .collect()
}

/// Current cart with formatted totals.
pub fn get_cart(cart: &CartState, config: &StorefrontConfig) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(|c| CartResponse::build(c, config))
}

/// Adds one unit of a catalog product.
///
/// ## Behavior
/// - Already in cart: quantity goes up by one
/// - Not in cart: appended with quantity 1
/// - Unknown id: `NOT_FOUND`, cart unchanged
pub fn add_to_cart(
    cart: &CartState,
    config: &StorefrontConfig,
    product_id: ProductId,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, "add_to_cart command");

    let quantity = cart.add(product_id)?;
    debug!(product_id = %product_id, quantity, "Product added to cart");

    Ok(get_cart(cart, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_list_products() {
        let config = StorefrontConfig::default();
        let products = list_products(&CartState::default(), &config);

        assert_eq!(products.len(), 3);
        assert_eq!(products[0].price, "$19.99");
        assert_eq!(products[0].stars, StarRating { full: 4, half: 1, empty: 0 });
        assert_eq!(products[2].stars.full, 5);
    }

    #[test]
    fn test_add_to_cart_response() {
        let config = StorefrontConfig::default();
        let cart = CartState::default();

        add_to_cart(&cart, &config, ProductId(1)).unwrap();
        add_to_cart(&cart, &config, ProductId(3)).unwrap();
        let response = add_to_cart(&cart, &config, ProductId(1)).unwrap();

        assert_eq!(response.line_count, 2);
        assert_eq!(response.total_quantity, 3);
        assert_eq!(response.lines[0].quantity, 2);
        assert_eq!(response.lines[0].line_total, "$39.98");
        assert_eq!(response.total_cents, 7997);
        assert_eq!(response.total, "$79.97");
        assert!(response.can_checkout);
    }

    #[test]
    fn test_add_unknown_product() {
        let config = StorefrontConfig::default();
        let cart = CartState::default();

        let err = add_to_cart(&cart, &config, ProductId(99)).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(!get_cart(&cart, &config).can_checkout);
    }

    #[test]
    fn test_empty_cart_json() {
        let config = StorefrontConfig::default();
        let json = serde_json::to_value(get_cart(&CartState::default(), &config)).unwrap();

        assert_eq!(json["total"], "$0.00");
        assert_eq!(json["canCheckout"], false);
        assert!(json["lines"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_cent_fields_are_plain_numbers_in_bindings() {
        for decl in [ProductDto::decl(), CartLineDto::decl(), CartResponse::decl()] {
            assert!(!decl.contains("bigint"), "{}", decl);
        }
        assert!(CartResponse::decl().contains("totalCents: number"));
        assert!(ProductDto::decl().contains("priceCents: number"));
    }
}
