//! # Domain Types
//!
//! Catalog-side types consumed by the cart engine.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Catalog      │   │   StarRating    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  ordered        │   │  full           │       │
//! │  │  name           │   │  Arc<Product>   │   │  half (0 or 1)  │       │
//! │  │  price_cents    │   │  unique ids     │   │  empty          │       │
//! │  │  image_url      │   │                 │   │                 │       │
//! │  │  rating         │   │                 │   │                 │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products are immutable and supplied from outside the engine. Cart lines
//! hold an `Arc<Product>` pointing into the catalog rather than a copy.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::validate_catalog;
use crate::RATING_SLOTS;

// =============================================================================
// Product Id
// =============================================================================

/// Catalog identifier of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductId(pub u32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ProductId)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product shown on the store page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique catalog identifier.
    pub id: ProductId,

    /// Display name.
    pub name: String,

    /// Unit price in cents (non-negative).
    #[ts(type = "number")]
    pub price_cents: i64,

    /// Image reference, passed through to the presentation layer.
    pub image_url: String,

    /// Average rating in [0, 5].
    pub rating: f64,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the star breakdown for this product's rating.
    #[inline]
    pub fn stars(&self) -> StarRating {
        StarRating::from_rating(self.rating)
    }
}

// =============================================================================
// Star Rating
// =============================================================================

/// Full / half / empty star counts for a rating.
///
/// ## Mapping
/// ```text
/// rating 4.5 ──► full = floor(4.5) = 4
///                half = (4.5 mod 1 >= 0.5) = 1
///                empty = 5 - 4 - 1 = 0     ★★★★⯨
///
/// rating 3.2 ──► full 3, half 0, empty 2   ★★★☆☆
/// ```
/// Ratings outside [0, 5] (or NaN) are clamped first so `empty` never
/// goes negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StarRating {
    pub full: u8,
    pub half: u8,
    pub empty: u8,
}

impl StarRating {
    /// Derives the star counts for a numeric rating.
    pub fn from_rating(rating: f64) -> Self {
        let max = f64::from(RATING_SLOTS);
        let rating = if rating.is_nan() {
            0.0
        } else {
            rating.clamp(0.0, max)
        };

        let full = rating.floor() as u8;
        let half = u8::from(rating.fract() >= 0.5);
        StarRating {
            full,
            half,
            empty: RATING_SLOTS - full - half,
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// The fixed, ordered product list the store page renders.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Arc<Product>>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate ids and malformed entries.
    pub fn new(products: Vec<Product>) -> CoreResult<Self> {
        validate_catalog(&products)?;
        Ok(Catalog {
            products: products.into_iter().map(Arc::new).collect(),
        })
    }

    /// The three demo products the store ships with.
    pub fn demo() -> Self {
        let product = |id: u32, name: &str, price_cents: i64, rating: f64| Product {
            id: ProductId(id),
            name: name.to_string(),
            price_cents,
            image_url: "/assets/product1.jpg".to_string(),
            rating,
        };

        Catalog {
            products: vec![
                Arc::new(product(1, "Product 1", 1999, 4.5)),
                Arc::new(product(2, "Product 2", 2999, 3.5)),
                Arc::new(product(3, "Product 3", 3999, 5.0)),
            ],
        }
    }

    /// Looks up a product by id.
    pub fn get(&self, id: ProductId) -> Option<&Arc<Product>> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Looks up a product by id, returning a shared handle.
    pub fn find(&self, id: ProductId) -> CoreResult<Arc<Product>> {
        self.get(id)
            .cloned()
            .ok_or(CoreError::ProductNotFound(id))
    }

    /// Products in display order.
    pub fn products(&self) -> &[Arc<Product>] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_rating_half() {
        assert_eq!(
            StarRating::from_rating(4.5),
            StarRating { full: 4, half: 1, empty: 0 }
        );
        assert_eq!(
            StarRating::from_rating(3.5),
            StarRating { full: 3, half: 1, empty: 1 }
        );
    }

    #[test]
    fn test_star_rating_whole_and_below_half() {
        assert_eq!(
            StarRating::from_rating(5.0),
            StarRating { full: 5, half: 0, empty: 0 }
        );
        assert_eq!(
            StarRating::from_rating(3.2),
            StarRating { full: 3, half: 0, empty: 2 }
        );
        assert_eq!(
            StarRating::from_rating(0.0),
            StarRating { full: 0, half: 0, empty: 5 }
        );
    }

    #[test]
    fn test_star_rating_clamps_out_of_range() {
        assert_eq!(StarRating::from_rating(7.3).full, 5);
        assert_eq!(StarRating::from_rating(7.3).empty, 0);
        assert_eq!(StarRating::from_rating(-1.0).empty, 5);
        assert_eq!(StarRating::from_rating(f64::NAN).empty, 5);
    }

    #[test]
    fn test_demo_catalog_lookup() {
        let catalog = Catalog::demo();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(ProductId(2)).unwrap().price_cents, 2999);
        assert!(catalog.get(ProductId(9)).is_none());
        assert!(matches!(
            catalog.find(ProductId(9)),
            Err(CoreError::ProductNotFound(ProductId(9)))
        ));
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        let demo = Catalog::demo();
        let first = (*demo.products()[0]).clone();
        let result = Catalog::new(vec![first.clone(), first]);
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_product_id_parse() {
        assert_eq!(" 3 ".parse::<ProductId>().unwrap(), ProductId(3));
        assert!("abc".parse::<ProductId>().is_err());
    }
}
