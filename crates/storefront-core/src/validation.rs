//! # Validation Module
//!
//! Validation of externally supplied data: catalog entries loaded from
//! configuration. The registration form has its own rule engine in
//! [`crate::form`]; this module only guards the inputs the engines assume
//! are well-formed.
//!
//! ## Where This Runs
//! ```text
//! storefront.toml [[catalog]] ──► Catalog::new ──► validate_catalog
//!                                                    │
//!                                                    ├── name present
//!                                                    ├── price >= 0
//!                                                    ├── rating in [0, 5]
//!                                                    └── ids unique
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::Product;
use crate::RATING_SLOTS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a product display name.
const MAX_PRODUCT_NAME_LEN: usize = 200;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - At most 200 characters
///
/// ```rust
/// use storefront_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Product 1").is_ok());
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free items).
///
/// ```rust
/// use storefront_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1999).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0.0,
            max: i64::MAX as f64,
        });
    }

    Ok(())
}

/// Validates a rating: finite and within [0, 5].
pub fn validate_rating(rating: f64) -> ValidationResult<()> {
    let max = f64::from(RATING_SLOTS);
    if !rating.is_finite() || !(0.0..=max).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 0.0,
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates every product and checks that ids are unique.
pub fn validate_catalog(products: &[Product]) -> ValidationResult<()> {
    let mut seen = HashSet::with_capacity(products.len());

    for product in products {
        validate_product_name(&product.name)?;
        validate_price_cents(product.price_cents)?;
        validate_rating(product.rating)?;

        if !seen.insert(product.id) {
            return Err(ValidationError::Duplicate {
                field: "product id".to_string(),
                value: product.id.to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
