//! # Cart State
//!
//! The store page's catalog and the session cart.
//!
//! ## Thread Safety
//! The cart sits behind `Arc<Mutex<T>>`; every command takes the lock for
//! the duration of one closure and never across an await. The catalog is
//! immutable and shared without a lock.

use std::sync::{Arc, Mutex};

use storefront_core::{Cart, Catalog, CoreResult, ProductId};

/// Shared catalog plus the mutable session cart.
#[derive(Debug, Clone)]
pub struct CartState {
    catalog: Arc<Catalog>,
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates an empty cart over the given catalog.
    pub fn new(catalog: Catalog) -> Self {
        CartState {
            catalog: Arc::new(catalog),
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Executes a function with read access to the cart.
    ///
    /// ```rust,ignore
    /// let total = cart_state.with_cart(|cart| cart.total());
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&mut cart)
    }

    /// Resolves `id` against the catalog and adds one unit of it.
    ///
    /// Returns the product's new quantity in the cart.
    pub fn add(&self, id: ProductId) -> CoreResult<u32> {
        let product = self.catalog.find(id)?;
        Ok(self.with_cart_mut(|cart| cart.add_to_cart(product).quantity))
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new(Catalog::demo())
    }
}
