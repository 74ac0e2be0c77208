use thiserror::Error;

use crate::{CartId, ProductId};

/// Errors that can occur when reading or writing cart storage.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// The cart row does not exist.
    #[error("Cart not found: {0}")]
    CartNotFound(CartId),

    /// A cart with this identifier already exists.
    #[error("Cart already exists: {0}")]
    DuplicateCart(CartId),

    /// The cart already has a line item for this product.
    #[error("Cart {cart_id} already contains product {product_id}")]
    DuplicateItem {
        cart_id: CartId,
        product_id: ProductId,
    },

    /// No line item exists for this (cart, product) pair.
    #[error("Cart {cart_id} has no line item for product {product_id}")]
    ItemNotFound {
        cart_id: CartId,
        product_id: ProductId,
    },

    /// Incrementing the line item would overflow its quantity.
    #[error("Quantity of product {product_id} in cart {cart_id} is out of range")]
    QuantityOutOfRange {
        cart_id: CartId,
        product_id: ProductId,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl CartStoreError {
    /// Returns true for errors caused by a missing cart or line item.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CartStoreError::CartNotFound(_) | CartStoreError::ItemNotFound { .. }
        )
    }

    /// Returns true for unique-key violations.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            CartStoreError::DuplicateCart(_) | CartStoreError::DuplicateItem { .. }
        )
    }
}

/// Result type for cart storage operations.
pub type Result<T> = std::result::Result<T, CartStoreError>;
