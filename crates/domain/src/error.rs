//! Domain error types.

use cart_store::CartStoreError;
use common::{CartId, ProductId};
use thiserror::Error;

/// Errors that can occur while loading or saving carts.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No cart exists with this identifier.
    #[error("Shopping cart not found: {0}")]
    CartNotFound(CartId),

    /// Adding units would overflow a line item's quantity.
    #[error("Quantity of product {product_id} in cart {cart_id} is out of range")]
    QuantityOutOfRange {
        cart_id: CartId,
        product_id: ProductId,
    },

    /// The storage layer rejected a read or write.
    #[error("Cart store error: {0}")]
    Store(#[from] CartStoreError),
}

impl DomainError {
    /// Returns true when the error means a cart or line item does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            DomainError::CartNotFound(_) => true,
            DomainError::QuantityOutOfRange { .. } => false,
            DomainError::Store(err) => err.is_not_found(),
        }
    }

    /// Returns true when a quantity would leave the `i32` range.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            DomainError::QuantityOutOfRange { .. }
                | DomainError::Store(CartStoreError::QuantityOutOfRange { .. })
        )
    }

    /// Returns true when the error is a unique-key violation.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Store(err) if err.is_duplicate())
    }
}
