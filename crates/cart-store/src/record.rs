//! Row types for the two cart tables.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CartId, CustomerId, ProductId};

/// A row of `shopping_carts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRecord {
    pub cart_id: CartId,
    pub customer_id: CustomerId,
}

impl CartRecord {
    pub fn new(cart_id: CartId, customer_id: CustomerId) -> Self {
        Self {
            cart_id,
            customer_id,
        }
    }
}

/// A row of `shopping_cart_items`, keyed by (cart, product).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemRecord {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

impl CartItemRecord {
    pub fn new(cart_id: CartId, product_id: ProductId, quantity: i32, price: Decimal) -> Self {
        Self {
            cart_id,
            product_id,
            quantity,
            price,
        }
    }

    /// Returns the (cart, product) primary key of this row.
    pub fn key(&self) -> (CartId, ProductId) {
        (self.cart_id, self.product_id)
    }
}
