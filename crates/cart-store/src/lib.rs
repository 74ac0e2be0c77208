//! Storage layer for shopping carts.
//!
//! Carts live in two current-value tables (`shopping_carts` and
//! `shopping_cart_items`). Readers query them directly; writers go through a
//! [`CartTransaction`] so that a batch of mutations is applied atomically.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use common::{CartId, CustomerId, ProductId};
pub use error::{CartStoreError, Result};
pub use memory::{InMemoryCartStore, InMemoryCartTransaction};
pub use postgres::{PostgresCartStore, PostgresCartTransaction};
pub use record::{CartItemRecord, CartRecord};
pub use store::{CartStore, CartTransaction};
