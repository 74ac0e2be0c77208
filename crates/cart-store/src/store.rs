use async_trait::async_trait;

use crate::{CartId, CartItemRecord, CartRecord, ProductId, Result};

/// Read access to cart storage plus the ability to open a write transaction.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CartStore: Send + Sync {
    /// The transaction type handed out by [`CartStore::begin`].
    type Transaction: CartTransaction;

    /// Fetches the cart row, or `None` if no such cart exists.
    async fn fetch_cart(&self, cart_id: CartId) -> Result<Option<CartRecord>>;

    /// Fetches every line item of a cart. Order is unspecified.
    async fn fetch_items(&self, cart_id: CartId) -> Result<Vec<CartItemRecord>>;

    /// Opens a new write transaction.
    ///
    /// Reads through the store while a transaction is open do not see its
    /// uncommitted writes. The in-memory store blocks such reads until the
    /// transaction ends, so a task must not read while holding one.
    async fn begin(&self) -> Result<Self::Transaction>;
}

/// A unit of writes against cart storage.
///
/// Nothing written through a transaction is visible to readers until
/// [`commit`](CartTransaction::commit) succeeds. Dropping a transaction
/// without committing discards its writes.
///
/// Mutations return the number of rows they affected. An update or delete
/// that matches no row affects zero rows and is not an error at this level.
#[async_trait]
pub trait CartTransaction: Send {
    /// Inserts a cart row. Fails with `DuplicateCart` if it already exists.
    async fn insert_cart(&mut self, cart: &CartRecord) -> Result<u64>;

    /// Inserts a line-item row.
    ///
    /// Fails with `DuplicateItem` if the (cart, product) pair exists and with
    /// `CartNotFound` if the cart row is missing.
    async fn insert_item(&mut self, item: &CartItemRecord) -> Result<u64>;

    /// Adds `delta` to the quantity of a line item.
    async fn increment_quantity(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
        delta: i32,
    ) -> Result<u64>;

    /// Deletes one line item.
    async fn delete_item(&mut self, cart_id: CartId, product_id: ProductId) -> Result<u64>;

    /// Deletes every line item of a cart.
    async fn delete_items(&mut self, cart_id: CartId) -> Result<u64>;

    /// Makes all writes of this transaction visible.
    async fn commit(self) -> Result<()>;

    /// Discards all writes of this transaction.
    async fn rollback(self) -> Result<()>;
}
