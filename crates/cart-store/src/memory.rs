use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use crate::{
    CartId, CartItemRecord, CartRecord, CartStoreError, ProductId, Result,
    store::{CartStore, CartTransaction},
};

#[derive(Debug, Clone, Default)]
struct Tables {
    carts: HashMap<CartId, CartRecord>,
    items: BTreeMap<(CartId, ProductId), CartItemRecord>,
}

/// In-memory cart storage for tests and local runs.
///
/// Enforces the same keys as the PostgreSQL schema. A transaction holds the
/// write lock for its whole lifetime and works on a staged copy of the
/// tables, which replaces the live tables only on commit.
#[derive(Clone, Default)]
pub struct InMemoryCartStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryCartStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of carts stored.
    pub async fn cart_count(&self) -> usize {
        self.tables.read().await.carts.len()
    }

    /// Returns the number of line items stored across all carts.
    pub async fn item_count(&self) -> usize {
        self.tables.read().await.items.len()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    type Transaction = InMemoryCartTransaction;

    async fn fetch_cart(&self, cart_id: CartId) -> Result<Option<CartRecord>> {
        Ok(self.tables.read().await.carts.get(&cart_id).copied())
    }

    async fn fetch_items(&self, cart_id: CartId) -> Result<Vec<CartItemRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .values()
            .filter(|item| item.cart_id == cart_id)
            .cloned()
            .collect())
    }

    async fn begin(&self) -> Result<InMemoryCartTransaction> {
        let live = Arc::clone(&self.tables).write_owned().await;
        let staged = live.clone();
        Ok(InMemoryCartTransaction { live, staged })
    }
}

/// A transaction against [`InMemoryCartStore`].
pub struct InMemoryCartTransaction {
    live: OwnedRwLockWriteGuard<Tables>,
    staged: Tables,
}

#[async_trait]
impl CartTransaction for InMemoryCartTransaction {
    async fn insert_cart(&mut self, cart: &CartRecord) -> Result<u64> {
        if self.staged.carts.contains_key(&cart.cart_id) {
            return Err(CartStoreError::DuplicateCart(cart.cart_id));
        }
        self.staged.carts.insert(cart.cart_id, *cart);
        Ok(1)
    }

    async fn insert_item(&mut self, item: &CartItemRecord) -> Result<u64> {
        if !self.staged.carts.contains_key(&item.cart_id) {
            return Err(CartStoreError::CartNotFound(item.cart_id));
        }
        if self.staged.items.contains_key(&item.key()) {
            return Err(CartStoreError::DuplicateItem {
                cart_id: item.cart_id,
                product_id: item.product_id,
            });
        }
        self.staged.items.insert(item.key(), item.clone());
        Ok(1)
    }

    async fn increment_quantity(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
        delta: i32,
    ) -> Result<u64> {
        match self.staged.items.get_mut(&(cart_id, product_id)) {
            Some(item) => {
                item.quantity = item.quantity.checked_add(delta).ok_or(
                    CartStoreError::QuantityOutOfRange {
                        cart_id,
                        product_id,
                    },
                )?;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_item(&mut self, cart_id: CartId, product_id: ProductId) -> Result<u64> {
        Ok(u64::from(
            self.staged.items.remove(&(cart_id, product_id)).is_some(),
        ))
    }

    async fn delete_items(&mut self, cart_id: CartId) -> Result<u64> {
        let before = self.staged.items.len();
        self.staged.items.retain(|(owner, _), _| *owner != cart_id);
        Ok((before - self.staged.items.len()) as u64)
    }

    async fn commit(self) -> Result<()> {
        let Self { mut live, staged } = self;
        *live = staged;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}
