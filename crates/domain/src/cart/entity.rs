//! Plain entity repository: hands out [`ShoppingCart`] values to edit.

use cart_store::CartStore;
use common::{CartId, CustomerId};

use crate::aggregate::Aggregate;
use crate::error::DomainError;

use super::ShoppingCart;
use super::persistence::{insert_cart, load_cart, replace_items};

/// Loads and saves [`ShoppingCart`] entities with no domain behavior in
/// between. Callers edit the line items through
/// [`ShoppingCart::items_mut`].
pub struct CartEntityRepository<S: CartStore> {
    store: S,
}

impl<S: CartStore> CartEntityRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(
        &self,
        cart_id: CartId,
        customer_id: CustomerId,
    ) -> Result<ShoppingCart, DomainError> {
        insert_cart(&self.store, cart_id, customer_id).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn load(&self, cart_id: CartId) -> Result<ShoppingCart, DomainError> {
        load_cart(&self.store, cart_id).await
    }

    /// Replaces the stored line items with the entity's, atomically.
    #[tracing::instrument(skip(self, cart), fields(cart_id = %cart.id()))]
    pub async fn save(&self, cart: &ShoppingCart) -> Result<(), DomainError> {
        replace_items(&self.store, cart).await
    }
}

#[cfg(test)]
mod tests {
    use cart_store::{CartStoreError, InMemoryCartStore};
    use common::ProductId;
    use rust_decimal::Decimal;

    use super::*;
    use crate::cart::CartItem;

    #[tokio::test]
    async fn edits_to_the_entity_are_saved() {
        let repository = CartEntityRepository::new(InMemoryCartStore::new());
        let cart_id = CartId::new();
        let product_id = ProductId::new();

        let mut cart = repository.create(cart_id, CustomerId::new()).await.unwrap();
        cart.items_mut()
            .push(CartItem::new(cart_id, product_id, 2, Decimal::new(150, 2)));
        repository.save(&cart).await.unwrap();

        let mut cart = repository.load(cart_id).await.unwrap();
        if let Some(item) = cart.items_mut().first_mut() {
            item.quantity = 6;
        }
        repository.save(&cart).await.unwrap();

        let loaded = repository.load(cart_id).await.unwrap();
        assert_eq!(
            loaded.items(),
            &[CartItem::new(cart_id, product_id, 6, Decimal::new(150, 2))]
        );
    }

    #[tokio::test]
    async fn duplicate_line_items_roll_back_the_whole_save() {
        let store = InMemoryCartStore::new();
        let repository = CartEntityRepository::new(store.clone());
        let cart_id = CartId::new();
        let product_id = ProductId::new();

        let mut cart = repository.create(cart_id, CustomerId::new()).await.unwrap();
        cart.items_mut()
            .push(CartItem::new(cart_id, product_id, 1, Decimal::ONE));
        repository.save(&cart).await.unwrap();

        cart.items_mut()
            .push(CartItem::new(cart_id, product_id, 1, Decimal::ONE));
        let err = repository.save(&cart).await.unwrap_err();

        assert!(matches!(
            err,
            DomainError::Store(CartStoreError::DuplicateItem { .. })
        ));
        // The delete of the earlier row was rolled back with the insert.
        assert_eq!(store.item_count().await, 1);
    }

    #[tokio::test]
    async fn items_are_written_to_the_saved_cart_only() {
        let store = InMemoryCartStore::new();
        let repository = CartEntityRepository::new(store.clone());
        let cart_id = CartId::new();
        let other_cart_id = CartId::new();
        let product_id = ProductId::new();
        repository
            .create(other_cart_id, CustomerId::new())
            .await
            .unwrap();

        let mut cart = repository.create(cart_id, CustomerId::new()).await.unwrap();
        cart.items_mut()
            .push(CartItem::new(other_cart_id, product_id, 1, Decimal::ONE));
        repository.save(&cart).await.unwrap();

        assert!(repository.load(other_cart_id).await.unwrap().is_empty());
        let loaded = repository.load(cart_id).await.unwrap();
        assert_eq!(
            loaded.items(),
            &[CartItem::new(cart_id, product_id, 1, Decimal::ONE)]
        );
        assert_eq!(store.cart_count().await, 2);
    }
}
