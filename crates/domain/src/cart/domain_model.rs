//! Cart domain object that mutates its state directly.
//!
//! The alternative to [`ShoppingCartAggregate`](super::ShoppingCartAggregate):
//! intents change the line items in place and the repository writes the
//! resulting item set back as a whole.

use cart_store::CartStore;
use common::{CartId, CustomerId, ProductId};
use rust_decimal::Decimal;

use crate::aggregate::Aggregate;
use crate::error::DomainError;

use super::persistence::{insert_cart, load_cart, replace_items};
use super::{CartItem, ShoppingCart};

/// Shopping cart whose intents edit the line items in place.
#[derive(Debug, Clone)]
pub struct ShoppingCartDomain {
    cart: ShoppingCart,
}

impl ShoppingCartDomain {
    pub fn new(cart: ShoppingCart) -> Self {
        Self { cart }
    }

    pub fn id(&self) -> CartId {
        self.cart.id()
    }

    pub fn cart(&self) -> &ShoppingCart {
        &self.cart
    }

    /// Increments the quantity of an existing line item, or adds a new one at
    /// `price`.
    ///
    /// Fails with `QuantityOutOfRange`, leaving the item unchanged, if the new
    /// quantity does not fit in an `i32`.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        quantity: i32,
        price: Decimal,
    ) -> Result<(), DomainError> {
        let cart_id = self.id();
        match self.cart.item_mut(product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(quantity).ok_or(
                    DomainError::QuantityOutOfRange {
                        cart_id,
                        product_id,
                    },
                )?;
            }
            None => self
                .cart
                .put_item(CartItem::new(cart_id, product_id, quantity, price)),
        }
        Ok(())
    }

    /// Removes the line item for a product. Does nothing if there is none.
    pub fn remove_item(&mut self, product_id: ProductId) {
        self.cart.take_item(product_id);
    }
}

/// Repository for [`ShoppingCartDomain`].
pub struct CartDomainRepository<S: CartStore> {
    store: S,
}

impl<S: CartStore> CartDomainRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Creates an empty cart.
    #[tracing::instrument(skip(self))]
    pub async fn create(
        &self,
        cart_id: CartId,
        customer_id: CustomerId,
    ) -> Result<ShoppingCartDomain, DomainError> {
        let cart = insert_cart(&self.store, cart_id, customer_id).await?;
        Ok(ShoppingCartDomain::new(cart))
    }

    /// Loads a cart. Fails with `CartNotFound` if it does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self, cart_id: CartId) -> Result<ShoppingCartDomain, DomainError> {
        Ok(ShoppingCartDomain::new(
            load_cart(&self.store, cart_id).await?,
        ))
    }

    /// Writes the cart's current line items, replacing the stored ones, in
    /// one transaction.
    #[tracing::instrument(skip(self, cart), fields(cart_id = %cart.id()))]
    pub async fn save(&self, cart: &ShoppingCartDomain) -> Result<(), DomainError> {
        replace_items(&self.store, cart.cart()).await?;
        tracing::debug!(items = cart.cart().items().len(), "shopping cart saved");
        Ok(())
    }
}
