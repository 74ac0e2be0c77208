//! Event-sourced shopping cart aggregate.

use common::{CartId, ProductId};
use rust_decimal::Decimal;

use crate::aggregate::Aggregate;

use super::{CartEvent, ShoppingCart};

/// Shopping cart that records intent as [`CartEvent`]s.
///
/// Intent methods never touch storage. Each one derives the events for the
/// change, applies them to the in-memory cart so later intents in the same
/// unit of work see the result, and buffers them until
/// [`EventSourcedCartRepository::save`](super::EventSourcedCartRepository::save)
/// consumes the aggregate.
///
/// Not meant to be shared between tasks: the buffer and the item collection
/// are plain owned values behind `&mut self`.
#[derive(Debug, Clone)]
pub struct ShoppingCartAggregate {
    cart: ShoppingCart,
    pending: Vec<CartEvent>,
}

impl ShoppingCartAggregate {
    /// Wraps a cart with an empty event buffer.
    pub fn new(cart: ShoppingCart) -> Self {
        Self {
            cart,
            pending: Vec::new(),
        }
    }

    pub fn id(&self) -> CartId {
        self.cart.id()
    }

    /// Returns the current in-memory cart, including pending changes.
    pub fn cart(&self) -> &ShoppingCart {
        &self.cart
    }

    /// Adds `quantity` units of a product at `price`.
    ///
    /// Records `QuantityIncremented` when the cart already holds the product,
    /// otherwise `ItemAdded`. The price of an existing line item is kept.
    /// Quantity and price are not validated.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        quantity: i32,
        price: Decimal,
    ) -> &CartEvent {
        let cart_id = self.id();
        let event = if self.cart.item(product_id).is_some() {
            CartEvent::quantity_incremented(cart_id, product_id, quantity)
        } else {
            CartEvent::item_added(cart_id, product_id, quantity, price)
        };
        self.record(event)
    }

    /// Removes a product from the cart.
    ///
    /// Records `ItemRemoved` if the product is in the cart; otherwise nothing
    /// happens and `None` is returned.
    pub fn remove_item(&mut self, product_id: ProductId) -> Option<&CartEvent> {
        self.cart.item(product_id)?;
        let event = CartEvent::item_removed(self.id(), product_id);
        Some(self.record(event))
    }

    /// Events recorded so far, oldest first.
    pub fn pending_events(&self) -> &[CartEvent] {
        &self.pending
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Takes the recorded events, oldest first, leaving the buffer empty.
    pub fn drain_events(&mut self) -> Vec<CartEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Splits the aggregate into its cart and its recorded events.
    pub fn into_parts(self) -> (ShoppingCart, Vec<CartEvent>) {
        (self.cart, self.pending)
    }

    fn record(&mut self, event: CartEvent) -> &CartEvent {
        self.cart.apply(&event);
        let index = self.pending.len();
        self.pending.push(event);
        &self.pending[index]
    }
}

impl From<ShoppingCart> for ShoppingCartAggregate {
    fn from(cart: ShoppingCart) -> Self {
        Self::new(cart)
    }
}
