//! In-memory cart state.

use cart_store::{CartItemRecord, CartRecord};
use common::{CartId, CustomerId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::CartEvent;

/// A line item: one product in one cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,

    /// Unit price captured when the item was first added.
    pub price: Decimal,
}

impl CartItem {
    pub fn new(cart_id: CartId, product_id: ProductId, quantity: i32, price: Decimal) -> Self {
        Self {
            cart_id,
            product_id,
            quantity,
            price,
        }
    }

    /// Returns the line total (quantity times unit price), or `None` if it
    /// does not fit in a `Decimal`.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

impl From<CartItemRecord> for CartItem {
    fn from(record: CartItemRecord) -> Self {
        Self::new(
            record.cart_id,
            record.product_id,
            record.quantity,
            record.price,
        )
    }
}

/// A shopping cart and its line items.
///
/// Holds at most one line item per product. The order of items carries no
/// meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingCart {
    cart_id: CartId,
    customer_id: CustomerId,
    items: Vec<CartItem>,
}

impl ShoppingCart {
    /// Creates an empty cart.
    pub fn new(cart_id: CartId, customer_id: CustomerId) -> Self {
        Self {
            cart_id,
            customer_id,
            items: Vec::new(),
        }
    }

    /// Builds a cart from its stored rows.
    pub fn from_records(cart: CartRecord, items: Vec<CartItemRecord>) -> Self {
        Self {
            cart_id: cart.cart_id,
            customer_id: cart.customer_id,
            items: items.into_iter().map(CartItem::from).collect(),
        }
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Mutable access to the line items, for callers that edit the entity
    /// directly. Keeping one item per product is then up to the caller.
    pub fn items_mut(&mut self) -> &mut Vec<CartItem> {
        &mut self.items
    }

    /// Returns the line item for a product, if any.
    pub fn item(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    pub(crate) fn item_mut(&mut self, product_id: ProductId) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| item.product_id == product_id)
    }

    /// Returns true if the cart has no line items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the sum of all line quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.quantity)).sum()
    }

    /// Returns the sum of all line subtotals, or `None` on overflow.
    pub fn total(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |total, item| total.checked_add(item.subtotal()?))
    }

    /// Puts a new line item in the cart, or overwrites the existing one for
    /// the same product.
    pub(crate) fn put_item(&mut self, item: CartItem) {
        match self.item_mut(item.product_id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub(crate) fn take_item(&mut self, product_id: ProductId) -> Option<CartItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.product_id == product_id)?;
        Some(self.items.swap_remove(index))
    }
}

impl Aggregate for ShoppingCart {
    type Event = CartEvent;
    type Id = CartId;

    fn aggregate_type() -> &'static str {
        "ShoppingCart"
    }

    fn id(&self) -> CartId {
        self.cart_id
    }

    fn apply(&mut self, event: &CartEvent) {
        match event {
            CartEvent::ItemAdded(data) => self.put_item(CartItem::new(
                data.cart_id,
                data.product_id,
                data.quantity,
                data.price,
            )),
            CartEvent::QuantityIncremented(data) => {
                // Saturates; the store rejects the overflowing increment on save.
                if let Some(item) = self.item_mut(data.product_id) {
                    item.quantity = item.quantity.saturating_add(data.quantity);
                }
            }
            CartEvent::ItemRemoved(data) => {
                self.take_item(data.product_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> ShoppingCart {
        ShoppingCart::new(CartId::new(), CustomerId::new())
    }

    #[test]
    fn from_records_maps_every_row() {
        let cart_id = CartId::new();
        let customer_id = CustomerId::new();
        let product_id = ProductId::new();
        let cart = ShoppingCart::from_records(
            CartRecord::new(cart_id, customer_id),
            vec![CartItemRecord::new(
                cart_id,
                product_id,
                2,
                Decimal::new(350, 2),
            )],
        );

        assert_eq!(cart.id(), cart_id);
        assert_eq!(cart.customer_id(), customer_id);
        assert_eq!(cart.item(product_id).map(|i| i.quantity), Some(2));
    }

    #[test]
    fn apply_events_keeps_one_item_per_product() {
        let mut cart = cart();
        let product_id = ProductId::new();
        let events = [
            CartEvent::item_added(cart.id(), product_id, 1, Decimal::new(500, 2)),
            CartEvent::quantity_incremented(cart.id(), product_id, 2),
            CartEvent::item_added(cart.id(), product_id, 4, Decimal::new(600, 2)),
        ];

        cart.apply_events(&events);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.item(product_id).map(|i| i.quantity), Some(4));
    }

    #[test]
    fn apply_removal_drops_the_item() {
        let mut cart = cart();
        let product_id = ProductId::new();
        cart.apply(&CartEvent::item_added(
            cart.id(),
            product_id,
            1,
            Decimal::ONE,
        ));
        cart.apply(&CartEvent::item_removed(cart.id(), product_id));

        assert!(cart.is_empty());
    }

    #[test]
    fn increment_of_unknown_product_is_ignored() {
        let mut cart = cart();
        cart.apply(&CartEvent::quantity_incremented(
            cart.id(),
            ProductId::new(),
            3,
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn totals_sum_all_lines() {
        let mut cart = cart();
        let id = cart.id();
        cart.apply(&CartEvent::item_added(
            id,
            ProductId::new(),
            2,
            Decimal::new(250, 2),
        ));
        cart.apply(&CartEvent::item_added(
            id,
            ProductId::new(),
            1,
            Decimal::new(999, 2),
        ));

        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.total(), Some(Decimal::new(1499, 2)));
    }

    #[test]
    fn increment_past_max_quantity_saturates() {
        let mut cart = cart();
        let product_id = ProductId::new();
        cart.apply(&CartEvent::item_added(
            cart.id(),
            product_id,
            i32::MAX,
            Decimal::ONE,
        ));
        cart.apply(&CartEvent::quantity_incremented(cart.id(), product_id, 1));

        assert_eq!(cart.item(product_id).map(|i| i.quantity), Some(i32::MAX));
    }

    #[test]
    fn total_quantity_does_not_overflow() {
        let mut cart = cart();
        let id = cart.id();
        for _ in 0..2 {
            cart.apply(&CartEvent::item_added(
                id,
                ProductId::new(),
                i32::MAX,
                Decimal::ONE,
            ));
        }

        assert_eq!(cart.total_quantity(), 2 * i64::from(i32::MAX));
    }

    #[test]
    fn totals_report_overflow_as_none() {
        let mut cart = cart();
        let product_id = ProductId::new();
        cart.apply(&CartEvent::item_added(
            cart.id(),
            product_id,
            2,
            Decimal::MAX,
        ));

        assert_eq!(cart.item(product_id).and_then(CartItem::subtotal), None);
        assert_eq!(cart.total(), None);
    }
}
