//! Shopping cart events.

use common::{CartId, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

/// Facts recorded by [`ShoppingCartAggregate`](super::ShoppingCartAggregate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CartEvent {
    /// A product was put in the cart for the first time.
    ItemAdded(ItemAddedData),

    /// More of a product already in the cart was added.
    QuantityIncremented(QuantityIncrementedData),

    /// A product was taken out of the cart.
    ItemRemoved(ItemRemovedData),
}

impl DomainEvent for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded(_) => "ItemAdded",
            CartEvent::QuantityIncremented(_) => "QuantityIncremented",
            CartEvent::ItemRemoved(_) => "ItemRemoved",
        }
    }
}

/// Data for ItemAdded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAddedData {
    pub cart_id: CartId,
    pub product_id: ProductId,

    /// Initial quantity of the line item.
    pub quantity: i32,

    /// Unit price at the time of adding.
    pub price: Decimal,
}

/// Data for QuantityIncremented event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityIncrementedData {
    pub cart_id: CartId,
    pub product_id: ProductId,

    /// Amount added to the current quantity.
    pub quantity: i32,
}

/// Data for ItemRemoved event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemovedData {
    pub cart_id: CartId,
    pub product_id: ProductId,
}

impl CartEvent {
    /// Creates an ItemAdded event.
    pub fn item_added(
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
        price: Decimal,
    ) -> Self {
        CartEvent::ItemAdded(ItemAddedData {
            cart_id,
            product_id,
            quantity,
            price,
        })
    }

    /// Creates a QuantityIncremented event.
    pub fn quantity_incremented(cart_id: CartId, product_id: ProductId, quantity: i32) -> Self {
        CartEvent::QuantityIncremented(QuantityIncrementedData {
            cart_id,
            product_id,
            quantity,
        })
    }

    /// Creates an ItemRemoved event.
    pub fn item_removed(cart_id: CartId, product_id: ProductId) -> Self {
        CartEvent::ItemRemoved(ItemRemovedData {
            cart_id,
            product_id,
        })
    }

    /// Returns the cart the event belongs to.
    pub fn cart_id(&self) -> CartId {
        match self {
            CartEvent::ItemAdded(data) => data.cart_id,
            CartEvent::QuantityIncremented(data) => data.cart_id,
            CartEvent::ItemRemoved(data) => data.cart_id,
        }
    }

    /// Returns the product the event is about.
    pub fn product_id(&self) -> ProductId {
        match self {
            CartEvent::ItemAdded(data) => data.product_id,
            CartEvent::QuantityIncremented(data) => data.product_id,
            CartEvent::ItemRemoved(data) => data.product_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type() {
        let cart_id = CartId::new();
        let product_id = ProductId::new();

        let event = CartEvent::item_added(cart_id, product_id, 1, Decimal::new(500, 2));
        assert_eq!(event.event_type(), "ItemAdded");

        let event = CartEvent::quantity_incremented(cart_id, product_id, 2);
        assert_eq!(event.event_type(), "QuantityIncremented");

        let event = CartEvent::item_removed(cart_id, product_id);
        assert_eq!(event.event_type(), "ItemRemoved");
    }

    #[test]
    fn test_accessors() {
        let cart_id = CartId::new();
        let product_id = ProductId::new();

        for event in [
            CartEvent::item_added(cart_id, product_id, 1, Decimal::ONE),
            CartEvent::quantity_incremented(cart_id, product_id, 1),
            CartEvent::item_removed(cart_id, product_id),
        ] {
            assert_eq!(event.cart_id(), cart_id);
            assert_eq!(event.product_id(), product_id);
        }
    }

    #[test]
    fn test_item_added_serialization() {
        let cart_id = CartId::new();
        let product_id = ProductId::new();
        let event = CartEvent::item_added(cart_id, product_id, 3, Decimal::new(999, 2));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "ItemAdded");
        assert_eq!(json["data"]["quantity"], 3);
        assert_eq!(json["data"]["price"], "9.99");

        let deserialized: CartEvent = serde_json::from_value(json).unwrap();
        assert_eq!(deserialized, event);
    }
}
