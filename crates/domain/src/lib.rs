//! Domain layer for the shopping cart samples.
//!
//! This crate provides:
//! - Aggregate and DomainEvent traits
//! - Cart events, state and the event-sourced cart aggregate
//! - Repositories for the event-sourced, domain-model and plain-entity
//!   persistence styles

pub mod aggregate;
pub mod cart;
pub mod error;

pub use aggregate::{Aggregate, DomainEvent};
pub use cart::{
    CartDomainRepository, CartEntityRepository, CartEvent, CartItem, EventSourcedCartRepository,
    ItemAddedData, ItemRemovedData, QuantityIncrementedData, ShoppingCart, ShoppingCartAggregate,
    ShoppingCartDomain,
};
pub use common::{CartId, CustomerId, ProductId};
pub use error::DomainError;
