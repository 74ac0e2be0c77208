//! Shopping cart aggregate, state and repositories.
//!
//! Three ways of persisting the same cart live side by side:
//! - [`ShoppingCartAggregate`] + [`EventSourcedCartRepository`]: intents
//!   record [`CartEvent`]s, saving applies each event as a row mutation.
//! - [`ShoppingCartDomain`] + [`CartDomainRepository`]: intents edit the
//!   items in place, saving writes the whole item set.
//! - [`CartEntityRepository`]: callers edit a [`ShoppingCart`] directly.

mod aggregate;
mod domain_model;
mod entity;
mod events;
mod persistence;
mod repository;
mod state;

pub use aggregate::ShoppingCartAggregate;
pub use domain_model::{CartDomainRepository, ShoppingCartDomain};
pub use entity::CartEntityRepository;
pub use events::{CartEvent, ItemAddedData, ItemRemovedData, QuantityIncrementedData};
pub use repository::EventSourcedCartRepository;
pub use state::{CartItem, ShoppingCart};
