//! Repository persisting [`ShoppingCartAggregate`] events.

use cart_store::{CartStore, CartStoreError, CartTransaction};
use common::{CartId, CustomerId};

use crate::aggregate::{Aggregate, DomainEvent};
use crate::error::DomainError;

use super::persistence::{finish, insert_cart, load_cart};
use super::{CartEvent, ShoppingCart, ShoppingCartAggregate};

/// Loads carts from the current-value tables and persists the events
/// recorded by a [`ShoppingCartAggregate`].
///
/// State is read directly from the tables, not rebuilt by replaying events.
/// Saving translates each event into one row mutation, in recording order,
/// inside a single transaction.
///
/// There is no optimistic concurrency token. Two aggregates loaded from the
/// same cart and saved one after the other can overwrite each other's
/// changes or fail on a key violation.
pub struct EventSourcedCartRepository<S: CartStore> {
    store: S,
}

impl<S: CartStore> EventSourcedCartRepository<S> {
    /// Creates a new repository over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates an empty cart and returns an aggregate for it.
    #[tracing::instrument(skip(self))]
    pub async fn create(
        &self,
        cart_id: CartId,
        customer_id: CustomerId,
    ) -> Result<ShoppingCartAggregate, DomainError> {
        let cart = insert_cart(&self.store, cart_id, customer_id).await?;
        tracing::info!(%cart_id, "shopping cart created");
        Ok(ShoppingCartAggregate::new(cart))
    }

    /// Loads a cart into a fresh aggregate with no pending events.
    ///
    /// Fails with `CartNotFound` if the cart does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self, cart_id: CartId) -> Result<ShoppingCartAggregate, DomainError> {
        let cart = load_cart(&self.store, cart_id).await?;
        tracing::debug!(
            aggregate_type = ShoppingCart::aggregate_type(),
            items = cart.items().len(),
            "shopping cart loaded"
        );
        Ok(ShoppingCartAggregate::new(cart))
    }

    /// Applies every pending event of the aggregate in one transaction.
    ///
    /// The aggregate is consumed: one aggregate is one unit of work. Returns
    /// the number of events applied. If any event fails to apply, the
    /// transaction is rolled back and none of the events take effect.
    #[tracing::instrument(skip(self, aggregate), fields(cart_id = %aggregate.id()))]
    pub async fn save(&self, aggregate: ShoppingCartAggregate) -> Result<usize, DomainError> {
        let (_, events) = aggregate.into_parts();
        if events.is_empty() {
            return Ok(0);
        }

        let mut tx = self.store.begin().await?;
        let outcome = apply_all(&mut tx, &events).await;

        if let Err(error) = finish(tx, outcome).await {
            tracing::warn!(%error, "cart save failed, no events applied");
            metrics::counter!("cart_save_failures_total").increment(1);
            return Err(error);
        }

        metrics::counter!("cart_saves_total").increment(1);
        for event in &events {
            metrics::counter!("cart_events_applied_total", "event_type" => event.event_type())
                .increment(1);
        }
        tracing::info!(events = events.len(), "cart events applied");

        Ok(events.len())
    }
}

/// Applies events in order, stopping at the first failure.
async fn apply_all<T: CartTransaction>(
    tx: &mut T,
    events: &[CartEvent],
) -> cart_store::Result<()> {
    for (position, event) in events.iter().enumerate() {
        tracing::debug!(
            position,
            event_type = event.event_type(),
            product_id = %event.product_id(),
            "applying cart event"
        );
        apply_event(tx, event).await?;
    }
    Ok(())
}

/// Translates one event into its row mutation.
///
/// Increments and removals must hit exactly one existing row; zero affected
/// rows is reported as `ItemNotFound`.
async fn apply_event<T: CartTransaction>(
    tx: &mut T,
    event: &CartEvent,
) -> cart_store::Result<()> {
    let affected = match event {
        CartEvent::ItemAdded(data) => {
            tx.insert_item(&cart_store::CartItemRecord::new(
                data.cart_id,
                data.product_id,
                data.quantity,
                data.price,
            ))
            .await?
        }
        CartEvent::QuantityIncremented(data) => {
            tx.increment_quantity(data.cart_id, data.product_id, data.quantity)
                .await?
        }
        CartEvent::ItemRemoved(data) => tx.delete_item(data.cart_id, data.product_id).await?,
    };

    if affected == 0 {
        return Err(CartStoreError::ItemNotFound {
            cart_id: event.cart_id(),
            product_id: event.product_id(),
        });
    }
    Ok(())
}
