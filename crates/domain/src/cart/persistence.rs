//! Storage helpers shared by the cart repositories.

use cart_store::{CartItemRecord, CartRecord, CartStore, CartTransaction};
use common::{CartId, CustomerId};

use crate::aggregate::Aggregate;
use crate::error::DomainError;

use super::ShoppingCart;

/// Reads a cart and its line items straight from the current-value tables.
pub(crate) async fn load_cart<S: CartStore>(
    store: &S,
    cart_id: CartId,
) -> Result<ShoppingCart, DomainError> {
    let record = store
        .fetch_cart(cart_id)
        .await?
        .ok_or(DomainError::CartNotFound(cart_id))?;
    let items = store.fetch_items(cart_id).await?;

    Ok(ShoppingCart::from_records(record, items))
}

/// Inserts a new, empty cart row.
pub(crate) async fn insert_cart<S: CartStore>(
    store: &S,
    cart_id: CartId,
    customer_id: CustomerId,
) -> Result<ShoppingCart, DomainError> {
    let mut tx = store.begin().await?;
    let outcome = tx
        .insert_cart(&CartRecord::new(cart_id, customer_id))
        .await
        .map(drop);
    finish(tx, outcome).await?;

    Ok(ShoppingCart::new(cart_id, customer_id))
}

/// Overwrites the stored line items of a cart with the in-memory ones.
pub(crate) async fn replace_items<S: CartStore>(
    store: &S,
    cart: &ShoppingCart,
) -> Result<(), DomainError> {
    let mut tx = store.begin().await?;
    let outcome = write_items(&mut tx, cart).await;
    finish(tx, outcome).await
}

async fn write_items<T: CartTransaction>(
    tx: &mut T,
    cart: &ShoppingCart,
) -> cart_store::Result<()> {
    let cart_id = cart.id();
    tx.delete_items(cart_id).await?;
    for item in cart.items() {
        // Rows always belong to the cart being saved.
        tx.insert_item(&CartItemRecord::new(
            cart_id,
            item.product_id,
            item.quantity,
            item.price,
        ))
        .await?;
    }
    Ok(())
}

/// Commits on success. On failure rolls back explicitly and returns the
/// original error.
pub(crate) async fn finish<T: CartTransaction>(
    tx: T,
    outcome: cart_store::Result<()>,
) -> Result<(), DomainError> {
    match outcome {
        Ok(()) => {
            tx.commit().await?;
            Ok(())
        }
        Err(error) => {
            if let Err(rollback_error) = tx.rollback().await {
                tracing::error!(%rollback_error, "rollback failed");
            }
            Err(error.into())
        }
    }
}
