//! Cart endpoints. Each mutating request is one load / intent / save cycle.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use cart_store::CartStore;
use domain::{
    CartEvent, CartId, CustomerId, EventSourcedCartRepository, ProductId, ShoppingCart,
    ShoppingCartAggregate,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: CartStore> {
    pub repository: EventSourcedCartRepository<S>,
    /// Name of the storage backend, reported by `/health`.
    pub storage: &'static str,
}

impl<S: CartStore> AppState<S> {
    pub fn new(store: S, storage: &'static str) -> Self {
        Self {
            repository: EventSourcedCartRepository::new(store),
            storage,
        }
    }
}

// -- Request types --

#[derive(Deserialize, Default)]
pub struct CreateCartRequest {
    pub customer_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: i32,
    pub price: Decimal,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartCreatedResponse {
    pub cart_id: String,
    pub customer_id: String,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub cart_id: String,
    pub customer_id: String,
    pub items: Vec<CartItemResponse>,
    /// `null` when the total does not fit in a decimal.
    pub total: Option<Decimal>,
}

#[derive(Serialize)]
pub struct CartItemResponse {
    pub product_id: String,
    pub quantity: i32,
    pub price: Decimal,
    pub subtotal: Option<Decimal>,
}

/// Result of one unit of work: the events it applied and the cart after.
#[derive(Serialize)]
pub struct CartChangeResponse {
    pub events: Vec<CartEvent>,
    pub cart: CartResponse,
}

impl From<&ShoppingCart> for CartResponse {
    fn from(cart: &ShoppingCart) -> Self {
        use domain::Aggregate;

        Self {
            cart_id: cart.id().to_string(),
            customer_id: cart.customer_id().to_string(),
            items: cart
                .items()
                .iter()
                .map(|item| CartItemResponse {
                    product_id: item.product_id.to_string(),
                    quantity: item.quantity,
                    price: item.price,
                    subtotal: item.subtotal(),
                })
                .collect(),
            total: cart.total(),
        }
    }
}

// -- Handlers --

/// POST /carts: create an empty cart.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    req: Option<Json<CreateCartRequest>>,
) -> Result<(StatusCode, Json<CartCreatedResponse>), ApiError> {
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let customer_id = match req.customer_id {
        Some(ref id) => parse_id::<CustomerId>(id, "customer_id")?,
        None => CustomerId::new(),
    };

    let cart_id = CartId::new();
    state.repository.create(cart_id, customer_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CartCreatedResponse {
            cart_id: cart_id.to_string(),
            customer_id: customer_id.to_string(),
        }),
    ))
}

/// GET /carts/:id: load a cart with its line items.
#[tracing::instrument(skip(state))]
pub async fn get<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart_id = parse_id::<CartId>(&id, "cart id")?;
    let aggregate = state.repository.load(cart_id).await?;

    Ok(Json(CartResponse::from(aggregate.cart())))
}

/// POST /carts/:id/items: add units of a product.
#[tracing::instrument(skip(state, req))]
pub async fn add_item<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartChangeResponse>, ApiError> {
    let cart_id = parse_id::<CartId>(&id, "cart id")?;
    let product_id = parse_id::<ProductId>(&req.product_id, "product_id")?;

    let mut aggregate = state.repository.load(cart_id).await?;
    aggregate.add_item(product_id, req.quantity, req.price);
    if aggregate.cart().total().is_none() {
        return Err(ApiError::BadRequest(
            "Cart total out of range for this price and quantity".to_string(),
        ));
    }

    commit(&state.repository, aggregate).await
}

/// DELETE /carts/:id/items/:product_id: take a product out of the cart.
#[tracing::instrument(skip(state))]
pub async fn remove_item<S: CartStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, product_id)): Path<(String, String)>,
) -> Result<Json<CartChangeResponse>, ApiError> {
    let cart_id = parse_id::<CartId>(&id, "cart id")?;
    let product_id = parse_id::<ProductId>(&product_id, "product_id")?;

    let mut aggregate = state.repository.load(cart_id).await?;
    aggregate.remove_item(product_id);

    commit(&state.repository, aggregate).await
}

async fn commit<S: CartStore>(
    repository: &EventSourcedCartRepository<S>,
    aggregate: ShoppingCartAggregate,
) -> Result<Json<CartChangeResponse>, ApiError> {
    let events = aggregate.pending_events().to_vec();
    let cart = CartResponse::from(aggregate.cart());
    repository.save(aggregate).await?;

    Ok(Json(CartChangeResponse { events, cart }))
}

fn parse_id<T>(value: &str, field: &str) -> Result<T, ApiError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid {field}: {e}")))
}
