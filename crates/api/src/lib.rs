//! HTTP API over the event-sourced shopping cart.
//!
//! Every mutating request is one unit of work: load the cart aggregate,
//! record the intent, save the resulting events in one transaction.
//! Structured logging via tracing, counters exported for Prometheus.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use cart_store::CartStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::carts::{self, AppState};

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: CartStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::ops::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::ops::health::<S>))
        .route("/carts", post(carts::create::<S>))
        .route("/carts/{id}", get(carts::get::<S>))
        .route("/carts/{id}/items", post(carts::add_item::<S>))
        .route(
            "/carts/{id}/items/{product_id}",
            delete(carts::remove_item::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wraps a store into shared application state.
pub fn create_state<S: CartStore + 'static>(
    store: S,
    storage: &'static str,
) -> Arc<AppState<S>> {
    Arc::new(AppState::new(store, storage))
}
