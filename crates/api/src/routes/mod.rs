//! HTTP route handlers.

pub mod carts;
pub mod ops;
