//! Checkout and order lifecycle: PENDING at checkout, CONFIRMED once
//! payment is approved, PROCESSING when a warehouse takes the order.

pub mod handlers;
pub mod service;
