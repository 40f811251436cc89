//! Warehouse disbursements: picking lists cut from confirmed orders.
//!
//! Creating one claims the order for a warehouse. The claim happens in the
//! same store transaction that writes the disbursement, which is what
//! keeps one order from ever growing two picking lists.

pub mod handlers;
pub mod service;
