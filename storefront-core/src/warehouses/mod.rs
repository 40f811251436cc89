//! Warehouse registry for the back office.

pub mod handlers;
