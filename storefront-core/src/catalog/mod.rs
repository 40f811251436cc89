//! Product catalog: browse endpoints and the built-in seed data.

pub mod handlers;
pub mod seed;
