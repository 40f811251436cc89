//! Site settings: the home page layout and the theme, stored as JSON
//! blobs under fixed keys and normalized on every read and write.

pub mod handlers;
