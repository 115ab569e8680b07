//! Catalog products, including stock reservation for checkout.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
