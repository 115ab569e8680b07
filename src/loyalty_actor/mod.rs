//! Loyalty balances with an append-only entry log.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
