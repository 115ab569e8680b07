//! Order batches: validation, the status state machine, and cancellation rules.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use entity::validate_create;
pub use error::*;
