//! Customer feedback. Entries are created and deleted, never edited.

pub mod entity;
pub mod error;

pub use error::*;
