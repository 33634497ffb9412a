//! Model artifact and its persistence.
//!
//! The store is the only writer of the artifact file. Saves go through a
//! sibling temp file and an atomic rename, so a concurrent reader sees
//! either the previous model or the new one, never a torn write.
mod artifact;
mod store;

pub use artifact::*;
pub use store::*;
