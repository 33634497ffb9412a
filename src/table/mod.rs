//! Tabular inputs to clustering.
//!
//! - [`Raw`] — CSV cells as read, with gaps
//! - [`Table`] — Named numeric columns with no missing values
//! - [`Preprocessor`] — Imputation, scaling and one-hot encoding from [`Raw`] to [`Table`]
mod preprocess;
mod raw;
mod table;

pub use preprocess::*;
pub use raw::*;
pub use table::*;
