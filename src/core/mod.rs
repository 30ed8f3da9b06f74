//! Core types - pure abstractions shared across the plugin.

mod driver;
mod error;

pub use driver::{BuildMode, MinifyMode};
pub use error::BuildError;
