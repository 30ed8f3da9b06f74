//! Output asset production: serialization, naming, emission.

pub mod emit;
pub mod name;
pub mod serialize;

pub use emit::{EmitOutcome, PreparedAsset};
