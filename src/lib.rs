pub mod algorithm;
pub mod errors;
pub mod persistence;
pub mod replay;

pub use algorithm::{GasIndexAlgorithm, TuningParameters};
pub use errors::GasIndexError;
