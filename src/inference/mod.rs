pub mod assignment;
pub mod distribution;
pub mod engine;
pub mod query;

pub use assignment::{Assignment, Binding};
pub use distribution::{Distribution, Outcome, DEFAULT_PRECISION};
pub use engine::{EnumerationOptions, InferenceEngine};
pub use query::{Observation, Query};
