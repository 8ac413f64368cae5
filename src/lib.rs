#[macro_use]
pub mod common;
pub mod inference;
pub mod network;
pub mod session;
pub mod table;

pub use common::errors::NetworkError;
pub use inference::{Distribution, InferenceEngine, Query};
pub use network::BayesianNetwork;
pub use session::Session;
