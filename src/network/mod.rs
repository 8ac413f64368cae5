pub mod cpt;
pub mod loader;
pub mod network;
pub mod variable;

pub use cpt::{ConditionalProbabilityTable, ParentKey, ROOT_KEY};
pub use network::{BayesianNetwork, NetworkBuilder};
pub use variable::Variable;
