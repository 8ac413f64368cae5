pub mod errors;
#[macro_use]
pub mod logging;
pub mod setup;

pub use errors::{NetworkError, Result};
pub use setup::{CommandLineOptions, OutputFormat};
