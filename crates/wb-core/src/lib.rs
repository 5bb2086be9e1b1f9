pub mod config;
pub mod outcome;
pub mod types;
pub mod validation;

pub use config::*;
pub use outcome::*;
pub use types::*;
pub use validation::*;
