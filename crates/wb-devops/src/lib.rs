//! Boundary to the Azure DevOps Git and work-item tracking services.

pub mod client;
pub mod error;
pub mod links;
pub mod service;
pub mod types;

pub use client::*;
pub use error::*;
pub use links::*;
pub use service::*;
pub use types::*;
