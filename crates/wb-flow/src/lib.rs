//! Work-item branch creation: naming, policy, linking and the creation flow.

pub mod creator;
pub mod error;
pub mod linking;
pub mod naming;
pub mod parent;
pub mod policy;

#[cfg(test)]
pub(crate) mod test_support;

pub use creator::*;
pub use error::*;
pub use linking::*;
pub use naming::*;
pub use parent::*;
pub use policy::*;
