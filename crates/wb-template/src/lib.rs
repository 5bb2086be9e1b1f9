//! Branch-name template engine: token extraction, sanitization and
//! composition. Pure functions only; fetching happens in `wb-flow`.

pub mod compose;
pub mod sanitize;
pub mod tokenizer;

pub use compose::*;
pub use sanitize::*;
pub use tokenizer::*;
