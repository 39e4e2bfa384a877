//! # Contract Module
//!
//! The read-only contract model path resolution runs against: declared servers
//! and a declaration-ordered collection of path templates, each with the
//! operations declared per HTTP method.
//!
//! Contracts are loaded once and never mutated. Rebuilding after a document
//! change means loading a fresh [`Contract`] (see [`crate::hot_reload`]).

mod build;
mod error;
mod load;
mod types;

pub use error::ContractError;
pub use load::*;
pub use types::*;
