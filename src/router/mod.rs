//! # Router Module
//!
//! Resolves an incoming request (method + URL) to the OpenAPI path template
//! that declares it.
//!
//! ## Architecture
//!
//! Resolution runs in two phases:
//!
//! 1. **Build**: when a [`PathResolver`] is constructed, server base paths are
//!    extracted, indexable templates are inserted into a prefix tree
//!    ([`PathLookup`]), every template is scored for specificity, and
//!    template segments are optionally precompiled into the [`SegmentCache`].
//!
//! 2. **Resolve**: per request, the base path is stripped and the prefix tree
//!    is consulted. A tree hit is only accepted once the templates the tree
//!    could not hold have been checked for a higher ranked match. On a miss,
//!    or when the hit lacks the method, the [`LinearMatcher`] scans every
//!    template, keeping the most specific one that declares the request method.
//!
//! Both engines implement [`PathMatcher`]. Resolving with the prefix tree
//! enabled or disabled always selects the same template.
//!
//! ## Precedence
//!
//! - Literal segments beat placeholders at the same position, independent of
//!   declaration order (`/Messages/Operations` over `/Messages/{id}`)
//! - Equally specific templates are tie-broken by declaration order
//! - A template declaring the request method beats a more specific one that
//!   does not; only if none declares it is an operation error reported
//!
//! ## Example
//!
//! ```rust
//! use oaspath::router::PathResolver;
//! use oaspath::spec::{load_contract_from_str, ContractFormat};
//! use http::Method;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let contract = load_contract_from_str(
//!     r#"{"paths": {"/Messages/{id}": {"get": {}}, "/Messages/Operations": {"get": {}}}}"#,
//!     ContractFormat::Json,
//! )?;
//! let resolver = PathResolver::new(Arc::new(contract))?;
//!
//! let resolution = resolver.resolve(&Method::GET, "/Messages/Operations");
//! assert_eq!(resolution.matched_template.as_deref(), Some("/Messages/Operations"));
//!
//! let missing = resolver.resolve(&Method::DELETE, "/Messages/Operations");
//! assert!(missing.errors[0].is_operation_missing());
//! # Ok(())
//! # }
//! ```

mod base_path;
mod cache;
mod core;
mod linear;
mod matcher;
mod radix;
mod segment;
mod specificity;
#[cfg(test)]
mod tests;

pub use base_path::{base_paths, server_base_path, strip_base_path, RequestTarget};
pub use cache::SegmentCache;
pub use core::{MalformedTemplate, PathResolution, PathResolver};
pub use linear::LinearMatcher;
pub use matcher::{MatchEngine, MatchOutcome, PathMatch, PathMatcher};
pub use radix::PathLookup;
pub use segment::{
    classify, decode_segment, split_segments, CompiledSegment, MalformedReason, MalformedSegment, SegmentKind,
    SegmentMatcher,
};
pub use specificity::{outranks, score, SpecificityScore};
