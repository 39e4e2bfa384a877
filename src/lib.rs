//! # oaspath
//!
//! **oaspath** resolves incoming HTTP requests to the path templates of an
//! [OpenAPI 3.x](https://spec.openapis.org/oas/v3.1.0) contract: given a method
//! and a URL, it answers which declared template (and which path item) the
//! request addresses, or reports why none does.
//!
//! ## Overview
//!
//! Path resolution is the first step of request validation. Parameters,
//! bodies and security can only be checked once the operation a request
//! targets is known. oaspath covers that step and nothing more:
//!
//! - Server base paths (`https://x.com/api/v1`) are stripped before matching
//! - Literal segments take precedence over placeholders, independent of
//!   declaration order
//! - Equally specific templates are tie-broken by declaration order
//! - Label (`{.x}`), matrix (`{;x}`), exploded (`{x*}`) and embedded OData
//!   style (`entities('{Entity}')`) placeholders are supported
//! - Failures are returned as structured [`validator::ValidationError`]
//!   values, distinguishing an unknown path from an undeclared method
//!
//! ## Architecture
//!
//! - **[`spec`]** - Read-only contract model and YAML/JSON loaders
//! - **[`router`]** - Segment compilation, specificity scoring, the prefix-tree
//!   and linear matchers, and the [`router::PathResolver`] facade
//! - **[`validator`]** - Validation error values
//! - **[`runtime_config`]** - Environment-driven resolver switches
//! - **[`logging`]** - `tracing-subscriber` setup
//! - **[`hot_reload`]** - Atomic resolver swapping and contract file watching
//! - **[`cli`]** - The `oaspath` command line
//!
//! ### Resolution Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Resolver as PathResolver
//!     participant Base as base_path
//!     participant Tree as PathLookup
//!     participant Scan as LinearMatcher
//!     participant Cache as SegmentCache
//!
//!     Caller->>Resolver: resolve(GET, "https://x.com/api/pets/42")
//!     Resolver->>Base: parse target, strip "/api"
//!     Base-->>Resolver: "/pets/42"
//!     Resolver->>Tree: lookup("/pets/42")
//!     alt literal-first descent reaches a template with GET
//!         Tree-->>Resolver: /pets/{petId}
//!         Resolver->>Scan: find_outranking(GET, "/pets/42", hit)
//!         Scan-->>Resolver: unindexed template ranked above the hit, if any
//!         Resolver-->>Caller: PathResolution (indexed or linear)
//!     else miss, or template lacks GET
//!         Resolver->>Scan: find(GET, "/pets/42")
//!         loop every template
//!             Scan->>Cache: get_or_compile(segment)
//!             Cache-->>Scan: CompiledSegment
//!         end
//!         Scan->>Scan: rank candidates by specificity
//!         Scan-->>Resolver: best with GET, else best overall
//!         Resolver-->>Caller: PathResolution (+ ValidationError)
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oaspath::router::PathResolver;
//! use oaspath::spec::load_contract;
//! use http::Method;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let contract = load_contract("openapi.yaml")?;
//! let resolver = PathResolver::new(Arc::new(contract))?;
//!
//! let resolution = resolver.resolve(&Method::GET, "/api/pets/42");
//! if resolution.is_match() {
//!     println!("matched {:?}", resolution.matched_template);
//! } else {
//!     for error in &resolution.errors {
//!         eprintln!("{error}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! A [`router::PathResolver`] is `Send + Sync` and needs no locking: the
//! prefix tree and template list are immutable after construction, and the
//! segment cache is a concurrent map. Contract changes are published by
//! building a new resolver and swapping it through
//! [`hot_reload::ResolverHandle`].

pub mod cli;
pub mod hot_reload;
pub mod logging;
pub mod router;
pub mod runtime_config;
pub mod spec;
pub mod validator;

pub use router::{PathResolution, PathResolver};
pub use spec::{load_contract, Contract};
pub use validator::ValidationError;
