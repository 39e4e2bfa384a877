//! Path resolution facade - hot path for every validated request.
//!
//! [`PathResolver`] strips base paths from the request, tries the prefix tree,
//! and falls back to the linear matcher on a miss. It holds no per-request
//! state: the tree and the linear entries are immutable after construction,
//! and the segment cache is the only shared mutable structure.

use super::base_path::{base_paths, RequestTarget};
use super::cache::{compile_segment, SegmentCache};
use super::linear::LinearMatcher;
use super::matcher::{MatchEngine, MatchOutcome, PathMatch, PathMatcher};
use super::radix::PathLookup;
use super::segment::{split_segments, MalformedSegment};
use crate::runtime_config::ResolverConfig;
use crate::spec::{Contract, ContractError, Operation, PathItem, Paths};
use crate::validator::ValidationError;
use http::Method;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A declared template with a segment that cannot be compiled.
///
/// Such templates never match any request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTemplate {
    pub template: String,
    pub error: MalformedSegment,
}

/// Outcome of resolving one request against the contract.
#[derive(Debug, Clone)]
pub struct PathResolution {
    /// The matched path item, also set when only the method is missing
    pub path_item: Option<Arc<PathItem>>,
    /// Empty on success; otherwise a single path or operation error
    pub errors: Vec<ValidationError>,
    /// The template as declared (e.g. `/pets/{petId}`), never the request values
    pub matched_template: Option<String>,
    pub engine: MatchEngine,
}

impl PathResolution {
    fn matched(found: PathMatch, engine: MatchEngine) -> Self {
        Self {
            path_item: Some(found.item),
            errors: Vec::new(),
            matched_template: Some(found.template.to_string()),
            engine,
        }
    }

    fn method_missing(
        found: PathMatch,
        engine: MatchEngine,
        method: &Method,
        request_path: &str,
    ) -> Self {
        Self {
            errors: vec![ValidationError::operation_not_found(
                method,
                request_path,
                &found.template,
            )],
            path_item: Some(found.item),
            matched_template: Some(found.template.to_string()),
            engine,
        }
    }

    fn not_found(method: &Method, request_path: &str) -> Self {
        Self {
            path_item: None,
            errors: vec![ValidationError::path_not_found(method, request_path)],
            matched_template: None,
            engine: MatchEngine::Unmatched,
        }
    }

    /// A template matched and declares the requested method.
    #[inline]
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.errors.is_empty() && self.path_item.is_some()
    }

    /// The operation declared for `method` on the matched path item.
    #[must_use]
    pub fn operation(&self, method: &Method) -> Option<&Operation> {
        self.path_item.as_deref()?.operation(method)
    }
}

/// Resolves request paths to contract templates.
///
/// Build once per contract and share freely across threads; rebuilding after a
/// contract change means constructing a new resolver (see
/// [`crate::hot_reload::ResolverHandle`]).
///
/// # Example
///
/// ```rust
/// use oaspath::router::PathResolver;
/// use oaspath::spec::{load_contract_from_str, ContractFormat};
/// use http::Method;
/// use std::sync::Arc;
///
/// let contract = load_contract_from_str(
///     r#"
/// openapi: 3.1.0
/// info: { title: Pets, version: "1" }
/// servers: [{ url: "https://x.com/api" }]
/// paths:
///   /pets/{petId}:
///     get: { operationId: getPet }
/// "#,
///     ContractFormat::Yaml,
/// )?;
///
/// let resolver = PathResolver::new(Arc::new(contract))?;
/// let resolution = resolver.resolve(&Method::GET, "https://x.com/api/pets/7");
/// assert!(resolution.is_match());
/// assert_eq!(resolution.matched_template.as_deref(), Some("/pets/{petId}"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct PathResolver {
    contract: Arc<Contract>,
    config: ResolverConfig,
    base_paths: Vec<String>,
    lookup: Option<PathLookup>,
    linear: LinearMatcher,
    cache: Option<SegmentCache>,
    malformed: Vec<MalformedTemplate>,
}

impl PathResolver {
    /// Build a resolver with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::MissingPaths`] if the contract has no `paths` object.
    pub fn new(contract: Arc<Contract>) -> Result<Self, ContractError> {
        Self::with_config(contract, ResolverConfig::default())
    }

    /// Build a resolver with an explicit configuration and a fresh segment cache.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::MissingPaths`] if the contract has no `paths` object.
    pub fn with_config(
        contract: Arc<Contract>,
        config: ResolverConfig,
    ) -> Result<Self, ContractError> {
        Self::with_cache(contract, config, SegmentCache::new())
    }

    /// Build a resolver that shares an existing segment cache.
    ///
    /// The cache is ignored when `config.segment_cache` is off.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::MissingPaths`] if the contract has no `paths` object.
    pub fn with_cache(
        contract: Arc<Contract>,
        config: ResolverConfig,
        cache: SegmentCache,
    ) -> Result<Self, ContractError> {
        let paths = contract
            .paths
            .as_ref()
            .ok_or_else(|| ContractError::MissingPaths {
                title: contract.title.clone(),
            })?;

        let cache = config.segment_cache.then_some(cache);
        let base_paths = base_paths(&contract.servers);
        let lookup = config.indexed_lookup.then(|| PathLookup::build(paths));
        let linear = LinearMatcher::new(paths, base_paths.clone(), cache.clone());
        let malformed = if config.precompile {
            precompile(paths, cache.as_ref())
        } else {
            Vec::new()
        };

        for entry in &malformed {
            warn!(
                template = %entry.template,
                segment = %entry.error.segment,
                error = %entry.error,
                "Malformed path template will never match"
            );
        }

        let resolver = Self {
            config,
            base_paths,
            lookup,
            linear,
            cache,
            malformed,
            contract,
        };

        info!(
            title = %resolver.contract.title,
            templates_count = resolver.linear.len(),
            indexed_count = resolver.indexed_template_count(),
            base_paths = ?resolver.base_paths,
            malformed_count = resolver.malformed.len(),
            segment_cache = resolver.cache.is_some(),
            "Path resolver built"
        );

        Ok(resolver)
    }

    /// Resolve a request to a contract template.
    ///
    /// `request_url` may be absolute (`https://x.com/api/pets/1#frag`) or
    /// origin-form (`/api/pets/1?limit=5`). Expected mismatches are reported in
    /// [`PathResolution::errors`]; this never fails or panics.
    #[must_use]
    pub fn resolve(&self, method: &Method, request_url: &str) -> PathResolution {
        debug!(method = %method, url = %request_url, "Path resolution attempt");
        let start = Instant::now();

        let target = RequestTarget::parse(request_url);
        let path = target.matching_path(&self.base_paths);
        let (outcome, engine) = self.find(method, &path);

        let resolution = match outcome {
            MatchOutcome::Found(found) => PathResolution::matched(found, engine),
            MatchOutcome::MethodMissing(found) => {
                PathResolution::method_missing(found, engine, method, &target.path)
            }
            MatchOutcome::NotFound => PathResolution::not_found(method, &target.path),
        };

        let duration = start.elapsed();
        if duration > self.config.slow_match_threshold {
            warn!(
                method = %method,
                path = %target.path,
                template = ?resolution.matched_template,
                engine = %resolution.engine,
                duration_us = duration.as_micros(),
                "Slow path resolution detected"
            );
        } else {
            debug!(
                method = %method,
                path = %target.path,
                matching_path = %path,
                template = ?resolution.matched_template,
                engine = %resolution.engine,
                errors = resolution.errors.len(),
                duration_us = duration.as_micros(),
                "Path resolved"
            );
        }

        resolution
    }

    /// Resolve an [`http::Request`] by its method and URI.
    #[must_use]
    pub fn resolve_request<B>(&self, request: &http::Request<B>) -> PathResolution {
        self.resolve(request.method(), &request.uri().to_string())
    }

    /// Run the engines over an already stripped path.
    ///
    /// An indexed hit is checked against the templates the tree does not
    /// hold, since one of those may be more specific. An indexed hit without
    /// the method is not final either: the linear result stands, and the
    /// indexed template is only reported when the scan finds nothing at all.
    fn find(&self, method: &Method, path: &str) -> (MatchOutcome, MatchEngine) {
        let mut indexed_miss = None;
        if let Some(lookup) = &self.lookup {
            match lookup.find(method, path) {
                MatchOutcome::Found(found) => {
                    return match self.linear.find_outranking(method, path, &found) {
                        Some(better) => (MatchOutcome::Found(better), self.linear.engine()),
                        None => (MatchOutcome::Found(found), lookup.engine()),
                    };
                }
                MatchOutcome::MethodMissing(found) => indexed_miss = Some(found),
                MatchOutcome::NotFound => {}
            }
        }

        match (self.linear.find(method, path), indexed_miss) {
            (MatchOutcome::NotFound, Some(found)) => {
                (MatchOutcome::MethodMissing(found), MatchEngine::Indexed)
            }
            (MatchOutcome::NotFound, None) => (MatchOutcome::NotFound, MatchEngine::Unmatched),
            (outcome, _) => (outcome, self.linear.engine()),
        }
    }

    #[must_use]
    pub fn contract(&self) -> &Arc<Contract> {
        &self.contract
    }

    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Base paths of the declared servers, in declaration order.
    #[must_use]
    pub fn base_paths(&self) -> &[String] {
        &self.base_paths
    }

    /// Declared templates in declaration order.
    pub fn templates(&self) -> impl Iterator<Item = &str> + '_ {
        self.linear.templates()
    }

    /// Templates reachable through the prefix tree (0 when it is disabled).
    #[must_use]
    pub fn indexed_template_count(&self) -> usize {
        self.lookup.as_ref().map_or(0, PathLookup::indexed_count)
    }

    /// Templates found malformed when the resolver was built.
    ///
    /// Always empty when precompilation is disabled.
    #[must_use]
    pub fn malformed_templates(&self) -> &[MalformedTemplate] {
        &self.malformed
    }

    /// The shared segment cache, if enabled.
    #[must_use]
    pub fn cache(&self) -> Option<&SegmentCache> {
        self.cache.as_ref()
    }

    /// The prefix-tree engine, if enabled.
    #[must_use]
    pub fn indexed_matcher(&self) -> Option<&PathLookup> {
        self.lookup.as_ref()
    }

    #[must_use]
    pub fn linear_matcher(&self) -> &LinearMatcher {
        &self.linear
    }
}

/// Compile every segment of every template, collecting the first failure per template.
fn precompile(paths: &Paths, cache: Option<&SegmentCache>) -> Vec<MalformedTemplate> {
    paths
        .keys()
        .filter_map(|template| {
            split_segments(template)
                .iter()
                .find_map(|segment| compile_segment(cache, segment).err())
                .map(|error| MalformedTemplate {
                    template: template.clone(),
                    error,
                })
        })
        .collect()
}
