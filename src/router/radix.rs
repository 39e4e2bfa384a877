//! Prefix tree for fast template lookup
//!
//! The indexed engine handles the common case: templates made only of
//! literal segments and plain `{name}` placeholders. Each node has literal
//! children keyed by segment text plus at most one parametric child shared by
//! every placeholder at that position, whatever its name.
//!
//! ## Lookup
//!
//! Descent is deterministic. At each node the literal edge for the
//! percent-decoded request segment is preferred, otherwise the parametric
//! edge is taken, otherwise the lookup fails. There is no backtracking: a miss
//! is handed to the linear engine, which scans every template. Because
//! specificity is positional-dominant, a hit from this greedy descent is the
//! highest ranked of the *indexed* templates. Templates the tree cannot hold
//! may still outrank it, so the resolver re-checks those before accepting a
//! hit (see [`super::LinearMatcher::find_outranking`]).
//!
//! ## Construction
//!
//! Templates containing label, matrix, exploded or embedded placeholders, or
//! a `#fragment`, are skipped rather than rejected; they are only reachable
//! through the linear engine. When two templates share a shape
//! (`/pets/{petId}`, `/pets/{petName}`) the first one declared keeps the
//! terminal.
//!
//! The tree is immutable once built and needs no locking for concurrent reads.
//!
//! ## Example
//!
//! ```rust
//! use oaspath::router::PathLookup;
//! use oaspath::spec::{PathItem, Paths};
//! use http::Method;
//! use std::sync::Arc;
//!
//! let mut paths = Paths::new();
//! paths.insert("/pets/{id}".into(), Arc::new(PathItem::default().with_method(Method::GET)));
//! paths.insert("/pets/mine".into(), Arc::new(PathItem::default().with_method(Method::GET)));
//!
//! let lookup = PathLookup::build(&paths);
//! assert_eq!(lookup.lookup("/pets/mine").unwrap().template.as_ref(), "/pets/mine");
//! assert_eq!(lookup.lookup("/pets/42").unwrap().template.as_ref(), "/pets/{id}");
//! assert!(!lookup.is_indexed("/pets/{petName}"));
//! ```

use super::matcher::{MatchEngine, MatchOutcome, PathMatch, PathMatcher};
use super::segment::{classify, decode_segment, split_segments};
use crate::spec::Paths;
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Node in the lookup tree
#[derive(Debug, Default)]
struct LookupNode {
    /// Literal edges keyed by exact segment text
    literal_children: HashMap<Box<str>, LookupNode>,
    /// The single parametric edge shared by every `{name}` at this depth
    param_child: Option<Box<LookupNode>>,
    /// Template terminating at this node, if any
    bound: Option<PathMatch>,
}

impl LookupNode {
    /// Insert a template; returns false if an earlier template already owns the terminal.
    fn insert(&mut self, segments: &[&str], entry: PathMatch) -> bool {
        let mut node = self;
        for segment in segments {
            node = if classify(segment).is_literal() {
                node.literal_children.entry(Box::from(*segment)).or_default()
            } else {
                node.param_child.get_or_insert_with(Box::default)
            };
        }

        if node.bound.is_some() {
            return false;
        }
        node.bound = Some(entry);
        true
    }

    fn search(&self, segments: &[&str]) -> Option<&PathMatch> {
        let mut node = self;
        for segment in segments {
            let segment = decode_segment(segment);
            node = match node.literal_children.get(segment.as_ref()) {
                Some(child) => child,
                None if !segment.is_empty() => node.param_child.as_deref()?,
                None => return None,
            };
        }
        node.bound.as_ref()
    }

    /// Follow template segments (not request segments) to the node they end at.
    fn terminal(&self, segments: &[&str]) -> Option<&LookupNode> {
        let mut node = self;
        for segment in segments {
            node = if classify(segment).is_literal() {
                node.literal_children.get(*segment)?
            } else {
                node.param_child.as_deref()?
            };
        }
        Some(node)
    }
}

/// Whether the prefix tree can represent `template`.
///
/// Every segment must be a literal or a plain `{name}`, and the template must
/// carry no `#fragment`, whose matching depends on the request.
#[must_use]
pub(crate) fn is_indexable_template(template: &str) -> bool {
    !template.contains('#')
        && split_segments(template)
            .iter()
            .all(|segment| classify(segment).is_indexable())
}

/// Prefix-tree index over the indexable templates of a contract.
#[derive(Debug, Default)]
pub struct PathLookup {
    root: LookupNode,
    indexed: usize,
    skipped: usize,
}

impl PathLookup {
    /// Build the tree from every template in declaration order.
    #[must_use]
    pub fn build(paths: &Paths) -> Self {
        let mut lookup = Self::default();

        for (position, (template, item)) in paths.iter().enumerate() {
            if !is_indexable_template(template) {
                lookup.skipped += 1;
                debug!(template = %template, "Template not indexable, linear matching only");
                continue;
            }

            let segments = split_segments(template);
            let entry = PathMatch::new(template, Arc::clone(item), position);
            if lookup.root.insert(&segments, entry) {
                lookup.indexed += 1;
            } else {
                lookup.skipped += 1;
                debug!(
                    template = %template,
                    "Template shadowed by an earlier template of the same shape"
                );
            }
        }

        lookup
    }

    /// Find the template bound to `path`.
    ///
    /// Segment counts must agree exactly: a template that is a prefix of the
    /// request, or longer than it, never matches.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&PathMatch> {
        if self.indexed == 0 {
            return None;
        }
        let segments = split_segments(path);
        self.root.search(&segments)
    }

    /// Whether `template` owns a terminal in the tree.
    ///
    /// False for templates that were skipped as non-indexable and for those
    /// shadowed by an earlier template of the same shape.
    #[must_use]
    pub fn is_indexed(&self, template: &str) -> bool {
        if !is_indexable_template(template) {
            return false;
        }
        self.root
            .terminal(&split_segments(template))
            .and_then(|node| node.bound.as_ref())
            .is_some_and(|bound| bound.template.as_ref() == template)
    }

    /// Number of templates reachable through the tree.
    #[must_use]
    pub fn indexed_count(&self) -> usize {
        self.indexed
    }

    /// Number of templates left to the linear engine.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexed == 0
    }
}

impl PathMatcher for PathLookup {
    fn find(&self, method: &Method, path: &str) -> MatchOutcome {
        match self.lookup(path) {
            Some(hit) if hit.item.has_method(method) => MatchOutcome::Found(hit.clone()),
            Some(hit) => MatchOutcome::MethodMissing(hit.clone()),
            None => MatchOutcome::NotFound,
        }
    }

    fn engine(&self) -> MatchEngine {
        MatchEngine::Indexed
    }
}
