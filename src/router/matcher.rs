use super::specificity::{score, SpecificityScore};
use crate::spec::PathItem;
use http::Method;
use std::fmt;
use std::sync::Arc;

/// A template selected for a request, with the path item it declares.
#[derive(Debug, Clone)]
pub struct PathMatch {
    /// Template exactly as declared in the contract, never the request's values
    pub template: Arc<str>,
    pub item: Arc<PathItem>,
    pub score: SpecificityScore,
    /// Index of the template in declaration order
    pub position: usize,
}

impl PathMatch {
    #[must_use]
    pub fn new(template: &str, item: Arc<PathItem>, position: usize) -> Self {
        Self {
            score: score(template),
            template: Arc::from(template),
            item,
            position,
        }
    }
}

/// Result of asking one matching engine about a request.
#[derive(Debug, Clone)]
pub enum MatchOutcome {
    /// A template matched and declares the requested method
    Found(PathMatch),
    /// The best template matched but does not declare the method
    MethodMissing(PathMatch),
    NotFound,
}

impl MatchOutcome {
    /// The matched template and item, with or without the method.
    #[must_use]
    pub fn path_match(&self) -> Option<&PathMatch> {
        match self {
            MatchOutcome::Found(m) | MatchOutcome::MethodMissing(m) => Some(m),
            MatchOutcome::NotFound => None,
        }
    }

    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, MatchOutcome::Found(_))
    }
}

/// Which engine produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchEngine {
    /// Prefix-tree lookup
    Indexed,
    /// Full scan with specificity ranking
    Linear,
    /// No template matched
    Unmatched,
}

impl fmt::Display for MatchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchEngine::Indexed => "indexed",
            MatchEngine::Linear => "linear",
            MatchEngine::Unmatched => "unmatched",
        };
        f.write_str(name)
    }
}

/// A strategy that maps a base-stripped request path to a template.
///
/// Implemented by [`super::PathLookup`] and [`super::LinearMatcher`]; the
/// resolver composes them without either knowing about the other.
pub trait PathMatcher: Send + Sync {
    /// Match `path`, which has already had base paths removed and any request
    /// fragment re-attached as `path#fragment`.
    fn find(&self, method: &Method, path: &str) -> MatchOutcome;

    /// The engine reported for outcomes of this matcher.
    fn engine(&self) -> MatchEngine;
}
