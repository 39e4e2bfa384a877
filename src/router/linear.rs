//! Linear matcher: scan every template, rank survivors by specificity.
//!
//! This engine accepts the full template grammar (label, matrix, exploded and
//! embedded placeholders) and is the fallback whenever the prefix tree misses.
//! It is O(n) in the number of templates.
//!
//! It also backs up the prefix tree: a tree hit only stands if none of the
//! templates the tree could not hold outranks it for the same request
//! ([`LinearMatcher::find_outranking`]).

use super::base_path::is_root;
use super::cache::{compile_segment, SegmentCache};
use super::matcher::{MatchEngine, MatchOutcome, PathMatch, PathMatcher};
use super::radix::is_indexable_template;
use super::segment::{decode_segment, split_segments, strip_fragment};
use super::specificity::{outranks, score, SpecificityScore};
use crate::spec::{PathItem, Paths};
use http::Method;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
struct LinearEntry {
    template: Arc<str>,
    item: Arc<PathItem>,
    score: SpecificityScore,
    position: usize,
}

impl LinearEntry {
    fn to_match(&self) -> PathMatch {
        PathMatch {
            template: Arc::clone(&self.template),
            item: Arc::clone(&self.item),
            score: self.score,
            position: self.position,
        }
    }
}

/// A template that matched the request, kept only for the duration of one scan.
struct Candidate<'a> {
    entry: &'a LinearEntry,
    has_method: bool,
}

/// Fallback matcher over every template in declaration order.
#[derive(Debug)]
pub struct LinearMatcher {
    entries: Vec<LinearEntry>,
    /// Indices of the entries the prefix tree cannot represent
    unindexed: Vec<usize>,
    base_paths: Vec<String>,
    cache: Option<SegmentCache>,
}

impl LinearMatcher {
    /// Build a matcher over `paths`.
    ///
    /// `base_paths` are used only when comparing the reconstructed path; the
    /// caller strips them from the request beforehand. With `cache` set to
    /// `None` every segment is compiled on each request.
    #[must_use]
    pub fn new(paths: &Paths, base_paths: Vec<String>, cache: Option<SegmentCache>) -> Self {
        let entries: Vec<LinearEntry> = paths
            .iter()
            .enumerate()
            .map(|(position, (template, item))| LinearEntry {
                template: Arc::from(template.as_str()),
                item: Arc::clone(item),
                score: score(template),
                position,
            })
            .collect();
        let unindexed = entries
            .iter()
            .filter(|entry| !is_indexable_template(&entry.template))
            .map(|entry| entry.position)
            .collect();
        Self {
            entries,
            unindexed,
            base_paths,
            cache,
        }
    }

    /// Number of templates scanned per request.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Templates in declaration order.
    pub fn templates(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.template.as_ref())
    }

    /// Rebuild the request path from the segments a template accepted and
    /// compare it with the request, with and without each base path merged back in.
    fn template_matches(&self, template: &str, path: &str, request: &[&str]) -> bool {
        let segments = split_segments(template);
        if segments.len() != request.len() {
            return false;
        }

        let mut merged = String::with_capacity(path.len() + 1);
        for (template_segment, request_segment) in segments.iter().zip(request) {
            let compiled = match compile_segment(self.cache.as_ref(), template_segment) {
                Ok(compiled) => compiled,
                Err(err) => {
                    debug!(template = %template, error = %err, "Skipping malformed template");
                    return false;
                }
            };
            if !compiled.matches(&decode_segment(request_segment)) {
                return false;
            }
            merged.push('/');
            merged.push_str(request_segment);
        }
        if merged.is_empty() {
            merged.push('/');
        }

        merged == path
            || self
                .base_paths
                .iter()
                .filter(|base| !is_root(base))
                .any(|base| {
                    let base = base.trim_end_matches('/');
                    merged.len() == base.len() + path.len()
                        && merged.starts_with(base)
                        && merged.ends_with(path)
                })
    }

    /// Best template the prefix tree cannot hold that declares `method`,
    /// matches `path`, and ranks above `hit`.
    ///
    /// `None` means `hit` is also the winner of a full scan, provided `hit` is
    /// the tree's answer for the same path and declares `method`.
    #[must_use]
    pub fn find_outranking(
        &self,
        method: &Method,
        path: &str,
        hit: &PathMatch,
    ) -> Option<PathMatch> {
        let contenders = self
            .unindexed
            .iter()
            .filter_map(|&index| self.entries.get(index))
            .filter(|entry| {
                outranks(entry.score, entry.position, hit.score, hit.position)
                    && entry.item.has_method(method)
            });
        let candidates = self.candidates(contenders, method, path);
        best(candidates.iter()).map(LinearEntry::to_match)
    }

    /// Keep the `entries` matching `path`, in the order given.
    fn candidates<'a>(
        &self,
        entries: impl Iterator<Item = &'a LinearEntry>,
        method: &Method,
        path: &str,
    ) -> Vec<Candidate<'a>> {
        let keep_fragments = path.contains('#');
        let request = split_segments(path);

        entries
            .filter(|entry| {
                let template = if keep_fragments {
                    entry.template.as_ref()
                } else {
                    strip_fragment(&entry.template)
                };
                self.template_matches(template, path, &request)
            })
            .map(|entry| Candidate {
                entry,
                has_method: entry.item.has_method(method),
            })
            .collect()
    }
}

/// Highest score wins; on equal scores the earlier candidate is kept.
fn best<'a, 'b>(candidates: impl Iterator<Item = &'b Candidate<'a>>) -> Option<&'a LinearEntry>
where
    'a: 'b,
{
    candidates
        .fold(None::<&Candidate<'a>>, |best, candidate| match best {
            Some(current) if candidate.entry.score <= current.entry.score => Some(current),
            _ => Some(candidate),
        })
        .map(|c| c.entry)
}

impl PathMatcher for LinearMatcher {
    fn find(&self, method: &Method, path: &str) -> MatchOutcome {
        let candidates = self.candidates(self.entries.iter(), method, path);
        if candidates.is_empty() {
            return MatchOutcome::NotFound;
        }

        if let Some(entry) = best(candidates.iter().filter(|c| c.has_method)) {
            return MatchOutcome::Found(entry.to_match());
        }

        match best(candidates.iter()) {
            Some(entry) => MatchOutcome::MethodMissing(entry.to_match()),
            None => MatchOutcome::NotFound,
        }
    }

    fn engine(&self) -> MatchEngine {
        MatchEngine::Linear
    }
}
