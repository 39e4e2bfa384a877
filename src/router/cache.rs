//! # Compiled Segment Cache
//!
//! Thread-safe memo of compiled template segments, keyed by the exact segment
//! text, so regex compilation for embedded placeholders happens once per
//! distinct segment rather than once per request.
//!
//! ## Thread Safety
//!
//! The cache is backed by a [`DashMap`] and is the only shared mutable state
//! touched during resolution. Get-or-compile is check, compile, store:
//!
//! - Readers only ever see fully compiled `Arc<CompiledSegment>` values
//! - Two threads racing on first use of the same segment may both compile;
//!   the first insert wins and the other result is dropped
//! - Compilation failures are not stored, so a malformed segment is simply
//!   recompiled (and rejected again) on the next request
//!
//! Compiled segments depend only on the segment text, never on the contract,
//! so one cache can be shared across contract reloads.
//!
//! A resolver without a cache is a legal configuration: every lookup
//! compiles afresh, which is slower but produces identical results.

use super::segment::{CompiledSegment, MalformedSegment};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared, cloneable cache of compiled path segments.
///
/// # Example
///
/// ```rust
/// use oaspath::router::SegmentCache;
///
/// let cache = SegmentCache::new();
/// let seg = cache.get_or_compile("entities('{Entity}')").unwrap();
/// assert!(seg.matches("entities('42')"));
/// assert_eq!(cache.size(), 1);
/// ```
#[derive(Clone, Default)]
pub struct SegmentCache {
    matchers: Arc<DashMap<String, Arc<CompiledSegment>>>,
}

impl SegmentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a compiled segment, compiling and storing it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedSegment`] if the segment cannot be compiled.
    pub fn get_or_compile(&self, segment: &str) -> Result<Arc<CompiledSegment>, MalformedSegment> {
        // Fast path: the read guard must be dropped before any insert on the same shard
        if let Some(hit) = self.matchers.get(segment) {
            return Ok(Arc::clone(hit.value()));
        }

        let compiled = Arc::new(CompiledSegment::compile(segment)?);
        // First insert wins; the entry guard is released before `len()` walks the shards
        let stored = Arc::clone(
            self.matchers
                .entry(segment.to_string())
                .or_insert_with(|| Arc::clone(&compiled))
                .value(),
        );
        debug!(
            segment = %segment,
            literal = stored.is_literal(),
            cache_size = self.matchers.len(),
            "Path segment compiled and cached"
        );
        Ok(stored)
    }

    /// Number of cached segments.
    #[must_use]
    pub fn size(&self) -> usize {
        self.matchers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Drop every cached segment.
    pub fn clear(&self) {
        let dropped = self.matchers.len();
        self.matchers.clear();
        info!(dropped = dropped, "Path segment cache cleared");
    }
}

impl std::fmt::Debug for SegmentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentCache")
            .field("size", &self.matchers.len())
            .finish()
    }
}

/// Compile `segment` through `cache` when one is configured, or directly otherwise.
pub(crate) fn compile_segment(
    cache: Option<&SegmentCache>,
    segment: &str,
) -> Result<Arc<CompiledSegment>, MalformedSegment> {
    match cache {
        Some(cache) => cache.get_or_compile(segment),
        None => CompiledSegment::compile(segment).map(Arc::new),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hit_returns_same_matcher() {
        let cache = SegmentCache::new();
        let a = cache.get_or_compile("{id}").unwrap();
        let b = cache.get_or_compile("{id}").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_malformed_segments_are_not_stored() {
        let cache = SegmentCache::new();
        assert!(cache.get_or_compile("entities('{Entity'").is_err());
        assert!(cache.get_or_compile("entities('{Entity'").is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = SegmentCache::new();
        let clone = cache.clone();
        clone.get_or_compile("pets").unwrap();
        assert_eq!(cache.size(), 1);
        cache.clear();
        assert!(clone.is_empty());
    }

    #[test]
    fn test_concurrent_first_use() {
        let cache = SegmentCache::new();
        let segments = ["{id}", "pets", "entities('{Entity}')", "{.label}", "v{n}"];
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..50 {
                        for segment in segments {
                            let seg = cache.get_or_compile(segment).unwrap();
                            assert_eq!(seg.is_literal(), segment == "pets");
                        }
                    }
                });
            }
        });
        assert_eq!(cache.size(), segments.len());
    }

    #[test]
    fn test_compile_without_cache() {
        let seg = compile_segment(None, "entities('{Entity}')").unwrap();
        assert!(seg.matches("entities('x')"));
        assert!(compile_segment(None, "{").is_err());
    }
}
