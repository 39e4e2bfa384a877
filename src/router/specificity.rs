//! Template specificity scoring.
//!
//! A template's score ranks it against every other template that matches the
//! same request. Literal segments dominate by position: a literal at index
//! `i` outweighs everything at indices greater than `i`, literal or not.
//! Parameter segments add 1 each, so an all-parameter template scores exactly
//! its segment count and `/` scores 0.
//!
//! Positional dominance is what lets the prefix-tree lookup, which prefers
//! the literal edge at each node, pick the same winner as a full scan.
//!
//! ```text
//! /api/v1/users/me       > /api/v1/users/{id} > /api/{version}/users/{id}
//! /Messages/Operations   > /Messages/{id}
//! /pets/{petId}          = /pets/{petName}      (declaration order decides)
//! ```

use super::segment::{classify, split_segments, strip_fragment};

/// Comparable template score; higher is more specific.
pub type SpecificityScore = u64;

/// Bits reserved for the parameter segment count.
const PARAM_BITS: u32 = 16;

/// Segment positions that receive a distinct positional literal weight.
/// Deeper literals share the smallest literal weight.
pub const POSITIONAL_SEGMENTS: usize = 48;

/// Weight of a literal segment at `index`.
#[inline]
#[must_use]
pub fn literal_weight(index: usize) -> SpecificityScore {
    let rank = POSITIONAL_SEGMENTS.saturating_sub(1).saturating_sub(index);
    1u64 << (PARAM_BITS + rank as u32)
}

/// Score a path template.
///
/// Any `#fragment` suffix is ignored. A segment containing `{` anywhere
/// (simple, exploded, label, matrix or embedded) counts as a parameter.
#[must_use]
pub fn score(template: &str) -> SpecificityScore {
    split_segments(strip_fragment(template))
        .iter()
        .enumerate()
        .fold(0, |acc, (index, segment)| {
            let weight = if classify(segment).is_literal() {
                literal_weight(index)
            } else {
                1
            };
            acc.saturating_add(weight)
        })
}

/// Whether the template at `position` with `score` beats another match.
///
/// The higher score wins; equal scores go to the template declared first.
#[inline]
#[must_use]
pub fn outranks(
    score: SpecificityScore,
    position: usize,
    other_score: SpecificityScore,
    other_position: usize,
) -> bool {
    score > other_score || (score == other_score && position < other_position)
}
