//! Path template segment classification and compilation.
//!
//! Every template segment is classified once by [`classify`] into a
//! [`SegmentKind`]; both the matchers and the specificity scorer read that
//! classification, so they can never disagree about what counts as a literal.
//!
//! | Segment                      | Kind       |
//! |------------------------------|------------|
//! | `pets`                       | Literal    |
//! | `{petId}`, `{ids*}`          | Simple     |
//! | `{.color}`                   | Label      |
//! | `{;color}`                   | Matrix     |
//! | `entities('{Entity}')`       | Embedded   |

use percent_encoding::percent_decode_str;
use regex::Regex;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;

/// Maximum number of path segments before heap allocation.
pub const MAX_INLINE_SEGMENTS: usize = 8;

/// Stack-allocated segment list for the hot path.
pub type Segments<'a> = SmallVec<[&'a str; MAX_INLINE_SEGMENTS]>;

/// Pattern a single placeholder expands to: one or more characters, never `/`.
const PARAM_PATTERN: &str = "([^/]+)";

/// Split a path into `/`-delimited segments.
///
/// The empty segment produced by the leading `/` is dropped, and `/` alone
/// has no segments at all. Other empty segments are kept, so `/pets/` has two
/// segments (`pets` and the empty string) and does not collapse onto `/pets`.
#[must_use]
pub fn split_segments(path: &str) -> Segments<'_> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return Segments::new();
    }
    trimmed.split('/').collect()
}

/// Percent-decode one request segment for comparison with template text.
///
/// Decoding happens after splitting, so an encoded `%2F` never introduces a
/// segment boundary. Segments that do not decode to UTF-8 are compared as sent.
#[must_use]
pub fn decode_segment(segment: &str) -> Cow<'_, str> {
    if !segment.contains('%') {
        return Cow::Borrowed(segment);
    }
    percent_decode_str(segment)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(segment))
}

/// Drop a `#fragment` suffix from a template or path.
#[inline]
#[must_use]
pub fn strip_fragment(path: &str) -> &str {
    path.split_once('#').map_or(path, |(head, _)| head)
}

/// Shape of one template segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind<'a> {
    /// No placeholder: matched by exact string comparison
    Literal,
    /// `{name}` or exploded `{name*}`
    Simple { name: &'a str, explode: bool },
    /// `{.name}` label style
    Label { name: &'a str, explode: bool },
    /// `{;name}` matrix style
    Matrix { name: &'a str, explode: bool },
    /// Placeholder syntax inside literal framing, e.g. `entities('{Entity}')`
    Embedded,
}

impl SegmentKind<'_> {
    #[inline]
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self, SegmentKind::Literal)
    }

    /// Whether the prefix-tree lookup can represent this segment.
    ///
    /// Only literals and plain, non-exploded `{name}` placeholders qualify.
    #[must_use]
    pub fn is_indexable(&self) -> bool {
        match self {
            SegmentKind::Literal => true,
            SegmentKind::Simple { name, explode } => !explode && !name.is_empty(),
            _ => false,
        }
    }
}

/// Classify a template segment by inspecting its braces.
#[must_use]
pub fn classify(segment: &str) -> SegmentKind<'_> {
    if !segment.contains('{') {
        return SegmentKind::Literal;
    }

    if let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        if !inner.contains(['{', '}']) {
            let (inner, explode) = match inner.strip_suffix('*') {
                Some(name) => (name, true),
                None => (inner, false),
            };
            return match inner.as_bytes().first() {
                Some(b'.') => SegmentKind::Label {
                    name: &inner[1..],
                    explode,
                },
                Some(b';') => SegmentKind::Matrix {
                    name: &inner[1..],
                    explode,
                },
                _ => SegmentKind::Simple {
                    name: inner,
                    explode,
                },
            };
        }
    }

    SegmentKind::Embedded
}

/// Why a template segment could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// `{` without a closing `}`
    Unterminated,
    /// `}` without an opening `{`
    UnexpectedClose,
    /// `{` inside an open placeholder
    Nested,
    /// `{}` with no parameter name
    EmptyName,
    /// The generated pattern was rejected by the regex engine
    Pattern(String),
}

/// A template segment whose placeholder braces cannot be compiled.
///
/// Templates containing such a segment never match; other templates are
/// unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedSegment {
    pub segment: String,
    pub reason: MalformedReason,
}

impl MalformedSegment {
    fn new(segment: &str, reason: MalformedReason) -> Self {
        Self {
            segment: segment.to_string(),
            reason,
        }
    }
}

impl fmt::Display for MalformedSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match &self.reason {
            MalformedReason::Unterminated => "unterminated '{'".to_string(),
            MalformedReason::UnexpectedClose => "'}' without matching '{'".to_string(),
            MalformedReason::Nested => "nested '{' inside a parameter".to_string(),
            MalformedReason::EmptyName => "empty parameter name".to_string(),
            MalformedReason::Pattern(e) => format!("invalid pattern: {e}"),
        };
        write!(f, "malformed path segment '{}': {}", self.segment, reason)
    }
}

impl std::error::Error for MalformedSegment {}

/// How a compiled segment tests a request segment.
#[derive(Debug, Clone)]
pub enum SegmentMatcher {
    /// Literal segment: exact string equality
    Exact(Box<str>),
    /// Whole-segment placeholder: any non-empty value
    Any,
    /// Embedded placeholders: anchored regex over the literal framing
    Pattern(Regex),
}

/// A template segment compiled for matching.
#[derive(Debug, Clone)]
pub struct CompiledSegment {
    matcher: SegmentMatcher,
    literal: bool,
}

impl CompiledSegment {
    /// Compile one template segment.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedSegment`] when braces are unbalanced, nested, or
    /// enclose an empty name.
    pub fn compile(segment: &str) -> Result<Self, MalformedSegment> {
        let matcher = match classify(segment) {
            SegmentKind::Literal => SegmentMatcher::Exact(segment.into()),
            SegmentKind::Simple { name, .. }
            | SegmentKind::Label { name, .. }
            | SegmentKind::Matrix { name, .. } => {
                if name.is_empty() {
                    return Err(MalformedSegment::new(segment, MalformedReason::EmptyName));
                }
                SegmentMatcher::Any
            }
            SegmentKind::Embedded => {
                let pattern = embedded_pattern(segment)?;
                let regex = Regex::new(&pattern).map_err(|e| {
                    MalformedSegment::new(segment, MalformedReason::Pattern(e.to_string()))
                })?;
                SegmentMatcher::Pattern(regex)
            }
        };
        let literal = matches!(matcher, SegmentMatcher::Exact(_));
        Ok(Self { matcher, literal })
    }

    /// Test a request segment against this template segment.
    #[inline]
    #[must_use]
    pub fn matches(&self, request_segment: &str) -> bool {
        match &self.matcher {
            SegmentMatcher::Exact(literal) => literal.as_ref() == request_segment,
            SegmentMatcher::Any => !request_segment.is_empty(),
            SegmentMatcher::Pattern(regex) => regex.is_match(request_segment),
        }
    }

    /// Whether the template segment had no placeholder.
    #[inline]
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.literal
    }

    #[must_use]
    pub fn matcher(&self) -> &SegmentMatcher {
        &self.matcher
    }
}

/// Build an anchored regex for a segment with embedded placeholders.
fn embedded_pattern(segment: &str) -> Result<String, MalformedSegment> {
    let mut pattern = String::with_capacity(segment.len() + 16);
    pattern.push('^');

    let mut literal_start = 0;
    let mut open: Option<usize> = None;

    for (idx, ch) in segment.char_indices() {
        match (ch, open) {
            ('{', None) => {
                pattern.push_str(&regex::escape(&segment[literal_start..idx]));
                open = Some(idx);
            }
            ('{', Some(_)) => {
                return Err(MalformedSegment::new(segment, MalformedReason::Nested));
            }
            ('}', Some(start)) => {
                if idx == start + 1 {
                    return Err(MalformedSegment::new(segment, MalformedReason::EmptyName));
                }
                pattern.push_str(PARAM_PATTERN);
                open = None;
                literal_start = idx + 1;
            }
            ('}', None) => {
                return Err(MalformedSegment::new(
                    segment,
                    MalformedReason::UnexpectedClose,
                ));
            }
            _ => {}
        }
    }

    if open.is_some() {
        return Err(MalformedSegment::new(segment, MalformedReason::Unterminated));
    }

    pattern.push_str(&regex::escape(&segment[literal_start..]));
    pattern.push('$');
    Ok(pattern)
}
