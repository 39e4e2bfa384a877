//! Server base paths and request target parsing.
//!
//! A contract declaring `servers: [{url: https://x.com/api/v1}]` describes
//! templates relative to `/api/v1`, so that prefix is removed from every
//! request path before matching.

use crate::spec::Server;
use url::Url;

/// Base used to resolve origin-form request targets and server paths.
const PLACEHOLDER_ORIGIN: &str = "http://localhost";

/// Path portion of a declared server URL.
///
/// URLs that do not parse (templated hosts such as `https://{region}.x.com/v1`,
/// or relative URLs such as `/v1`) fall back to the text after the authority,
/// re-parsed as a path on its own. An empty path is reported as `/`.
#[must_use]
pub fn server_base_path(server_url: &str) -> String {
    if let Ok(url) = Url::parse(server_url) {
        return normalise_root(url.path());
    }

    let after_scheme = server_url
        .split_once("://")
        .map(|(_, rest)| rest)
        .or_else(|| server_url.strip_prefix("//"));
    let raw_path = match after_scheme {
        Some(rest) => rest.find('/').map_or("/", |idx| &rest[idx..]),
        None => server_url,
    };

    let reparsed = Url::parse(PLACEHOLDER_ORIGIN).and_then(|origin| origin.join(raw_path));
    match reparsed {
        Ok(url) => normalise_root(url.path()),
        Err(_) => normalise_root(raw_path),
    }
}

fn normalise_root(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Base paths of every declared server, in declaration order, duplicates included.
#[must_use]
pub fn base_paths(servers: &[Server]) -> Vec<String> {
    servers.iter().map(|s| server_base_path(&s.url)).collect()
}

/// Whether `base` is the bare root, which strips nothing.
#[inline]
pub(crate) fn is_root(base: &str) -> bool {
    base.trim_end_matches('/').is_empty()
}

/// Remove the first matching base path from the front of `path`.
///
/// Matching is first-in-list, not longest. A base only matches on a segment
/// boundary (`/api` strips `/api/users` but not `/apiary`), trailing slashes on
/// the base are ignored, and the root base `/` is skipped. The result always
/// starts with `/`.
#[must_use]
pub fn strip_base_path<S: AsRef<str>>(path: &str, base_paths: &[S]) -> String {
    for base in base_paths {
        let base = base.as_ref();
        if is_root(base) {
            continue;
        }
        let base = base.trim_end_matches('/');
        if let Some(rest) = path.strip_prefix(base) {
            if rest.is_empty() || rest.starts_with('/') {
                return normalise_root(rest);
            }
        }
    }
    normalise_root(path)
}

/// The parts of a request URL that path resolution needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    /// Path component as sent, without query or fragment
    pub path: String,
    pub fragment: Option<String>,
}

impl RequestTarget {
    /// Parse an absolute URL (`https://x.com/a?b#c`) or an origin-form target (`/a?b#c`).
    ///
    /// Origin-form targets are split as sent. `//pets/1` is a path with an
    /// empty first segment, not a scheme-relative URL naming host `pets`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with('/') {
            return Self::split_raw(raw);
        }

        let parsed = Url::parse(raw).or_else(|err| match err {
            url::ParseError::RelativeUrlWithoutBase => {
                Url::parse(PLACEHOLDER_ORIGIN).and_then(|origin| origin.join(raw))
            }
            other => Err(other),
        });

        match parsed {
            Ok(url) => RequestTarget {
                path: normalise_root(url.path()),
                fragment: url.fragment().filter(|f| !f.is_empty()).map(str::to_string),
            },
            Err(_) => Self::split_raw(raw),
        }
    }

    /// Split on `#` and `?` by hand.
    fn split_raw(raw: &str) -> Self {
        let (rest, fragment) = match raw.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (raw, None),
        };
        let path = rest.split_once('?').map_or(rest, |(path, _)| path);
        RequestTarget {
            path: normalise_root(path),
            fragment: fragment.filter(|f| !f.is_empty()).map(str::to_string),
        }
    }

    /// Strip `base_paths` from the path and re-attach the fragment as `path#fragment`.
    #[must_use]
    pub fn matching_path<S: AsRef<str>>(&self, base_paths: &[S]) -> String {
        let stripped = strip_base_path(&self.path, base_paths);
        match &self.fragment {
            Some(fragment) => format!("{stripped}#{fragment}"),
            None => stripped,
        }
    }
}
