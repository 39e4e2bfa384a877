//! # Runtime Configuration Module
//!
//! Environment-driven switches for the path resolver.
//!
//! ## Environment Variables
//!
//! ### `OASPATH_SEGMENT_CACHE`
//!
//! `off` disables the compiled-segment cache. Every request then compiles the
//! segments it touches, which is slower but resolves identically.
//!
//! Default: `on`
//!
//! ### `OASPATH_INDEXED_LOOKUP`
//!
//! `off` skips the prefix-tree lookup and sends every request through the
//! linear matcher. Useful when comparing the two engines.
//!
//! Default: `on`
//!
//! ### `OASPATH_PRECOMPILE`
//!
//! Compile every template segment when the resolver is built. This warms the
//! cache and reports malformed templates up front instead of on first request.
//!
//! Default: `on`
//!
//! ### `OASPATH_SLOW_MATCH_US`
//!
//! Resolutions taking longer than this many microseconds are logged at `warn`.
//!
//! Default: `1000`
//!
//! ## Usage
//!
//! ```rust
//! use oaspath::runtime_config::ResolverConfig;
//!
//! let config = ResolverConfig::from_env();
//! println!("segment cache enabled: {}", config.segment_cache);
//! ```
//!
//! ```bash
//! export OASPATH_INDEXED_LOOKUP=off
//! export OASPATH_SLOW_MATCH_US=250
//! oaspath resolve --spec openapi.yaml /pets/1
//! ```

use std::env;
use std::time::Duration;

const DEFAULT_SLOW_MATCH_US: u64 = 1000;

/// Resolver configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Memoize compiled segments (`OASPATH_SEGMENT_CACHE`)
    pub segment_cache: bool,
    /// Try the prefix tree before the linear scan (`OASPATH_INDEXED_LOOKUP`)
    pub indexed_lookup: bool,
    /// Compile all template segments at build time (`OASPATH_PRECOMPILE`)
    pub precompile: bool,
    /// Threshold for the slow-resolution warning (`OASPATH_SLOW_MATCH_US`)
    pub slow_match_threshold: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            segment_cache: true,
            indexed_lookup: true,
            precompile: true,
            slow_match_threshold: Duration::from_micros(DEFAULT_SLOW_MATCH_US),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|value| parse_switch(&value))
                .unwrap_or(default)
        };

        let slow_match_threshold = lookup("OASPATH_SLOW_MATCH_US")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map_or(defaults.slow_match_threshold, Duration::from_micros);

        Self {
            segment_cache: flag("OASPATH_SEGMENT_CACHE", defaults.segment_cache),
            indexed_lookup: flag("OASPATH_INDEXED_LOOKUP", defaults.indexed_lookup),
            precompile: flag("OASPATH_PRECOMPILE", defaults.precompile),
            slow_match_threshold,
        }
    }
}

fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Some(true),
        "off" | "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ResolverConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ResolverConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(config_from(&[]), ResolverConfig::default());
        assert_eq!(
            ResolverConfig::default().slow_match_threshold,
            Duration::from_millis(1)
        );
    }

    #[test]
    fn test_switches_off() {
        let config = config_from(&[
            ("OASPATH_SEGMENT_CACHE", "off"),
            ("OASPATH_INDEXED_LOOKUP", "FALSE"),
            ("OASPATH_PRECOMPILE", "0"),
        ]);
        assert!(!config.segment_cache);
        assert!(!config.indexed_lookup);
        assert!(!config.precompile);
    }

    #[test]
    fn test_slow_match_threshold() {
        let config = config_from(&[("OASPATH_SLOW_MATCH_US", "250")]);
        assert_eq!(config.slow_match_threshold, Duration::from_micros(250));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("OASPATH_SEGMENT_CACHE", "maybe"),
            ("OASPATH_SLOW_MATCH_US", "fast"),
        ]);
        assert_eq!(config, ResolverConfig::default());
    }
}
