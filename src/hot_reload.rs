//! # Hot Reload Module
//!
//! Live reloading of the contract behind a [`PathResolver`] without
//! interrupting in-flight resolutions.
//!
//! ## Overview
//!
//! A resolver is immutable once built, so a contract change never edits it in
//! place. Instead a complete replacement is built off to the side and
//! published through a [`ResolverHandle`]. Readers holding the previous
//! snapshot finish against it; new readers see the replacement.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use oaspath::hot_reload::{watch_contract, ResolverHandle};
//! use oaspath::router::PathResolver;
//! use oaspath::spec::load_contract;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let contract = load_contract("openapi.yaml")?;
//! let handle = ResolverHandle::new(PathResolver::new(Arc::new(contract))?);
//!
//! let _watcher = watch_contract("openapi.yaml", handle.clone(), |resolver| {
//!     println!("reloaded {} templates", resolver.templates().count());
//! })?;
//!
//! let resolution = handle.current().resolve(&http::Method::GET, "/pets/1");
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! If the new document fails to load or has no `paths`:
//! - The error is logged
//! - The previous resolver remains active
//!
//! Saving the same bytes twice (editors often write more than once per save)
//! is detected by content fingerprint and does not rebuild.

use crate::router::PathResolver;
use crate::spec::{load_contract, load_contract_from_str, Contract, ContractError, ContractFormat};
use anyhow::Context;
use arc_swap::ArcSwap;
use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared, atomically swappable resolver.
///
/// Cloning the handle shares the same slot.
#[derive(Clone)]
pub struct ResolverHandle {
    slot: Arc<ArcSwap<PathResolver>>,
}

impl ResolverHandle {
    pub fn new(resolver: PathResolver) -> Self {
        Self {
            slot: Arc::new(ArcSwap::from_pointee(resolver)),
        }
    }

    /// Snapshot of the active resolver.
    ///
    /// The snapshot stays valid even if a reload publishes a replacement.
    #[must_use]
    pub fn current(&self) -> Arc<PathResolver> {
        self.slot.load_full()
    }

    /// Publish a fully built resolver, returning the one it replaced.
    pub fn swap(&self, resolver: PathResolver) -> Arc<PathResolver> {
        self.slot.swap(Arc::new(resolver))
    }

    /// Build a resolver for `contract` with the active configuration and
    /// segment cache, then publish it.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError`] if the contract cannot be resolved against;
    /// the active resolver is left in place.
    pub fn rebuild(&self, contract: Contract) -> Result<Arc<PathResolver>, ContractError> {
        let previous = self.current();
        let resolver = PathResolver::with_cache(
            Arc::new(contract),
            *previous.config(),
            previous.cache().cloned().unwrap_or_default(),
        )?;
        let resolver = Arc::new(resolver);
        self.slot.store(Arc::clone(&resolver));
        Ok(resolver)
    }
}

impl fmt::Debug for ResolverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.current();
        f.debug_struct("ResolverHandle")
            .field("title", &current.contract().title)
            .field("templates", &current.templates().count())
            .finish()
    }
}

/// Content fingerprint of a contract document.
///
/// First 16 hex characters of the SHA-256 of the raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContractFingerprint {
    hash: String,
}

impl ContractFingerprint {
    #[must_use]
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        let digest = hasher.finalize();
        let hash = digest
            .iter()
            .take(8)
            .map(|byte| format!("{byte:02x}"))
            .collect();
        Self { hash }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl fmt::Display for ContractFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hash)
    }
}

/// Load `path` and publish a resolver for it through `handle`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or declares no
/// paths. The active resolver is left in place.
pub fn reload_from_file(
    path: impl AsRef<Path>,
    handle: &ResolverHandle,
) -> anyhow::Result<Arc<PathResolver>> {
    let path = path.as_ref();
    let contract = load_contract(path)?;
    let resolver = handle
        .rebuild(contract)
        .with_context(|| format!("rebuilding resolver for {}", path.display()))?;
    info!(
        path = %path.display(),
        templates_count = resolver.templates().count(),
        "hot-reload: resolver swapped"
    );
    Ok(resolver)
}

/// Read, fingerprint and reload `path` unless its content is unchanged.
fn reload_if_changed(
    path: &Path,
    handle: &ResolverHandle,
    last: &mut Option<ContractFingerprint>,
) -> anyhow::Result<Option<Arc<PathResolver>>> {
    let content = std::fs::read(path)
        .with_context(|| format!("reading contract {}", path.display()))?;
    let fingerprint = ContractFingerprint::from_content(&content);
    if last.as_ref() == Some(&fingerprint) {
        debug!(path = %path.display(), fingerprint = %fingerprint, "hot-reload: content unchanged");
        return Ok(None);
    }

    let text = String::from_utf8(content).context("contract is not valid UTF-8")?;
    let contract = load_contract_from_str(&text, ContractFormat::from_path(path))
        .with_context(|| format!("loading contract {}", path.display()))?;
    let resolver = handle.rebuild(contract)?;
    info!(
        path = %path.display(),
        fingerprint = %fingerprint,
        templates_count = resolver.templates().count(),
        "hot-reload: resolver swapped"
    );
    *last = Some(fingerprint);
    Ok(Some(resolver))
}

/// Watch a contract file and republish the resolver whenever it changes.
///
/// `on_reload` runs after each successful swap. The returned watcher stops
/// watching when dropped.
///
/// # Errors
///
/// Returns a [`notify::Error`] if the watcher cannot be created or the path
/// cannot be watched.
pub fn watch_contract<P, F>(
    contract_path: P,
    handle: ResolverHandle,
    mut on_reload: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: FnMut(&PathResolver) + Send + 'static,
{
    let path: PathBuf = contract_path.as_ref().to_path_buf();
    let watch_path = path.clone();
    let mut last = std::fs::read(&path)
        .ok()
        .map(|content| ContractFingerprint::from_content(&content));

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                match reload_if_changed(&watch_path, &handle, &mut last) {
                    Ok(Some(resolver)) => on_reload(&resolver),
                    Ok(None) => {}
                    Err(err) => {
                        let message = format!("{err:#}");
                        warn!(
                            path = %watch_path.display(),
                            error = %message,
                            "hot-reload: keeping previous resolver"
                        );
                    }
                }
            }
            Err(err) => warn!(error = %err, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
