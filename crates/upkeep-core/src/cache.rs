use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use log::{debug, warn};
use upkeep_backend::PackageManifest;

use crate::error::ResolveError;

pub type ManifestResult = Result<Arc<PackageManifest>, ResolveError>;

type SharedFetch = Shared<BoxFuture<'static, ManifestResult>>;

/// Literal `(package name, specifier)` pair. The specifier is not normalized,
/// so `latest` and ` latest` are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestKey {
    pub name: String,
    pub specifier: String,
}

impl ManifestKey {
    #[must_use]
    pub fn new(name: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            specifier: specifier.into(),
        }
    }
}

impl fmt::Display for ManifestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.specifier)
    }
}

struct Entry {
    id: u64,
    fetch: SharedFetch,
}

/// Single-flight manifest memo.
///
/// Each key maps to one shared fetch. Callers arriving while the fetch is in
/// flight attach to it instead of starting another, and every caller observes
/// the same settled result. Successful results stay cached until
/// [`ManifestCache::invalidate`] or [`ManifestCache::clear`]; failed fetches
/// are evicted once they settle so a later call can retry.
///
/// A fetch abandoned by all of its callers stays in the map unfinished and is
/// driven to completion by the next caller for that key.
#[derive(Default)]
pub struct ManifestCache {
    entries: Mutex<HashMap<ManifestKey, Entry>>,
    next_id: AtomicU64,
}

impl ManifestCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the memoized manifest for `key`, starting `fetch` only if no
    /// fetch for that key is cached or in flight.
    ///
    /// # Errors
    /// Returns the error the shared fetch settled with.
    pub async fn get_or_fetch<F, Fut>(&self, key: ManifestKey, fetch: F) -> ManifestResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<PackageManifest, ResolveError>> + Send + 'static,
    {
        let (id, shared) = {
            let mut entries = self.lock();
            if let Some(entry) = entries.get(&key) {
                debug!("Manifest cache hit for {key}");
                (entry.id, entry.fetch.clone())
            } else {
                debug!("Manifest cache miss for {key}, starting fetch");
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let shared = fetch().map(|result| result.map(Arc::new)).boxed().shared();
                entries.insert(
                    key.clone(),
                    Entry {
                        id,
                        fetch: shared.clone(),
                    },
                );
                (id, shared)
            }
        };

        let result = shared.await;

        if let Err(error) = &result {
            let mut entries = self.lock();
            // Only evict the fetch we awaited; a retry may already have replaced it.
            if entries.get(&key).is_some_and(|entry| entry.id == id) {
                warn!("Evicting failed manifest fetch for {key}: {error}");
                entries.remove(&key);
            }
        }

        result
    }

    /// Drop the entry for `key`. Callers already attached to an in-flight
    /// fetch still receive its result.
    pub fn invalidate(&self, key: &ManifestKey) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ManifestKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
