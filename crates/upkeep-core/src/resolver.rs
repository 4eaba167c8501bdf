use std::sync::Arc;

use log::{debug, info};
use upkeep_backend::RegistryClient;

use crate::cache::{ManifestCache, ManifestKey, ManifestResult};
use crate::error::ResolveError;
use crate::specifier::{VersionSpecifier, parse_exact};

/// Resolves version specifiers against a package registry and memoizes
/// manifest lookups for the lifetime of the resolver.
pub struct VersionResolver {
    registry: Arc<dyn RegistryClient>,
    manifests: ManifestCache,
}

impl VersionResolver {
    #[must_use]
    pub fn new(registry: Arc<dyn RegistryClient>) -> Self {
        Self {
            registry,
            manifests: ManifestCache::new(),
        }
    }

    /// Resolve `specifier` to the highest matching published version.
    ///
    /// Exact versions are returned unchanged without a registry call, ranges
    /// go through `max_satisfying_version`, and anything else is looked up as
    /// a dist-tag. `Ok(None)` means the registry had no match.
    ///
    /// # Errors
    /// Returns the registry error unchanged if the lookup fails.
    pub async fn resolve_max_version(
        &self,
        name: &str,
        specifier: &str,
    ) -> Result<Option<String>, ResolveError> {
        let classified = VersionSpecifier::classify(specifier);
        debug!("Classified {name}@{specifier} as {}", classified.kind());

        match classified {
            VersionSpecifier::Exact(_) => Ok(Some(specifier.to_string())),
            VersionSpecifier::Range(range) => {
                info!("Looking up max version of {name} satisfying {range}");
                Ok(self
                    .registry
                    .max_satisfying_version(name, range.as_str())
                    .await?)
            }
            VersionSpecifier::Tag(tag) => {
                info!("Looking up dist-tag {tag} of {name}");
                Ok(self.registry.tag_version(name, &tag).await?)
            }
        }
    }

    /// Fetch the full manifest for `name` at `specifier`, memoized on the
    /// literal `(name, specifier)` pair.
    ///
    /// Only exact versions and dist-tags are understood here: a non-exact
    /// specifier is always looked up as a tag, so a range usually fails to
    /// resolve.
    ///
    /// # Errors
    /// Returns [`ResolveError::Unresolvable`] when the specifier does not lead
    /// to a valid exact version, or the registry error if a lookup fails.
    pub async fn get_package_manifest(&self, name: &str, specifier: &str) -> ManifestResult {
        let key = ManifestKey::new(name, specifier);
        let ManifestKey { name, specifier } = key.clone();
        let registry = Arc::clone(&self.registry);

        self.manifests
            .get_or_fetch(key, move || async move {
                let resolved = if parse_exact(&specifier).is_some() {
                    Some(specifier.clone())
                } else {
                    registry.tag_version(&name, &specifier).await?
                };

                let Some(version) = resolved.as_deref().and_then(parse_exact) else {
                    return Err(ResolveError::Unresolvable {
                        name,
                        specifier,
                        resolved,
                    });
                };

                info!("Fetching manifest for {name}@{version}");
                Ok(registry
                    .fetch_full_manifest(&name, &version.to_string())
                    .await?)
            })
            .await
    }

    /// Forget the memoized manifest for `(name, specifier)`.
    pub fn invalidate(&self, name: &str, specifier: &str) -> bool {
        self.manifests.invalidate(&ManifestKey::new(name, specifier))
    }

    pub fn clear_cache(&self) {
        self.manifests.clear();
    }

    #[must_use]
    pub fn cached_entries(&self) -> usize {
        self.manifests.len()
    }
}
