use async_trait::async_trait;
use std::path::Path;

use crate::error::ServiceError;
use crate::types::{FetchOptions, PackageManifest, ProjectData};

/// Package registry lookups consumed by the resolver.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Version currently bound to `tag`, or `None` when the tag is unknown.
    async fn tag_version(&self, name: &str, tag: &str) -> Result<Option<String>, ServiceError>;

    /// Highest published version satisfying `range`, or `None`.
    async fn max_satisfying_version(
        &self,
        name: &str,
        range: &str,
    ) -> Result<Option<String>, ServiceError>;

    async fn fetch_manifest(
        &self,
        name: &str,
        version: &str,
        options: FetchOptions,
    ) -> Result<PackageManifest, ServiceError>;

    async fn fetch_full_manifest(
        &self,
        name: &str,
        version: &str,
    ) -> Result<PackageManifest, ServiceError> {
        self.fetch_manifest(name, version, FetchOptions::default()).await
    }
}

/// Directory operations used by snapshots.
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn delete_directory(&self, path: &Path) -> std::io::Result<()>;

    fn create_directory(&self, path: &Path) -> std::io::Result<()>;

    /// Copy `source` into `dest_into`, so it lands at `dest_into/<source name>`.
    fn copy_directory(&self, source: &Path, dest_into: &Path) -> std::io::Result<()>;
}

pub trait PlatformDataService: Send + Sync {
    /// `platform` is expected lowercase.
    fn current_platform_version(&self, platform: &str, project: &ProjectData) -> Option<String>;

    fn framework_package_name(
        &self,
        platform: &str,
        project: &ProjectData,
    ) -> Result<String, ServiceError>;
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct RecordingRegistry {
        calls: Mutex<Vec<FetchOptions>>,
    }

    #[async_trait]
    impl RegistryClient for RecordingRegistry {
        async fn tag_version(
            &self,
            _name: &str,
            _tag: &str,
        ) -> Result<Option<String>, ServiceError> {
            Ok(None)
        }

        async fn max_satisfying_version(
            &self,
            _name: &str,
            _range: &str,
        ) -> Result<Option<String>, ServiceError> {
            Ok(None)
        }

        async fn fetch_manifest(
            &self,
            name: &str,
            version: &str,
            options: FetchOptions,
        ) -> Result<PackageManifest, ServiceError> {
            self.calls.lock().expect("lock").push(options);
            Ok(PackageManifest {
                name: name.to_string(),
                version: version.to_string(),
                dependencies: Default::default(),
                dev_dependencies: Default::default(),
                peer_dependencies: Default::default(),
                extra: serde_json::Map::new(),
            })
        }
    }

    #[tokio::test]
    async fn fetch_full_manifest_requests_full_metadata() {
        let registry = RecordingRegistry::default();

        let manifest = registry
            .fetch_full_manifest("tns-ios", "6.5.0")
            .await
            .expect("fetch succeeds");

        assert_eq!(manifest.name, "tns-ios");
        assert_eq!(manifest.version, "6.5.0");
        assert_eq!(
            *registry.calls.lock().expect("lock"),
            vec![FetchOptions {
                full_metadata: true
            }]
        );
    }

    #[tokio::test]
    async fn registry_client_is_object_safe() {
        let registry: Box<dyn RegistryClient> = Box::new(RecordingRegistry::default());

        let tag = registry
            .tag_version("tns-ios", "latest")
            .await
            .expect("lookup succeeds");

        assert!(tag.is_none());
    }
}
