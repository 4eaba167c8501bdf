use std::sync::Arc;

use log::debug;
use upkeep_backend::{Dependency, PlatformDataService, ProjectData};

use crate::error::ResolveError;
use crate::resolver::VersionResolver;
use crate::specifier::implied_range;

/// Read-only checks deciding whether an update applies to a project.
pub struct DependencyQuery {
    resolver: Arc<VersionResolver>,
    platforms: Arc<dyn PlatformDataService>,
}

impl DependencyQuery {
    #[must_use]
    pub fn new(resolver: Arc<VersionResolver>, platforms: Arc<dyn PlatformDataService>) -> Self {
        Self {
            resolver,
            platforms,
        }
    }

    /// Whether the project declares `dependency` in `dependencies` or
    /// `devDependencies`. Missing sections count as "not declared".
    #[must_use]
    pub fn has_dependency(dependency: &Dependency, project: &ProjectData) -> bool {
        [&project.dependencies, &project.dev_dependencies]
            .into_iter()
            .flatten()
            .any(|section| section.contains_key(&dependency.package_name))
    }

    #[must_use]
    pub fn has_runtime_dependency(&self, platform: &str, project: &ProjectData) -> bool {
        self.platforms
            .current_platform_version(&platform.to_lowercase(), project)
            .is_some()
    }

    /// Highest published version of the platform's framework package in the
    /// range implied by the installed runtime (`3.0.0` looks within
    /// `^3.0.0`). Falls back to the installed version when nothing matches,
    /// and is `None` when the platform has no runtime installed.
    ///
    /// # Errors
    /// Returns [`ResolveError::Platform`] if the framework package cannot be
    /// determined, or the registry error unchanged if the lookup fails.
    pub async fn get_max_runtime_version(
        &self,
        platform: &str,
        project: &ProjectData,
    ) -> Result<Option<String>, ResolveError> {
        let platform = platform.to_lowercase();
        let Some(installed) = self.platforms.current_platform_version(&platform, project) else {
            debug!("No {platform} runtime installed");
            return Ok(None);
        };

        let package = self
            .platforms
            .framework_package_name(&platform, project)
            .map_err(|source| ResolveError::Platform {
                platform: platform.clone(),
                source,
            })?;
        let max = self
            .resolver
            .resolve_max_version(&package, &implied_range(&installed))
            .await?;

        Ok(max.or(Some(installed)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use async_trait::async_trait;
    use upkeep_backend::{FetchOptions, PackageManifest, RegistryClient, ServiceError};

    use super::*;

    struct StaticRegistry {
        max: HashMap<String, String>,
        offline: bool,
    }

    #[async_trait]
    impl RegistryClient for StaticRegistry {
        async fn tag_version(
            &self,
            _name: &str,
            _tag: &str,
        ) -> Result<Option<String>, ServiceError> {
            Ok(None)
        }

        async fn max_satisfying_version(
            &self,
            name: &str,
            range: &str,
        ) -> Result<Option<String>, ServiceError> {
            if self.offline {
                return Err(ServiceError::network_request("max satisfying", "offline"));
            }
            Ok(self.max.get(&format!("{name} {range}")).cloned())
        }

        async fn fetch_manifest(
            &self,
            name: &str,
            _version: &str,
            _options: FetchOptions,
        ) -> Result<PackageManifest, ServiceError> {
            Err(ServiceError::PackageNotFound {
                name: name.to_string(),
            })
        }
    }

    struct FixedPlatforms;

    impl PlatformDataService for FixedPlatforms {
        fn current_platform_version(
            &self,
            platform: &str,
            project: &ProjectData,
        ) -> Option<String> {
            let package = format!("tns-{platform}");
            project.runtime_version(&package).map(str::to_string)
        }

        fn framework_package_name(
            &self,
            platform: &str,
            _project: &ProjectData,
        ) -> Result<String, ServiceError> {
            match platform {
                "android" | "ios" => Ok(format!("tns-{platform}")),
                other => Err(ServiceError::UnknownPlatform {
                    platform: other.to_string(),
                }),
            }
        }
    }

    fn query(max: &[(&str, &str)]) -> DependencyQuery {
        let registry = StaticRegistry {
            max: max
                .iter()
                .map(|(key, version)| ((*key).to_string(), (*version).to_string()))
                .collect(),
            offline: false,
        };
        DependencyQuery::new(
            Arc::new(VersionResolver::new(Arc::new(registry))),
            Arc::new(FixedPlatforms),
        )
    }

    #[test]
    fn has_dependency_checks_both_sections() {
        let dependency = Dependency::new("nativescript-dev-webpack");

        let in_deps = ProjectData::default().with_dependency("nativescript-dev-webpack", "1.0.0");
        let in_dev =
            ProjectData::default().with_dev_dependency("nativescript-dev-webpack", "1.0.0");
        let elsewhere = ProjectData::default().with_dependency("tns-core-modules", "6.0.0");

        assert!(DependencyQuery::has_dependency(&dependency, &in_deps));
        assert!(DependencyQuery::has_dependency(&dependency, &in_dev));
        assert!(!DependencyQuery::has_dependency(&dependency, &elsewhere));
    }

    #[test]
    fn has_dependency_treats_missing_sections_as_absent() {
        let dependency = Dependency::new("tns-core-modules");
        let empty = ProjectData {
            dependencies: Some(BTreeMap::new()),
            ..ProjectData::default()
        };

        assert!(!DependencyQuery::has_dependency(&dependency, &ProjectData::default()));
        assert!(!DependencyQuery::has_dependency(&dependency, &empty));
    }

    #[test]
    fn has_runtime_dependency_lowercases_platform() {
        let query = query(&[]);
        let project = ProjectData::default().with_runtime("tns-android", "6.0.0");

        assert!(query.has_runtime_dependency("Android", &project));
        assert!(!query.has_runtime_dependency("iOS", &project));
    }

    #[tokio::test]
    async fn max_runtime_version_is_none_without_runtime() {
        let query = query(&[("tns-ios ^3.0.0", "3.2.0")]);

        let max = query
            .get_max_runtime_version("ios", &ProjectData::default())
            .await
            .expect("lookup succeeds");

        assert!(max.is_none());
    }

    #[tokio::test]
    async fn max_runtime_version_uses_highest_in_implied_range() {
        let query = query(&[("tns-ios ^3.0.0", "3.2.0")]);
        let project = ProjectData::default().with_runtime("tns-ios", "3.0.0");

        let max = query
            .get_max_runtime_version("iOS", &project)
            .await
            .expect("lookup succeeds");

        assert_eq!(max.as_deref(), Some("3.2.0"));
    }

    #[tokio::test]
    async fn max_runtime_version_falls_back_to_installed() {
        let query = query(&[]);
        let project = ProjectData::default().with_runtime("tns-ios", "3.0.0");

        let max = query
            .get_max_runtime_version("ios", &project)
            .await
            .expect("lookup succeeds");

        assert_eq!(max.as_deref(), Some("3.0.0"));
    }

    #[tokio::test]
    async fn max_runtime_version_reports_unknown_platform() {
        let query = query(&[]);
        let project = ProjectData::default().with_runtime("tns-windows", "1.0.0");

        let error = query
            .get_max_runtime_version("Windows", &project)
            .await
            .expect_err("windows has no framework package");

        assert_eq!(
            error,
            ResolveError::Platform {
                platform: "windows".to_string(),
                source: ServiceError::UnknownPlatform {
                    platform: "windows".to_string(),
                },
            }
        );
    }

    #[tokio::test]
    async fn max_runtime_version_propagates_registry_failure() {
        let registry = StaticRegistry {
            max: HashMap::new(),
            offline: true,
        };
        let query = DependencyQuery::new(
            Arc::new(VersionResolver::new(Arc::new(registry))),
            Arc::new(FixedPlatforms),
        );
        let project = ProjectData::default().with_runtime("tns-android", "6.0.0");

        let error = query
            .get_max_runtime_version("android", &project)
            .await
            .expect_err("registry is offline");

        assert_eq!(
            error,
            ResolveError::Registry(ServiceError::network_request("max satisfying", "offline"))
        );
    }
}
