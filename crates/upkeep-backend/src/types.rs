use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ServiceError;

const PACKAGE_JSON: &str = "package.json";

/// A dependency an update may target, identified by its exact package name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub package_name: String,
}

impl Dependency {
    #[must_use]
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
        }
    }
}

/// Full registry metadata for one published package version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: BTreeMap<String, String>,
    #[serde(default, rename = "peerDependencies")]
    pub peer_dependencies: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub full_metadata: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            full_metadata: true,
        }
    }
}

/// Runtime record stored for a framework package in the project's
/// `nativescript` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeRecord {
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectData {
    pub project_dir: PathBuf,
    pub dependencies: Option<BTreeMap<String, String>>,
    pub dev_dependencies: Option<BTreeMap<String, String>>,
    pub runtimes: BTreeMap<String, RuntimeRecord>,
}

#[derive(Deserialize)]
struct RawPackageJson {
    #[serde(default)]
    dependencies: Option<BTreeMap<String, String>>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: Option<BTreeMap<String, String>>,
    #[serde(default)]
    nativescript: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ProjectData {
    #[must_use]
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Self::default()
        }
    }

    /// Read `package.json` from `project_dir`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn load(project_dir: &Path) -> Result<Self, ServiceError> {
        let content = std::fs::read_to_string(project_dir.join(PACKAGE_JSON))?;
        let mut project = Self::from_package_json(&content)?;
        project.project_dir = project_dir.to_path_buf();
        Ok(project)
    }

    /// Parse the dependency and runtime sections of a `package.json` body.
    ///
    /// # Errors
    /// Returns an error if `content` is not a valid `package.json` document.
    pub fn from_package_json(content: &str) -> Result<Self, ServiceError> {
        let raw: RawPackageJson = serde_json::from_str(content)
            .map_err(|e| ServiceError::invalid_project(PACKAGE_JSON, e.to_string()))?;

        // Non-object entries (for example the app "id") are not runtimes.
        let runtimes = raw
            .nativescript
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| {
                serde_json::from_value::<RuntimeRecord>(value)
                    .ok()
                    .map(|record| (key, record))
            })
            .collect();

        Ok(Self {
            project_dir: PathBuf::new(),
            dependencies: raw.dependencies,
            dev_dependencies: raw.dev_dependencies,
            runtimes,
        })
    }

    #[must_use]
    pub fn with_dependency(mut self, name: &str, specifier: &str) -> Self {
        self.dependencies
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), specifier.to_string());
        self
    }

    #[must_use]
    pub fn with_dev_dependency(mut self, name: &str, specifier: &str) -> Self {
        self.dev_dependencies
            .get_or_insert_with(BTreeMap::new)
            .insert(name.to_string(), specifier.to_string());
        self
    }

    #[must_use]
    pub fn with_runtime(mut self, package_name: &str, version: &str) -> Self {
        self.runtimes.insert(
            package_name.to_string(),
            RuntimeRecord {
                version: Some(version.to_string()),
            },
        );
        self
    }

    #[must_use]
    pub fn runtime_version(&self, package_name: &str) -> Option<&str> {
        self.runtimes
            .get(package_name)
            .and_then(|record| record.version.as_deref())
    }
}
