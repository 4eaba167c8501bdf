use std::collections::BTreeMap;

use upkeep_backend::{PlatformDataService, ProjectData, ServiceError};

const DEFAULT_FRAMEWORKS: &[(&str, &str)] = &[("android", "tns-android"), ("ios", "tns-ios")];

/// Platform data read from the project's `package.json` runtime records.
#[derive(Debug, Clone)]
pub struct ProjectPlatformData {
    frameworks: BTreeMap<String, String>,
}

impl Default for ProjectPlatformData {
    fn default() -> Self {
        Self {
            frameworks: DEFAULT_FRAMEWORKS
                .iter()
                .map(|(platform, package)| ((*platform).to_string(), (*package).to_string()))
                .collect(),
        }
    }
}

impl ProjectPlatformData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or override the framework package backing `platform`.
    #[must_use]
    pub fn with_framework(mut self, platform: &str, package_name: &str) -> Self {
        self.frameworks
            .insert(platform.to_lowercase(), package_name.to_string());
        self
    }

    fn framework(&self, platform: &str) -> Option<&str> {
        self.frameworks
            .get(&platform.to_lowercase())
            .map(String::as_str)
    }
}

impl PlatformDataService for ProjectPlatformData {
    fn current_platform_version(&self, platform: &str, project: &ProjectData) -> Option<String> {
        let package = self.framework(platform)?;
        project.runtime_version(package).map(str::to_string)
    }

    fn framework_package_name(
        &self,
        platform: &str,
        _project: &ProjectData,
    ) -> Result<String, ServiceError> {
        self.framework(platform)
            .map(str::to_string)
            .ok_or_else(|| ServiceError::UnknownPlatform {
                platform: platform.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_platforms_map_to_framework_packages() {
        let platforms = ProjectPlatformData::new();
        let project = ProjectData::default();

        assert_eq!(
            platforms.framework_package_name("android", &project),
            Ok("tns-android".to_string())
        );
        assert_eq!(
            platforms.framework_package_name("IOS", &project),
            Ok("tns-ios".to_string())
        );
    }

    #[test]
    fn unknown_platform_is_an_error() {
        let result =
            ProjectPlatformData::new().framework_package_name("windows", &ProjectData::default());

        assert_eq!(
            result,
            Err(ServiceError::UnknownPlatform {
                platform: "windows".to_string()
            })
        );
    }

    #[test]
    fn current_version_comes_from_runtime_record() {
        let platforms = ProjectPlatformData::new();
        let project = ProjectData::from_package_json(
            r#"{ "nativescript": { "tns-android": { "version": "6.0.0" } } }"#,
        )
        .expect("package.json parses");

        assert_eq!(
            platforms.current_platform_version("android", &project),
            Some("6.0.0".to_string())
        );
        assert!(platforms.current_platform_version("ios", &project).is_none());
    }

    #[test]
    fn with_framework_overrides_mapping() {
        let platforms =
            ProjectPlatformData::new().with_framework("Android", "@nativescript/android");
        let project = ProjectData::default().with_runtime("@nativescript/android", "7.0.0");

        assert_eq!(
            platforms.current_platform_version("android", &project),
            Some("7.0.0".to_string())
        );
    }
}
