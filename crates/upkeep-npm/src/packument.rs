use std::collections::BTreeMap;

use semver::Version;
use serde::Deserialize;
use upkeep_core::SpecRange;

/// Registry document listing every published version of a package.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Packument {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "dist-tags")]
    pub dist_tags: BTreeMap<String, String>,
    #[serde(default)]
    pub versions: BTreeMap<String, serde_json::Value>,
}

impl Packument {
    #[must_use]
    pub fn tag_version(&self, tag: &str) -> Option<String> {
        self.dist_tags.get(tag).cloned()
    }

    /// Highest published version satisfying `range`. Unparseable ranges and
    /// unparseable published versions never match.
    #[must_use]
    pub fn max_satisfying(&self, range: &str) -> Option<String> {
        let range = SpecRange::parse(range)?;
        let published: Vec<Version> = self
            .versions
            .keys()
            .filter_map(|version| Version::parse(version).ok())
            .collect();

        range.max_satisfying(&published).map(ToString::to_string)
    }
}
