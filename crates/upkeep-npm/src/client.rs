use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use upkeep_backend::{FetchOptions, PackageManifest, RegistryClient, ServiceError};
use upkeep_platform::UpdateSettings;

use crate::packument::Packument;

pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

const FULL_METADATA: &str = "application/json";
const ABBREVIATED_METADATA: &str =
    "application/vnd.npm.install-v1+json; q=1.0, application/json; q=0.8";

/// [`RegistryClient`] speaking the npm registry HTTP API.
#[derive(Debug, Clone)]
pub struct NpmRegistryClient {
    client: reqwest::Client,
    registry_url: String,
}

impl NpmRegistryClient {
    /// Build a client for `registry_url` with a per-request timeout.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(registry_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("upkeep/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ServiceError::network_request_from("build registry client", e))?;

        Ok(Self::with_client(client, registry_url))
    }

    /// Client for the registry and timeout configured in `settings`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_settings(settings: &UpdateSettings) -> Result<Self, ServiceError> {
        Self::new(&settings.registry_url, settings.http_timeout())
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, registry_url: &str) -> Self {
        Self {
            client,
            registry_url: registry_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    #[must_use]
    pub fn packument_url(&self, name: &str) -> String {
        format!("{}/{}", self.registry_url, encode_package_name(name))
    }

    #[must_use]
    pub fn manifest_url(&self, name: &str, version: &str) -> String {
        format!("{}/{version}", self.packument_url(name))
    }

    async fn fetch_packument(
        &self,
        name: &str,
        operation: &'static str,
    ) -> Result<Packument, ServiceError> {
        let url = self.packument_url(name);
        self.get_json(&url, ABBREVIATED_METADATA, operation, name).await
    }

    async fn get_json<T>(
        &self,
        url: &str,
        accept: &'static str,
        operation: &'static str,
        not_found: &str,
    ) -> Result<T, ServiceError>
    where
        T: DeserializeOwned,
    {
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .send()
            .await
            .map_err(|e| ServiceError::network_request_from(operation, e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ServiceError::PackageNotFound {
                name: not_found.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ServiceError::network_request(
                operation,
                format!("HTTP {status} from {url}"),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| ServiceError::network_parse_from(operation, e))
    }
}

#[async_trait]
impl RegistryClient for NpmRegistryClient {
    async fn tag_version(&self, name: &str, tag: &str) -> Result<Option<String>, ServiceError> {
        let packument = self
            .fetch_packument(name, "look up dist-tag")
            .await?;
        let version = packument.tag_version(tag);
        info!("{name}@{tag} -> {}", version.as_deref().unwrap_or("(unbound)"));
        Ok(version)
    }

    async fn max_satisfying_version(
        &self,
        name: &str,
        range: &str,
    ) -> Result<Option<String>, ServiceError> {
        let packument = self
            .fetch_packument(name, "look up max satisfying version")
            .await?;
        let version = packument.max_satisfying(range);
        info!("{name}@{range} -> {}", version.as_deref().unwrap_or("(no match)"));
        Ok(version)
    }

    async fn fetch_manifest(
        &self,
        name: &str,
        version: &str,
        options: FetchOptions,
    ) -> Result<PackageManifest, ServiceError> {
        let accept = if options.full_metadata {
            FULL_METADATA
        } else {
            ABBREVIATED_METADATA
        };
        let url = self.manifest_url(name, version);
        self.get_json(&url, accept, "fetch package manifest", &format!("{name}@{version}")).await
    }
}

/// Scoped names keep their `@` but the separator is escaped
/// (`@scope/name` -> `@scope%2fname`).
fn encode_package_name(name: &str) -> String {
    name.replace('/', "%2f")
}
