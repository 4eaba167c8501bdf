mod client;
mod packument;
mod platform;

pub use client::{DEFAULT_REGISTRY, NpmRegistryClient};
pub use packument::Packument;
pub use platform::ProjectPlatformData;

pub use upkeep_backend::{
    Dependency, FetchOptions, PackageManifest, PlatformDataService, ProjectData, RegistryClient,
    ServiceError,
};
