mod error;
mod traits;
mod types;

pub use error::{NetworkStage, ServiceError};
pub use traits::{FileSystem, PlatformDataService, RegistryClient};
pub use types::{Dependency, FetchOptions, PackageManifest, ProjectData, RuntimeRecord};
