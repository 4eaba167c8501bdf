//! Update resolution and safety engine.
//!
//! This crate holds the logic an update command needs between "the user asked
//! for version V of X" and "the project now has it":
//! - Version specifier classification and registry-backed resolution.
//! - Single-flight, memoized manifest retrieval.
//! - Folder snapshots that can be restored after a failed update.
//! - Read-only checks over project dependencies and installed runtimes.

mod cache;
mod error;
mod fs;
mod query;
mod resolver;
mod snapshot;
mod specifier;
mod update;

/// Manifest memo keyed on the literal `(name, specifier)` pair.
pub use cache::{ManifestCache, ManifestKey, ManifestResult};
/// Resolution, snapshot, and guarded-update errors.
pub use error::{ResolveError, SnapshotAction, SnapshotError, UpdateError};
/// `std::fs` implementation of the filesystem contract.
pub use fs::LocalFileSystem;
/// Dependency and runtime applicability checks.
pub use query::DependencyQuery;
/// Specifier resolution against a registry.
pub use resolver::VersionResolver;
/// Backup and restore of project folders.
pub use snapshot::{BackupSet, SnapshotManager};
/// Specifier classification and npm range matching.
pub use specifier::{SpecRange, SpecifierKind, VersionSpecifier, implied_range, parse_exact};
/// Backup, update, restore-on-failure flow.
pub use update::guarded_update;
