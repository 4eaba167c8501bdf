mod logging;
mod paths;
mod settings;

pub use logging::{init_logging, set_logging_enabled};
pub use paths::{AppPaths, AppPathsError};
pub use settings::{SettingsError, UpdateSettings};
