//! Command implementations.

mod dispatch;
mod info;
mod validate;

pub use dispatch::run_dispatch;
pub use info::run_info;
pub use validate::run_validate;

use std::path::Path;

use contracts::WorkerConfig;

use crate::error::{CliError, Result};

/// Load and validate a worker configuration file
pub(crate) fn load_config(path: &Path) -> Result<WorkerConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path));
    }
    Ok(config_loader::ConfigLoader::load_from_path(path)?)
}
