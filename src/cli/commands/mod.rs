pub mod config;
pub mod context;
pub mod rank;

use std::path::Path;

use crate::config::{Config, ConfigLoader};
use crate::types::{LensError, Result};

/// Effective configuration for a repository, or `RepoNotFound`
pub(crate) fn load_config(repo: &Path) -> Result<Config> {
    if !repo.is_dir() {
        return Err(LensError::RepoNotFound(repo.to_path_buf()));
    }
    ConfigLoader::load(repo)
}
