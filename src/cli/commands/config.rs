//! Config Command
//!
//! Inspect repolens configuration.
//!
//! Usage:
//!   repolens config show [--path DIR] [--format toml|json]
//!   repolens config path [--path DIR]

use std::path::Path;

use super::load_config;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show merged effective configuration
pub fn show(project_root: &Path, format: &str) -> Result<()> {
    let config = load_config(project_root)?;
    println!("{}", ConfigLoader::render(&config, format == "json")?);
    Ok(())
}

/// Show configuration paths
pub fn path(project_root: &Path) -> Result<()> {
    print!("{}", ConfigLoader::describe_paths(project_root));
    Ok(())
}
