//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/repolens/config.toml)
//! 3. Project config (<repo>/.repolens.toml)
//! 4. Environment variables (REPOLENS_* prefix, `__` between sections)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use crate::types::{LensError, Result};

const ENV_PREFIX: &str = "REPOLENS_";
const PROJECT_FILE: &str = ".repolens.toml";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load(project_root: &Path) -> Result<Config> {
        let config: Config = Self::figment(project_root)
            .extract()
            .map_err(|e| LensError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| LensError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn figment(project_root: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path(project_root);
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        // REPOLENS_CONTEXT__TOP_FILES -> context.top_files
        figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true))
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/repolens/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("repolens"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path(project_root: &Path) -> PathBuf {
        project_root.join(PROJECT_FILE)
    }

    // =========================================================================
    // Display
    // =========================================================================

    /// Effective configuration as TOML, or pretty JSON
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| LensError::Config(e.to_string()))
        }
    }

    /// Configuration file locations with an existence marker
    pub fn describe_paths(project_root: &Path) -> String {
        let marker = |path: &Path| if path.exists() { "✓" } else { "✗" };
        let mut out = String::from("Configuration paths:\n\n");

        match Self::global_config_path() {
            Some(global) => out.push_str(&format!(
                "  Global:  {} {}\n",
                marker(&global),
                global.display()
            )),
            None => out.push_str("  Global:  (not available)\n"),
        }

        let project = Self::project_config_path(project_root);
        out.push_str(&format!(
            "  Project: {} {}\n",
            marker(&project),
            project.display()
        ));
        out
    }
}
