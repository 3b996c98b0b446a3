//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (`~/.config/repolens/`) and project (`.repolens.toml`) level
//! configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{context, discovery};
use crate::types::{LensError, Result};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// File discovery limits and extra ignore globs
    pub discovery: DiscoveryConfig,

    /// Ranking settings
    pub ranking: RankingConfig,

    /// Context assembly budgets
    pub context: ContextConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            discovery: DiscoveryConfig::default(),
            ranking: RankingConfig::default(),
            context: ContextConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `LensError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.discovery.max_files == 0 {
            return Err(LensError::Config(
                "discovery.max_files must be greater than 0".to_string(),
            ));
        }
        if self.discovery.max_file_size == 0 {
            return Err(LensError::Config(
                "discovery.max_file_size must be greater than 0".to_string(),
            ));
        }

        let ctx = &self.context;
        if ctx.total_tokens == 0 {
            return Err(LensError::Config(
                "context.total_tokens must be greater than 0".to_string(),
            ));
        }
        if ctx.top_files == 0 {
            return Err(LensError::Config(
                "context.top_files must be greater than 0".to_string(),
            ));
        }
        if ctx.max_chars_per_file == 0 {
            return Err(LensError::Config(
                "context.max_chars_per_file must be greater than 0".to_string(),
            ));
        }

        let reserved = ctx
            .readme_tokens
            .checked_add(ctx.manifest_tokens)
            .and_then(|sum| sum.checked_add(ctx.tree_tokens))
            .ok_or_else(|| {
                LensError::Config("context sub-budgets overflow the token counter".to_string())
            })?;
        if reserved > ctx.total_tokens {
            return Err(LensError::Config(format!(
                "context sub-budgets ({} tokens) exceed total_tokens ({})",
                reserved, ctx.total_tokens
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Discovery Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Stop collecting candidates after this many files
    pub max_files: usize,

    /// Files larger than this (bytes) are never read
    pub max_file_size: u64,

    /// Glob patterns appended after the defaults and `.gitignore`
    pub extra_ignore: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_files: discovery::DEFAULT_MAX_FILES,
            max_file_size: discovery::DEFAULT_MAX_FILE_SIZE,
            extra_ignore: Vec::new(),
        }
    }
}

// =============================================================================
// Ranking Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Parse files and boost scores by export/function counts
    pub use_ast: bool,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { use_ast: true }
    }
}

// =============================================================================
// Context Configuration
// =============================================================================

/// Token budgets for context assembly (4 chars per token)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub total_tokens: usize,
    pub readme_tokens: usize,
    pub manifest_tokens: usize,
    pub tree_tokens: usize,

    /// Number of ranked files whose content is included
    pub top_files: usize,

    /// Per-file character cap, applied on top of the rolling share
    pub max_chars_per_file: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            total_tokens: context::TOTAL_TOKENS,
            readme_tokens: context::README_TOKENS,
            manifest_tokens: context::MANIFEST_TOKENS,
            tree_tokens: context::TREE_TOKENS,
            top_files: context::DEFAULT_TOP_FILES,
            max_chars_per_file: context::MAX_CHARS_PER_FILE,
        }
    }
}
