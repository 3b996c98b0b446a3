use serde::{Deserialize, Serialize};

use super::FileRole;

/// One ranked file's content as it appears in the assembled context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextFile {
    pub path: String,
    pub importance: f64,
    pub role: FileRole,
    pub content: String,
}

/// Final artifact handed to the generation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatheredContext {
    pub repo_path: String,
    pub repo_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_config: Option<String>,
    /// File name the package config was read from (e.g. `Cargo.toml`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_config_name: Option<String>,
    pub file_tree: String,
    pub top_files: Vec<ContextFile>,
    /// Tokens actually emitted (4 chars per token), not the theoretical budget
    pub estimated_tokens: u32,
}
