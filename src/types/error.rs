//! Unified Error Type
//!
//! A single error enum for the analysis engine.
//!
//! ## Scope Policy
//!
//! - **Setup / repository scoped** (`NotInitialized`, `RepoNotFound`, `Config`,
//!   `InvalidPattern`): fatal, returned to the caller immediately
//! - **File scoped** (`Io`, `Parse`, `UnsupportedExtension`): the file is skipped
//!   or degraded, never surfaced as a pipeline failure
//! - **Grammar scoped** (`LanguageLoad`): recoverable by regex extraction

use std::path::PathBuf;
use thiserror::Error;

use crate::analyzer::parser::Language;

#[derive(Debug, Error)]
pub enum LensError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Grammar Errors
    // -------------------------------------------------------------------------
    #[error("Grammar cache used before initialize()")]
    NotInitialized,

    #[error("Failed to load {language} grammar: {source}")]
    LanguageLoad {
        language: Language,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },

    // -------------------------------------------------------------------------
    // Discovery Errors
    // -------------------------------------------------------------------------
    #[error("Unsupported file extension: {0}")]
    UnsupportedExtension(String),

    #[error("Repository not found: {}", .0.display())]
    RepoNotFound(PathBuf),

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LensError>;

impl LensError {
    /// Create a parse error for a file
    pub fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a grammar load error for a language
    pub fn language_load(
        language: Language,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::LanguageLoad {
            language,
            source: source.into(),
        }
    }

    /// Whether this error only affects a single file.
    ///
    /// File-scoped failures degrade that file's contribution; everything else
    /// aborts the call that produced it.
    pub fn is_file_scoped(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Parse { .. } | Self::UnsupportedExtension(_)
        )
    }

    /// Whether the extractor may fall back to pattern-based extraction
    pub fn allows_pattern_fallback(&self) -> bool {
        matches!(self, Self::LanguageLoad { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_not_found_display() {
        let err = LensError::RepoNotFound(PathBuf::from("/tmp/missing"));
        assert_eq!(err.to_string(), "Repository not found: /tmp/missing");
    }

    #[test]
    fn test_scope_classification() {
        assert!(LensError::parse("a.ts", "no tree").is_file_scoped());
        assert!(LensError::UnsupportedExtension("bin".into()).is_file_scoped());
        assert!(!LensError::NotInitialized.is_file_scoped());
        assert!(!LensError::RepoNotFound(PathBuf::from(".")).is_file_scoped());
        assert!(!LensError::Config("bad".into()).is_file_scoped());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: LensError = io.into();
        assert!(matches!(err, LensError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_fallback_only_for_language_load() {
        assert!(!LensError::NotInitialized.allows_pattern_fallback());
        assert!(!LensError::parse("x.py", "boom").allows_pattern_fallback());
        let load = LensError::language_load(Language::Go, "abi mismatch");
        assert!(load.allows_pattern_fallback());
        assert!(!load.is_file_scoped());
        assert_eq!(load.to_string(), "Failed to load Go grammar: abi mismatch");
    }
}
