//! Test detection: content markers per language, or a test-like path.

use std::path::Path;

use regex::Regex;

use super::Language;
use crate::types::{LensError, Result};

/// Whether a path names a test file or sits in a test directory
pub fn is_test_path(path: &str) -> bool {
    let path = path.replace('\\', "/").to_lowercase();
    let file_name = path.rsplit('/').next().unwrap_or_default();

    if file_name.contains(".test.") || file_name.contains(".spec.") {
        return true;
    }
    if file_name.ends_with("_test.go") {
        return true;
    }
    if let Some(stem) = file_name.strip_suffix(".py")
        && (stem.starts_with("test_") || stem.ends_with("_test"))
    {
        return true;
    }

    let dirs: Vec<&str> = path.split('/').collect();
    dirs[..dirs.len().saturating_sub(1)]
        .iter()
        .any(|d| matches!(*d, "__tests__" | "test" | "tests"))
}

pub struct TestSignals {
    js: Regex,
    python: Regex,
    go: Regex,
    rust: Regex,
    java: Regex,
}

impl TestSignals {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|source| LensError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
        };
        Ok(Self {
            js: compile(r"(?m)^\s*(?:describe|it|test)(?:\.(?:only|skip|each))?\s*\(")?,
            python: compile(
                r"(?m)^\s*(?:async\s+)?def\s+test_\w*\s*\(|^\s*(?:import|from)\s+(?:unittest|pytest)\b",
            )?,
            go: compile(r"func\s+Test\w*\s*\(\s*\w+\s+\*testing\.T\s*\)")?,
            rust: compile(r"#\[(?:[\w:]+::)?test\]|#\[cfg\(test\)\]")?,
            java: compile(r"@(?:org\.junit\.(?:jupiter\.api\.)?)?Test\b")?,
        })
    }

    pub fn content_has_tests(&self, language: Language, content: &str) -> bool {
        let re = match language {
            Language::TypeScript | Language::Tsx | Language::JavaScript | Language::Jsx => &self.js,
            Language::Python => &self.python,
            Language::Go => &self.go,
            Language::Rust => &self.rust,
            Language::Java => &self.java,
            Language::Unknown => return false,
        };
        re.is_match(content)
    }

    /// Content markers OR a test-like path
    pub fn has_tests(&self, path: &str, content: &str) -> bool {
        let language = Language::from_path(Path::new(path));
        is_test_path(path) || self.content_has_tests(language, content)
    }
}
