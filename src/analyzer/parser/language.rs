//! Language Detection Module
//!
//! **Single source of truth** for language detection. Discovery, extraction and
//! context rendering all go through [`Language`]; no other module inspects
//! extensions directly.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use repolens::analyzer::parser::language::{Language, fence_tag};
//!
//! let lang = Language::from_path("src/main.rs");
//! assert_eq!(lang, Language::Rust);
//! assert!(lang.is_supported());
//!
//! assert_eq!(fence_tag("package.json"), "json");
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Language Metadata Table - Single Source of Truth
// =============================================================================

/// Language metadata entry
struct LanguageMeta {
    /// Display name (human-readable)
    display_name: &'static str,
    /// Syntax highlighting identifier (lowercase, for markdown code blocks)
    highlight_str: &'static str,
    /// File extensions that map to this language
    extensions: &'static [&'static str],
    /// Alternative names for parsing from string
    aliases: &'static [&'static str],
}

macro_rules! lang_meta {
    ($display:literal, $highlight:literal, [$($ext:literal),*], [$($alias:literal),*]) => {
        LanguageMeta {
            display_name: $display,
            highlight_str: $highlight,
            extensions: &[$($ext),*],
            aliases: &[$($alias),*],
        }
    };
}

impl Language {
    fn meta(&self) -> LanguageMeta {
        match self {
            Language::TypeScript => lang_meta!("TypeScript", "typescript", ["ts", "mts", "cts"], ["typescript", "ts"]),
            Language::Tsx => lang_meta!("TSX", "tsx", ["tsx"], ["tsx"]),
            Language::JavaScript => lang_meta!("JavaScript", "javascript", ["js", "mjs", "cjs"], ["javascript", "js"]),
            Language::Jsx => lang_meta!("JSX", "jsx", ["jsx"], ["jsx"]),
            Language::Python => lang_meta!("Python", "python", ["py", "pyi"], ["python", "py"]),
            Language::Go => lang_meta!("Go", "go", ["go"], ["go", "golang"]),
            Language::Rust => lang_meta!("Rust", "rust", ["rs"], ["rust", "rs"]),
            Language::Java => lang_meta!("Java", "java", ["java"], ["java"]),
            Language::Unknown => lang_meta!("Unknown", "text", [], ["unknown", "text", ""]),
        }
    }
}

// =============================================================================
// Language Enum Definition
// =============================================================================

/// The closed set of languages the engine can extract symbols from.
///
/// Anything else is `Unknown` and never leaves discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Language {
    TypeScript,
    Tsx,
    JavaScript,
    Jsx,
    Python,
    Go,
    Rust,
    Java,
    #[default]
    Unknown,
}

// =============================================================================
// Language Methods
// =============================================================================

impl Language {
    /// Every supported language, in table order
    pub const ALL: [Language; 8] = [
        Language::TypeScript,
        Language::Tsx,
        Language::JavaScript,
        Language::Jsx,
        Language::Python,
        Language::Go,
        Language::Rust,
        Language::Java,
    ];

    pub fn as_str(&self) -> &'static str {
        self.meta().display_name
    }

    pub fn highlight_str(&self) -> &'static str {
        self.meta().highlight_str
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        self.meta().extensions
    }

    /// Detect language from file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Self {
        let ext_lower = ext.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.meta().extensions.contains(&ext_lower.as_str()))
            .unwrap_or(Language::Unknown)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Language::Unknown)
    }

    /// TypeScript, TSX, JavaScript or JSX
    pub fn is_js_family(&self) -> bool {
        matches!(
            self,
            Language::TypeScript | Language::Tsx | Language::JavaScript | Language::Jsx
        )
    }

    /// Tree-sitter grammar for this language.
    ///
    /// Plain `.js` files routinely carry JSX, so JavaScript shares the TSX
    /// grammar with JSX.
    pub fn grammar(&self) -> Option<tree_sitter::Language> {
        match self {
            Language::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
            Language::Tsx | Language::JavaScript | Language::Jsx => {
                Some(tree_sitter_typescript::LANGUAGE_TSX.into())
            }
            Language::Python => Some(tree_sitter_python::LANGUAGE.into()),
            Language::Go => Some(tree_sitter_go::LANGUAGE.into()),
            Language::Rust => Some(tree_sitter_rust::LANGUAGE.into()),
            Language::Java => Some(tree_sitter_java::LANGUAGE.into()),
            Language::Unknown => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Language {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s_lower = s.to_lowercase();

        for lang in Self::ALL {
            if lang.meta().aliases.contains(&s_lower.as_str()) {
                return Ok(lang);
            }
        }

        if s_lower.is_empty() || s_lower == "unknown" || s_lower == "text" {
            return Ok(Language::Unknown);
        }

        Err(())
    }
}

// =============================================================================
// Fence Tags (for rendered context)
// =============================================================================

/// Highlight tag for a fenced block holding `path`'s content.
///
/// Covers the supported languages plus the manifest and documentation formats
/// the context assembler embeds. Falls back to `"text"`.
pub fn fence_tag<P: AsRef<Path>>(path: P) -> &'static str {
    let path = path.as_ref();
    let lang = Language::from_path(path);
    if lang.is_supported() {
        return lang.highlight_str();
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_lowercase();
    if file_name == "go.mod" {
        return "go";
    }
    if file_name == "requirements.txt" {
        return "text";
    }

    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("json") => "json",
        Some("toml") => "toml",
        Some("md" | "markdown") => "markdown",
        Some("rst") => "rst",
        Some("xml") => "xml",
        Some("yaml" | "yml") => "yaml",
        Some("gradle") => "groovy",
        Some("kts") => "kotlin",
        _ => "text",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Language::from_extension("rs"), Language::Rust);
        assert_eq!(Language::from_extension("RS"), Language::Rust);
        assert_eq!(Language::from_extension("py"), Language::Python);
        assert_eq!(Language::from_extension("pyi"), Language::Python);
        assert_eq!(Language::from_extension("mts"), Language::TypeScript);
        assert_eq!(Language::from_extension("cjs"), Language::JavaScript);
        assert_eq!(Language::from_extension("tsx"), Language::Tsx);
        assert_eq!(Language::from_extension("jsx"), Language::Jsx);
        assert_eq!(Language::from_extension("kt"), Language::Unknown);
        assert_eq!(Language::from_extension("md"), Language::Unknown);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Language::from_path("src/main.rs"), Language::Rust);
        assert_eq!(Language::from_path("cmd/server/main.go"), Language::Go);
        assert_eq!(Language::from_path("Main.java"), Language::Java);
        assert_eq!(Language::from_path("no_extension"), Language::Unknown);
        assert_eq!(Language::from_path("Makefile"), Language::Unknown);
    }

    #[test]
    fn test_supported_set_is_closed() {
        for lang in Language::ALL {
            assert!(lang.is_supported());
            assert!(lang.grammar().is_some(), "no grammar for {:?}", lang);
            assert!(!lang.extensions().is_empty());
        }
        assert!(!Language::Unknown.is_supported());
        assert!(Language::Unknown.grammar().is_none());
    }

    #[test]
    fn test_js_family() {
        assert!(Language::TypeScript.is_js_family());
        assert!(Language::Jsx.is_js_family());
        assert!(!Language::Python.is_js_family());
        assert!(!Language::Rust.is_js_family());
    }

    #[test]
    fn test_display_and_from_str() {
        assert_eq!(Language::Tsx.to_string(), "TSX");
        assert_eq!(Language::Go.to_string(), "Go");
        assert_eq!("golang".parse::<Language>(), Ok(Language::Go));
        assert_eq!("TypeScript".parse::<Language>(), Ok(Language::TypeScript));
        assert_eq!("cobol".parse::<Language>(), Err(()));
    }

    #[test]
    fn test_fence_tag() {
        assert_eq!(fence_tag("src/lib.rs"), "rust");
        assert_eq!(fence_tag("package.json"), "json");
        assert_eq!(fence_tag("Cargo.toml"), "toml");
        assert_eq!(fence_tag("go.mod"), "go");
        assert_eq!(fence_tag("build.gradle.kts"), "kotlin");
        assert_eq!(fence_tag("README"), "text");
        assert_eq!(fence_tag("requirements.txt"), "text");
    }
}
