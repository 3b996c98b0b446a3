//! Symbol / Import / Export Extractor
//!
//! Composes the two extraction strategies:
//!
//! 1. **Structured**: tree-sitter parse plus per-language walkers. A tree with
//!    syntax errors yields nothing rather than a partial result.
//! 2. **Pattern**: regex fallback. Fills in imports when the structured pass
//!    found none, and replaces the structured pass entirely when the grammar
//!    cannot be loaded.

use std::sync::Arc;

use tracing::{debug, warn};

use super::grammar::GrammarCache;
use super::patterns::PatternExtractor;
use super::test_signals::TestSignals;
use super::traits::ParsedFile;
use super::{Language, go, java, python, rust_lang, typescript};
use crate::types::{LensError, Result};

pub struct Extractor {
    grammars: Arc<GrammarCache>,
    patterns: PatternExtractor,
    signals: TestSignals,
}

impl Extractor {
    pub fn new(grammars: Arc<GrammarCache>) -> Result<Self> {
        Ok(Self {
            grammars,
            patterns: PatternExtractor::new()?,
            signals: TestSignals::new()?,
        })
    }

    /// Extractor over a fresh, initialized grammar cache
    pub fn initialized() -> Result<Self> {
        let grammars = Arc::new(GrammarCache::new());
        grammars.initialize();
        Self::new(grammars)
    }

    pub fn grammars(&self) -> &Arc<GrammarCache> {
        &self.grammars
    }

    /// Extract symbols, imports and exports from one file.
    ///
    /// `Ok(None)` covers unsupported extensions, syntax errors and parses that
    /// produce no tree. `Err` is only returned for setup failures such as an
    /// uninitialized grammar cache.
    pub fn extract(&self, path: &str, content: &str) -> Result<Option<ParsedFile>> {
        let language = Language::from_path(path);
        if !language.is_supported() {
            debug!("Skipping extraction for {}: unsupported extension", path);
            return Ok(None);
        }

        let mut parsed = match self.extract_structured(path, content, language) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return Ok(None),
            Err(e) if e.allows_pattern_fallback() => {
                warn!("{}; using pattern extraction for {}", e, path);
                self.patterns.extract(path, language, content)
            }
            Err(LensError::Parse { message, .. }) => {
                debug!("No syntax tree for {}: {}", path, message);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if parsed.imports.is_empty() {
            parsed.imports = self.patterns.imports(language, content);
        }
        parsed.has_tests = self.signals.has_tests(path, content);

        debug!(
            "Extracted {}: {} functions, {} classes, {} imports, {} exports",
            path,
            parsed.functions.len(),
            parsed.classes.len(),
            parsed.imports.len(),
            parsed.exports.len()
        );
        Ok(Some(parsed))
    }

    /// Tree-sitter strategy alone, without any pattern fallback
    pub fn extract_structured(
        &self,
        path: &str,
        content: &str,
        language: Language,
    ) -> Result<Option<ParsedFile>> {
        let grammar = self.grammars.load_language(language)?;
        let tree = self.grammars.parse(content, language)?;
        let root = tree.root_node();
        if root.has_error() {
            debug!("Syntax errors in {}, skipping extraction", path);
            return Ok(None);
        }

        let mut parsed = ParsedFile::new(path, language);
        match language {
            Language::TypeScript | Language::Tsx | Language::JavaScript | Language::Jsx => {
                typescript::extract(&grammar, root, content, &mut parsed)
            }
            Language::Python => python::extract(&grammar, root, content, &mut parsed),
            Language::Go => go::extract(&grammar, root, content, &mut parsed),
            Language::Rust => rust_lang::extract(root, content, &mut parsed),
            Language::Java => java::extract(root, content, &mut parsed),
            Language::Unknown => return Ok(None),
        }
        parsed.dedupe();
        Ok(Some(parsed))
    }

    /// Pattern strategy alone
    pub fn extract_with_patterns(&self, path: &str, content: &str) -> Option<ParsedFile> {
        let language = Language::from_path(path);
        if !language.is_supported() {
            return None;
        }
        let mut parsed = self.patterns.extract(path, language, content);
        parsed.has_tests = self.signals.has_tests(path, content);
        Some(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> Extractor {
        Extractor::initialized().unwrap()
    }

    #[test]
    fn test_requires_initialized_cache() {
        let extractor = Extractor::new(Arc::new(GrammarCache::new())).unwrap();
        assert!(matches!(
            extractor.extract("a.ts", "export const a = 1;"),
            Err(LensError::NotInitialized)
        ));
    }

    #[test]
    fn test_grammar_load_failure_uses_patterns() {
        let e = extractor();
        e.grammars().make_unavailable(Language::Python);
        assert!(matches!(
            e.grammars().load_language(Language::Python),
            Err(LensError::LanguageLoad { .. })
        ));

        let parsed = e
            .extract("repo.py", include_str!("../../../tests/fixtures/sample.py"))
            .unwrap()
            .unwrap();
        assert!(parsed.imports.contains(&"requests".to_string()));
        assert!(parsed.functions.iter().any(|f| f.name == "load_config"));
        assert!(parsed.classes.iter().any(|c| c.name == "Repository"));

        // Other languages still parse structurally
        assert!(e.extract("a.go", "package a

func A() {}
").unwrap().is_some());
    }

    #[test]
    fn test_unsupported_extension_is_none() {
        assert!(extractor().extract("README.md", "# hi").unwrap().is_none());
        assert!(extractor().extract("Makefile", "all:").unwrap().is_none());
    }

    #[test]
    fn test_syntax_error_is_none() {
        let result = extractor()
            .extract("broken.ts", "export function (((( {")
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_typescript_fixture() {
        let parsed = extractor()
            .extract("src/client.ts", include_str!("../../../tests/fixtures/sample.ts"))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.language, Language::TypeScript);
        assert_eq!(parsed.exports.len(), 12);
        assert!(!parsed.has_tests);
    }

    #[test]
    fn test_pattern_imports_fill_empty_structured_result() {
        // Structured pass sees no import statements here; the pattern pass
        // finds nothing either, so the list stays empty rather than erroring.
        let parsed = extractor()
            .extract("src/a.py", "x = 1\n")
            .unwrap()
            .unwrap();
        assert!(parsed.imports.is_empty());
        assert_eq!(parsed.exports, Vec::<String>::new());
    }

    #[test]
    fn test_has_tests_from_content_and_path() {
        let e = extractor();
        let rust = e
            .extract("src/lib.rs", "pub fn a() {}\n\n#[cfg(test)]\nmod tests {}\n")
            .unwrap()
            .unwrap();
        assert!(rust.has_tests);

        let go = e
            .extract("pkg/store_test.go", "package pkg\n")
            .unwrap()
            .unwrap();
        assert!(go.has_tests);
    }

    #[test]
    fn test_pattern_strategy_alone() {
        let parsed = extractor()
            .extract_with_patterns("main.go", "package main\n\nimport \"fmt\"\n\nfunc Run() {}\n")
            .unwrap();
        assert_eq!(parsed.imports, vec!["fmt"]);
        assert_eq!(parsed.exports, vec!["Run"]);
        assert!(extractor().extract_with_patterns("notes.txt", "").is_none());
    }

    #[test]
    fn test_every_fixture_extracts() {
        let e = extractor();
        let fixtures = [
            ("sample.ts", include_str!("../../../tests/fixtures/sample.ts")),
            ("sample.py", include_str!("../../../tests/fixtures/sample.py")),
            ("sample.go", include_str!("../../../tests/fixtures/sample.go")),
            ("sample.rs", include_str!("../../../tests/fixtures/sample.rs")),
            ("Sample.java", include_str!("../../../tests/fixtures/Sample.java")),
        ];
        for (name, source) in fixtures {
            let parsed = e.extract(name, source).unwrap();
            let parsed = parsed.unwrap_or_else(|| panic!("{} produced no result", name));
            assert!(!parsed.functions.is_empty(), "{} has no functions", name);
            assert!(!parsed.imports.is_empty(), "{} has no imports", name);
        }
    }
}
