//! Grammar Adapter
//!
//! Owns the tree-sitter grammars for the supported languages.
//!
//! ## Lifecycle
//!
//! A [`GrammarCache`] must be initialized once before use; every other call made
//! earlier fails with [`LensError::NotInitialized`]. Grammars are loaded lazily
//! on first request and memoized, at most one load per language, so a single
//! cache can be shared across threads behind an `Arc`.

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use tree_sitter::{Parser, Tree};

use super::Language;
use crate::types::{LensError, Result};

#[derive(Default)]
pub struct GrammarCache {
    initialized: AtomicBool,
    languages: DashMap<Language, tree_sitter::Language>,
    #[cfg(test)]
    unavailable: dashmap::DashSet<Language>,
}

impl GrammarCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the cache ready. Idempotent.
    pub fn initialize(&self) {
        if !self.initialized.swap(true, Ordering::AcqRel) {
            debug!("Grammar cache initialized");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Number of grammars loaded so far
    pub fn loaded_count(&self) -> usize {
        self.languages.len()
    }

    /// Make every later load of `language` fail with `LanguageLoad`
    #[cfg(test)]
    pub(crate) fn make_unavailable(&self, language: Language) {
        self.languages.remove(&language);
        self.unavailable.insert(language);
    }

    #[cfg(test)]
    fn ensure_available(&self, language: Language) -> Result<()> {
        if self.unavailable.contains(&language) {
            return Err(LensError::language_load(language, "grammar unavailable"));
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn ensure_available(&self, _language: Language) -> Result<()> {
        Ok(())
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(LensError::NotInitialized)
        }
    }

    /// Load (or fetch the memoized) grammar for `language`.
    ///
    /// The grammar is validated against the linked tree-sitter runtime before
    /// it is cached, so an ABI mismatch surfaces here as `LanguageLoad`.
    pub fn load_language(&self, language: Language) -> Result<tree_sitter::Language> {
        self.ensure_initialized()?;
        self.ensure_available(language)?;

        if let Some(cached) = self.languages.get(&language) {
            return Ok(cached.value().clone());
        }

        match self.languages.entry(language) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let grammar = language
                    .grammar()
                    .ok_or_else(|| LensError::UnsupportedExtension(language.to_string()))?;

                Parser::new()
                    .set_language(&grammar)
                    .map_err(|source| LensError::language_load(language, source))?;

                debug!("Loaded {} grammar", language);
                entry.insert(grammar.clone());
                Ok(grammar)
            }
        }
    }

    /// Fresh parser configured for `language`
    pub fn create_parser(&self, language: Language) -> Result<Parser> {
        let grammar = self.load_language(language)?;
        let mut parser = Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|source| LensError::language_load(language, source))?;
        Ok(parser)
    }

    /// Parse `source` into a syntax tree.
    ///
    /// The tree may still contain error nodes; callers decide what to do with
    /// `root_node().has_error()`.
    pub fn parse(&self, source: &str, language: Language) -> Result<Tree> {
        let mut parser = self.create_parser(language)?;
        parser
            .parse(source, None)
            .ok_or_else(|| LensError::parse(format!("<{}>", language), "parser returned no tree"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_requires_initialize() {
        let cache = GrammarCache::new();
        assert!(matches!(
            cache.load_language(Language::Rust),
            Err(LensError::NotInitialized)
        ));
        assert!(matches!(
            cache.create_parser(Language::Go),
            Err(LensError::NotInitialized)
        ));
        assert!(matches!(
            cache.parse("fn main() {}", Language::Rust),
            Err(LensError::NotInitialized)
        ));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let cache = GrammarCache::new();
        cache.initialize();
        cache.initialize();
        assert!(cache.is_initialized());
        assert!(cache.parse("x = 1\n", Language::Python).is_ok());
    }

    #[test]
    fn test_memoizes_grammars() {
        let cache = GrammarCache::new();
        cache.initialize();
        cache.load_language(Language::TypeScript).unwrap();
        cache.load_language(Language::TypeScript).unwrap();
        assert_eq!(cache.loaded_count(), 1);

        cache.load_language(Language::Java).unwrap();
        assert_eq!(cache.loaded_count(), 2);
    }

    #[test]
    fn test_unknown_language_rejected() {
        let cache = GrammarCache::new();
        cache.initialize();
        assert!(matches!(
            cache.load_language(Language::Unknown),
            Err(LensError::UnsupportedExtension(_))
        ));
    }

    #[test]
    fn test_parses_every_supported_language() {
        let cache = GrammarCache::new();
        cache.initialize();
        let samples = [
            (Language::TypeScript, "export const a: number = 1;"),
            (Language::Tsx, "export const A = () => <div />;"),
            (Language::JavaScript, "const a = require('a');"),
            (Language::Jsx, "export default function App() { return <main />; }"),
            (Language::Python, "def f():\n    return 1\n"),
            (Language::Go, "package main\n\nfunc main() {}\n"),
            (Language::Rust, "pub fn f() {}"),
            (Language::Java, "public class A {}"),
        ];
        for (lang, src) in samples {
            let tree = cache.parse(src, lang).unwrap();
            assert!(!tree.root_node().has_error(), "{} sample failed to parse", lang);
        }
    }

    #[test]
    fn test_shared_across_threads() {
        let cache = Arc::new(GrammarCache::new());
        cache.initialize();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.parse("package x\n", Language::Go).is_ok())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
        assert_eq!(cache.loaded_count(), 1);
    }
}
