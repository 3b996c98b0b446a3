//! Language Parser Module
//!
//! Tree-sitter based symbol, import and export extraction for the supported
//! language set, with a regex fallback.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use repolens::analyzer::parser::{Extractor, GrammarCache};
//!
//! let grammars = Arc::new(GrammarCache::new());
//! grammars.initialize();
//! let extractor = Extractor::new(grammars)?;
//! if let Some(parsed) = extractor.extract("src/index.ts", content)? {
//!     println!("{} exports", parsed.exports.len());
//! }
//! ```

pub mod extractor;
pub mod go;
pub mod grammar;
pub mod java;
pub mod language;
pub mod patterns;
pub mod python;
pub mod rust_lang;
pub mod test_signals;
pub mod traits;
pub mod typescript;

pub use extractor::Extractor;
pub use grammar::GrammarCache;
pub use language::{Language, fence_tag};
pub use patterns::PatternExtractor;
pub use test_signals::{TestSignals, is_test_path};
pub use traits::{ExtractedSymbol, ParsedFile, SymbolKind};
