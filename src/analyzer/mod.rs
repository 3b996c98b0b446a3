//! Code Analyzer Module
//!
//! Provides the per-file analysis stages:
//! - File discovery with ignore rules
//! - Heuristic role classification and scoring
//! - Multi-language parsing (AST extraction with regex fallback)

pub mod classifier;
pub mod parser;
pub mod scanner;

pub use classifier::{Assessment, assess, classify, is_reexport_shim, score};
