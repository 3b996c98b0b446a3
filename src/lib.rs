//! repolens - Repository Analysis Engine
//!
//! Turns a local source repository into an importance-ranked, token-budgeted
//! slice of itself, ready to be placed in front of a text-generation step.
//!
//! ## Pipeline
//!
//! - **Discovery**: bounded walk under built-in, `.gitignore` and caller ignore rules
//! - **Heuristic ranking**: role and base score from the path alone
//! - **AST boosting**: tree-sitter extraction of exports and functions, with a
//!   regex fallback
//! - **Context assembly**: README, manifest, file tree and top file contents
//!   within a fixed token budget
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::path::Path;
//! use repolens::{ContextOptions, RankOptions, gather_context};
//!
//! let ctx = gather_context(Path::new("."), &RankOptions::default(), &ContextOptions::default())?;
//! println!("{}", ctx.render());
//! ```
//!
//! ## Modules
//!
//! - [`analyzer`]: discovery, classification, grammar cache, extraction
//! - [`ranker`]: heuristic plus AST-boosted ranking
//! - [`context`]: token-budgeted context assembly
//! - [`config`]: layered configuration

pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod context;
pub mod ranker;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{LensError, Result};

// Data Model
pub use types::{ContextFile, FileCandidate, FileRole, GatheredContext, RankedFile};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use context::{ContextAssembler, ContextOptions, gather_context};
pub use ranker::{RankOptions, Ranker, rank_repository};

// =============================================================================
// Analyzer Re-exports
// =============================================================================

pub use analyzer::{
    parser::{Extractor, GrammarCache, Language, ParsedFile},
    scanner::{FileScanner, IgnoreMatcher},
};
