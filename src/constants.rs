//! Global Constants
//!
//! Centralized constants for discovery, scoring and context budgeting.
//! All magic numbers should be defined here with documentation.

/// File discovery constants
pub mod discovery {
    /// Default maximum number of files collected by one walk
    pub const DEFAULT_MAX_FILES: usize = 1000;

    /// Default maximum file size read for scoring or content (100KB)
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024;
}

/// Heuristic base scores per role
pub mod scoring {
    /// Entry point at the root or one directory deep
    pub const ENTRY_SHALLOW: f64 = 0.9;
    /// Entry point nested deeper
    pub const ENTRY_DEEP: f64 = 0.85;
    pub const CONFIG: f64 = 0.8;
    pub const TYPES: f64 = 0.75;
    pub const TEST: f64 = 0.3;
    pub const UTIL: f64 = 0.5;
    pub const DOC: f64 = 0.4;

    /// Core file outside any recognised source root
    pub const CORE_BASELINE: f64 = 0.55;
    /// Core file directly inside a source root
    pub const CORE_SOURCE_ROOT: f64 = 0.7;
    /// Lowest score for a core file nested inside a source root
    pub const CORE_SOURCE_FLOOR: f64 = 0.6;
    /// Score lost per directory level below the source root
    pub const CORE_DEPTH_STEP: f64 = 0.05;
    /// Core file in an example/sample/demo directory
    pub const CORE_EXAMPLE: f64 = 0.45;

    /// Barrel file that only re-exports other modules
    pub const REEXPORT_SHIM: f64 = 0.05;
}

/// Additive AST boosts applied by the ranker
pub mod boost {
    /// More than `EXPORTS_HIGH` exports
    pub const EXPORTS_HIGH_THRESHOLD: usize = 10;
    pub const EXPORTS_HIGH: f64 = 0.15;
    /// More than `EXPORTS_MEDIUM` exports (up to the high threshold)
    pub const EXPORTS_MEDIUM_THRESHOLD: usize = 5;
    pub const EXPORTS_MEDIUM: f64 = 0.10;
    /// At least one export
    pub const EXPORTS_LOW: f64 = 0.05;

    pub const FUNCTIONS_HIGH_THRESHOLD: usize = 15;
    pub const FUNCTIONS_HIGH: f64 = 0.10;
    pub const FUNCTIONS_MEDIUM_THRESHOLD: usize = 5;
    pub const FUNCTIONS_MEDIUM: f64 = 0.05;
}

/// Context assembly constants
pub mod context {
    /// Characters per estimated token
    pub const CHARS_PER_TOKEN: usize = 4;

    /// Overall token budget for one context bundle
    pub const TOTAL_TOKENS: usize = 4000;
    pub const README_TOKENS: usize = 500;
    pub const MANIFEST_TOKENS: usize = 300;
    pub const TREE_TOKENS: usize = 400;

    /// Number of top-ranked files included by default
    pub const DEFAULT_TOP_FILES: usize = 15;

    /// Hard per-file content cap (characters)
    pub const MAX_CHARS_PER_FILE: usize = 2000;

    /// Appended whenever a source is cut to fit its budget
    pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

    /// Bytes sniffed for binary detection
    pub const BINARY_SNIFF_BYTES: usize = 8000;

    /// Control-character ratio above which content is treated as binary
    pub const BINARY_CONTROL_RATIO: f64 = 0.1;
}
