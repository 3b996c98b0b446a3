pub mod matcher;
pub mod walker;

pub use matcher::{DEFAULT_IGNORE_PATTERNS, IgnoreMatcher, IgnoreRule, glob_to_regex, matches};
pub use walker::{FileScanner, discover, discover_paths, relative_path};
