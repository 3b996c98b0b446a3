//! Heuristic Classifier & Scorer
//!
//! Assigns every discovered file a [`FileRole`] and a base importance score
//! from its path alone. Cheap enough to run on every candidate before any
//! parsing happens.
//!
//! ## Cascade
//!
//! First match wins: Entry, Config, Types, Test, Util, Doc, Core.
//!
//! ## Re-export Shims
//!
//! JS/TS barrel files made only of `export ... from` statements carry no logic
//! of their own and are pinned to a near-zero score regardless of role.

use crate::analyzer::parser::{Language, is_test_path};
use crate::constants::scoring;
use crate::types::FileRole;

const ENTRY_STEMS: &[&str] = &["index", "main", "cli", "app", "server"];
const ENTRY_FILES: &[&str] = &["lib.rs", "mod.rs", "__main__.py", "Main.java", "App.java"];
const TYPE_STEMS: &[&str] = &["types", "interfaces"];
const UTIL_STEMS: &[&str] = &["util", "utils", "helper", "helpers"];
const SOURCE_ROOTS: &[&str] = &["src", "lib"];
const EXAMPLE_DIRS: &[&str] = &["example", "examples", "sample", "samples", "demo", "demos"];

/// Role, base score and shim status of one file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub role: FileRole,
    pub score: f64,
    pub is_shim: bool,
}

// =============================================================================
// Path helpers
// =============================================================================

struct PathParts<'a> {
    dirs: Vec<&'a str>,
    file_name: &'a str,
    stem: &'a str,
}

impl<'a> PathParts<'a> {
    fn new(path: &'a str) -> Self {
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let file_name = segments.pop().unwrap_or_default();
        let stem = file_name.split('.').next().unwrap_or_default();
        Self {
            dirs: segments,
            file_name,
            stem,
        }
    }

    fn depth(&self) -> usize {
        self.dirs.len()
    }

    fn has_dir(&self, names: &[&str]) -> bool {
        self.dirs
            .iter()
            .any(|d| names.iter().any(|n| d.eq_ignore_ascii_case(n)))
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

// =============================================================================
// Classification
// =============================================================================

/// Role of a file, derived from its path alone
pub fn classify(path: &str) -> FileRole {
    let path = normalize(path);
    let parts = PathParts::new(&path);
    let lower = path.to_lowercase();

    if is_entry(&parts) {
        FileRole::Entry
    } else if lower.contains("config") {
        FileRole::Config
    } else if is_types(&parts) {
        FileRole::Types
    } else if is_test_path(&path) {
        FileRole::Test
    } else if is_util(&parts) {
        FileRole::Util
    } else if is_doc(&parts) {
        FileRole::Doc
    } else {
        FileRole::Core
    }
}

fn is_entry(parts: &PathParts) -> bool {
    if ENTRY_FILES.contains(&parts.file_name) {
        return true;
    }
    // Exactly `<stem>.<ext>`: `index.test.ts` and `index.d.ts` are not entries
    let Some((stem, _)) = parts.file_name.rsplit_once('.') else {
        return false;
    };
    !stem.contains('.')
        && ENTRY_STEMS.contains(&stem)
        && Language::from_path(parts.file_name).is_supported()
}

fn is_types(parts: &PathParts) -> bool {
    parts.file_name.ends_with(".d.ts")
        || TYPE_STEMS.contains(&parts.stem.to_lowercase().as_str())
        || parts.has_dir(TYPE_STEMS)
}

fn is_util(parts: &PathParts) -> bool {
    UTIL_STEMS.contains(&parts.stem.to_lowercase().as_str()) || parts.has_dir(UTIL_STEMS)
}

fn is_doc(parts: &PathParts) -> bool {
    let name = parts.file_name.to_lowercase();
    name.ends_with(".md") || name.ends_with(".markdown") || parts.has_dir(&["docs"])
}

// =============================================================================
// Scoring
// =============================================================================

/// Base importance of a file from its role and location
pub fn score(path: &str) -> f64 {
    score_role(path, classify(path))
}

fn score_role(path: &str, role: FileRole) -> f64 {
    let path = normalize(path);
    let parts = PathParts::new(&path);
    match role {
        FileRole::Entry if parts.depth() <= 1 => scoring::ENTRY_SHALLOW,
        FileRole::Entry => scoring::ENTRY_DEEP,
        FileRole::Config => scoring::CONFIG,
        FileRole::Types => scoring::TYPES,
        FileRole::Test => scoring::TEST,
        FileRole::Util => scoring::UTIL,
        FileRole::Doc => scoring::DOC,
        FileRole::Core => core_score(&parts),
    }
}

fn core_score(parts: &PathParts) -> f64 {
    if parts.has_dir(EXAMPLE_DIRS) {
        return scoring::CORE_EXAMPLE;
    }
    match source_root_depth(&parts.dirs) {
        Some(nesting) => (scoring::CORE_SOURCE_ROOT - scoring::CORE_DEPTH_STEP * nesting as f64)
            .max(scoring::CORE_SOURCE_FLOOR),
        None => scoring::CORE_BASELINE,
    }
}

/// Directory levels below the source root (`src/`, `lib/`, `packages/*/src/`)
fn source_root_depth(dirs: &[&str]) -> Option<usize> {
    let root = match dirs {
        ["packages", _, src, ..] if SOURCE_ROOTS.contains(src) => 3,
        [first, ..] if SOURCE_ROOTS.contains(first) => 1,
        _ => return None,
    };
    Some(dirs.len() - root)
}

// =============================================================================
// Re-export shim detection
// =============================================================================

/// True when every statement is an `export ... from "..."` re-export.
///
/// Accepts `export * from`, `export * as ns from`, and `export [type] { ... }
/// from` with brace lists spanning lines. Comments and blank lines are ignored.
/// An empty file is not a shim.
pub fn is_reexport_shim(content: &str) -> bool {
    let code = strip_comments(content);
    let mut rest = code.trim_start();
    if rest.is_empty() {
        return false;
    }
    while !rest.is_empty() {
        match consume_reexport(rest) {
            Some(remaining) => rest = remaining.trim_start(),
            None => return false,
        }
    }
    true
}

/// Consume one re-export statement, returning what follows it
fn consume_reexport(input: &str) -> Option<&str> {
    let rest = keyword(input, "export")?;
    let rest = if let Some(rest) = rest.strip_prefix('*') {
        let rest = rest.trim_start();
        match keyword(rest, "as") {
            Some(after_as) => identifier(after_as)?,
            None => rest,
        }
    } else {
        let rest = keyword(rest, "type").unwrap_or(rest);
        let rest = rest.strip_prefix('{')?;
        let close = rest.find('}')?;
        rest[close + 1..].trim_start()
    };
    let rest = keyword(rest, "from")?;
    let rest = string_literal(rest)?;
    let rest = rest.trim_start();
    Some(rest.strip_prefix(';').unwrap_or(rest))
}

/// Match a whole word and skip the whitespace after it
fn keyword<'a>(input: &'a str, word: &str) -> Option<&'a str> {
    let rest = input.strip_prefix(word)?;
    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' || c == '$' => None,
        _ => Some(rest.trim_start()),
    }
}

fn identifier(input: &str) -> Option<&str> {
    let end = input
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(input.len());
    (end > 0).then(|| input[end..].trim_start())
}

fn string_literal(input: &str) -> Option<&str> {
    let quote = input.chars().next().filter(|c| matches!(c, '"' | '\''))?;
    let body = &input[1..];
    let close = body.find(quote)?;
    Some(&body[close + 1..])
}

/// Drop `//` line comments and `/* */` block comments
fn strip_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    loop {
        let line = rest.find("//");
        let block = rest.find("/*");
        let (at, is_block) = match (line, block) {
            (Some(l), Some(b)) if b < l => (b, true),
            (Some(l), _) => (l, false),
            (None, Some(b)) => (b, true),
            (None, None) => {
                out.push_str(rest);
                return out;
            }
        };
        out.push_str(&rest[..at]);
        out.push(' ');
        rest = if is_block {
            match rest[at + 2..].find("*/") {
                Some(end) => &rest[at + 2 + end + 2..],
                None => return out,
            }
        } else {
            match rest[at..].find('\n') {
                Some(end) => &rest[at + end..],
                None => return out,
            }
        };
    }
}

// =============================================================================
// Combined assessment
// =============================================================================

/// Classify, score and shim-check one file.
///
/// `content` is only consulted for JS/TS files; pass `None` when unread.
pub fn assess(path: &str, content: Option<&str>) -> Assessment {
    let role = classify(path);
    let is_shim = Language::from_path(path).is_js_family() && content.is_some_and(is_reexport_shim);
    let score = if is_shim {
        scoring::REEXPORT_SHIM
    } else {
        score_role(path, role)
    };
    Assessment {
        role,
        score,
        is_shim,
    }
}
