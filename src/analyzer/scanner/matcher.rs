//! Ignore Matcher
//!
//! Gitignore-style path exclusion built on `regex`.
//!
//! Each glob is translated to a regular expression:
//! - `**` crosses directory boundaries, `*` stays within one segment, `?` is
//!   a single non-separator character, everything else is literal
//! - a leading `/` anchors the pattern to the repository root; otherwise it
//!   matches at any depth, bounded by `/` or the ends of the path
//!
//! Rules are evaluated as: ignored if any positive rule matches and no
//! negation rule matches. Negations are a final override pass rather than
//! line-order precedence.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use regex::{Regex, RegexSet};
use tracing::{debug, warn};

use crate::types::{LensError, Result};

/// Built-in exclusions that are always applied, ahead of `.gitignore`.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    // Version control
    ".git",
    ".svn",
    ".hg",
    // Dependencies
    "node_modules",
    "bower_components",
    "vendor",
    ".venv",
    "venv",
    "__pycache__",
    // Build outputs
    "dist",
    "build",
    "out",
    "target",
    ".next",
    ".nuxt",
    ".turbo",
    ".cache",
    "*.min.js",
    "*.min.css",
    "*.map",
    // Lockfiles
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "Cargo.lock",
    "poetry.lock",
    "Pipfile.lock",
    "go.sum",
    "composer.lock",
    "Gemfile.lock",
    // Coverage and logs
    "coverage",
    ".nyc_output",
    "*.lcov",
    "*.log",
    // Binary and media
    "*.png",
    "*.jpg",
    "*.jpeg",
    "*.gif",
    "*.ico",
    "*.svg",
    "*.webp",
    "*.bmp",
    "*.mp3",
    "*.mp4",
    "*.wav",
    "*.mov",
    "*.pdf",
    "*.zip",
    "*.tar",
    "*.gz",
    "*.tgz",
    "*.7z",
    "*.woff",
    "*.woff2",
    "*.ttf",
    "*.eot",
    "*.exe",
    "*.dll",
    "*.so",
    "*.dylib",
    "*.o",
    "*.a",
    "*.class",
    "*.jar",
    "*.pyc",
    "*.wasm",
    ".DS_Store",
    // Secrets
    ".env",
    ".env.*",
    "*.pem",
    "*.key",
    "*.p12",
    "*.pfx",
];

/// A single ignore pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRule {
    pub pattern: String,
    pub is_negation: bool,
}

impl IgnoreRule {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            is_negation: false,
        }
    }

    pub fn negation(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            is_negation: true,
        }
    }

    /// Parse one `.gitignore` line.
    ///
    /// Returns no rules for blanks and comments. A trailing-slash directory
    /// pattern expands to both the bare name and a `/**` form.
    pub fn parse_gitignore_line(line: &str) -> Vec<IgnoreRule> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Vec::new();
        }

        let (is_negation, body) = match line.strip_prefix('!') {
            Some(rest) => (true, rest.trim()),
            None => (false, line),
        };
        if body.is_empty() {
            return Vec::new();
        }

        let make = |pattern: String| IgnoreRule {
            pattern,
            is_negation,
        };

        match body.strip_suffix('/') {
            Some(dir) if !dir.is_empty() => {
                vec![make(dir.to_string()), make(format!("{}/**", dir))]
            }
            _ => vec![make(body.to_string())],
        }
    }
}

/// Translate a glob into an unanchored-or-rooted regex source string.
pub fn glob_to_regex(pattern: &str) -> String {
    let (anchored, body) = match pattern.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, pattern),
    };
    let body = body.trim_end_matches('/');

    let mut regex = String::with_capacity(body.len() * 2 + 16);
    regex.push_str(if anchored { "^" } else { "(?:^|/)" });

    let chars: Vec<char> = body.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    // `**/` also matches zero directories
                    regex.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    regex.push_str(".*");
                    i += 2;
                }
                continue;
            }
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push_str("[^/]"),
            c => {
                let mut buf = [0u8; 4];
                regex.push_str(&regex::escape(c.encode_utf8(&mut buf)));
            }
        }
        i += 1;
    }

    regex.push_str("(?:/|$)");
    regex
}

/// Check a single path against a single glob.
///
/// Compiles the pattern on every call; use [`IgnoreMatcher`] for repeated checks.
pub fn matches(relative_path: &str, pattern: &str) -> bool {
    let normalized = normalize(relative_path);
    Regex::new(&glob_to_regex(pattern))
        .map(|re| re.is_match(&normalized))
        .unwrap_or(false)
}

/// Compiled, ordered set of ignore rules.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    rules: Vec<IgnoreRule>,
    positive: RegexSet,
    negative: RegexSet,
}

impl IgnoreMatcher {
    pub fn new(rules: Vec<IgnoreRule>) -> Result<Self> {
        let compile = |negation: bool| -> Result<RegexSet> {
            let sources: Vec<String> = rules
                .iter()
                .filter(|r| r.is_negation == negation)
                .map(|r| glob_to_regex(&r.pattern))
                .collect();
            RegexSet::new(&sources).map_err(|source| {
                // Report the first pattern that fails on its own
                let pattern = rules
                    .iter()
                    .filter(|r| r.is_negation == negation)
                    .find(|r| Regex::new(&glob_to_regex(&r.pattern)).is_err())
                    .map(|r| r.pattern.clone())
                    .unwrap_or_default();
                LensError::InvalidPattern { pattern, source }
            })
        };

        let positive = compile(false)?;
        let negative = compile(true)?;

        Ok(Self {
            rules,
            positive,
            negative,
        })
    }

    /// Built-in defaults only
    pub fn with_defaults() -> Result<Self> {
        Self::new(default_rules())
    }

    /// Defaults ++ repository `.gitignore` ++ caller extras
    pub fn for_repository(root: &Path, extra: &[String]) -> Result<Self> {
        let mut rules = default_rules();
        rules.extend(load_gitignore(root));
        for pattern in extra {
            match pattern.strip_prefix('!') {
                Some(rest) => rules.push(IgnoreRule::negation(rest)),
                None => rules.push(IgnoreRule::new(pattern.as_str())),
            }
        }
        debug!("Ignore matcher built with {} rules", rules.len());
        Self::new(rules)
    }

    pub fn is_ignored(&self, relative_path: &str) -> bool {
        let normalized = normalize(relative_path);
        if normalized.is_empty() {
            return false;
        }
        self.positive.is_match(&normalized) && !self.negative.is_match(&normalized)
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }
}

fn default_rules() -> Vec<IgnoreRule> {
    DEFAULT_IGNORE_PATTERNS
        .iter()
        .map(|p| IgnoreRule::new(*p))
        .collect()
}

/// Read the repository-level `.gitignore`, if any.
pub fn load_gitignore(root: &Path) -> Vec<IgnoreRule> {
    let path = root.join(".gitignore");
    match fs::read_to_string(&path) {
        Ok(content) => content
            .lines()
            .flat_map(IgnoreRule::parse_gitignore_line)
            .collect(),
        Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
        Err(e) => {
            warn!("Could not read {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches("./").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_name_matches_any_depth() {
        assert!(matches("node_modules/foo/bar.js", "node_modules"));
        assert!(matches("packages/web/node_modules/x.js", "node_modules"));
        assert!(!matches("src/index.ts", "node_modules"));
        assert!(!matches("src/my_node_modules.ts", "node_modules"));
    }

    #[test]
    fn test_extension_glob() {
        assert!(matches("file.log", "*.log"));
        assert!(matches("logs/deep/file.log", "*.log"));
        assert!(!matches("file.txt", "*.log"));
        assert!(!matches("file.log.ts", "*.log"));
    }

    #[test]
    fn test_anchored_pattern() {
        assert!(matches("build/out.js", "/build"));
        assert!(!matches("src/build/out.js", "/build"));
    }

    #[test]
    fn test_double_star() {
        assert!(matches("src/gen/a/b.ts", "src/gen/**"));
        assert!(matches("a/b/fixtures/x.ts", "**/fixtures"));
        assert!(matches("fixtures/x.ts", "**/fixtures"));
        assert!(!matches("src/gen.ts", "src/gen/**"));
    }

    #[test]
    fn test_question_mark_is_single_char() {
        assert!(matches("a1.ts", "a?.ts"));
        assert!(!matches("a12.ts", "a?.ts"));
        assert!(!matches("a/.ts", "a?.ts"));
    }

    #[test]
    fn test_literal_characters_escaped() {
        assert!(matches("a+b.ts", "a+b.ts"));
        assert!(!matches("aab.ts", "a+b.ts"));
        assert!(!matches("filexts", "file.ts"));
    }

    #[test]
    fn test_defaults_exclude_secrets_and_noise() {
        let matcher = IgnoreMatcher::with_defaults().unwrap();
        assert!(matcher.is_ignored(".env"));
        assert!(matcher.is_ignored("config/.env.production"));
        assert!(matcher.is_ignored("certs/server.pem"));
        assert!(matcher.is_ignored("keys/id.key"));
        assert!(matcher.is_ignored(".git/HEAD"));
        assert!(matcher.is_ignored("package-lock.json"));
        assert!(matcher.is_ignored("dist/bundle.js"));
        assert!(matcher.is_ignored("coverage/lcov-report/index.js"));
        assert!(!matcher.is_ignored("src/env.ts"));
        assert!(!matcher.is_ignored("src/keyboard.ts"));
    }

    #[test]
    fn test_parse_gitignore_line() {
        assert!(IgnoreRule::parse_gitignore_line("").is_empty());
        assert!(IgnoreRule::parse_gitignore_line("# comment").is_empty());
        assert_eq!(
            IgnoreRule::parse_gitignore_line("generated/"),
            vec![IgnoreRule::new("generated"), IgnoreRule::new("generated/**")]
        );
        assert_eq!(
            IgnoreRule::parse_gitignore_line("!keep.log"),
            vec![IgnoreRule::negation("keep.log")]
        );
    }

    #[test]
    fn test_negation_is_final_override() {
        let matcher = IgnoreMatcher::new(vec![
            IgnoreRule::new("*.log"),
            IgnoreRule::negation("keep.log"),
            // A later positive rule does not re-exclude the negated path
            IgnoreRule::new("keep.log"),
        ])
        .unwrap();
        assert!(matcher.is_ignored("debug.log"));
        assert!(!matcher.is_ignored("keep.log"));
    }

    #[test]
    fn test_for_repository_merges_gitignore_and_extras() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".gitignore"),
            "# generated code\ngenerated/\n*.snap\n!important.snap\n",
        )
        .unwrap();

        let matcher =
            IgnoreMatcher::for_repository(dir.path(), &["legacy/**".to_string()]).unwrap();

        assert!(matcher.is_ignored("generated"));
        assert!(matcher.is_ignored("generated/api.ts"));
        assert!(matcher.is_ignored("tests/__snapshots__/a.snap"));
        assert!(!matcher.is_ignored("important.snap"));
        assert!(matcher.is_ignored("legacy/old.ts"));
        assert!(matcher.is_ignored("node_modules/react/index.js"));
        assert!(!matcher.is_ignored("src/index.ts"));
    }

    #[test]
    fn test_missing_gitignore_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_gitignore(dir.path()).is_empty());
    }

    #[test]
    fn test_windows_separators_normalized() {
        assert!(matches("node_modules\\lib\\a.js", "node_modules"));
    }

    proptest! {
        #[test]
        fn prop_glob_always_compiles(pattern in "[a-zA-Z0-9_.*?/+()\\[\\]{}|^$-]{1,24}") {
            prop_assert!(Regex::new(&glob_to_regex(&pattern)).is_ok());
        }

        #[test]
        fn prop_literal_name_matches_itself(name in "[a-z][a-z0-9_]{0,12}\\.[a-z]{1,4}") {
            prop_assert!(matches(&name, &name));
            let nested = format!("some/dir/{}", name);
            prop_assert!(matches(&nested, &name));
        }
    }
}
