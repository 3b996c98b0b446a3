//! Token-Budgeted Context Assembler
//!
//! Builds the [`GatheredContext`] handed to a generation step from a ranked
//! file list. Everything is measured in characters at 4 chars per token.
//!
//! ## Budget Layout
//!
//! | Section  | Default budget |
//! |----------|----------------|
//! | README   | 500 tokens     |
//! | Manifest | 300 tokens     |
//! | Tree     | 400 tokens     |
//! | Files    | whatever the sections above left unused |
//!
//! Each section is truncated to its own budget with a visible marker. File
//! contents share the remainder: each file gets `min(share, max_chars_per_file)`
//! where `share` is the remaining budget divided by the files still to go, so
//! unused budget rolls forward.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::analyzer::parser::fence_tag;
use crate::config::Config;
use crate::constants::{context, discovery};
use crate::ranker::{RankOptions, rank_repository};
use crate::types::{ContextFile, GatheredContext, LensError, RankedFile, Result};

const README_CANDIDATES: &[&str] = &[
    "README.md",
    "readme.md",
    "Readme.md",
    "README.markdown",
    "README.rst",
    "README.txt",
    "README",
];

const MANIFEST_CANDIDATES: &[&str] = &[
    "package.json",
    "Cargo.toml",
    "go.mod",
    "pyproject.toml",
    "setup.py",
    "requirements.txt",
    "pom.xml",
    "build.gradle",
    "build.gradle.kts",
];

// =============================================================================
// Options
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ContextOptions {
    pub total_tokens: usize,
    pub readme_tokens: usize,
    pub manifest_tokens: usize,
    pub tree_tokens: usize,
    pub top_files: usize,
    pub max_chars_per_file: usize,
    /// Bytes; larger files are never read
    pub max_file_size: u64,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            total_tokens: context::TOTAL_TOKENS,
            readme_tokens: context::README_TOKENS,
            manifest_tokens: context::MANIFEST_TOKENS,
            tree_tokens: context::TREE_TOKENS,
            top_files: context::DEFAULT_TOP_FILES,
            max_chars_per_file: context::MAX_CHARS_PER_FILE,
            max_file_size: discovery::DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl From<&Config> for ContextOptions {
    fn from(config: &Config) -> Self {
        let ctx = &config.context;
        Self {
            total_tokens: ctx.total_tokens,
            readme_tokens: ctx.readme_tokens,
            manifest_tokens: ctx.manifest_tokens,
            tree_tokens: ctx.tree_tokens,
            top_files: ctx.top_files,
            max_chars_per_file: ctx.max_chars_per_file,
            max_file_size: config.discovery.max_file_size,
        }
    }
}

impl ContextOptions {
    pub fn with_total_tokens(mut self, tokens: usize) -> Self {
        self.total_tokens = tokens;
        self
    }

    pub fn with_top_files(mut self, top_files: usize) -> Self {
        self.top_files = top_files;
        self
    }

    pub fn with_max_chars_per_file(mut self, max_chars: usize) -> Self {
        self.max_chars_per_file = max_chars;
        self
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }
}

// =============================================================================
// Text helpers
// =============================================================================

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn tokens_to_chars(tokens: usize) -> usize {
    tokens.saturating_mul(context::CHARS_PER_TOKEN)
}

/// Truncate to at most `max_chars` characters, marker included.
///
/// Truncated output always ends with the marker; a budget too small to hold
/// it yields an empty string.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if char_len(text) <= max_chars {
        return text.to_string();
    }
    let marker_len = char_len(context::TRUNCATION_MARKER);
    if max_chars < marker_len {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - marker_len).collect();
    out.push_str(context::TRUNCATION_MARKER);
    out
}

/// NUL byte, or too many control characters in the leading bytes
pub fn is_binary(bytes: &[u8]) -> bool {
    let sniff = &bytes[..bytes.len().min(context::BINARY_SNIFF_BYTES)];
    if sniff.is_empty() {
        return false;
    }
    if sniff.contains(&0) {
        return true;
    }
    let control = sniff
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\n' | b'\r' | b'\t' | 0x0c))
        .count();
    control as f64 / sniff.len() as f64 > context::BINARY_CONTROL_RATIO
}

/// Read a text file, skipping oversized, binary and unreadable ones
fn read_text(path: &Path, max_file_size: u64) -> Option<String> {
    let size = match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata.len(),
        Ok(_) => return None,
        Err(e) => {
            debug!("Skipping {}: {}", path.display(), e);
            return None;
        }
    };
    if size > max_file_size {
        debug!("Skipping {} ({} bytes > {} cap)", path.display(), size, max_file_size);
        return None;
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Could not read {}: {}", path.display(), e);
            return None;
        }
    };
    if is_binary(&bytes) {
        debug!("Skipping binary file {}", path.display());
        return None;
    }
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// First existing candidate: (file name, content)
fn read_first(root: &Path, candidates: &[&str], max_file_size: u64) -> Option<(String, String)> {
    candidates.iter().find_map(|name| {
        read_text(&root.join(name), max_file_size).map(|content| (name.to_string(), content))
    })
}

fn repo_name(repo_path: &Path) -> String {
    fs::canonicalize(repo_path)
        .ok()
        .as_deref()
        .unwrap_or(repo_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| repo_path.display().to_string())
}

// =============================================================================
// File Tree
// =============================================================================

/// Ranked files grouped by directory, each annotated with role and importance
pub fn build_file_tree(files: &[RankedFile]) -> String {
    let mut groups: BTreeMap<&str, Vec<&RankedFile>> = BTreeMap::new();
    for file in files {
        let dir = file.path.rsplit_once('/').map_or(".", |(dir, _)| dir);
        groups.entry(dir).or_default().push(file);
    }

    let mut tree = String::new();
    for (dir, mut entries) in groups {
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        let _ = writeln!(tree, "{}/", dir);
        for file in entries {
            let name = file.path.rsplit('/').next().unwrap_or(&file.path);
            let _ = writeln!(
                tree,
                "  {} [{}, {}%]",
                name,
                file.role,
                file.importance_pct()
            );
        }
    }
    tree.truncate(tree.trim_end().len());
    tree
}

// =============================================================================
// Assembler
// =============================================================================

pub struct ContextAssembler;

impl ContextAssembler {
    pub fn assemble(
        repo_path: &Path,
        ranked: &[RankedFile],
        options: &ContextOptions,
    ) -> Result<GatheredContext> {
        if !repo_path.is_dir() {
            return Err(LensError::RepoNotFound(repo_path.to_path_buf()));
        }
        let started = Instant::now();
        let mut remaining = tokens_to_chars(options.total_tokens);

        let readme = read_first(repo_path, README_CANDIDATES, options.max_file_size).map(
            |(_, content)| {
                let budget = tokens_to_chars(options.readme_tokens).min(remaining);
                truncate_chars(&content, budget)
            },
        )
        .filter(|content| !content.is_empty());
        remaining -= readme.as_deref().map_or(0, char_len);

        let manifest = read_first(repo_path, MANIFEST_CANDIDATES, options.max_file_size).map(
            |(name, content)| {
                let budget = tokens_to_chars(options.manifest_tokens).min(remaining);
                (name, truncate_chars(&content, budget))
            },
        )
        .filter(|(_, content)| !content.is_empty());
        remaining -= manifest.as_ref().map_or(0, |(_, c)| char_len(c));

        let top = &ranked[..ranked.len().min(options.top_files)];
        let tree_budget = tokens_to_chars(options.tree_tokens).min(remaining);
        let file_tree = truncate_chars(&build_file_tree(top), tree_budget);
        remaining -= char_len(&file_tree);

        let mut top_files = Vec::new();
        for (i, file) in top.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let Some(content) = read_text(&repo_path.join(&file.path), options.max_file_size)
            else {
                continue;
            };

            let files_left = top.len() - i;
            let budget = (remaining / files_left).min(options.max_chars_per_file);
            if budget == 0 {
                continue;
            }
            let content = truncate_chars(&content, budget);
            if content.is_empty() {
                continue;
            }
            remaining -= char_len(&content);

            top_files.push(ContextFile {
                path: file.path.clone(),
                importance: file.importance,
                role: file.role,
                content,
            });
        }

        let emitted = readme.as_deref().map_or(0, char_len)
            + manifest.as_ref().map_or(0, |(_, c)| char_len(c))
            + char_len(&file_tree)
            + top_files.iter().map(|f| char_len(&f.content)).sum::<usize>();
        let estimated_tokens = emitted.div_ceil(context::CHARS_PER_TOKEN) as u32;

        info!(
            "Assembled context: {} files, ~{} tokens in {:.2?}",
            top_files.len(),
            estimated_tokens,
            started.elapsed()
        );

        let (package_config_name, package_config) = manifest.unzip();
        Ok(GatheredContext {
            repo_path: repo_path.display().to_string(),
            repo_name: repo_name(repo_path),
            readme,
            package_config,
            package_config_name,
            file_tree,
            top_files,
            estimated_tokens,
        })
    }
}

/// Rank a repository, then assemble its context
pub fn gather_context(
    repo_path: &Path,
    rank_options: &RankOptions,
    options: &ContextOptions,
) -> Result<GatheredContext> {
    let ranked = rank_repository(repo_path, rank_options)?;
    ContextAssembler::assemble(repo_path, &ranked, options)
}

// =============================================================================
// Rendering
// =============================================================================

impl GatheredContext {
    /// Markdown rendering for prompt inclusion
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Repository: {}\n", self.repo_name);

        if let Some(readme) = &self.readme {
            let _ = writeln!(out, "## README\n\n{}\n", readme.trim_end());
        }

        if let Some(config) = &self.package_config {
            let tag = self
                .package_config_name
                .as_deref()
                .map_or("text", fence_tag);
            let _ = writeln!(
                out,
                "## Package Configuration\n\n```{}\n{}\n```\n",
                tag,
                config.trim_end()
            );
        }

        let _ = writeln!(out, "## File Structure\n\n```\n{}\n```\n", self.file_tree);

        if !self.top_files.is_empty() {
            let _ = writeln!(out, "## Key Files\n");
            for file in &self.top_files {
                let _ = writeln!(
                    out,
                    "### {} ({}, {}%)\n\n```{}\n{}\n```\n",
                    file.path,
                    file.role,
                    (file.importance * 100.0).round() as u32,
                    fence_tag(&file.path),
                    file.content.trim_end()
                );
            }
        }

        out.truncate(out.trim_end().len());
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileRole;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn ranked(path: &str, role: FileRole, importance: f64) -> RankedFile {
        RankedFile::heuristic(path, role, importance)
    }

    #[test]
    fn test_truncate_keeps_marker_inside_budget() {
        let text = "x".repeat(3000);
        let out = truncate_chars(&text, 2000);
        assert_eq!(char_len(&out), 2000);
        assert!(out.ends_with("... (truncated)"));

        assert_eq!(truncate_chars("short", 2000), "short");
        assert_eq!(truncate_chars("short", 0), "");
    }

    #[test]
    fn test_truncate_below_marker_is_empty() {
        let marker_len = char_len("\n... (truncated)");
        let text = "y".repeat(100);
        assert_eq!(truncate_chars(&text, marker_len - 1), "");
        assert_eq!(truncate_chars(&text, 4), "");
        assert_eq!(truncate_chars(&text, marker_len), "\n... (truncated)");
        // Text that fits is never touched, whatever the budget
        assert_eq!(truncate_chars("abc", 4), "abc");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let text = "한".repeat(100);
        let out = truncate_chars(&text, 50);
        assert_eq!(char_len(&out), 50);
    }

    #[test]
    fn test_binary_detection() {
        assert!(is_binary(b"PK\x03\x04\x00\x00"));
        assert!(is_binary(&[0x01; 64]));
        assert!(!is_binary(b"fn main() {\n\tprintln!(\"hi\");\n}\n"));
        assert!(!is_binary(b""));
    }

    #[test]
    fn test_missing_repo() {
        let err = ContextAssembler::assemble(
            Path::new("/definitely/not/here"),
            &[],
            &ContextOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LensError::RepoNotFound(_)));
    }

    #[test]
    fn test_long_readme_truncated() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", "word ".repeat(1000).as_bytes());

        let ctx = ContextAssembler::assemble(dir.path(), &[], &ContextOptions::default()).unwrap();
        let readme = ctx.readme.unwrap();
        assert!(readme.ends_with("... (truncated)"));
        assert!(char_len(&readme) <= 2000);
        assert!(ctx.estimated_tokens <= 4000);
    }

    #[test]
    fn test_manifest_detection_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Cargo.toml", b"[package]\nname = \"demo\"\n");
        write(dir.path(), "requirements.txt", b"requests\n");

        let ctx = ContextAssembler::assemble(dir.path(), &[], &ContextOptions::default()).unwrap();
        assert_eq!(ctx.package_config_name.as_deref(), Some("Cargo.toml"));
        assert!(ctx.package_config.unwrap().contains("demo"));
        assert!(ctx.readme.is_none());
    }

    #[test]
    fn test_file_tree_groups_by_directory() {
        let files = vec![
            ranked("src/index.ts", FileRole::Entry, 0.95),
            ranked("package.ts", FileRole::Core, 0.55),
            ranked("src/api/client.ts", FileRole::Core, 0.7),
            ranked("src/cli.ts", FileRole::Entry, 0.9),
        ];
        let tree = build_file_tree(&files);
        assert_eq!(
            tree,
            "./\n  package.ts [core, 55%]\nsrc/\n  cli.ts [entry, 90%]\n  index.ts [entry, 95%]\nsrc/api/\n  client.ts [core, 70%]"
        );
    }

    #[test]
    fn test_top_files_respect_caps_and_skip_binary() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/a.ts", "a".repeat(5000).as_bytes());
        write(dir.path(), "src/b.ts", b"\x00\x01binary");
        write(dir.path(), "src/c.ts", b"export const c = 1;\n");
        write(dir.path(), "src/d.ts", b"export const d = 1;\n");

        let ranked = vec![
            ranked("src/a.ts", FileRole::Core, 0.9),
            ranked("src/b.ts", FileRole::Core, 0.8),
            ranked("src/c.ts", FileRole::Core, 0.7),
            ranked("src/d.ts", FileRole::Core, 0.6),
        ];
        let options = ContextOptions::default().with_top_files(3);
        let ctx = ContextAssembler::assemble(dir.path(), &ranked, &options).unwrap();

        let paths: Vec<_> = ctx.top_files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["src/a.ts", "src/c.ts"]);
        assert_eq!(char_len(&ctx.top_files[0].content), 2000);
        assert!(ctx.top_files[0].content.ends_with("... (truncated)"));
        assert!(!ctx.file_tree.contains("d.ts"));
    }

    #[test]
    fn test_unused_budget_rolls_forward() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "small.py", b"x = 1\n");
        write(dir.path(), "big.py", "y".repeat(3000).as_bytes());

        let ranked = vec![
            ranked("small.py", FileRole::Core, 0.9),
            ranked("big.py", FileRole::Core, 0.8),
        ];
        // 500 tokens total, no README or manifest, tree about 40 chars
        let options = ContextOptions::default().with_total_tokens(500);
        let ctx = ContextAssembler::assemble(dir.path(), &ranked, &options).unwrap();

        let big = &ctx.top_files[1];
        let available = 2000 - char_len(&ctx.file_tree) - char_len(&ctx.top_files[0].content);
        assert_eq!(char_len(&big.content), available.min(2000));
        assert!(char_len(&big.content) > 1000);
        assert!(ctx.estimated_tokens <= 500);
    }

    #[test]
    fn test_oversized_files_excluded() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", "r".repeat(300).as_bytes());
        write(dir.path(), "src/a.rs", "fn a() {}\n".repeat(30).as_bytes());

        let ranked = vec![ranked("src/a.rs", FileRole::Core, 0.7)];
        let options = ContextOptions::default().with_max_file_size(100);
        let ctx = ContextAssembler::assemble(dir.path(), &ranked, &options).unwrap();
        assert!(ctx.readme.is_none());
        assert!(ctx.top_files.is_empty());
    }

    #[test]
    fn test_estimated_tokens_match_emitted_chars() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", b"# Demo\n");
        write(dir.path(), "main.go", b"package main\n");

        let ranked = vec![ranked("main.go", FileRole::Entry, 0.9)];
        let ctx = ContextAssembler::assemble(dir.path(), &ranked, &ContextOptions::default())
            .unwrap();
        let chars = char_len("# Demo\n") + char_len(&ctx.file_tree) + char_len("package main\n");
        assert_eq!(ctx.estimated_tokens as usize, chars.div_ceil(4));
    }

    #[test]
    fn test_render_sections() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", b"# Demo\nA tool.\n");
        write(dir.path(), "package.json", b"{\"name\": \"demo\"}\n");
        write(dir.path(), "src/index.ts", b"export const main = 1;\n");

        let ranked = vec![ranked("src/index.ts", FileRole::Entry, 0.9)];
        let ctx = ContextAssembler::assemble(dir.path(), &ranked, &ContextOptions::default())
            .unwrap();
        let text = ctx.render();

        assert!(text.starts_with(&format!("# Repository: {}\n", ctx.repo_name)));
        assert!(text.contains("## README\n\n# Demo\nA tool.\n"));
        assert!(text.contains("## Package Configuration\n\n```json\n{\"name\": \"demo\"}\n```"));
        assert!(text.contains("## File Structure\n\n```\nsrc/\n  index.ts [entry, 90%]\n```"));
        assert!(text.contains("### src/index.ts (entry, 90%)\n\n```typescript\nexport const main = 1;\n```"));
    }

    #[test]
    fn test_gather_context_end_to_end() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", b"# Demo\n");
        write(dir.path(), "src/index.ts", b"export function main() {}\n");
        write(dir.path(), "src/util/strings.ts", b"export const trim = (s: string) => s.trim();\n");

        let ctx = gather_context(dir.path(), &RankOptions::default(), &ContextOptions::default())
            .unwrap();
        assert_eq!(ctx.top_files[0].path, "src/index.ts");
        assert_eq!(ctx.top_files.len(), 2);

        let json = serde_json::to_value(&ctx).unwrap();
        assert!(json.get("estimatedTokens").is_some());
        assert!(json.get("topFiles").is_some());
    }
}
