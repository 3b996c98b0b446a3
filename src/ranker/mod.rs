//! AST-Boosted Ranker
//!
//! Orders a repository's files by importance in two passes:
//!
//! 1. **Heuristic**: role and base score from the path, plus re-export shim
//!    detection for JS/TS files.
//! 2. **AST boost** (optional): files are parsed and their score raised by
//!    export and function counts. Read and parse failures leave a file at its
//!    heuristic score.
//!
//! Scores are clamped to `[0, 1]` and the list is stably sorted descending, so
//! ties keep discovery order.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::analyzer::classifier::assess;
use crate::analyzer::parser::{Extractor, GrammarCache, Language, ParsedFile};
use crate::analyzer::scanner::FileScanner;
use crate::config::Config;
use crate::constants::{boost, discovery};
use crate::types::{LensError, RankedFile, Result, sort_by_importance};

// =============================================================================
// Options
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RankOptions {
    /// Glob patterns appended after the defaults and `.gitignore`
    pub extra_ignore: Vec<String>,
    pub max_files: usize,
    /// Bytes; larger files are never read
    pub max_file_size: u64,
    pub use_ast: bool,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            extra_ignore: Vec::new(),
            max_files: discovery::DEFAULT_MAX_FILES,
            max_file_size: discovery::DEFAULT_MAX_FILE_SIZE,
            use_ast: true,
        }
    }
}

impl From<&Config> for RankOptions {
    fn from(config: &Config) -> Self {
        Self {
            extra_ignore: config.discovery.extra_ignore.clone(),
            max_files: config.discovery.max_files,
            max_file_size: config.discovery.max_file_size,
            use_ast: config.ranking.use_ast,
        }
    }
}

impl RankOptions {
    pub fn with_extra_ignore(mut self, patterns: Vec<String>) -> Self {
        self.extra_ignore = patterns;
        self
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    pub fn with_ast(mut self, use_ast: bool) -> Self {
        self.use_ast = use_ast;
        self
    }
}

// =============================================================================
// Boost
// =============================================================================

/// Additive score boost for a parsed file
pub fn ast_boost(export_count: usize, function_count: usize) -> f64 {
    let exports = if export_count > boost::EXPORTS_HIGH_THRESHOLD {
        boost::EXPORTS_HIGH
    } else if export_count > boost::EXPORTS_MEDIUM_THRESHOLD {
        boost::EXPORTS_MEDIUM
    } else if export_count > 0 {
        boost::EXPORTS_LOW
    } else {
        0.0
    };

    let functions = if function_count > boost::FUNCTIONS_HIGH_THRESHOLD {
        boost::FUNCTIONS_HIGH
    } else if function_count > boost::FUNCTIONS_MEDIUM_THRESHOLD {
        boost::FUNCTIONS_MEDIUM
    } else {
        0.0
    };

    exports + functions
}

/// Merge extraction results into a heuristic entry
fn apply_parsed(file: &mut RankedFile, parsed: &ParsedFile) {
    let exports = parsed.exports.len();
    let functions = parsed.functions.len();

    file.importance = (file.importance + ast_boost(exports, functions)).clamp(0.0, 1.0);
    file.export_count = Some(exports as u32);
    file.function_count = Some(functions as u32);
    file.has_tests = Some(parsed.has_tests);

    let mut signals = Vec::new();
    if exports > 0 {
        signals.push(format!("{} exports", exports));
    }
    if functions > 0 {
        signals.push(format!("{} functions", functions));
    }
    if parsed.has_tests {
        signals.push("contains tests".to_string());
    }
    if !signals.is_empty() {
        file.reason = Some(signals.join(", "));
    }
}

// =============================================================================
// Ranker
// =============================================================================

pub struct Ranker {
    extractor: Extractor,
}

impl Ranker {
    pub fn new(grammars: Arc<GrammarCache>) -> Result<Self> {
        Ok(Self {
            extractor: Extractor::new(grammars)?,
        })
    }

    /// Ranker over its own freshly initialized grammar cache
    pub fn with_defaults() -> Result<Self> {
        Ok(Self {
            extractor: Extractor::initialized()?,
        })
    }

    pub fn rank(&self, repo_path: &Path, options: &RankOptions) -> Result<Vec<RankedFile>> {
        if !repo_path.is_dir() {
            return Err(LensError::RepoNotFound(repo_path.to_path_buf()));
        }
        let started = Instant::now();

        let candidates = FileScanner::for_repository(repo_path, &options.extra_ignore)?
            .with_max_files(options.max_files)
            .with_max_file_size(options.max_file_size)
            .scan();

        let mut ranked = Vec::with_capacity(candidates.len());
        let mut boosted = 0usize;

        for candidate in &candidates {
            let path = candidate.relative_path.as_str();
            let language = Language::from_path(path);
            let needs_content = options.use_ast || language.is_js_family();
            let content = if needs_content {
                match fs::read_to_string(repo_path.join(path)) {
                    Ok(content) => Some(content),
                    Err(e) => {
                        debug!("Could not read {}: {}", path, e);
                        None
                    }
                }
            } else {
                None
            };

            let assessment = assess(path, content.as_deref());
            let mut file = RankedFile::heuristic(path, assessment.role, assessment.score);

            if assessment.is_shim {
                file.reason = Some("re-export shim".to_string());
            } else if options.use_ast
                && let Some(content) = content.as_deref()
                && let Some(parsed) = self.extractor.extract(path, content)?
            {
                apply_parsed(&mut file, &parsed);
                boosted += 1;
            }

            ranked.push(file);
        }

        sort_by_importance(&mut ranked);

        info!(
            "Ranked {} files ({} AST-boosted) in {:.2?}",
            ranked.len(),
            boosted,
            started.elapsed()
        );
        Ok(ranked)
    }
}

/// Rank a repository with a fresh grammar cache
pub fn rank_repository(repo_path: &Path, options: &RankOptions) -> Result<Vec<RankedFile>> {
    Ranker::with_defaults()?.rank(repo_path, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::classifier::score;
    use crate::analyzer::parser::{ExtractedSymbol, SymbolKind};
    use crate::types::FileRole;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn find<'a>(ranked: &'a [RankedFile], path: &str) -> &'a RankedFile {
        ranked.iter().find(|f| f.path == path).unwrap()
    }

    #[test]
    fn test_missing_repo() {
        let err = rank_repository(Path::new("/definitely/not/here"), &RankOptions::default())
            .unwrap_err();
        assert!(matches!(err, LensError::RepoNotFound(_)));
    }

    #[test]
    fn test_file_path_is_not_a_repo() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.ts", "");
        let err = rank_repository(&dir.path().join("a.ts"), &RankOptions::default()).unwrap_err();
        assert!(matches!(err, LensError::RepoNotFound(_)));
    }

    #[test]
    fn test_twelve_exports_boost() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "src/client.ts",
            include_str!("../../tests/fixtures/sample.ts"),
        );

        let ranked = rank_repository(dir.path(), &RankOptions::default()).unwrap();
        let file = find(&ranked, "src/client.ts");

        assert!(file.importance >= score("src/client.ts") + 0.1);
        assert_eq!(file.export_count, Some(12));
        assert!(file.reason.as_deref().unwrap().contains("12 exports"));
    }

    #[test]
    fn test_heuristic_only_mode() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "src/client.ts",
            include_str!("../../tests/fixtures/sample.ts"),
        );

        let options = RankOptions::default().with_ast(false);
        let ranked = rank_repository(dir.path(), &options).unwrap();
        let file = find(&ranked, "src/client.ts");

        assert_eq!(file.importance, score("src/client.ts"));
        assert_eq!(file.export_count, None);
        assert_eq!(file.reason, None);
    }

    #[test]
    fn test_boost_is_clamped() {
        let dir = TempDir::new().unwrap();
        let body: String = (0..20)
            .map(|i| format!("export function f{}() {{}}\n", i))
            .collect();
        write(dir.path(), "index.ts", &body);

        let ranked = rank_repository(dir.path(), &RankOptions::default()).unwrap();
        assert_eq!(ranked[0].path, "index.ts");
        assert_eq!(ranked[0].importance, 1.0);
        assert_eq!(ranked[0].reason.as_deref(), Some("20 exports, 20 functions"));
    }

    #[test]
    fn test_shim_is_not_boosted() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "src/index.ts",
            "export * from \"./a\";\nexport { b } from \"./b\";\n",
        );
        write(dir.path(), "src/a.ts", "export const a = 1;\n");

        let ranked = rank_repository(dir.path(), &RankOptions::default()).unwrap();
        let shim = find(&ranked, "src/index.ts");
        assert!(shim.importance <= 0.05);
        assert_eq!(shim.reason.as_deref(), Some("re-export shim"));
        assert_eq!(shim.export_count, None);
        assert_eq!(ranked.last().unwrap().path, "src/index.ts");
    }

    #[test]
    fn test_test_files_report_tests() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "src/__tests__/parse.test.ts",
            "describe('parse', () => {\n  it('works', () => {});\n});\n",
        );

        let ranked = rank_repository(dir.path(), &RankOptions::default()).unwrap();
        let file = find(&ranked, "src/__tests__/parse.test.ts");
        assert_eq!(file.role, FileRole::Test);
        assert_eq!(file.has_tests, Some(true));
        assert!(file.reason.as_deref().unwrap().contains("contains tests"));
    }

    #[test]
    fn test_syntax_errors_keep_heuristic_score() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/broken.ts", "export function (((( {");

        let ranked = rank_repository(dir.path(), &RankOptions::default()).unwrap();
        let file = find(&ranked, "src/broken.ts");
        assert_eq!(file.importance, score("src/broken.ts"));
        assert_eq!(file.export_count, None);
    }

    #[test]
    fn test_file_cap() {
        let dir = TempDir::new().unwrap();
        for i in 0..50 {
            write(dir.path(), &format!("src/mod{:02}.py", i), "def f():\n    pass\n");
        }
        let options = RankOptions::default().with_max_files(5);
        let ranked = rank_repository(dir.path(), &options).unwrap();
        assert_eq!(ranked.len(), 5);
    }

    #[test]
    fn test_sorted_descending_across_roles() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src/utils/strings.ts", "export const a = 1;\n");
        write(dir.path(), "src/index.ts", "export const main = 1;\n");
        write(dir.path(), "src/config.ts", "export default {};\n");
        write(dir.path(), "tests/app_test.py", "def test_x():\n    pass\n");

        let ranked = rank_repository(dir.path(), &RankOptions::default()).unwrap();
        let order: Vec<_> = ranked.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(order[0], "src/index.ts");
        assert_eq!(*order.last().unwrap(), "tests/app_test.py");
        assert!(ranked.windows(2).all(|w| w[0].importance >= w[1].importance));
    }

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.discovery.max_files = 7;
        config.discovery.extra_ignore = vec!["gen".to_string()];
        config.ranking.use_ast = false;

        let options = RankOptions::from(&config);
        assert_eq!(options.max_files, 7);
        assert_eq!(options.extra_ignore, vec!["gen"]);
        assert!(!options.use_ast);
    }

    #[test]
    fn test_boost_table() {
        assert_eq!(ast_boost(0, 0), 0.0);
        assert_eq!(ast_boost(1, 0), 0.05);
        assert_eq!(ast_boost(5, 5), 0.05);
        assert_eq!(ast_boost(6, 6), 0.10 + 0.05);
        assert_eq!(ast_boost(11, 16), 0.15 + 0.10);
    }

    proptest! {
        #[test]
        fn prop_boosted_scores_sorted_and_clamped(
            entries in prop::collection::vec((0.0f64..=1.0, 0usize..40, 0usize..40), 0..30)
        ) {
            let mut files: Vec<RankedFile> = entries
                .iter()
                .enumerate()
                .map(|(i, (base, exports, functions))| {
                    let mut file = RankedFile::heuristic(format!("f{}.ts", i), FileRole::Core, *base);
                    let mut parsed = ParsedFile::new(file.path.clone(), Language::TypeScript);
                    parsed.exports = (0..*exports).map(|e| format!("e{}", e)).collect();
                    parsed.functions = (0..*functions)
                        .map(|f| ExtractedSymbol::new(format!("f{}", f), SymbolKind::Function, f as u32 + 1))
                        .collect();
                    apply_parsed(&mut file, &parsed);
                    file
                })
                .collect();
            sort_by_importance(&mut files);

            for file in &files {
                prop_assert!((0.0..=1.0).contains(&file.importance));
            }
            for pair in files.windows(2) {
                prop_assert!(pair[0].importance >= pair[1].importance);
            }
        }
    }
}
