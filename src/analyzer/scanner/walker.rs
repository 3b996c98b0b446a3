use std::path::{Path, PathBuf};
use std::sync::Arc;

use ignore::WalkBuilder;
use tracing::debug;

use super::matcher::IgnoreMatcher;
use crate::analyzer::parser::Language;
use crate::constants::discovery::{DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE};
use crate::types::{FileCandidate, Result};

/// Bounded, depth-first discovery of supported source files.
///
/// Walks in file-name order so results are deterministic. Ignored directories
/// are pruned rather than descended. Stops as soon as `max_files` candidates
/// have been collected, so very large repositories yield a prefix in listing
/// order rather than a globally best subset.
pub struct FileScanner {
    root: PathBuf,
    matcher: Arc<IgnoreMatcher>,
    max_files: usize,
    max_file_size: u64,
}

impl FileScanner {
    pub fn new<P: AsRef<Path>>(root: P, matcher: IgnoreMatcher) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            matcher: Arc::new(matcher),
            max_files: DEFAULT_MAX_FILES,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Scanner using defaults, the repository `.gitignore` and extra globs
    pub fn for_repository<P: AsRef<Path>>(root: P, extra_ignore: &[String]) -> Result<Self> {
        let matcher = IgnoreMatcher::for_repository(root.as_ref(), extra_ignore)?;
        Ok(Self::new(root, matcher))
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    /// Get relative paths as strings
    pub fn paths(&self) -> Vec<String> {
        self.scan().into_iter().map(|c| c.relative_path).collect()
    }

    pub fn scan(&self) -> Vec<FileCandidate> {
        let mut files = Vec::new();
        if self.max_files == 0 {
            return files;
        }

        let matcher = Arc::clone(&self.matcher);
        let prune_root = self.root.clone();

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                match relative_path(&prune_root, entry.path()) {
                    Some(rel) => !matcher.is_ignored(&rel),
                    None => false,
                }
            });

        for result in builder.build() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    // Permission and transient FS errors only drop that entry
                    debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            if !Language::from_path(path).is_supported() {
                continue;
            }

            let Some(relative) = relative_path(&self.root, path) else {
                continue;
            };

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    debug!("Skipping {}: {}", relative, e);
                    continue;
                }
            };
            if size > self.max_file_size {
                debug!(
                    "Skipping {} ({} bytes > {} cap)",
                    relative, size, self.max_file_size
                );
                continue;
            }

            files.push(FileCandidate {
                relative_path: relative,
                size_bytes: size,
            });

            if files.len() >= self.max_files {
                debug!("File cap of {} reached, stopping discovery", self.max_files);
                break;
            }
        }

        files
    }
}

/// Discover candidate files under `root`.
pub fn discover(
    root: &Path,
    matcher: IgnoreMatcher,
    max_files: usize,
    max_file_size: u64,
) -> Vec<FileCandidate> {
    FileScanner::new(root, matcher)
        .with_max_files(max_files)
        .with_max_file_size(max_file_size)
        .scan()
}

/// Relative paths only, in discovery order.
pub fn discover_paths(
    root: &Path,
    matcher: IgnoreMatcher,
    max_files: usize,
    max_file_size: u64,
) -> Vec<String> {
    discover(root, matcher, max_files, max_file_size)
        .into_iter()
        .map(|c| c.relative_path)
        .collect()
}

/// `/`-separated path of `path` relative to `root`
pub fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
