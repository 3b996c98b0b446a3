use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Coarse purpose of a file, derived from its path alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    Entry,
    Config,
    Types,
    Test,
    Util,
    Doc,
    Core,
}

impl FileRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileRole::Entry => "entry",
            FileRole::Config => "config",
            FileRole::Types => "types",
            FileRole::Test => "test",
            FileRole::Util => "util",
            FileRole::Doc => "doc",
            FileRole::Core => "core",
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "entry" => Ok(FileRole::Entry),
            "config" => Ok(FileRole::Config),
            "types" => Ok(FileRole::Types),
            "test" => Ok(FileRole::Test),
            "util" => Ok(FileRole::Util),
            "doc" => Ok(FileRole::Doc),
            "core" => Ok(FileRole::Core),
            _ => Err(format!(
                "Unknown file role: {}. Valid values: entry, config, types, test, util, doc, core",
                s
            )),
        }
    }
}

/// A file found during discovery. Dropped once scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    /// Path relative to the repository root, `/`-separated
    pub relative_path: String,
    pub size_bytes: u64,
}

/// Canonical output of the ranking stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedFile {
    pub path: String,
    /// Always within `[0, 1]`
    pub importance: f64,
    pub role: FileRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_tests: Option<bool>,
    /// Signals that contributed to the score; informational only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RankedFile {
    /// Heuristic-only entry, before any AST data is merged in
    pub fn heuristic(path: impl Into<String>, role: FileRole, importance: f64) -> Self {
        Self {
            path: path.into(),
            importance: importance.clamp(0.0, 1.0),
            role,
            export_count: None,
            function_count: None,
            has_tests: None,
            reason: None,
        }
    }

    /// Importance as a whole percentage, for display
    pub fn importance_pct(&self) -> u32 {
        (self.importance * 100.0).round() as u32
    }
}

/// Sort ranked files by importance, descending.
///
/// Stable: equal scores keep discovery order.
pub fn sort_by_importance(files: &mut [RankedFile]) {
    files.sort_by(|a, b| b.importance.total_cmp(&a.importance));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_strings() {
        for role in [
            FileRole::Entry,
            FileRole::Config,
            FileRole::Types,
            FileRole::Test,
            FileRole::Util,
            FileRole::Doc,
            FileRole::Core,
        ] {
            assert_eq!(role.as_str().parse::<FileRole>(), Ok(role));
        }
        assert!("bogus".parse::<FileRole>().is_err());
    }

    #[test]
    fn test_heuristic_clamps() {
        let file = RankedFile::heuristic("a.ts", FileRole::Core, 1.7);
        assert_eq!(file.importance, 1.0);
        let file = RankedFile::heuristic("a.ts", FileRole::Core, -0.2);
        assert_eq!(file.importance, 0.0);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut files = vec![
            RankedFile::heuristic("a.ts", FileRole::Core, 0.5),
            RankedFile::heuristic("b.ts", FileRole::Entry, 0.9),
            RankedFile::heuristic("c.ts", FileRole::Core, 0.5),
            RankedFile::heuristic("d.ts", FileRole::Core, 0.5),
        ];
        sort_by_importance(&mut files);
        let order: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(order, vec!["b.ts", "a.ts", "c.ts", "d.ts"]);
    }

    #[test]
    fn test_serialization_skips_missing_ast_fields() {
        let file = RankedFile::heuristic("src/index.ts", FileRole::Entry, 0.9);
        let json = serde_json::to_string(&file).unwrap();
        assert_eq!(
            json,
            r#"{"path":"src/index.ts","importance":0.9,"role":"entry"}"#
        );
    }

    #[test]
    fn test_importance_pct() {
        let file = RankedFile::heuristic("x.rs", FileRole::Core, 0.855);
        assert_eq!(file.importance_pct(), 86);
    }
}
