use std::collections::HashSet;

use serde::Serialize;
use tree_sitter::{Node, Query, QueryCursor, StreamingIterator};

use super::Language;

/// Maximum characters kept from a declaration's first line
const MAX_SIGNATURE_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Method,
    Struct,
    Enum,
    Trait,
    Interface,
}

impl SymbolKind {
    /// Callable symbols land in `ParsedFile::functions`, the rest in `classes`
    pub fn is_callable(&self) -> bool {
        matches!(self, SymbolKind::Function | SymbolKind::Method)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedSymbol {
    pub name: String,
    pub kind: SymbolKind,
    /// 1-indexed
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub is_async: bool,
    pub is_exported: bool,
}

impl ExtractedSymbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, line: u32) -> Self {
        Self {
            name: name.into(),
            kind,
            line,
            signature: None,
            is_async: false,
            is_exported: false,
        }
    }

    pub fn with_signature(mut self, signature: Option<String>) -> Self {
        self.signature = signature;
        self
    }

    pub fn with_async(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }

    pub fn with_exported(mut self, is_exported: bool) -> Self {
        self.is_exported = is_exported;
        self
    }
}

/// Everything extracted from one source file. Never mutated once returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedFile {
    pub path: String,
    pub language: Language,
    pub functions: Vec<ExtractedSymbol>,
    pub classes: Vec<ExtractedSymbol>,
    /// Module specifiers in first-seen order, deduplicated
    pub imports: Vec<String>,
    pub exports: Vec<String>,
    pub has_tests: bool,
}

impl ParsedFile {
    pub fn new(path: impl Into<String>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
            functions: Vec::new(),
            classes: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            has_tests: false,
        }
    }

    /// Route a symbol to `functions` or `classes` by kind
    pub fn add_symbol(&mut self, symbol: ExtractedSymbol) {
        if symbol.kind.is_callable() {
            self.functions.push(symbol);
        } else {
            self.classes.push(symbol);
        }
    }

    pub fn add_import(&mut self, import: impl Into<String>) {
        push_unique(&mut self.imports, import.into());
    }

    pub fn add_export(&mut self, export: impl Into<String>) {
        push_unique(&mut self.exports, export.into());
    }

    /// Drop repeated `(name, line)` symbols, keeping the first
    pub fn dedupe(&mut self) {
        dedupe_symbols(&mut self.functions);
        dedupe_symbols(&mut self.classes);
    }
}

// =============================================================================
// Shared helpers for the language extractors
// =============================================================================

/// Append `value` unless empty or already present
pub fn push_unique(list: &mut Vec<String>, value: String) {
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}

pub fn dedupe_symbols(symbols: &mut Vec<ExtractedSymbol>) {
    let mut seen = HashSet::new();
    symbols.retain(|s| seen.insert((s.name.clone(), s.line)));
}

/// Extract text content from a tree-sitter node.
/// Returns empty string if extraction fails (with debug logging).
#[inline]
pub fn get_node_text<'a>(node: Node, content: &'a [u8]) -> &'a str {
    node.utf8_text(content).unwrap_or_else(|e| {
        tracing::debug!(
            "UTF-8 extraction failed at {}:{}: {}",
            node.start_position().row + 1,
            node.start_position().column,
            e
        );
        ""
    })
}

/// Text of the named field child, if present
pub fn field_text<'a>(node: Node, field: &str, content: &'a [u8]) -> Option<&'a str> {
    node.child_by_field_name(field)
        .map(|child| get_node_text(child, content))
        .filter(|text| !text.is_empty())
}

/// First child past any leading annotations or decorators, looking inside
/// a Java `modifiers` node. Falls back to `node` itself.
fn declaration_start(node: Node) -> Node {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "annotation" | "marker_annotation" | "decorator" | "line_comment"
            | "block_comment" | "comment" => continue,
            "modifiers" => {
                let mut inner = child.walk();
                let first_modifier = child
                    .children(&mut inner)
                    .find(|m| !matches!(m.kind(), "annotation" | "marker_annotation"));
                match first_modifier {
                    Some(modifier) => return modifier,
                    None => continue,
                }
            }
            _ => return child,
        }
    }
    node
}

/// 1-indexed line of the declaration itself, below any annotations
#[inline]
pub fn line_of(node: Node) -> u32 {
    declaration_start(node).start_position().row as u32 + 1
}

/// First line of a declaration with any opening body brace removed.
/// Leading annotations and decorators are skipped.
pub fn signature_of(node: Node, content: &[u8]) -> Option<String> {
    let start = declaration_start(node).start_byte();
    let text = content
        .get(start..node.end_byte())
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .unwrap_or_else(|| get_node_text(node, content));
    let first_line = text.lines().next()?;
    let trimmed = first_line.trim().trim_end_matches('{').trim_end();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_SIGNATURE_CHARS).collect())
}

/// Whether `node` has an anonymous child token of `kind` (e.g. `async`)
pub fn has_token(node: Node, kind: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| child.kind() == kind);
    found
}

/// Strip quotes from a string literal node's text
pub fn unquote(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

/// Pre-order visit of every named node under `root`, iteratively
pub fn visit_named<'t, F>(root: Node<'t>, mut visit: F)
where
    F: FnMut(Node<'t>),
{
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_named() {
            visit(node);
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// Whether any ancestor of `node` has one of `kinds`
pub fn has_ancestor(node: Node, kinds: &[&str]) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if kinds.contains(&parent.kind()) {
            return true;
        }
        current = parent.parent();
    }
    false
}

/// Execute a tree-sitter query and process every capture with a callback.
///
/// A query that does not compile against `language` yields nothing.
pub fn query_captures<'t, F>(
    language: &tree_sitter::Language,
    query_str: &str,
    root: Node<'t>,
    content: &[u8],
    mut callback: F,
) where
    F: FnMut(Node<'t>, &str),
{
    let query = match Query::new(language, query_str) {
        Ok(query) => query,
        Err(e) => {
            tracing::debug!("Query failed to compile: {}", e);
            return;
        }
    };

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, root, content);
    while let Some(m) = matches.next() {
        for cap in m.captures.iter() {
            callback(cap.node, get_node_text(cap.node, content));
        }
    }
}
