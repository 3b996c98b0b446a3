use tree_sitter::Node;

use super::traits::{
    ExtractedSymbol, ParsedFile, SymbolKind, field_text, get_node_text, has_ancestor, has_token,
    line_of, signature_of, visit_named,
};

/// Path roots that never name an external crate
const LOCAL_ROOTS: &[&str] = &["self", "super", "crate", "Self"];

pub fn extract(root: Node, content: &str, file: &mut ParsedFile) {
    let bytes = content.as_bytes();

    visit_named(root, |node| match node.kind() {
        "use_declaration" => {
            if let Some(argument) = field_text(node, "argument", bytes) {
                for krate in use_roots(argument) {
                    file.add_import(krate);
                }
            }
        }
        "extern_crate_declaration" => {
            if let Some(name) = field_text(node, "name", bytes) {
                file.add_import(name);
            }
        }
        "function_item" | "function_signature_item" => {
            let Some(name) = field_text(node, "name", bytes) else {
                return;
            };
            let in_impl = has_ancestor(node, &["impl_item", "trait_item"]);
            let kind = if in_impl {
                SymbolKind::Method
            } else {
                SymbolKind::Function
            };
            // Trait items, default methods included, share the trait's visibility
            let exported = match enclosing_trait(node) {
                Some(trait_item) => is_pub(trait_item, bytes),
                None => is_pub(node, bytes),
            };
            file.add_symbol(
                ExtractedSymbol::new(name, kind, line_of(node))
                    .with_signature(signature_of(node, bytes))
                    .with_async(is_async(node))
                    .with_exported(exported),
            );
        }
        "struct_item" | "enum_item" | "trait_item" => {
            let kind = match node.kind() {
                "struct_item" => SymbolKind::Struct,
                "enum_item" => SymbolKind::Enum,
                _ => SymbolKind::Trait,
            };
            if let Some(name) = field_text(node, "name", bytes) {
                file.add_symbol(
                    ExtractedSymbol::new(name, kind, line_of(node))
                        .with_signature(signature_of(node, bytes))
                        .with_exported(is_pub(node, bytes)),
                );
            }
        }
        _ => {}
    });

    extract_exports(root, bytes, file);
}

/// Module-level `pub` items and `pub use` leaf names
fn extract_exports(root: Node, content: &[u8], file: &mut ParsedFile) {
    let mut cursor = root.walk();
    for item in root.named_children(&mut cursor) {
        if !is_pub(item, content) {
            continue;
        }
        match item.kind() {
            "use_declaration" => {
                if let Some(argument) = field_text(item, "argument", content) {
                    for leaf in use_leaves(argument) {
                        file.add_export(leaf);
                    }
                }
            }
            "function_item" | "struct_item" | "enum_item" | "trait_item" | "type_item"
            | "const_item" | "static_item" | "mod_item" | "union_item" => {
                if let Some(name) = field_text(item, "name", content) {
                    file.add_export(name);
                }
            }
            _ => {}
        }
    }
}

/// Plain `pub`; restricted forms like `pub(crate)` stay internal
fn is_pub(node: Node, content: &[u8]) -> bool {
    let mut cursor = node.walk();
    let visible = node
        .children(&mut cursor)
        .any(|c| c.kind() == "visibility_modifier" && get_node_text(c, content) == "pub");
    visible
}

fn is_async(node: Node) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| c.kind() == "function_modifiers" && has_token(c, "async"));
    found
}

/// The trait whose body directly declares `node`
fn enclosing_trait(node: Node) -> Option<Node> {
    let body = node.parent().filter(|p| p.kind() == "declaration_list")?;
    body.parent().filter(|p| p.kind() == "trait_item")
}

// =============================================================================
// Use-tree text helpers
// =============================================================================

/// Split on `sep` outside of braces
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts.into_iter().map(str::trim).filter(|p| !p.is_empty()).collect()
}

/// Inside of the outermost `{ ... }`, with the text before it
fn split_group(tree: &str) -> Option<(&str, &str)> {
    let open = tree.find('{')?;
    let close = tree.rfind('}')?;
    (close > open).then(|| (&tree[..open], &tree[open + 1..close]))
}

/// Crate names a use tree reaches into, excluding local roots.
///
/// `std::{fs, io}` yields `std`; `{serde::Serialize, anyhow::Result}` yields
/// `serde` and `anyhow`.
pub fn use_roots(tree: &str) -> Vec<String> {
    let tree = tree.trim().trim_start_matches("::");
    if tree.starts_with('{') {
        return split_group(tree)
            .map(|(_, inner)| {
                split_top_level(inner, ',')
                    .into_iter()
                    .flat_map(use_roots)
                    .collect()
            })
            .unwrap_or_default();
    }

    let first = tree
        .split("::")
        .next()
        .and_then(|segment| segment.split_whitespace().next())
        .unwrap_or_default();
    if first.is_empty() || first == "*" || LOCAL_ROOTS.contains(&first) {
        Vec::new()
    } else {
        vec![first.to_string()]
    }
}

/// Names a use tree binds locally (`a::{B, c::D as E}` yields `B`, `E`)
pub fn use_leaves(tree: &str) -> Vec<String> {
    let tree = tree.trim();
    if let Some((prefix, inner)) = split_group(tree) {
        let parent = prefix.trim().trim_end_matches("::").rsplit("::").next();
        return split_top_level(inner, ',')
            .into_iter()
            .flat_map(|part| {
                if part == "self" {
                    parent
                        .filter(|p| !p.is_empty())
                        .map(|p| vec![p.to_string()])
                        .unwrap_or_default()
                } else {
                    use_leaves(part)
                }
            })
            .collect();
    }

    let leaf = match tree.split_once(" as ") {
        Some((_, alias)) => alias.trim(),
        None => tree.rsplit("::").next().unwrap_or_default().trim(),
    };
    if leaf.is_empty() || leaf == "*" || leaf == "_" {
        Vec::new()
    } else {
        vec![leaf.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::parser::{GrammarCache, Language};

    fn parse(source: &str) -> ParsedFile {
        let cache = GrammarCache::new();
        cache.initialize();
        let tree = cache.parse(source, Language::Rust).unwrap();
        assert!(!tree.root_node().has_error());
        let mut file = ParsedFile::new("lib.rs", Language::Rust);
        extract(tree.root_node(), source, &mut file);
        file.dedupe();
        file
    }

    #[test]
    fn test_trait_methods_follow_trait_visibility() {
        let file = parse(
            "pub trait Store {\n    fn get(&self) -> u8;\n    fn len(&self) -> usize {\n        fn inner() {}\n        0\n    }\n}\n\ntrait Hidden {\n    fn peek(&self) {}\n}\n",
        );
        let exported = |name: &str| {
            file.functions
                .iter()
                .find(|f| f.name == name)
                .map(|f| f.is_exported)
                .unwrap()
        };
        assert!(exported("get"));
        assert!(exported("len"));
        assert!(!exported("inner"));
        assert!(!exported("peek"));
    }

    #[test]
    fn test_use_roots() {
        assert_eq!(use_roots("std::collections::HashMap"), vec!["std"]);
        assert_eq!(use_roots("serde::{Deserialize, Serialize}"), vec!["serde"]);
        assert_eq!(use_roots("{anyhow::Result, tokio::fs}"), vec!["anyhow", "tokio"]);
        assert_eq!(use_roots("::regex::Regex"), vec!["regex"]);
        assert_eq!(use_roots("foo as bar"), vec!["foo"]);
        assert!(use_roots("crate::types::Result").is_empty());
        assert!(use_roots("super::*").is_empty());
        assert!(use_roots("self::inner").is_empty());
    }

    #[test]
    fn test_use_leaves() {
        assert_eq!(use_leaves("crate::store::Store"), vec!["Store"]);
        assert_eq!(
            use_leaves("crate::store::{Backend, Snapshot as Snap}"),
            vec!["Backend", "Snap"]
        );
        assert_eq!(use_leaves("a::{self, b::{C, D}}"), vec!["a", "C", "D"]);
        assert!(use_leaves("prelude::*").is_empty());
    }

    #[test]
    fn test_fixture() {
        let file = parse(include_str!("../../../tests/fixtures/sample.rs"));

        assert_eq!(file.imports, vec!["std", "serde", "tracing"]);
        assert_eq!(
            file.exports,
            vec!["Backend", "Snap", "MAX_ENTRIES", "Cache", "Policy", "Evict"]
        );

        let refresh = file.functions.iter().find(|f| f.name == "refresh").unwrap();
        assert_eq!(refresh.kind, SymbolKind::Method);
        assert!(refresh.is_async);
        assert!(refresh.is_exported);

        let internal = file.functions.iter().find(|f| f.name == "internal").unwrap();
        assert_eq!(internal.kind, SymbolKind::Function);
        assert!(!internal.is_exported);

        let evict = file.functions.iter().find(|f| f.name == "evict").unwrap();
        assert!(evict.is_exported);

        assert!(file.classes.iter().any(|c| c.name == "Cache" && c.kind == SymbolKind::Struct));
        assert!(file.classes.iter().any(|c| c.name == "Policy" && c.kind == SymbolKind::Enum));
        assert!(file.classes.iter().any(|c| c.name == "Evict" && c.kind == SymbolKind::Trait));
    }
}
