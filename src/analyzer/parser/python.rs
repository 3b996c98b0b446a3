use tree_sitter::Node;

use super::traits::{
    ExtractedSymbol, ParsedFile, SymbolKind, field_text, get_node_text, has_token, line_of,
    query_captures, signature_of, unquote, visit_named,
};

const IMPORT_QUERIES: &[&str] = &[
    r#"(import_statement name: (dotted_name) @module)"#,
    r#"(import_statement name: (aliased_import name: (dotted_name) @module))"#,
    r#"(import_from_statement module_name: (_) @module)"#,
];

pub fn extract(
    grammar: &tree_sitter::Language,
    root: Node,
    content: &str,
    file: &mut ParsedFile,
) {
    let bytes = content.as_bytes();

    extract_imports(grammar, root, bytes, file);

    let dunder_all = dunder_all(root, bytes);
    let is_public = |name: &str| match &dunder_all {
        Some(names) => names.iter().any(|n| n == name),
        None => !name.starts_with('_'),
    };

    visit_named(root, |node| match node.kind() {
        "function_definition" => {
            let Some(name) = field_text(node, "name", bytes) else {
                return;
            };
            let kind = if enclosing_scope(node) == Some("class_definition") {
                SymbolKind::Method
            } else {
                SymbolKind::Function
            };
            file.add_symbol(
                ExtractedSymbol::new(name, kind, line_of(node))
                    .with_signature(signature_of(node, bytes))
                    .with_async(has_token(node, "async"))
                    .with_exported(is_public(name)),
            );
        }
        "class_definition" => {
            if let Some(name) = field_text(node, "name", bytes) {
                file.add_symbol(
                    ExtractedSymbol::new(name, SymbolKind::Class, line_of(node))
                        .with_signature(signature_of(node, bytes))
                        .with_exported(is_public(name)),
                );
            }
        }
        _ => {}
    });

    match dunder_all {
        Some(names) => names.into_iter().for_each(|n| file.add_export(n)),
        None => {
            for name in top_level_definitions(root, bytes) {
                if !name.starts_with('_') {
                    file.add_export(name);
                }
            }
        }
    }
}

fn extract_imports(
    grammar: &tree_sitter::Language,
    root: Node,
    content: &[u8],
    file: &mut ParsedFile,
) {
    let mut found: Vec<(usize, String)> = Vec::new();
    for query in IMPORT_QUERIES {
        query_captures(grammar, query, root, content, |node, text| {
            found.push((node.start_byte(), module_root(text)));
        });
    }
    found.sort_by_key(|(offset, _)| *offset);
    for (_, module) in found {
        file.add_import(module);
    }
}

/// Reduce a dotted module path to its top-level package.
///
/// Relative imports keep their leading dots and first segment
/// (`..models.user` becomes `..models`).
pub fn module_root(module: &str) -> String {
    let module = module.trim();
    let dots = module.len() - module.trim_start_matches('.').len();
    let rest = &module[dots..];
    let first = rest.split('.').next().unwrap_or_default().trim();
    format!("{}{}", &module[..dots], first)
}

/// Kind of the nearest enclosing function or class
fn enclosing_scope(node: Node) -> Option<&'static str> {
    let mut current = node.parent();
    while let Some(parent) = current {
        match parent.kind() {
            "class_definition" => return Some("class_definition"),
            "function_definition" => return Some("function_definition"),
            _ => current = parent.parent(),
        }
    }
    None
}

/// Names listed in a module-level `__all__` assignment
fn dunder_all(root: Node, content: &[u8]) -> Option<Vec<String>> {
    let mut names: Option<Vec<String>> = None;
    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        if statement.kind() != "expression_statement" {
            continue;
        }
        let mut inner = statement.walk();
        for assignment in statement.named_children(&mut inner) {
            if !matches!(assignment.kind(), "assignment" | "augmented_assignment") {
                continue;
            }
            if field_text(assignment, "left", content) != Some("__all__") {
                continue;
            }
            let Some(right) = assignment.child_by_field_name("right") else {
                continue;
            };
            let list = names.get_or_insert_with(Vec::new);
            let mut items = right.walk();
            for item in right.named_children(&mut items) {
                if item.kind() == "string" {
                    let name = unquote(get_node_text(item, content)).to_string();
                    if !name.is_empty() && !list.contains(&name) {
                        list.push(name);
                    }
                }
            }
        }
    }
    names
}

fn top_level_definitions(root: Node, content: &[u8]) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        let definition = if child.kind() == "decorated_definition" {
            child.child_by_field_name("definition")
        } else {
            Some(child)
        };
        let Some(definition) = definition else {
            continue;
        };
        if matches!(definition.kind(), "function_definition" | "class_definition")
            && let Some(name) = field_text(definition, "name", content)
        {
            names.push(name.to_string());
        }
    }
    names
}
