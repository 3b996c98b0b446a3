//! TypeScript / JavaScript extraction (also TSX and JSX).

use tree_sitter::Node;

use super::traits::{
    ExtractedSymbol, ParsedFile, SymbolKind, field_text, get_node_text, has_ancestor, has_token,
    line_of, query_captures, signature_of, unquote, visit_named,
};

const IMPORT_QUERIES: &[&str] = &[
    r#"(import_statement source: (string) @source)"#,
    r#"(export_statement source: (string) @source)"#,
    r#"((call_expression
        function: (identifier) @_fn
        arguments: (arguments . (string) @source))
      (#eq? @_fn "require"))"#,
    r#"(call_expression
        function: (import)
        arguments: (arguments . (string) @source))"#,
];

pub fn extract(
    grammar: &tree_sitter::Language,
    root: Node,
    content: &str,
    file: &mut ParsedFile,
) {
    let bytes = content.as_bytes();

    extract_imports(grammar, root, bytes, file);
    extract_symbols(root, bytes, file);
    extract_exports(root, bytes, file);
}

fn extract_imports(
    grammar: &tree_sitter::Language,
    root: Node,
    content: &[u8],
    file: &mut ParsedFile,
) {
    // One query per form, merged back into source order
    let mut found: Vec<(usize, String)> = Vec::new();
    for query in IMPORT_QUERIES {
        query_captures(grammar, query, root, content, |node, text| {
            if node.kind() == "string" {
                found.push((node.start_byte(), unquote(text).to_string()));
            }
        });
    }
    found.sort_by_key(|(offset, _)| *offset);
    for (_, source) in found {
        file.add_import(source);
    }
}

fn extract_symbols(root: Node, content: &[u8], file: &mut ParsedFile) {
    visit_named(root, |node| match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            if let Some(name) = field_text(node, "name", content) {
                file.add_symbol(
                    ExtractedSymbol::new(name, SymbolKind::Function, line_of(node))
                        .with_signature(signature_of(node, content))
                        .with_async(has_token(node, "async"))
                        .with_exported(is_exported(node)),
                );
            }
        }
        "class_declaration" | "abstract_class_declaration" => {
            if let Some(name) = field_text(node, "name", content) {
                file.add_symbol(
                    ExtractedSymbol::new(name, SymbolKind::Class, line_of(node))
                        .with_signature(signature_of(node, content))
                        .with_exported(is_exported(node)),
                );
            }
        }
        "interface_declaration" => {
            if let Some(name) = field_text(node, "name", content) {
                file.add_symbol(
                    ExtractedSymbol::new(name, SymbolKind::Interface, line_of(node))
                        .with_signature(signature_of(node, content))
                        .with_exported(is_exported(node)),
                );
            }
        }
        "enum_declaration" => {
            if let Some(name) = field_text(node, "name", content) {
                file.add_symbol(
                    ExtractedSymbol::new(name, SymbolKind::Enum, line_of(node))
                        .with_signature(signature_of(node, content))
                        .with_exported(is_exported(node)),
                );
            }
        }
        "method_definition" | "abstract_method_signature" => {
            if let Some(name) = field_text(node, "name", content) {
                let exported = node
                    .parent()
                    .and_then(|body| body.parent())
                    .is_some_and(is_exported);
                file.add_symbol(
                    ExtractedSymbol::new(name, SymbolKind::Method, line_of(node))
                        .with_signature(signature_of(node, content))
                        .with_async(has_token(node, "async"))
                        .with_exported(exported),
                );
            }
        }
        "variable_declarator" => {
            // const handler = async () => { ... }
            let Some(value) = node.child_by_field_name("value") else {
                return;
            };
            if !matches!(
                value.kind(),
                "arrow_function" | "function_expression" | "function" | "generator_function"
            ) {
                return;
            }
            if has_ancestor(node, &["function_declaration", "method_definition", "arrow_function"]) {
                return;
            }
            if let Some(name) = field_text(node, "name", content) {
                let declaration = node.parent().unwrap_or(node);
                file.add_symbol(
                    ExtractedSymbol::new(name, SymbolKind::Function, line_of(node))
                        .with_signature(signature_of(declaration, content))
                        .with_async(has_token(value, "async"))
                        .with_exported(is_exported(declaration)),
                );
            }
        }
        _ => {}
    });
}

/// Directly wrapped in an `export` statement
fn is_exported(node: Node) -> bool {
    node.parent()
        .is_some_and(|parent| parent.kind() == "export_statement")
}

fn extract_exports(root: Node, content: &[u8], file: &mut ParsedFile) {
    visit_named(root, |node| {
        if node.kind() == "export_statement" {
            export_names(node, content, file);
        }
    });
}

fn export_names(node: Node, content: &[u8], file: &mut ParsedFile) {
    if has_token(node, "default") {
        file.add_export("default");
        return;
    }

    let source = node
        .child_by_field_name("source")
        .map(|s| unquote(get_node_text(s, content)).to_string());

    if let Some(declaration) = node.child_by_field_name("declaration") {
        match declaration.kind() {
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = declaration.walk();
                for declarator in declaration.named_children(&mut cursor) {
                    if declarator.kind() == "variable_declarator"
                        && let Some(name) = field_text(declarator, "name", content)
                    {
                        file.add_export(name);
                    }
                }
            }
            _ => {
                if let Some(name) = field_text(declaration, "name", content) {
                    file.add_export(name);
                }
            }
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "export_clause" => {
                let mut inner = child.walk();
                for specifier in child.named_children(&mut inner) {
                    if specifier.kind() != "export_specifier" {
                        continue;
                    }
                    let exported = field_text(specifier, "alias", content)
                        .or_else(|| field_text(specifier, "name", content));
                    if let Some(name) = exported {
                        file.add_export(unquote(name));
                    }
                }
            }
            "namespace_export" => {
                let mut inner = child.walk();
                let alias = child
                    .named_children(&mut inner)
                    .last()
                    .map(|n| unquote(get_node_text(n, content)).to_string())
                    .unwrap_or_default();
                if let Some(src) = &source {
                    file.add_export(format!("* as {} from {}", alias, src));
                }
            }
            "*" => {
                if let Some(src) = &source {
                    file.add_export(format!("* from {}", src));
                }
            }
            _ => {}
        }
    }
}
