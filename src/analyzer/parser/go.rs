use tree_sitter::Node;

use super::traits::{
    ExtractedSymbol, ParsedFile, SymbolKind, field_text, line_of, query_captures, signature_of,
    unquote, visit_named,
};

const IMPORT_QUERY: &str = r#"(import_spec path: (_) @path)"#;

pub fn extract(
    grammar: &tree_sitter::Language,
    root: Node,
    content: &str,
    file: &mut ParsedFile,
) {
    let bytes = content.as_bytes();

    query_captures(grammar, IMPORT_QUERY, root, bytes, |_, text| {
        file.add_import(unquote(text));
    });

    let mut cursor = root.walk();
    for decl in root.named_children(&mut cursor) {
        match decl.kind() {
            "function_declaration" => {
                if let Some(name) = field_text(decl, "name", bytes) {
                    file.add_symbol(
                        ExtractedSymbol::new(name, SymbolKind::Function, line_of(decl))
                            .with_signature(signature_of(decl, bytes))
                            .with_exported(is_exported(name)),
                    );
                    if is_exported(name) {
                        file.add_export(name);
                    }
                }
            }
            "method_declaration" => {
                if let Some(name) = field_text(decl, "name", bytes) {
                    file.add_symbol(
                        ExtractedSymbol::new(name, SymbolKind::Method, line_of(decl))
                            .with_signature(signature_of(decl, bytes))
                            .with_exported(is_exported(name)),
                    );
                }
            }
            "type_declaration" => extract_types(decl, bytes, file),
            "const_declaration" | "var_declaration" => {
                visit_named(decl, |spec| {
                    if !matches!(spec.kind(), "const_spec" | "var_spec") {
                        return;
                    }
                    let mut names = spec.walk();
                    for ident in spec.children_by_field_name("name", &mut names) {
                        let name = ident.utf8_text(bytes).unwrap_or_default();
                        if is_exported(name) {
                            file.add_export(name);
                        }
                    }
                });
            }
            _ => {}
        }
    }
}

fn extract_types(decl: Node, content: &[u8], file: &mut ParsedFile) {
    let mut cursor = decl.walk();
    for spec in decl.named_children(&mut cursor) {
        if !matches!(spec.kind(), "type_spec" | "type_alias") {
            continue;
        }
        let Some(name) = field_text(spec, "name", content) else {
            continue;
        };

        let kind = match spec.child_by_field_name("type").map(|t| t.kind()) {
            Some("struct_type") => Some(SymbolKind::Struct),
            Some("interface_type") => Some(SymbolKind::Interface),
            _ => None,
        };
        if let Some(kind) = kind {
            file.add_symbol(
                ExtractedSymbol::new(name, kind, line_of(spec))
                    .with_signature(signature_of(spec, content))
                    .with_exported(is_exported(name)),
            );
        }
        if is_exported(name) {
            file.add_export(name);
        }
    }
}

/// Go exports by capitalisation
fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
