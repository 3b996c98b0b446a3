use tree_sitter::Node;

use super::traits::{
    ExtractedSymbol, ParsedFile, SymbolKind, field_text, get_node_text, line_of, signature_of,
    visit_named,
};

pub fn extract(root: Node, content: &str, file: &mut ParsedFile) {
    let bytes = content.as_bytes();

    visit_named(root, |node| {
        let kind = match node.kind() {
            "import_declaration" => {
                if let Some(name) = import_name(get_node_text(node, bytes)) {
                    file.add_import(name);
                }
                return;
            }
            "class_declaration" | "record_declaration" => SymbolKind::Class,
            "interface_declaration" | "annotation_type_declaration" => SymbolKind::Interface,
            "enum_declaration" => SymbolKind::Enum,
            "method_declaration" | "constructor_declaration" => SymbolKind::Method,
            _ => return,
        };
        let Some(name) = field_text(node, "name", bytes) else {
            return;
        };

        let public = is_public(node, bytes);
        file.add_symbol(
            ExtractedSymbol::new(name, kind, line_of(node))
                .with_signature(signature_of(node, bytes))
                .with_exported(public),
        );
        if public && !kind.is_callable() {
            file.add_export(name);
        }
    });
}

/// `import static a.b.C.*;` becomes `a.b.C.*`
fn import_name(statement: &str) -> Option<String> {
    let name = statement
        .trim()
        .strip_prefix("import")?
        .trim_start()
        .trim_start_matches("static ")
        .trim()
        .trim_end_matches(';')
        .trim();
    let name: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    (!name.is_empty()).then_some(name)
}

fn is_public(node: Node, content: &[u8]) -> bool {
    let mut cursor = node.walk();
    let public = node.children(&mut cursor).any(|child| {
        child.kind() == "modifiers"
            && get_node_text(child, content)
                .split_whitespace()
                .any(|m| m == "public")
    });
    public
}
