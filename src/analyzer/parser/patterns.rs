//! Pattern-based Extraction
//!
//! Regex strategy used when a structured parse is unavailable. Two entry points:
//!
//! - [`PatternExtractor::imports`]: import specifiers only, used to fill in a
//!   structured result that found none
//! - [`PatternExtractor::extract`]: symbols, imports and exports, used when a
//!   grammar cannot be loaded
//!
//! Results are best effort. Matches inside comments or strings are not
//! filtered, and indentation stands in for nesting.

use regex::{Captures, Regex};

use super::Language;
use super::python::module_root;
use super::rust_lang::{use_leaves, use_roots};
use super::traits::{ExtractedSymbol, ParsedFile, SymbolKind};
use crate::types::{LensError, Result};

const JS_IDENT: &str = r"[A-Za-z_$][\w$]*";

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| LensError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// 1-indexed line of a byte offset
fn line_at(content: &str, offset: usize) -> u32 {
    content[..offset].matches('\n').count() as u32 + 1
}

/// The source line containing `offset`, trimmed of an opening body brace
fn line_signature(content: &str, offset: usize) -> Option<String> {
    let start = content[..offset].rfind('\n').map_or(0, |i| i + 1);
    let end = content[offset..]
        .find('\n')
        .map_or(content.len(), |i| offset + i);
    let line = content[start..end].trim().trim_end_matches('{').trim_end();
    (!line.is_empty()).then(|| line.to_string())
}

fn group<'h>(caps: &Captures<'h>, i: usize) -> &'h str {
    caps.get(i).map_or("", |m| m.as_str())
}

fn start(caps: &Captures) -> usize {
    caps.get(0).map_or(0, |m| m.start())
}

/// Values keyed by offset, emitted in source order
#[derive(Default)]
struct Ordered(Vec<(usize, String)>);

impl Ordered {
    fn push(&mut self, offset: usize, value: impl Into<String>) {
        self.0.push((offset, value.into()));
    }

    fn into_sorted(mut self) -> Vec<String> {
        self.0.sort_by_key(|(offset, _)| *offset);
        let mut out: Vec<String> = Vec::new();
        for (_, value) in self.0 {
            if !value.is_empty() && !out.contains(&value) {
                out.push(value);
            }
        }
        out
    }
}

// =============================================================================
// Pattern Extractor
// =============================================================================

pub struct PatternExtractor {
    js: JsPatterns,
    python: PythonPatterns,
    go: GoPatterns,
    rust: RustPatterns,
    java: JavaPatterns,
}

impl PatternExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            js: JsPatterns::new()?,
            python: PythonPatterns::new()?,
            go: GoPatterns::new()?,
            rust: RustPatterns::new()?,
            java: JavaPatterns::new()?,
        })
    }

    /// Import specifiers in first-seen order
    pub fn imports(&self, language: Language, content: &str) -> Vec<String> {
        match language {
            Language::TypeScript | Language::Tsx | Language::JavaScript | Language::Jsx => {
                self.js.imports(content)
            }
            Language::Python => self.python.imports(content),
            Language::Go => self.go.imports(content),
            Language::Rust => self.rust.imports(content),
            Language::Java => self.java.imports(content),
            Language::Unknown => Vec::new(),
        }
    }

    /// Full extraction. `has_tests` is left for the caller.
    pub fn extract(&self, path: &str, language: Language, content: &str) -> ParsedFile {
        let mut file = ParsedFile::new(path, language);
        file.imports = self.imports(language, content);
        match language {
            Language::TypeScript | Language::Tsx | Language::JavaScript | Language::Jsx => {
                self.js.symbols(content, &mut file)
            }
            Language::Python => self.python.symbols(content, &mut file),
            Language::Go => self.go.symbols(content, &mut file),
            Language::Rust => self.rust.symbols(content, &mut file),
            Language::Java => self.java.symbols(content, &mut file),
            Language::Unknown => {}
        }
        file.dedupe();
        file
    }
}

// =============================================================================
// JavaScript / TypeScript
// =============================================================================

struct JsPatterns {
    imports: Vec<Regex>,
    function: Regex,
    arrow: Regex,
    class: Regex,
    interface: Regex,
    enumeration: Regex,
    declared_export: Regex,
    default_export: Regex,
    clause_export: Regex,
    star_export: Regex,
    namespace_export: Regex,
}

impl JsPatterns {
    fn new() -> Result<Self> {
        Ok(Self {
            imports: vec![
                compile(r#"\bimport\s+(?:[^'";()]*?\bfrom\s*)?["']([^"']+)["']"#)?,
                compile(&format!(
                    r#"\bexport\s+(?:type\s+)?(?:\*(?:\s+as\s+{JS_IDENT})?|\{{[^}}]*\}})\s*from\s*["']([^"']+)["']"#
                ))?,
                compile(r#"\brequire\s*\(\s*["']([^"']+)["']\s*\)"#)?,
                compile(r#"\bimport\s*\(\s*["']([^"']+)["']\s*\)"#)?,
            ],
            function: compile(&format!(
                r"(?m)^[ \t]*(export\s+)?(?:default\s+)?(async\s+)?function\s*\*?\s*({JS_IDENT})"
            ))?,
            arrow: compile(&format!(
                r"(?m)^[ \t]*(export\s+)?(?:const|let|var)\s+({JS_IDENT})\s*(?::[^=\n]+)?=\s*(async\s+)?(?:function\b|\([^)]*\)\s*(?::[^=\n]+)?=>|{JS_IDENT}\s*=>)"
            ))?,
            class: compile(&format!(
                r"(?m)^[ \t]*(export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+({JS_IDENT})"
            ))?,
            interface: compile(&format!(r"(?m)^[ \t]*(export\s+)?interface\s+({JS_IDENT})"))?,
            enumeration: compile(&format!(
                r"(?m)^[ \t]*(export\s+)?(?:const\s+)?enum\s+({JS_IDENT})"
            ))?,
            declared_export: compile(&format!(
                r"\bexport\s+(?:declare\s+)?(?:async\s+)?(?:function\s*\*?|abstract\s+class|class|const|let|var|interface|type|enum|namespace)\s+({JS_IDENT})"
            ))?,
            default_export: compile(r"\bexport\s+default\b")?,
            clause_export: compile(r"\bexport\s+(?:type\s+)?\{([^}]*)\}")?,
            star_export: compile(r#"\bexport\s*\*\s*from\s*["']([^"']+)["']"#)?,
            namespace_export: compile(&format!(
                r#"\bexport\s*\*\s*as\s+({JS_IDENT})\s+from\s*["']([^"']+)["']"#
            ))?,
        })
    }

    fn imports(&self, content: &str) -> Vec<String> {
        let mut found = Ordered::default();
        for re in &self.imports {
            for caps in re.captures_iter(content) {
                found.push(start(&caps), group(&caps, 1));
            }
        }
        found.into_sorted()
    }

    fn symbols(&self, content: &str, file: &mut ParsedFile) {
        for caps in self.function.captures_iter(content) {
            push_symbol(file, content, &caps, 3, SymbolKind::Function, !group(&caps, 1).is_empty())
                .is_async = !group(&caps, 2).is_empty();
        }
        for caps in self.arrow.captures_iter(content) {
            push_symbol(file, content, &caps, 2, SymbolKind::Function, !group(&caps, 1).is_empty())
                .is_async = !group(&caps, 3).is_empty();
        }
        for (re, kind) in [
            (&self.class, SymbolKind::Class),
            (&self.interface, SymbolKind::Interface),
            (&self.enumeration, SymbolKind::Enum),
        ] {
            for caps in re.captures_iter(content) {
                push_symbol(file, content, &caps, 2, kind, !group(&caps, 1).is_empty());
            }
        }

        let mut exports = Ordered::default();
        for caps in self.declared_export.captures_iter(content) {
            exports.push(start(&caps), group(&caps, 1));
        }
        for m in self.default_export.find_iter(content) {
            exports.push(m.start(), "default");
        }
        for caps in self.clause_export.captures_iter(content) {
            let offset = start(&caps);
            for spec in group(&caps, 1).split(',') {
                let spec = spec.trim().trim_start_matches("type ").trim();
                let name = spec.rsplit(" as ").next().unwrap_or(spec).trim();
                exports.push(offset, name.trim_matches(|c| c == '"' || c == '\''));
            }
        }
        for caps in self.star_export.captures_iter(content) {
            exports.push(start(&caps), format!("* from {}", group(&caps, 1)));
        }
        for caps in self.namespace_export.captures_iter(content) {
            exports.push(
                start(&caps),
                format!("* as {} from {}", group(&caps, 1), group(&caps, 2)),
            );
        }
        file.exports = exports.into_sorted();
    }
}

/// Push a symbol built from capture `name_group`, returning it for tweaks
fn push_symbol<'f>(
    file: &'f mut ParsedFile,
    content: &str,
    caps: &Captures,
    name_group: usize,
    kind: SymbolKind,
    exported: bool,
) -> &'f mut ExtractedSymbol {
    let offset = caps.get(name_group).map_or(start(caps), |m| m.start());
    let symbol = ExtractedSymbol::new(group(caps, name_group), kind, line_at(content, offset))
        .with_signature(line_signature(content, offset))
        .with_exported(exported);
    let list = if kind.is_callable() {
        &mut file.functions
    } else {
        &mut file.classes
    };
    list.push(symbol);
    let last = list.len() - 1;
    &mut list[last]
}

// =============================================================================
// Python
// =============================================================================

struct PythonPatterns {
    import: Regex,
    from_import: Regex,
    def: Regex,
    class: Regex,
    dunder_all: Regex,
    quoted: Regex,
}

impl PythonPatterns {
    fn new() -> Result<Self> {
        Ok(Self {
            import: compile(
                r"(?m)^[ \t]*import\s+([\w.]+(?:\s+as\s+\w+)?(?:[ \t]*,[ \t]*[\w.]+(?:\s+as\s+\w+)?)*)",
            )?,
            from_import: compile(r"(?m)^[ \t]*from\s+(\.+[\w.]*|[\w.]+)\s+import\b")?,
            def: compile(r"(?m)^([ \t]*)(async\s+)?def\s+([A-Za-z_]\w*)")?,
            class: compile(r"(?m)^([ \t]*)class\s+([A-Za-z_]\w*)")?,
            dunder_all: compile(r"(?s)__all__\s*\+?=\s*[\[(](.*?)[\])]")?,
            quoted: compile(r#"["']([^"']+)["']"#)?,
        })
    }

    fn imports(&self, content: &str) -> Vec<String> {
        let mut found = Ordered::default();
        for caps in self.import.captures_iter(content) {
            let offset = start(&caps);
            for part in group(&caps, 1).split(',') {
                let module = part.split_whitespace().next().unwrap_or_default();
                found.push(offset, module_root(module));
            }
        }
        for caps in self.from_import.captures_iter(content) {
            let module = group(&caps, 1);
            if module != "__future__" {
                found.push(start(&caps), module_root(module));
            }
        }
        found.into_sorted()
    }

    fn symbols(&self, content: &str, file: &mut ParsedFile) {
        let dunder_all: Option<Vec<String>> = self.dunder_all.captures(content).map(|caps| {
            self.quoted
                .captures_iter(group(&caps, 1))
                .map(|c| group(&c, 1).to_string())
                .collect()
        });
        let is_public = |name: &str| match &dunder_all {
            Some(names) => names.iter().any(|n| n == name),
            None => !name.starts_with('_'),
        };

        let mut top_level = Ordered::default();
        for caps in self.def.captures_iter(content) {
            let name = group(&caps, 3);
            let nested = !group(&caps, 1).is_empty();
            let kind = if nested {
                SymbolKind::Method
            } else {
                top_level.push(start(&caps), name);
                SymbolKind::Function
            };
            push_symbol(file, content, &caps, 3, kind, is_public(name)).is_async =
                !group(&caps, 2).is_empty();
        }
        for caps in self.class.captures_iter(content) {
            let name = group(&caps, 2);
            if group(&caps, 1).is_empty() {
                top_level.push(start(&caps), name);
            }
            push_symbol(file, content, &caps, 2, SymbolKind::Class, is_public(name));
        }

        file.exports = match dunder_all {
            Some(names) => names,
            None => top_level
                .into_sorted()
                .into_iter()
                .filter(|n| !n.starts_with('_'))
                .collect(),
        };
    }
}

// =============================================================================
// Go
// =============================================================================

struct GoPatterns {
    single_import: Regex,
    block_import: Regex,
    quoted: Regex,
    func: Regex,
    type_decl: Regex,
    value_decl: Regex,
}

impl GoPatterns {
    fn new() -> Result<Self> {
        Ok(Self {
            single_import: compile(r#"(?m)^[ \t]*import\s+(?:[\w.]+\s+)?["`]([^"`]+)["`]"#)?,
            block_import: compile(r"(?s)\bimport\s*\((.*?)\)")?,
            quoted: compile(r#"["`]([^"`]+)["`]"#)?,
            func: compile(r"(?m)^func\s+(\([^)]*\)\s*)?([A-Za-z_]\w*)")?,
            type_decl: compile(r"(?m)^type\s+([A-Za-z_]\w*)(?:\[[^\]]*\])?\s+(struct|interface)?")?,
            value_decl: compile(r"(?m)^(?:const|var)\s+([A-Za-z_]\w*)")?,
        })
    }

    fn imports(&self, content: &str) -> Vec<String> {
        let mut found = Ordered::default();
        for caps in self.single_import.captures_iter(content) {
            found.push(start(&caps), group(&caps, 1));
        }
        for caps in self.block_import.captures_iter(content) {
            let Some(block) = caps.get(1) else { continue };
            for inner in self.quoted.captures_iter(block.as_str()) {
                found.push(block.start() + start(&inner), group(&inner, 1));
            }
        }
        found.into_sorted()
    }

    fn symbols(&self, content: &str, file: &mut ParsedFile) {
        let exported = |name: &str| name.chars().next().is_some_and(char::is_uppercase);
        let mut exports = Ordered::default();

        for caps in self.func.captures_iter(content) {
            let name = group(&caps, 2);
            let is_method = !group(&caps, 1).is_empty();
            let kind = if is_method {
                SymbolKind::Method
            } else {
                SymbolKind::Function
            };
            if !is_method && exported(name) {
                exports.push(start(&caps), name);
            }
            push_symbol(file, content, &caps, 2, kind, exported(name));
        }
        for caps in self.type_decl.captures_iter(content) {
            let name = group(&caps, 1);
            if exported(name) {
                exports.push(start(&caps), name);
            }
            let kind = match group(&caps, 2) {
                "struct" => SymbolKind::Struct,
                "interface" => SymbolKind::Interface,
                _ => continue,
            };
            push_symbol(file, content, &caps, 1, kind, exported(name));
        }
        for caps in self.value_decl.captures_iter(content) {
            let name = group(&caps, 1);
            if exported(name) {
                exports.push(start(&caps), name);
            }
        }
        file.exports = exports.into_sorted();
    }
}

// =============================================================================
// Rust
// =============================================================================

struct RustPatterns {
    use_decl: Regex,
    extern_crate: Regex,
    function: Regex,
    item: Regex,
    pub_item: Regex,
}

impl RustPatterns {
    fn new() -> Result<Self> {
        Ok(Self {
            use_decl: compile(r"(?m)^([ \t]*)(pub(?:\([^)]*\))?\s+)?use\s+([^;]+);")?,
            extern_crate: compile(r"(?m)^[ \t]*extern\s+crate\s+(\w+)")?,
            function: compile(
                r#"(?m)^([ \t]*)(pub(?:\([^)]*\))?\s+)?((?:(?:const|async|unsafe|default)\s+|extern\s+"[^"]*"\s+)*)fn\s+([A-Za-z_]\w*)"#,
            )?,
            item: compile(r"(?m)^([ \t]*)(pub(?:\([^)]*\))?\s+)?(struct|enum|trait)\s+([A-Za-z_]\w*)")?,
            pub_item: compile(
                r"(?m)^pub\s+(?:(?:const|async|unsafe)\s+)*(?:fn|struct|enum|trait|type|const|static|mod|union)\s+([A-Za-z_]\w*)",
            )?,
        })
    }

    fn imports(&self, content: &str) -> Vec<String> {
        let mut found = Ordered::default();
        for caps in self.use_decl.captures_iter(content) {
            for krate in use_roots(group(&caps, 3)) {
                found.push(start(&caps), krate);
            }
        }
        for caps in self.extern_crate.captures_iter(content) {
            found.push(start(&caps), group(&caps, 1));
        }
        found.into_sorted()
    }

    fn symbols(&self, content: &str, file: &mut ParsedFile) {
        let is_pub = |caps: &Captures| group(caps, 2).trim() == "pub";

        for caps in self.function.captures_iter(content) {
            // Indented functions are assumed to live in an impl or trait
            let kind = if group(&caps, 1).is_empty() {
                SymbolKind::Function
            } else {
                SymbolKind::Method
            };
            push_symbol(file, content, &caps, 4, kind, is_pub(&caps)).is_async =
                group(&caps, 3).contains("async");
        }
        for caps in self.item.captures_iter(content) {
            let kind = match group(&caps, 3) {
                "struct" => SymbolKind::Struct,
                "enum" => SymbolKind::Enum,
                _ => SymbolKind::Trait,
            };
            push_symbol(file, content, &caps, 4, kind, is_pub(&caps));
        }

        let mut exports = Ordered::default();
        for caps in self.pub_item.captures_iter(content) {
            exports.push(start(&caps), group(&caps, 1));
        }
        for caps in self.use_decl.captures_iter(content) {
            if group(&caps, 1).is_empty() && is_pub(&caps) {
                for leaf in use_leaves(group(&caps, 3)) {
                    exports.push(start(&caps), leaf);
                }
            }
        }
        file.exports = exports.into_sorted();
    }
}

// =============================================================================
// Java
// =============================================================================

/// Words the method pattern can mistake for a return type. Modifiers appear
/// here so constructors are left to the constructor pattern.
const JAVA_NOT_A_TYPE: &[&str] = &[
    "return", "new", "else", "throw", "case", "yield", "await", "public", "protected", "private",
    "static", "final", "abstract", "synchronized", "native", "default",
];
const JAVA_NOT_A_NAME: &[&str] = &["if", "for", "while", "switch", "catch", "synchronized", "return"];

struct JavaPatterns {
    import: Regex,
    type_decl: Regex,
    method: Regex,
    constructor: Regex,
}

impl JavaPatterns {
    fn new() -> Result<Self> {
        Ok(Self {
            import: compile(r"(?m)^[ \t]*import\s+(?:static\s+)?([\w.]+(?:\.\*)?)\s*;")?,
            type_decl: compile(
                r"(?m)^[ \t]*((?:(?:public|protected|private|static|final|abstract|sealed|non-sealed|strictfp)\s+)*)(class|interface|enum|record|@interface)\s+([A-Za-z_]\w*)",
            )?,
            method: compile(
                r"(?m)^[ \t]*((?:(?:public|protected|private|static|final|abstract|synchronized|native|default|strictfp)\s+)*)(?:<[^>]*>\s+)?([\w$.<>\[\],? ]+?)\s+([A-Za-z_$][\w$]*)\s*\([^)]*\)\s*(?:throws\s+[\w.,\s]+)?[{;]",
            )?,
            constructor: compile(
                r"(?m)^[ \t]*((?:public|protected|private)\s+)([A-Z]\w*)\s*\([^)]*\)\s*(?:throws\s+[\w.,\s]+)?\{",
            )?,
        })
    }

    fn imports(&self, content: &str) -> Vec<String> {
        let mut found = Ordered::default();
        for caps in self.import.captures_iter(content) {
            found.push(start(&caps), group(&caps, 1));
        }
        found.into_sorted()
    }

    fn symbols(&self, content: &str, file: &mut ParsedFile) {
        let is_public = |modifiers: &str| modifiers.split_whitespace().any(|m| m == "public");
        let mut exports = Ordered::default();

        for caps in self.type_decl.captures_iter(content) {
            let public = is_public(group(&caps, 1));
            let kind = match group(&caps, 2) {
                "interface" | "@interface" => SymbolKind::Interface,
                "enum" => SymbolKind::Enum,
                _ => SymbolKind::Class,
            };
            if public {
                exports.push(start(&caps), group(&caps, 3));
            }
            push_symbol(file, content, &caps, 3, kind, public);
        }
        for caps in self.method.captures_iter(content) {
            let return_type = group(&caps, 2).split_whitespace().last().unwrap_or_default();
            let name = group(&caps, 3);
            if JAVA_NOT_A_TYPE.contains(&return_type) || JAVA_NOT_A_NAME.contains(&name) {
                continue;
            }
            let public = is_public(group(&caps, 1));
            push_symbol(file, content, &caps, 3, SymbolKind::Method, public);
        }
        for caps in self.constructor.captures_iter(content) {
            let public = is_public(group(&caps, 1));
            push_symbol(file, content, &caps, 2, SymbolKind::Method, public);
        }
        file.exports = exports.into_sorted();
    }
}
