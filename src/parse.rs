use crate::model::Miss;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tree_sitter::{Language, Node, Parser, Tree};

/// A source file parsed outside any live compilation: path, text, and the
/// tree-sitter tree. Declarations found in it carry no compiler symbols,
/// only byte ranges (see `DeclRef`).
#[derive(Debug)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub source: String,
    tree: Tree,
}

impl ParsedFile {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn text(&self, node: Node<'_>) -> &str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    /// Find the node occupying exactly `start..end`, preferring the
    /// outermost node when wrappers share the range.
    pub fn node_for_range(&self, start: usize, end: usize) -> Option<Node<'_>> {
        let mut node = self.root().named_descendant_for_byte_range(start, end)?;
        while let Some(parent) = node.parent() {
            if parent.start_byte() == start && parent.end_byte() == end {
                node = parent;
            } else {
                break;
            }
        }
        Some(node)
    }
}

/// On-demand parse cache. Files are read and parsed standalone the first
/// time a resolution step touches them; reuse is purely an optimization,
/// correctness never depends on a file already being loaded.
pub struct Workspace {
    files: HashMap<PathBuf, Rc<ParsedFile>>,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
        }
    }

    pub fn load(&mut self, path: &Path) -> Result<Rc<ParsedFile>, Miss> {
        let canonical = fs::canonicalize(path).map_err(|_| {
            tracing::debug!(path = %path.display(), "file not readable");
            Miss::NotFound
        })?;
        if let Some(existing) = self.files.get(&canonical) {
            return Ok(Rc::clone(existing));
        }
        let source = fs::read_to_string(&canonical).map_err(|_| Miss::NotFound)?;
        let language = language_for_path(&canonical).ok_or(Miss::NotFound)?;
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|_| Miss::Malformed)?;
        let tree = parser.parse(&source, None).ok_or_else(|| {
            tracing::debug!(path = %canonical.display(), "parse failed");
            Miss::Malformed
        })?;
        let file = Rc::new(ParsedFile {
            path: canonical.clone(),
            source,
            tree,
        });
        self.files.insert(canonical, Rc::clone(&file));
        Ok(file)
    }

    /// Paths of every file touched so far, sorted. The batch cache tracks
    /// these for content-hash invalidation.
    pub fn loaded_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

fn language_for_path(path: &Path) -> Option<Language> {
    let ext = path.extension().and_then(|ext| ext.to_str())?;
    match ext {
        "ts" | "mts" | "cts" => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        "tsx" => Some(tree_sitter_typescript::LANGUAGE_TSX.into()),
        "js" | "jsx" | "mjs" | "cjs" => Some(tree_sitter_javascript::LANGUAGE.into()),
        _ => None,
    }
}

/// Strip expression wrappers (parens, await, as/satisfies casts, non-null
/// assertions) down to the interesting expression.
pub fn unwrap_expression(node: Node<'_>) -> Node<'_> {
    let mut current = node;
    loop {
        match current.kind() {
            "parenthesized_expression" => {
                let Some(inner) = current
                    .child_by_field_name("expression")
                    .or_else(|| current.named_child(0))
                else {
                    return current;
                };
                current = inner;
            }
            "await_expression" => {
                let Some(inner) = current
                    .child_by_field_name("argument")
                    .or_else(|| current.named_child(0))
                else {
                    return current;
                };
                current = inner;
            }
            "as_expression" | "satisfies_expression" | "type_assertion" | "non_null_expression" => {
                let Some(inner) = current
                    .child_by_field_name("expression")
                    .or_else(|| current.named_child(0))
                else {
                    return current;
                };
                current = inner;
            }
            _ => return current,
        }
    }
}

pub fn call_callee(node: Node<'_>) -> Option<Node<'_>> {
    node.child_by_field_name("function")
        .or_else(|| node.child_by_field_name("callee"))
}

pub fn call_arguments(node: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    let Some(args) = node.child_by_field_name("arguments") else {
        return out;
    };
    let mut cursor = args.walk();
    for child in args.named_children(&mut cursor) {
        out.push(child);
    }
    out
}

/// Object keys may be bare identifiers or quoted strings; registration
/// objects use both.
pub fn property_key_text(raw: &str) -> String {
    raw.trim().trim_matches('"').trim_matches('\'').to_string()
}

/// The initializing expression of a declaration node: a declarator's or
/// property pair's `value` field.
pub fn declaration_initializer(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "variable_declarator" | "pair" => node.child_by_field_name("value"),
        _ => None,
    }
}

/// Leading identifier of an expression or type text, e.g.
/// `AppRouter` from `AppRouter["billing"]` or `appRouter` from
/// `appRouter.billing`.
pub fn leading_identifier(text: &str) -> Option<String> {
    let trimmed = text.trim_start();
    let mut out = String::new();
    for ch in trimmed.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == '$' {
            out.push(ch);
        } else {
            break;
        }
    }
    if out.is_empty() { None } else { Some(out) }
}
