//! Identifier-to-declaration resolution, optionally crossing file and
//! package boundaries. This is the one shared capability used by both the
//! structure walker and the client-type resolver: local top-level search
//! first, then named imports, then re-exports, with compiled-declaration
//! files redirected back to their probable sources.

use crate::model::{DeclRef, Miss};
use crate::parse::{ParsedFile, Workspace, property_key_text};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tree_sitter::Node;

/// Bound on import/re-export hops while chasing one identifier.
const MAX_IMPORT_HOPS: usize = 8;

/// Suffixes probed when a module specifier has no extension, then again
/// under `index.*`.
const MODULE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "d.ts"];

/// Declaration-output directory conventions replaced by `src` when a
/// resolution lands on a compiled `.d.ts` file.
const DECLARATION_OUT_DIRS: &[&str] = &["dist", "build", "lib", "out"];

/// Resolve an identifier to the variable declaration that binds it,
/// searching the given file first and following imports/re-exports.
pub fn resolve_identifier(
    ws: &mut Workspace,
    file: &Rc<ParsedFile>,
    name: &str,
) -> Result<DeclRef, Miss> {
    resolve_in_space(ws, file, name, Space::Value, MAX_IMPORT_HOPS)
}

/// Resolve a type name to its `type X = ...` alias declaration.
pub fn resolve_type_identifier(
    ws: &mut Workspace,
    file: &Rc<ParsedFile>,
    name: &str,
) -> Result<DeclRef, Miss> {
    resolve_in_space(ws, file, name, Space::Type, MAX_IMPORT_HOPS)
}

#[derive(Clone, Copy, PartialEq)]
enum Space {
    Value,
    Type,
}

fn resolve_in_space(
    ws: &mut Workspace,
    file: &Rc<ParsedFile>,
    name: &str,
    space: Space,
    hops: usize,
) -> Result<DeclRef, Miss> {
    if name == "default" && space == Space::Value {
        if let Some(decl) = find_default_export(ws, file, hops)? {
            return Ok(decl);
        }
        return Err(Miss::NotFound);
    }
    let local = match space {
        Space::Value => find_value_declaration(file, name),
        Space::Type => find_type_alias(file, name),
    };
    if let Some(decl) = local {
        return Ok(decl);
    }
    if hops == 0 {
        tracing::debug!(name, "import hop limit reached");
        return Err(Miss::NotFound);
    }
    for (specifier, origin) in external_sources_for(file, name) {
        let Some(resolved) = resolve_module(&file.path, &specifier) else {
            continue;
        };
        let resolved = prefer_source_file(&resolved);
        let Ok(next) = ws.load(&resolved) else {
            continue;
        };
        if let Ok(decl) = resolve_in_space(ws, &next, &origin, space, hops - 1) {
            return Ok(decl);
        }
    }
    tracing::debug!(name, file = %file.path.display(), "identifier not bound");
    Err(Miss::NotFound)
}

/// Search top-level statements (including exported ones) for a variable
/// declarator binding `name`.
pub fn find_value_declaration(file: &Rc<ParsedFile>, name: &str) -> Option<DeclRef> {
    let root = file.root();
    let mut cursor = root.walk();
    for stmt in root.named_children(&mut cursor) {
        if let Some(decl) = value_declaration_in(file, stmt, name) {
            return Some(decl);
        }
    }
    None
}

fn value_declaration_in(file: &Rc<ParsedFile>, stmt: Node<'_>, name: &str) -> Option<DeclRef> {
    match stmt.kind() {
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = stmt.walk();
            for declarator in stmt.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                let name_node = declarator.child_by_field_name("name")?;
                if file.text(name_node) == name {
                    return Some(DeclRef::new(name, Rc::clone(file), declarator));
                }
            }
            None
        }
        "export_statement" => {
            let declaration = stmt.child_by_field_name("declaration")?;
            value_declaration_in(file, declaration, name)
        }
        _ => None,
    }
}

/// Search top-level statements for `type <name> = ...`.
pub fn find_type_alias(file: &Rc<ParsedFile>, name: &str) -> Option<DeclRef> {
    let root = file.root();
    let mut cursor = root.walk();
    for stmt in root.named_children(&mut cursor) {
        if let Some(decl) = type_alias_in(file, stmt, name) {
            return Some(decl);
        }
    }
    None
}

fn type_alias_in(file: &Rc<ParsedFile>, stmt: Node<'_>, name: &str) -> Option<DeclRef> {
    match stmt.kind() {
        "type_alias_declaration" => {
            let name_node = stmt.child_by_field_name("name")?;
            if file.text(name_node) == name {
                return Some(DeclRef::new(name, Rc::clone(file), stmt));
            }
            None
        }
        "export_statement" => {
            let declaration = stmt.child_by_field_name("declaration")?;
            type_alias_in(file, declaration, name)
        }
        _ => None,
    }
}

/// `export default <expr>`: return the expression itself when it is a
/// structured value, or chase it when it is a bare identifier.
fn find_default_export(
    ws: &mut Workspace,
    file: &Rc<ParsedFile>,
    hops: usize,
) -> Result<Option<DeclRef>, Miss> {
    let root = file.root();
    let mut cursor = root.walk();
    for stmt in root.named_children(&mut cursor) {
        if stmt.kind() != "export_statement" {
            continue;
        }
        let Some(value) = stmt.child_by_field_name("value") else {
            continue;
        };
        if value.kind() == "identifier" {
            let name = file.text(value).to_string();
            return resolve_in_space(ws, file, &name, Space::Value, hops).map(Some);
        }
        return Ok(Some(DeclRef::new("default", Rc::clone(file), value)));
    }
    Ok(None)
}

/// Module sources that could bind `name` in `file`: named imports first,
/// then named re-exports, then wildcard re-exports. Each entry is
/// `(specifier, name under which the target module binds it)`.
fn external_sources_for(file: &Rc<ParsedFile>, name: &str) -> Vec<(String, String)> {
    let mut named = Vec::new();
    let mut wildcard = Vec::new();
    let root = file.root();
    let mut cursor = root.walk();
    for stmt in root.named_children(&mut cursor) {
        match stmt.kind() {
            "import_statement" => {
                let Some(specifier) = module_specifier(file, stmt) else {
                    continue;
                };
                if let Some(origin) = imported_origin(file, stmt, name) {
                    named.push((specifier, origin));
                }
            }
            "export_statement" => {
                let Some(specifier) = module_specifier(file, stmt) else {
                    continue;
                };
                match reexport_clause(stmt) {
                    Some(clause) => {
                        if let Some(origin) = reexported_origin(file, clause, name) {
                            named.push((specifier, origin));
                        }
                    }
                    // `export * from ...` re-exports under the same name.
                    None => wildcard.push((specifier, name.to_string())),
                }
            }
            _ => {}
        }
    }
    named.extend(wildcard);
    named
}

fn module_specifier(file: &ParsedFile, stmt: Node<'_>) -> Option<String> {
    let source = stmt.child_by_field_name("source")?;
    let raw = property_key_text(file.text(source));
    if raw.is_empty() { None } else { Some(raw) }
}

/// Local name -> origin name for `import { a, b as c } from ...` and
/// `import d from ...` (the latter binds the module's default export).
fn imported_origin(file: &ParsedFile, stmt: Node<'_>, name: &str) -> Option<String> {
    let mut cursor = stmt.walk();
    for child in stmt.named_children(&mut cursor) {
        if child.kind() != "import_clause" {
            continue;
        }
        let mut clause_cursor = child.walk();
        for item in child.named_children(&mut clause_cursor) {
            match item.kind() {
                "identifier" if file.text(item) == name => {
                    return Some("default".to_string());
                }
                "named_imports" => {
                    let mut spec_cursor = item.walk();
                    for spec in item.named_children(&mut spec_cursor) {
                        if spec.kind() != "import_specifier" {
                            continue;
                        }
                        let origin = spec.child_by_field_name("name")?;
                        let local = spec
                            .child_by_field_name("alias")
                            .unwrap_or(origin);
                        if file.text(local) == name {
                            return Some(file.text(origin).to_string());
                        }
                    }
                }
                _ => {}
            }
        }
    }
    None
}

fn reexport_clause(stmt: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = stmt.walk();
    stmt.named_children(&mut cursor)
        .find(|child| child.kind() == "export_clause")
}

fn reexported_origin(file: &ParsedFile, clause: Node<'_>, name: &str) -> Option<String> {
    let mut cursor = clause.walk();
    for spec in clause.named_children(&mut cursor) {
        if spec.kind() != "export_specifier" {
            continue;
        }
        let origin = spec.child_by_field_name("name")?;
        let exported = spec.child_by_field_name("alias").unwrap_or(origin);
        if property_key_text(file.text(exported)) == name {
            return Some(property_key_text(file.text(origin)));
        }
    }
    None
}

/// Resolve a module specifier relative to the importing file. Relative
/// specifiers probe extensions and `index.*`; bare specifiers are looked
/// up in enclosing `node_modules` directories.
pub fn resolve_module(from_file: &Path, specifier: &str) -> Option<PathBuf> {
    let parent = from_file.parent()?;
    if specifier.starts_with("./") || specifier.starts_with("../") {
        return try_extensions(&parent.join(specifier));
    }
    resolve_package(parent, specifier)
}

/// Probe a base path the way a bundler would: as-is when it already names
/// a file, then source extensions, then `index.*` inside it. Extensions
/// are appended, not substituted, so dotted module names (`user.model`)
/// keep their full stem.
fn try_extensions(base: &Path) -> Option<PathBuf> {
    if base.extension().is_some() && base.is_file() {
        return Some(base.to_path_buf());
    }
    for ext in MODULE_EXTENSIONS {
        let candidate = with_appended_extension(base, ext);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    for ext in MODULE_EXTENSIONS {
        let candidate = with_appended_extension(&base.join("index"), ext);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

fn with_appended_extension(base: &Path, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Walk up from `start_dir` looking for `node_modules/<specifier>`; enter
/// the package via its manifest (`types`/`typings`/`main`) or the
/// conventional index files.
fn resolve_package(start_dir: &Path, specifier: &str) -> Option<PathBuf> {
    let mut dir = start_dir.to_path_buf();
    loop {
        let package_dir = dir.join("node_modules").join(specifier);
        if package_dir.is_dir() {
            if let Some(entry) = package_entry(&package_dir) {
                return Some(entry);
            }
        }
        if !dir.pop() {
            return None;
        }
    }
}

fn package_entry(package_dir: &Path) -> Option<PathBuf> {
    let manifest = package_dir.join("package.json");
    if let Ok(content) = std::fs::read_to_string(&manifest) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&content) {
            for field in ["types", "typings", "main"] {
                let Some(rel) = value.get(field).and_then(|v| v.as_str()) else {
                    continue;
                };
                if let Some(entry) = try_extensions(&package_dir.join(rel)) {
                    return Some(entry);
                }
            }
        }
    }
    try_extensions(&package_dir.join("index"))
        .or_else(|| try_extensions(&package_dir.join("src").join("index")))
        .or_else(|| try_extensions(&package_dir.join("dist").join("index")))
}

/// When resolution lands on a compiled declaration file, probe plausible
/// co-located sources (declaration-output directories swapped for `src`,
/// sibling `.ts`/`.tsx`). Falls back to the declaration file itself.
pub fn prefer_source_file(path: &Path) -> PathBuf {
    let display = path.to_string_lossy();
    if !display.ends_with(".d.ts") {
        return path.to_path_buf();
    }
    for candidate in source_candidates(path) {
        if candidate.is_file() {
            tracing::debug!(
                declaration = %path.display(),
                source = %candidate.display(),
                "redirected compiled declaration to source"
            );
            return candidate;
        }
    }
    path.to_path_buf()
}

fn source_candidates(declaration: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let display = declaration.to_string_lossy().to_string();
    let Some(stem) = display.strip_suffix(".d.ts") else {
        return out;
    };
    out.push(PathBuf::from(format!("{stem}.ts")));
    out.push(PathBuf::from(format!("{stem}.tsx")));
    for out_dir in DECLARATION_OUT_DIRS {
        let needle = format!("/{out_dir}/");
        if let Some(idx) = stem.rfind(&needle) {
            let swapped = format!("{}/src/{}", &stem[..idx], &stem[idx + needle.len()..]);
            out.push(PathBuf::from(format!("{swapped}.ts")));
            out.push(PathBuf::from(format!("{swapped}.tsx")));
        }
    }
    out
}
