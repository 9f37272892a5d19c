//! Root-router location: explicit file+variable mode, or auto-discovery
//! over a directory tree skipping test, mock, and compiled-declaration
//! files.

use crate::config::NavConfig;
use crate::imports;
use crate::model::{DeclRef, Miss};
use crate::parse::Workspace;
use ignore::WalkBuilder;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "__tests__",
    "__mocks__",
    "tests",
    "test",
    "mocks",
    "coverage",
];

/// Find the root router declaration per configuration: the explicit
/// pointer when present, otherwise auto-discovery under the configured
/// root.
pub fn locate(ws: &mut Workspace, config: &NavConfig) -> Result<DeclRef, Miss> {
    if let Some(pointer) = &config.router {
        let path = if pointer.file_path.is_absolute() {
            pointer.file_path.clone()
        } else {
            config.base_dir.join(&pointer.file_path)
        };
        return locate_explicit(ws, &path, &pointer.variable_name);
    }
    discover(ws, &config.discovery_root(), config)
}

/// Explicit mode: the named variable must exist in the given file, either
/// as a declaration or reachable through a named re-export.
pub fn locate_explicit(
    ws: &mut Workspace,
    path: &Path,
    variable: &str,
) -> Result<DeclRef, Miss> {
    let file = ws.load(path).map_err(|miss| {
        tracing::debug!(path = %path.display(), "router file missing: RouterNotFound");
        miss
    })?;
    imports::resolve_identifier(ws, &file, variable).map_err(|miss| {
        tracing::debug!(variable, path = %path.display(), "RouterNotFound");
        miss
    })
}

/// Auto-discovery: enumerate source files under `root`, entry points
/// (`index.*`) first, and return the first declaration of the configured
/// main router name.
pub fn discover(ws: &mut Workspace, root: &Path, config: &NavConfig) -> Result<DeclRef, Miss> {
    for path in candidate_files(root, config) {
        let Ok(file) = ws.load(&path) else {
            continue;
        };
        if let Some(decl) = imports::find_value_declaration(&file, &config.main_router_name) {
            return Ok(decl);
        }
    }
    tracing::debug!(
        root = %root.display(),
        name = %config.main_router_name,
        "MainRouterNotFound"
    );
    Err(Miss::NotFound)
}

/// Source files eligible for discovery, sorted deterministically with
/// `index.*` entry points first.
pub fn candidate_files(root: &Path, config: &NavConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .require_git(false)
        .filter_entry(|entry| !is_excluded_entry(entry))
        .build();
    for entry in walker {
        let entry = match entry {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(%err, "walk error");
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        if !has_scanned_extension(path, config) || is_excluded_file(path) {
            continue;
        }
        files.push(path.to_path_buf());
    }
    files.sort_by_key(|path| {
        let is_entry = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(|stem| stem == "index" || stem == "index.d")
            .unwrap_or(false);
        (if is_entry { 0u8 } else { 1u8 }, path.clone())
    });
    files
}

fn is_excluded_entry(entry: &ignore::DirEntry) -> bool {
    if entry.file_name() == OsStr::new(".git") {
        return true;
    }
    if !entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .map(|name| EXCLUDED_DIRS.contains(&name))
        .unwrap_or(false)
}

fn has_scanned_extension(path: &Path, config: &NavConfig) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    config.file_extensions.iter().any(|allowed| allowed == ext)
}

/// Test, spec, and compiled-declaration files never define the live
/// router tree.
fn is_excluded_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return true;
    };
    name.ends_with(".d.ts")
        || name.contains(".test.")
        || name.contains(".spec.")
        || name.contains("_test.")
}
