//! Path navigation: walk a dotted client path segment by segment down
//! the router tree, degrading gracefully to the deepest resolvable
//! declaration when a segment is missing or trailing segments are hook
//! calls rather than structure.

use crate::config::NavConfig;
use crate::model::{DeclRef, NavigationTarget, ProcedureMapping, TargetKind};
use crate::parse::Workspace;
use crate::structure;

/// Navigate `path` (dotted, with or without the leading client variable)
/// from the root router declaration. `variable` is the client variable
/// this request uses; it may differ from the configured batch-key prefix.
/// Always lands somewhere: a missing segment returns the deepest router
/// resolved so far rather than a failure.
pub fn navigate(
    ws: &mut Workspace,
    root: &DeclRef,
    path: &str,
    variable: &str,
    config: &NavConfig,
) -> NavigationTarget {
    let segments = path_segments(path, variable, config);
    let mut current = root.clone();
    for (idx, segment) in segments.iter().enumerate() {
        if idx == config.max_depth {
            tracing::debug!(path, depth = config.max_depth, "depth bound reached");
            break;
        }
        match structure::resolve_child(ws, &current, segment, config) {
            Ok(child) => {
                let last = idx + 1 == segments.len();
                if child.kind == TargetKind::Router && !last {
                    current = child.decl;
                    continue;
                }
                // A procedure mid-path means the trailing segments are
                // hook or method calls (`.useQuery`, `.invalidate`).
                return target_for(&child.decl, child.kind);
            }
            Err(miss) => {
                tracing::debug!(path, segment = %segment, ?miss, "segment unresolved");
                break;
            }
        }
    }
    target_for(&current, TargetKind::Router)
}

/// Split a dotted path into router-tree segments, dropping a leading
/// client-variable or utils-accessor prefix. The request's own variable
/// counts as a prefix even when it differs from the configured one.
fn path_segments<'p>(path: &'p str, variable: &str, config: &NavConfig) -> Vec<&'p str> {
    let mut segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    if segments
        .first()
        .is_some_and(|first| *first == variable || *first == config.api_variable_name)
    {
        segments.remove(0);
    }
    if segments.first() == Some(&config.patterns.utils_method.as_str()) {
        segments.remove(0);
    }
    segments
}

/// The navigation target for a declaration: span of the name token
/// (declarator name, property key, or type alias name), 1-based
/// line/column. When no name node can be isolated the span covers the
/// declaration's first line.
pub fn target_for(decl: &DeclRef, kind: TargetKind) -> NavigationTarget {
    let procedure_name = match kind {
        TargetKind::Procedure | TargetKind::InlineProcedure => Some(decl.name.clone()),
        TargetKind::Router => None,
    };
    if let Some(node) = decl.node() {
        let name_node = match node.kind() {
            "variable_declarator" | "type_alias_declaration" => node.child_by_field_name("name"),
            "pair" => node.child_by_field_name("key"),
            _ => None,
        };
        if let Some(name) = name_node {
            let pos = name.start_position();
            return NavigationTarget {
                file: decl.file.path.display().to_string(),
                line: pos.row as i64 + 1,
                column: pos.column as i64 + 1,
                byte_offset: name.start_byte() as i64,
                length: (name.end_byte() - name.start_byte()) as i64,
                kind,
                procedure_name,
            };
        }
    }
    let (line, column) = line_col_at(&decl.file.source, decl.start);
    let rest_of_line = decl.file.source[decl.start..]
        .find('\n')
        .unwrap_or(decl.file.source.len() - decl.start);
    NavigationTarget {
        file: decl.file.path.display().to_string(),
        line,
        column,
        byte_offset: decl.start as i64,
        length: rest_of_line as i64,
        kind,
        procedure_name,
    }
}

fn line_col_at(source: &str, offset: usize) -> (i64, i64) {
    let mut line = 1i64;
    let mut column = 1i64;
    for (idx, ch) in source.char_indices() {
        if idx >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Full batch scan: every fully-qualified dotted path under the client
/// variable, mapped to its target. The bare client variable maps to the
/// root router itself.
pub fn build_procedure_map(
    ws: &mut Workspace,
    root: &DeclRef,
    config: &NavConfig,
) -> ProcedureMapping {
    let mut mapping = ProcedureMapping::new();
    let prefix = config.api_variable_name.clone();
    mapping.insert(prefix.clone(), target_for(root, TargetKind::Router));
    collect(ws, root, &prefix, 0, config, &mut mapping);
    mapping
}

fn collect(
    ws: &mut Workspace,
    decl: &DeclRef,
    prefix: &str,
    depth: usize,
    config: &NavConfig,
    mapping: &mut ProcedureMapping,
) {
    if depth >= config.max_depth {
        tracing::debug!(prefix, "depth bound reached during scan");
        return;
    }
    for (name, child) in structure::enumerate_children(ws, decl, config) {
        let path = format!("{prefix}.{name}");
        if mapping.contains_key(&path) {
            continue;
        }
        let is_router = child.kind == TargetKind::Router;
        mapping.insert(path.clone(), target_for(&child.decl, child.kind));
        if is_router {
            collect(ws, &child.decl, &path, depth + 1, config, mapping);
        }
    }
}

/// Look up a dotted path in a prebuilt mapping, falling back to the
/// nearest resolvable parent path when the exact path is absent.
pub fn lookup<'m>(mapping: &'m ProcedureMapping, path: &str) -> Option<&'m NavigationTarget> {
    let mut current = path;
    loop {
        if let Some(target) = mapping.get(current) {
            return Some(target);
        }
        let Some(dot) = current.rfind('.') else {
            return None;
        };
        current = &current[..dot];
    }
}

/// Whether a source line at `token` looks like a client-path usage worth
/// navigating: the token must appear inside a dotted chain rooted at the
/// client variable.
pub fn hover_hint(line: &str, token: &str, config: &NavConfig) -> Option<&'static str> {
    let anchor = format!("{}.", config.api_variable_name);
    let Some(start) = line.find(&anchor) else {
        return None;
    };
    let chain: String = line[start..]
        .chars()
        .take_while(|ch| ch.is_alphanumeric() || *ch == '_' || *ch == '$' || *ch == '.')
        .collect();
    if chain.split('.').any(|segment| segment == token) {
        Some("router path")
    } else {
        None
    }
}
