//! Router structure parsing: normalize the registration idiom to one
//! shape, look up child entries, and resolve each entry to the
//! declaration that implements it.

use crate::classify::{self, Class};
use crate::config::NavConfig;
use crate::imports;
use crate::model::{DeclRef, Miss, TargetKind};
use crate::parse::{self, ParsedFile, Workspace, property_key_text};
use std::rc::Rc;
use tree_sitter::Node;

/// The two router-definition idioms, normalized so the rest of the walker
/// sees a single entries node: a registration call's object argument, or
/// a plain (possibly `satisfies`-qualified) object literal.
pub enum RouterShape<'a> {
    WrappedCall(Node<'a>),
    PlainObject(Node<'a>),
}

impl<'a> RouterShape<'a> {
    pub fn entries(&self) -> Node<'a> {
        match self {
            RouterShape::WrappedCall(node) | RouterShape::PlainObject(node) => *node,
        }
    }
}

/// A child entry resolved to the declaration implementing it.
#[derive(Debug)]
pub struct ResolvedChild {
    pub decl: DeclRef,
    pub kind: TargetKind,
}

/// Normalize a router declaration to its entries object. Searches the
/// initializer for a nested registration call before falling back to a
/// bare object literal, so middleware-wrapped sub-routers still resolve.
pub fn router_shape<'a>(
    file: &'a ParsedFile,
    declaration: Node<'a>,
    config: &NavConfig,
) -> Result<RouterShape<'a>, Miss> {
    let initializer = parse::declaration_initializer(declaration).ok_or(Miss::Malformed)?;
    let initializer = parse::unwrap_expression(initializer);
    if initializer.kind() == "object" {
        return Ok(RouterShape::PlainObject(initializer));
    }
    if let Some(entries) = registration_call_object(file, initializer, config) {
        return Ok(RouterShape::WrappedCall(entries));
    }
    tracing::debug!(
        kind = initializer.kind(),
        "unsupported router idiom"
    );
    Err(Miss::Malformed)
}

/// First registration call found in the expression (pre-order, bounded by
/// the configured depth) whose first argument is an object literal.
fn registration_call_object<'a>(
    file: &'a ParsedFile,
    expr: Node<'a>,
    config: &NavConfig,
) -> Option<Node<'a>> {
    let mut frontier = vec![(expr, 0usize)];
    while let Some((node, depth)) = frontier.pop() {
        if depth > config.max_depth {
            continue;
        }
        if node.kind() == "call_expression" {
            if let Some(callee) = parse::call_callee(node) {
                if is_registration_callee(file, callee, config) {
                    let args = parse::call_arguments(node);
                    if let Some(first) = args.first() {
                        let first = parse::unwrap_expression(*first);
                        if first.kind() == "object" {
                            return Some(first);
                        }
                    }
                }
            }
        }
        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            frontier.push((child, depth + 1));
        }
    }
    None
}

fn is_registration_callee(file: &ParsedFile, callee: Node<'_>, config: &NavConfig) -> bool {
    let text = file.text(callee);
    let last = text.rsplit('.').next().unwrap_or(text);
    config
        .patterns
        .router_functions
        .iter()
        .any(|name| name == last)
}

/// Locate the `key: value` entry for `child` in an entries object. Exact
/// string match, first match wins; shorthand and spread entries are not
/// supported and are skipped.
pub fn find_entry<'a>(file: &ParsedFile, entries: Node<'a>, child: &str) -> Option<Node<'a>> {
    let mut cursor = entries.walk();
    for entry in entries.named_children(&mut cursor) {
        if entry.kind() != "pair" {
            continue;
        }
        let Some(key) = entry.child_by_field_name("key") else {
            continue;
        };
        if property_key_text(file.text(key)) == child {
            return Some(entry);
        }
    }
    None
}

/// Resolve one child of a router declaration: identifier values chase the
/// declaration they reference (locally, then through imports); inline
/// call expressions are classified from syntax alone and anchored at
/// their own property entry.
pub fn resolve_child(
    ws: &mut Workspace,
    decl: &DeclRef,
    child: &str,
    config: &NavConfig,
) -> Result<ResolvedChild, Miss> {
    let node = decl.node().ok_or(Miss::NotFound)?;
    let shape = router_shape(&decl.file, node, config)?;
    let entry = find_entry(&decl.file, shape.entries(), child).ok_or(Miss::NotFound)?;
    resolve_entry(ws, decl, entry, child, config)
}

fn resolve_entry(
    ws: &mut Workspace,
    decl: &DeclRef,
    entry: Node<'_>,
    child: &str,
    config: &NavConfig,
) -> Result<ResolvedChild, Miss> {
    let value = entry.child_by_field_name("value").ok_or(Miss::Malformed)?;
    let value = parse::unwrap_expression(value);
    if value.kind() == "identifier" {
        let name = decl.file.text(value).to_string();
        let target = imports::resolve_identifier(ws, &decl.file, &name)?;
        let kind = match classify::classify_declaration(&target, config) {
            Class::Router => TargetKind::Router,
            Class::Procedure => TargetKind::Procedure,
        };
        return Ok(ResolvedChild { decl: target, kind });
    }
    // Inline expression: its own entry is the declaration site.
    let kind = match classify::classify(&decl.file, value, config) {
        Class::Router => TargetKind::Router,
        Class::Procedure => TargetKind::InlineProcedure,
    };
    Ok(ResolvedChild {
        decl: DeclRef::new(child, Rc::clone(&decl.file), entry),
        kind,
    })
}

/// All resolvable children of a router declaration, in source order.
/// Entries that fail to resolve are skipped rather than aborting the
/// scan.
pub fn enumerate_children(
    ws: &mut Workspace,
    decl: &DeclRef,
    config: &NavConfig,
) -> Vec<(String, ResolvedChild)> {
    let mut out = Vec::new();
    let Some(node) = decl.node() else {
        return out;
    };
    let Ok(shape) = router_shape(&decl.file, node, config) else {
        return out;
    };
    let entries = shape.entries();
    let mut pairs = Vec::new();
    let mut cursor = entries.walk();
    for entry in entries.named_children(&mut cursor) {
        if entry.kind() != "pair" {
            continue;
        }
        let Some(key) = entry.child_by_field_name("key") else {
            continue;
        };
        let name = property_key_text(decl.file.text(key));
        if name.is_empty() || pairs.iter().any(|(existing, _)| *existing == name) {
            continue;
        }
        pairs.push((name, (entry.start_byte(), entry.end_byte())));
    }
    for (name, (start, end)) in pairs {
        let Some(entry) = decl.file.node_for_range(start, end) else {
            continue;
        };
        match resolve_entry(ws, decl, entry, &name, config) {
            Ok(child) => out.push((name, child)),
            Err(miss) => {
                tracing::debug!(child = %name, ?miss, "skipping unresolvable entry");
            }
        }
    }
    out
}
