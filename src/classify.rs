//! Syntactic procedure/router classification. Deliberately heuristic: it
//! trades precision for speed and independence from type information, and
//! anything unrecognized is treated as a leaf procedure so a malformed
//! tree can never loop.

use crate::config::NavConfig;
use crate::model::DeclRef;
use crate::parse::{self, ParsedFile};
use tree_sitter::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Procedure,
    Router,
}

/// Classify an initializer expression. Heuristic order, first match wins:
/// 1. contains a call to a router-registration function -> Router;
/// 2. object literal where some property holds a procedure-builder call
///    or a bare identifier reference -> Router;
/// 3. anything else (including recognized procedure-builder chains) ->
///    Procedure.
pub fn classify(file: &ParsedFile, expr: Node<'_>, config: &NavConfig) -> Class {
    let expr = parse::unwrap_expression(expr);
    let text = file.text(expr);
    if let Some(prefix) = &config.procedure_pattern {
        // Explicit name-prefix filter overrides structural detection.
        if text.trim_start().starts_with(prefix.as_str()) {
            return Class::Procedure;
        }
    }
    if contains_router_call(text, config) {
        return Class::Router;
    }
    if expr.kind() == "object" && object_looks_like_router(file, expr, config) {
        return Class::Router;
    }
    Class::Procedure
}

/// Classify a resolved declaration by its initializer; declarations
/// without one (ambient/compiled) fall back to the declarator text.
pub fn classify_declaration(decl: &DeclRef, config: &NavConfig) -> Class {
    if let Some(prefix) = &config.procedure_pattern {
        if decl.name.starts_with(prefix.as_str()) {
            return Class::Procedure;
        }
    }
    let Some(node) = decl.node() else {
        return Class::Procedure;
    };
    let expr = parse::declaration_initializer(node).unwrap_or(node);
    classify(&decl.file, expr, config)
}

pub fn contains_router_call(text: &str, config: &NavConfig) -> bool {
    config
        .patterns
        .router_functions
        .iter()
        .any(|name| contains_call(text, name))
}

pub fn contains_procedure_call(text: &str, config: &NavConfig) -> bool {
    config
        .patterns
        .procedure_types
        .iter()
        .any(|name| contains_call(text, &format!(".{name}")))
}

/// `name(` anywhere in the text. Purely lexical on purpose. Needles
/// starting with an identifier character additionally require a
/// non-identifier character before the match, so `myRouter(` does not
/// count as `router(`; dotted needles like `.query` carry their own
/// boundary.
fn contains_call(text: &str, name: &str) -> bool {
    let needle = format!("{name}(");
    let needs_boundary = name
        .chars()
        .next()
        .is_some_and(|ch| ch.is_alphanumeric() || ch == '_' || ch == '$');
    for (idx, _) in text.match_indices(&needle) {
        let boundary = !needs_boundary
            || idx == 0
            || !text[..idx]
                .chars()
                .next_back()
                .is_some_and(|ch| ch.is_alphanumeric() || ch == '_' || ch == '$');
        if boundary {
            return true;
        }
    }
    false
}

fn object_looks_like_router(file: &ParsedFile, object: Node<'_>, config: &NavConfig) -> bool {
    let mut cursor = object.walk();
    for entry in object.named_children(&mut cursor) {
        if entry.kind() != "pair" {
            continue;
        }
        let Some(value) = entry.child_by_field_name("value") else {
            continue;
        };
        let value = parse::unwrap_expression(value);
        if value.kind() == "identifier" {
            return true;
        }
        if contains_procedure_call(file.text(value), config) {
            return true;
        }
    }
    false
}
