use crate::parse::ParsedFile;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tree_sitter::Node;

/// What a resolved path segment points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Procedure,
    InlineProcedure,
    Router,
}

/// A resolved navigation result: the declaration site of a router or
/// procedure in a real source file. `line`/`column` are 1-based;
/// `byte_offset`/`length` give the exact span of the matched name token,
/// falling back to the rest of the declaration line when no name token
/// can be isolated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationTarget {
    pub file: String,
    pub line: i64,
    pub column: i64,
    pub byte_offset: i64,
    pub length: i64,
    pub kind: TargetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure_name: Option<String>,
}

/// Batch-mode payload: fully-qualified dotted path -> target.
/// Rebuilt wholesale on every scan, never patched incrementally.
pub type ProcedureMapping = BTreeMap<String, NavigationTarget>;

/// Non-fatal resolution failure. Both variants are absence values, not
/// errors: they bubble to the nearest recovery point and the caller falls
/// back to the next resolution mode (or to no navigation at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Miss {
    /// A resolution step found nothing: missing file, unbound identifier,
    /// absent child key.
    NotFound,
    /// A structurally unexpected shape: wrong argument type, missing
    /// object literal, unsupported router idiom.
    Malformed,
}

/// A declaration reference that works without compiler symbols: a name,
/// the parsed file holding the declaration, and the declaration node's
/// byte range. Everything downstream (classifier, navigator) operates on
/// this minimal capability set.
#[derive(Clone)]
pub struct DeclRef {
    pub name: String,
    pub file: Rc<ParsedFile>,
    pub start: usize,
    pub end: usize,
}

impl DeclRef {
    pub fn new(name: impl Into<String>, file: Rc<ParsedFile>, node: Node<'_>) -> Self {
        Self {
            name: name.into(),
            file,
            start: node.start_byte(),
            end: node.end_byte(),
        }
    }

    /// Re-derive the declaration node from the stored byte range.
    pub fn node(&self) -> Option<Node<'_>> {
        self.file.node_for_range(self.start, self.end)
    }
}

impl fmt::Debug for DeclRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DeclRef({} @ {}:{}..{})",
            self.name,
            self.file.path.display(),
            self.start,
            self.end
        )
    }
}

/// Result of resolving a client variable's type back to the router value
/// that produced it.
#[derive(Debug, Clone)]
pub struct RouterTypeInfo {
    pub decl: DeclRef,
    pub router_file: std::path::PathBuf,
}
