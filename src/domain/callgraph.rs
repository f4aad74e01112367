// Call graph structures for Codereptile.
// Links code lines to the functions they call, resolved through USRs.

use tracing::debug;

use crate::domain::cursor::{Cursor, CursorKind, SourceLocation};
use crate::domain::tree::{CodeTree, NodeId, NodeKind};

/// One call site. `target` stays `None` when the callee could not be
/// matched; such edges are kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEdge {
    pub source: NodeId,
    pub target: Option<NodeId>,
    pub callee_name: String,
    pub callee_usr: Option<String>,
    pub location: SourceLocation,
}

impl CallEdge {
    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
}

/// Post-pass turning call expressions inside code lines into call edges.
#[derive(Debug, Default)]
pub struct CallResolver;

impl CallResolver {
    pub fn new() -> Self {
        Self
    }

    /// Rebuild `all_nodes` and `call_edges` for the whole tree.
    pub fn resolve(&self, tree: &mut CodeTree) {
        tree.collect_all_nodes();

        let mut edges = Vec::new();
        for &id in &tree.all_nodes {
            let NodeKind::CodeLine { cursor } = tree.kind(id) else {
                continue;
            };
            let mut sites = Vec::new();
            collect_call_sites(cursor, &mut sites);

            for call in sites {
                let callee_usr = callee_usr(call).map(str::to_string);
                let target = callee_usr.as_deref().and_then(|usr| {
                    tree.functions
                        .get(usr)
                        .or_else(|| tree.methods.get(usr))
                        .copied()
                });
                let callee_name = callee_name(call);

                match target {
                    Some(t) => debug!(
                        "resolved call to '{}' at {} -> node {}",
                        callee_name,
                        call.location,
                        t.index()
                    ),
                    None => debug!(
                        "unresolved call to '{}' at {} (usr: {:?})",
                        callee_name, call.location, callee_usr
                    ),
                }

                edges.push(CallEdge {
                    source: id,
                    target,
                    callee_name,
                    callee_usr,
                    location: call.location.clone(),
                });
            }
        }

        debug!(
            "call resolution: {} edges, {} resolved",
            edges.len(),
            edges.iter().filter(|e| e.is_resolved()).count()
        );
        tree.call_edges = edges;
    }
}

/// Every call expression in the subtree, in source traversal order.
fn collect_call_sites<'c>(cursor: &'c Cursor, out: &mut Vec<&'c Cursor>) {
    if cursor.kind == CursorKind::CallExpr {
        out.push(cursor);
    }
    for child in &cursor.children {
        collect_call_sites(child, out);
    }
}

/// USR of the callee, read from the call's first child.
fn callee_usr(call: &Cursor) -> Option<&str> {
    let first = call.children.first()?;
    match first.kind {
        CursorKind::MemberRefExpr | CursorKind::DeclRefExpr => referenced_usr(first),
        CursorKind::UnexposedExpr => wrapped_reference(first),
        _ => None,
    }
}

fn wrapped_reference(expr: &Cursor) -> Option<&str> {
    if let Some(usr) = referenced_usr(expr) {
        return Some(usr);
    }
    let inner = expr.children.first()?;
    match inner.kind {
        CursorKind::DeclRefExpr | CursorKind::MemberRefExpr => referenced_usr(inner),
        CursorKind::UnexposedExpr => wrapped_reference(inner),
        _ => None,
    }
}

fn referenced_usr(cursor: &Cursor) -> Option<&str> {
    cursor.referenced.as_ref().and_then(|r| r.usr.as_deref())
}

fn callee_name(call: &Cursor) -> String {
    if !call.spelling.is_empty() {
        return call.spelling.clone();
    }
    call.children
        .first()
        .and_then(|c| c.referenced.as_ref())
        .map(|r| r.spelling.clone())
        .unwrap_or_default()
}
