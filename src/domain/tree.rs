// Structural tree and symbol tables for Codereptile.
// Entities live in one arena owned by `CodeTree`; parent and root links are
// arena indices, so the tree never holds ownership cycles.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::domain::callgraph::CallEdge;
use crate::domain::cursor::Cursor;

/// Index of an entity in the `CodeTree` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Loop flavours sharing one structural shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopKind {
    For,
    ForRange,
    While,
}

/// Access tag shown as the strip on top of a function box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AccessTag {
    #[default]
    Unset,
    Public,
    Protected,
    Private,
    Constructor,
}

/// A function parameter as declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct Function {
    pub name: String,
    pub usr: String,
    pub access: AccessTag,
    pub parameters: Vec<Parameter>,
    pub body: Vec<NodeId>,
    /// Set once a definition (a body) has been reduced into this entity.
    pub defined: bool,
}

/// Class or struct: a named, insertion-ordered mapping USR -> method.
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub name: String,
    pub usr: String,
    pub members: Vec<(String, NodeId)>,
}

/// Closed set of structural entity kinds.
#[derive(Debug, Clone)]
pub enum NodeKind {
    CodeLine { cursor: Cursor },
    CodeBlock { lines: Vec<NodeId> },
    Loop { kind: LoopKind, body: Vec<NodeId> },
    If { then_branch: Vec<NodeId>, else_branch: Vec<NodeId> },
    Function(Function),
    Class(Record),
    Struct(Record),
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::CodeLine { .. } => "code_line",
            NodeKind::CodeBlock { .. } => "code_block",
            NodeKind::Loop { kind: LoopKind::For, .. } => "for_loop",
            NodeKind::Loop { kind: LoopKind::ForRange, .. } => "for_range_loop",
            NodeKind::Loop { kind: LoopKind::While, .. } => "while_loop",
            NodeKind::If { .. } => "if",
            NodeKind::Function(_) => "function",
            NodeKind::Class(_) => "class",
            NodeKind::Struct(_) => "struct",
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            NodeKind::Function(f) => Some(&f.name),
            NodeKind::Class(r) | NodeKind::Struct(r) => Some(&r.name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub root: NodeId,
    pub kind: NodeKind,
}

/// Symbol tables plus the entity arena.
#[derive(Debug, Default)]
pub struct CodeTree {
    nodes: Vec<Node>,
    pub functions: HashMap<String, NodeId>,
    pub classes: HashMap<String, NodeId>,
    pub structs: HashMap<String, NodeId>,
    pub methods: HashMap<String, NodeId>,
    pub roots: Vec<NodeId>,
    /// Depth-first listing of every reachable entity, filled by the resolver.
    pub all_nodes: Vec<NodeId>,
    pub call_edges: Vec<CallEdge>,
}

impl CodeTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new entity. The root link is derived from the parent here
    /// and never recomputed.
    pub(crate) fn add_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let root = match parent {
            Some(p) => self.nodes[p.0].root,
            None => id,
        };
        self.nodes.push(Node { parent, root, kind });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub(crate) fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Flat registration list, in creation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn function(&self, id: NodeId) -> Option<&Function> {
        match self.kind(id) {
            NodeKind::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn record(&self, id: NodeId) -> Option<&Record> {
        match self.kind(id) {
            NodeKind::Class(r) | NodeKind::Struct(r) => Some(r),
            _ => None,
        }
    }

    /// Class or struct registered under `usr`.
    pub fn find_record(&self, usr: &str) -> Option<NodeId> {
        self.classes
            .get(usr)
            .or_else(|| self.structs.get(usr))
            .copied()
    }

    /// Children in visual stacking order: then before else, members in
    /// insertion order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.kind(id) {
            NodeKind::CodeLine { .. } => Vec::new(),
            NodeKind::CodeBlock { lines } => lines.clone(),
            NodeKind::Loop { body, .. } => body.clone(),
            NodeKind::If {
                then_branch,
                else_branch,
            } => then_branch.iter().chain(else_branch).copied().collect(),
            NodeKind::Function(f) => f.body.clone(),
            NodeKind::Class(r) | NodeKind::Struct(r) => {
                r.members.iter().map(|(_, id)| *id).collect()
            }
        }
    }

    /// Rebuild `all_nodes` by walking every root depth-first.
    pub fn collect_all_nodes(&mut self) {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).into_iter().rev());
        }
        self.all_nodes = out;
    }

    /// Indented outline of the whole tree.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            self.outline_node(*root, 0, &mut out);
        }
        out
    }

    fn outline_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let indent = "\t".repeat(depth);
        match self.kind(id) {
            NodeKind::CodeLine { cursor } => {
                let _ = writeln!(out, "{}{}", indent, cursor.kind_label());
            }
            NodeKind::CodeBlock { lines } => {
                let _ = writeln!(out, "{}Block of code:", indent);
                for line in lines {
                    self.outline_node(*line, depth + 1, out);
                }
            }
            NodeKind::Loop { kind, body } => {
                let title = match kind {
                    LoopKind::For => "For loop:",
                    LoopKind::ForRange => "For range loop:",
                    LoopKind::While => "While loop:",
                };
                let _ = writeln!(out, "{}{}", indent, title);
                for child in body {
                    self.outline_node(*child, depth + 1, out);
                }
            }
            NodeKind::If {
                then_branch,
                else_branch,
            } => {
                let _ = writeln!(out, "{}If:", indent);
                for child in then_branch {
                    self.outline_node(*child, depth + 1, out);
                }
                if !else_branch.is_empty() {
                    let _ = writeln!(out, "{}Else:", indent);
                    for child in else_branch {
                        self.outline_node(*child, depth + 1, out);
                    }
                }
            }
            NodeKind::Function(f) => {
                let params: Vec<String> = f
                    .parameters
                    .iter()
                    .map(|p| format!("{} {}", p.type_name, p.name))
                    .collect();
                let _ = writeln!(
                    out,
                    "{}Function: {}({}) [{:?}]",
                    indent,
                    f.name,
                    params.join(", "),
                    f.access
                );
                for child in &f.body {
                    self.outline_node(*child, depth + 1, out);
                }
            }
            NodeKind::Class(r) | NodeKind::Struct(r) => {
                let title = if matches!(self.kind(id), NodeKind::Class(_)) {
                    "Class"
                } else {
                    "Struct"
                };
                let _ = writeln!(out, "{}{}: {}", indent, title, r.name);
                for (_, member) in &r.members {
                    self.outline_node(*member, depth + 1, out);
                }
            }
        }
    }
}
