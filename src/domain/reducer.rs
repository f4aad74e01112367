//! AST reduction.
//!
//! Maps the provider's cursor tree onto the closed set of structural
//! entities in [`CodeTree`]. Compound statements are flattened, loops and
//! conditionals become containers, and every other recognized statement is
//! batched as a code line into the trailing code block.
//!
//! Constructs without a rule are reported as [`ReduceError`]s and routed
//! through an [`ErrorPolicy`]: strict parses abort, tolerant parses log the
//! problem and drop the offending subtree.

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::domain::cursor::{AccessSpecifier, Cursor, CursorKind, SourceLocation, TranslationUnit};
use crate::domain::std_filter::StandardHeaderFilter;
use crate::domain::tree::{
    AccessTag, CodeTree, Function, LoopKind, NodeId, NodeKind, Parameter, Record,
};

// ============================================================================
// Errors and policy
// ============================================================================

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReduceError {
    /// A cursor kind with no reduction rule.
    #[error("unsupported {context} construct {kind} at {location}")]
    UnsupportedConstruct {
        kind: String,
        context: &'static str,
        location: SourceLocation,
    },

    /// A recognized construct with an unexpected child layout.
    #[error("malformed {kind} at {location}: {reason}")]
    MalformedInput {
        kind: String,
        reason: String,
        location: SourceLocation,
    },

    /// A method whose owning class is not known when the method is seen.
    #[error("broken method '{name}' at {location}: owning class {owner} cannot be located")]
    BrokenMethod {
        name: String,
        owner: String,
        location: SourceLocation,
    },

    /// The provider reported compiler diagnostics on the translation unit.
    #[error("{report}")]
    UpstreamDiagnostics {
        path: String,
        count: usize,
        report: String,
    },
}

impl ReduceError {
    fn unsupported(cursor: &Cursor, context: &'static str) -> Self {
        ReduceError::UnsupportedConstruct {
            kind: cursor.kind_label().to_string(),
            context,
            location: cursor.location.clone(),
        }
    }

    fn malformed(cursor: &Cursor, reason: impl Into<String>) -> Self {
        ReduceError::MalformedInput {
            kind: cursor.kind_label().to_string(),
            reason: reason.into(),
            location: cursor.location.clone(),
        }
    }
}

/// What to do with a reduction error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Every error aborts the parse.
    #[default]
    Strict,
    /// Errors are logged and the offending subtree is skipped.
    Tolerant,
}

impl ErrorPolicy {
    /// Map the CLI's brute-force flag to a policy.
    pub fn from_bruteforce(bruteforce: bool) -> Self {
        if bruteforce {
            ErrorPolicy::Tolerant
        } else {
            ErrorPolicy::Strict
        }
    }

    pub fn is_tolerant(&self) -> bool {
        matches!(self, ErrorPolicy::Tolerant)
    }

    /// Abort (strict) or record and continue (tolerant).
    pub fn handle(&self, err: ReduceError, report: &mut ReduceReport) -> Result<(), ReduceError> {
        match self {
            ErrorPolicy::Strict => Err(err),
            ErrorPolicy::Tolerant => {
                warn!("SKIPPED: {}", err);
                report.skipped.push(err);
                Ok(())
            }
        }
    }
}

/// Bookkeeping for one reduction run.
#[derive(Debug, Clone, Default)]
pub struct ReduceReport {
    pub translation_units: usize,
    /// Top-level cursors dropped by the standard-library filter.
    pub filtered: usize,
    /// Errors swallowed in tolerant mode, in the order they occurred.
    pub skipped: Vec<ReduceError>,
}

// ============================================================================
// Reducer
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct AstReducer {
    policy: ErrorPolicy,
    std_filter: StandardHeaderFilter,
}

impl AstReducer {
    pub fn new(policy: ErrorPolicy) -> Self {
        Self {
            policy,
            std_filter: StandardHeaderFilter::default(),
        }
    }

    pub fn with_std_filter(mut self, filter: StandardHeaderFilter) -> Self {
        self.std_filter = filter;
        self
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Reduce every top-level declaration of one translation unit into `tree`.
    pub fn reduce_translation_unit(
        &self,
        tu: &TranslationUnit,
        tree: &mut CodeTree,
        report: &mut ReduceReport,
    ) -> Result<(), ReduceError> {
        report.translation_units += 1;

        let blocking = tu.blocking_diagnostics().count();
        if blocking > 0 {
            let err = ReduceError::UpstreamDiagnostics {
                path: tu.path.clone(),
                count: blocking,
                report: tu.diagnostics_report(),
            };
            self.policy.handle(err, report)?;
        } else if !tu.diagnostics.is_empty() {
            debug!("{}", tu.diagnostics_report());
        }

        for cursor in &tu.root.children {
            self.reduce_top_level(cursor, tree, report)?;
        }
        Ok(())
    }

    fn reduce_top_level(
        &self,
        cursor: &Cursor,
        tree: &mut CodeTree,
        report: &mut ReduceReport,
    ) -> Result<(), ReduceError> {
        if self.std_filter.is_standard(cursor.file_name()) {
            report.filtered += 1;
            return Ok(());
        }
        dump_cursor(cursor);

        match cursor.kind {
            CursorKind::FunctionDecl => self.reduce_free_function(cursor, tree, report),
            CursorKind::CxxMethod => self.reduce_out_of_line_method(cursor, tree, report),
            CursorKind::ClassDecl | CursorKind::StructDecl => {
                self.reduce_record(cursor, tree, report)
            }
            CursorKind::Namespace => {
                for child in &cursor.children {
                    self.reduce_top_level(child, tree, report)?;
                }
                Ok(())
            }
            CursorKind::UsingDirective => {
                debug!("skipping using directive at {}", cursor.location);
                Ok(())
            }
            CursorKind::Constructor | CursorKind::Destructor => {
                debug!(
                    "skipping out-of-line {} '{}' at {}",
                    cursor.kind, cursor.spelling, cursor.location
                );
                Ok(())
            }
            _ => self
                .policy
                .handle(ReduceError::unsupported(cursor, "top-level"), report),
        }
    }

    fn reduce_free_function(
        &self,
        cursor: &Cursor,
        tree: &mut CodeTree,
        report: &mut ReduceReport,
    ) -> Result<(), ReduceError> {
        let usr = symbol_id(cursor);
        let id = match tree.functions.get(&usr) {
            Some(id) => *id,
            None => {
                let id = tree.add_node(
                    None,
                    NodeKind::Function(Function {
                        name: cursor.spelling.clone(),
                        usr: usr.clone(),
                        ..Function::default()
                    }),
                );
                tree.functions.insert(usr, id);
                tree.roots.push(id);
                id
            }
        };
        self.fill_function(id, cursor, tree, report)
    }

    fn reduce_out_of_line_method(
        &self,
        cursor: &Cursor,
        tree: &mut CodeTree,
        report: &mut ReduceReport,
    ) -> Result<(), ReduceError> {
        let owner_usr = cursor
            .semantic_parent
            .as_ref()
            .and_then(|p| p.usr.clone());
        let owner = owner_usr.as_deref().and_then(|usr| tree.find_record(usr));

        match owner {
            Some(owner) => self.reduce_method(cursor, owner, tree, report),
            None => {
                let err = ReduceError::BrokenMethod {
                    name: cursor.spelling.clone(),
                    owner: owner_usr.unwrap_or_else(|| "<none>".to_string()),
                    location: cursor.location.clone(),
                };
                self.policy.handle(err, report)
            }
        }
    }

    fn reduce_record(
        &self,
        cursor: &Cursor,
        tree: &mut CodeTree,
        report: &mut ReduceReport,
    ) -> Result<(), ReduceError> {
        let usr = symbol_id(cursor);
        let id = match tree.find_record(&usr) {
            Some(id) => id,
            None => {
                let record = Record {
                    name: cursor.spelling.clone(),
                    usr: usr.clone(),
                    members: Vec::new(),
                };
                let id = if cursor.kind == CursorKind::ClassDecl {
                    let id = tree.add_node(None, NodeKind::Class(record));
                    tree.classes.insert(usr, id);
                    id
                } else {
                    let id = tree.add_node(None, NodeKind::Struct(record));
                    tree.structs.insert(usr, id);
                    id
                };
                tree.roots.push(id);
                debug!("registered {} '{}'", cursor.kind, cursor.spelling);
                id
            }
        };

        for child in &cursor.children {
            match child.kind {
                CursorKind::CxxMethod => self.reduce_method(child, id, tree, report)?,
                CursorKind::FieldDecl
                | CursorKind::Constructor
                | CursorKind::Destructor
                | CursorKind::CxxBaseSpecifier
                | CursorKind::UsingDeclaration
                | CursorKind::CxxAccessSpecDecl => {
                    trace!("record member {} '{}' not modeled", child.kind, child.spelling);
                }
                _ => self
                    .policy
                    .handle(ReduceError::unsupported(child, "record member"), report)?,
            }
        }
        Ok(())
    }

    /// Register (or find) a method under `owner` and reduce it.
    fn reduce_method(
        &self,
        cursor: &Cursor,
        owner: NodeId,
        tree: &mut CodeTree,
        report: &mut ReduceReport,
    ) -> Result<(), ReduceError> {
        let usr = symbol_id(cursor);
        let id = match tree.methods.get(&usr) {
            Some(id) => *id,
            None => {
                let id = tree.add_node(
                    Some(owner),
                    NodeKind::Function(Function {
                        name: cursor.spelling.clone(),
                        usr: usr.clone(),
                        ..Function::default()
                    }),
                );
                tree.methods.insert(usr.clone(), id);
                if let NodeKind::Class(record) | NodeKind::Struct(record) = tree.kind_mut(owner) {
                    record.members.push((usr, id));
                }
                id
            }
        };
        self.fill_function(id, cursor, tree, report)
    }

    /// Update a function entity in place from a declaration or definition.
    /// The first definition seen provides the body.
    fn fill_function(
        &self,
        id: NodeId,
        cursor: &Cursor,
        tree: &mut CodeTree,
        report: &mut ReduceReport,
    ) -> Result<(), ReduceError> {
        let parameters: Vec<Parameter> = cursor
            .children
            .iter()
            .filter(|c| c.kind == CursorKind::ParmDecl)
            .map(|c| Parameter {
                name: c.spelling.clone(),
                type_name: c.type_spelling.clone(),
            })
            .collect();
        let access = access_tag(cursor);
        let is_definition = cursor.is_definition();

        let already_defined = match tree.kind_mut(id) {
            NodeKind::Function(f) => {
                if !cursor.spelling.is_empty() {
                    f.name = cursor.spelling.clone();
                }
                if access != AccessTag::Unset {
                    f.access = access;
                }
                if is_definition || f.parameters.is_empty() {
                    f.parameters = parameters;
                }
                f.defined
            }
            _ => return Ok(()),
        };

        if !is_definition {
            return Ok(());
        }
        if already_defined {
            debug!(
                "'{}' at {} is already defined, keeping the first body",
                cursor.spelling, cursor.location
            );
            return Ok(());
        }

        let mut body = Vec::new();
        for child in cursor.children.iter().filter(|c| c.kind == CursorKind::CompoundStmt) {
            self.parse_cursor(child, id, &mut body, tree, report)?;
        }
        if let NodeKind::Function(f) = tree.kind_mut(id) {
            f.body = body;
            f.defined = true;
        }
        debug!("reduced function '{}' ({})", cursor.spelling, cursor.location);
        Ok(())
    }

    /// Reduce one statement cursor into `out`, the child list of `parent`.
    pub fn parse_cursor(
        &self,
        cursor: &Cursor,
        parent: NodeId,
        out: &mut Vec<NodeId>,
        tree: &mut CodeTree,
        report: &mut ReduceReport,
    ) -> Result<(), ReduceError> {
        match cursor.kind {
            CursorKind::CompoundStmt => {
                for child in &cursor.children {
                    self.parse_cursor(child, parent, out, tree, report)?;
                }
                Ok(())
            }
            CursorKind::ForStmt => self.reduce_loop(LoopKind::For, cursor, parent, out, tree, report),
            CursorKind::CxxForRangeStmt => {
                self.reduce_loop(LoopKind::ForRange, cursor, parent, out, tree, report)
            }
            CursorKind::WhileStmt => {
                self.reduce_loop(LoopKind::While, cursor, parent, out, tree, report)
            }
            CursorKind::IfStmt => self.reduce_if(cursor, parent, out, tree, report),
            kind if is_simple_statement(kind) => {
                push_line(cursor, parent, out, tree);
                Ok(())
            }
            _ => self
                .policy
                .handle(ReduceError::unsupported(cursor, "statement"), report),
        }
    }

    fn reduce_loop(
        &self,
        kind: LoopKind,
        cursor: &Cursor,
        parent: NodeId,
        out: &mut Vec<NodeId>,
        tree: &mut CodeTree,
        report: &mut ReduceReport,
    ) -> Result<(), ReduceError> {
        let Some(body_cursor) = cursor.children.last() else {
            return self
                .policy
                .handle(ReduceError::malformed(cursor, "loop without a body"), report);
        };

        let id = tree.add_node(Some(parent), NodeKind::Loop { kind, body: Vec::new() });
        let mut body = Vec::new();
        self.parse_cursor(body_cursor, id, &mut body, tree, report)?;
        if let NodeKind::Loop { body: slot, .. } = tree.kind_mut(id) {
            *slot = body;
        }
        out.push(id);
        Ok(())
    }

    fn reduce_if(
        &self,
        cursor: &Cursor,
        parent: NodeId,
        out: &mut Vec<NodeId>,
        tree: &mut CodeTree,
        report: &mut ReduceReport,
    ) -> Result<(), ReduceError> {
        let count = cursor.children.len();
        if !(2..=3).contains(&count) {
            let reason = format!("expected condition, then and optional else, found {} children", count);
            return self.policy.handle(ReduceError::malformed(cursor, reason), report);
        }

        let id = tree.add_node(
            Some(parent),
            NodeKind::If {
                then_branch: Vec::new(),
                else_branch: Vec::new(),
            },
        );
        let mut then_nodes = Vec::new();
        self.parse_cursor(&cursor.children[1], id, &mut then_nodes, tree, report)?;
        let mut else_nodes = Vec::new();
        if let Some(else_cursor) = cursor.children.get(2) {
            self.parse_cursor(else_cursor, id, &mut else_nodes, tree, report)?;
        }
        if let NodeKind::If {
            then_branch,
            else_branch,
        } = tree.kind_mut(id)
        {
            *then_branch = then_nodes;
            *else_branch = else_nodes;
        }
        out.push(id);
        Ok(())
    }
}

/// Statements kept as opaque code lines.
fn is_simple_statement(kind: CursorKind) -> bool {
    matches!(
        kind,
        CursorKind::DeclStmt
            | CursorKind::CallExpr
            | CursorKind::ReturnStmt
            | CursorKind::BinaryOperator
            | CursorKind::CompoundAssignOperator
            | CursorKind::UnaryOperator
            | CursorKind::CxxDeleteExpr
            | CursorKind::BreakStmt
            | CursorKind::ContinueStmt
            | CursorKind::NullStmt
            | CursorKind::CxxTryStmt
            | CursorKind::SwitchStmt
            | CursorKind::UnexposedExpr
            | CursorKind::MemberRefExpr
            | CursorKind::DeclRefExpr
    )
}

/// Append a code line, opening a new block unless the last child is one.
fn push_line(cursor: &Cursor, parent: NodeId, out: &mut Vec<NodeId>, tree: &mut CodeTree) {
    let block = match out.last() {
        Some(&last) if matches!(tree.kind(last), NodeKind::CodeBlock { .. }) => last,
        _ => {
            let block = tree.add_node(Some(parent), NodeKind::CodeBlock { lines: Vec::new() });
            out.push(block);
            block
        }
    };
    let line = tree.add_node(
        Some(block),
        NodeKind::CodeLine {
            cursor: cursor.clone(),
        },
    );
    if let NodeKind::CodeBlock { lines } = tree.kind_mut(block) {
        lines.push(line);
    }
}

fn symbol_id(cursor: &Cursor) -> String {
    match &cursor.usr {
        Some(usr) if !usr.is_empty() => usr.clone(),
        _ => format!("{}@{}", cursor.spelling, cursor.location),
    }
}

fn access_tag(cursor: &Cursor) -> AccessTag {
    if cursor.kind == CursorKind::Constructor {
        return AccessTag::Constructor;
    }
    match cursor.access {
        AccessSpecifier::Public => AccessTag::Public,
        AccessSpecifier::Protected => AccessTag::Protected,
        AccessSpecifier::Private => AccessTag::Private,
        AccessSpecifier::None => AccessTag::Unset,
    }
}

/// Shown with `--verbose`.
fn dump_cursor(cursor: &Cursor) {
    debug!(
        kind = %cursor.kind_label(),
        spelling = %cursor.spelling,
        ty = %cursor.type_spelling,
        access = ?cursor.access,
        location = %cursor.location,
        usr = ?cursor.usr,
        "top-level cursor"
    );
}
