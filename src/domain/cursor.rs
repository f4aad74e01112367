//! Cursor model handed over by the AST provider.
//!
//! A `Cursor` is an owned snapshot of one syntactic construct: its kind,
//! spelling, location, symbol identifier (USR) and children. Reference
//! expressions carry a `CursorRef` back-reference to the declaration they
//! name, methods carry one to their owning record.

use std::fmt;

/// Syntactic kind of a cursor, named after libclang's cursor kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorKind {
    TranslationUnit,
    Namespace,
    FunctionDecl,
    CxxMethod,
    Constructor,
    Destructor,
    ClassDecl,
    StructDecl,
    UsingDirective,
    UsingDeclaration,
    CxxAccessSpecDecl,
    CxxBaseSpecifier,
    FieldDecl,
    ParmDecl,
    VarDecl,
    TypeRef,
    CompoundStmt,
    ForStmt,
    CxxForRangeStmt,
    WhileStmt,
    DoStmt,
    IfStmt,
    SwitchStmt,
    CxxTryStmt,
    ReturnStmt,
    DeclStmt,
    BreakStmt,
    ContinueStmt,
    NullStmt,
    CallExpr,
    MemberRefExpr,
    DeclRefExpr,
    UnexposedExpr,
    BinaryOperator,
    CompoundAssignOperator,
    UnaryOperator,
    CxxDeleteExpr,
    /// Anything the provider reports that has no dedicated variant.
    Unknown,
}

impl CursorKind {
    /// libclang spelling of the kind, used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            CursorKind::TranslationUnit => "TRANSLATION_UNIT",
            CursorKind::Namespace => "NAMESPACE",
            CursorKind::FunctionDecl => "FUNCTION_DECL",
            CursorKind::CxxMethod => "CXX_METHOD",
            CursorKind::Constructor => "CONSTRUCTOR",
            CursorKind::Destructor => "DESTRUCTOR",
            CursorKind::ClassDecl => "CLASS_DECL",
            CursorKind::StructDecl => "STRUCT_DECL",
            CursorKind::UsingDirective => "USING_DIRECTIVE",
            CursorKind::UsingDeclaration => "USING_DECLARATION",
            CursorKind::CxxAccessSpecDecl => "CXX_ACCESS_SPEC_DECL",
            CursorKind::CxxBaseSpecifier => "CXX_BASE_SPECIFIER",
            CursorKind::FieldDecl => "FIELD_DECL",
            CursorKind::ParmDecl => "PARM_DECL",
            CursorKind::VarDecl => "VAR_DECL",
            CursorKind::TypeRef => "TYPE_REF",
            CursorKind::CompoundStmt => "COMPOUND_STMT",
            CursorKind::ForStmt => "FOR_STMT",
            CursorKind::CxxForRangeStmt => "CXX_FOR_RANGE_STMT",
            CursorKind::WhileStmt => "WHILE_STMT",
            CursorKind::DoStmt => "DO_STMT",
            CursorKind::IfStmt => "IF_STMT",
            CursorKind::SwitchStmt => "SWITCH_STMT",
            CursorKind::CxxTryStmt => "CXX_TRY_STMT",
            CursorKind::ReturnStmt => "RETURN_STMT",
            CursorKind::DeclStmt => "DECL_STMT",
            CursorKind::BreakStmt => "BREAK_STMT",
            CursorKind::ContinueStmt => "CONTINUE_STMT",
            CursorKind::NullStmt => "NULL_STMT",
            CursorKind::CallExpr => "CALL_EXPR",
            CursorKind::MemberRefExpr => "MEMBER_REF_EXPR",
            CursorKind::DeclRefExpr => "DECL_REF_EXPR",
            CursorKind::UnexposedExpr => "UNEXPOSED_EXPR",
            CursorKind::BinaryOperator => "BINARY_OPERATOR",
            CursorKind::CompoundAssignOperator => "COMPOUND_ASSIGNMENT_OPERATOR",
            CursorKind::UnaryOperator => "UNARY_OPERATOR",
            CursorKind::CxxDeleteExpr => "CXX_DELETE_EXPR",
            CursorKind::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CursorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Access specifier as reported on member declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessSpecifier {
    #[default]
    None,
    Public,
    Protected,
    Private,
}

impl AccessSpecifier {
    pub fn from_str(s: &str) -> AccessSpecifier {
        match s.to_lowercase().as_str() {
            "public" => AccessSpecifier::Public,
            "protected" => AccessSpecifier::Protected,
            "private" => AccessSpecifier::Private,
            _ => AccessSpecifier::None,
        }
    }
}

/// A point in a source file. Lines and columns are 1-based, 0 when unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Option<String>,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: Some(file.into()),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}", file, self.line, self.column),
            None => write!(f, "<unknown>:{}:{}", self.line, self.column),
        }
    }
}

/// Source range covered by a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceExtent {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl fmt::Display for SourceExtent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}:{}", self.start, self.end.line, self.end.column)
    }
}

/// Non-owning back-reference to another cursor (a declaration).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorRef {
    pub kind: CursorKind,
    pub spelling: String,
    pub usr: Option<String>,
}

impl CursorRef {
    pub fn new(kind: CursorKind, spelling: impl Into<String>, usr: Option<String>) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            usr,
        }
    }
}

/// One node of the provider's syntax tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub kind: CursorKind,
    /// Provider-native kind name, kept when `kind` is a lossy mapping.
    pub raw_kind: Option<String>,
    pub spelling: String,
    pub type_spelling: String,
    pub access: AccessSpecifier,
    pub location: SourceLocation,
    pub extent: Option<SourceExtent>,
    pub usr: Option<String>,
    /// Owning declaration context (the record for a method).
    pub semantic_parent: Option<CursorRef>,
    /// Declaration named by a reference expression.
    pub referenced: Option<CursorRef>,
    pub children: Vec<Cursor>,
}

impl Cursor {
    pub fn new(kind: CursorKind) -> Self {
        Self {
            kind,
            raw_kind: None,
            spelling: String::new(),
            type_spelling: String::new(),
            access: AccessSpecifier::None,
            location: SourceLocation::default(),
            extent: None,
            usr: None,
            semantic_parent: None,
            referenced: None,
            children: Vec::new(),
        }
    }

    pub fn with_spelling(mut self, spelling: impl Into<String>) -> Self {
        self.spelling = spelling.into();
        self
    }

    pub fn with_type(mut self, type_spelling: impl Into<String>) -> Self {
        self.type_spelling = type_spelling.into();
        self
    }

    pub fn with_raw_kind(mut self, raw_kind: impl Into<String>) -> Self {
        self.raw_kind = Some(raw_kind.into());
        self
    }

    pub fn with_access(mut self, access: AccessSpecifier) -> Self {
        self.access = access;
        self
    }

    pub fn with_usr(mut self, usr: impl Into<String>) -> Self {
        self.usr = Some(usr.into());
        self
    }

    pub fn at(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.location = SourceLocation::new(file, line, column);
        self
    }

    pub fn with_extent(mut self, extent: SourceExtent) -> Self {
        self.extent = Some(extent);
        self
    }

    pub fn with_semantic_parent(mut self, parent: CursorRef) -> Self {
        self.semantic_parent = Some(parent);
        self
    }

    pub fn with_referenced(mut self, referenced: CursorRef) -> Self {
        self.referenced = Some(referenced);
        self
    }

    pub fn with_child(mut self, child: Cursor) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Cursor>) -> Self {
        self.children.extend(children);
        self
    }

    /// Kind to show to humans: the provider's own name when we have it.
    pub fn kind_label(&self) -> &str {
        self.raw_kind.as_deref().unwrap_or(self.kind.name())
    }

    /// Snapshot usable as a back-reference from other cursors.
    pub fn to_ref(&self) -> CursorRef {
        CursorRef::new(self.kind, self.spelling.clone(), self.usr.clone())
    }

    /// True when the declaration carries a body.
    pub fn is_definition(&self) -> bool {
        self.children
            .iter()
            .any(|c| c.kind == CursorKind::CompoundStmt)
    }

    /// Name of the file the cursor was found in, or "" when unknown.
    pub fn file_name(&self) -> &str {
        self.location.file.as_deref().unwrap_or("")
    }
}

/// Severity of a provider diagnostic, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Ignored,
    Note,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub fn from_str(s: &str) -> Severity {
        match s.trim().to_lowercase().as_str() {
            "note" | "remark" => Severity::Note,
            "warning" => Severity::Warning,
            "error" => Severity::Error,
            "fatal error" | "fatal" => Severity::Fatal,
            _ => Severity::Ignored,
        }
    }

    /// Notes and ignored diagnostics never stop a strict parse.
    pub fn is_blocking(&self) -> bool {
        *self >= Severity::Warning
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Ignored => "ignored",
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal error",
        };
        f.write_str(name)
    }
}

/// Suggested replacement attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixIt {
    pub range: SourceExtent,
    pub replacement: String,
}

/// Compiler diagnostic reported on a translation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: SourceLocation,
    pub message: String,
    pub fixits: Vec<FixIt>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)?;
        for fixit in &self.fixits {
            write!(f, "\n\tfix-it {}: \"{}\"", fixit.range, fixit.replacement)?;
        }
        Ok(())
    }
}

/// Output of the AST provider for one source file.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    pub path: String,
    pub diagnostics: Vec<Diagnostic>,
    pub root: Cursor,
}

impl TranslationUnit {
    pub fn new(path: impl Into<String>, root: Cursor) -> Self {
        Self {
            path: path.into(),
            diagnostics: Vec::new(),
            root,
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<Diagnostic>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Diagnostics that stop a strict parse.
    pub fn blocking_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity.is_blocking())
    }

    /// Human-readable report of every diagnostic, one block per entry.
    pub fn diagnostics_report(&self) -> String {
        let mut report = format!("FOUND {} DIAGNOSTIC(S) IN {}", self.diagnostics.len(), self.path);
        for diag in &self.diagnostics {
            report.push_str("\n  ");
            report.push_str(&diag.to_string());
        }
        report
    }
}
