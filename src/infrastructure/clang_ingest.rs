/// Clang JSON AST Ingestor.
/// Converts `clang -Xclang -ast-dump=json` output into the cursor model and
/// parses clang's textual diagnostics.
///
/// Two passes over the JSON tree:
/// 1. resolve clang's elided `file`/`line` fields in document order and
///    index every declaration id to a stable symbol identifier;
/// 2. build cursors, resolving references and owners through that index.

use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::domain::cursor::{
    AccessSpecifier, Cursor, CursorKind, CursorRef, Diagnostic, FixIt, Severity, SourceExtent,
    SourceLocation,
};

static DIAGNOSTIC_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?):(\d+):(\d+): (fatal error|error|warning|note|remark): (.*)$")
        .expect("Invalid diagnostic regex")
});

static FIXIT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^fix-it:"(.*)":\{(\d+):(\d+)-(\d+):(\d+)\}:"(.*)"$"#).expect("Invalid fix-it regex")
});

/// A declaration seen in pass 1.
#[derive(Debug, Clone)]
struct DeclInfo {
    usr: String,
    name: String,
    kind: CursorKind,
}

/// Last printed file and line; clang omits both when unchanged.
#[derive(Debug, Default)]
struct LocState {
    file: Option<String>,
    line: Option<u64>,
}

/// Record context handed to members in pass 2.
#[derive(Debug, Clone, Default)]
struct Scope {
    record: Option<CursorRef>,
    access: AccessSpecifier,
}

#[derive(Debug, Default)]
pub struct ClangJsonIngestor {
    decls: HashMap<String, DeclInfo>,
    loc: LocState,
}

impl ClangJsonIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the translation-unit cursor from a JSON AST dump.
    pub fn ingest(mut self, json: &str) -> Result<Cursor> {
        let mut root: Value = serde_json::from_str(json).context("Invalid clang JSON AST")?;
        if root.get("kind").and_then(Value::as_str) != Some("TranslationUnitDecl") {
            bail!("Clang JSON AST does not start with a TranslationUnitDecl");
        }

        // Pass 1
        let mut scope_path = Vec::new();
        self.index(&mut root, &mut scope_path);
        debug!("indexed {} declarations", self.decls.len());

        // Pass 2
        let mut tu = Cursor::new(CursorKind::TranslationUnit);
        tu.children = self.build_children(&root, &Scope::default());
        Ok(tu)
    }

    // ───────────────────────────────────────────────────────────────────
    // Pass 1
    // ───────────────────────────────────────────────────────────────────

    fn index(&mut self, node: &mut Value, scope_path: &mut Vec<String>) {
        let Some(map) = node.as_object_mut() else {
            return;
        };

        // loc, then range begin/end: the order clang prints them in.
        if let Some(loc) = map.get_mut("loc") {
            self.resolve_point(loc);
        }
        if let Some(range) = map.get_mut("range").and_then(Value::as_object_mut) {
            if let Some(begin) = range.get_mut("begin") {
                self.resolve_point(begin);
            }
            if let Some(end) = range.get_mut("end") {
                self.resolve_point(end);
            }
        }

        let kind_name = str_field(map, "kind").to_string();
        let name = str_field(map, "name").to_string();
        let id = str_field(map, "id").to_string();
        let implicit = map.get("isImplicit").and_then(Value::as_bool) == Some(true);

        let mut segment = None;
        match kind_name.as_str() {
            "NamespaceDecl" => {
                segment = Some(if name.is_empty() {
                    "@aN".to_string()
                } else {
                    format!("@N@{}", name)
                });
            }
            "CXXRecordDecl" | "RecordDecl" => {
                let tag = if str_field(map, "tagUsed") == "union" { "U" } else { "S" };
                let usr = format!("c:{}@{}@{}", scope_path.concat(), tag, name);
                if !implicit {
                    segment = Some(format!("@{}@{}", tag, name));
                    self.decls.insert(
                        id,
                        DeclInfo {
                            usr,
                            name,
                            kind: record_kind(map),
                        },
                    );
                }
            }
            "FunctionDecl" | "CXXMethodDecl" | "CXXConstructorDecl" | "CXXDestructorDecl"
            | "CXXConversionDecl" => {
                let usr = match map.get("mangledName").and_then(Value::as_str) {
                    Some(mangled) if !mangled.is_empty() => mangled.to_string(),
                    _ => format!(
                        "c:{}@F@{}#{}",
                        scope_path.concat(),
                        name,
                        qual_type(map)
                    ),
                };
                self.decls.insert(
                    id,
                    DeclInfo {
                        usr,
                        name,
                        kind: map_kind(&kind_name, map),
                    },
                );
            }
            _ => {}
        }

        if let Some(segment) = &segment {
            scope_path.push(segment.clone());
        }
        if let Some(Value::Array(children)) = map.get_mut("inner") {
            for child in children {
                self.index(child, scope_path);
            }
        }
        if segment.is_some() {
            scope_path.pop();
        }
    }

    /// Fill elided `file`/`line` in one location object from the running state.
    fn resolve_point(&mut self, point: &mut Value) {
        let Some(map) = point.as_object_mut() else {
            return;
        };
        if map.contains_key("spellingLoc") || map.contains_key("expansionLoc") {
            if let Some(spelling) = map.get_mut("spellingLoc") {
                self.resolve_point(spelling);
            }
            if let Some(expansion) = map.get_mut("expansionLoc") {
                self.resolve_point(expansion);
            }
            return;
        }
        if map.is_empty() {
            return;
        }

        match map.get("file").and_then(Value::as_str) {
            Some(file) => self.loc.file = Some(file.to_string()),
            None => {
                if let Some(file) = &self.loc.file {
                    map.insert("file".to_string(), Value::String(file.clone()));
                }
            }
        }
        match map.get("line").and_then(Value::as_u64) {
            Some(line) => self.loc.line = Some(line),
            None => {
                if let Some(line) = self.loc.line {
                    map.insert("line".to_string(), Value::from(line));
                }
            }
        }
    }

    // ───────────────────────────────────────────────────────────────────
    // Pass 2
    // ───────────────────────────────────────────────────────────────────

    fn build_children(&self, node: &Value, scope: &Scope) -> Vec<Cursor> {
        let Some(children) = node.get("inner").and_then(Value::as_array) else {
            return Vec::new();
        };
        children
            .iter()
            .filter_map(|child| self.build(child, scope))
            .collect()
    }

    fn build(&self, node: &Value, scope: &Scope) -> Option<Cursor> {
        let map = node.as_object()?;
        let kind_name = map.get("kind")?.as_str()?;
        if map.get("isImplicit").and_then(Value::as_bool) == Some(true) {
            return None;
        }

        let kind = map_kind(kind_name, map);
        let mut cursor = Cursor::new(kind)
            .with_spelling(str_field(map, "name"))
            .with_type(qual_type(map));
        if kind == CursorKind::Unknown {
            cursor = cursor.with_raw_kind(kind_name);
        }
        cursor.location = node_location(map);
        cursor.extent = node_extent(map);

        let id = str_field(map, "id");
        if let Some(decl) = self.decls.get(id) {
            cursor.usr = Some(decl.usr.clone());
        }

        match kind {
            CursorKind::CxxMethod | CursorKind::Constructor | CursorKind::Destructor | CursorKind::FieldDecl => {
                cursor.semantic_parent = match map.get("parentDeclContextId").and_then(Value::as_str) {
                    Some(parent) => self.decl_ref(parent),
                    None => scope.record.clone(),
                };
                if scope.record.is_some() {
                    cursor.access = match map.get("access").and_then(Value::as_str) {
                        Some(access) => AccessSpecifier::from_str(access),
                        None => scope.access,
                    };
                }
            }
            CursorKind::CxxAccessSpecDecl => {
                cursor.access = AccessSpecifier::from_str(str_field(map, "access"));
            }
            CursorKind::DeclRefExpr => {
                cursor.referenced = map.get("referencedDecl").and_then(|r| self.bare_decl_ref(r));
            }
            CursorKind::MemberRefExpr => {
                cursor.referenced = map
                    .get("referencedMemberDecl")
                    .and_then(Value::as_str)
                    .and_then(|id| self.decl_ref(id));
            }
            _ => {}
        }

        if matches!(kind, CursorKind::ClassDecl | CursorKind::StructDecl) {
            cursor.children = self.build_record_members(map, &cursor);
        } else {
            cursor.children = self.build_children(node, &Scope::default());
        }

        if kind == CursorKind::CallExpr && cursor.spelling.is_empty() {
            cursor.spelling = call_spelling(kind_name, &cursor);
        }
        Some(cursor)
    }

    fn build_record_members(&self, map: &serde_json::Map<String, Value>, record: &Cursor) -> Vec<Cursor> {
        let mut members = Vec::new();

        if let Some(bases) = map.get("bases").and_then(Value::as_array) {
            for base in bases {
                let base_map = base.as_object();
                let name = base_map.map(qual_type).unwrap_or_default();
                let access = base_map.map(|b| str_field(b, "access")).unwrap_or("");
                members.push(
                    Cursor::new(CursorKind::CxxBaseSpecifier)
                        .with_spelling(name.clone())
                        .with_type(name)
                        .with_access(AccessSpecifier::from_str(access)),
                );
            }
        }

        let mut scope = Scope {
            record: Some(record.to_ref()),
            access: if record.kind == CursorKind::ClassDecl {
                AccessSpecifier::Private
            } else {
                AccessSpecifier::Public
            },
        };
        let Some(children) = map.get("inner").and_then(Value::as_array) else {
            return members;
        };
        for child in children {
            let Some(member) = self.build(child, &scope) else {
                continue;
            };
            if member.kind == CursorKind::CxxAccessSpecDecl {
                scope.access = member.access;
            }
            members.push(member);
        }
        members
    }

    fn decl_ref(&self, id: &str) -> Option<CursorRef> {
        self.decls
            .get(id)
            .map(|d| CursorRef::new(d.kind, d.name.clone(), Some(d.usr.clone())))
    }

    /// `referencedDecl` objects carry id, kind and name only.
    fn bare_decl_ref(&self, value: &Value) -> Option<CursorRef> {
        let map = value.as_object()?;
        if let Some(found) = self.decl_ref(str_field(map, "id")) {
            return Some(found);
        }
        Some(CursorRef::new(
            map_kind(str_field(map, "kind"), map),
            str_field(map, "name"),
            None,
        ))
    }
}

fn str_field<'a>(map: &'a serde_json::Map<String, Value>, key: &str) -> &'a str {
    map.get(key).and_then(Value::as_str).unwrap_or("")
}

fn qual_type(map: &serde_json::Map<String, Value>) -> String {
    map.get("type")
        .and_then(|t| t.get("qualType"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn record_kind(map: &serde_json::Map<String, Value>) -> CursorKind {
    match str_field(map, "tagUsed") {
        "class" => CursorKind::ClassDecl,
        "union" => CursorKind::Unknown,
        _ => CursorKind::StructDecl,
    }
}

/// Map a clang AST node kind onto the libclang-style cursor kinds.
fn map_kind(kind: &str, map: &serde_json::Map<String, Value>) -> CursorKind {
    match kind {
        "TranslationUnitDecl" => CursorKind::TranslationUnit,
        "NamespaceDecl" => CursorKind::Namespace,
        "FunctionDecl" => CursorKind::FunctionDecl,
        "CXXMethodDecl" | "CXXConversionDecl" => CursorKind::CxxMethod,
        "CXXConstructorDecl" => CursorKind::Constructor,
        "CXXDestructorDecl" => CursorKind::Destructor,
        "CXXRecordDecl" | "RecordDecl" => record_kind(map),
        "UsingDirectiveDecl" => CursorKind::UsingDirective,
        "UsingDecl" => CursorKind::UsingDeclaration,
        "AccessSpecDecl" => CursorKind::CxxAccessSpecDecl,
        "FieldDecl" => CursorKind::FieldDecl,
        "ParmVarDecl" => CursorKind::ParmDecl,
        "VarDecl" => CursorKind::VarDecl,
        "CompoundStmt" => CursorKind::CompoundStmt,
        "ForStmt" => CursorKind::ForStmt,
        "CXXForRangeStmt" => CursorKind::CxxForRangeStmt,
        "WhileStmt" => CursorKind::WhileStmt,
        "DoStmt" => CursorKind::DoStmt,
        "IfStmt" => CursorKind::IfStmt,
        "SwitchStmt" => CursorKind::SwitchStmt,
        "CXXTryStmt" => CursorKind::CxxTryStmt,
        "ReturnStmt" => CursorKind::ReturnStmt,
        "DeclStmt" => CursorKind::DeclStmt,
        "BreakStmt" => CursorKind::BreakStmt,
        "ContinueStmt" => CursorKind::ContinueStmt,
        "NullStmt" => CursorKind::NullStmt,
        "CallExpr" | "CXXMemberCallExpr" | "CXXOperatorCallExpr" | "CXXConstructExpr"
        | "CXXTemporaryObjectExpr" => CursorKind::CallExpr,
        "MemberExpr" => CursorKind::MemberRefExpr,
        "DeclRefExpr" => CursorKind::DeclRefExpr,
        "ImplicitCastExpr" | "ExprWithCleanups" | "MaterializeTemporaryExpr"
        | "CXXBindTemporaryExpr" => CursorKind::UnexposedExpr,
        "BinaryOperator" => CursorKind::BinaryOperator,
        "CompoundAssignOperator" => CursorKind::CompoundAssignOperator,
        "UnaryOperator" => CursorKind::UnaryOperator,
        "CXXDeleteExpr" => CursorKind::CxxDeleteExpr,
        _ => CursorKind::Unknown,
    }
}

/// Constructor calls are named after the constructed type, other calls
/// after the referenced callee.
fn call_spelling(kind_name: &str, call: &Cursor) -> String {
    if matches!(kind_name, "CXXConstructExpr" | "CXXTemporaryObjectExpr") {
        return call.type_spelling.clone();
    }
    let mut current = call.children.first();
    while let Some(c) = current {
        if let Some(referenced) = &c.referenced {
            return referenced.spelling.clone();
        }
        if c.kind != CursorKind::UnexposedExpr {
            break;
        }
        current = c.children.first();
    }
    String::new()
}

fn read_point(value: Option<&Value>) -> SourceLocation {
    let Some(value) = value else {
        return SourceLocation::default();
    };
    let value = value.get("expansionLoc").unwrap_or(value);
    let u32_field = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_u64)
            .map(|v| v as u32)
            .unwrap_or(0)
    };
    SourceLocation {
        file: value.get("file").and_then(Value::as_str).map(str::to_string),
        line: u32_field("line"),
        column: u32_field("col"),
    }
}

fn node_location(map: &serde_json::Map<String, Value>) -> SourceLocation {
    match map.get("loc") {
        Some(loc) if loc.as_object().is_some_and(|m| !m.is_empty()) => read_point(Some(loc)),
        _ => read_point(map.get("range").and_then(|r| r.get("begin"))),
    }
}

fn node_extent(map: &serde_json::Map<String, Value>) -> Option<SourceExtent> {
    let range = map.get("range")?;
    Some(SourceExtent {
        start: read_point(range.get("begin")),
        end: read_point(range.get("end")),
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Diagnostics
// ═══════════════════════════════════════════════════════════════════════════

/// Parse clang's stderr. `fix-it:` lines attach to the diagnostic before
/// them; include-stack and caret lines are ignored.
pub fn parse_diagnostics(stderr: &str) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    for line in stderr.lines() {
        if let Some(caps) = DIAGNOSTIC_LINE.captures(line) {
            diagnostics.push(Diagnostic {
                severity: Severity::from_str(&caps[4]),
                location: SourceLocation::new(&caps[1], caps[2].parse().unwrap_or(0), caps[3].parse().unwrap_or(0)),
                message: caps[5].to_string(),
                fixits: Vec::new(),
            });
        } else if let Some(caps) = FIXIT_LINE.captures(line) {
            let Some(last) = diagnostics.last_mut() else {
                continue;
            };
            let point = |l: &str, c: &str| {
                SourceLocation::new(&caps[1], l.parse().unwrap_or(0), c.parse().unwrap_or(0))
            };
            last.fixits.push(FixIt {
                range: SourceExtent {
                    start: point(&caps[2], &caps[3]),
                    end: point(&caps[4], &caps[5]),
                },
                replacement: caps[6].to_string(),
            });
        }
    }
    diagnostics
}
