//! Hand-built cursor trees shaped like the clang front end's output.

#![allow(dead_code)]

use codereptile::domain::cursor::{AccessSpecifier, Cursor, CursorKind, CursorRef, TranslationUnit};

pub const FILE: &str = "main.cpp";

/// `name()` through the usual implicit-cast wrapper.
pub fn call(name: &str, usr: &str) -> Cursor {
    Cursor::new(CursorKind::CallExpr)
        .with_spelling(name)
        .at(FILE, 1, 1)
        .with_child(
            Cursor::new(CursorKind::UnexposedExpr).with_child(
                Cursor::new(CursorKind::DeclRefExpr)
                    .with_spelling(name)
                    .with_referenced(CursorRef::new(CursorKind::FunctionDecl, name, Some(usr.to_string()))),
            ),
        )
}

/// `this->name()`.
pub fn member_call(name: &str, usr: &str) -> Cursor {
    Cursor::new(CursorKind::CallExpr)
        .with_spelling(name)
        .at(FILE, 1, 1)
        .with_child(
            Cursor::new(CursorKind::MemberRefExpr)
                .with_spelling(name)
                .with_referenced(CursorRef::new(CursorKind::CxxMethod, name, Some(usr.to_string()))),
        )
}

pub fn compound(stmts: Vec<Cursor>) -> Cursor {
    Cursor::new(CursorKind::CompoundStmt).with_children(stmts)
}

pub fn if_else(then_stmts: Vec<Cursor>, else_stmts: Vec<Cursor>) -> Cursor {
    Cursor::new(CursorKind::IfStmt)
        .at(FILE, 2, 5)
        .with_child(Cursor::new(CursorKind::BinaryOperator))
        .with_child(compound(then_stmts))
        .with_child(compound(else_stmts))
}

pub fn for_loop(body: Vec<Cursor>) -> Cursor {
    Cursor::new(CursorKind::ForStmt)
        .at(FILE, 3, 5)
        .with_child(Cursor::new(CursorKind::DeclStmt))
        .with_child(Cursor::new(CursorKind::BinaryOperator))
        .with_child(Cursor::new(CursorKind::UnaryOperator))
        .with_child(compound(body))
}

pub fn ret() -> Cursor {
    Cursor::new(CursorKind::ReturnStmt).at(FILE, 4, 5)
}

pub fn function_decl(name: &str, usr: &str) -> Cursor {
    Cursor::new(CursorKind::FunctionDecl)
        .with_spelling(name)
        .with_usr(usr)
        .at(FILE, 1, 1)
}

pub fn function(name: &str, usr: &str, body: Vec<Cursor>) -> Cursor {
    function_decl(name, usr).with_child(compound(body))
}

pub fn method(name: &str, usr: &str, owner: &Cursor, access: AccessSpecifier, body: Option<Vec<Cursor>>) -> Cursor {
    let decl = Cursor::new(CursorKind::CxxMethod)
        .with_spelling(name)
        .with_usr(usr)
        .with_access(access)
        .at(FILE, 5, 5)
        .with_semantic_parent(owner.to_ref());
    match body {
        Some(stmts) => decl.with_child(compound(stmts)),
        None => decl,
    }
}

pub fn class(name: &str, usr: &str) -> Cursor {
    Cursor::new(CursorKind::ClassDecl)
        .with_spelling(name)
        .with_usr(usr)
        .at(FILE, 5, 1)
}

pub fn translation_unit(path: &str, decls: Vec<Cursor>) -> TranslationUnit {
    TranslationUnit::new(path, Cursor::new(CursorKind::TranslationUnit).with_children(decls))
}
