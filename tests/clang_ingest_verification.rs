/// Clang JSON ingestion verified end to end on literal AST dumps, so no
/// clang installation is required.

use codereptile::domain::callgraph::CallResolver;
use codereptile::domain::cursor::{AccessSpecifier, CursorKind, TranslationUnit};
use codereptile::domain::reducer::{AstReducer, ErrorPolicy, ReduceReport};
use codereptile::domain::tree::{AccessTag, CodeTree, NodeKind};
use codereptile::infrastructure::clang_ingest::{parse_diagnostics, ClangJsonIngestor};

/// class Counter {
/// public:
///   void bump() { tick(); }
/// private:
///   void tick() {}
/// };
/// int helper(int x) { return x; }
/// int main() { Counter c; c.bump(); return helper(1); }
const COUNTER_AST: &str = r##"{
  "id": "0x1", "kind": "TranslationUnitDecl", "loc": {}, "range": {"begin": {}, "end": {}},
  "inner": [
    {"id": "0x2", "kind": "TypedefDecl", "loc": {}, "range": {"begin": {}, "end": {}},
     "isImplicit": true, "name": "__int128_t", "type": {"qualType": "__int128"}},
    {"id": "0x3", "kind": "TypedefDecl",
     "loc": {"offset": 1200, "file": "/usr/include/x86_64-linux-gnu/bits/types.h", "line": 31, "col": 23, "tokLen": 8},
     "range": {"begin": {"offset": 1178, "col": 1, "tokLen": 7}, "end": {"offset": 1200, "col": 23, "tokLen": 8}},
     "name": "__u_char", "type": {"qualType": "unsigned char"}},
    {"id": "0x10", "kind": "CXXRecordDecl",
     "loc": {"offset": 6, "file": "counter.cpp", "line": 1, "col": 7, "tokLen": 7},
     "range": {"begin": {"offset": 0, "col": 1, "tokLen": 5}, "end": {"offset": 90, "line": 6, "col": 1, "tokLen": 1}},
     "name": "Counter", "tagUsed": "class", "completeDefinition": true,
     "inner": [
       {"id": "0x11", "kind": "CXXRecordDecl",
        "loc": {"offset": 6, "line": 1, "col": 7, "tokLen": 7},
        "range": {"begin": {"offset": 0, "col": 1, "tokLen": 5}, "end": {"offset": 6, "col": 7, "tokLen": 7}},
        "isImplicit": true, "name": "Counter", "tagUsed": "class"},
       {"id": "0x12", "kind": "AccessSpecDecl",
        "loc": {"offset": 16, "line": 2, "col": 1, "tokLen": 6},
        "range": {"begin": {"offset": 16, "col": 1, "tokLen": 6}, "end": {"offset": 22, "col": 7, "tokLen": 1}},
        "access": "public"},
       {"id": "0x13", "kind": "CXXMethodDecl",
        "loc": {"offset": 31, "line": 3, "col": 8, "tokLen": 4},
        "range": {"begin": {"offset": 26, "col": 3, "tokLen": 4}, "end": {"offset": 48, "col": 25, "tokLen": 1}},
        "name": "bump", "mangledName": "_ZN7Counter4bumpEv", "type": {"qualType": "void ()"},
        "inner": [
          {"id": "0x14", "kind": "CompoundStmt",
           "range": {"begin": {"offset": 38, "col": 15, "tokLen": 1}, "end": {"offset": 48, "col": 25, "tokLen": 1}},
           "inner": [
             {"id": "0x15", "kind": "CXXMemberCallExpr",
              "range": {"begin": {"offset": 40, "col": 17, "tokLen": 4}, "end": {"offset": 45, "col": 22, "tokLen": 1}},
              "type": {"qualType": "void"}, "valueCategory": "prvalue",
              "inner": [
                {"id": "0x16", "kind": "MemberExpr",
                 "range": {"begin": {"offset": 40, "col": 17, "tokLen": 4}, "end": {"offset": 40, "col": 17, "tokLen": 4}},
                 "type": {"qualType": "<bound member function type>"}, "valueCategory": "prvalue",
                 "name": "tick", "isArrow": true, "referencedMemberDecl": "0x18",
                 "inner": [
                   {"id": "0x17", "kind": "CXXThisExpr",
                    "range": {"begin": {"offset": 40, "col": 17, "tokLen": 4}, "end": {"offset": 40, "col": 17, "tokLen": 4}},
                    "type": {"qualType": "Counter *"}, "valueCategory": "prvalue", "implicit": true, "isImplicit": true}
                 ]}
              ]}
           ]}
        ]},
       {"id": "0x19", "kind": "AccessSpecDecl",
        "loc": {"offset": 52, "line": 4, "col": 1, "tokLen": 7},
        "range": {"begin": {"offset": 52, "col": 1, "tokLen": 7}, "end": {"offset": 59, "col": 8, "tokLen": 1}},
        "access": "private"},
       {"id": "0x18", "kind": "CXXMethodDecl",
        "loc": {"offset": 68, "line": 5, "col": 8, "tokLen": 4},
        "range": {"begin": {"offset": 63, "col": 3, "tokLen": 4}, "end": {"offset": 76, "col": 16, "tokLen": 1}},
        "isReferenced": true, "name": "tick", "mangledName": "_ZN7Counter4tickEv", "type": {"qualType": "void ()"},
        "inner": [
          {"id": "0x1a", "kind": "CompoundStmt",
           "range": {"begin": {"offset": 75, "col": 15, "tokLen": 1}, "end": {"offset": 76, "col": 16, "tokLen": 1}}}
        ]},
       {"id": "0x1b", "kind": "CXXConstructorDecl",
        "loc": {"offset": 6, "line": 1, "col": 7, "tokLen": 7},
        "range": {"begin": {"offset": 6, "col": 7, "tokLen": 7}, "end": {"offset": 6, "col": 7, "tokLen": 7}},
        "isImplicit": true, "isUsed": true, "name": "Counter", "mangledName": "_ZN7CounterC1Ev",
        "type": {"qualType": "void () noexcept"}}
     ]},
    {"id": "0x20", "kind": "FunctionDecl",
     "loc": {"offset": 96, "line": 7, "col": 5, "tokLen": 6},
     "range": {"begin": {"offset": 92, "col": 1, "tokLen": 3}, "end": {"offset": 122, "col": 31, "tokLen": 1}},
     "isUsed": true, "name": "helper", "mangledName": "_Z6helperi", "type": {"qualType": "int (int)"},
     "inner": [
       {"id": "0x21", "kind": "ParmVarDecl",
        "loc": {"offset": 107, "col": 16, "tokLen": 1},
        "range": {"begin": {"offset": 103, "col": 12, "tokLen": 3}, "end": {"offset": 107, "col": 16, "tokLen": 1}},
        "isUsed": true, "name": "x", "type": {"qualType": "int"}},
       {"id": "0x22", "kind": "CompoundStmt",
        "range": {"begin": {"offset": 110, "col": 19, "tokLen": 1}, "end": {"offset": 122, "col": 31, "tokLen": 1}},
        "inner": [
          {"id": "0x23", "kind": "ReturnStmt",
           "range": {"begin": {"offset": 112, "col": 21, "tokLen": 6}, "end": {"offset": 119, "col": 28, "tokLen": 1}},
           "inner": [
             {"id": "0x24", "kind": "ImplicitCastExpr",
              "range": {"begin": {"offset": 119, "col": 28, "tokLen": 1}, "end": {"offset": 119, "col": 28, "tokLen": 1}},
              "type": {"qualType": "int"}, "valueCategory": "prvalue", "castKind": "LValueToRValue",
              "inner": [
                {"id": "0x25", "kind": "DeclRefExpr",
                 "range": {"begin": {"offset": 119, "col": 28, "tokLen": 1}, "end": {"offset": 119, "col": 28, "tokLen": 1}},
                 "type": {"qualType": "int"}, "valueCategory": "lvalue",
                 "referencedDecl": {"id": "0x21", "kind": "ParmVarDecl", "name": "x", "type": {"qualType": "int"}}}
              ]}
           ]}
        ]}
     ]},
    {"id": "0x30", "kind": "FunctionDecl",
     "loc": {"offset": 128, "line": 8, "col": 5, "tokLen": 4},
     "range": {"begin": {"offset": 124, "col": 1, "tokLen": 3}, "end": {"offset": 177, "col": 54, "tokLen": 1}},
     "name": "main", "mangledName": "main", "type": {"qualType": "int ()"},
     "inner": [
       {"id": "0x31", "kind": "CompoundStmt",
        "range": {"begin": {"offset": 135, "col": 12, "tokLen": 1}, "end": {"offset": 177, "col": 54, "tokLen": 1}},
        "inner": [
          {"id": "0x32", "kind": "DeclStmt",
           "range": {"begin": {"offset": 137, "col": 14, "tokLen": 7}, "end": {"offset": 146, "col": 23, "tokLen": 1}},
           "inner": [
             {"id": "0x33", "kind": "VarDecl",
              "loc": {"offset": 145, "col": 22, "tokLen": 1},
              "range": {"begin": {"offset": 137, "col": 14, "tokLen": 7}, "end": {"offset": 145, "col": 22, "tokLen": 1}},
              "isUsed": true, "name": "c", "type": {"qualType": "Counter"}, "init": "call",
              "inner": [
                {"id": "0x34", "kind": "CXXConstructExpr",
                 "range": {"begin": {"offset": 145, "col": 22, "tokLen": 1}, "end": {"offset": 145, "col": 22, "tokLen": 1}},
                 "type": {"qualType": "Counter"}, "valueCategory": "prvalue", "ctorType": {"qualType": "void () noexcept"}}
              ]}
           ]},
          {"id": "0x35", "kind": "CXXMemberCallExpr",
           "range": {"begin": {"offset": 148, "col": 25, "tokLen": 1}, "end": {"offset": 155, "col": 32, "tokLen": 1}},
           "type": {"qualType": "void"}, "valueCategory": "prvalue",
           "inner": [
             {"id": "0x36", "kind": "MemberExpr",
              "range": {"begin": {"offset": 148, "col": 25, "tokLen": 1}, "end": {"offset": 150, "col": 27, "tokLen": 4}},
              "type": {"qualType": "<bound member function type>"}, "valueCategory": "prvalue",
              "name": "bump", "isArrow": false, "referencedMemberDecl": "0x13",
              "inner": [
                {"id": "0x37", "kind": "DeclRefExpr",
                 "range": {"begin": {"offset": 148, "col": 25, "tokLen": 1}, "end": {"offset": 148, "col": 25, "tokLen": 1}},
                 "type": {"qualType": "Counter"}, "valueCategory": "lvalue",
                 "referencedDecl": {"id": "0x33", "kind": "VarDecl", "name": "c", "type": {"qualType": "Counter"}}}
              ]}
           ]},
          {"id": "0x38", "kind": "ReturnStmt",
           "range": {"begin": {"offset": 158, "col": 35, "tokLen": 6}, "end": {"offset": 174, "col": 51, "tokLen": 1}},
           "inner": [
             {"id": "0x39", "kind": "CallExpr",
              "range": {"begin": {"offset": 165, "col": 42, "tokLen": 6}, "end": {"offset": 174, "col": 51, "tokLen": 1}},
              "type": {"qualType": "int"}, "valueCategory": "prvalue",
              "inner": [
                {"id": "0x3a", "kind": "ImplicitCastExpr",
                 "range": {"begin": {"offset": 165, "col": 42, "tokLen": 6}, "end": {"offset": 165, "col": 42, "tokLen": 6}},
                 "type": {"qualType": "int (*)(int)"}, "valueCategory": "prvalue", "castKind": "FunctionToPointerDecay",
                 "inner": [
                   {"id": "0x3b", "kind": "DeclRefExpr",
                    "range": {"begin": {"offset": 165, "col": 42, "tokLen": 6}, "end": {"offset": 165, "col": 42, "tokLen": 6}},
                    "type": {"qualType": "int (int)"}, "valueCategory": "lvalue",
                    "referencedDecl": {"id": "0x20", "kind": "FunctionDecl", "name": "helper", "type": {"qualType": "int (int)"}}}
                 ]},
                {"id": "0x3c", "kind": "IntegerLiteral",
                 "range": {"begin": {"offset": 172, "col": 49, "tokLen": 1}, "end": {"offset": 172, "col": 49, "tokLen": 1}},
                 "type": {"qualType": "int"}, "valueCategory": "prvalue", "value": "1"}
              ]}
           ]}
        ]}
     ]}
  ]
}"##;

/// namespace geo { struct Shape { double area(); }; }
/// double geo::Shape::area() { return 0; }
const SHAPE_AST: &str = r##"{
  "id": "0x1", "kind": "TranslationUnitDecl", "loc": {}, "range": {"begin": {}, "end": {}},
  "inner": [
    {"id": "0x40", "kind": "NamespaceDecl",
     "loc": {"offset": 10, "file": "shape.cpp", "line": 1, "col": 11, "tokLen": 3},
     "range": {"begin": {"offset": 0, "col": 1, "tokLen": 9}, "end": {"offset": 50, "col": 51, "tokLen": 1}},
     "name": "geo",
     "inner": [
       {"id": "0x41", "kind": "CXXRecordDecl",
        "loc": {"offset": 23, "col": 24, "tokLen": 5},
        "range": {"begin": {"offset": 16, "col": 17, "tokLen": 6}, "end": {"offset": 47, "col": 48, "tokLen": 1}},
        "name": "Shape", "tagUsed": "struct", "completeDefinition": true,
        "inner": [
          {"id": "0x42", "kind": "CXXMethodDecl",
           "loc": {"offset": 38, "col": 39, "tokLen": 4},
           "range": {"begin": {"offset": 31, "col": 32, "tokLen": 6}, "end": {"offset": 43, "col": 44, "tokLen": 1}},
           "name": "area", "mangledName": "_ZN3geo5Shape4areaEv", "type": {"qualType": "double ()"}}
        ]}
     ]},
    {"id": "0x43", "kind": "CXXMethodDecl",
     "loc": {"offset": 71, "line": 2, "col": 20, "tokLen": 4},
     "range": {"begin": {"offset": 52, "col": 1, "tokLen": 6}, "end": {"offset": 91, "col": 40, "tokLen": 1}},
     "parentDeclContextId": "0x41", "previousDecl": "0x42",
     "name": "area", "mangledName": "_ZN3geo5Shape4areaEv", "type": {"qualType": "double ()"},
     "inner": [
       {"id": "0x44", "kind": "CompoundStmt",
        "range": {"begin": {"offset": 78, "col": 27, "tokLen": 1}, "end": {"offset": 91, "col": 40, "tokLen": 1}},
        "inner": [
          {"id": "0x45", "kind": "ReturnStmt",
           "range": {"begin": {"offset": 80, "col": 29, "tokLen": 6}, "end": {"offset": 87, "col": 36, "tokLen": 1}},
           "inner": [
             {"id": "0x46", "kind": "ImplicitCastExpr",
              "range": {"begin": {"offset": 87, "col": 36, "tokLen": 1}, "end": {"offset": 87, "col": 36, "tokLen": 1}},
              "type": {"qualType": "double"}, "valueCategory": "prvalue", "castKind": "IntegralToFloating",
              "inner": [
                {"id": "0x47", "kind": "IntegerLiteral",
                 "range": {"begin": {"offset": 87, "col": 36, "tokLen": 1}, "end": {"offset": 87, "col": 36, "tokLen": 1}},
                 "type": {"qualType": "int"}, "valueCategory": "prvalue", "value": "0"}
              ]}
           ]}
        ]}
     ]}
  ]
}"##;

fn reduce(units: Vec<TranslationUnit>) -> (CodeTree, ReduceReport) {
    let reducer = AstReducer::new(ErrorPolicy::Strict);
    let mut tree = CodeTree::new();
    let mut report = ReduceReport::default();
    for tu in &units {
        reducer
            .reduce_translation_unit(tu, &mut tree, &mut report)
            .expect("fixture should reduce in strict mode");
    }
    CallResolver::new().resolve(&mut tree);
    (tree, report)
}

#[test]
fn test_ingest_drops_implicit_and_keeps_locations() {
    let root = ClangJsonIngestor::new().ingest(COUNTER_AST).unwrap();
    let kinds: Vec<CursorKind> = root.children.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![CursorKind::Unknown, CursorKind::ClassDecl, CursorKind::FunctionDecl, CursorKind::FunctionDecl]
    );
    assert_eq!(root.children[0].kind_label(), "TypedefDecl");

    let class = &root.children[1];
    assert_eq!(class.usr.as_deref(), Some("c:@S@Counter"));
    assert_eq!(class.file_name(), "counter.cpp");
    // Implicit record and constructor are gone, access markers stay.
    let member_kinds: Vec<CursorKind> = class.children.iter().map(|c| c.kind).collect();
    assert_eq!(
        member_kinds,
        vec![
            CursorKind::CxxAccessSpecDecl,
            CursorKind::CxxMethod,
            CursorKind::CxxAccessSpecDecl,
            CursorKind::CxxMethod
        ]
    );
    assert_eq!(class.children[1].access, AccessSpecifier::Public);
    assert_eq!(class.children[3].access, AccessSpecifier::Private);
    assert_eq!(
        class.children[1].semantic_parent.as_ref().and_then(|p| p.usr.as_deref()),
        Some("c:@S@Counter")
    );

    let helper = &root.children[2];
    assert_eq!(helper.file_name(), "counter.cpp", "elided file is inherited");
    assert_eq!(helper.location.line, 7);
    let param = &helper.children[0];
    assert_eq!(param.kind, CursorKind::ParmDecl);
    assert_eq!(param.location.line, 7, "elided line is inherited");
    assert_eq!(param.location.column, 16);
}

#[test]
fn test_counter_reduces_to_class_and_edges() {
    let root = ClangJsonIngestor::new().ingest(COUNTER_AST).unwrap();
    let (tree, report) = reduce(vec![TranslationUnit::new("counter.cpp", root)]);

    assert_eq!(report.filtered, 1, "the bits/types.h typedef is filtered");
    let class_id = tree.classes["c:@S@Counter"];
    assert_eq!(tree.record(class_id).unwrap().members.len(), 2);

    let bump = tree.methods["_ZN7Counter4bumpEv"];
    let tick = tree.methods["_ZN7Counter4tickEv"];
    assert_eq!(tree.function(bump).unwrap().access, AccessTag::Public);
    assert_eq!(tree.function(tick).unwrap().access, AccessTag::Private);

    let helper = tree.functions["_Z6helperi"];
    let params = &tree.function(helper).unwrap().parameters;
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name, "x");
    assert_eq!(params[0].type_name, "int");

    let summary: Vec<(String, bool)> = tree
        .call_edges
        .iter()
        .map(|e| (e.callee_name.clone(), e.is_resolved()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("tick".to_string(), true),
            ("Counter".to_string(), false),
            ("bump".to_string(), true),
            ("helper".to_string(), true),
        ]
    );
    let to_helper = &tree.call_edges[3];
    assert_eq!(to_helper.target, Some(helper));
    assert_eq!(to_helper.location.line, 8);
}

#[test]
fn test_out_of_line_method_through_parent_context() {
    let root = ClangJsonIngestor::new().ingest(SHAPE_AST).unwrap();
    let definition = &root.children[1];
    assert_eq!(definition.kind, CursorKind::CxxMethod);
    assert_eq!(
        definition.semantic_parent.as_ref().and_then(|p| p.usr.as_deref()),
        Some("c:@N@geo@S@Shape")
    );

    let (tree, _) = reduce(vec![TranslationUnit::new("shape.cpp", root)]);
    let shape = tree.structs["c:@N@geo@S@Shape"];
    let area = tree.methods["_ZN3geo5Shape4areaEv"];
    assert_eq!(tree.node(area).parent, Some(shape));
    let f = tree.function(area).unwrap();
    assert!(f.defined);
    assert_eq!(f.access, AccessTag::Public, "struct members default to public");
    assert!(matches!(tree.kind(f.body[0]), NodeKind::CodeBlock { lines } if lines.len() == 1));
}

#[test]
fn test_same_symbol_across_units_updates_in_place() {
    let first = ClangJsonIngestor::new().ingest(SHAPE_AST).unwrap();
    let second = ClangJsonIngestor::new().ingest(SHAPE_AST).unwrap();
    let (tree, _) = reduce(vec![
        TranslationUnit::new("a.cpp", first),
        TranslationUnit::new("b.cpp", second),
    ]);
    assert_eq!(tree.structs.len(), 1);
    assert_eq!(tree.methods.len(), 1);
    assert_eq!(tree.roots.len(), 1);
}

#[test]
fn test_diagnostics_block_strict_reduction() {
    let root = ClangJsonIngestor::new().ingest(SHAPE_AST).unwrap();
    let diagnostics = parse_diagnostics("shape.cpp:2:40: error: expected ';' after return statement\n");
    let tu = TranslationUnit::new("shape.cpp", root).with_diagnostics(diagnostics);

    let mut tree = CodeTree::new();
    let mut report = ReduceReport::default();
    let err = AstReducer::new(ErrorPolicy::Strict)
        .reduce_translation_unit(&tu, &mut tree, &mut report)
        .unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("FOUND 1 DIAGNOSTIC(S) IN shape.cpp"), "got: {}", message);
    assert!(message.contains("shape.cpp:2:40: error: expected ';'"));
}

/// #include <iostream>
/// int main() { return 0; }
const IOSTREAM_AST: &str = r##"{
  "id": "0x1", "kind": "TranslationUnitDecl", "loc": {}, "range": {"begin": {}, "end": {}},
  "inner": [
    {"id": "0x2", "kind": "NamespaceDecl",
     "loc": {"offset": 1570, "file": "/usr/include/c++/11/iostream", "line": 42, "col": 11, "tokLen": 3,
             "includedFrom": {"file": "main.cpp"}},
     "range": {"begin": {"offset": 1560, "col": 1, "tokLen": 9}, "end": {"offset": 2980, "line": 82, "col": 1, "tokLen": 1}},
     "name": "std",
     "inner": [
       {"id": "0x3", "kind": "VarDecl",
        "loc": {"offset": 2890, "line": 74, "col": 25, "tokLen": 8},
        "range": {"begin": {"offset": 2868, "col": 3, "tokLen": 6}, "end": {"offset": 2890, "col": 25, "tokLen": 8}},
        "name": "__ioinit", "type": {"qualType": "ios_base::Init"}, "storageClass": "static"}
     ]},
    {"id": "0x10", "kind": "FunctionDecl",
     "loc": {"offset": 25, "file": "main.cpp", "line": 2, "col": 5, "tokLen": 4},
     "range": {"begin": {"offset": 21, "col": 1, "tokLen": 3}, "end": {"offset": 44, "col": 24, "tokLen": 1}},
     "name": "main", "mangledName": "main", "type": {"qualType": "int ()"},
     "inner": [
       {"id": "0x11", "kind": "CompoundStmt",
        "range": {"begin": {"offset": 32, "col": 12, "tokLen": 1}, "end": {"offset": 44, "col": 24, "tokLen": 1}},
        "inner": [
          {"id": "0x12", "kind": "ReturnStmt",
           "range": {"begin": {"offset": 34, "col": 14, "tokLen": 6}, "end": {"offset": 41, "col": 21, "tokLen": 1}},
           "inner": [
             {"id": "0x13", "kind": "IntegerLiteral",
              "range": {"begin": {"offset": 41, "col": 21, "tokLen": 1}, "end": {"offset": 41, "col": 21, "tokLen": 1}},
              "type": {"qualType": "int"}, "valueCategory": "prvalue", "value": "0"}
           ]}
        ]}
     ]}
  ]
}"##;

#[test]
fn test_iostream_include_reduces_in_strict_mode() {
    let root = ClangJsonIngestor::new().ingest(IOSTREAM_AST).unwrap();
    assert_eq!(root.children[0].kind, CursorKind::Namespace);
    assert_eq!(root.children[0].file_name(), "/usr/include/c++/11/iostream");

    let (tree, report) = reduce(vec![TranslationUnit::new("main.cpp", root)]);
    assert_eq!(report.filtered, 1, "namespace std is dropped whole");
    assert!(report.skipped.is_empty());
    assert_eq!(tree.roots.len(), 1);
    assert!(tree.functions.contains_key("main"));
}
