//! Integration tests for grammar resolution, parsing and scope trees.
//!
//! These tests parse the fixtures in `testdata/` from disk.

use std::path::PathBuf;

use treelint::parser::scope::{BindingKind, ScopeKind};
use treelint::{grammar_for, parse, parse_file, GrammarId, Language};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

// =============================================================================
// Resolution and parsing
// =============================================================================

#[test]
fn test_fixtures_parse_cleanly() {
    let cases = [
        ("sample.py", Language::Python, GrammarId::Python),
        ("sample.ts", Language::TypeScript, GrammarId::TypeScript),
        ("component.tsx", Language::Tsx, GrammarId::Tsx),
        ("app.js", Language::JavaScript, GrammarId::Tsx),
    ];

    for (name, language, grammar) in cases {
        let parsed = parse_file(testdata_path().join(name)).expect("fixture should parse");
        assert_eq!(parsed.language(), language, "{}", name);
        assert_eq!(parsed.grammar().id(), grammar, "{}", name);
        assert!(!parsed.has_errors(), "{} has syntax errors", name);
        assert!(parsed.path().ends_with(name));
    }
}

#[test]
fn test_typescript_fixture_has_type_assertion() {
    let parsed = parse_file(testdata_path().join("sample.ts")).unwrap();
    let sexp = parsed.root_node().to_sexp();
    assert!(sexp.contains("type_assertion"), "{}", sexp);
    assert!(sexp.contains("interface_declaration"));
}

#[test]
fn test_typescript_source_through_tsx_grammar_differs() {
    let path = testdata_path().join("sample.ts");
    let source = std::fs::read(&path).unwrap();
    let tsx = grammar_for(Language::Tsx).unwrap();

    let parsed = parse(&path, source, Language::Tsx, tsx).unwrap();
    // `<any>total(...)` is not a type assertion under the TSX grammar.
    assert!(!parsed.root_node().to_sexp().contains("type_assertion"));
}

#[test]
fn test_jsx_in_javascript_fixture() {
    let parsed = parse_file(testdata_path().join("app.js")).unwrap();
    let sexp = parsed.root_node().to_sexp();
    assert!(sexp.contains("jsx_element"), "{}", sexp);
    assert!(sexp.contains("debugger_statement"));
}

// =============================================================================
// Scope trees
// =============================================================================

#[test]
fn test_python_fixture_scopes() {
    let parsed = parse_file(testdata_path().join("sample.py")).unwrap();
    let tree = parsed.scope_tree().expect("python has scope support");
    let module = tree.get(tree.root());

    assert_eq!(module.kind, ScopeKind::Module);
    let names: Vec<_> = module.bindings.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["os", "OD", "Greeter", "placeholder", "main"]);
    assert_eq!(module.binding("OD").unwrap().kind, BindingKind::Import);

    // The comprehension variable lives in its own scope inside `main`.
    let source = parsed.source_str();
    let n_at = source.find("n * n").unwrap();
    let inner = tree.innermost_at(n_at);
    assert_eq!(tree.get(inner).kind, ScopeKind::Comprehension);
    let (_, n) = tree.lookup("n", inner).unwrap();
    assert_eq!(n.kind, BindingKind::Variable);
    let (found_in, argv) = tree.lookup("argv", inner).unwrap();
    assert_eq!(argv.kind, BindingKind::Parameter);
    assert_eq!(tree.get(found_in).kind, ScopeKind::Function);
    assert!(tree.lookup("argv", tree.root()).is_none());
}

#[test]
fn test_tsx_fixture_scopes() {
    let parsed = parse_file(testdata_path().join("component.tsx")).unwrap();
    let tree = parsed.scope_tree().unwrap();
    let module = tree.get(tree.root());

    assert!(module.binding("useState").is_some());
    assert_eq!(module.binding("Counter").unwrap().kind, BindingKind::Function);

    let source = parsed.source_str();
    let at = source.find("setCount(count + 1)").unwrap();
    let scope = tree.innermost_at(at);
    assert!(tree.lookup("setCount", scope).is_some());
    assert!(tree.lookup("start", scope).is_some());
    assert!(tree.lookup("bump", scope).is_some());
    assert!(tree.lookup("setCount", tree.root()).is_none());
}
