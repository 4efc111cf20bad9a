//! Lexical scope trees.
//!
//! A [`ScopeTree`] is an arena of [`Scope`]s addressed by [`ScopeId`]. The
//! root scope covers the whole file; every other scope has exactly one
//! parent. Scopes record the names bound directly inside them.
//!
//! Scope resolution sits behind the [`ScopeResolver`] trait so hosts can
//! plug in their own. [`DefaultScopeResolver`] covers Python and the
//! JavaScript/TypeScript family; it tracks declarations only and does not
//! resolve references, hoisting or `global`/`nonlocal`.

use tree_sitter::Node;

use super::{Language, Span};
use crate::walk::{walk_tree, Visitor};

/// Index of a scope inside its [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// What introduced a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    Module,
    Function,
    Class,
    Block,
    Comprehension,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Module => "module",
            ScopeKind::Function => "function",
            ScopeKind::Class => "class",
            ScopeKind::Block => "block",
            ScopeKind::Comprehension => "comprehension",
        }
    }
}

/// How a name was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Variable,
    Parameter,
    Function,
    Class,
    Import,
}

/// A name bound in a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Span of the identifier that introduced the name.
    pub span: Span,
}

/// A single lexical scope.
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Span of the node that introduced the scope.
    pub span: Span,
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    /// Bindings in declaration order.
    pub bindings: Vec<Binding>,
}

impl Scope {
    /// First binding of `name` declared directly in this scope.
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name == name)
    }
}

/// Scope hierarchy of one file.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    fn with_root(kind: ScopeKind, span: Span) -> Self {
        Self {
            scopes: vec![Scope {
                kind,
                span,
                parent: None,
                children: Vec::new(),
                bindings: Vec::new(),
            }],
        }
    }

    fn push(&mut self, parent: ScopeId, kind: ScopeKind, span: Span) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            kind,
            span,
            parent: Some(parent),
            children: Vec::new(),
            bindings: Vec::new(),
        });
        self.scopes[parent.0].children.push(id);
        id
    }

    /// The file-level scope.
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// All scopes in creation (pre-order) order, with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes.iter().enumerate().map(|(i, s)| (ScopeId(i), s))
    }

    /// The innermost scope whose span contains `byte`.
    ///
    /// Offsets outside every child scope resolve to the root.
    pub fn innermost_at(&self, byte: usize) -> ScopeId {
        let mut current = self.root();
        'descend: loop {
            for &child in &self.get(current).children {
                if self.get(child).span.contains_byte(byte) {
                    current = child;
                    continue 'descend;
                }
            }
            return current;
        }
    }

    /// Resolve `name` starting at scope `from` and walking outwards.
    pub fn lookup(&self, name: &str, from: ScopeId) -> Option<(ScopeId, &Binding)> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = self.get(id);
            if let Some(binding) = scope.binding(name) {
                return Some((id, binding));
            }
            current = scope.parent;
        }
        None
    }
}

/// Builds a scope tree for a parsed file.
pub trait ScopeResolver: Send + Sync {
    /// Returns `None` when `language` has no scope support.
    fn build_scope_tree(
        &self,
        language: Language,
        root: Node<'_>,
        source: &[u8],
    ) -> Option<ScopeTree>;
}

/// Resolver that never produces a scope tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScopeResolver;

impl ScopeResolver for NoScopeResolver {
    fn build_scope_tree(&self, _: Language, _: Node<'_>, _: &[u8]) -> Option<ScopeTree> {
        None
    }
}

/// Declaration-level resolver for Python and JavaScript/TypeScript.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultScopeResolver;

impl ScopeResolver for DefaultScopeResolver {
    fn build_scope_tree(
        &self,
        language: Language,
        root: Node<'_>,
        source: &[u8],
    ) -> Option<ScopeTree> {
        if language == Language::Unknown {
            return None;
        }

        let mut builder = ScopeBuilder {
            language,
            source,
            tree: ScopeTree::with_root(ScopeKind::Module, Span::from_node(root)),
            stack: Vec::new(),
        };
        builder.stack.push((root.id(), builder.tree.root()));
        builder.bind_inner(root);

        let mut cursor = root.walk();
        let children: Vec<_> = root.children(&mut cursor).collect();
        for child in children {
            walk_tree(child, &mut builder);
        }

        Some(builder.tree)
    }
}

/// Build a scope tree with the default resolver.
pub fn make_scope_tree(language: Language, root: Node<'_>, source: &[u8]) -> Option<ScopeTree> {
    DefaultScopeResolver.build_scope_tree(language, root, source)
}

struct ScopeBuilder<'s> {
    language: Language,
    source: &'s [u8],
    tree: ScopeTree,
    /// Open scopes, keyed by the id of the node that opened them.
    stack: Vec<(usize, ScopeId)>,
}

impl ScopeBuilder<'_> {
    fn current(&self) -> ScopeId {
        self.stack
            .last()
            .map(|(_, id)| *id)
            .unwrap_or_else(|| self.tree.root())
    }

    fn scope_kind(&self, node: Node<'_>) -> Option<ScopeKind> {
        if self.language == Language::Python {
            match node.kind() {
                "function_definition" | "lambda" => Some(ScopeKind::Function),
                "class_definition" => Some(ScopeKind::Class),
                "list_comprehension"
                | "set_comprehension"
                | "dictionary_comprehension"
                | "generator_expression" => Some(ScopeKind::Comprehension),
                _ => None,
            }
        } else {
            match node.kind() {
                "function_declaration"
                | "function_expression"
                | "function"
                | "generator_function_declaration"
                | "generator_function"
                | "arrow_function"
                | "method_definition" => Some(ScopeKind::Function),
                "class_declaration" | "abstract_class_declaration" | "class" => {
                    Some(ScopeKind::Class)
                }
                "statement_block" | "for_statement" | "for_in_statement" | "catch_clause" => {
                    Some(ScopeKind::Block)
                }
                _ => None,
            }
        }
    }

    fn bind(&mut self, node: Node<'_>, kind: BindingKind) {
        let Ok(name) = node.utf8_text(self.source) else {
            return;
        };
        if name.is_empty() {
            return;
        }
        let scope = self.current();
        self.tree.scopes[scope.0].bindings.push(Binding {
            name: name.to_string(),
            kind,
            span: Span::from_node(node),
        });
    }

    /// Bind every identifier in a destructuring target.
    fn bind_pattern(&mut self, node: Node<'_>, kind: BindingKind) {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => self.bind(node, kind),
            "pair_pattern" => {
                if let Some(value) = node.child_by_field_name("value") {
                    self.bind_pattern(value, kind);
                }
            }
            "assignment_pattern" | "object_assignment_pattern" => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.bind_pattern(left, kind);
                }
            }
            "pattern_list" | "tuple_pattern" | "list_pattern" | "list_splat_pattern"
            | "object_pattern" | "array_pattern" | "rest_pattern" => {
                let children: Vec<_> = node.named_children(&mut node.walk()).collect();
                for child in children {
                    self.bind_pattern(child, kind);
                }
            }
            _ => {}
        }
    }

    /// Names the node declares in the scope that encloses it.
    fn bind_outer(&mut self, node: Node<'_>) {
        let kind = match node.kind() {
            "function_definition" | "function_declaration" | "generator_function_declaration" => {
                BindingKind::Function
            }
            "class_definition" | "class_declaration" | "abstract_class_declaration" => {
                BindingKind::Class
            }
            _ => return,
        };
        if let Some(name) = node.child_by_field_name("name") {
            self.bind(name, kind);
        }
    }

    /// Names the node declares in the current (possibly just opened) scope.
    fn bind_inner(&mut self, node: Node<'_>) {
        match node.kind() {
            // Python
            "parameters" | "lambda_parameters" => {
                let params: Vec<_> = node.named_children(&mut node.walk()).collect();
                for param in params {
                    if let Some(name) = python_param_name(param) {
                        self.bind(name, BindingKind::Parameter);
                    }
                }
            }
            "assignment" | "augmented_assignment" | "for_statement" | "for_in_clause"
                if self.language == Language::Python =>
            {
                if let Some(left) = node.child_by_field_name("left") {
                    self.bind_pattern(left, BindingKind::Variable);
                }
            }
            "named_expression" => {
                if let Some(name) = node.child_by_field_name("name") {
                    self.bind(name, BindingKind::Variable);
                }
            }
            "import_statement" | "import_from_statement" => {
                let names: Vec<_> = node
                    .children_by_field_name("name", &mut node.walk())
                    .collect();
                for name in names {
                    let target = match name.kind() {
                        "aliased_import" => name.child_by_field_name("alias"),
                        "dotted_name" => name.named_child(0),
                        _ => None,
                    };
                    if let Some(target) = target {
                        self.bind(target, BindingKind::Import);
                    }
                }
            }

            // JavaScript / TypeScript
            "variable_declarator" => {
                if let Some(name) = node.child_by_field_name("name") {
                    self.bind_pattern(name, BindingKind::Variable);
                }
            }
            "formal_parameters" => {
                let params: Vec<_> = node.named_children(&mut node.walk()).collect();
                for param in params {
                    let pattern = match param.kind() {
                        "required_parameter" | "optional_parameter" => {
                            param.child_by_field_name("pattern")
                        }
                        _ => Some(param),
                    };
                    if let Some(pattern) = pattern {
                        self.bind_pattern(pattern, BindingKind::Parameter);
                    }
                }
            }
            "arrow_function" => {
                if let Some(param) = node.child_by_field_name("parameter") {
                    self.bind(param, BindingKind::Parameter);
                }
            }
            "catch_clause" => {
                if let Some(param) = node.child_by_field_name("parameter") {
                    self.bind_pattern(param, BindingKind::Parameter);
                }
            }
            "for_in_statement" if node.child_by_field_name("kind").is_some() => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.bind_pattern(left, BindingKind::Variable);
                }
            }
            "function_expression" | "generator_function" | "function" => {
                if let Some(name) = node.child_by_field_name("name") {
                    self.bind(name, BindingKind::Function);
                }
            }
            "import_clause" | "namespace_import" => {
                let idents: Vec<_> = node
                    .named_children(&mut node.walk())
                    .filter(|c| c.kind() == "identifier")
                    .collect();
                for ident in idents {
                    self.bind(ident, BindingKind::Import);
                }
            }
            "import_specifier" => {
                let target = node
                    .child_by_field_name("alias")
                    .or_else(|| node.child_by_field_name("name"));
                if let Some(target) = target {
                    self.bind(target, BindingKind::Import);
                }
            }
            _ => {}
        }
    }
}

impl Visitor for ScopeBuilder<'_> {
    fn on_enter_node(&mut self, node: Node<'_>) -> bool {
        if !node.is_named() {
            return true;
        }
        self.bind_outer(node);
        if let Some(kind) = self.scope_kind(node) {
            let parent = self.current();
            let id = self.tree.push(parent, kind, Span::from_node(node));
            self.stack.push((node.id(), id));
        }
        self.bind_inner(node);
        true
    }

    fn on_leave_node(&mut self, node: Node<'_>) {
        if self.stack.last().map(|(n, _)| *n) == Some(node.id()) {
            self.stack.pop();
        }
    }
}

fn python_param_name(param: Node<'_>) -> Option<Node<'_>> {
    match param.kind() {
        "identifier" => Some(param),
        "default_parameter" | "typed_default_parameter" => param.child_by_field_name("name"),
        "typed_parameter" | "list_splat_pattern" | "dictionary_splat_pattern" => {
            param.named_child(0).and_then(python_param_name)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(language: Language, source: &str) -> ScopeTree {
        let grammar = language.grammar().unwrap();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(grammar.ts_language()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        make_scope_tree(language, tree.root_node(), source.as_bytes()).unwrap()
    }

    fn names(scope: &Scope) -> Vec<&str> {
        scope.bindings.iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn test_unknown_language_has_no_scopes() {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        let tree = parser.parse("x = 1", None).unwrap();
        assert!(make_scope_tree(Language::Unknown, tree.root_node(), b"x = 1").is_none());
        assert!(NoScopeResolver
            .build_scope_tree(Language::Python, tree.root_node(), b"x = 1")
            .is_none());
    }

    #[test]
    fn test_python_scopes() {
        let source = r#"
import os
from typing import List as L

LIMIT = 10

def outer(a, b=2, *rest, **kw):
    total = a + b
    squares = [n * n for n in rest]
    return total

class Box:
    size = 3
"#;
        let tree = build(Language::Python, source);
        let root = tree.get(tree.root());
        assert_eq!(root.kind, ScopeKind::Module);
        assert_eq!(names(root), vec!["os", "L", "LIMIT", "outer", "Box"]);

        let func = tree.get(root.children[0]);
        assert_eq!(func.kind, ScopeKind::Function);
        assert_eq!(names(func), vec!["a", "b", "rest", "kw", "total", "squares"]);
        assert!(func
            .bindings
            .iter()
            .take(4)
            .all(|b| b.kind == BindingKind::Parameter));

        let comp = tree.get(func.children[0]);
        assert_eq!(comp.kind, ScopeKind::Comprehension);
        assert_eq!(names(comp), vec!["n"]);

        let class = tree.get(root.children[1]);
        assert_eq!(class.kind, ScopeKind::Class);
        assert_eq!(names(class), vec!["size"]);
    }

    #[test]
    fn test_scope_ids_follow_creation_order() {
        let tree = build(Language::Python, "def f():\n    g = lambda: 1\nclass C:\n    pass\n");
        assert_eq!(tree.root().index(), 0);
        assert_eq!(tree.len(), 4);
        for (position, (id, scope)) in tree.iter().enumerate() {
            assert_eq!(id.index(), position);
            if let Some(parent) = scope.parent {
                assert!(parent.index() < id.index());
            }
        }
    }

    #[test]
    fn test_python_lookup_walks_outwards() {
        let source = "x = 1\ndef f(y):\n    return x + y\n";
        let tree = build(Language::Python, source);

        let offset = source.find("return").unwrap();
        let inner = tree.innermost_at(offset);
        assert_eq!(tree.get(inner).kind, ScopeKind::Function);

        let (found_in, binding) = tree.lookup("x", inner).unwrap();
        assert_eq!(found_in, tree.root());
        assert_eq!(binding.kind, BindingKind::Variable);

        let (found_in, _) = tree.lookup("y", inner).unwrap();
        assert_eq!(found_in, inner);
        assert!(tree.lookup("missing", inner).is_none());
    }

    #[test]
    fn test_typescript_scopes() {
        let source = r#"
import React, { useState as useS } from "react";
import * as path from "path";

const { a, b: renamed } = load();

function greet(name: string, count?: number): string {
    let message = name;
    return message;
}

class Widget {
    render() {
        return items.map(item => item.id);
    }
}
"#;
        let tree = build(Language::TypeScript, source);
        let root = tree.get(tree.root());
        assert_eq!(
            names(root),
            vec!["React", "useS", "path", "a", "renamed", "greet", "Widget"]
        );

        let greet = tree.get(root.children[0]);
        assert_eq!(greet.kind, ScopeKind::Function);
        assert_eq!(names(greet), vec!["name", "count"]);

        let body = tree.get(greet.children[0]);
        assert_eq!(body.kind, ScopeKind::Block);
        assert_eq!(names(body), vec!["message"]);

        let arrow = tree
            .iter()
            .find(|(_, s)| s.kind == ScopeKind::Function && names(s) == vec!["item"]);
        assert!(arrow.is_some(), "arrow function parameter should be bound");
    }

    #[test]
    fn test_javascript_catch_and_for_of() {
        let source = "for (const x of xs) { try { f(x); } catch (err) { log(err); } }";
        let tree = build(Language::JavaScript, source);

        let for_scope = tree
            .iter()
            .find(|(_, s)| s.binding("x").is_some())
            .map(|(_, s)| s.kind);
        assert_eq!(for_scope, Some(ScopeKind::Block));

        let offset = source.find("log").unwrap();
        let inner = tree.innermost_at(offset);
        assert!(tree.lookup("err", inner).is_some());
        assert!(tree.lookup("x", inner).is_some());
    }
}
