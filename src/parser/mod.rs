//! Parse pipeline.
//!
//! This module provides:
//! - [`Language`] / [`Grammar`] resolution from file paths
//! - [`parse`] / [`parse_file`]: source bytes to a [`ParseResult`]
//! - [`scope`]: scope trees attached to every parse
//!
//! ```text
//! path ──▶ Language ──▶ Grammar ──▶ tree-sitter ──▶ ParseResult
//!                                        │              ▲
//!                                        └─▶ ScopeResolver (scope tree)
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use tree_sitter::{Node, Parser as TsParser, Tree};

use crate::error::{Error, Result};

mod language;
pub mod scope;
mod span;

pub use language::{grammar_for, resolve_language, Grammar, GrammarId, Language};
pub use scope::{DefaultScopeResolver, NoScopeResolver, ScopeResolver, ScopeTree};
pub use span::Span;

/// The result of parsing one file.
///
/// Owns the syntax tree and the source it was parsed from. Nothing in it
/// changes after construction.
pub struct ParseResult {
    tree: Tree,
    source: Vec<u8>,
    path: PathBuf,
    grammar: &'static Grammar,
    language: Language,
    scope_tree: Option<ScopeTree>,
}

impl ParseResult {
    /// The root node of the syntax tree.
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The raw source bytes.
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// The source as a string slice (empty if it is not valid UTF-8).
    pub fn source_str(&self) -> &str {
        std::str::from_utf8(&self.source).unwrap_or("")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn grammar(&self) -> &'static Grammar {
        self.grammar
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// The scope hierarchy, if the resolver supports this language.
    pub fn scope_tree(&self) -> Option<&ScopeTree> {
        self.scope_tree.as_ref()
    }

    /// Get text for a node of this tree.
    pub fn node_text(&self, node: Node<'_>) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// Whether the tree contains ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Find the live node a [`NodeRef`](crate::NodeRef) was taken from.
    pub fn resolve_node(&self, node_ref: &crate::NodeRef) -> Option<Node<'_>> {
        let span = node_ref.span;
        let mut cursor = self.tree.walk();
        let mut pending = vec![self.root_node()];

        // Only subtrees covering the span can hold the node. Zero-width
        // nodes (MISSING tokens) may sit on a sibling boundary, so every
        // covering child is searched, not just the first.
        while let Some(node) = pending.pop() {
            if node.id() == node_ref.id {
                return Some(node);
            }
            cursor.reset(node);
            if !cursor.goto_first_child() {
                continue;
            }
            loop {
                let child = cursor.node();
                if covers(child, &span) {
                    pending.push(child);
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        None
    }
}

fn covers(node: Node<'_>, span: &Span) -> bool {
    node.start_byte() <= span.start_byte && span.end_byte <= node.end_byte()
}

impl fmt::Debug for ParseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseResult")
            .field("path", &self.path)
            .field("language", &self.language)
            .field("grammar", &self.grammar)
            .field("source_len", &self.source.len())
            .field("has_scope_tree", &self.scope_tree.is_some())
            .finish()
    }
}

/// Parse `source` with an explicit grammar.
///
/// Callers that already know the language can skip extension-based guessing.
/// The scope tree is built with [`DefaultScopeResolver`].
pub fn parse<P: AsRef<Path>>(
    path: P,
    source: Vec<u8>,
    language: Language,
    grammar: &'static Grammar,
) -> Result<ParseResult> {
    parse_with_resolver(path, source, language, grammar, &DefaultScopeResolver)
}

/// Like [`parse`], with a caller-supplied scope resolver.
pub fn parse_with_resolver<P: AsRef<Path>>(
    path: P,
    source: Vec<u8>,
    language: Language,
    grammar: &'static Grammar,
    resolver: &dyn ScopeResolver,
) -> Result<ParseResult> {
    let path = path.as_ref();
    let parse_error = |reason: String| Error::Parse {
        path: path.to_path_buf(),
        reason,
    };

    let mut parser = TsParser::new();
    parser
        .set_language(grammar.ts_language())
        .map_err(|e| parse_error(e.to_string()))?;
    let tree = parser
        .parse(&source, None)
        .ok_or_else(|| parse_error("parser produced no tree".to_string()))?;

    let root = tree.root_node();
    if root.has_error() {
        warn!(path = %path.display(), language = %language, "syntax errors in source");
    }
    debug!(
        path = %path.display(),
        language = %language,
        grammar = grammar.name(),
        nodes = root.descendant_count(),
        "parsed"
    );

    let scope_tree = resolver.build_scope_tree(language, root, &source);

    Ok(ParseResult {
        tree,
        source,
        path: path.to_path_buf(),
        grammar,
        language,
        scope_tree,
    })
}

/// Parse in-memory `source`, resolving the language from `path`.
pub fn parse_source<P: AsRef<Path>>(path: P, source: Vec<u8>) -> Result<ParseResult> {
    let path = path.as_ref();
    let language = resolve_language(path);
    let grammar = grammar_for(language).ok_or_else(|| Error::UnsupportedLanguage {
        path: path.to_path_buf(),
    })?;
    parse(path, source, language, grammar)
}

/// Parse the file at `path` using the grammar for its extension.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParseResult> {
    let path = path.as_ref();
    let language = resolve_language(path);
    let grammar = grammar_for(language).ok_or_else(|| Error::UnsupportedLanguage {
        path: path.to_path_buf(),
    })?;

    let source = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse(path, source, language, grammar)
}
