//! Issues raised by rules.

use std::fmt;

use serde::Serialize;

use crate::parser::Span;

/// Handle to a syntax node that outlives the borrow of its tree.
///
/// Resolve it back into a node with
/// [`ParseResult::resolve_node`](crate::ParseResult::resolve_node) while the
/// originating parse result is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeRef {
    /// tree-sitter node id, unique within one tree.
    pub id: usize,
    pub kind: &'static str,
    pub span: Span,
}

impl NodeRef {
    pub fn new(node: tree_sitter::Node<'_>) -> Self {
        Self {
            id: node.id(),
            kind: node.kind(),
            span: Span::from_node(node),
        }
    }
}

impl From<tree_sitter::Node<'_>> for NodeRef {
    fn from(node: tree_sitter::Node<'_>) -> Self {
        NodeRef::new(node)
    }
}

/// A diagnostic raised during analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// The message to display to the user.
    pub message: String,
    /// Where in the source the issue is.
    pub range: Span,
    /// The node that caused the issue, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeRef>,
    /// Id of the rule that raised the issue. Filled in on report if unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
}

impl Issue {
    /// An issue covering an arbitrary range, with no node attached.
    pub fn new(message: impl Into<String>, range: Span) -> Self {
        Self {
            message: message.into(),
            range,
            node: None,
            rule_id: None,
        }
    }

    /// An issue covering `node`.
    pub fn at_node(message: impl Into<String>, node: tree_sitter::Node<'_>) -> Self {
        let node = NodeRef::new(node);
        Self {
            message: message.into(),
            range: node.span,
            node: Some(node),
            rule_id: None,
        }
    }

    pub fn with_rule_id(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.rule_id {
            Some(rule) => write!(f, "{}: {} [{}]", self.range, self.message, rule),
            None => write!(f, "{}: {}", self.range, self.message),
        }
    }
}
