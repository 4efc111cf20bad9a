//! Rules and the context handed to their callbacks.
//!
//! A [`Rule`] is a capability record: the node type it cares about plus an
//! optional on-enter and an optional on-leave callback. Callbacks receive the
//! rule itself (to read its payload), a [`RuleContext`] to report issues
//! through, and the node being visited.

use std::any::Any;
use std::fmt;
use std::path::Path;

use tree_sitter::Node;

use super::Issue;
use crate::parser::{Language, ParseResult, ScopeTree};

/// Callback invoked when a rule's node type is entered or left.
pub type VisitFn = Box<dyn Fn(&Rule, &mut RuleContext<'_>, Node<'_>) + Send + Sync>;

/// A rule bound to one node type.
///
/// ```
/// use treelint::{Issue, Rule};
///
/// let rule = Rule::new("no-debugger", "debugger_statement").on_enter(|_, ctx, node| {
///     ctx.report(Issue::at_node("unexpected debugger statement", node));
/// });
/// assert!(rule.has_enter());
/// assert!(!rule.has_leave());
/// ```
pub struct Rule {
    id: String,
    node_type: String,
    on_enter: Option<VisitFn>,
    on_leave: Option<VisitFn>,
    data: Option<Box<dyn Any + Send + Sync>>,
}

impl Rule {
    /// A rule with no callbacks yet.
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            on_enter: None,
            on_leave: None,
            data: None,
        }
    }

    /// Set the callback run before the node's children are visited.
    pub fn on_enter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Rule, &mut RuleContext<'_>, Node<'_>) + Send + Sync + 'static,
    {
        self.on_enter = Some(Box::new(f));
        self
    }

    /// Set the callback run after the node's children are visited.
    pub fn on_leave<F>(mut self, f: F) -> Self
    where
        F: Fn(&Rule, &mut RuleContext<'_>, Node<'_>) + Send + Sync + 'static,
    {
        self.on_leave = Some(Box::new(f));
        self
    }

    /// Attach a read-only payload, available to callbacks through [`Rule::data`].
    pub fn with_data<T: Any + Send + Sync>(mut self, data: T) -> Self {
        self.data = Some(Box::new(data));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The node type (tree-sitter kind) this rule is interested in.
    pub fn node_type(&self) -> &str {
        &self.node_type
    }

    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.as_ref().and_then(|d| d.downcast_ref::<T>())
    }

    pub fn has_enter(&self) -> bool {
        self.on_enter.is_some()
    }

    pub fn has_leave(&self) -> bool {
        self.on_leave.is_some()
    }

    /// A rule with neither callback is never invoked.
    pub fn is_inert(&self) -> bool {
        !self.has_enter() && !self.has_leave()
    }

    pub(crate) fn enter_fn(&self) -> Option<&VisitFn> {
        self.on_enter.as_ref()
    }

    pub(crate) fn leave_fn(&self) -> Option<&VisitFn> {
        self.on_leave.as_ref()
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("node_type", &self.node_type)
            .field("on_enter", &self.has_enter())
            .field("on_leave", &self.has_leave())
            .finish()
    }
}

/// The analyzer as seen from inside a rule callback.
///
/// Gives read access to the file being analyzed and a way to report issues.
/// The rule registry is not reachable from here.
pub struct RuleContext<'a> {
    parse_result: &'a ParseResult,
    issues: &'a mut Vec<Issue>,
    rule_id: &'a str,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(
        parse_result: &'a ParseResult,
        issues: &'a mut Vec<Issue>,
        rule_id: &'a str,
    ) -> Self {
        Self {
            parse_result,
            issues,
            rule_id,
        }
    }

    pub fn parse_result(&self) -> &'a ParseResult {
        self.parse_result
    }

    pub fn path(&self) -> &'a Path {
        self.parse_result.path()
    }

    pub fn language(&self) -> Language {
        self.parse_result.language()
    }

    pub fn source(&self) -> &'a [u8] {
        self.parse_result.source()
    }

    pub fn scope_tree(&self) -> Option<&'a ScopeTree> {
        self.parse_result.scope_tree()
    }

    /// Get text for a node of the analyzed tree.
    pub fn node_text(&self, node: Node<'_>) -> &'a str {
        node.utf8_text(self.parse_result.source()).unwrap_or("")
    }

    /// Id of the rule whose callback is running.
    pub fn rule_id(&self) -> &'a str {
        self.rule_id
    }

    /// Append an issue. Issues without a rule id are attributed to the
    /// running rule.
    pub fn report(&mut self, mut issue: Issue) {
        if issue.rule_id.is_none() {
            issue.rule_id = Some(self.rule_id.to_string());
        }
        self.issues.push(issue);
    }

    /// Report `message` at `node`.
    pub fn report_node(&mut self, node: Node<'_>, message: impl Into<String>) {
        self.report(Issue::at_node(message, node));
    }

    /// Number of issues reported so far in this analysis.
    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }
}
