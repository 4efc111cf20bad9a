//! Rule registry and dispatch.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{error, warn};
use tree_sitter::Node;

use super::{Issue, Rule, RuleContext, VisitFn};
use crate::error::Result;
use crate::parser::{self, Language, ParseResult};
use crate::walk::{walk_tree, Visitor};

/// Tunables for an [`Analyzer`].
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AnalyzerOptions {
    /// Run each rule callback under `catch_unwind`. A panicking callback is
    /// logged and skipped and the traversal carries on.
    #[serde(default)]
    pub isolate_rule_panics: bool,
}

/// Runs a set of rules over one parsed file.
///
/// Rules are indexed by node type and phase, so a node whose type no rule
/// asked for costs one map lookup. Within a bucket rules run in
/// registration order.
pub struct Analyzer {
    parse_result: Arc<ParseResult>,
    options: AnalyzerOptions,
    /// Every registered rule, in registration order.
    rules: Vec<Arc<Rule>>,
    /// Rules to run when entering a node, by node type.
    entry_rules_for_node: HashMap<String, Vec<Arc<Rule>>>,
    /// Rules to run when leaving a node, by node type.
    exit_rules_for_node: HashMap<String, Vec<Arc<Rule>>>,
    issues_raised: Vec<Issue>,
}

impl Analyzer {
    /// Bind `rules` to `parse_result`.
    pub fn new<R>(parse_result: impl Into<Arc<ParseResult>>, rules: R) -> Self
    where
        R: IntoIterator,
        R::Item: Into<Arc<Rule>>,
    {
        Self::with_options(parse_result, rules, AnalyzerOptions::default())
    }

    pub fn with_options<R>(
        parse_result: impl Into<Arc<ParseResult>>,
        rules: R,
        options: AnalyzerOptions,
    ) -> Self
    where
        R: IntoIterator,
        R::Item: Into<Arc<Rule>>,
    {
        let mut analyzer = Self {
            parse_result: parse_result.into(),
            options,
            rules: Vec::new(),
            entry_rules_for_node: HashMap::new(),
            exit_rules_for_node: HashMap::new(),
            issues_raised: Vec::new(),
        };
        for rule in rules {
            analyzer.add_rule(rule);
        }
        analyzer
    }

    /// Parse the file at `path` and bind `rules` to it.
    pub fn from_file<P, R>(path: P, rules: R) -> Result<Self>
    where
        P: AsRef<Path>,
        R: IntoIterator,
        R::Item: Into<Arc<Rule>>,
    {
        let parse_result = parser::parse_file(path)?;
        Ok(Self::new(parse_result, rules))
    }

    /// Register another rule.
    pub fn add_rule(&mut self, rule: impl Into<Arc<Rule>>) {
        let rule = rule.into();
        if rule.is_inert() {
            warn!(
                rule = rule.id(),
                node_type = rule.node_type(),
                "rule has no callbacks and will never run"
            );
        }

        if rule.has_enter() {
            self.entry_rules_for_node
                .entry(rule.node_type().to_string())
                .or_default()
                .push(Arc::clone(&rule));
        }
        if rule.has_leave() {
            self.exit_rules_for_node
                .entry(rule.node_type().to_string())
                .or_default()
                .push(Arc::clone(&rule));
        }
        self.rules.push(rule);
    }

    /// Walk the whole tree, running every rule, and return the issues in
    /// the order they were reported.
    pub fn analyze(mut self) -> Vec<Issue> {
        let parse_result = Arc::clone(&self.parse_result);
        walk_tree(parse_result.root_node(), &mut self);
        self.issues_raised
    }

    pub fn parse_result(&self) -> &Arc<ParseResult> {
        &self.parse_result
    }

    pub fn language(&self) -> Language {
        self.parse_result.language()
    }

    pub fn rules(&self) -> &[Arc<Rule>] {
        &self.rules
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Rules run when entering nodes of `node_type`, in run order.
    pub fn entry_rules_for(&self, node_type: &str) -> &[Arc<Rule>] {
        self.entry_rules_for_node
            .get(node_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Rules run when leaving nodes of `node_type`, in run order.
    pub fn exit_rules_for(&self, node_type: &str) -> &[Arc<Rule>] {
        self.exit_rules_for_node
            .get(node_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Issues reported so far.
    pub fn issues(&self) -> &[Issue] {
        &self.issues_raised
    }

    /// Append an issue.
    pub fn report(&mut self, issue: Issue) {
        self.issues_raised.push(issue);
    }
}

/// Run one callback, optionally shielding the traversal from its panics.
fn invoke(
    visit_fn: &VisitFn,
    rule: &Rule,
    ctx: &mut RuleContext<'_>,
    node: Node<'_>,
    isolate: bool,
) {
    if !isolate {
        visit_fn(rule, ctx, node);
        return;
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| visit_fn(rule, ctx, node)));
    if outcome.is_err() {
        error!(
            rule = rule.id(),
            node_type = node.kind(),
            line = node.start_position().row + 1,
            "rule callback panicked; skipping"
        );
    }
}

impl Visitor for Analyzer {
    fn on_enter_node(&mut self, node: Node<'_>) -> bool {
        if let Some(rules) = self.entry_rules_for_node.get(node.kind()) {
            for rule in rules {
                if let Some(visit_fn) = rule.enter_fn() {
                    let mut ctx =
                        RuleContext::new(&self.parse_result, &mut self.issues_raised, rule.id());
                    invoke(
                        visit_fn,
                        rule,
                        &mut ctx,
                        node,
                        self.options.isolate_rule_panics,
                    );
                }
            }
        }
        true
    }

    fn on_leave_node(&mut self, node: Node<'_>) {
        if let Some(rules) = self.exit_rules_for_node.get(node.kind()) {
            for rule in rules {
                if let Some(visit_fn) = rule.leave_fn() {
                    let mut ctx =
                        RuleContext::new(&self.parse_result, &mut self.issues_raised, rule.id());
                    invoke(
                        visit_fn,
                        rule,
                        &mut ctx,
                        node,
                        self.options.isolate_rule_panics,
                    );
                }
            }
        }
    }
}
