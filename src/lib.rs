//! Treelint - rule-driven analysis of concrete syntax trees.
//!
//! Treelint parses Python, JavaScript, TypeScript and TSX source with
//! tree-sitter, walks the resulting tree once, and dispatches each node to
//! the rules registered for its node type. Rules report [`Issue`]s.
//!
//! # Architecture
//!
//! - `parser`: language resolution, grammar handles, parsing and scope trees
//! - `walk`: depth-first traversal with enter/leave callbacks
//! - `analysis`: rules, the analyzer that dispatches them, and issues
//! - `config`: YAML config with exclusions and node-type rules
//! - `runner`: parallel analysis of many files
//! - `report`: output formatting (pretty, JSON)
//!
//! # Example
//!
//! ```no_run
//! use treelint::{parse_file, Analyzer, Rule};
//!
//! let rule = Rule::new("no-debugger", "debugger_statement").on_enter(|_rule, ctx, node| {
//!     ctx.report_node(node, "Unexpected debugger statement");
//! });
//! let parsed = parse_file("app.ts")?;
//! for issue in Analyzer::new(parsed, [rule]).analyze() {
//!     println!("{}", issue);
//! }
//! # Ok::<(), treelint::Error>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod parser;
pub mod report;
pub mod runner;
pub mod walk;

pub use analysis::{Analyzer, AnalyzerOptions, Issue, NodeRef, Rule, RuleContext, VisitFn};
pub use config::Config;
pub use error::{Error, Result};
pub use parser::{
    grammar_for, parse, parse_file, parse_source, parse_with_resolver, resolve_language, Grammar,
    GrammarId, Language, ParseResult, ScopeResolver, ScopeTree, Span,
};
pub use runner::Runner;
pub use walk::{walk_tree, Visitor};
