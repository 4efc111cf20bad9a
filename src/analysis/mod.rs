//! Rule-driven analysis of parsed files.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────────┐     ┌────────────┐
//! │ ParseResult │────▶│ Analyzer             │────▶│ Vec<Issue> │
//! └─────────────┘     │  entry index (type)  │     └────────────┘
//!                     │  exit index  (type)  │
//! ┌─────────────┐     └──────────▲───────────┘
//! │ Rules       │────────────────┘  driven by walk_tree
//! └─────────────┘
//! ```
//!
//! One [`Analyzer`] is bound to one parse result and consumed by
//! [`Analyzer::analyze`]. Rules are shared (`Arc<Rule>`) and read-only, so
//! the same rule set can drive analyzers for many files on many threads.

mod analyzer;
mod issue;
mod rule;

pub use analyzer::{Analyzer, AnalyzerOptions};
pub use issue::{Issue, NodeRef};
pub use rule::{Rule, RuleContext, VisitFn};
