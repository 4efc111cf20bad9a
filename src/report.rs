//! Output formatting for check results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::Serialize;

use crate::analysis::Issue;
use crate::parser::Language;
use crate::runner::RunResult;

// =============================================================================
// JSON Format
// =============================================================================

/// Top-level JSON report.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub files_scanned: usize,
    pub issue_count: usize,
    pub files: Vec<JsonFile>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<JsonError>,
}

/// Issues for one file. Files without issues are omitted.
#[derive(Debug, Serialize)]
pub struct JsonFile {
    pub path: String,
    pub language: Language,
    pub issues: Vec<JsonIssue>,
}

#[derive(Debug, Serialize)]
pub struct JsonIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct JsonError {
    pub path: String,
    pub message: String,
}

/// Build the JSON report for a run over `path`.
pub fn build_json_report(path: &str, result: &RunResult) -> JsonReport {
    let files = result
        .files
        .iter()
        .filter(|f| !f.issues.is_empty())
        .map(|f| JsonFile {
            path: f.path.to_string_lossy().to_string(),
            language: f.language,
            issues: f.issues.iter().map(issue_to_json).collect(),
        })
        .collect();

    let errors = result
        .failures
        .iter()
        .map(|f| JsonError {
            path: f.path.to_string_lossy().to_string(),
            message: f.error.to_string(),
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        files_scanned: result.scanned(),
        issue_count: result.issue_count(),
        files,
        errors,
    }
}

/// Write results in JSON format.
pub fn write_json(path: &str, result: &RunResult) -> anyhow::Result<()> {
    let report = build_json_report(path, result);
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

fn issue_to_json(issue: &Issue) -> JsonIssue {
    JsonIssue {
        rule: issue.rule_id.clone(),
        line: issue.range.start_line,
        column: issue.range.start_col,
        end_line: issue.range.end_line,
        end_column: issue.range.end_col,
        node_type: issue.node.map(|n| n.kind.to_string()),
        message: issue.message.clone(),
    }
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(path: &str, result: &RunResult) {
    // Header
    println!();
    print!("  ");
    print!("{}", "treelint".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Scanning: ".dimmed());
    println!("{}", path);
    println!();

    let count = result.issue_count();
    if count > 0 {
        println!("  {} ({}):", "Issues".bold(), count);
        println!();
        for file in result.files.iter().filter(|f| !f.issues.is_empty()) {
            let file_path = file.path.to_string_lossy();
            for issue in &file.issues {
                write_issue(&file_path, issue);
            }
        }
    }

    if !result.failures.is_empty() {
        println!("  {} ({}):", "Errors".red().bold(), result.failures.len());
        println!();
        for failure in &result.failures {
            println!("    {}", failure.path.display().to_string().blue());
            println!("            {}", failure.error);
        }
        println!();
    }

    write_final_status(result);
    println!();
}

fn write_issue(file_path: &str, issue: &Issue) {
    let rule = issue.rule_id.as_deref().unwrap_or("-");
    print!("    {:<20}", rule.dimmed());
    print!("{}", file_path.blue());
    println!("{}", format!(":{}", issue.range).dimmed());

    // Message on next line, indented
    println!("            {}", issue.message);
    println!();
}

fn write_final_status(result: &RunResult) {
    let plural = if result.scanned() != 1 { "s" } else { "" };
    print!(
        "  {}",
        format!("{} file{} scanned", result.scanned(), plural).dimmed()
    );
    print!("  ");

    if result.has_issues() {
        print!("{}", format!("{} issue(s)", result.issue_count()).red());
    } else {
        print!("{}", "CLEAN".green());
    }
    println!();
}
