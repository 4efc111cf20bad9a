//! Multi-file runner.
//!
//! Each file gets its own parse result and analyzer; the rules for a
//! language are built once and shared across worker threads.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::analysis::{Analyzer, AnalyzerOptions, Issue, Rule};
use crate::config::Config;
use crate::error::Error;
use crate::parser::{self, Language};

/// Issues found in one file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub language: Language,
    pub issues: Vec<Issue>,
}

/// A file that could not be analyzed.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: Error,
}

/// Outcome of a run over many files.
#[derive(Debug, Default)]
pub struct RunResult {
    /// Analyzed files, sorted by path.
    pub files: Vec<FileReport>,
    /// Files that failed to parse or read, sorted by path.
    pub failures: Vec<FileFailure>,
}

impl RunResult {
    pub fn issue_count(&self) -> usize {
        self.files.iter().map(|f| f.issues.len()).sum()
    }

    pub fn scanned(&self) -> usize {
        self.files.len() + self.failures.len()
    }

    pub fn has_issues(&self) -> bool {
        self.files.iter().any(|f| !f.issues.is_empty())
    }
}

/// Runs configured rules over a set of files.
pub struct Runner {
    rules: HashMap<Language, Vec<Arc<Rule>>>,
    options: AnalyzerOptions,
}

impl Runner {
    /// Build the rule sets for every language from `config`.
    pub fn new(config: &Config) -> Self {
        let rules = Language::ALL
            .iter()
            .map(|&lang| (lang, config.rules_for(lang)))
            .collect();
        Self {
            rules,
            options: config.analyzer_options(),
        }
    }

    /// Use explicit rule sets instead of configured ones.
    pub fn with_rules(rules: HashMap<Language, Vec<Arc<Rule>>>, options: AnalyzerOptions) -> Self {
        Self { rules, options }
    }

    fn rules_for(&self, language: Language) -> Vec<Arc<Rule>> {
        self.rules.get(&language).cloned().unwrap_or_default()
    }

    /// Analyze a single file.
    pub fn run_file(&self, path: &Path) -> Result<FileReport, Error> {
        let parse_result = parser::parse_file(path)?;
        let language = parse_result.language();
        let analyzer = Analyzer::with_options(parse_result, self.rules_for(language), self.options);
        let issues = analyzer.analyze();
        debug!(path = %path.display(), issues = issues.len(), "analyzed");

        Ok(FileReport {
            path: path.to_path_buf(),
            language,
            issues,
        })
    }

    /// Analyze `files` in parallel. Per-file failures are collected, not fatal.
    pub fn run(&self, files: &[PathBuf]) -> RunResult {
        let outcomes: Vec<_> = files.par_iter().map(|p| (p, self.run_file(p))).collect();

        let mut result = RunResult::default();
        for (path, outcome) in outcomes {
            match outcome {
                Ok(report) => result.files.push(report),
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping file");
                    result.failures.push(FileFailure {
                        path: path.clone(),
                        error,
                    });
                }
            }
        }

        // Sort by path for deterministic ordering
        result.files.sort_by(|a, b| a.path.cmp(&b.path));
        result.failures.sort_by(|a, b| a.path.cmp(&b.path));
        result
    }
}

/// Collect analyzable files under `root`.
///
/// Hidden directories and `node_modules` are skipped, as are files with no
/// known language and files excluded by `config`.
pub fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !(name.starts_with('.') || name == "node_modules")
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if Language::from_path(path) == Language::Unknown {
            continue;
        }
        if config.is_path_excluded(path) {
            debug!(path = %path.display(), "excluded by config");
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}
