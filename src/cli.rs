//! Command-line interface for treelint.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::config::{Config, DEFAULT_CONFIG_NAMES};
use crate::parser::{self, grammar_for, resolve_language, Language, ParseResult};
use crate::report;
use crate::runner::{self, Runner};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Rule-driven linting over tree-sitter syntax trees.
///
/// Treelint parses Python, JavaScript, TypeScript and TSX files and runs the
/// node-type rules from a YAML config over every syntax tree.
#[derive(Parser)]
#[command(name = "treelint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run configured rules over a file or directory
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// Print the syntax tree of a single file
    Parse(ParseArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Path to check (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

/// Arguments for the parse command.
#[derive(Parser)]
pub struct ParseArgs {
    /// File to parse
    pub file: PathBuf,

    /// Override the language inferred from the extension
    #[arg(short, long)]
    pub language: Option<Language>,

    /// Also print the scope tree
    #[arg(long)]
    pub scopes: bool,
}

/// Discover a config file next to the checked path, then in the current directory.
fn discover_config(path: &Path) -> anyhow::Result<PathBuf> {
    let near = if path.is_dir() { Some(path) } else { path.parent() };
    near.and_then(Config::discover)
        .or_else(|| Config::discover("."))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "no config file found (looked for {})",
                DEFAULT_CONFIG_NAMES.join(", ")
            )
        })
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    let config_path = match &args.config {
        Some(p) => p.clone(),
        None => match discover_config(&args.path) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error: {}", e);
                return Ok(EXIT_ERROR);
            }
        },
    };

    let config = match Config::parse_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };
    info!(config = %config_path.display(), rules = config.rules.len(), "loaded config");

    if !args.path.exists() {
        eprintln!("Error: cannot access path {:?}", args.path);
        return Ok(EXIT_ERROR);
    }

    let files = runner::collect_files(&args.path, &config)?;
    if files.is_empty() {
        eprintln!("Warning: no files to scan");
        return Ok(EXIT_SUCCESS);
    }

    let result = Runner::new(&config).run(&files);

    let path_str = args.path.to_string_lossy().to_string();
    match args.format {
        OutputFormat::Json => report::write_json(&path_str, &result)?,
        OutputFormat::Pretty => report::write_pretty(&path_str, &result),
    }

    if result.has_issues() {
        Ok(EXIT_FAILED)
    } else if !result.failures.is_empty() {
        Ok(EXIT_ERROR)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the parse command.
pub fn run_parse(args: &ParseArgs) -> anyhow::Result<i32> {
    let parsed = match parse_for_display(&args.file, args.language) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    println!("language: {}", parsed.language());
    println!("grammar:  {}", parsed.grammar().name());
    println!("errors:   {}", parsed.has_errors());
    println!();
    println!("{}", parsed.root_node().to_sexp());

    if args.scopes {
        println!();
        match parsed.scope_tree() {
            Some(tree) => print!("{}", render_scopes(tree)),
            None => println!("(no scope tree)"),
        }
    }

    if parsed.has_errors() {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

fn parse_for_display(file: &Path, language: Option<Language>) -> crate::Result<ParseResult> {
    let language = language.unwrap_or_else(|| resolve_language(file));
    let grammar = grammar_for(language).ok_or_else(|| crate::Error::UnsupportedLanguage {
        path: file.to_path_buf(),
    })?;
    let source = fs::read(file).map_err(|source| crate::Error::Io {
        path: file.to_path_buf(),
        source,
    })?;
    parser::parse(file, source, language, grammar)
}

/// Render a scope tree as an indented outline.
pub fn render_scopes(tree: &parser::ScopeTree) -> String {
    let mut out = String::new();
    render_scope(tree, tree.root(), 0, &mut out);
    out
}

fn render_scope(
    tree: &parser::ScopeTree,
    id: parser::scope::ScopeId,
    depth: usize,
    out: &mut String,
) {
    let scope = tree.get(id);
    let indent = "  ".repeat(depth);
    out.push_str(&format!("{}{} @ {}\n", indent, scope.kind.as_str(), scope.span));
    for binding in &scope.bindings {
        out.push_str(&format!("{}  - {} ({:?})\n", indent, binding.name, binding.kind));
    }
    for &child in &scope.children {
        render_scope(tree, child, depth + 1, out);
    }
}
