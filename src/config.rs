//! Configuration file schema.
//!
//! A config file lists path exclusions, analyzer options and simple
//! node-type rules. Each configured rule reports its message on every node
//! of its type.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tree_sitter::Node;

use crate::analysis::{AnalyzerOptions, Rule, RuleContext};
use crate::error::{Error, Result};
use crate::parser::Language;

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["treelint.yaml", ".treelint.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Glob patterns for paths to exclude from analysis (e.g., "**/vendor/**")
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub isolate_rule_panics: bool,
    #[serde(default)]
    pub rules: Vec<NodeRuleConfig>,
}

/// When a configured rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Enter,
    Leave,
}

/// A rule that flags every node of one type.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeRuleConfig {
    pub id: String,
    pub node_type: String,
    pub message: String,
    /// Languages the rule applies to. Empty means all.
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub phase: Phase,
}

impl NodeRuleConfig {
    pub fn applies_to(&self, language: Language) -> bool {
        self.languages.is_empty() || self.languages.contains(&language)
    }

    /// Build the runtime rule. The message travels as the rule's payload.
    pub fn to_rule(&self) -> Rule {
        let rule = Rule::new(&self.id, &self.node_type).with_data(self.message.clone());
        match self.phase {
            Phase::Enter => rule.on_enter(report_message),
            Phase::Leave => rule.on_leave(report_message),
        }
    }
}

fn report_message(rule: &Rule, ctx: &mut RuleContext<'_>, node: Node<'_>) {
    if let Some(message) = rule.data::<String>() {
        ctx.report_node(node, message.clone());
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_error = |reason: String| Error::Config {
            path: path.to_path_buf(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| config_error(e.to_string()))?;
        config.validate().map_err(config_error)?;
        Ok(config)
    }

    /// Find a config file in `dir`.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
        DEFAULT_CONFIG_NAMES
            .iter()
            .map(|name| dir.as_ref().join(name))
            .find(|path| path.is_file())
    }

    /// Check rule ids, node types and exclusion globs.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                return Err("rule id must not be empty".to_string());
            }
            if rule.node_type.trim().is_empty() {
                return Err(format!("rule {:?}: node_type must not be empty", rule.id));
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(format!("duplicate rule id {:?}", rule.id));
            }
            if rule.languages.contains(&Language::Unknown) {
                return Err(format!("rule {:?}: unknown language", rule.id));
            }
        }
        for pattern in &self.exclude {
            globset::Glob::new(pattern)
                .map_err(|e| format!("invalid exclude pattern {:?}: {}", pattern, e))?;
        }
        Ok(())
    }

    pub fn analyzer_options(&self) -> AnalyzerOptions {
        AnalyzerOptions {
            isolate_rule_panics: self.isolate_rule_panics,
        }
    }

    /// Rules that apply to files of `language`, in config order.
    pub fn rules_for(&self, language: Language) -> Vec<Arc<Rule>> {
        self.rules
            .iter()
            .filter(|r| r.applies_to(language))
            .map(|r| Arc::new(r.to_rule()))
            .collect()
    }

    /// Check if a path should be excluded based on exclude patterns.
    /// Uses globset for matching, which supports `**` for recursive directory matching.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        for pattern in &self.exclude {
            if let Ok(glob) = globset::Glob::new(pattern) {
                let matcher = glob.compile_matcher();
                if matcher.is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
exclude:
  - "**/generated/**"
isolate_rule_panics: true
rules:
  - id: no-debugger
    node_type: debugger_statement
    message: Unexpected debugger statement
    languages: [javascript, typescript, tsx]
  - id: no-print
    node_type: print_statement
    message: Use logging instead
    languages: [python]
    phase: leave
"#;

    #[test]
    fn test_parse_sample() {
        let config: Config = serde_yaml::from_str(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert!(config.isolate_rule_panics);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[0].phase, Phase::Enter);
        assert_eq!(config.rules[1].phase, Phase::Leave);
        assert_eq!(config.rules[1].languages, vec![Language::Python]);
    }

    #[test]
    fn test_rules_for_language() {
        let config: Config = serde_yaml::from_str(SAMPLE).unwrap();

        let py = config.rules_for(Language::Python);
        assert_eq!(py.len(), 1);
        assert_eq!(py[0].id(), "no-print");
        assert!(py[0].has_leave() && !py[0].has_enter());

        let tsx = config.rules_for(Language::Tsx);
        assert_eq!(tsx.len(), 1);
        assert_eq!(tsx[0].node_type(), "debugger_statement");
        assert_eq!(
            tsx[0].data::<String>().map(String::as_str),
            Some("Unexpected debugger statement")
        );
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert!(config.validate().is_ok());
        assert!(config.rules_for(Language::Python).is_empty());
        assert!(!config.analyzer_options().isolate_rule_panics);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let config: Config = serde_yaml::from_str(
            r#"
rules:
  - { id: a, node_type: x, message: m }
  - { id: a, node_type: y, message: m }
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.contains("duplicate"), "{}", err);
    }

    #[test]
    fn test_empty_node_type_rejected() {
        let config: Config =
            serde_yaml::from_str("rules:\n  - { id: a, node_type: '', message: m }\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_language_rejected() {
        let config: Config = serde_yaml::from_str(
            "rules:\n  - { id: a, node_type: x, message: m, languages: [unknown] }\n",
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_path_exclusion() {
        let config: Config = serde_yaml::from_str(SAMPLE).unwrap();
        assert!(config.is_path_excluded(Path::new("src/generated/api.ts")));
        assert!(!config.is_path_excluded(Path::new("src/api.ts")));
    }

    #[test]
    fn test_parse_file_and_discover() {
        let temp = TempDir::new().unwrap();
        assert!(Config::discover(temp.path()).is_none());

        let path = temp.path().join("treelint.yaml");
        fs::write(&path, SAMPLE).unwrap();
        assert_eq!(Config::discover(temp.path()), Some(path.clone()));

        let config = Config::parse_file(&path).unwrap();
        assert_eq!(config.rules.len(), 2);
    }

    #[test]
    fn test_parse_file_reports_bad_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("treelint.yaml");
        fs::write(&path, "rules: [1, 2").unwrap();

        let err = Config::parse_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }), "got {:?}", err);
    }
}
