//! Language tags and grammar resolution.
//!
//! Resolution is pure: a file extension picks a [`Language`], and a
//! [`Language`] picks a [`Grammar`]. Nothing here reads files or parses.
//!
//! TypeScript and TSX need different grammars. `<Foo>bar` is a legacy type
//! assertion in TypeScript but a JSX element in TSX, and each grammar
//! resolves the ambiguity its own way. Plain JavaScript has no extension that
//! tells us whether JSX is present, so `.js` and `.jsx` both go through the
//! TSX grammar, which accepts either.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// The language of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Unknown,
    Python,
    /// Vanilla JavaScript and JSX.
    JavaScript,
    /// TypeScript without JSX.
    TypeScript,
    /// TypeScript with JSX.
    Tsx,
}

impl Language {
    /// Every language that has a grammar.
    pub const ALL: [Language; 4] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Tsx,
    ];

    /// Resolve the language of the file at `path` from its extension.
    ///
    /// The extension is whatever follows the last `.` of the file name, so a
    /// bare `.py` counts as Python. Returns `Language::Unknown` for anything
    /// unrecognized (e.g. `.txt`), including names without a dot.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        path.as_ref()
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| Self::from_extension(ext))
            .unwrap_or(Language::Unknown)
    }

    /// Resolve a language from an extension without the leading dot.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "py" => Language::Python,
            "js" | "jsx" => Language::JavaScript,
            "ts" => Language::TypeScript,
            "tsx" => Language::Tsx,
            _ => Language::Unknown,
        }
    }

    /// File extensions (without dot) mapped to this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Python => &["py"],
            Language::JavaScript => &["js", "jsx"],
            Language::TypeScript => &["ts"],
            Language::Tsx => &["tsx"],
            Language::Unknown => &[],
        }
    }

    /// The grammar used to parse this language, `None` for `Unknown`.
    pub fn grammar(&self) -> Option<&'static Grammar> {
        match self {
            Language::Python => Some(&PYTHON_GRAMMAR),
            Language::JavaScript => Some(&TSX_GRAMMAR),
            Language::TypeScript => Some(&TYPESCRIPT_GRAMMAR),
            Language::Tsx => Some(&TSX_GRAMMAR),
            Language::Unknown => None,
        }
    }

    /// Whether this language belongs to the JavaScript/TypeScript family.
    pub fn is_ecmascript(&self) -> bool {
        matches!(
            self,
            Language::JavaScript | Language::TypeScript | Language::Tsx
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Unknown => "unknown",
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Tsx => "tsx",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "javascript" | "js" | "jsx" => Ok(Language::JavaScript),
            "typescript" | "ts" => Ok(Language::TypeScript),
            "tsx" => Ok(Language::Tsx),
            _ => Err(format!("unknown language: {}", s)),
        }
    }
}

/// Resolve the language of the file at `path`.
pub fn resolve_language<P: AsRef<Path>>(path: P) -> Language {
    Language::from_path(path)
}

/// The grammar for `language`, `None` for `Language::Unknown`.
pub fn grammar_for(language: Language) -> Option<&'static Grammar> {
    language.grammar()
}

/// Stable identity of a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrammarId {
    Python,
    TypeScript,
    Tsx,
}

/// Opaque handle to the parsing rules for one language.
///
/// Handles compare by identity: two handles are equal when they name the
/// same grammar.
pub struct Grammar {
    id: GrammarId,
    language: tree_sitter::Language,
}

impl Grammar {
    fn new(id: GrammarId, language: tree_sitter::Language) -> Self {
        Self { id, language }
    }

    pub fn id(&self) -> GrammarId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        match self.id {
            GrammarId::Python => "python",
            GrammarId::TypeScript => "typescript",
            GrammarId::Tsx => "tsx",
        }
    }

    /// The underlying tree-sitter language.
    pub fn ts_language(&self) -> &tree_sitter::Language {
        &self.language
    }
}

impl PartialEq for Grammar {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Grammar {}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar").field("id", &self.id).finish()
    }
}

static PYTHON_GRAMMAR: Lazy<Grammar> =
    Lazy::new(|| Grammar::new(GrammarId::Python, tree_sitter_python::LANGUAGE.into()));

static TYPESCRIPT_GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
    Grammar::new(
        GrammarId::TypeScript,
        tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
    )
});

static TSX_GRAMMAR: Lazy<Grammar> =
    Lazy::new(|| Grammar::new(GrammarId::Tsx, tree_sitter_typescript::LANGUAGE_TSX.into()));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_mapping() {
        assert_eq!(resolve_language("a/b/main.py"), Language::Python);
        assert_eq!(resolve_language("app.js"), Language::JavaScript);
        assert_eq!(resolve_language("App.jsx"), Language::JavaScript);
        assert_eq!(resolve_language("index.ts"), Language::TypeScript);
        assert_eq!(resolve_language("App.tsx"), Language::Tsx);
    }

    #[test]
    fn test_unknown_extensions() {
        assert_eq!(resolve_language("notes.txt"), Language::Unknown);
        assert_eq!(resolve_language("main.go"), Language::Unknown);
        assert_eq!(resolve_language("Makefile"), Language::Unknown);
        assert_eq!(resolve_language("file.unknownext"), Language::Unknown);
        // Extensions are case-sensitive
        assert_eq!(resolve_language("main.PY"), Language::Unknown);
        assert_eq!(resolve_language("archive.py.bak"), Language::Unknown);
        assert_eq!(resolve_language("src.py/README"), Language::Unknown);
        assert_eq!(resolve_language("trailing."), Language::Unknown);
    }

    #[test]
    fn test_dotfile_names_use_their_suffix() {
        assert_eq!(resolve_language(".py"), Language::Python);
        assert_eq!(resolve_language("dir/.tsx"), Language::Tsx);
        assert_eq!(resolve_language("a/b.min.js"), Language::JavaScript);
    }

    #[test]
    fn test_ecmascript_family() {
        let family: Vec<_> = Language::ALL
            .into_iter()
            .filter(Language::is_ecmascript)
            .collect();
        assert_eq!(
            family,
            vec![Language::JavaScript, Language::TypeScript, Language::Tsx]
        );
        assert!(!Language::Unknown.is_ecmascript());
    }

    #[test]
    fn test_unknown_has_no_grammar() {
        assert!(grammar_for(Language::Unknown).is_none());
        for lang in Language::ALL {
            assert!(grammar_for(lang).is_some(), "{} should have a grammar", lang);
        }
    }

    #[test]
    fn test_typescript_and_tsx_grammars_differ() {
        let ts = grammar_for(Language::TypeScript).unwrap();
        let tsx = grammar_for(Language::Tsx).unwrap();
        assert_ne!(ts, tsx);
        assert_eq!(ts.id(), GrammarId::TypeScript);
        assert_eq!(tsx.id(), GrammarId::Tsx);
    }

    #[test]
    fn test_javascript_shares_tsx_grammar() {
        let js = grammar_for(Language::JavaScript).unwrap();
        let tsx = grammar_for(Language::Tsx).unwrap();
        assert_eq!(js, tsx);
        assert_eq!(js.name(), "tsx");
    }

    #[test]
    fn test_extensions_round_trip_through_resolution() {
        for lang in Language::ALL {
            for ext in lang.extensions() {
                assert_eq!(Language::from_extension(ext), lang);
            }
        }
        assert!(Language::Unknown.extensions().is_empty());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("python".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("TS".parse::<Language>().unwrap(), Language::TypeScript);
        assert_eq!("tsx".parse::<Language>().unwrap(), Language::Tsx);
        assert_eq!("jsx".parse::<Language>().unwrap(), Language::JavaScript);
        assert!("cobol".parse::<Language>().is_err());
    }
}
