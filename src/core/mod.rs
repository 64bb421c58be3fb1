pub mod errors;

use serde::{Deserialize, Serialize};

use crate::complexity::languages::{CSharpAdapter, TypeScriptAdapter};
use crate::complexity::LanguageAdapter;

pub use errors::{Error, Result};

/// One attributable contribution to a method's score (e.g. "if", "nesting", "&&").
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ComplexityDetail {
    /// Zero-based line of the contributing node.
    pub line: u32,
    pub score: u32,
    pub message: String,
}

impl ComplexityDetail {
    pub fn new(line: u32, score: u32, message: impl Into<String>) -> Self {
        Self {
            line,
            score,
            message: message.into(),
        }
    }
}

/// Complexity record for one function, method, lambda or constructor.
///
/// `score` is the total including the own score of every nested method, while
/// `details` lists only this method's own contributions.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MethodComplexity {
    pub name: String,
    pub score: u32,
    pub details: Vec<ComplexityDetail>,
    pub start_index: usize,
    pub end_index: usize,
    pub is_callback: bool,
}

impl MethodComplexity {
    /// Score contributed by this method alone, excluding nested methods.
    pub fn own_score(&self) -> u32 {
        self.details.iter().map(|d| d.score).sum()
    }

    /// Whether `other` lies strictly inside this method's span.
    pub fn contains(&self, other: &MethodComplexity) -> bool {
        other.start_index >= self.start_index
            && other.end_index <= self.end_index
            && (other.start_index, other.end_index) != (self.start_index, self.end_index)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Copy)]
pub enum Language {
    TypeScript,
    TypeScriptReact,
    JavaScript,
    JavaScriptReact,
    CSharp,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::TypeScript,
        Language::TypeScriptReact,
        Language::JavaScript,
        Language::JavaScriptReact,
        Language::CSharp,
    ];

    /// Map an editor language id (case-insensitive) to a supported language.
    pub fn from_language_id(language_id: &str) -> Option<Self> {
        match language_id.to_ascii_lowercase().as_str() {
            "typescript" => Some(Self::TypeScript),
            "typescriptreact" => Some(Self::TypeScriptReact),
            "javascript" => Some(Self::JavaScript),
            "javascriptreact" => Some(Self::JavaScriptReact),
            "csharp" => Some(Self::CSharp),
            _ => None,
        }
    }

    /// Canonical editor language id.
    pub fn id(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::TypeScriptReact => "typescriptreact",
            Self::JavaScript => "javascript",
            Self::JavaScriptReact => "javascriptreact",
            Self::CSharp => "csharp",
        }
    }

    pub fn grammar(self) -> tree_sitter::Language {
        match self {
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::TypeScriptReact => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::JavaScript | Self::JavaScriptReact => tree_sitter_javascript::LANGUAGE.into(),
            Self::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        }
    }

    /// Classification rules used by the scoring engine for this language.
    pub fn adapter(self) -> &'static dyn LanguageAdapter {
        static TYPESCRIPT: TypeScriptAdapter = TypeScriptAdapter;
        static CSHARP: CSharpAdapter = CSharpAdapter;

        match self {
            Self::TypeScript | Self::TypeScriptReact | Self::JavaScript | Self::JavaScriptReact => {
                &TYPESCRIPT
            }
            Self::CSharp => &CSHARP,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
