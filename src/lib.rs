// Export modules for library usage
pub mod cache;
pub mod complexity;
pub mod config;
pub mod core;
pub mod debounce;
pub mod document;
pub mod observability;
pub mod parsing;
pub mod service;

// Re-export commonly used types
pub use crate::core::{ComplexityDetail, Error, Language, MethodComplexity, Result};

pub use crate::complexity::{
    compute_complexity, languages::CSharpAdapter, languages::TypeScriptAdapter, score_tree,
    ComplexityKind, LanguageAdapter,
};

pub use crate::document::{ContentChange, DocumentEntry, DocumentTreeCache, Position, Range};

pub use crate::cache::{CacheStats, Computed, ResultCache, SharedComplexities};

pub use crate::parsing::{has_parse_errors, SyntaxParser, TreeSitterParsers};

pub use crate::config::{load_config, parse_config, CognilensConfig, LanguageAliases};

pub use crate::service::ComplexityService;
