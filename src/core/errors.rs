//! Shared error types for the application

use thiserror::Error;

/// Main error type for cognilens operations
#[derive(Debug, Error)]
pub enum Error {
    /// No parser is registered for the language, or its grammar failed to load
    #[error("No parser available for language '{language_id}'")]
    ParserUnavailable { language_id: String },

    /// The parser produced no tree
    #[error("Parse error in {uri}: {message}")]
    Parse { uri: String, message: String },

    /// A ranged change does not fit the current document text
    #[error("Malformed edit: {message}")]
    MalformedEdit { message: String },

    /// A change or recovery request for a URI that is not open
    #[error("Unknown document: {0}")]
    UnknownDocument(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Wrapped external errors
    #[error(transparent)]
    External(#[from] anyhow::Error),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub fn parser_unavailable(language_id: impl Into<String>) -> Self {
        Self::ParserUnavailable {
            language_id: language_id.into(),
        }
    }

    pub fn parse(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            uri: uri.into(),
            message: message.into(),
        }
    }

    pub fn malformed_edit(message: impl Into<String>) -> Self {
        Self::MalformedEdit {
            message: message.into(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
