use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::{Error, Language, Result};

pub const CONFIG_FILE_NAME: &str = ".cognilens.toml";

const MAX_DEBOUNCE_MS: u64 = 60_000;

/// Top-level configuration loaded from `.cognilens.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CognilensConfig {
    #[serde(default)]
    pub revalidation: RevalidationConfig,

    #[serde(default)]
    pub languages: LanguageAliases,
}

/// Debounced recomputation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevalidationConfig {
    /// Quiet period after the last edit before recomputing
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for RevalidationConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl RevalidationConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_debounce_ms() -> u64 {
    500
}

/// Extra editor language ids mapped onto supported languages
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageAliases {
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl LanguageAliases {
    /// Resolve a language id, trying the built-in ids before aliases.
    pub fn resolve(&self, language_id: &str) -> Option<Language> {
        Language::from_language_id(language_id).or_else(|| {
            let lowered = language_id.to_ascii_lowercase();
            self.aliases
                .iter()
                .find(|(alias, _)| alias.to_ascii_lowercase() == lowered)
                .and_then(|(_, target)| Language::from_language_id(target))
        })
    }
}

impl CognilensConfig {
    pub fn validate(&self) -> Result<()> {
        if self.revalidation.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(Error::Configuration(format!(
                "revalidation.debounce_ms must be at most {}, got {}",
                MAX_DEBOUNCE_MS, self.revalidation.debounce_ms
            )));
        }

        for (alias, target) in &self.languages.aliases {
            if Language::from_language_id(target).is_none() {
                return Err(Error::Configuration(format!(
                    "language alias '{}' points at unsupported language '{}'",
                    alias, target
                )));
            }
        }

        Ok(())
    }
}

/// Parse and validate config from a TOML string
pub fn parse_config(contents: &str) -> Result<CognilensConfig> {
    let config = toml::from_str::<CognilensConfig>(contents)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a specific config file
pub fn load_config_from(path: &Path) -> Result<CognilensConfig> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Directory ancestors of `start`, nearest first, up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

fn try_load_config_from_path(config_path: &Path) -> Option<CognilensConfig> {
    match load_config_from(config_path) {
        Ok(config) => {
            debug!(path = %config_path.display(), "Loaded config");
            Some(config)
        }
        Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %config_path.display(), error = %e, "Ignoring invalid config file");
            None
        }
    }
}

/// Search `start` and its ancestors for a config file, falling back to defaults
pub fn load_config_near(start: PathBuf) -> CognilensConfig {
    const MAX_TRAVERSAL_DEPTH: usize = 10;

    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            CognilensConfig::default()
        })
}

/// Load configuration for the current directory
pub fn load_config() -> CognilensConfig {
    match std::env::current_dir() {
        Ok(dir) => load_config_near(dir),
        Err(e) => {
            warn!("Failed to get current directory: {}. Using default config.", e);
            CognilensConfig::default()
        }
    }
}
