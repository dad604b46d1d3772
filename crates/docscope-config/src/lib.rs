//! Configuration management for docscope.
//!
//! Parses `docscope.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ## Schema
//!
//! ```toml
//! # Overrides for the document scope: tag = built-in primitive
//! [components]
//! inlineCode = "kbd"
//! blockquote = "aside"
//!
//! # Overrides for named sub-tree scopes, laid over [components]
//! [scopes.api]
//! code = "samp"
//!
//! [markdown]
//! gfm = true
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docscope.toml";

/// Tag → built-in primitive aliases.
pub type AliasMap = BTreeMap<String, String>;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides installed for the whole document.
    pub components: AliasMap,
    /// Named overrides for sub-trees, keyed by scope name.
    pub scopes: BTreeMap<String, AliasMap>,
    /// Markdown parsing options.
    pub markdown: MarkdownConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown parsing options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
    /// Enable GitHub Flavored Markdown extensions.
    pub gfm: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self { gfm: true }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `docscope.toml` in the current directory and
    /// its parents, and falls back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or validation fails.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }

        let cwd = std::env::current_dir()?;
        match Self::discover_config(&cwd) {
            Some(discovered) => Self::load_from_file(&discovered),
            None => {
                tracing::debug!(dir = %cwd.display(), "No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides for a named scope, if configured.
    #[must_use]
    pub fn scope(&self, name: &str) -> Option<&AliasMap> {
        self.scopes.get(name)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any tag or primitive name is
    /// empty or contains whitespace.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_aliases(&self.components, "components")?;
        for (name, aliases) in &self.scopes {
            require_name(name, "scopes", "scope name")?;
            validate_aliases(aliases, &format!("scopes.{name}"))?;
        }
        Ok(())
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&content)?;
        config.config_path = Some(path.to_path_buf());
        tracing::debug!(
            path = %path.display(),
            components = config.components.len(),
            scopes = config.scopes.len(),
            "Loaded configuration"
        );
        Ok(config)
    }
}

/// Validate every tag and primitive name in an alias table.
fn validate_aliases(aliases: &AliasMap, section: &str) -> Result<(), ConfigError> {
    for (tag, primitive) in aliases {
        require_name(tag, section, "tag")?;
        require_name(primitive, &format!("{section}.{tag}"), "primitive")?;
    }
    Ok(())
}

/// Require a name to be non-empty and free of whitespace.
fn require_name(value: &str, field: &str, what: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{field}: {what} cannot be empty"
        )));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "{field}: {what} '{value}' cannot contain whitespace"
        )));
    }
    Ok(())
}
