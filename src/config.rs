//! Tool configuration.
//!
//! Handles loading, validating, and saving `stagebill.toml`. Unlike site
//! generators with per-directory cascades, one config file governs the whole
//! tool, so loading is a single read: stock defaults overlaid with whatever
//! keys the user set.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [database]
//! path = "shows.db"
//!
//! [directories]
//! shows_seen = "shows_seen"         # Playbill photos of shows attended
//! shows_wishlist = "shows_wishlist" # Playbill photos of shows to see
//!
//! [llm]
//! provider = "anthropic"            # "anthropic" or "openai"
//! anthropic_api_key = ""
//! openai_api_key = ""
//! model = ""                        # empty = provider default
//!
//! [settings]
//! auto_enrich = true                # enrich right after adding a show
//! image_extensions = [".jpg", ".jpeg", ".png"]
//! user_categories = []              # predefined categories to match against
//!
//! [site]
//! output_dir = "site"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Tool configuration loaded from `stagebill.toml`.
///
/// All fields have sensible defaults. A missing config file is fine — the
/// commands that need an API key will say so when they run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub database: DatabaseConfig,
    pub directories: DirectoriesConfig,
    pub llm: LlmConfig,
    pub settings: Settings,
    pub site: SiteConfig,
}

impl Config {
    /// Load config from the given path, merging user values on top of stock
    /// defaults. A missing file yields the defaults; a malformed file is an
    /// error, not a silent fallback.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config back out. Used by `categories add`/`remove`, which
    /// rewrite the predefined category list. Comments are not preserved.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.llm.provider.as_str() {
            "anthropic" | "openai" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "llm.provider must be \"anthropic\" or \"openai\", got {:?}",
                    other
                )));
            }
        }
        if self.settings.image_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "settings.image_extensions must not be empty".into(),
            ));
        }
        for ext in &self.settings.image_extensions {
            if !ext.starts_with('.') {
                return Err(ConfigError::Validation(format!(
                    "settings.image_extensions entries must start with '.', got {:?}",
                    ext
                )));
            }
        }
        Ok(())
    }
}

/// Database location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "shows.db".to_string(),
        }
    }
}

/// Directories watched by `scan`. Which directory a playbill photo lives in
/// determines the initial seen status of the shows extracted from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoriesConfig {
    pub shows_seen: String,
    pub shows_wishlist: String,
}

impl Default for DirectoriesConfig {
    fn default() -> Self {
        Self {
            shows_seen: "shows_seen".to_string(),
            shows_wishlist: "shows_wishlist".to_string(),
        }
    }
}

/// LLM provider selection and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmConfig {
    /// Which provider to use: "anthropic" or "openai".
    pub provider: String,
    pub anthropic_api_key: String,
    pub openai_api_key: String,
    /// Model override. Empty means the provider's default.
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            anthropic_api_key: String::new(),
            openai_api_key: String::new(),
            model: String::new(),
        }
    }
}

impl LlmConfig {
    /// The API key for the configured provider, or `None` if unset.
    pub fn active_api_key(&self) -> Option<&str> {
        let key = match self.provider.as_str() {
            "anthropic" => &self.anthropic_api_key,
            "openai" => &self.openai_api_key,
            _ => return None,
        };
        if key.is_empty() { None } else { Some(key) }
    }
}

/// Behavioral settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Enrich a show right after it is added.
    pub auto_enrich: bool,
    /// File extensions treated as playbill images, lowercase with dot.
    pub image_extensions: Vec<String>,
    /// Predefined categories that enrichment matches shows against.
    pub user_categories: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_enrich: true,
            image_extensions: vec![".jpg".to_string(), ".jpeg".to_string(), ".png".to_string()],
            user_categories: Vec::new(),
        }
    }
}

/// Site generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub output_dir: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            output_dir: "site".to_string(),
        }
    }
}

/// Returns a fully-commented stock `stagebill.toml` with all keys and
/// explanations. Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Stagebill Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

[database]
# SQLite database holding the show catalog. Created on first use.
path = "shows.db"

# ---------------------------------------------------------------------------
# Playbill photo directories
# ---------------------------------------------------------------------------
# `stagebill scan` looks for new images here. Photos in shows_seen become
# "seen" entries; photos in shows_wishlist become "wishlist" entries.
[directories]
shows_seen = "shows_seen"
shows_wishlist = "shows_wishlist"

# ---------------------------------------------------------------------------
# LLM provider
# ---------------------------------------------------------------------------
[llm]
# "anthropic" or "openai". Only the matching API key needs to be set.
provider = "anthropic"
anthropic_api_key = ""
openai_api_key = ""
# Model override. Leave empty for the provider default.
model = ""

# ---------------------------------------------------------------------------
# Behavior
# ---------------------------------------------------------------------------
[settings]
# Enrich a show with metadata right after it is added.
auto_enrich = true

# File extensions treated as playbill images (lowercase, with dot).
image_extensions = [".jpg", ".jpeg", ".png"]

# Predefined categories; enrichment tags shows that clearly match one.
# Example: ["date night", "family friendly", "sondheim"]
user_categories = []

# ---------------------------------------------------------------------------
# Site generation
# ---------------------------------------------------------------------------
[site]
# Where `stagebill generate` writes the static site.
output_dir = "site"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(&tmp.path().join("stagebill.toml")).unwrap();
        assert_eq!(config.database.path, "shows.db");
        assert_eq!(config.llm.provider, "anthropic");
        assert!(config.settings.auto_enrich);
    }

    #[test]
    fn partial_file_overlays_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stagebill.toml");
        fs::write(&path, "[site]\noutput_dir = \"public\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.site.output_dir, "public");
        // Untouched sections keep their defaults
        assert_eq!(config.database.path, "shows.db");
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stagebill.toml");
        fs::write(&path, "[settings]\nauto_enrch = true\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stagebill.toml");
        fs::write(&path, "[[[not toml").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn invalid_provider_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stagebill.toml");
        fs::write(&path, "[llm]\nprovider = \"google\"\n").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn extension_without_dot_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stagebill.toml");
        fs::write(&path, "[settings]\nimage_extensions = [\"jpg\"]\n").unwrap();
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn save_and_reload_round_trips_categories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stagebill.toml");

        let mut config = Config::default();
        config
            .settings
            .user_categories
            .push("date night".to_string());
        config.save(&path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.settings.user_categories, vec!["date night"]);
    }

    #[test]
    fn active_api_key_follows_provider() {
        let mut llm = LlmConfig::default();
        assert_eq!(llm.active_api_key(), None);

        llm.anthropic_api_key = "sk-ant-test".to_string();
        assert_eq!(llm.active_api_key(), Some("sk-ant-test"));

        llm.provider = "openai".to_string();
        assert_eq!(llm.active_api_key(), None);
    }

    #[test]
    fn stock_config_parses_cleanly() {
        let config: Config = toml::from_str(stock_config_toml()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.site.output_dir, "site");
    }
}
