//! Configuration loading
//!
//! Values come from (highest priority first) command-line flags, the
//! `MSGBOARD_API_URL` environment variable, `config.toml` in the platform
//! config directory, and finally built-in defaults.

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "MSGBOARD_API_URL";

/// Local development endpoint used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Messages per page in the list view.
pub const DEFAULT_PER_PAGE: u32 = 5;

/// How long a cached page survives without being refreshed.
const DEFAULT_CACHE_GC_SECS: u64 = 300;

/// On-disk configuration file contents. Every field is optional.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    /// Base URL of the message service
    pub api_url: Option<String>,
    /// Page size for the list view
    pub per_page: Option<u32>,
    /// Cache entry lifetime in seconds
    pub cache_gc_secs: Option<u64>,
}

impl FileConfig {
    /// Get config file path
    pub fn path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "msgboard", "msgboard")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Load the config file, returning defaults if it does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub per_page: u32,
    pub cache_gc_time: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            per_page: DEFAULT_PER_PAGE,
            cache_gc_time: Duration::from_secs(DEFAULT_CACHE_GC_SECS),
        }
    }
}

/// Overrides supplied on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub per_page: Option<u32>,
}

impl Settings {
    /// Resolve settings from the config file, environment and CLI overrides.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let file = FileConfig::load()?;
        let env_url = std::env::var(API_URL_ENV).ok();
        Self::resolve(file, env_url, overrides)
    }

    fn resolve(file: FileConfig, env_url: Option<String>, overrides: &Overrides) -> Result<Self> {
        let defaults = Self::default();

        let api_url = overrides
            .api_url
            .clone()
            .or(env_url.filter(|u| !u.trim().is_empty()))
            .or(file.api_url)
            .unwrap_or(defaults.api_url);

        let per_page = overrides
            .per_page
            .or(file.per_page)
            .unwrap_or(defaults.per_page);
        if per_page == 0 {
            bail!("per_page must be a positive integer");
        }

        let cache_gc_time = file
            .cache_gc_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_gc_time);

        Ok(Self {
            api_url: normalize_url(&api_url)?,
            per_page,
            cache_gc_time,
        })
    }
}

/// Trim whitespace and trailing slashes, and check the URL parses.
fn normalize_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    url::Url::parse(trimmed).with_context(|| format!("Invalid API URL: {}", raw))?;
    Ok(trimmed.to_string())
}
