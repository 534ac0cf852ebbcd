use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::constants::{defaults, hosts};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub scraper: ScraperConfig,

    pub merge: MergeConfig,

    pub sources: SourcesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Minimum wait between consecutive requests to one site, in milliseconds.
    pub page_delay_ms: u64,

    pub request_timeout_seconds: u64,

    /// Hard cap on listing pages fetched for a single listing request.
    pub max_pages: usize,

    /// Next-marker pagination stops after this many empty or failed pages in
    /// a row.
    pub max_consecutive_empty_pages: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: defaults::PAGE_DELAY_MS,
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_pages: defaults::MAX_PAGES,
            max_consecutive_empty_pages: defaults::MAX_CONSECUTIVE_EMPTY_PAGES,
        }
    }
}

impl ScraperConfig {
    #[must_use]
    pub const fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Jaro-Winkler score at or above which two titles are the same show.
    pub similarity_threshold: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: defaults::SIMILARITY_THRESHOLD,
        }
    }
}

/// Where a catalog site lives and the user agent we announce to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub host: String,

    pub user_agent: String,
}

impl SourceConfig {
    #[must_use]
    pub fn new(host: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user_agent: user_agent.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub ann: SourceConfig,

    pub mal: SourceConfig,

    pub mu: SourceConfig,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            ann: SourceConfig::new(hosts::ANN, "scrape/ann"),
            mal: SourceConfig::new(hosts::MAL, "scrape/mal"),
            mu: SourceConfig::new(hosts::MU, "scrape/mu"),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![Self::default_config_path()];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("showscrape").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".showscrape").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("showscrape.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, source) in [
            ("ann", &self.sources.ann),
            ("mal", &self.sources.mal),
            ("mu", &self.sources.mu),
        ] {
            if source.host.trim().is_empty() {
                anyhow::bail!("sources.{name}.host cannot be empty");
            }
            if source.user_agent.trim().is_empty() {
                anyhow::bail!("sources.{name}.user_agent cannot be empty");
            }
        }

        let threshold = self.merge.similarity_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            anyhow::bail!("merge.similarity_threshold must be in (0, 1], got {threshold}");
        }

        if self.scraper.max_pages == 0 {
            anyhow::bail!("scraper.max_pages must be > 0");
        }

        Ok(())
    }
}
