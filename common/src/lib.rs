/*!
common/src/lib.rs

Shared configuration types and loaders for News Scanner.

This file provides:
- Config data structures (deserialized from TOML), every section optional
- An async loader merging a defaults file with an override file
- Environment overrides for the search knobs and API key resolution helpers
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;

pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2";
pub const DEFAULT_NEWS_KEY_ENV: &str = "NEWSAPI_KEY";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_COUNTRY: &str = "us";
pub const DEFAULT_PAGE_SIZE: u32 = 6;
pub const DEFAULT_MAX_SOURCES: usize = 5;

pub const DEFAULT_LLM_API_URL: &str = "https://api.portkey.ai/v1/chat/completions";
pub const DEFAULT_LLM_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_LLM_VIRTUAL_KEY_ENV: &str = "OPENAI_AI_KEY";
pub const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";

/// HTTP listener configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub port: Option<u16>,
    /// Value sent in `Access-Control-Allow-Origin` (defaults to "*")
    pub cors_allowed_origin: Option<String>,
}

/// News provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsConfig {
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub language: Option<String>,
    pub country: Option<String>,
    pub page_size: Option<u32>,
    pub max_sources: Option<usize>,
    pub timeout_seconds: Option<u64>,
    /// "unscoped" (default) or "reject"
    pub on_empty_scope: Option<String>,
}

/// Remote LLM config, reached through an OpenAI-compatible gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub virtual_key_env: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
    pub timeout_seconds: Option<u64>,
}

/// Location of the static category list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoriesConfig {
    /// JSON file holding an array of category names
    pub path: Option<String>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub categories: CategoriesConfig,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    pub async fn load_with_defaults(
        default_path: Option<&Path>,
        override_path: Option<&Path>,
    ) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        for path in [default_path, override_path].into_iter().flatten() {
            if !path.exists() {
                continue;
            }
            let data = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let val: toml::Value = toml::from_str(&data)
                .with_context(|| format!("Failed to parse configuration: {}", path.display()))?;
            merge_toml(&mut config_value, val);
        }

        let cfg: Config = config_value
            .try_into()
            .context("Failed to parse merged configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would only fail later, at request time.
    pub fn validate(&self) -> Result<()> {
        for (name, raw) in [
            ("news.api_url", self.news.api_url.as_deref()),
            ("llm.api_url", self.llm.api_url.as_deref()),
        ] {
            if let Some(raw) = raw {
                url::Url::parse(raw).with_context(|| format!("Invalid URL for {}: {}", name, raw))?;
            }
        }
        if self.news.page_size == Some(0) {
            anyhow::bail!("Invalid news.page_size 0: must be a positive integer");
        }
        if self.news.max_sources == Some(0) {
            anyhow::bail!("Invalid news.max_sources 0: must be a positive integer");
        }
        if let Some(policy) = self.news.on_empty_scope.as_deref() {
            if policy != "unscoped" && policy != "reject" {
                anyhow::bail!(
                    "Invalid news.on_empty_scope '{}': expected \"unscoped\" or \"reject\"",
                    policy
                );
            }
        }
        Ok(())
    }

    /// Apply `NEWSAPI_LANGUAGE_SEARCH`, `NEWSAPI_COUNTRY_SEARCH` and `ARTICLE_PER_PAGE`
    /// from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Same as [`Config::apply_env_overrides`] with an injectable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(lang) = lookup("NEWSAPI_LANGUAGE_SEARCH").filter(|v| !v.trim().is_empty()) {
            self.news.language = Some(lang.trim().to_string());
        }
        if let Some(country) = lookup("NEWSAPI_COUNTRY_SEARCH").filter(|v| !v.trim().is_empty()) {
            self.news.country = Some(country.trim().to_string());
        }
        if let Some(raw) = lookup("ARTICLE_PER_PAGE") {
            match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => self.news.page_size = Some(n),
                _ => warn!(value = %raw, "ignoring ARTICLE_PER_PAGE: not a positive integer"),
            }
        }
    }
}

impl ServerConfig {
    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn cors_allowed_origin(&self) -> &str {
        self.cors_allowed_origin.as_deref().unwrap_or("*")
    }
}

impl NewsConfig {
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_NEWS_API_URL)
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_NEWS_KEY_ENV)
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn country(&self) -> &str {
        self.country.as_deref().unwrap_or(DEFAULT_COUNTRY)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn max_sources(&self) -> usize {
        self.max_sources.unwrap_or(DEFAULT_MAX_SOURCES)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(15)
    }

    pub fn rejects_empty_scope(&self) -> bool {
        self.on_empty_scope.as_deref() == Some("reject")
    }
}

impl LlmConfig {
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_LLM_API_URL)
    }

    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_LLM_KEY_ENV)
    }

    pub fn virtual_key_env(&self) -> &str {
        self.virtual_key_env
            .as_deref()
            .unwrap_or(DEFAULT_LLM_VIRTUAL_KEY_ENV)
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_LLM_MODEL)
    }

    pub fn temperature(&self) -> f32 {
        self.temperature.unwrap_or(0.7)
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens.unwrap_or(500)
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds.unwrap_or(30)
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// Read a credential from the environment variable named `var`.
/// Blank values count as missing.
pub fn read_secret(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Like [`read_secret`] but missing keys are an error (used for startup-fatal credentials).
pub fn require_secret(var: &str) -> Result<String> {
    read_secret(var).with_context(|| format!("{} environment variable is required", var))
}
