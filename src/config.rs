use crate::constants::*;
use crate::error::{EtlError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    pub web_url: String,
    pub database_path: String,
    pub api_base_url: String,
    pub log_level: String,
    pub retry_attempts: u32,
    pub retry_backoff_ms: u64,
    pub http_timeout_secs: u64,
    pub filter: FilterConfig,
}

/// Business rules applied by the eligibility filter
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub industry_keywords: Vec<String>,
    pub seniority_markers: Vec<String>,
    pub min_contacts_per_company: usize,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            web_url: DEFAULT_WEB_URL.to_string(),
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            filter: FilterConfig::default(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            industry_keywords: DEFAULT_INDUSTRY_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            seniority_markers: DEFAULT_SENIORITY_MARKERS.iter().map(|s| s.to_string()).collect(),
            min_contacts_per_company: DEFAULT_MIN_CONTACTS_PER_COMPANY,
        }
    }
}

impl EtlConfig {
    /// Defaults, then the TOML file (if any), then environment variables.
    ///
    /// An explicitly requested file must exist; the default `etl.toml` is optional.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            EtlError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EtlConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Overrides fields from `lookup`, which maps an env var name to its value.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_WEB_URL) {
            self.web_url = v;
        }
        if let Some(v) = lookup(ENV_DATABASE_PATH) {
            self.database_path = v;
        }
        if let Some(v) = lookup(ENV_API_BASE_URL) {
            self.api_base_url = v;
        }
        if let Some(v) = lookup(ENV_LOG_LEVEL) {
            self.log_level = v;
        }
        if let Some(v) = lookup(ENV_RETRY_ATTEMPTS) {
            self.retry_attempts = parse_env(ENV_RETRY_ATTEMPTS, &v)?;
        }
        if let Some(v) = lookup(ENV_RETRY_BACKOFF_MS) {
            self.retry_backoff_ms = parse_env(ENV_RETRY_BACKOFF_MS, &v)?;
        }
        if let Some(v) = lookup(ENV_HTTP_TIMEOUT_SECS) {
            self.http_timeout_secs = parse_env(ENV_HTTP_TIMEOUT_SECS, &v)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.filter.industry_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(EtlError::Config("filter.industry_keywords must not be empty".into()));
        }
        if self.filter.seniority_markers.iter().all(|k| k.trim().is_empty()) {
            return Err(EtlError::Config("filter.seniority_markers must not be empty".into()));
        }
        if self.http_timeout_secs == 0 {
            return Err(EtlError::Config("http_timeout_secs must be greater than zero".into()));
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| EtlError::Config(format!("Invalid value for {key}: '{value}'")))
}
