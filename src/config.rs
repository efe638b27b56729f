use crate::i18n::{LanguageRegistry, DEFAULT_LANGUAGE, DEFAULT_SUPPORTED};
use crate::retry::RetryConfig;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Translation payloads
    pub translations_url: String,
    pub fetch_timeout_secs: u64,
    pub fetch_attempts: u32,

    // Durable client storage
    pub cache_dir: PathBuf,

    // Languages
    pub supported_languages: Vec<String>,
    pub default_language: String,

    /// Overrides the OS locale signal when set
    pub locale_override: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            translations_url: "http://localhost:3000/i18n".to_string(),
            fetch_timeout_secs: 10,
            fetch_attempts: 3,
            cache_dir: PathBuf::from(".portal-i18n"),
            supported_languages: DEFAULT_SUPPORTED.iter().map(|s| s.to_string()).collect(),
            default_language: DEFAULT_LANGUAGE.to_string(),
            locale_override: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            // Translation payloads
            translations_url: std::env::var("I18N_BASE_URL")
                .unwrap_or(defaults.translations_url),
            fetch_timeout_secs: parse_var("I18N_FETCH_TIMEOUT_SECS")?
                .unwrap_or(defaults.fetch_timeout_secs),
            fetch_attempts: parse_var("I18N_FETCH_ATTEMPTS")?.unwrap_or(defaults.fetch_attempts),

            // Durable client storage
            cache_dir: std::env::var("I18N_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),

            // Languages
            supported_languages: std::env::var("I18N_SUPPORTED")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.supported_languages),
            default_language: std::env::var("I18N_DEFAULT")
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.default_language),
            locale_override: std::env::var("I18N_LOCALE")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        };

        // Fail at startup rather than on first use
        config.registry()?;
        Ok(config)
    }

    /// Build the language registry this configuration describes.
    pub fn registry(&self) -> Result<LanguageRegistry> {
        LanguageRegistry::new(self.supported_languages.as_slice(), &self.default_language)
            .context("Invalid language configuration (I18N_SUPPORTED / I18N_DEFAULT)")
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn retry(&self) -> RetryConfig {
        if self.fetch_attempts <= 1 {
            RetryConfig::single_attempt()
        } else {
            RetryConfig {
                max_attempts: self.fetch_attempts,
                ..RetryConfig::payload_fetch()
            }
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} is not a valid number: '{}'", name, value)),
        Err(_) => Ok(None),
    }
}
