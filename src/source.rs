//! Translation payload source.
//!
//! Payloads are served as one JSON document per language at
//! `{base_url}/{code}.json`. A missing resource, an error status, or a body
//! that is not a JSON object is a load failure.

use crate::i18n::{LanguageCode, TranslationDocument};
use crate::retry::{with_retry_if, RetryConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Why a translation payload could not be loaded.
///
/// `Clone` so one failed fetch can be handed to every caller that was
/// waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("request for {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("translation server returned {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("invalid translation payload from {url}: {message}")]
    Parse { url: String, message: String },

    #[error("fetch for '{language}' was aborted: {message}")]
    Aborted { language: String, message: String },
}

impl LoadError {
    /// Transport failures, 429 and 5xx are worth another attempt; a missing
    /// payload or malformed JSON is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            LoadError::Request { .. } => true,
            LoadError::Status { status, .. } => *status == 429 || *status >= 500,
            LoadError::Parse { .. } | LoadError::Aborted { .. } => false,
        }
    }
}

/// Where translation documents come from.
#[async_trait]
pub trait TranslationSource: Send + Sync {
    async fn fetch(&self, language: &LanguageCode) -> Result<TranslationDocument, LoadError>;
}

/// Fetches payloads over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
    retry: RetryConfig,
}

impl HttpSource {
    /// Build a source for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration, retry: RetryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for translation payloads")?;

        Ok(Self::with_client(client, base_url, retry))
    }

    /// Build a source around an existing client.
    pub fn with_client(client: reqwest::Client, base_url: &str, retry: RetryConfig) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }

    /// URL of the payload for `language`.
    pub fn url_for(&self, language: &LanguageCode) -> String {
        format!("{}/{}.json", self.base_url, language)
    }

    async fn fetch_once(&self, url: &str) -> Result<TranslationDocument, LoadError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| LoadError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| LoadError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        TranslationDocument::from_slice(&body).map_err(|e| LoadError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl TranslationSource for HttpSource {
    async fn fetch(&self, language: &LanguageCode) -> Result<TranslationDocument, LoadError> {
        let url = self.url_for(language);
        debug!("Fetching translations for {} from {}", language, url);

        with_retry_if(
            &self.retry,
            &format!("Translations ({})", language),
            || self.fetch_once(&url),
            LoadError::is_retryable,
        )
        .await
    }
}
