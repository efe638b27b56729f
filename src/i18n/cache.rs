//! Persistent translation cache.
//!
//! Snapshots of the last successfully fetched payload per language, kept in
//! durable storage so the next start can serve text before the network
//! answers. Every fault is swallowed: a failed read is a miss, a failed
//! write is skipped.

use crate::i18n::{LanguageCode, TranslationDocument};
use crate::storage::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Storage key prefix for cached payloads (`i18n.<code>`).
const CACHE_KEY_PREFIX: &str = "i18n.";

/// What is stored under each cache key.
#[derive(Debug, Serialize, Deserialize)]
struct CachedPayload {
    language: String,
    fetched_at: DateTime<Utc>,
    translations: TranslationDocument,
}

/// Best-effort cache of translation documents keyed by language.
#[derive(Clone)]
pub struct PersistentCache {
    storage: Arc<dyn KeyValueStore>,
}

impl PersistentCache {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Read the cached document for `language`, `None` on a miss or any fault.
    pub fn read(&self, language: &LanguageCode) -> Option<TranslationDocument> {
        let key = cache_key(language);
        let raw = match self.storage.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No cached translations for {}", language);
                return None;
            }
            Err(e) => {
                warn!("Translation cache read failed for {}, treating as empty: {}", language, e);
                return None;
            }
        };

        let payload: CachedPayload = match serde_json::from_str(&raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Cached translations for {} are corrupt, ignoring: {}", language, e);
                return None;
            }
        };

        if payload.language != language.as_str() {
            warn!(
                "Cached translations under {} belong to '{}', ignoring",
                key, payload.language
            );
            return None;
        }

        debug!(
            "Loaded cached translations for {} ({} keys, fetched {})",
            language,
            payload.translations.key_count(),
            payload.fetched_at.to_rfc3339()
        );
        Some(payload.translations)
    }

    /// Store `document` as the latest snapshot for `language`.
    pub fn write(&self, language: &LanguageCode, document: &TranslationDocument) {
        let payload = CachedPayload {
            language: language.as_str().to_string(),
            fetched_at: Utc::now(),
            translations: document.clone(),
        };

        let raw = match serde_json::to_string(&payload) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Could not serialize translations for {}, skipping cache write: {}", language, e);
                return;
            }
        };

        match self.storage.set(&cache_key(language), &raw) {
            Ok(()) => debug!("Cached translations for {} ({} bytes)", language, raw.len()),
            Err(e) => warn!("Translation cache write skipped for {}: {}", language, e),
        }
    }
}

fn cache_key(language: &LanguageCode) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, language)
}
