//! The i18n context: one owned instance per application.
//!
//! Holds the active language, the resident documents, and everything needed
//! to load and switch languages. Construct it once at startup and share it
//! (it is `Send + Sync`; wrap it in an `Arc`).

use crate::config::Config;
use crate::i18n::detector::{self, FixedLocale, LocaleSource, SystemLocale};
use crate::i18n::{
    ChangeCause, ChangeNotifier, LanguageChanged, LanguageCode, LanguageRegistry, Loader,
    MetricsReport, PersistentCache, TranslationStore,
};
use crate::i18n::resolver;
use crate::source::{HttpSource, LoadError, TranslationSource};
use crate::storage::{FileStore, KeyValueStore};
use anyhow::{Context, Result};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Storage key holding the user's language preference.
const PREFERENCE_KEY: &str = "lang";

/// Startup progress. Once `Ready`, stays `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupPhase {
    Uninitialized,
    DetectingLanguage,
    SeedingCache,
    Ready,
}

/// Outcome of [`I18n::start`].
#[derive(Debug, Clone)]
pub struct StartupReport {
    /// Language the resolver answers for after startup
    pub language: LanguageCode,

    /// Loads that failed while seeding; resolution degrades to fallbacks
    pub failures: Vec<(LanguageCode, LoadError)>,
}

#[derive(Debug)]
struct Session {
    phase: StartupPhase,
    /// Most recently requested language (what `language()` reports)
    active: LanguageCode,
    /// Language the resolver reads; moves only when a load settles
    view: LanguageCode,
    /// Sequence number of the most recent startup/switch request
    latest_request: u64,
}

/// Translation resolution and caching engine.
pub struct I18n {
    registry: Arc<LanguageRegistry>,
    storage: Arc<dyn KeyValueStore>,
    locale: Box<dyn LocaleSource>,
    loader: Loader,
    notifier: ChangeNotifier,
    session: RwLock<Session>,
}

impl I18n {
    pub fn new(
        registry: LanguageRegistry,
        storage: Arc<dyn KeyValueStore>,
        source: Arc<dyn TranslationSource>,
        locale: impl LocaleSource + 'static,
    ) -> Self {
        let default = registry.default_language().clone();
        let store = Arc::new(TranslationStore::new(default.clone()));
        let loader = Loader::new(store, PersistentCache::new(Arc::clone(&storage)), source);

        Self {
            registry: Arc::new(registry),
            storage,
            locale: Box::new(locale),
            loader,
            notifier: ChangeNotifier::new(),
            session: RwLock::new(Session {
                phase: StartupPhase::Uninitialized,
                active: default.clone(),
                view: default,
                latest_request: 0,
            }),
        }
    }

    /// Wire up file storage, the HTTP payload source, and the locale signal
    /// described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = config.registry()?;
        let storage = FileStore::open(&config.cache_dir).with_context(|| {
            format!("Failed to open cache directory {}", config.cache_dir.display())
        })?;
        let source = HttpSource::new(
            &config.translations_url,
            config.fetch_timeout(),
            config.retry(),
        )?;

        let i18n = match &config.locale_override {
            Some(locale) => Self::new(
                registry,
                Arc::new(storage),
                Arc::new(source),
                FixedLocale::new(locale.clone()),
            ),
            None => Self::new(registry, Arc::new(storage), Arc::new(source), SystemLocale),
        };
        Ok(i18n)
    }

    /// Detect the language, seed the default and active documents, and
    /// enter `Ready`, notifying subscribers once.
    ///
    /// Load failures do not stop startup; they are reported and resolution
    /// falls back to whatever did load (ultimately the literal keys). A
    /// second call does nothing.
    pub async fn start(&self) -> StartupReport {
        let request = {
            let mut session = self.write_session();
            if session.phase != StartupPhase::Uninitialized {
                debug!("Startup already ran (phase {:?})", session.phase);
                return StartupReport {
                    language: session.view.clone(),
                    failures: Vec::new(),
                };
            }
            session.phase = StartupPhase::DetectingLanguage;
            session.latest_request += 1;
            session.latest_request
        };

        let preference = self.read_preference();
        let locale = self.locale.locale();
        let detected = detector::detect(&self.registry, preference.as_deref(), locale.as_deref());
        let default = self.registry.default_language().clone();

        {
            let mut session = self.write_session();
            session.phase = StartupPhase::SeedingCache;
            if session.latest_request == request {
                session.active = detected.clone();
            }
        }
        info!("Detected language {}, seeding translations", detected);

        let mut results = Vec::with_capacity(2);
        if detected == default {
            results.push((default.clone(), self.loader.load(&default).await));
        } else {
            let (default_result, active_result) =
                futures::join!(self.loader.load(&default), self.loader.load(&detected));
            results.push((default.clone(), default_result));
            results.push((detected.clone(), active_result));
        }

        let mut failures = Vec::new();
        for (language, result) in results {
            if let Err(e) = result {
                warn!("Could not load translations for {} at startup: {}", language, e);
                failures.push((language, e));
            }
        }

        let language = {
            let mut session = self.write_session();
            session.phase = StartupPhase::Ready;
            if session.latest_request == request {
                session.view = detected;
            }
            session.view.clone()
        };

        info!("✓ Translations ready ({})", language);
        self.notifier.notify(LanguageChanged {
            language: language.clone(),
            cause: ChangeCause::Startup,
        });

        StartupReport { language, failures }
    }

    /// Switch to `requested` (coerced to the default if unsupported).
    ///
    /// The preference is persisted and `language()` reflects the request
    /// immediately. The resolver moves to the new language and subscribers
    /// are notified once the document load settles, unless a newer switch
    /// was requested in the meantime, in which case this one settles
    /// silently.
    pub async fn set_language(&self, requested: &str) -> LanguageCode {
        let language = self.registry.coerce(requested);
        if language != requested {
            debug!("Unsupported language '{}' coerced to {}", requested, language);
        }

        self.write_preference(&language);

        let request = {
            let mut session = self.write_session();
            session.latest_request += 1;
            session.active = language.clone();
            session.latest_request
        };

        if let Err(e) = self.loader.load(&language).await {
            warn!(
                "Could not load translations for {}, falling back to what is loaded: {}",
                language, e
            );
        }

        let current = {
            let mut session = self.write_session();
            let current = session.latest_request == request;
            if current {
                session.view = language.clone();
            }
            current
        };

        if current {
            info!("Language switched to {}", language);
            self.notifier.notify(LanguageChanged {
                language: language.clone(),
                cause: ChangeCause::Switch,
            });
        } else {
            debug!("Switch to {} superseded by a newer request", language);
        }

        language
    }

    /// Resolve `key`, falling back to the default language, then to
    /// `fallback`, then to the key itself.
    pub fn translate(&self, key: &str, fallback: Option<&str>) -> String {
        let view = self.read_session().view.clone();
        resolver::resolve(
            self.loader.store(),
            &view,
            self.registry.default_language(),
            key,
            fallback,
        )
    }

    /// Shorthand for `translate(key, None)`.
    pub fn t(&self, key: &str) -> String {
        self.translate(key, None)
    }

    /// The most recently requested (active) language.
    pub fn language(&self) -> LanguageCode {
        self.read_session().active.clone()
    }

    /// Supported languages, in configured order.
    pub fn supported_languages(&self) -> Vec<LanguageCode> {
        self.registry.supported()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LanguageChanged> {
        self.notifier.subscribe()
    }

    pub fn phase(&self) -> StartupPhase {
        self.read_session().phase
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    pub fn metrics(&self) -> MetricsReport {
        self.loader.metrics()
    }

    fn read_preference(&self) -> Option<String> {
        match self.storage.get(PREFERENCE_KEY) {
            Ok(preference) => preference,
            Err(e) => {
                warn!("Could not read language preference, ignoring: {}", e);
                None
            }
        }
    }

    fn write_preference(&self, language: &LanguageCode) {
        if let Err(e) = self.storage.set(PREFERENCE_KEY, language.as_str()) {
            warn!("Could not persist language preference {}: {}", language, e);
        }
    }

    fn read_session(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_session(&self) -> std::sync::RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }
}
