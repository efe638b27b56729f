//! Stale-while-revalidate loading of translation documents.
//!
//! `load` answers from, in order:
//! 1. the in-memory store (no I/O at all),
//! 2. the persistent cache, installing the stale copy immediately and
//!    refreshing it from the network in the background,
//! 3. the network, awaited (cold start).
//!
//! Network fetches run as spawned tasks and are shared: every caller asking
//! for a language while its fetch is in flight awaits the same task. A fetch
//! always runs to completion even if all of its callers go away.

use crate::i18n::{
    LanguageCode, LoaderMetrics, MetricsReport, PersistentCache, TranslationDocument,
    TranslationStore,
};
use crate::source::{LoadError, TranslationSource};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

type FetchResult = Result<Arc<TranslationDocument>, LoadError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// Loads translation documents into a [`TranslationStore`].
///
/// Cheap to clone; clones share the store, cache, and pending fetches.
#[derive(Clone)]
pub struct Loader {
    inner: Arc<LoaderInner>,
}

struct LoaderInner {
    store: Arc<TranslationStore>,
    cache: PersistentCache,
    source: Arc<dyn TranslationSource>,
    pending: Mutex<HashMap<LanguageCode, SharedFetch>>,
    metrics: LoaderMetrics,
}

impl Loader {
    pub fn new(
        store: Arc<TranslationStore>,
        cache: PersistentCache,
        source: Arc<dyn TranslationSource>,
    ) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                store,
                cache,
                source,
                pending: Mutex::new(HashMap::new()),
                metrics: LoaderMetrics::new(),
            }),
        }
    }

    /// Make the document for `language` resident and return it.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    /// Only a cold-start fetch can fail; a stale cached copy is always
    /// returned as success even if its background refresh later fails.
    pub async fn load(&self, language: &LanguageCode) -> FetchResult {
        let inner = &self.inner;

        if let Some(document) = inner.store.get(language) {
            inner.metrics.record_memory_hit();
            debug!("Translations for {} already resident", language);
            return Ok(document);
        }

        if let Some(document) = inner.cache.read(language) {
            inner.metrics.record_cache_hit();
            let document = Arc::new(document);
            inner.store.insert(language.clone(), Arc::clone(&document));
            info!("Serving cached translations for {}, refreshing in background", language);
            self.refresh_in_background(language);
            return Ok(document);
        }

        inner.metrics.record_cache_miss();
        debug!("No cached translations for {}, fetching", language);
        self.shared_fetch(language, false).await
    }

    /// Wait for the in-flight fetch for `language`, if there is one.
    ///
    /// Returns once any background refresh has settled, whatever its outcome.
    pub async fn wait_for_refresh(&self, language: &LanguageCode) {
        let pending = {
            let pending = self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner);
            pending.get(language).cloned()
        };

        if let Some(fetch) = pending {
            let _ = fetch.await;
        }
    }

    /// Wait for every fetch in flight right now.
    pub async fn wait_for_all(&self) {
        let fetches: Vec<SharedFetch> = {
            let pending = self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner);
            pending.values().cloned().collect()
        };

        futures::future::join_all(fetches).await;
    }

    /// Whether a fetch for `language` is in flight.
    pub fn is_fetching(&self, language: &LanguageCode) -> bool {
        let pending = self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.contains_key(language)
    }

    pub fn store(&self) -> &Arc<TranslationStore> {
        &self.inner.store
    }

    pub fn metrics(&self) -> MetricsReport {
        self.inner.metrics.report()
    }

    fn refresh_in_background(&self, language: &LanguageCode) {
        let fetch = self.shared_fetch(language, true);
        let language = language.clone();

        tokio::spawn(async move {
            match fetch.await {
                Ok(document) => debug!(
                    "Background refresh for {} done ({} keys)",
                    language,
                    document.key_count()
                ),
                Err(e) => warn!(
                    "Background refresh for {} failed, keeping cached copy: {}",
                    language, e
                ),
            }
        });
    }

    /// Join the fetch in flight for `language`, or start one.
    ///
    /// With `revalidate` the fetch starts even if a document is resident.
    fn shared_fetch(&self, language: &LanguageCode, revalidate: bool) -> SharedFetch {
        let inner = &self.inner;
        let mut pending = inner.pending.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(fetch) = pending.get(language) {
            inner.metrics.record_joined_fetch();
            debug!("Joining in-flight fetch for {}", language);
            return fetch.clone();
        }

        // A fetch that finished between the caller's store check and now has
        // already installed its document (it does so before leaving `pending`).
        if !revalidate {
            if let Some(document) = inner.store.get(language) {
                return futures::future::ready(Ok(document)).boxed().shared();
            }
        }

        inner.metrics.record_network_fetch();
        let task = tokio::spawn(fetch_and_install(Arc::clone(inner), language.clone()));
        let task_inner = Arc::clone(inner);
        let task_language = language.clone();

        let fetch = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => {
                    // The task never reached its own cleanup
                    task_inner
                        .pending
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .remove(&task_language);
                    task_inner.metrics.record_network_failure();
                    Err(LoadError::Aborted {
                        language: task_language.to_string(),
                        message: e.to_string(),
                    })
                }
            }
        }
        .boxed()
        .shared();

        pending.insert(language.clone(), fetch.clone());
        fetch
    }
}

/// Fetch `language` from the source, then install it in the store and the
/// persistent cache. Removes its own `pending` entry when done.
async fn fetch_and_install(inner: Arc<LoaderInner>, language: LanguageCode) -> FetchResult {
    let result = inner.source.fetch(&language).await;

    let outcome = match result {
        Ok(document) => {
            inner.cache.write(&language, &document);
            let document = Arc::new(document);
            inner.store.insert(language.clone(), Arc::clone(&document));
            info!(
                "✓ Loaded translations for {} ({} keys)",
                language,
                document.key_count()
            );
            Ok(document)
        }
        Err(e) => {
            inner.metrics.record_network_failure();
            debug!("Fetch for {} failed: {}", language, e);
            Err(e)
        }
    };

    let mut pending = inner.pending.lock().unwrap_or_else(PoisonError::into_inner);
    pending.remove(&language);
    outcome
}
