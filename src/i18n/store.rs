//! In-memory translation store: the read path for resolution.

use crate::i18n::{LanguageCode, TranslationDocument};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Loaded documents by language.
///
/// Entries are swapped whole, so a reader sees either the previous document
/// or the new one. The default language's entry is never evicted once loaded.
#[derive(Debug)]
pub struct TranslationStore {
    documents: RwLock<HashMap<LanguageCode, Arc<TranslationDocument>>>,
    default: LanguageCode,
}

impl TranslationStore {
    pub fn new(default: LanguageCode) -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
            default,
        }
    }

    pub fn get(&self, language: &LanguageCode) -> Option<Arc<TranslationDocument>> {
        let documents = self.documents.read().unwrap_or_else(PoisonError::into_inner);
        documents.get(language).cloned()
    }

    pub fn contains(&self, language: &LanguageCode) -> bool {
        let documents = self.documents.read().unwrap_or_else(PoisonError::into_inner);
        documents.contains_key(language)
    }

    /// Install `document` for `language`, replacing any previous entry.
    pub fn insert(&self, language: LanguageCode, document: Arc<TranslationDocument>) {
        let mut documents = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        documents.insert(language, document);
    }

    /// Drop the entry for `language` so the next load goes back to the cache
    /// and network. Returns `false` for the default language, which stays.
    pub fn evict(&self, language: &LanguageCode) -> bool {
        if *language == self.default {
            return false;
        }
        let mut documents = self.documents.write().unwrap_or_else(PoisonError::into_inner);
        documents.remove(language).is_some()
    }

    /// Languages currently resident, sorted by code.
    pub fn loaded(&self) -> Vec<LanguageCode> {
        let documents = self.documents.read().unwrap_or_else(PoisonError::into_inner);
        let mut languages: Vec<_> = documents.keys().cloned().collect();
        languages.sort();
        languages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::LanguageRegistry;
    use serde_json::json;

    fn lang(code: &str) -> LanguageCode {
        LanguageRegistry::default().get(code).unwrap()
    }

    fn doc(value: serde_json::Value) -> Arc<TranslationDocument> {
        Arc::new(serde_json::from_value(value).unwrap())
    }

    fn create_test_store() -> TranslationStore {
        TranslationStore::new(lang("en"))
    }

    #[test]
    fn test_empty_store() {
        let store = create_test_store();
        assert!(store.get(&lang("en")).is_none());
        assert!(store.loaded().is_empty());
    }

    #[test]
    fn test_insert_and_get() {
        let store = create_test_store();
        store.insert(lang("fr"), doc(json!({"hello": "Bonjour"})));

        assert!(store.contains(&lang("fr")));
        assert_eq!(store.get(&lang("fr")).unwrap().lookup("hello"), Some("Bonjour"));
    }

    #[test]
    fn test_insert_replaces_wholesale() {
        let store = create_test_store();
        store.insert(lang("fr"), doc(json!({"hello": "Bonjour", "bye": "Au revoir"})));
        store.insert(lang("fr"), doc(json!({"hello": "Salut"})));

        let document = store.get(&lang("fr")).unwrap();
        assert_eq!(document.lookup("hello"), Some("Salut"));
        // Not merged: the old key is gone
        assert_eq!(document.lookup("bye"), None);
    }

    #[test]
    fn test_reader_keeps_old_snapshot() {
        let store = create_test_store();
        store.insert(lang("es"), doc(json!({"hello": "Hola"})));
        let before = store.get(&lang("es")).unwrap();

        store.insert(lang("es"), doc(json!({"hello": "Buenas"})));

        assert_eq!(before.lookup("hello"), Some("Hola"));
        assert_eq!(store.get(&lang("es")).unwrap().lookup("hello"), Some("Buenas"));
    }

    #[test]
    fn test_evict_non_default() {
        let store = create_test_store();
        store.insert(lang("de"), doc(json!({"hello": "Hallo"})));

        assert!(store.evict(&lang("de")));
        assert!(!store.contains(&lang("de")));
        // Nothing left to evict
        assert!(!store.evict(&lang("de")));
    }

    #[test]
    fn test_default_is_never_evicted() {
        let store = create_test_store();
        store.insert(lang("en"), doc(json!({"hello": "Hello"})));

        assert!(!store.evict(&lang("en")));
        assert!(store.contains(&lang("en")));
    }

    #[test]
    fn test_loaded_is_sorted() {
        let store = create_test_store();
        store.insert(lang("it"), doc(json!({})));
        store.insert(lang("de"), doc(json!({})));
        store.insert(lang("en"), doc(json!({})));

        assert_eq!(store.loaded(), vec![lang("de"), lang("en"), lang("it")]);
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let store = Arc::new(create_test_store());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for n in 0..50 {
                        if i % 2 == 0 {
                            store.insert(lang("fr"), doc(json!({"n": n.to_string()})));
                        } else if let Some(document) = store.get(&lang("fr")) {
                            assert!(document.lookup("n").is_some());
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread panicked");
        }
        assert!(store.contains(&lang("fr")));
    }
}
