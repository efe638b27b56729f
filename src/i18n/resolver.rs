//! Key resolution over whatever documents are resident.
//!
//! Fallback chain: the view language's document, then the default
//! language's document, then the caller's fallback literal, then the key
//! itself. Never blocks, never performs I/O, never fails.

use crate::i18n::{LanguageCode, TranslationStore};

/// Resolve `key` against `store` for `language`.
pub fn resolve(
    store: &TranslationStore,
    language: &LanguageCode,
    default: &LanguageCode,
    key: &str,
    fallback: Option<&str>,
) -> String {
    if let Some(value) = lookup_in(store, language, key) {
        return value;
    }

    if language != default {
        if let Some(value) = lookup_in(store, default, key) {
            return value;
        }
    }

    fallback.unwrap_or(key).to_string()
}

fn lookup_in(store: &TranslationStore, language: &LanguageCode, key: &str) -> Option<String> {
    let document = store.get(language)?;
    document.lookup(key).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{LanguageRegistry, TranslationDocument};
    use serde_json::json;
    use std::sync::Arc;

    fn lang(code: &str) -> LanguageCode {
        LanguageRegistry::default().get(code).unwrap()
    }

    fn store_with(documents: &[(&str, serde_json::Value)]) -> TranslationStore {
        let store = TranslationStore::new(lang("en"));
        for (code, value) in documents {
            let document: TranslationDocument = serde_json::from_value(value.clone()).unwrap();
            store.insert(lang(code), Arc::new(document));
        }
        store
    }

    fn t(store: &TranslationStore, language: &str, key: &str) -> String {
        resolve(store, &lang(language), &lang("en"), key, None)
    }

    // ==================== Direct Lookup Tests ====================

    #[test]
    fn test_nested_key_resolves() {
        let store = store_with(&[("en", json!({"a": {"b": {"c": "X"}}}))]);
        assert_eq!(t(&store, "en", "a.b.c"), "X");
    }

    #[test]
    fn test_missing_key_returns_key() {
        let store = store_with(&[("en", json!({"a": {"b": {}}}))]);
        assert_eq!(t(&store, "en", "a.b.c"), "a.b.c");
    }

    #[test]
    fn test_active_language_wins() {
        let store = store_with(&[
            ("en", json!({"nav": {"home": "Home"}})),
            ("fr", json!({"nav": {"home": "Accueil"}})),
        ]);
        assert_eq!(t(&store, "fr", "nav.home"), "Accueil");
    }

    // ==================== Fallback Chain Tests ====================

    #[test]
    fn test_falls_back_to_default_language() {
        let store = store_with(&[
            ("en", json!({"nav": {"home": "Home", "pricing": "Pricing"}})),
            ("fr", json!({"nav": {"home": "Accueil"}})),
        ]);
        assert_eq!(t(&store, "fr", "nav.pricing"), "Pricing");
    }

    #[test]
    fn test_active_document_absent_uses_default() {
        let store = store_with(&[("en", json!({"nav": {"home": "Home"}}))]);
        assert_eq!(t(&store, "de", "nav.home"), "Home");
    }

    #[test]
    fn test_nothing_loaded_returns_key() {
        let store = store_with(&[]);
        assert_eq!(t(&store, "it", "nav.home"), "nav.home");
    }

    #[test]
    fn test_fallback_literal_used_when_unresolved() {
        let store = store_with(&[("en", json!({}))]);
        let value = resolve(&store, &lang("es"), &lang("en"), "cta.buy", Some("Buy now"));
        assert_eq!(value, "Buy now");
    }

    #[test]
    fn test_fallback_literal_ignored_when_resolved() {
        let store = store_with(&[("en", json!({"cta": {"buy": "Buy"}}))]);
        let value = resolve(&store, &lang("es"), &lang("en"), "cta.buy", Some("Buy now"));
        assert_eq!(value, "Buy");
    }

    #[test]
    fn test_default_language_does_not_fall_back_further() {
        let store = store_with(&[
            ("en", json!({})),
            ("fr", json!({"only": "Seulement"})),
        ]);
        assert_eq!(t(&store, "en", "only"), "only");
    }

    #[test]
    fn test_mapping_value_is_not_a_translation() {
        let store = store_with(&[("en", json!({"nav": {"home": "Home"}}))]);
        assert_eq!(t(&store, "en", "nav"), "nav");
    }

    #[test]
    fn test_resolution_does_not_mutate_store() {
        let store = store_with(&[("en", json!({"a": "A"}))]);
        let _ = t(&store, "fr", "a");
        let _ = t(&store, "fr", "missing");
        assert_eq!(store.loaded(), vec![lang("en")]);
    }
}
