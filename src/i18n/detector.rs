//! Active language detection.
//!
//! Priority order: persisted preference, then the environment locale signal,
//! then the registry default. Detection never fails.

use crate::i18n::{LanguageCode, LanguageRegistry};
use tracing::debug;

/// Source of the environment's locale signal (e.g. "fr-FR").
pub trait LocaleSource: Send + Sync {
    /// Best-effort locale string, `None` if the environment reports nothing.
    fn locale(&self) -> Option<String>;
}

/// Reads the operating system locale.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLocale;

impl LocaleSource for SystemLocale {
    fn locale(&self) -> Option<String> {
        sys_locale::get_locale()
    }
}

/// A locale fixed up front (configuration override, tests).
#[derive(Debug, Clone, Default)]
pub struct FixedLocale(pub Option<String>);

impl FixedLocale {
    pub fn new(locale: impl Into<String>) -> Self {
        FixedLocale(Some(locale.into()))
    }

    pub fn none() -> Self {
        FixedLocale(None)
    }
}

impl LocaleSource for FixedLocale {
    fn locale(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Pick the active language.
///
/// `preference` is matched exactly against the supported set. Only the first
/// two characters of `locale` are significant, compared lowercased.
pub fn detect(
    registry: &LanguageRegistry,
    preference: Option<&str>,
    locale: Option<&str>,
) -> LanguageCode {
    if let Some(language) = preference.and_then(|p| registry.get(p)) {
        debug!("Using persisted language preference: {}", language);
        return language;
    }

    if let Some(locale) = locale {
        let prefix: String = locale.chars().take(2).collect::<String>().to_lowercase();
        if let Some(language) = registry.get(&prefix) {
            debug!("Using environment locale '{}' -> {}", locale, language);
            return language;
        }
    }

    let language = registry.default_language().clone();
    debug!("No usable preference or locale, using default: {}", language);
    language
}
