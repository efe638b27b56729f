//! Language registry: the closed set of supported languages.
//!
//! The registry is built once at startup (from configuration) and is
//! immutable afterwards. Exactly one language is the default; it is the
//! terminal fallback target for resolution and the coercion target for any
//! unsupported code.

use crate::i18n::LanguageCode;
use anyhow::{bail, Result};

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "fr")
    pub code: LanguageCode,

    /// English name of the language (e.g., "French")
    pub name: String,

    /// Native name of the language (e.g., "Français")
    pub native_name: String,

    /// Whether this is the default language (exactly one is)
    pub is_default: bool,
}

/// Supported languages, in the order they should be offered to users.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
    default: LanguageCode,
}

/// Display names for codes we know about: (code, English name, native name)
const KNOWN_LANGUAGES: &[(&str, &str, &str)] = &[
    ("en", "English", "English"),
    ("fr", "French", "Français"),
    ("es", "Spanish", "Español"),
    ("it", "Italian", "Italiano"),
    ("de", "German", "Deutsch"),
    ("pt", "Portuguese", "Português"),
    ("nl", "Dutch", "Nederlands"),
    ("pl", "Polish", "Polski"),
    ("sv", "Swedish", "Svenska"),
    ("ja", "Japanese", "日本語"),
];

/// Codes supported when nothing else is configured.
pub const DEFAULT_SUPPORTED: &[&str] = &["en", "fr", "es", "it", "de"];

/// Default language when nothing else is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

impl LanguageRegistry {
    /// Build a registry from an ordered list of codes and the default code.
    ///
    /// # Errors
    /// Fails if the list is empty, a code is not two lowercase ASCII letters,
    /// a code is repeated, or the default is not in the list.
    pub fn new<S: AsRef<str>>(codes: &[S], default: &str) -> Result<Self> {
        if codes.is_empty() {
            bail!("At least one supported language is required");
        }

        let mut languages: Vec<LanguageConfig> = Vec::with_capacity(codes.len());
        for code in codes {
            let code = code.as_ref();
            if !is_valid_code(code) {
                bail!("Invalid language code: '{}' (expected two lowercase letters)", code);
            }
            if languages.iter().any(|lang| lang.code == code) {
                bail!("Duplicate language code: '{}'", code);
            }

            let (name, native_name) = display_names(code);
            languages.push(LanguageConfig {
                code: LanguageCode::new(code),
                name,
                native_name,
                is_default: code == default,
            });
        }

        let Some(default) = languages.iter().find(|lang| lang.is_default) else {
            bail!("Default language '{}' is not in the supported set", default);
        };
        let default = default.code.clone();

        Ok(Self { languages, default })
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get the supported `LanguageCode` for `code`, if it is supported.
    pub fn get(&self, code: &str) -> Option<LanguageCode> {
        self.get_by_code(code).map(|lang| lang.code.clone())
    }

    /// Map any code onto the supported set; unsupported codes become the default.
    pub fn coerce(&self, code: &str) -> LanguageCode {
        self.get(code).unwrap_or_else(|| self.default.clone())
    }

    /// Check if a language code is supported.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    /// The default language.
    pub fn default_language(&self) -> &LanguageCode {
        &self.default
    }

    /// Supported codes, in configured order.
    pub fn supported(&self) -> Vec<LanguageCode> {
        self.languages.iter().map(|lang| lang.code.clone()).collect()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        let languages = DEFAULT_SUPPORTED
            .iter()
            .map(|code| {
                let (name, native_name) = display_names(code);
                LanguageConfig {
                    code: LanguageCode::new(code),
                    name,
                    native_name,
                    is_default: *code == DEFAULT_LANGUAGE,
                }
            })
            .collect();

        Self {
            languages,
            default: LanguageCode::new(DEFAULT_LANGUAGE),
        }
    }
}

/// English and native names for `code`; unknown codes use the code for both.
fn display_names(code: &str) -> (String, String) {
    KNOWN_LANGUAGES
        .iter()
        .find(|(known, _, _)| *known == code)
        .map(|(_, name, native)| (name.to_string(), native.to_string()))
        .unwrap_or_else(|| (code.to_string(), code.to_string()))
}

fn is_valid_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_lowercase())
}
