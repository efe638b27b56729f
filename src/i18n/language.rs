//! Language type: a code that is guaranteed to be supported.
//!
//! A `LanguageCode` can only be obtained from a [`LanguageRegistry`], which
//! either hands back a supported code or coerces the input to the default.
//!
//! [`LanguageRegistry`]: crate::i18n::LanguageRegistry

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A validated, supported language code (ISO 639-1, e.g. "en", "fr").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct LanguageCode(Arc<str>);

impl LanguageCode {
    /// Wrap a code that the registry has already validated.
    pub(crate) fn new(code: &str) -> Self {
        LanguageCode(Arc::from(code))
    }

    /// Get the ISO 639-1 language code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LanguageCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for LanguageCode {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for LanguageCode {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}
