//! Internationalization (i18n) for the portal's UI text.
//!
//! Translation documents are nested JSON mappings fetched per language and
//! cached durably on the client. Lookups are synchronous and never fail:
//! anything that is not resident falls back to the default language, then to
//! a caller-supplied literal, then to the key itself.
//!
//! # Architecture
//!
//! - `registry`: Supported languages, their display names, and the default
//! - `language`: Validated `LanguageCode` type
//! - `detector`: Picks the initial language from the stored preference and OS locale
//! - `document`: A parsed translation payload and dotted-key lookup
//! - `cache`: Durable copy of each payload (stale-while-revalidate source)
//! - `store`: In-memory documents the resolver reads
//! - `loader`: Memory / cache / network loading with shared in-flight fetches
//! - `resolver`: The fallback chain
//! - `notifier`: Language change broadcasts
//! - `metrics`: Loader hit/miss counters
//! - `context`: `I18n`, the object applications hold
//!
//! # Example
//!
//! ```rust,ignore
//! use portal_i18n::config::Config;
//! use portal_i18n::i18n::I18n;
//!
//! let i18n = I18n::from_config(&Config::from_env()?)?;
//! i18n.start().await;
//!
//! let label = i18n.translate("nav.pricing", Some("Pricing"));
//! i18n.set_language("fr").await;
//! ```

mod cache;
mod context;
mod detector;
mod document;
mod language;
mod loader;
mod metrics;
mod notifier;
mod registry;
pub mod resolver;
mod store;

pub use cache::PersistentCache;
pub use context::{I18n, StartupPhase, StartupReport};
pub use detector::{detect, FixedLocale, LocaleSource, SystemLocale};
pub use document::TranslationDocument;
pub use language::LanguageCode;
pub use loader::Loader;
pub use metrics::{LoaderMetrics, MetricsReport};
pub use notifier::{ChangeCause, ChangeNotifier, LanguageChanged};
pub use registry::{LanguageConfig, LanguageRegistry, DEFAULT_LANGUAGE, DEFAULT_SUPPORTED};
pub use store::TranslationStore;
