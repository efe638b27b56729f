//! Translation resolution and caching engine for the portal.
//!
//! See [`i18n::I18n`] for the entry point.

pub mod config;
pub mod i18n;
pub mod retry;
pub mod source;
pub mod storage;
