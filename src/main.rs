//! Resolve translation keys from the command line.
//!
//! Usage:
//!   portal-i18n nav.home nav.pricing           # Detected language
//!   portal-i18n --lang fr nav.home             # Switch first, then resolve
//!
//! Optional environment variables:
//! - I18N_BASE_URL (defaults to http://localhost:3000/i18n)
//! - I18N_CACHE_DIR (defaults to .portal-i18n)
//! - I18N_SUPPORTED (defaults to en,fr,es,it,de)
//! - I18N_DEFAULT (defaults to en)
//! - I18N_LOCALE (overrides the OS locale)
//! - I18N_FETCH_TIMEOUT_SECS (defaults to 10)
//! - I18N_FETCH_ATTEMPTS (defaults to 3)

use anyhow::{bail, Result};
use portal_i18n::config::Config;
use portal_i18n::i18n::{I18n, LanguageChanged};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

struct Args {
    language: Option<String>,
    keys: Vec<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut language = None;
    let mut keys = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--lang" {
            match args.next() {
                Some(code) => language = Some(code),
                None => bail!("--lang needs a language code"),
            }
        } else {
            keys.push(arg);
        }
    }

    Ok(Args { language, keys })
}

/// Log every language change until the notifier goes away. Returns how many
/// changes were logged.
async fn log_changes(mut changes: broadcast::Receiver<LanguageChanged>) -> usize {
    let mut logged = 0;
    loop {
        match changes.recv().await {
            Ok(change) => {
                info!("Language is now {} ({:?})", change.language, change.cause);
                logged += 1;
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Missed {} language change notifications", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
    logged
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("portal_i18n=info".parse()?),
        )
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let config = Config::from_env()?;
    let i18n = I18n::from_config(&config)?;

    tokio::spawn(log_changes(i18n.subscribe()));

    let report = i18n.start().await;
    for (language, error) in &report.failures {
        info!("Continuing without {} translations: {}", language, error);
    }

    if let Some(code) = &args.language {
        i18n.set_language(code).await;
    }

    for key in &args.keys {
        println!("{} = {}", key, i18n.t(key));
    }

    // Let background refreshes land in the cache before exiting
    i18n.loader().wait_for_all().await;

    println!("{}", serde_json::to_string_pretty(&i18n.metrics())?);
    Ok(())
}
