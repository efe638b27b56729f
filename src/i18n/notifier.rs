//! Language change notifications.
//!
//! Consumers that paint text (the rendering layer, a language switcher)
//! subscribe and re-render when a `LanguageChanged` arrives. Fired once when
//! startup reaches `Ready` and after every switch that is still current when
//! its load settles.

use crate::i18n::LanguageCode;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

/// Buffered notifications per subscriber before the slowest one lags.
const CHANNEL_CAPACITY: usize = 16;

/// What triggered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeCause {
    Startup,
    Switch,
}

/// The resolver now answers for `language`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageChanged {
    pub language: LanguageCode,
    pub cause: ChangeCause,
}

/// Broadcasts [`LanguageChanged`] to every subscriber.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<LanguageChanged>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LanguageChanged> {
        self.sender.subscribe()
    }

    /// Send `event`; returns how many subscribers it reached.
    pub fn notify(&self, event: LanguageChanged) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                debug!("No subscribers for language change to {}", event.language);
                0
            }
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
