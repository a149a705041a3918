// Position feed - one initial fix, then a serial stream of updates
// Delivered over an mpsc channel so the tracking loop stays single-consumer

pub mod route;

pub use route::RouteSource;

use crate::geo::Position;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum LocationError {
    /// The source cannot start at all (no capability, permission denied).
    /// Tracking never begins.
    #[error("location unavailable: {0}")]
    Unavailable(String),

    /// One update failed. Reported, previous state retained, tracking
    /// continues with the next update.
    #[error("location update failed: {0}")]
    Update(String),
}

#[derive(Debug)]
pub enum LocationEvent {
    Position(Position),
    Error(LocationError),
}

/// Knobs forwarded to whatever produces the fixes. Mirrors the usual
/// positioning options: prefer high accuracy, never serve a stale cached
/// fix (max age 0), and give up on a single update after a timeout.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    pub high_accuracy: bool,
    pub max_age_secs: u64,
    pub update_timeout_secs: u64,
}

impl From<&crate::config::LocationConfig> for SourceOptions {
    fn from(cfg: &crate::config::LocationConfig) -> Self {
        Self {
            high_accuracy: cfg.high_accuracy,
            max_age_secs: cfg.max_age_secs,
            update_timeout_secs: cfg.update_timeout_secs,
        }
    }
}

/// External position source. `subscribe` delivers the one-shot initial fix
/// followed by the update stream; `cancel` releases the subscription, after
/// which no further events arrive and the channel closes.
pub trait LocationSource {
    fn subscribe(&mut self) -> Result<mpsc::UnboundedReceiver<LocationEvent>, LocationError>;
    fn cancel(&mut self);
}
