// Audio side of the tour - clip loading and single-slot playback
// One rule above all: at most one clip audible, always the active zone's

pub mod assets;
pub mod player;

pub use assets::{AudioAssets, ClipSource};
pub use player::{PlaybackEvent, RodioZonePlayer, ZonePlayback};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("clip for zone {zone_id} ({name}) failed to load: {reason}")]
    Load {
        zone_id: u32,
        name: String,
        reason: String,
    },

    #[error("playback for zone {zone_id} failed to start: {reason}")]
    Playback { zone_id: u32, reason: String },

    #[error("no audio output device available: {0}")]
    Device(String),
}

impl AudioError {
    /// Zone the error belongs to, for the stale-failure check: a playback
    /// error whose zone is no longer active is dropped, not reported.
    pub fn zone_id(&self) -> Option<u32> {
        match self {
            AudioError::Load { zone_id, .. } | AudioError::Playback { zone_id, .. } => {
                Some(*zone_id)
            }
            AudioError::Device(_) => None,
        }
    }
}
