// Clip store - resolves a zone's audio path to a decoded, replayable source
// Eager preload and lazy first-entry load share the one ensure_loaded() path

use super::AudioError;
use crate::config::PreloadMode;
use crate::zone::{Zone, ZoneSet};
use rodio::source::Buffered;
use rodio::{Decoder, Source};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A fully decoded clip. Buffered sources are cheap to clone and always
/// start from position zero, which is exactly the reset-on-replay the
/// tour needs.
pub type ClipSource = Buffered<Decoder<BufReader<File>>>;

pub struct AudioAssets {
    clips: HashMap<u32, ClipSource>,
    load_timeout: Duration,
}

impl AudioAssets {
    pub fn new(load_timeout: Duration) -> Self {
        Self {
            clips: HashMap::new(),
            load_timeout,
        }
    }

    /// Blocking decode of one zone's clip.
    fn decode_clip(zone: &Zone) -> Result<ClipSource, AudioError> {
        let load_err = |reason: String| AudioError::Load {
            zone_id: zone.id,
            name: zone.name.clone(),
            reason,
        };

        let file = File::open(&zone.audio_path)
            .map_err(|e| load_err(format!("open {}: {}", zone.audio_path.display(), e)))?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| load_err(format!("decode {}: {}", zone.audio_path.display(), e)))?;

        Ok(source.buffered())
    }

    /// The single load path. Returns the cached clip, or decodes it now
    /// (the lazy mode's first-entry load). A failed decode is not cached,
    /// so a transient failure can succeed on a later entry.
    pub fn ensure_loaded(&mut self, zone: &Zone) -> Result<&ClipSource, AudioError> {
        if !self.clips.contains_key(&zone.id) {
            debug!(zone_id = zone.id, path = %zone.audio_path.display(), "decoding clip");
            let clip = Self::decode_clip(zone)?;
            self.clips.insert(zone.id, clip);
        }
        Ok(&self.clips[&zone.id])
    }

    pub fn is_loaded(&self, zone_id: u32) -> bool {
        self.clips.contains_key(&zone_id)
    }

    /// Eager batch preload: decode every zone's clip off the async runtime,
    /// each under the per-asset deadline. Returns the per-zone failures;
    /// whether those gate tracking start is the caller's policy.
    pub async fn preload_all(&mut self, zones: &ZoneSet) -> Vec<AudioError> {
        let mut failures = Vec::new();

        for zone in zones.iter() {
            if self.clips.contains_key(&zone.id) {
                continue;
            }

            let job = {
                let zone = zone.clone();
                tokio::task::spawn_blocking(move || Self::decode_clip(&zone))
            };

            let result = match tokio::time::timeout(self.load_timeout, job).await {
                Ok(Ok(decoded)) => decoded,
                Ok(Err(join_err)) => Err(AudioError::Load {
                    zone_id: zone.id,
                    name: zone.name.clone(),
                    reason: format!("decode task failed: {join_err}"),
                }),
                Err(_) => Err(AudioError::Load {
                    zone_id: zone.id,
                    name: zone.name.clone(),
                    reason: format!("timed out after {:?}", self.load_timeout),
                }),
            };

            match result {
                Ok(clip) => {
                    info!(zone_id = zone.id, name = %zone.name, "clip preloaded");
                    self.clips.insert(zone.id, clip);
                }
                Err(e) => {
                    warn!(zone_id = zone.id, name = %zone.name, "clip preload failed: {e}");
                    failures.push(e);
                }
            }
        }

        failures
    }

    /// Honors the configured mode: eager preloads now, lazy defers to
    /// first entry. One switch, one code path underneath.
    pub async fn prepare(&mut self, zones: &ZoneSet, mode: PreloadMode) -> Vec<AudioError> {
        match mode {
            PreloadMode::Eager => self.preload_all(zones).await,
            PreloadMode::Lazy => Vec::new(),
        }
    }
}
