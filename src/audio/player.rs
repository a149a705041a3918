use super::{AudioAssets, AudioError};
use crate::config::PreloadMode;
use crate::zone::{Zone, ZoneSet};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tokio::sync::mpsc;
use tracing::debug;

/// Playback notifications, tagged with the zone they belong to so a
/// consumer can drop reports that arrive after the active zone moved on.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    Started { zone_id: u32 },
    Stopped { zone_id: u32 },
    Failed { zone_id: u32, reason: String },
}

/// The seam between the tracking state machine and actual audio output.
/// Contract: at most one clip audible at a time, mapped 1:1 to the
/// active zone; a start failure leaves no zone active.
pub trait ZonePlayback {
    /// Idempotent while the zone's clip is already audible. Otherwise
    /// stops whatever is playing and starts this zone's clip from zero.
    fn enter_zone(&mut self, zone: &Zone) -> Result<(), AudioError>;

    /// Stops and resets any active playback. Safe to call when idle.
    fn exit_zone(&mut self);

    fn active_zone(&self) -> Option<u32>;

    /// Loads clips ahead of tracking per the configured mode. Returns the
    /// per-zone failures; whether they gate tracking start is the caller's
    /// policy.
    async fn prepare_clips(&mut self, zones: &ZoneSet, mode: PreloadMode) -> Vec<AudioError>;
}

pub struct RodioZonePlayer {
    _stream: OutputStream,
    stream_handle: OutputStreamHandle,
    sink: Option<Sink>,
    assets: AudioAssets,
    active_zone: Option<u32>,
    volume: f32,
    event_sender: Option<mpsc::UnboundedSender<PlaybackEvent>>,
}

impl RodioZonePlayer {
    pub fn new(assets: AudioAssets, volume: f32) -> Result<Self, AudioError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| AudioError::Device(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink: None,
            assets,
            active_zone: None,
            volume: volume.clamp(0.0, 1.0),
            event_sender: None,
        })
    }

    pub fn set_event_sender(&mut self, sender: mpsc::UnboundedSender<PlaybackEvent>) {
        self.event_sender = Some(sender);
    }

    fn send(&self, event: PlaybackEvent) {
        if let Some(sender) = &self.event_sender {
            let _ = sender.send(event);
        }
    }

    fn playback_audible(&self) -> bool {
        self.sink.as_ref().map(|s| !s.empty()).unwrap_or(false)
    }
}

impl ZonePlayback for RodioZonePlayer {
    fn enter_zone(&mut self, zone: &Zone) -> Result<(), AudioError> {
        // Re-entry into the zone whose clip is still audible is a no-op.
        // A finished clip does restart, matching re-entering after the
        // narration ran out.
        if self.active_zone == Some(zone.id) && self.playback_audible() {
            return Ok(());
        }

        self.exit_zone();

        // Lazy mode decodes here on first entry; eager mode hits the cache
        let clip = self.assets.ensure_loaded(zone)?.clone();

        let sink = Sink::try_new(&self.stream_handle).map_err(|e| {
            let err = AudioError::Playback {
                zone_id: zone.id,
                reason: e.to_string(),
            };
            self.send(PlaybackEvent::Failed {
                zone_id: zone.id,
                reason: e.to_string(),
            });
            err
        })?;
        sink.set_volume(self.volume);
        sink.append(clip);

        self.sink = Some(sink);
        self.active_zone = Some(zone.id);
        debug!(zone_id = zone.id, name = %zone.name, "clip started");
        self.send(PlaybackEvent::Started { zone_id: zone.id });

        Ok(())
    }

    fn exit_zone(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        if let Some(zone_id) = self.active_zone.take() {
            debug!(zone_id, "clip stopped");
            self.send(PlaybackEvent::Stopped { zone_id });
        }
    }

    fn active_zone(&self) -> Option<u32> {
        self.active_zone
    }

    async fn prepare_clips(&mut self, zones: &ZoneSet, mode: PreloadMode) -> Vec<AudioError> {
        self.assets.prepare(zones, mode).await
    }
}
