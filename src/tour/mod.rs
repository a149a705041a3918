// Tour runner - wires config, zones, audio, tracker, and the sinks
// Owns the single consumer of the position channel; everything downstream
// of a fix happens synchronously inside one loop iteration

use crate::audio::{AudioAssets, PlaybackEvent, RodioZonePlayer, ZonePlayback};
use crate::config::{Config, PreloadMode};
use crate::location::{LocationEvent, LocationSource};
use crate::tracker::{Transition, ZoneTracker};
use crate::ui::{LogMap, MapSink, StatusSink, TerminalStatus};
use crate::zone::ZoneSet;
use anyhow::{bail, Result};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Generic over its collaborators so the run loop tests against fakes;
/// `Tour::new` builds the real rodio/terminal wiring.
pub struct Tour<P: ZonePlayback, S: StatusSink, M: MapSink> {
    config: Config,
    tracker: ZoneTracker<P>,
    playback_events: mpsc::UnboundedReceiver<PlaybackEvent>,
    status: S,
    map: M,
}

impl Tour<RodioZonePlayer, TerminalStatus, LogMap> {
    pub fn new(config: Config) -> Result<Self> {
        let assets = AudioAssets::new(Duration::from_secs(config.audio.load_timeout_secs));
        let mut player = RodioZonePlayer::new(assets, config.audio.volume)?;
        let (sender, playback_events) = mpsc::unbounded_channel();
        player.set_event_sender(sender);

        Self::with_parts(config, player, playback_events, TerminalStatus, LogMap)
    }
}

impl<P: ZonePlayback, S: StatusSink, M: MapSink> Tour<P, S, M> {
    pub fn with_parts(
        config: Config,
        playback: P,
        playback_events: mpsc::UnboundedReceiver<PlaybackEvent>,
        status: S,
        map: M,
    ) -> Result<Self> {
        let zones = ZoneSet::new(config.zones.clone())?;
        let tracker = ZoneTracker::new(zones, config.tracking.entry_radius_m, playback);

        Ok(Self {
            config,
            tracker,
            playback_events,
            status,
            map,
        })
    }

    pub fn status(&self) -> &S {
        &self.status
    }

    /// Runs the tour until the position stream closes. Preload happens
    /// before the first fix is consumed; tracking never starts on a
    /// failed preload when the config requires audio.
    pub async fn run<L: LocationSource>(&mut self, source: &mut L) -> Result<()> {
        self.map
            .init_zones(self.tracker.zones(), self.tracker.entry_radius_m());

        let mode = self.config.audio.preload;
        if mode == PreloadMode::Eager {
            self.status.status("Loading audio clips...");
        }
        let zones = self.tracker.zones().clone();
        let failures = self.tracker.playback_mut().prepare_clips(&zones, mode).await;
        for failure in &failures {
            self.status.error(&failure.to_string());
        }
        if !failures.is_empty() && self.config.audio.require_audio {
            bail!("{} audio clip(s) failed to preload", failures.len());
        }
        if mode == PreloadMode::Eager {
            self.status.status("Audio clips ready, waiting for location...");
        }

        let mut positions = match source.subscribe() {
            Ok(rx) => rx,
            Err(e) => {
                self.status.error(&e.to_string());
                return Err(e.into());
            }
        };
        self.status.status("Tracking location...");

        while let Some(event) = positions.recv().await {
            match event {
                LocationEvent::Position(position) => {
                    self.map.user_position(position);
                    self.status.position(position);
                    let transition = self.tracker.handle_position(position);
                    self.report(&transition);
                }
                LocationEvent::Error(e) => {
                    // One bad update: report and keep the previous state
                    self.status.error(&e.to_string());
                }
            }
            self.drain_playback_events();
        }

        // Stream over (or canceled upstream): never leave a clip playing
        source.cancel();
        if let Some(zone_id) = self.tracker.stop() {
            debug!(zone_id, "stopped while inside a zone");
        }
        self.status.zone(None);
        self.status.status("Tracking stopped");

        Ok(())
    }

    fn report(&mut self, transition: &Transition) {
        match transition {
            Transition::None => {}
            Transition::Entered { zone_id } | Transition::Switched { to: zone_id, .. } => {
                let name = self.zone_name(*zone_id);
                self.status.zone(Some(&name));
                self.status.status(&format!("You are inside {name}"));
            }
            Transition::Exited { .. } => {
                self.status.zone(None);
                self.status.status("You are not inside any zone");
            }
            Transition::Declined { zone_id } => {
                let name = self.zone_name(*zone_id);
                self.status.status(&format!("Entry into {name} declined"));
            }
            Transition::EnterFailed { error, .. } => {
                self.status.zone(None);
                self.status.error(&error.to_string());
            }
        }
    }

    /// Playback reports arrive async to the loop. A failure for a zone
    /// that is no longer active is stale; dropping it keeps a dead error
    /// handler from clobbering a valid newer state.
    fn drain_playback_events(&mut self) {
        while let Ok(event) = self.playback_events.try_recv() {
            match event {
                PlaybackEvent::Failed { zone_id, reason } => {
                    if self.tracker.active_zone() == Some(zone_id) {
                        self.status.error(&format!("playback error: {reason}"));
                    } else {
                        debug!(zone_id, "ignoring stale playback failure: {reason}");
                    }
                }
                PlaybackEvent::Started { zone_id } => debug!(zone_id, "playback started"),
                PlaybackEvent::Stopped { zone_id } => debug!(zone_id, "playback stopped"),
            }
        }
    }

    fn zone_name(&self, zone_id: u32) -> String {
        self.tracker
            .zones()
            .get(zone_id)
            .map(|z| z.name.clone())
            .unwrap_or_else(|| format!("zone {zone_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioError;
    use crate::geo::Position;
    use crate::location::{RouteSource, SourceOptions};
    use crate::zone::Zone;
    use std::path::PathBuf;

    /// Enters and exits without a device; preload fails for the
    /// configured zones when running eagerly.
    struct FakePlayback {
        active: Option<u32>,
        preload_failures: Vec<u32>,
    }

    impl FakePlayback {
        fn ok() -> Self {
            Self {
                active: None,
                preload_failures: Vec::new(),
            }
        }

        fn failing_preload(zone_ids: Vec<u32>) -> Self {
            Self {
                active: None,
                preload_failures: zone_ids,
            }
        }
    }

    impl ZonePlayback for FakePlayback {
        fn enter_zone(&mut self, zone: &Zone) -> Result<(), AudioError> {
            self.active = Some(zone.id);
            Ok(())
        }

        fn exit_zone(&mut self) {
            self.active = None;
        }

        fn active_zone(&self) -> Option<u32> {
            self.active
        }

        async fn prepare_clips(&mut self, _zones: &ZoneSet, mode: PreloadMode) -> Vec<AudioError> {
            if mode != PreloadMode::Eager {
                return Vec::new();
            }
            self.preload_failures
                .drain(..)
                .map(|zone_id| AudioError::Load {
                    zone_id,
                    name: format!("Zone {zone_id}"),
                    reason: "missing clip".to_string(),
                })
                .collect()
        }
    }

    #[derive(Default)]
    struct RecordingStatus {
        statuses: Vec<String>,
        errors: Vec<String>,
    }

    impl StatusSink for RecordingStatus {
        fn status(&mut self, message: &str) {
            self.statuses.push(message.to_string());
        }

        fn zone(&mut self, _name: Option<&str>) {}

        fn position(&mut self, _position: Position) {}

        fn error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
    }

    const IN_Z1: (f64, f64) = (38.843101, 29.959400);

    fn test_config(require_audio: bool) -> Config {
        let mut config = Config::default();
        config.zones = vec![
            Zone {
                id: 1,
                name: "Statue".to_string(),
                latitude: IN_Z1.0,
                longitude: IN_Z1.1,
                audio_path: PathBuf::from("audio/zone1.mp3"),
            },
            Zone {
                id: 2,
                name: "Memorial".to_string(),
                latitude: 38.843176,
                longitude: 29.959135,
                audio_path: PathBuf::from("audio/zone2.mp3"),
            },
        ];
        config.audio.require_audio = require_audio;
        config
    }

    fn route(fixes: Vec<Position>) -> RouteSource {
        let options = SourceOptions {
            high_accuracy: true,
            max_age_secs: 0,
            update_timeout_secs: 5,
        };
        RouteSource::new(fixes, Duration::from_millis(1), options)
    }

    #[tokio::test]
    async fn test_preload_failure_gates_start_when_audio_required() {
        let (_sender, receiver) = mpsc::unbounded_channel();
        let mut tour = Tour::with_parts(
            test_config(true),
            FakePlayback::failing_preload(vec![1]),
            receiver,
            RecordingStatus::default(),
            LogMap,
        )
        .unwrap();

        let mut source = route(vec![Position::new(IN_Z1.0, IN_Z1.1)]);
        assert!(tour.run(&mut source).await.is_err());

        // Failure was surfaced, and tracking never started
        assert_eq!(tour.status().errors.len(), 1);
        assert!(tour.status().errors[0].contains("failed to load"));
        assert!(!tour
            .status()
            .statuses
            .iter()
            .any(|s| s == "Tracking location..."));
    }

    #[tokio::test]
    async fn test_preload_failure_continues_when_audio_optional() {
        let (_sender, receiver) = mpsc::unbounded_channel();
        let mut tour = Tour::with_parts(
            test_config(false),
            FakePlayback::failing_preload(vec![1]),
            receiver,
            RecordingStatus::default(),
            LogMap,
        )
        .unwrap();

        // One fix outside every zone, then the stream closes
        let mut source = route(vec![Position::new(38.849290, 29.959364)]);
        tour.run(&mut source).await.unwrap();

        assert_eq!(tour.status().errors.len(), 1);
        assert!(tour
            .status()
            .statuses
            .iter()
            .any(|s| s == "Tracking location..."));
    }

    #[tokio::test]
    async fn test_stale_playback_failure_is_dropped() {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut tour = Tour::with_parts(
            test_config(false),
            FakePlayback::ok(),
            receiver,
            RecordingStatus::default(),
            LogMap,
        )
        .unwrap();

        // Both reports are queued before the fix that makes zone 1 active:
        // the one for zone 2 is stale by then, the one for zone 1 is live
        sender
            .send(PlaybackEvent::Failed {
                zone_id: 2,
                reason: "stale".to_string(),
            })
            .unwrap();
        sender
            .send(PlaybackEvent::Failed {
                zone_id: 1,
                reason: "live".to_string(),
            })
            .unwrap();

        let mut source = route(vec![Position::new(IN_Z1.0, IN_Z1.1)]);
        tour.run(&mut source).await.unwrap();

        assert_eq!(tour.status().errors, vec!["playback error: live"]);
    }
}
