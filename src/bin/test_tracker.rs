use geotour::location::{LocationEvent, LocationSource, RouteSource, SourceOptions};
use geotour::{Position, PreloadMode, Transition, Zone, ZoneSet, ZoneTracker, ZonePlayback};
use std::path::PathBuf;
use std::time::Duration;

/// Playback stand-in that prints instead of making noise, so the state
/// machine can be eyeballed without audio files or an output device.
#[derive(Default)]
struct PrintPlayback {
    active: Option<u32>,
}

impl ZonePlayback for PrintPlayback {
    fn enter_zone(&mut self, zone: &Zone) -> Result<(), geotour::AudioError> {
        if self.active == Some(zone.id) {
            return Ok(());
        }
        if let Some(old) = self.active {
            println!("   🔇 stop clip for zone {old}");
        }
        println!("   🔊 start clip for zone {} ({})", zone.id, zone.name);
        self.active = Some(zone.id);
        Ok(())
    }

    fn exit_zone(&mut self) {
        if let Some(old) = self.active.take() {
            println!("   🔇 stop clip for zone {old}");
        }
    }

    fn active_zone(&self) -> Option<u32> {
        self.active
    }

    async fn prepare_clips(
        &mut self,
        _zones: &ZoneSet,
        _mode: PreloadMode,
    ) -> Vec<geotour::AudioError> {
        Vec::new()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("🗺️  GeoTour Tracker Test");
    println!("========================");

    let zone = |id: u32, name: &str, lat: f64, lng: f64| Zone {
        id,
        name: name.to_string(),
        latitude: lat,
        longitude: lng,
        audio_path: PathBuf::from(format!("audio/zone{id}.mp3")),
    };
    let zones = ZoneSet::new(vec![
        zone(1, "Statue", 38.843101, 29.959400),
        zone(2, "Memorial", 38.843176, 29.959135),
    ])?;

    // Synthetic walk: outside -> zone 1 -> zone 1 -> zone 2 -> outside
    let route = vec![
        Position::new(38.849290, 29.959364),
        Position::new(38.843101, 29.959400),
        Position::new(38.843103, 29.959401),
        Position::new(38.843176, 29.959135),
        Position::new(38.849290, 29.959364),
    ];

    let mut tracker = ZoneTracker::new(zones, 5.0, PrintPlayback::default());
    let options = SourceOptions {
        high_accuracy: true,
        max_age_secs: 0,
        update_timeout_secs: 5,
    };
    let mut source = RouteSource::new(route, Duration::from_millis(200), options);

    let mut rx = source.subscribe()?;
    while let Some(event) = rx.recv().await {
        match event {
            LocationEvent::Position(p) => {
                println!("📍 fix {:.6}, {:.6}", p.latitude, p.longitude);
                match tracker.handle_position(p) {
                    Transition::None => {}
                    t => println!("   ➡️  {t:?}"),
                }
            }
            LocationEvent::Error(e) => println!("   ⚠️  {e}"),
        }
    }

    source.cancel();
    if let Some(zone_id) = tracker.stop() {
        println!("🛑 stopped while inside zone {zone_id}");
    }

    println!("✅ Tracker test completed!");
    Ok(())
}
