// One-way presentation sinks plus the entry-confirmation capability
// None of these feed back into tracker state

use crate::geo::Position;
use crate::zone::{Zone, ZoneSet};
use tracing::{debug, warn};

/// Human-readable status surface: current zone, last message, last error.
/// Write-only from the tracker's point of view.
pub trait StatusSink {
    fn status(&mut self, message: &str);
    fn zone(&mut self, name: Option<&str>);
    fn position(&mut self, position: Position);
    fn error(&mut self, message: &str);
}

/// Prints to the terminal, mirroring the status line a tour listener
/// watches while walking.
#[derive(Debug, Default)]
pub struct TerminalStatus;

impl StatusSink for TerminalStatus {
    fn status(&mut self, message: &str) {
        println!("[status] {message}");
    }

    fn zone(&mut self, name: Option<&str>) {
        match name {
            Some(name) => println!("[zone] {name}"),
            None => println!("[zone] outside any zone"),
        }
    }

    fn position(&mut self, position: Position) {
        println!(
            "[position] {:.6}, {:.6}",
            position.latitude, position.longitude
        );
    }

    fn error(&mut self, message: &str) {
        warn!("{message}");
        println!("[error] {message}");
    }
}

/// Rendering sink for a map view: zone markers once, then user-position
/// updates. Purely consumes; never influences tracking.
pub trait MapSink {
    fn init_zones(&mut self, zones: &ZoneSet, radius_m: f64);
    fn user_position(&mut self, position: Position);
}

/// Stand-in map that just logs. A real map frontend plugs in here.
#[derive(Debug, Default)]
pub struct LogMap;

impl MapSink for LogMap {
    fn init_zones(&mut self, zones: &ZoneSet, radius_m: f64) {
        for zone in zones.iter() {
            debug!(
                zone_id = zone.id,
                name = %zone.name,
                lat = zone.latitude,
                lng = zone.longitude,
                radius_m,
                "zone marker"
            );
        }
    }

    fn user_position(&mut self, position: Position) {
        debug!(lat = position.latitude, lng = position.longitude, "user marker");
    }
}

/// Asked before a zone's clip starts. The prompt-before-playing variant
/// of the tour plugs in here; everyone else auto-confirms.
pub trait EntryConfirmation {
    fn confirm_entry(&mut self, zone: &Zone) -> bool;
}

#[derive(Debug, Default)]
pub struct AutoConfirm;

impl EntryConfirmation for AutoConfirm {
    fn confirm_entry(&mut self, _zone: &Zone) -> bool {
        true
    }
}
