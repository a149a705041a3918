// Zone model and membership resolution
// The zone set is fixed at startup: load it, validate it, never mutate it

use crate::geo::{distance_meters, Position};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One named circular region of the tour, tied to a single audio clip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: u32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub audio_path: PathBuf,
}

impl Zone {
    pub fn center(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }
}

/// The validated, ordered zone list. Declaration order matters: membership
/// resolution is first-match-in-order, so overlapping zones resolve to the
/// one listed first, not the nearest one.
#[derive(Debug, Clone)]
pub struct ZoneSet {
    zones: Vec<Zone>,
}

impl ZoneSet {
    pub fn new(zones: Vec<Zone>) -> Result<Self> {
        if zones.is_empty() {
            bail!("zone list is empty - nothing to tour");
        }
        for (i, zone) in zones.iter().enumerate() {
            if zone.name.trim().is_empty() {
                bail!("zone id {} has an empty name", zone.id);
            }
            if zones[..i].iter().any(|z| z.id == zone.id) {
                bail!("duplicate zone id {}", zone.id);
            }
        }
        Ok(Self { zones })
    }

    /// First zone (in declaration order) whose center is within `radius_m`
    /// of the position. `None` when the position is outside every zone.
    pub fn locate(&self, position: Position, radius_m: f64) -> Option<&Zone> {
        self.zones
            .iter()
            .find(|zone| distance_meters(position, zone.center()) <= radius_m)
    }

    pub fn get(&self, id: u32) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
