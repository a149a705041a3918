// The zone-tracking state machine - the heart of the tour
// Two states (Idle, InZone), one transition per position update, and the
// invariant that a zone is recorded active exactly while its clip plays

use crate::audio::{AudioError, ZonePlayback};
use crate::geo::Position;
use crate::ui::{AutoConfirm, EntryConfirmation};
use crate::zone::ZoneSet;
use tracing::{info, warn};

/// What one position update did to the tracker.
#[derive(Debug)]
pub enum Transition {
    /// Still idle, or still in the same zone. No side effect fired.
    None,
    /// Idle -> InZone. The zone's clip started.
    Entered { zone_id: u32 },
    /// InZone -> a different InZone. Old clip stopped, new one started,
    /// in that order, never overlapping.
    Switched { from: u32, to: u32 },
    /// InZone -> Idle. The clip stopped.
    Exited { zone_id: u32 },
    /// The confirmation capability said no; state unchanged.
    Declined { zone_id: u32 },
    /// Playback refused to start. The tracker fell back to Idle so the
    /// active-zone/playback pairing stays consistent.
    EnterFailed { zone_id: u32, error: AudioError },
}

pub struct ZoneTracker<P: ZonePlayback, C: EntryConfirmation = AutoConfirm> {
    zones: ZoneSet,
    entry_radius_m: f64,
    playback: P,
    confirm: C,
    active: Option<u32>,
}

impl<P: ZonePlayback> ZoneTracker<P, AutoConfirm> {
    pub fn new(zones: ZoneSet, entry_radius_m: f64, playback: P) -> Self {
        Self::with_confirmation(zones, entry_radius_m, playback, AutoConfirm)
    }
}

impl<P: ZonePlayback, C: EntryConfirmation> ZoneTracker<P, C> {
    pub fn with_confirmation(
        zones: ZoneSet,
        entry_radius_m: f64,
        playback: P,
        confirm: C,
    ) -> Self {
        Self {
            zones,
            entry_radius_m,
            playback,
            confirm,
            active: None,
        }
    }

    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    pub fn entry_radius_m(&self) -> f64 {
        self.entry_radius_m
    }

    pub fn active_zone(&self) -> Option<u32> {
        self.active
    }

    pub fn playback(&self) -> &P {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut P {
        &mut self.playback
    }

    /// Drives the state machine with one fix. Called once per update,
    /// serially; returns what happened so the caller can keep the status
    /// surface current.
    pub fn handle_position(&mut self, position: Position) -> Transition {
        let found = self
            .zones
            .locate(position, self.entry_radius_m)
            .cloned();

        match (self.active, found) {
            // Idle -> Idle
            (None, None) => Transition::None,

            // InZone(z) -> InZone(z): no state change. enter_zone is
            // idempotent while the clip is audible; if the narration has
            // run out it restarts, same as re-entering the zone afresh.
            (Some(active), Some(zone)) if zone.id == active => {
                match self.playback.enter_zone(&zone) {
                    Ok(()) => Transition::None,
                    Err(error) => {
                        self.active = None;
                        warn!(zone_id = zone.id, "restart failed: {error}");
                        Transition::EnterFailed {
                            zone_id: zone.id,
                            error,
                        }
                    }
                }
            }

            // Idle -> InZone(z)
            (None, Some(zone)) => {
                if !self.confirm.confirm_entry(&zone) {
                    info!(zone_id = zone.id, name = %zone.name, "entry declined");
                    return Transition::Declined { zone_id: zone.id };
                }
                match self.playback.enter_zone(&zone) {
                    Ok(()) => {
                        self.active = Some(zone.id);
                        info!(zone_id = zone.id, name = %zone.name, "entered zone");
                        Transition::Entered { zone_id: zone.id }
                    }
                    Err(error) => {
                        self.active = None;
                        warn!(zone_id = zone.id, "enter failed: {error}");
                        Transition::EnterFailed {
                            zone_id: zone.id,
                            error,
                        }
                    }
                }
            }

            // InZone(z) -> InZone(z'): switch clips, stop before start
            (Some(from), Some(zone)) => {
                if !self.confirm.confirm_entry(&zone) {
                    // Declined switch keeps the current zone playing
                    return Transition::Declined { zone_id: zone.id };
                }
                match self.playback.enter_zone(&zone) {
                    Ok(()) => {
                        self.active = Some(zone.id);
                        info!(from, to = zone.id, "switched zones");
                        Transition::Switched { from, to: zone.id }
                    }
                    Err(error) => {
                        // enter_zone already stopped the old clip
                        self.active = None;
                        warn!(zone_id = zone.id, "switch failed: {error}");
                        Transition::EnterFailed {
                            zone_id: zone.id,
                            error,
                        }
                    }
                }
            }

            // InZone(z) -> Idle
            (Some(zone_id), None) => {
                self.playback.exit_zone();
                self.active = None;
                info!(zone_id, "exited zone");
                Transition::Exited { zone_id }
            }
        }
    }

    /// Cancellation path: force an exit so no playback outlives tracking.
    /// Returns the zone that was active, if any.
    pub fn stop(&mut self) -> Option<u32> {
        self.playback.exit_zone();
        self.active.take()
    }
}
