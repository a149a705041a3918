// GeoTour Library - geofenced audio walking tour engine
// Modular design makes it easy to swap out components

pub mod audio; // clip loading and single-slot playback
pub mod config; // settings, zone list, preferences
pub mod geo; // position type and haversine distance
pub mod location; // position sources (route replay, real GPS adapters)
pub mod tour; // the run loop wiring it all together
pub mod tracker; // the zone enter/exit state machine
pub mod ui; // status/map sinks and entry confirmation
pub mod zone; // zone model and membership resolution

// Export the stuff other modules actually use
pub use audio::{AudioAssets, AudioError, PlaybackEvent, RodioZonePlayer, ZonePlayback};
pub use config::{Config, PreloadMode};
pub use geo::{distance_meters, Position};
pub use location::{LocationError, LocationEvent, LocationSource, RouteSource, SourceOptions};
pub use tour::Tour;
pub use tracker::{Transition, ZoneTracker};
pub use zone::{Zone, ZoneSet};
