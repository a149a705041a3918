// Configuration management for GeoTour
// Handles loading/saving settings, with sensible defaults when config is missing
// The default zone set is the five-stop memorial walk the app shipped with

use crate::zone::Zone;
use anyhow::Result;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub tracking: TrackingConfig,
    pub audio: AudioConfig,
    pub location: LocationConfig,
    pub zones: Vec<Zone>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Maximum distance from a zone center still considered "inside", meters.
    /// Field variants of the tour ran 4 m and 5 m; this is the knob.
    pub entry_radius_m: f64,
}

/// Whether zone clips are decoded up front or on first entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreloadMode {
    Eager,
    Lazy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    pub preload: PreloadMode,
    pub volume: f32, // 0.0 to 1.0
    /// Per-asset decode deadline during eager preload, seconds.
    pub load_timeout_secs: u64,
    /// When true, a failed eager preload blocks tracking from starting.
    /// Default false: the tour carries on without the broken clip.
    pub require_audio: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub high_accuracy: bool,
    /// Maximum acceptable age of a cached fix, seconds. 0 = always fresh.
    pub max_age_secs: u64,
    pub update_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracking: TrackingConfig { entry_radius_m: 5.0 },
            audio: AudioConfig {
                preload: PreloadMode::Eager,
                volume: 0.7,
                load_timeout_secs: 10,
                require_audio: false,
            },
            location: LocationConfig {
                high_accuracy: true,
                max_age_secs: 0,
                update_timeout_secs: 5,
            },
            zones: default_zones(),
        }
    }
}

fn default_zones() -> Vec<Zone> {
    let zone = |id: u32, name: &str, latitude: f64, longitude: f64, clip: &str| Zone {
        id,
        name: name.to_string(),
        latitude,
        longitude,
        audio_path: PathBuf::from(clip),
    };
    vec![
        zone(1, "3 Pasa Heykeli", 38.849290, 29.959364, "audio/bolge11.mp3"),
        zone(2, "Direnisci Aile", 38.843101, 29.959400, "audio/bolge22.mp3"),
        zone(3, "Sehitlik", 38.843176, 29.959135, "audio/bolge33.mp3"),
        zone(4, "Baba Ogul Aniti", 38.843068, 29.958726, "audio/bolge33.mp3"),
        zone(5, "Mechul Asker Aniti", 38.843093, 29.958275, "audio/bolge33.mp3"),
    ]
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(config_path, content)?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("geotour");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tracking.entry_radius_m, 5.0);
        assert_eq!(config.audio.preload, PreloadMode::Eager);
        assert!(!config.audio.require_audio);
        assert_eq!(config.location.max_age_secs, 0);
        assert_eq!(config.zones.len(), 5);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        // First load writes the defaults out
        let written = Config::load_from(&path).unwrap();
        assert!(path.exists());

        // Second load reads the same thing back
        let reread = Config::load_from(&path).unwrap();
        assert_eq!(reread.tracking.entry_radius_m, written.tracking.entry_radius_m);
        assert_eq!(reread.audio.preload, written.audio.preload);
        assert_eq!(reread.zones.len(), written.zones.len());
        assert_eq!(reread.zones[0].name, written.zones[0].name);
    }

    #[test]
    fn test_preload_mode_parses_lowercase() {
        let toml = r#"
            [tracking]
            entry_radius_m = 4.0

            [audio]
            preload = "lazy"
            volume = 0.5
            load_timeout_secs = 10
            require_audio = true

            [location]
            high_accuracy = true
            max_age_secs = 0
            update_timeout_secs = 5

            [[zones]]
            id = 1
            name = "Statue"
            latitude = 38.8492
            longitude = 29.9593
            audio_path = "audio/statue.mp3"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.audio.preload, PreloadMode::Lazy);
        assert_eq!(config.tracking.entry_radius_m, 4.0);
        assert!(config.audio.require_audio);
    }
}
