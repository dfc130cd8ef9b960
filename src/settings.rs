//! Propagation settings
//!
//! Persisted as JSON next to the level files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::MIN_INTENSITY;
use crate::error::LevelError;

/// Tunable beam propagation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Colour multiplier applied to each splitter branch (1.0 = lossless)
    pub splitter_attenuation: f32,
    /// Beams whose strongest channel drops below this are blocked
    pub min_intensity: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            splitter_attenuation: 1.0,
            min_intensity: MIN_INTENSITY,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Malformed settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("No settings at {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LevelError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
