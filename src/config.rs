//! Application configuration management.
//!
//! This module handles the persistent configuration for clipstep: the
//! assumed frame rate, the playback speed allow-list, tap step size and the
//! gesture thresholds. Configuration is stored in the user's config
//! directory (typically ~/.config/clipstep/config.toml). Missing keys fall
//! back to the defaults in `constants`, so a partial file is valid.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DOUBLE_TAP_MS, EDGE_SAFE_ZONE_PX, FRAME_RATE, FRAMES_PER_TAP, LONG_PRESS_MS,
    MIN_DRAG_DISTANCE_PX, PLAYBACK_SPEEDS, SCRUB_SENSITIVITY, TAP_FEEDBACK_MS, TAP_MAX_MS,
};
use crate::transport::{GestureSettings, TransportSettings};

/// Keys accepted by `set_value`
pub const SETTABLE_KEYS: &[&str] = &[
    "frame_rate",
    "playback_speeds",
    "frames_per_tap",
    "scrub_sensitivity",
    "edge_safe_zone_px",
    "min_drag_distance_px",
    "long_press_ms",
    "tap_max_ms",
    "double_tap_ms",
    "tap_feedback_ms",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    #[serde(default = "default_playback_speeds")]
    pub playback_speeds: Vec<f64>,
    #[serde(default = "default_frames_per_tap")]
    pub frames_per_tap: u32,
    #[serde(default = "default_scrub_sensitivity")]
    pub scrub_sensitivity: f64,
    #[serde(default = "default_edge_safe_zone_px")]
    pub edge_safe_zone_px: f64,
    #[serde(default = "default_min_drag_distance_px")]
    pub min_drag_distance_px: f64,
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,
    #[serde(default = "default_tap_max_ms")]
    pub tap_max_ms: u64,
    #[serde(default = "default_double_tap_ms")]
    pub double_tap_ms: u64,
    #[serde(default = "default_tap_feedback_ms")]
    pub tap_feedback_ms: u64,
}

fn default_frame_rate() -> f64 {
    FRAME_RATE
}

fn default_playback_speeds() -> Vec<f64> {
    PLAYBACK_SPEEDS.to_vec()
}

fn default_frames_per_tap() -> u32 {
    FRAMES_PER_TAP
}

fn default_scrub_sensitivity() -> f64 {
    SCRUB_SENSITIVITY
}

fn default_edge_safe_zone_px() -> f64 {
    EDGE_SAFE_ZONE_PX
}

fn default_min_drag_distance_px() -> f64 {
    MIN_DRAG_DISTANCE_PX
}

fn default_long_press_ms() -> u64 {
    LONG_PRESS_MS
}

fn default_tap_max_ms() -> u64 {
    TAP_MAX_MS
}

fn default_double_tap_ms() -> u64 {
    DOUBLE_TAP_MS
}

fn default_tap_feedback_ms() -> u64 {
    TAP_FEEDBACK_MS
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            playback_speeds: default_playback_speeds(),
            frames_per_tap: default_frames_per_tap(),
            scrub_sensitivity: default_scrub_sensitivity(),
            edge_safe_zone_px: default_edge_safe_zone_px(),
            min_drag_distance_px: default_min_drag_distance_px(),
            long_press_ms: default_long_press_ms(),
            tap_max_ms: default_tap_max_ms(),
            double_tap_ms: default_double_tap_ms(),
            tap_feedback_ms: default_tap_feedback_ms(),
        }
    }

    pub fn config_dir() -> Result<PathBuf, Box<dyn Error>> {
        // Check for XDG_CONFIG_HOME first (useful for testing)
        let config_dir = if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(xdg_config).join("clipstep")
        } else {
            dirs::config_dir()
                .ok_or("Unable to find config directory")?
                .join("clipstep")
        };
        Ok(config_dir)
    }

    pub fn config_path() -> Result<PathBuf, Box<dyn Error>> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn load() -> Result<Self, Box<dyn Error>> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            // Return default config instead of error
            return Ok(Default::default());
        }

        Self::load_from(&config_path)
    }

    /// Parse and validate the config file at `path`.
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn Error>> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()?;
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(&config_path, toml_string)?;

        Ok(())
    }

    pub fn exists() -> Result<bool, Box<dyn Error>> {
        Ok(Self::config_path()?.exists())
    }

    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if !is_positive(self.frame_rate) {
            return Err(format!("frame_rate must be positive, got {}", self.frame_rate).into());
        }
        if self.playback_speeds.is_empty() {
            return Err("playback_speeds must list at least one speed".into());
        }
        if let Some(bad) = self.playback_speeds.iter().find(|&&s| !is_positive(s)) {
            return Err(format!("playback speed {bad} must be positive").into());
        }
        if !is_positive(self.scrub_sensitivity) {
            return Err("scrub_sensitivity must be positive".into());
        }
        if self.edge_safe_zone_px < 0.0 {
            return Err(format!(
                "edge_safe_zone_px must not be negative, got {}",
                self.edge_safe_zone_px
            )
            .into());
        }
        if self.min_drag_distance_px < 0.0 {
            return Err(format!(
                "min_drag_distance_px must not be negative, got {}",
                self.min_drag_distance_px
            )
            .into());
        }
        Ok(())
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let float = || {
            value
                .parse::<f64>()
                .map_err(|_| format!("Value for {key} must be a number"))
        };
        let millis = || {
            value
                .parse::<u64>()
                .map_err(|_| format!("Value for {key} must be a whole number of milliseconds"))
        };

        match key {
            "frame_rate" => self.frame_rate = float()?,
            "playback_speeds" => {
                self.playback_speeds = value
                    .split(',')
                    .map(|speed| speed.trim().parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| "Value must be a comma-separated list of speeds")?;
            }
            "frames_per_tap" => {
                self.frames_per_tap = value
                    .parse::<u32>()
                    .map_err(|_| "Value must be a whole number of frames")?;
            }
            "scrub_sensitivity" => self.scrub_sensitivity = float()?,
            "edge_safe_zone_px" => self.edge_safe_zone_px = float()?,
            "min_drag_distance_px" => self.min_drag_distance_px = float()?,
            "long_press_ms" => self.long_press_ms = millis()?,
            "tap_max_ms" => self.tap_max_ms = millis()?,
            "double_tap_ms" => self.double_tap_ms = millis()?,
            "tap_feedback_ms" => self.tap_feedback_ms = millis()?,
            _ => return Err(format!("Unknown configuration key: {key}").into()),
        }
        self.validate()
    }

    pub fn gesture_settings(&self) -> GestureSettings {
        GestureSettings {
            edge_safe_zone_px: self.edge_safe_zone_px,
            min_drag_distance_px: self.min_drag_distance_px,
            long_press: Duration::from_millis(self.long_press_ms),
            tap_max: Duration::from_millis(self.tap_max_ms),
            double_tap: Duration::from_millis(self.double_tap_ms),
            tap_feedback: Duration::from_millis(self.tap_feedback_ms),
            scrub_sensitivity: self.scrub_sensitivity,
        }
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            frame_rate: self.frame_rate,
            playback_speeds: self.playback_speeds.clone(),
        }
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
