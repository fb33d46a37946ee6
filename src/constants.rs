//! Project-wide constants used across multiple modules.
//!
//! This module centralizes the transport defaults so the config layer, the
//! gesture engine and the terminal player all agree on the same numbers.
//! The transport and gesture values can be overridden through `config.toml`.

/// Assumed frames per second for time/frame conversion
pub const FRAME_RATE: f64 = 24.0;

/// Allowed playback rates, in speed-menu order
pub const PLAYBACK_SPEEDS: &[f64] = &[0.25, 0.5, 1.0, 1.5, 2.0];

/// Frames skipped by a left/right zone tap
pub const FRAMES_PER_TAP: u32 = 5;

/// Seconds of scrub travel per 100px of horizontal drag
pub const SCRUB_SENSITIVITY: f64 = 5.0;

/// Touches starting this close to either horizontal edge are ignored
pub const EDGE_SAFE_ZONE_PX: f64 = 20.0;

/// Movement that cancels a pending long-press
pub const MIN_DRAG_DISTANCE_PX: f64 = 10.0;

/// Stationary hold before a touch becomes a scrub
pub const LONG_PRESS_MS: u64 = 300;

/// Longest press still treated as a tap
pub const TAP_MAX_MS: u64 = 250;

/// Maximum gap between two taps merged into a double tap
pub const DOUBLE_TAP_MS: u64 = 300;

/// How long the tap zone highlight stays visible
pub const TAP_FEEDBACK_MS: u64 = 400;

/// Zone boundaries as fractions of surface width
pub const LEFT_ZONE_END: f64 = 0.33;
pub const CENTER_ZONE_END: f64 = 0.67;

/// Terminal cell width in pixels when mapping mouse columns to touch x
pub const CELL_WIDTH_PX: f64 = 8.0;

/// Terminal cell height in pixels when mapping mouse rows to touch y
pub const CELL_HEIGHT_PX: f64 = 16.0;
