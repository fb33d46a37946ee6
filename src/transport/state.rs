//! Canonical playback state and the frame/time arithmetic around it.
//!
//! `PlayerState` is only ever mutated by the playback controller. Everything
//! else (the terminal UI, the simulate command, observers) receives it by
//! shared reference or as a serialized snapshot.

use serde::{Deserialize, Serialize};

use crate::constants::{FRAME_RATE, PLAYBACK_SPEEDS};

/// Static transport configuration: frame rate and the speed allow-list.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportSettings {
    pub frame_rate: f64,
    pub playback_speeds: Vec<f64>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            frame_rate: FRAME_RATE,
            playback_speeds: PLAYBACK_SPEEDS.to_vec(),
        }
    }
}

impl TransportSettings {
    pub fn frame_duration(&self) -> f64 {
        1.0 / self.frame_rate
    }

    pub fn is_allowed_rate(&self, rate: f64) -> bool {
        self.playback_speeds.iter().any(|&speed| speed == rate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub playback_rate: f64,
    pub volume: f64,
    pub is_muted: bool,
    pub is_looping: bool,
    pub loop_start: Option<f64>,
    pub loop_end: Option<f64>,
    pub current_frame: u64,
    pub total_frames: u64,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            playback_rate: 1.0,
            volume: 1.0,
            is_muted: false,
            is_looping: false,
            loop_start: None,
            loop_end: None,
            current_frame: 0,
            total_frames: 0,
        }
    }
}

impl PlayerState {
    /// Fraction of the clip already played, 0.0 when duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn has_loop_region(&self) -> bool {
        self.loop_start.is_some() && self.loop_end.is_some()
    }

    /// Length of the loop region in seconds, when both ends are set.
    pub fn loop_length(&self) -> Option<f64> {
        match (self.loop_start, self.loop_end) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

/// Frame index containing `time`: `floor(time * frame_rate)`, never negative.
pub fn frame_at(time: f64, frame_rate: f64) -> u64 {
    (time * frame_rate).floor().max(0.0) as u64
}

/// Start time of `frame`.
pub fn time_of_frame(frame: u64, frame_rate: f64) -> f64 {
    frame as f64 / frame_rate
}

/// Format seconds as `MM:SS:FF` using the given frame rate.
pub fn format_timecode(seconds: f64, frame_rate: f64) -> String {
    let total_frames = frame_at(seconds, frame_rate);
    let fps = frame_rate.round().max(1.0) as u64;
    let whole_secs = seconds.max(0.0).floor() as u64;
    let frames = total_frames.saturating_sub((whole_secs as f64 * frame_rate).floor() as u64);
    let mins = whole_secs / 60;
    let secs = whole_secs % 60;
    format!("{mins:02}:{secs:02}:{:02}", frames.min(fps - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = PlayerState::default();
        assert!(!state.is_playing);
        assert_eq!(state.current_time, 0.0);
        assert_eq!(state.duration, 0.0);
        assert_eq!(state.playback_rate, 1.0);
        assert_eq!(state.volume, 1.0);
        assert!(!state.is_muted);
        assert!(!state.is_looping);
        assert!(state.loop_start.is_none());
        assert!(state.loop_end.is_none());
        assert_eq!(state.current_frame, 0);
        assert_eq!(state.total_frames, 0);
    }

    #[test]
    fn test_frame_at() {
        assert_eq!(frame_at(0.0, 24.0), 0);
        assert_eq!(frame_at(1.0, 24.0), 24);
        assert_eq!(frame_at(2.5, 24.0), 60);
        assert_eq!(frame_at(0.04, 24.0), 0);
        assert_eq!(frame_at(-1.0, 24.0), 0);
    }

    #[test]
    fn test_frame_at_just_below_boundary() {
        // 0.04166665 * 24 = 0.9999996, still inside frame 0
        assert_eq!(frame_at(0.04166665, 24.0), 0);
        assert_eq!(frame_at(0.9999999, 24.0), 23);
        assert_eq!(frame_at(10.51, 24.0), 252);
    }

    #[test]
    fn test_frame_at_after_single_steps() {
        let step = 1.0 / 24.0;
        let mut time = 1.0;
        for expected in 25..40 {
            time += step;
            assert_eq!(frame_at(time, 24.0), expected);
        }
    }

    #[test]
    fn test_time_of_frame() {
        assert_eq!(time_of_frame(48, 24.0), 2.0);
        assert_eq!(time_of_frame(0, 24.0), 0.0);
    }

    #[test]
    fn test_format_timecode() {
        assert_eq!(format_timecode(0.0, 24.0), "00:00:00");
        assert_eq!(format_timecode(61.5, 24.0), "01:01:12");
        assert_eq!(format_timecode(10.0, 24.0), "00:10:00");
    }

    #[test]
    fn test_progress() {
        let mut state = PlayerState::default();
        assert_eq!(state.progress(), 0.0);

        state.duration = 10.0;
        state.current_time = 2.5;
        assert_eq!(state.progress(), 0.25);
    }

    #[test]
    fn test_loop_length() {
        let mut state = PlayerState::default();
        assert!(state.loop_length().is_none());
        assert!(!state.has_loop_region());

        state.loop_start = Some(2.0);
        state.loop_end = Some(10.0);
        assert_eq!(state.loop_length(), Some(8.0));
        assert!(state.has_loop_region());
    }

    #[test]
    fn test_allowed_rates() {
        let settings = TransportSettings::default();
        assert!(settings.is_allowed_rate(0.25));
        assert!(settings.is_allowed_rate(2.0));
        assert!(!settings.is_allowed_rate(3.0));
        assert!(!settings.is_allowed_rate(0.75));
    }

    #[test]
    fn test_state_serializes_to_json() {
        let state = PlayerState {
            duration: 60.0,
            total_frames: 1440,
            ..Default::default()
        };
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"total_frames\":1440"));

        let back: PlayerState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
