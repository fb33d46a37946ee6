//! Touch gesture recognition for the video surface.
//!
//! Raw pointer events (start, move, end, cancel) are classified into zone
//! taps, double taps and scrubs using timing and distance thresholds. The
//! recognizer never touches playback state; it reads a `PlaybackSnapshot`
//! handed in by the caller and returns `Gesture`s for the dispatcher.
//!
//! A sequence moves Idle → Pending → (Scrubbing | resolved at release) → Idle.
//! Pending arms a long-press timer; holding still past it promotes the touch
//! to a scrub. Releasing early resolves it as a tap candidate, and two
//! candidates close together merge into a double tap.
//!
//! Timers are `OneShot` fields owned by the recognizer and fired from
//! `tick`. The host must call `tick` with the current instant before handing
//! over each event (`feed` does both).

use std::time::{Duration, Instant};

use log::debug;
use serde::{Deserialize, Serialize};

use super::timer::{OneShot, earliest};
use crate::constants::{
    CENTER_ZONE_END, DOUBLE_TAP_MS, EDGE_SAFE_ZONE_PX, LEFT_ZONE_END, LONG_PRESS_MS,
    MIN_DRAG_DISTANCE_PX, SCRUB_SENSITIVITY, TAP_FEEDBACK_MS, TAP_MAX_MS,
};

#[derive(Debug, Clone, PartialEq)]
pub struct GestureSettings {
    pub edge_safe_zone_px: f64,
    pub min_drag_distance_px: f64,
    pub long_press: Duration,
    pub tap_max: Duration,
    pub double_tap: Duration,
    pub tap_feedback: Duration,
    /// Seconds of scrub per 100px of drag
    pub scrub_sensitivity: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            edge_safe_zone_px: EDGE_SAFE_ZONE_PX,
            min_drag_distance_px: MIN_DRAG_DISTANCE_PX,
            long_press: Duration::from_millis(LONG_PRESS_MS),
            tap_max: Duration::from_millis(TAP_MAX_MS),
            double_tap: Duration::from_millis(DOUBLE_TAP_MS),
            tap_feedback: Duration::from_millis(TAP_FEEDBACK_MS),
            scrub_sensitivity: SCRUB_SENSITIVITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    /// Horizontal position in px, relative to the surface's left edge
    pub x: f64,
    /// Vertical position in px, relative to the surface's top edge
    pub y: f64,
    /// Surface width in px when the event was delivered
    pub surface_width: f64,
    pub at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapZone {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Tap(TapZone),
    DoubleTap,
    ScrubStart,
    /// `delta_seconds` is relative to `start_time`, the playhead captured
    /// when the scrub began.
    ScrubMove { delta_seconds: f64, start_time: f64 },
    ScrubEnd,
}

impl Gesture {
    /// Short human-readable name used in logs and simulate output.
    pub fn label(&self) -> String {
        match self {
            Gesture::Tap(TapZone::Left) => "left_tap".to_string(),
            Gesture::Tap(TapZone::Center) => "center_tap".to_string(),
            Gesture::Tap(TapZone::Right) => "right_tap".to_string(),
            Gesture::DoubleTap => "double_tap".to_string(),
            Gesture::ScrubStart => "scrub_start".to_string(),
            Gesture::ScrubMove { delta_seconds, .. } => format!("scrub_move({delta_seconds:+.3}s)"),
            Gesture::ScrubEnd => "scrub_end".to_string(),
        }
    }
}

/// Read-only view of playback at the moment a gesture is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackSnapshot {
    pub current_time: f64,
    pub duration: f64,
}

/// Per-sequence scratch state, reset whenever a sequence starts or ends.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TouchState {
    pub is_scrubbing: bool,
    pub scrub_start_x: f64,
    pub scrub_start_time: f64,
    pub scrub_delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Pending {
        start_x: f64,
        start_y: f64,
        started_at: Instant,
        surface_width: f64,
        dragged: bool,
    },
    Scrubbing,
}

pub struct GestureRecognizer {
    settings: GestureSettings,
    phase: Phase,
    touch: TouchState,
    long_press: OneShot,
    feedback: OneShot,
    last_tap_at: Option<Instant>,
    last_tap_zone: Option<TapZone>,
    show_tap_feedback: bool,
    disposed: bool,
}

impl GestureRecognizer {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            settings,
            phase: Phase::Idle,
            touch: TouchState::default(),
            long_press: OneShot::new(),
            feedback: OneShot::new(),
            last_tap_at: None,
            last_tap_zone: None,
            show_tap_feedback: false,
            disposed: false,
        }
    }

    pub fn touch_state(&self) -> &TouchState {
        &self.touch
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn is_scrubbing(&self) -> bool {
        self.phase == Phase::Scrubbing
    }

    pub fn last_tap_zone(&self) -> Option<TapZone> {
        self.last_tap_zone
    }

    pub fn show_tap_feedback(&self) -> bool {
        self.show_tap_feedback
    }

    /// Earliest armed deadline, for sizing the host's poll timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest(self.long_press.deadline(), self.feedback.deadline())
    }

    /// Tick timers up to `event.at`, then process the event. Returns every
    /// gesture produced along the way, in order.
    pub fn feed(&mut self, event: TouchEvent, snapshot: PlaybackSnapshot) -> Vec<Gesture> {
        let mut gestures = Vec::new();
        gestures.extend(self.tick(event.at, snapshot));
        gestures.extend(self.handle(event));
        gestures
    }

    /// Fire any timers that have come due by `now`.
    pub fn tick(&mut self, now: Instant, snapshot: PlaybackSnapshot) -> Option<Gesture> {
        if self.disposed {
            return None;
        }

        if self.feedback.fire_if_due(now) {
            self.show_tap_feedback = false;
        }

        if self.long_press.fire_if_due(now) && matches!(self.phase, Phase::Pending { .. }) {
            self.phase = Phase::Scrubbing;
            self.touch.is_scrubbing = true;
            self.touch.scrub_start_time = snapshot.current_time;
            self.touch.scrub_delta = 0.0;
            debug!(
                "Long press: scrubbing from {:.3}s at x={:.1}",
                snapshot.current_time, self.touch.scrub_start_x
            );
            return Some(Gesture::ScrubStart);
        }

        None
    }

    pub fn handle(&mut self, event: TouchEvent) -> Option<Gesture> {
        if self.disposed {
            return None;
        }

        match event.phase {
            TouchPhase::Start => {
                self.touch_start(event);
                None
            }
            TouchPhase::Move => self.touch_move(event),
            TouchPhase::End => self.touch_end(event),
            TouchPhase::Cancel => self.touch_cancel(),
        }
    }

    fn touch_start(&mut self, event: TouchEvent) {
        if self.phase != Phase::Idle {
            debug!("Ignoring touch start while a sequence is active");
            return;
        }

        if !self.in_safe_zone(event.x, event.surface_width) {
            debug!(
                "Touch at x={:.1} inside edge zone of {:.1}px surface, suppressed",
                event.x, event.surface_width
            );
            return;
        }

        self.touch = TouchState {
            scrub_start_x: event.x,
            ..TouchState::default()
        };
        self.phase = Phase::Pending {
            start_x: event.x,
            start_y: event.y,
            started_at: event.at,
            surface_width: event.surface_width,
            dragged: false,
        };
        self.long_press.arm(event.at, self.settings.long_press);
    }

    fn touch_move(&mut self, event: TouchEvent) -> Option<Gesture> {
        match &mut self.phase {
            Phase::Idle => None,
            Phase::Pending {
                start_x,
                start_y,
                dragged,
                ..
            } => {
                let distance = (event.x - *start_x).hypot(event.y - *start_y);
                if !*dragged && distance > self.settings.min_drag_distance_px {
                    *dragged = true;
                    self.long_press.cancel();
                    debug!("Drag before long press, scrub cancelled");
                }
                None
            }
            Phase::Scrubbing => {
                let delta_px = event.x - self.touch.scrub_start_x;
                let delta_seconds = (delta_px / 100.0) * self.settings.scrub_sensitivity;
                self.touch.scrub_delta = delta_seconds;
                Some(Gesture::ScrubMove {
                    delta_seconds,
                    start_time: self.touch.scrub_start_time,
                })
            }
        }
    }

    fn touch_end(&mut self, event: TouchEvent) -> Option<Gesture> {
        self.long_press.cancel();

        let gesture = match self.phase {
            Phase::Idle => None,
            Phase::Scrubbing => Some(Gesture::ScrubEnd),
            Phase::Pending {
                started_at,
                surface_width,
                dragged,
                ..
            } => self.resolve_tap(event, started_at, surface_width, dragged),
        };

        self.reset_sequence();
        gesture
    }

    fn touch_cancel(&mut self) -> Option<Gesture> {
        self.long_press.cancel();
        let gesture = (self.phase == Phase::Scrubbing).then_some(Gesture::ScrubEnd);
        self.reset_sequence();
        gesture
    }

    fn resolve_tap(
        &mut self,
        event: TouchEvent,
        started_at: Instant,
        surface_width: f64,
        dragged: bool,
    ) -> Option<Gesture> {
        if dragged {
            return None;
        }

        let held = event.at.saturating_duration_since(started_at);
        if held >= self.settings.tap_max || !self.in_safe_zone(event.x, surface_width) {
            return None;
        }

        let is_double = self
            .last_tap_at
            .is_some_and(|last| event.at.saturating_duration_since(last) < self.settings.double_tap);

        if is_double {
            // Forget the first tap so a third one starts a fresh pair
            self.last_tap_at = None;
            debug!("Double tap");
            return Some(Gesture::DoubleTap);
        }

        let zone = zone_at(event.x, surface_width);
        self.last_tap_at = Some(event.at);
        self.last_tap_zone = Some(zone);
        self.show_tap_feedback = true;
        self.feedback.arm(event.at, self.settings.tap_feedback);
        debug!("Tap in {zone:?} zone at x={:.1}", event.x);
        Some(Gesture::Tap(zone))
    }

    fn reset_sequence(&mut self) {
        self.phase = Phase::Idle;
        self.touch = TouchState::default();
    }

    fn in_safe_zone(&self, x: f64, surface_width: f64) -> bool {
        let edge = self.settings.edge_safe_zone_px;
        x >= edge && x <= surface_width - edge
    }

    /// Cancel every timer and drop any sequence in flight. The recognizer
    /// ignores all input afterwards.
    pub fn dispose(&mut self) {
        self.long_press.cancel();
        self.feedback.cancel();
        self.reset_sequence();
        self.last_tap_at = None;
        self.show_tap_feedback = false;
        self.disposed = true;
        debug!("Gesture recognizer disposed");
    }
}

/// Zone containing `x` on a surface `surface_width` px wide.
pub fn zone_at(x: f64, surface_width: f64) -> TapZone {
    let ratio = if surface_width > 0.0 {
        x / surface_width
    } else {
        0.5
    };

    if ratio < LEFT_ZONE_END {
        TapZone::Left
    } else if ratio < CENTER_ZONE_END {
        TapZone::Center
    } else {
        TapZone::Right
    }
}
