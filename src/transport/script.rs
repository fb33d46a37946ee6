//! Replay of recorded touch scripts through the full transport pipeline.
//!
//! A script describes a surface, a clip and a timeline of touch events.
//! `run_script` pushes them through gesture recognition, dispatch and the
//! playback controller against a `ClockMedia`, firing timers exactly at
//! their deadlines the way a live event loop would, and reports every
//! gesture together with the final player state.

use std::cell::Cell;
use std::error::Error;
use std::fs;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::info;
use serde::{Deserialize, Serialize};

use super::clock_media::ClockMedia;
use super::controller::PlaybackController;
use super::dispatcher::CommandDispatcher;
use super::gesture::{
    Gesture, GestureRecognizer, GestureSettings, PlaybackSnapshot, TouchEvent, TouchPhase,
};
use super::state::{PlayerState, TransportSettings};

#[derive(Debug, Clone, Deserialize)]
pub struct TouchScript {
    pub surface_width: f64,
    pub duration: f64,
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub autoplay: bool,
    pub events: Vec<ScriptedTouch>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScriptedTouch {
    pub kind: TouchPhase,
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub at_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordedGesture {
    pub at_ms: u64,
    pub gesture: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScriptReport {
    pub gestures: Vec<RecordedGesture>,
    pub favorites: u32,
    pub final_state: PlayerState,
}

impl TouchScript {
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn Error>> {
        let script: TouchScript = serde_json::from_str(contents)?;
        if script.surface_width <= 0.0 {
            return Err("surface_width must be positive".into());
        }
        if script.duration < 0.0 {
            return Err("duration must not be negative".into());
        }
        Ok(script)
    }
}

struct Replay {
    controller: PlaybackController<ClockMedia>,
    recognizer: GestureRecognizer,
    t0: Instant,
    clock: Instant,
    report: Vec<RecordedGesture>,
}

impl Replay {
    fn snapshot(&self) -> PlaybackSnapshot {
        let state = self.controller.state();
        PlaybackSnapshot {
            current_time: state.current_time,
            duration: state.duration,
        }
    }

    fn advance_to(&mut self, at: Instant) {
        if at > self.clock {
            let elapsed = at - self.clock;
            self.controller.media_mut().advance(elapsed);
            self.clock = at;
        }
        while let Some(event) = self.controller.media_mut().poll_event() {
            self.controller.handle_media_event(event);
        }
    }

    fn record<F: FnMut()>(
        &mut self,
        at: Instant,
        gesture: Gesture,
        dispatcher: &mut CommandDispatcher<F>,
    ) {
        let at_ms = (at - self.t0).as_millis() as u64;
        self.report.push(RecordedGesture {
            at_ms,
            gesture: gesture.label(),
        });
        dispatcher.dispatch(gesture, &mut self.controller);
    }

    /// Fire every recognizer deadline that falls on or before `until`.
    fn run_timers<F: FnMut()>(&mut self, until: Instant, dispatcher: &mut CommandDispatcher<F>) {
        while let Some(deadline) = self.recognizer.next_deadline() {
            if deadline > until {
                break;
            }
            self.advance_to(deadline);
            let snapshot = self.snapshot();
            if let Some(gesture) = self.recognizer.tick(deadline, snapshot) {
                self.record(deadline, gesture, dispatcher);
            }
        }
    }
}

pub fn run_script(
    script: &TouchScript,
    gesture_settings: GestureSettings,
    transport_settings: TransportSettings,
    frames_per_tap: u32,
) -> ScriptReport {
    let mut media = ClockMedia::new(script.duration);
    media.load();

    let t0 = Instant::now();
    let mut replay = Replay {
        controller: PlaybackController::new(media, transport_settings),
        recognizer: GestureRecognizer::new(gesture_settings),
        t0,
        clock: t0,
        report: Vec::new(),
    };
    replay.advance_to(t0);
    replay.controller.seek(script.start_time);
    if script.autoplay {
        replay.controller.play();
    }

    let favorites = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&favorites);
    let mut dispatcher =
        CommandDispatcher::new(frames_per_tap, move || counter.set(counter.get() + 1));

    let mut events = script.events.clone();
    events.sort_by_key(|event| event.at_ms);

    for scripted in &events {
        let at = t0 + Duration::from_millis(scripted.at_ms);
        replay.run_timers(at, &mut dispatcher);
        replay.advance_to(at);

        let touch = TouchEvent {
            phase: scripted.kind,
            x: scripted.x,
            y: scripted.y,
            surface_width: script.surface_width,
            at,
        };
        if let Some(gesture) = replay.recognizer.handle(touch) {
            replay.record(at, gesture, &mut dispatcher);
        }
    }

    // Let trailing timers (tap feedback, an unreleased long press) run out
    while let Some(next) = replay.recognizer.next_deadline() {
        replay.run_timers(next, &mut dispatcher);
    }

    replay.recognizer.dispose();
    replay.controller.detach();
    info!(
        "Replayed {} touch events into {} gestures",
        events.len(),
        replay.report.len()
    );

    ScriptReport {
        gestures: replay.report,
        favorites: favorites.get(),
        final_state: replay.controller.state().clone(),
    }
}
