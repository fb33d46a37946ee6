//! Command dispatcher: maps recognized gestures and keyboard commands onto
//! playback controller operations.
//!
//! The dispatcher keeps no playback state. Tap seeks read the controller's
//! live `current_time` at the moment the gesture resolves; scrub moves are
//! applied against the playhead captured when the scrub began, so a series
//! of moves never compounds.

use log::debug;

use super::controller::PlaybackController;
use super::gesture::{Gesture, TapZone};
use super::keyboard::KeyCommand;
use super::media::MediaElement;
use crate::constants::FRAMES_PER_TAP;

pub struct CommandDispatcher<F: FnMut()> {
    frames_per_tap: u32,
    on_favorite: F,
}

impl<F: FnMut()> CommandDispatcher<F> {
    /// `on_favorite` is invoked on every double tap; whatever it does with
    /// the favorite is the host's business.
    pub fn new(frames_per_tap: u32, on_favorite: F) -> Self {
        Self {
            frames_per_tap,
            on_favorite,
        }
    }

    pub fn with_default_step(on_favorite: F) -> Self {
        Self::new(FRAMES_PER_TAP, on_favorite)
    }

    pub fn dispatch<M: MediaElement>(
        &mut self,
        gesture: Gesture,
        controller: &mut PlaybackController<M>,
    ) {
        debug!("Dispatching {gesture:?}");
        let tap_step = self.frames_per_tap as f64 * controller.frame_duration();

        match gesture {
            Gesture::Tap(TapZone::Left) => {
                controller.seek(controller.state().current_time - tap_step);
            }
            Gesture::Tap(TapZone::Right) => {
                controller.seek(controller.state().current_time + tap_step);
            }
            Gesture::Tap(TapZone::Center) => controller.toggle_play(),
            Gesture::DoubleTap => (self.on_favorite)(),
            Gesture::ScrubStart => controller.pause(),
            Gesture::ScrubMove {
                delta_seconds,
                start_time,
            } => controller.seek(start_time + delta_seconds),
            Gesture::ScrubEnd => {}
        }
    }

    pub fn dispatch_key<M: MediaElement>(
        &mut self,
        command: KeyCommand,
        controller: &mut PlaybackController<M>,
    ) {
        match command {
            KeyCommand::TogglePlay => controller.toggle_play(),
            KeyCommand::StepBackward => controller.step_backward(),
            KeyCommand::StepForward => controller.step_forward(),
        }
    }
}
