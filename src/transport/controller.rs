//! Playback controller: the single owner of `PlayerState`.
//!
//! Every transport command goes through here. The controller applies it to
//! the media primitive, mirrors the result into `PlayerState`, and then
//! notifies subscribers. Media events flow back in through
//! `handle_media_event`, which is safe to call any number of times for the
//! same underlying change.

use log::{debug, info, trace, warn};

use super::media::{MediaElement, MediaEvent};
use super::state::{PlayerState, TransportSettings, frame_at, time_of_frame};

type Observer = Box<dyn FnMut(&PlayerState)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct PlaybackController<M: MediaElement> {
    media: M,
    state: PlayerState,
    settings: TransportSettings,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
    detached: bool,
}

impl<M: MediaElement> PlaybackController<M> {
    pub fn new(media: M, settings: TransportSettings) -> Self {
        let mut controller = Self {
            media,
            state: PlayerState::default(),
            settings,
            observers: Vec::new(),
            next_subscription: 0,
            detached: false,
        };

        // Metadata may already be available if the primitive was loaded first
        if controller.media.duration().is_some() {
            controller.apply_metadata();
        }
        controller
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    /// Mutable access for the host loop (advancing clocks, draining events).
    /// Transport changes must still go through the controller's operations.
    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn frame_duration(&self) -> f64 {
        self.settings.frame_duration()
    }

    pub fn play(&mut self) {
        if self.detached {
            return;
        }
        self.media.play();
        self.state.is_playing = true;
        self.notify();
    }

    pub fn pause(&mut self) {
        if self.detached {
            return;
        }
        self.media.pause();
        self.state.is_playing = false;
        self.notify();
    }

    pub fn toggle_play(&mut self) {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Seek to `time`, clamped into `[0, duration]`.
    pub fn seek(&mut self, time: f64) {
        if self.detached || time.is_nan() {
            return;
        }
        let clamped = time.clamp(0.0, self.state.duration);
        self.media.set_current_time(clamped);
        self.apply_time(clamped);
        self.notify();
    }

    pub fn seek_to_frame(&mut self, frame: u64) {
        self.seek(time_of_frame(frame, self.settings.frame_rate));
    }

    pub fn step_forward(&mut self) {
        self.pause();
        self.seek(self.state.current_time + self.frame_duration());
    }

    pub fn step_backward(&mut self) {
        self.pause();
        self.seek(self.state.current_time - self.frame_duration());
    }

    /// Apply `rate` if it is on the allow-list; anything else is ignored.
    pub fn set_playback_rate(&mut self, rate: f64) {
        if self.detached {
            return;
        }
        if !self.settings.is_allowed_rate(rate) {
            warn!("Ignoring playback rate {rate}: not in {:?}", self.settings.playback_speeds);
            return;
        }
        self.media.set_playback_rate(rate);
        self.state.playback_rate = rate;
        info!("Playback rate set to {rate}x");
        self.notify();
    }

    /// Advance to the next allowed speed, wrapping to the first.
    pub fn cycle_playback_rate(&mut self) {
        let speeds = &self.settings.playback_speeds;
        if speeds.is_empty() {
            return;
        }
        let next = match speeds.iter().position(|&s| s == self.state.playback_rate) {
            Some(idx) => speeds[(idx + 1) % speeds.len()],
            None => speeds[0],
        };
        self.set_playback_rate(next);
    }

    /// Set volume clamped into `[0, 1]`. A volume of exactly zero mutes.
    pub fn set_volume(&mut self, volume: f64) {
        if self.detached || volume.is_nan() {
            return;
        }
        let clamped = volume.clamp(0.0, 1.0);
        let muted = clamped == 0.0;
        self.media.set_volume(clamped);
        self.media.set_muted(muted);
        self.state.volume = clamped;
        self.state.is_muted = muted;
        self.notify();
    }

    pub fn adjust_volume(&mut self, delta: f64) {
        // Round to hundredths so repeated steps can land on exactly 0.0
        let target = ((self.state.volume + delta) * 100.0).round() / 100.0;
        self.set_volume(target);
    }

    pub fn toggle_mute(&mut self) {
        if self.detached {
            return;
        }
        let muted = !self.media.muted();
        self.media.set_muted(muted);
        self.state.is_muted = muted;
        self.notify();
    }

    /// Store the loop region. A reversed pair is normalized so that
    /// `loop_start <= loop_end` always holds.
    pub fn set_loop_region(&mut self, start: Option<f64>, end: Option<f64>) {
        if self.detached {
            return;
        }
        let (start, end) = match (start, end) {
            (Some(a), Some(b)) if a > b => {
                warn!("Loop region {a:.3}..{b:.3} is reversed, swapping ends");
                (Some(b), Some(a))
            }
            pair => pair,
        };
        self.state.loop_start = start;
        self.state.loop_end = end;
        debug!("Loop region set to {start:?}..{end:?}");
        self.notify();
    }

    pub fn set_loop_start_here(&mut self) {
        let end = self.state.loop_end;
        self.set_loop_region(Some(self.state.current_time), end);
    }

    pub fn set_loop_end_here(&mut self) {
        let start = self.state.loop_start;
        self.set_loop_region(start, Some(self.state.current_time));
    }

    pub fn clear_loop_region(&mut self) {
        if self.detached {
            return;
        }
        self.state.loop_start = None;
        self.state.loop_end = None;
        self.state.is_looping = false;
        info!("Loop region cleared");
        self.notify();
    }

    pub fn toggle_looping(&mut self) {
        if self.detached {
            return;
        }
        self.state.is_looping = !self.state.is_looping;
        info!(
            "Loop {}",
            if self.state.is_looping {
                "enabled"
            } else {
                "disabled"
            }
        );
        self.notify();
    }

    /// Reconcile state with a notification from the media primitive.
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if self.detached {
            return;
        }

        match event {
            MediaEvent::TimeUpdate => {
                let time = self.media.current_time();
                self.apply_time(time);

                // Checked once per notification, so playback may overshoot
                // loop_end by up to one progress interval.
                if let Some(target) = self.loop_target() {
                    trace!(
                        "Loop end reached at {:.3}, jumping to {target:.3}",
                        self.state.current_time
                    );
                    self.media.set_current_time(target);
                    self.apply_time(target);
                }
            }
            MediaEvent::LoadedMetadata => self.apply_metadata(),
            MediaEvent::Play => self.state.is_playing = true,
            MediaEvent::Pause => self.state.is_playing = false,
        }

        self.notify();
    }

    fn loop_target(&self) -> Option<f64> {
        if !self.state.is_looping {
            return None;
        }
        match self.state.loop_end {
            Some(end) if self.state.current_time >= end => {
                Some(self.state.loop_start.unwrap_or(0.0))
            }
            _ => None,
        }
    }

    fn apply_time(&mut self, time: f64) {
        self.state.current_time = time.clamp(0.0, self.state.duration);
        self.state.current_frame = frame_at(self.state.current_time, self.settings.frame_rate);
    }

    fn apply_metadata(&mut self) {
        if let Some(duration) = self.media.duration() {
            self.state.duration = duration.max(0.0);
            self.state.total_frames = frame_at(self.state.duration, self.settings.frame_rate);
            let time = self.media.current_time();
            self.apply_time(time);
            info!(
                "Clip metadata: {:.3}s, {} frames at {} fps",
                self.state.duration, self.state.total_frames, self.settings.frame_rate
            );
        }
    }

    /// Register an observer called with the new state after every change.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&PlayerState) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Teardown: drop every subscription and ignore anything that arrives
    /// afterwards.
    pub fn detach(&mut self) {
        self.observers.clear();
        self.detached = true;
        debug!("Playback controller detached");
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    fn notify(&mut self) {
        let state = &self.state;
        for (_, observer) in self.observers.iter_mut() {
            observer(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::clock_media::ClockMedia;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn loaded_controller(duration: f64) -> PlaybackController<ClockMedia> {
        let mut media = ClockMedia::new(duration);
        media.load();
        let mut controller = PlaybackController::new(media, TransportSettings::default());
        drain_events(&mut controller);
        controller
    }

    fn drain_events(controller: &mut PlaybackController<ClockMedia>) {
        while let Some(event) = controller.media_mut().poll_event() {
            controller.handle_media_event(event);
        }
    }

    fn assert_frame_consistent(controller: &PlaybackController<ClockMedia>) {
        let state = controller.state();
        assert_eq!(
            state.current_frame,
            (state.current_time * 24.0).floor() as u64
        );
    }

    #[test]
    fn test_new_controller_reads_loaded_metadata() {
        let controller = loaded_controller(60.0);
        assert_eq!(controller.state().duration, 60.0);
        assert_eq!(controller.state().total_frames, 1440);
        assert!(!controller.state().is_playing);
    }

    #[test]
    fn test_metadata_event_sets_duration() {
        let media = ClockMedia::new(10.0);
        let mut controller = PlaybackController::new(media, TransportSettings::default());
        assert_eq!(controller.state().duration, 0.0);

        controller.media_mut().load();
        drain_events(&mut controller);

        assert_eq!(controller.state().duration, 10.0);
        assert_eq!(controller.state().total_frames, 240);
    }

    #[test]
    fn test_toggle_play() {
        let mut controller = loaded_controller(10.0);
        controller.toggle_play();
        assert!(controller.state().is_playing);
        assert!(controller.media().is_playing());

        controller.toggle_play();
        assert!(!controller.state().is_playing);
        assert!(!controller.media().is_playing());
    }

    #[test]
    fn test_frame_counter_just_below_boundary() {
        let mut controller = loaded_controller(60.0);
        controller.seek(0.04166665);
        assert_eq!(controller.state().current_frame, 0);
        assert_frame_consistent(&controller);

        controller.seek(1.0 / 24.0);
        assert_frame_consistent(&controller);
    }

    #[test]
    fn test_total_frames_floors_duration() {
        let controller = loaded_controller(10.51);
        assert_eq!(controller.state().total_frames, 252);
        assert_eq!(
            controller.state().total_frames,
            (controller.state().duration * 24.0).floor() as u64
        );
    }

    #[test]
    fn test_seek_clamps_into_duration() {
        let mut controller = loaded_controller(60.0);

        for (target, expected) in [(-5.0, 0.0), (12.5, 12.5), (75.0, 60.0), (60.0, 60.0)] {
            controller.seek(target);
            assert_eq!(controller.state().current_time, expected);
            assert_eq!(controller.media().current_time(), expected);
            assert_frame_consistent(&controller);
        }
    }

    #[test]
    fn test_seek_ignores_nan() {
        let mut controller = loaded_controller(60.0);
        controller.seek(3.0);
        controller.seek(f64::NAN);
        assert_eq!(controller.state().current_time, 3.0);
    }

    #[test]
    fn test_seek_before_metadata_stays_at_zero() {
        let media = ClockMedia::new(10.0);
        let mut controller = PlaybackController::new(media, TransportSettings::default());
        controller.seek(4.0);
        assert_eq!(controller.state().current_time, 0.0);
    }

    #[test]
    fn test_step_forward_pauses_and_moves_one_frame() {
        let mut controller = loaded_controller(10.0);
        controller.seek(1.0);
        controller.play();

        controller.step_forward();

        assert!(!controller.state().is_playing);
        assert!((controller.state().current_time - (1.0 + 1.0 / 24.0)).abs() < 1e-9);
        assert_frame_consistent(&controller);
    }

    #[test]
    fn test_step_backward_clamps_at_zero() {
        let mut controller = loaded_controller(10.0);
        controller.step_backward();
        assert_eq!(controller.state().current_time, 0.0);
        assert!(!controller.state().is_playing);
    }

    #[test]
    fn test_step_forward_clamps_at_end() {
        let mut controller = loaded_controller(10.0);
        controller.seek(10.0);
        controller.step_forward();
        assert_eq!(controller.state().current_time, 10.0);
    }

    #[test]
    fn test_set_playback_rate_rejects_unknown() {
        let mut controller = loaded_controller(10.0);
        controller.set_playback_rate(1.5);
        assert_eq!(controller.state().playback_rate, 1.5);

        controller.set_playback_rate(3.0);
        assert_eq!(controller.state().playback_rate, 1.5);
        assert_eq!(controller.media().playback_rate(), 1.5);
    }

    #[test]
    fn test_cycle_playback_rate_wraps() {
        let mut controller = loaded_controller(10.0);
        controller.cycle_playback_rate();
        assert_eq!(controller.state().playback_rate, 1.5);
        controller.cycle_playback_rate();
        assert_eq!(controller.state().playback_rate, 2.0);
        controller.cycle_playback_rate();
        assert_eq!(controller.state().playback_rate, 0.25);
    }

    #[test]
    fn test_set_volume_clamps_and_mutes_at_zero() {
        let mut controller = loaded_controller(10.0);

        controller.set_volume(1.7);
        assert_eq!(controller.state().volume, 1.0);
        assert_eq!(controller.media().volume(), 1.0);
        assert!(!controller.state().is_muted);

        controller.set_volume(-0.5);
        assert_eq!(controller.state().volume, 0.0);
        assert_eq!(controller.media().volume(), 0.0);
        assert!(controller.state().is_muted);
        assert!(controller.media().muted());

        controller.set_volume(0.4);
        assert_eq!(controller.media().volume(), 0.4);
        assert!(!controller.state().is_muted);
        assert!(!controller.media().muted());
    }

    #[test]
    fn test_adjust_volume_reaches_zero() {
        let mut controller = loaded_controller(10.0);
        for _ in 0..10 {
            controller.adjust_volume(-0.1);
        }
        assert_eq!(controller.state().volume, 0.0);
        assert!(controller.state().is_muted);
    }

    #[test]
    fn test_toggle_mute_mirrors_media() {
        let mut controller = loaded_controller(10.0);
        controller.toggle_mute();
        assert!(controller.state().is_muted);
        assert!(controller.media().muted());

        controller.toggle_mute();
        assert!(!controller.state().is_muted);
    }

    #[test]
    fn test_loop_region_normalized() {
        let mut controller = loaded_controller(20.0);
        controller.set_loop_region(Some(8.0), Some(3.0));
        assert_eq!(controller.state().loop_start, Some(3.0));
        assert_eq!(controller.state().loop_end, Some(8.0));

        controller.set_loop_region(None, Some(5.0));
        assert_eq!(controller.state().loop_start, None);
        assert_eq!(controller.state().loop_end, Some(5.0));
    }

    #[test]
    fn test_loop_marks_at_playhead() {
        let mut controller = loaded_controller(20.0);
        controller.seek(2.0);
        controller.set_loop_start_here();
        controller.seek(10.0);
        controller.set_loop_end_here();
        assert_eq!(controller.state().loop_start, Some(2.0));
        assert_eq!(controller.state().loop_end, Some(10.0));

        controller.toggle_looping();
        controller.clear_loop_region();
        assert!(controller.state().loop_start.is_none());
        assert!(controller.state().loop_end.is_none());
        assert!(!controller.state().is_looping);
    }

    #[test]
    fn test_loop_seeks_back_once_per_notification() {
        let mut controller = loaded_controller(20.0);
        controller.set_loop_region(Some(2.0), Some(10.0));
        controller.toggle_looping();

        let seeks_before = controller.media().seek_count();
        controller.media_mut().jump_to(10.3);
        let event = controller.media_mut().poll_event();
        assert_eq!(event, Some(MediaEvent::TimeUpdate));
        controller.handle_media_event(MediaEvent::TimeUpdate);

        assert_eq!(controller.media().seek_count(), seeks_before + 1);
        assert_eq!(controller.state().current_time, 2.0);
        assert_eq!(controller.media().current_time(), 2.0);

        // The seek's own progress echo must not trigger another jump
        drain_events(&mut controller);
        assert_eq!(controller.media().seek_count(), seeks_before + 1);
    }

    #[test]
    fn test_loop_without_start_returns_to_zero() {
        let mut controller = loaded_controller(20.0);
        controller.set_loop_region(None, Some(5.0));
        controller.toggle_looping();
        controller.media_mut().jump_to(5.0);
        drain_events(&mut controller);
        assert_eq!(controller.state().current_time, 0.0);
    }

    #[test]
    fn test_no_loop_when_disabled() {
        let mut controller = loaded_controller(20.0);
        controller.set_loop_region(Some(2.0), Some(10.0));
        controller.media_mut().jump_to(12.0);
        drain_events(&mut controller);
        assert_eq!(controller.state().current_time, 12.0);
    }

    #[test]
    fn test_native_play_pause_mirrored() {
        let mut controller = loaded_controller(20.0);
        controller.handle_media_event(MediaEvent::Play);
        assert!(controller.state().is_playing);
        controller.handle_media_event(MediaEvent::Pause);
        assert!(!controller.state().is_playing);
    }

    #[test]
    fn test_time_update_is_idempotent() {
        let mut controller = loaded_controller(20.0);
        controller.media_mut().jump_to(4.5);
        controller.handle_media_event(MediaEvent::TimeUpdate);
        let first = controller.state().clone();
        controller.handle_media_event(MediaEvent::TimeUpdate);
        assert_eq!(controller.state(), &first);
        assert_frame_consistent(&controller);
    }

    #[test]
    fn test_playing_to_the_end_pauses_state() {
        let mut controller = loaded_controller(1.0);
        controller.play();
        controller
            .media_mut()
            .advance(std::time::Duration::from_secs(3));
        drain_events(&mut controller);
        assert!(!controller.state().is_playing);
        assert_eq!(controller.state().current_time, 1.0);
        assert_eq!(controller.state().current_frame, 24);
    }

    #[test]
    fn test_observers_notified_until_unsubscribed() {
        let mut controller = loaded_controller(10.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = controller.subscribe(move |state| sink.borrow_mut().push(state.current_time));

        controller.seek(3.0);
        controller.seek(4.0);
        assert!(controller.unsubscribe(id));
        controller.seek(5.0);

        assert_eq!(*seen.borrow(), vec![3.0, 4.0]);
        assert!(!controller.unsubscribe(id));
    }

    #[test]
    fn test_detach_drops_everything() {
        let mut controller = loaded_controller(10.0);
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        controller.subscribe(move |_| *counter.borrow_mut() += 1);

        controller.detach();
        controller.seek(5.0);
        controller.play();
        controller.handle_media_event(MediaEvent::Play);

        assert!(controller.is_detached());
        assert_eq!(*calls.borrow(), 0);
        assert_eq!(controller.state().current_time, 0.0);
        assert!(!controller.state().is_playing);
    }
}
