//! The media playback primitive the controller drives.
//!
//! The primitive is an already-loaded clip: it can play and pause, has a
//! mutable current time, rate, volume and mute flag, and reports its own
//! progress asynchronously through `MediaEvent`s that the host forwards to
//! `PlaybackController::handle_media_event`.

/// Notifications emitted by the media primitive. Delivery cadence is up to
/// the platform; consumers must treat every event as idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    TimeUpdate,
    LoadedMetadata,
    Play,
    Pause,
}

pub trait MediaElement {
    fn play(&mut self);
    fn pause(&mut self);

    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, time: f64);

    /// Clip length in seconds; `None` until metadata is available.
    fn duration(&self) -> Option<f64>;

    fn set_playback_rate(&mut self, rate: f64);
    fn set_volume(&mut self, volume: f64);

    fn muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool);
}
