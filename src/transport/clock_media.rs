//! A media primitive driven by an explicit clock.
//!
//! `ClockMedia` stands in for a decoded clip: it has no pixels, only a
//! playhead that moves at `rate` while playing. The host advances it with
//! real elapsed time (terminal player) or scripted deltas (simulate command,
//! tests) and drains the events it queues, the same way a real player
//! reports progress on its own cadence.

use std::collections::VecDeque;
use std::time::Duration;

use super::media::{MediaElement, MediaEvent};

/// Default gap between progress notifications.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct ClockMedia {
    clip_duration: f64,
    metadata_loaded: bool,
    current_time: f64,
    playing: bool,
    rate: f64,
    volume: f64,
    muted: bool,
    pending: VecDeque<MediaEvent>,
    progress_interval: Duration,
    since_progress: Duration,
    seek_count: usize,
}

impl ClockMedia {
    pub fn new(clip_duration: f64) -> Self {
        Self {
            clip_duration: clip_duration.max(0.0),
            metadata_loaded: false,
            current_time: 0.0,
            playing: false,
            rate: 1.0,
            volume: 1.0,
            muted: false,
            pending: VecDeque::new(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            since_progress: Duration::ZERO,
            seek_count: 0,
        }
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Make the duration readable and queue the metadata notification.
    pub fn load(&mut self) {
        self.metadata_loaded = true;
        self.pending.push_back(MediaEvent::LoadedMetadata);
    }

    /// Move the playhead by `elapsed` wall time. Queues a progress event
    /// whenever a full interval has accumulated, and a pause when the end of
    /// the clip is reached.
    pub fn advance(&mut self, elapsed: Duration) {
        if !self.playing {
            return;
        }

        self.current_time += elapsed.as_secs_f64() * self.rate;
        self.since_progress += elapsed;

        if self.current_time >= self.clip_duration {
            self.current_time = self.clip_duration;
            self.playing = false;
            self.since_progress = Duration::ZERO;
            self.pending.push_back(MediaEvent::TimeUpdate);
            self.pending.push_back(MediaEvent::Pause);
            return;
        }

        if self.since_progress >= self.progress_interval {
            self.since_progress = Duration::ZERO;
            self.pending.push_back(MediaEvent::TimeUpdate);
        }
    }

    /// Place the playhead without going through a seek, used to script a
    /// late progress notification.
    pub fn jump_to(&mut self, time: f64) {
        self.current_time = time.clamp(0.0, self.clip_duration);
        self.pending.push_back(MediaEvent::TimeUpdate);
    }

    pub fn poll_event(&mut self) -> Option<MediaEvent> {
        self.pending.pop_front()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn playback_rate(&self) -> f64 {
        self.rate
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Number of seeks requested through `set_current_time`.
    pub fn seek_count(&self) -> usize {
        self.seek_count
    }
}

impl MediaElement for ClockMedia {
    fn play(&mut self) {
        if !self.playing {
            self.playing = true;
            self.since_progress = Duration::ZERO;
            self.pending.push_back(MediaEvent::Play);
        }
    }

    fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            self.pending.push_back(MediaEvent::Pause);
        }
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, time: f64) {
        self.current_time = time.clamp(0.0, self.clip_duration);
        self.seek_count += 1;
        self.pending.push_back(MediaEvent::TimeUpdate);
    }

    fn duration(&self) -> Option<f64> {
        self.metadata_loaded.then_some(self.clip_duration)
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn muted(&self) -> bool {
        self.muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(media: &mut ClockMedia) -> Vec<MediaEvent> {
        std::iter::from_fn(|| media.poll_event()).collect()
    }

    #[test]
    fn test_duration_hidden_until_loaded() {
        let mut media = ClockMedia::new(12.0);
        assert!(media.duration().is_none());

        media.load();
        assert_eq!(media.duration(), Some(12.0));
        assert_eq!(drain(&mut media), vec![MediaEvent::LoadedMetadata]);
    }

    #[test]
    fn test_advance_only_while_playing() {
        let mut media = ClockMedia::new(10.0);
        media.advance(Duration::from_secs(1));
        assert_eq!(media.current_time(), 0.0);

        media.play();
        media.advance(Duration::from_secs(1));
        assert_eq!(media.current_time(), 1.0);
    }

    #[test]
    fn test_advance_respects_rate() {
        let mut media = ClockMedia::new(10.0);
        media.set_playback_rate(2.0);
        media.play();
        media.advance(Duration::from_millis(500));
        assert_eq!(media.current_time(), 1.0);
    }

    #[test]
    fn test_progress_events_on_interval() {
        let mut media = ClockMedia::new(10.0).with_progress_interval(Duration::from_millis(100));
        media.play();
        drain(&mut media);

        media.advance(Duration::from_millis(50));
        assert!(drain(&mut media).is_empty());

        media.advance(Duration::from_millis(50));
        assert_eq!(drain(&mut media), vec![MediaEvent::TimeUpdate]);
    }

    #[test]
    fn test_reaching_end_pauses() {
        let mut media = ClockMedia::new(1.0);
        media.play();
        drain(&mut media);

        media.advance(Duration::from_secs(2));
        assert_eq!(media.current_time(), 1.0);
        assert!(!media.is_playing());
        assert_eq!(
            drain(&mut media),
            vec![MediaEvent::TimeUpdate, MediaEvent::Pause]
        );
    }

    #[test]
    fn test_seek_clamps_and_counts() {
        let mut media = ClockMedia::new(5.0);
        media.set_current_time(9.0);
        assert_eq!(media.current_time(), 5.0);
        media.set_current_time(-1.0);
        assert_eq!(media.current_time(), 0.0);
        assert_eq!(media.seek_count(), 2);
    }

    #[test]
    fn test_play_pause_events_not_duplicated() {
        let mut media = ClockMedia::new(5.0);
        media.play();
        media.play();
        media.pause();
        media.pause();
        assert_eq!(drain(&mut media), vec![MediaEvent::Play, MediaEvent::Pause]);
    }
}
