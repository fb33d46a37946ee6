//! Interactive transport control for frame-by-frame clip study.
//!
//! Raw touch input is classified by the [`gesture`] recognizer, turned into
//! controller calls by the [`dispatcher`], and applied to the canonical
//! [`state::PlayerState`] by the [`controller`], which also reconciles the
//! media primitive's own events. The [`keyboard`] bridge feeds the same
//! dispatcher from desktop keys.

pub mod clock_media;
pub mod controller;
pub mod dispatcher;
pub mod gesture;
pub mod keyboard;
pub mod media;
pub mod script;
pub mod state;
pub mod timer;

pub use clock_media::ClockMedia;
pub use controller::{PlaybackController, SubscriptionId};
pub use dispatcher::CommandDispatcher;
pub use gesture::{
    Gesture, GestureRecognizer, GestureSettings, PlaybackSnapshot, TapZone, TouchEvent,
    TouchPhase, TouchState,
};
pub use keyboard::{KeyCommand, KeyInput, key_command};
pub use media::{MediaElement, MediaEvent};
pub use state::{PlayerState, TransportSettings, format_timecode};
