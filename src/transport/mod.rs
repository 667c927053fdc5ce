//! Transport: the play/pause/stop/seek control surface.
//!
//! [`TransportState`] is the snapshot every component passes around and
//! [`handle`] is the reducer that applies discrete [`TransportEvent`]s to it.

pub mod controller;
pub mod state;

pub use controller::{handle, TransportEvent};
pub use state::{clamp_bpm, TransportState, DEFAULT_BPM, MAX_BPM, MIN_BPM};
