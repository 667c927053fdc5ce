//! Fretline: a beat-synchronized playback engine for guitar and bass practice.
//!
//! An [`exercise::Exercise`] is played by the [`playback::PlaybackDriver`],
//! which emits [`transport::TransportState`] snapshots at quarter-beat
//! resolution. Discrete transport actions go through the pure reducer in
//! [`transport`], and [`player::Player`] ties the two together for a host.

pub mod config;
pub mod exercise;
pub mod metronome;
pub mod playback;
pub mod player;
pub mod transport;
