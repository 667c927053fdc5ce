//! Transport controller: pure reducer for discrete transport events.
//!
//! `handle` never fails. Out-of-range numbers are clamped rather than
//! rejected, and the input state is only ever borrowed.

use super::state::{clamp_bpm, TransportState};

/// A discrete user action on the transport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    Play,
    Pause,
    Stop,
    /// Rewind like `Stop`. The tempo survives.
    Reset,
    SetBpm(i64),
    SetLoop(bool),
    SetMetronome(bool),
    SeekTo(f64),
}

/// Apply `event` to `state`, returning the next snapshot.
pub fn handle(event: TransportEvent, state: &TransportState) -> TransportState {
    match event {
        TransportEvent::Play => TransportState {
            is_playing: true,
            ..state.clone()
        },
        TransportEvent::Pause => TransportState {
            is_playing: false,
            ..state.clone()
        },
        TransportEvent::Stop | TransportEvent::Reset => state.rewound(),
        TransportEvent::SetBpm(bpm) => TransportState {
            bpm: clamp_bpm(bpm),
            ..state.clone()
        },
        TransportEvent::SetLoop(loop_playback) => TransportState {
            loop_playback,
            ..state.clone()
        },
        TransportEvent::SetMetronome(metronome) => TransportState {
            metronome,
            ..state.clone()
        },
        TransportEvent::SeekTo(beat) => TransportState {
            current_beat: seek_target(beat),
            ..state.clone()
        },
    }
}

/// NaN seeks land on zero along with negative targets.
fn seek_target(beat: f64) -> f64 {
    if beat.is_nan() || beat < 0.0 {
        0.0
    } else if beat.is_infinite() {
        f64::MAX
    } else {
        beat
    }
}
