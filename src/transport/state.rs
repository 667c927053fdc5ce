//! Transport snapshot: where playback is and what is sounding.

use serde::Serialize;

use crate::exercise::{Exercise, FretPosition};

/// Slowest tempo the transport accepts.
pub const MIN_BPM: u32 = 40;
/// Fastest tempo the transport accepts.
pub const MAX_BPM: u32 = 300;
/// Tempo of a state created without an exercise.
pub const DEFAULT_BPM: u32 = 120;

/// Clamp a requested tempo into `[MIN_BPM, MAX_BPM]`.
pub fn clamp_bpm(bpm: i64) -> u32 {
    bpm.clamp(i64::from(MIN_BPM), i64::from(MAX_BPM)) as u32
}

/// An immutable snapshot of playback. Transitions build new values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportState {
    pub is_playing: bool,
    /// Fractional beat position, never negative.
    pub current_beat: f64,
    /// Index of the next upcoming note in start order, or the note count.
    pub current_note_index: usize,
    /// `current_beat / total_beats`, clamped to `[0, 1]`.
    pub progress: f64,
    pub highlighted_positions: Vec<FretPosition>,
    pub bpm: u32,
    pub loop_playback: bool,
    pub metronome: bool,
}

impl TransportState {
    /// A fresh state for a newly selected exercise.
    pub fn for_exercise(exercise: &Exercise) -> Self {
        Self {
            bpm: clamp_bpm(i64::from(exercise.playback.bpm)),
            ..Self::default()
        }
    }

    /// The same state rewound to the start with nothing sounding.
    pub(crate) fn rewound(&self) -> Self {
        Self {
            is_playing: false,
            current_beat: 0.0,
            current_note_index: 0,
            progress: 0.0,
            highlighted_positions: Vec::new(),
            ..self.clone()
        }
    }
}

impl Default for TransportState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_beat: 0.0,
            current_note_index: 0,
            progress: 0.0,
            highlighted_positions: Vec::new(),
            bpm: DEFAULT_BPM,
            loop_playback: false,
            metronome: false,
        }
    }
}
