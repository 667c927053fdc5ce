//! Practice exercises: the notes to play and the settings to play them with.
//!
//! Exercises are read-only input to the playback engine. They normally come
//! from an external store; [`Exercise::load`] reads the YAML document form
//! used by the command-line player and the tests.

pub mod fret;
pub mod generate;
pub mod instrument;
pub mod theory;

pub use fret::{FretPosition, MAX_FRET};
pub use instrument::{note_at_fret, Instrument, UnknownInstrument, CHROMATIC_SCALE};
pub use theory::{Chord, ChordType, ScaleType, TheoryError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a single note cannot be placed on the beat timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NoteFault {
    #[error("start beat is not a finite number")]
    NonFiniteBeat,
    #[error("start beat is negative")]
    NegativeBeat,
    #[error("duration is not a finite number")]
    NonFiniteDuration,
    #[error("duration must be greater than zero")]
    NonPositiveDuration,
}

/// Failure to load an exercise document.
#[derive(Debug, Error)]
pub enum ExerciseError {
    #[error("failed to read exercise {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid exercise document: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("note {index} is invalid: {fault}")]
    InvalidNote { index: usize, fault: NoteFault },
}

/// A single fretted note on the exercise timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// 1-based string number.
    pub string: i32,
    pub fret: i32,
    /// Start position in beats.
    pub beat: f64,
    /// Length in beats.
    pub duration: f64,
    /// Pitch name shown on the fretboard; derived from the tuning when empty.
    #[serde(default, rename = "note")]
    pub label: String,
}

impl Note {
    pub fn new(string: i32, fret: i32, beat: f64, duration: f64, label: impl Into<String>) -> Self {
        Self {
            string,
            fret,
            beat,
            duration,
            label: label.into(),
        }
    }

    /// Beat at which the note stops sounding (exclusive).
    pub fn end(&self) -> f64 {
        self.beat + self.duration
    }

    /// Whether the note sounds at `beat`, using a half-open `[start, end)` interval.
    pub fn is_active_at(&self, beat: f64) -> bool {
        self.beat <= beat && beat < self.end()
    }

    /// Check the timing invariants: `beat >= 0` and `duration > 0`, both finite.
    pub fn check(&self) -> Result<(), NoteFault> {
        if !self.beat.is_finite() {
            return Err(NoteFault::NonFiniteBeat);
        }
        if self.beat < 0.0 {
            return Err(NoteFault::NegativeBeat);
        }
        if !self.duration.is_finite() {
            return Err(NoteFault::NonFiniteDuration);
        }
        if self.duration <= 0.0 {
            return Err(NoteFault::NonPositiveDuration);
        }
        Ok(())
    }
}

fn default_bpm() -> u32 {
    120
}

fn default_volume() -> f32 {
    1.0
}

fn default_repeat_count() -> u32 {
    1
}

/// Nominal playback settings shipped with an exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_bpm")]
    pub bpm: u32,
    #[serde(default, rename = "loop")]
    pub loop_playback: bool,
    #[serde(default)]
    pub metronome: bool,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "default_repeat_count")]
    pub repeat_count: u32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            bpm: default_bpm(),
            loop_playback: false,
            metronome: false,
            volume: default_volume(),
            repeat_count: default_repeat_count(),
        }
    }
}

/// A practice exercise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub instrument: Instrument,
    #[serde(default)]
    pub playback: PlaybackSettings,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Exercise {
    /// An exercise with the given notes and default settings.
    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            notes,
            ..Self::default()
        }
    }

    pub fn bpm(mut self, bpm: u32) -> Self {
        self.playback.bpm = bpm;
        self
    }

    pub fn looping(mut self, loop_playback: bool) -> Self {
        self.playback.loop_playback = loop_playback;
        self
    }

    pub fn metronome(mut self, metronome: bool) -> Self {
        self.playback.metronome = metronome;
        self
    }

    pub fn instrument(mut self, instrument: Instrument) -> Self {
        self.instrument = instrument;
        self
    }

    /// Parse and validate a YAML exercise document.
    pub fn from_yaml(source: &str) -> Result<Self, ExerciseError> {
        let exercise: Exercise = serde_yaml::from_str(source)?;
        exercise.validate()?;
        Ok(exercise)
    }

    /// Read, parse, and validate an exercise file.
    pub fn load(path: &Path) -> Result<Self, ExerciseError> {
        let content = std::fs::read_to_string(path).map_err(|source| ExerciseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Report the first note that violates the timing invariants.
    pub fn validate(&self) -> Result<(), ExerciseError> {
        for (index, note) in self.notes.iter().enumerate() {
            note.check()
                .map_err(|fault| ExerciseError::InvalidNote { index, fault })?;
        }
        Ok(())
    }
}
