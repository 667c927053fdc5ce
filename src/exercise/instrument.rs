//! Fretted instruments, their standard tunings, and fret-to-pitch naming.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pitch classes in chromatic order starting from C.
pub const CHROMATIC_SCALE: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A fretted instrument an exercise is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    #[default]
    Guitar,
    Bass,
    Ukulele,
    Mandolin,
    Banjo,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown instrument '{0}'")]
pub struct UnknownInstrument(pub String);

impl Instrument {
    pub const ALL: [Instrument; 5] = [
        Instrument::Guitar,
        Instrument::Bass,
        Instrument::Ukulele,
        Instrument::Mandolin,
        Instrument::Banjo,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Instrument::Guitar => "guitar",
            Instrument::Bass => "bass",
            Instrument::Ukulele => "ukulele",
            Instrument::Mandolin => "mandolin",
            Instrument::Banjo => "banjo",
        }
    }

    /// Number of strings in the default configuration.
    pub fn string_count(self) -> u8 {
        match self {
            Instrument::Guitar => 6,
            Instrument::Bass => 4,
            Instrument::Ukulele => 4,
            Instrument::Mandolin => 8,
            Instrument::Banjo => 5,
        }
    }

    /// Open-string pitch classes, lowest-numbered string first.
    pub fn standard_tuning(self) -> &'static [&'static str] {
        match self {
            Instrument::Guitar => &["E", "A", "D", "G", "B", "E"],
            Instrument::Bass => &["E", "A", "D", "G"],
            Instrument::Ukulele => &["G", "C", "E", "A"],
            Instrument::Mandolin => &["G", "D", "A", "E", "G", "D", "A", "E"],
            Instrument::Banjo => &["G", "D", "G", "B", "D"],
        }
    }

    /// Pitch class sounding at `fret` on 1-based `string`, if the string exists.
    pub fn note_at(self, string: u8, fret: u8) -> Option<&'static str> {
        let open = self
            .standard_tuning()
            .get(usize::from(string).checked_sub(1)?)?;
        Some(note_at_fret(open, fret))
    }
}

impl FromStr for Instrument {
    type Err = UnknownInstrument;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Instrument::ALL
            .into_iter()
            .find(|i| i.name() == wanted)
            .ok_or_else(|| UnknownInstrument(s.to_string()))
    }
}

/// Name the pitch class `fret` semitones above the open string `open`.
///
/// Returns `"?"` when `open` is not a chromatic pitch class name.
pub fn note_at_fret(open: &str, fret: u8) -> &'static str {
    match CHROMATIC_SCALE.iter().position(|n| *n == open) {
        Some(idx) => CHROMATIC_SCALE[(idx + usize::from(fret)) % CHROMATIC_SCALE.len()],
        None => "?",
    }
}
