//! Exercise generation.
//!
//! Builds note lists from a scale, a chord progression, an arpeggio, or a
//! seeded random draw, restricted to a fret window and a set of strings.
//! Generated notes are one beat apart unless noted otherwise, and always
//! carry their pitch name.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::fret::{FretPosition, MAX_FRET};
use super::instrument::{note_at_fret, Instrument};
use super::theory::{
    find_notes_on_fretboard, pitch_class, scale_notes, Chord, ChordType, ScaleType, TheoryError,
};
use super::{Exercise, Note, PlaybackSettings};

/// Beats each chord is held for in a progression.
pub const CHORD_BEATS: f64 = 4.0;

/// Where on the neck generated notes may fall.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    pub instrument: Instrument,
    pub min_fret: u8,
    pub max_fret: u8,
    /// 1-based strings to use. Empty means every string.
    pub strings: Vec<u8>,
    /// Notes to produce for scale and random exercises.
    pub note_count: usize,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            instrument: Instrument::Guitar,
            min_fret: 0,
            max_fret: 12,
            strings: Vec::new(),
            note_count: 8,
        }
    }
}

impl Constraints {
    pub fn for_instrument(instrument: Instrument) -> Self {
        Self {
            instrument,
            ..Self::default()
        }
    }

    pub fn frets(mut self, min_fret: u8, max_fret: u8) -> Self {
        self.min_fret = min_fret;
        self.max_fret = max_fret.min(MAX_FRET);
        self
    }

    pub fn strings(mut self, strings: Vec<u8>) -> Self {
        self.strings = strings;
        self
    }

    pub fn note_count(mut self, note_count: usize) -> Self {
        self.note_count = note_count;
        self
    }

    /// Strings notes may be placed on, in ascending order.
    pub fn usable_strings(&self) -> Vec<u8> {
        (1..=self.instrument.string_count())
            .filter(|s| self.strings.is_empty() || self.strings.contains(s))
            .collect()
    }

    fn allows(&self, string: u8, fret: u8) -> bool {
        (self.min_fret..=self.max_fret).contains(&fret)
            && (self.strings.is_empty() || self.strings.contains(&string))
    }

    fn positions(&self, targets: &[&str]) -> Vec<FretPosition> {
        find_notes_on_fretboard(self.instrument, targets, self.min_fret, self.max_fret)
            .into_iter()
            .filter(|p| self.allows(p.string, p.fret))
            .collect()
    }
}

fn note_from(position: &FretPosition, beat: f64, duration: f64) -> Note {
    Note::new(
        i32::from(position.string),
        i32::from(position.fret),
        beat,
        duration,
        position.note.clone(),
    )
}

fn one_per_beat<'a>(positions: impl IntoIterator<Item = &'a FretPosition>) -> Vec<Note> {
    positions
        .into_iter()
        .enumerate()
        .map(|(i, p)| note_from(p, i as f64, 1.0))
        .collect()
}

/// Walk the scale up the neck, string by string, one note per beat.
pub fn scale(key: &str, scale: ScaleType, c: &Constraints) -> Result<Vec<Note>, TheoryError> {
    let root = pitch_class(key)?;
    let notes = scale_notes(root, scale);
    let positions = c.positions(&notes);
    Ok(one_per_beat(positions.iter().take(c.note_count)))
}

/// Each chord held for [`CHORD_BEATS`], voiced with the lowest allowed fret
/// of a chord tone on every usable string.
pub fn progression(chords: &[Chord], c: &Constraints) -> Vec<Note> {
    let mut notes = Vec::new();
    for (i, chord) in chords.iter().enumerate() {
        let beat = i as f64 * CHORD_BEATS;
        let positions = c.positions(&chord.notes());
        for string in c.usable_strings() {
            if let Some(p) = positions.iter().find(|p| p.string == string) {
                notes.push(note_from(p, beat, CHORD_BEATS));
            }
        }
    }
    notes
}

/// Four chord tones up, then the same four back down.
pub fn arpeggio(key: &str, kind: ChordType, c: &Constraints) -> Result<Vec<Note>, TheoryError> {
    let chord = Chord::new(key, kind)?;
    let positions = c.positions(&chord.notes());
    let up = &positions[..positions.len().min(4)];
    Ok(one_per_beat(up.iter().chain(up.iter().rev())))
}

/// Random positions within the constraints, reproducible from `rng`.
pub fn random<R: Rng>(c: &Constraints, rng: &mut R) -> Vec<Note> {
    let strings = c.usable_strings();
    let tuning = c.instrument.standard_tuning();
    if strings.is_empty() || c.min_fret > c.max_fret {
        return Vec::new();
    }
    (0..c.note_count)
        .filter_map(|i| {
            let string = *strings.choose(rng)?;
            let fret = rng.gen_range(c.min_fret..=c.max_fret);
            let open = tuning.get(usize::from(string) - 1)?;
            Some(Note::new(
                i32::from(string),
                i32::from(fret),
                i as f64,
                1.0,
                note_at_fret(open, fret),
            ))
        })
        .collect()
}

/// Keep only the notes that fit inside the constraints.
pub fn fit(notes: &[Note], c: &Constraints) -> Vec<Note> {
    notes
        .iter()
        .filter(|n| match (u8::try_from(n.string), u8::try_from(n.fret)) {
            (Ok(string), Ok(fret)) => c.allows(string, fret),
            _ => false,
        })
        .cloned()
        .collect()
}

/// A kind of generated exercise and its musical parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Recipe {
    Scale { key: String, scale: ScaleType },
    Progression(Vec<Chord>),
    Arpeggio { key: String, kind: ChordType },
    /// Sight reading: random positions from a fixed seed.
    Random { seed: u64 },
}

impl Recipe {
    pub fn notes(&self, c: &Constraints) -> Result<Vec<Note>, TheoryError> {
        match self {
            Recipe::Scale { key, scale: kind } => scale(key, *kind, c),
            Recipe::Progression(chords) => Ok(progression(chords, c)),
            Recipe::Arpeggio { key, kind } => arpeggio(key, *kind, c),
            Recipe::Random { seed } => Ok(random(c, &mut ChaCha8Rng::seed_from_u64(*seed))),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Recipe::Scale { key, scale } => format!("{key} {scale} scale"),
            Recipe::Progression(chords) => {
                let names: Vec<String> = chords.iter().map(Chord::to_string).collect();
                format!("Progression {}", names.join(" "))
            }
            Recipe::Arpeggio { key, kind } => format!("{key} {} arpeggio", kind.name()),
            Recipe::Random { seed } => format!("Sight reading (seed {seed})"),
        }
    }

    fn id(&self) -> String {
        self.title()
            .to_ascii_lowercase()
            .replace('#', "sharp")
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// A complete exercise for `c.instrument` with the given playback settings.
    pub fn exercise(
        &self,
        c: &Constraints,
        playback: PlaybackSettings,
    ) -> Result<Exercise, TheoryError> {
        Ok(Exercise {
            id: self.id(),
            title: self.title(),
            instrument: c.instrument,
            playback,
            notes: self.notes(c)?,
        })
    }
}
