//! Scales, chords, and where their pitches sit on the fretboard.
//!
//! Pitches are pitch-class names from [`CHROMATIC_SCALE`]. Flat spellings
//! are accepted on input and come back out as their sharp equivalents.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::fret::{FretPosition, MAX_FRET};
use super::instrument::{note_at_fret, Instrument, CHROMATIC_SCALE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TheoryError {
    #[error("unknown pitch '{0}'")]
    UnknownPitch(String),
    #[error("unknown scale '{0}'")]
    UnknownScale(String),
    #[error("unknown chord quality '{0}'")]
    UnknownChord(String),
}

/// Canonical (sharp) spelling of a pitch-class name such as `"Bb"` or `"f#"`.
pub fn pitch_class(name: &str) -> Result<&'static str, TheoryError> {
    let mut chars = name.trim().chars();
    let letter = chars
        .next()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| ('A'..='G').contains(c))
        .ok_or_else(|| TheoryError::UnknownPitch(name.to_string()))?;
    let natural = CHROMATIC_SCALE
        .iter()
        .position(|n| n.starts_with(letter) && n.len() == 1)
        .ok_or_else(|| TheoryError::UnknownPitch(name.to_string()))?;
    let index = match chars.as_str() {
        "" => natural,
        "#" => natural + 1,
        "b" => natural + CHROMATIC_SCALE.len() - 1,
        _ => return Err(TheoryError::UnknownPitch(name.to_string())),
    };
    Ok(CHROMATIC_SCALE[index % CHROMATIC_SCALE.len()])
}

fn spell(root: &str, intervals: &[u8]) -> Vec<&'static str> {
    intervals.iter().map(|&i| note_at_fret(root, i)).collect()
}

/// Scale shapes, as semitone offsets from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleType {
    Major,
    Minor,
    MajorPentatonic,
    MinorPentatonic,
    Blues,
    Dorian,
    Mixolydian,
}

impl ScaleType {
    pub const ALL: [ScaleType; 7] = [
        ScaleType::Major,
        ScaleType::Minor,
        ScaleType::MajorPentatonic,
        ScaleType::MinorPentatonic,
        ScaleType::Blues,
        ScaleType::Dorian,
        ScaleType::Mixolydian,
    ];

    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleType::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleType::Minor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleType::MajorPentatonic => &[0, 2, 4, 7, 9],
            ScaleType::MinorPentatonic => &[0, 3, 5, 7, 10],
            ScaleType::Blues => &[0, 3, 5, 6, 7, 10],
            ScaleType::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleType::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScaleType::Major => "major",
            ScaleType::Minor => "minor",
            ScaleType::MajorPentatonic => "major-pentatonic",
            ScaleType::MinorPentatonic => "minor-pentatonic",
            ScaleType::Blues => "blues",
            ScaleType::Dorian => "dorian",
            ScaleType::Mixolydian => "mixolydian",
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScaleType {
    type Err = TheoryError;

    /// Accepts the kebab-case name, with `_` or spaces in place of `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        ScaleType::ALL
            .into_iter()
            .find(|t| t.name() == wanted)
            .ok_or_else(|| TheoryError::UnknownScale(s.to_string()))
    }
}

/// Chord qualities, as semitone offsets from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChordType {
    Major,
    Minor,
    Major7,
    Minor7,
    Dominant7,
    Diminished,
    Augmented,
}

impl ChordType {
    pub const ALL: [ChordType; 7] = [
        ChordType::Major,
        ChordType::Minor,
        ChordType::Major7,
        ChordType::Minor7,
        ChordType::Dominant7,
        ChordType::Diminished,
        ChordType::Augmented,
    ];

    pub fn intervals(self) -> &'static [u8] {
        match self {
            ChordType::Major => &[0, 4, 7],
            ChordType::Minor => &[0, 3, 7],
            ChordType::Major7 => &[0, 4, 7, 11],
            ChordType::Minor7 => &[0, 3, 7, 10],
            ChordType::Dominant7 => &[0, 4, 7, 10],
            ChordType::Diminished => &[0, 3, 6],
            ChordType::Augmented => &[0, 4, 8],
        }
    }

    /// Suffix used in chord symbols, e.g. `"m7"` in `Am7`.
    pub fn suffix(self) -> &'static str {
        match self {
            ChordType::Major => "",
            ChordType::Minor => "m",
            ChordType::Major7 => "maj7",
            ChordType::Minor7 => "m7",
            ChordType::Dominant7 => "7",
            ChordType::Diminished => "dim",
            ChordType::Augmented => "aug",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChordType::Major => "major",
            ChordType::Minor => "minor",
            ChordType::Major7 => "major7",
            ChordType::Minor7 => "minor7",
            ChordType::Dominant7 => "dominant7",
            ChordType::Diminished => "diminished",
            ChordType::Augmented => "augmented",
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        let kind = match suffix {
            "" | "maj" | "M" => ChordType::Major,
            "m" | "min" | "-" => ChordType::Minor,
            "maj7" | "M7" => ChordType::Major7,
            "m7" | "min7" | "-7" => ChordType::Minor7,
            "7" | "dom7" => ChordType::Dominant7,
            "dim" | "o" => ChordType::Diminished,
            "aug" | "+" => ChordType::Augmented,
            _ => return None,
        };
        Some(kind)
    }
}

impl FromStr for ChordType {
    type Err = TheoryError;

    /// Accepts a symbol suffix (`m7`, `dim`) or a kebab-case name (`minor7`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        ChordType::from_suffix(trimmed)
            .or_else(|| ChordType::ALL.into_iter().find(|k| k.name() == lower))
            .ok_or_else(|| TheoryError::UnknownChord(s.to_string()))
    }
}

/// A chord symbol such as `C`, `F#m`, `Bbmaj7`, or `G7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Chord {
    pub root: &'static str,
    pub kind: ChordType,
}

impl Chord {
    pub fn new(root: &str, kind: ChordType) -> Result<Self, TheoryError> {
        Ok(Self {
            root: pitch_class(root)?,
            kind,
        })
    }

    pub fn notes(&self) -> Vec<&'static str> {
        chord_notes(self.root, self.kind)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root, self.kind.suffix())
    }
}

impl FromStr for Chord {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let letter = s.chars().next().map_or(0, char::len_utf8);
        let root_len = match s[letter..].chars().next() {
            Some('#') | Some('b') => letter + 1,
            _ => letter,
        };
        let (root, suffix) = s.split_at(root_len);
        let kind =
            ChordType::from_suffix(suffix).ok_or_else(|| TheoryError::UnknownChord(s.to_string()))?;
        Chord::new(root, kind)
    }
}

/// Pitches of `scale` built on `root`, root first. Empty for an unknown root.
pub fn scale_notes(root: &str, scale: ScaleType) -> Vec<&'static str> {
    match pitch_class(root) {
        Ok(root) => spell(root, scale.intervals()),
        Err(_) => Vec::new(),
    }
}

/// Pitches of a `kind` chord built on `root`, root first. Empty for an unknown root.
pub fn chord_notes(root: &str, kind: ChordType) -> Vec<&'static str> {
    match pitch_class(root) {
        Ok(root) => spell(root, kind.intervals()),
        Err(_) => Vec::new(),
    }
}

/// Pitch at every fret `0..=max_fret` of every string, lowest string first.
pub fn fretboard_notes(instrument: Instrument, max_fret: u8) -> Vec<Vec<&'static str>> {
    let max_fret = max_fret.min(MAX_FRET);
    instrument
        .standard_tuning()
        .iter()
        .map(|open| (0..=max_fret).map(|fret| note_at_fret(open, fret)).collect())
        .collect()
}

/// Every position in `min_fret..=max_fret` whose pitch is one of `targets`.
///
/// Positions come back highlighted, ordered by string and then by fret.
pub fn find_notes_on_fretboard(
    instrument: Instrument,
    targets: &[&str],
    min_fret: u8,
    max_fret: u8,
) -> Vec<FretPosition> {
    let targets: Vec<&str> = targets.iter().filter_map(|t| pitch_class(t).ok()).collect();
    let max_fret = max_fret.min(MAX_FRET);
    let mut positions = Vec::new();
    for (string, open) in (1u8..).zip(instrument.standard_tuning()) {
        for fret in min_fret..=max_fret {
            let note = note_at_fret(open, fret);
            if targets.contains(&note) {
                positions.push(FretPosition {
                    string,
                    fret,
                    note: note.to_string(),
                    highlighted: true,
                });
            }
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flats_are_spelled_as_sharps() {
        assert_eq!(pitch_class("Bb"), Ok("A#"));
        assert_eq!(pitch_class("f#"), Ok("F#"));
        assert_eq!(pitch_class("Cb"), Ok("B"));
        assert_eq!(pitch_class("E#"), Ok("F"));
        assert!(pitch_class("H").is_err());
        assert!(pitch_class("").is_err());
        assert!(pitch_class("Cx").is_err());
    }

    #[test]
    fn scale_spelling() {
        assert_eq!(
            scale_notes("C", ScaleType::Major),
            ["C", "D", "E", "F", "G", "A", "B"]
        );
        assert_eq!(
            scale_notes("A", ScaleType::MinorPentatonic),
            ["A", "C", "D", "E", "G"]
        );
        assert_eq!(
            scale_notes("E", ScaleType::Blues),
            ["E", "G", "A", "A#", "B", "D"]
        );
        assert!(scale_notes("X", ScaleType::Major).is_empty());
    }

    #[test]
    fn chord_spelling() {
        assert_eq!(chord_notes("G", ChordType::Dominant7), ["G", "B", "D", "F"]);
        assert_eq!(chord_notes("D", ChordType::Minor), ["D", "F", "A"]);
        assert_eq!(chord_notes("C", ChordType::Augmented), ["C", "E", "G#"]);
    }

    #[test]
    fn scale_names_parse() {
        assert_eq!("minor-pentatonic".parse(), Ok(ScaleType::MinorPentatonic));
        assert_eq!("Major_Pentatonic".parse(), Ok(ScaleType::MajorPentatonic));
        assert_eq!("dorian".parse(), Ok(ScaleType::Dorian));
        assert!("lydian".parse::<ScaleType>().is_err());
        for scale in ScaleType::ALL {
            assert_eq!(scale.to_string().parse(), Ok(scale));
        }
    }

    #[test]
    fn chord_symbols_parse() {
        let chord: Chord = "Bbmaj7".parse().unwrap();
        assert_eq!(chord.root, "A#");
        assert_eq!(chord.kind, ChordType::Major7);

        let cases = [
            ("C", ChordType::Major),
            ("F#m", ChordType::Minor),
            ("Am7", ChordType::Minor7),
            ("G7", ChordType::Dominant7),
            ("Bdim", ChordType::Diminished),
            ("Eaug", ChordType::Augmented),
        ];
        for (symbol, kind) in cases {
            assert_eq!(symbol.parse::<Chord>().unwrap().kind, kind, "{symbol}");
        }
        assert!("Csus4".parse::<Chord>().is_err());
        assert!("".parse::<Chord>().is_err());
        assert_eq!("A#m7".parse::<Chord>().unwrap().to_string(), "A#m7");
    }

    #[test]
    fn chord_type_accepts_names() {
        assert_eq!("minor7".parse(), Ok(ChordType::Minor7));
        assert_eq!("m7".parse(), Ok(ChordType::Minor7));
        assert_eq!("dominant7".parse(), Ok(ChordType::Dominant7));
    }

    #[test]
    fn fretboard_grid() {
        let grid = fretboard_notes(Instrument::Bass, 12);
        assert_eq!(grid.len(), 4);
        assert!(grid.iter().all(|s| s.len() == 13));
        assert_eq!(grid[0][5], "A");
        assert_eq!(grid[3][12], "G");
        assert_eq!(fretboard_notes(Instrument::Guitar, 99)[0].len(), 25);
    }

    #[test]
    fn finds_targets_in_fret_window() {
        let found = find_notes_on_fretboard(Instrument::Bass, &["C", "G"], 0, 5);
        let spots: Vec<(u8, u8, &str)> = found
            .iter()
            .map(|p| (p.string, p.fret, p.note.as_str()))
            .collect();
        assert_eq!(
            spots,
            [(1, 3, "G"), (2, 3, "C"), (3, 5, "G"), (4, 0, "G"), (4, 5, "C")]
        );
        assert!(found.iter().all(|p| p.highlighted));
    }

    #[test]
    fn empty_window_finds_nothing() {
        assert!(find_notes_on_fretboard(Instrument::Guitar, &["E"], 5, 4).is_empty());
        assert!(find_notes_on_fretboard(Instrument::Guitar, &["H"], 0, 12).is_empty());
    }
}
