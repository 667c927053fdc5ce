//! Fretboard positions shown to the renderer.

use serde::{Deserialize, Serialize};

/// Highest fret a position may reference.
pub const MAX_FRET: u8 = 24;

/// A location on the fretboard, optionally highlighted as sounding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FretPosition {
    /// 1-based string number.
    pub string: u8,
    pub fret: u8,
    pub note: String,
    pub highlighted: bool,
}

impl FretPosition {
    /// Build a position, clamping `string` to `1..=string_count` and `fret`
    /// to `0..=MAX_FRET`.
    pub fn clamped(string: i32, fret: i32, note: impl Into<String>, string_count: u8) -> Self {
        let max_string = i32::from(string_count.max(1));
        Self {
            string: string.clamp(1, max_string) as u8,
            fret: fret.clamp(0, i32::from(MAX_FRET)) as u8,
            note: note.into(),
            highlighted: false,
        }
    }

    /// Mark this position as currently sounding.
    pub fn highlight(mut self) -> Self {
        self.highlighted = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_values_pass_through() {
        let pos = FretPosition::clamped(3, 7, "A", 6);
        assert_eq!(pos.string, 3);
        assert_eq!(pos.fret, 7);
        assert_eq!(pos.note, "A");
        assert!(!pos.highlighted);
    }

    #[test]
    fn string_clamps_to_instrument() {
        assert_eq!(FretPosition::clamped(9, 0, "", 4).string, 4);
        assert_eq!(FretPosition::clamped(-2, 0, "", 4).string, 1);
    }

    #[test]
    fn fret_clamps_to_board() {
        assert_eq!(FretPosition::clamped(1, 30, "", 6).fret, MAX_FRET);
        assert_eq!(FretPosition::clamped(1, -1, "", 6).fret, 0);
    }

    #[test]
    fn zero_string_count_still_yields_a_string() {
        assert_eq!(FretPosition::clamped(5, 0, "", 0).string, 1);
    }
}
