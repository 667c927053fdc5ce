//! Stateless beat-position queries over an exercise's notes.
//!
//! Everything here is a plain function of the note list and a beat, shared by
//! the driver and anything else that wants to render a position (a paused
//! seek preview, for example).

use crate::exercise::{FretPosition, Instrument, Note};

/// Span used for exercises without notes.
pub const EMPTY_EXERCISE_BEATS: f64 = 4.0;

/// Notes ordered by start beat. Notes sharing a start keep their input order.
pub fn sorted_notes(notes: &[Note]) -> Vec<Note> {
    let mut sorted = notes.to_vec();
    sorted.sort_by(|a, b| a.beat.total_cmp(&b.beat));
    sorted
}

/// Latest note end, or [`EMPTY_EXERCISE_BEATS`] when there are no notes.
pub fn total_beats(notes: &[Note]) -> f64 {
    notes
        .iter()
        .map(Note::end)
        .reduce(f64::max)
        .unwrap_or(EMPTY_EXERCISE_BEATS)
}

/// Notes sounding at `beat` (`start <= beat < start + duration`).
pub fn active_notes(notes: &[Note], beat: f64) -> Vec<&Note> {
    notes.iter().filter(|n| n.is_active_at(beat)).collect()
}

/// Fraction of the exercise played, in `[0, 1]`.
pub fn progress(beat: f64, total_beats: f64) -> f64 {
    if total_beats <= 0.0 || total_beats.is_nan() {
        return 0.0;
    }
    (beat / total_beats).clamp(0.0, 1.0)
}

/// Index of the first note starting after `beat`, or `sorted.len()`.
pub fn next_note_index(sorted: &[Note], beat: f64) -> usize {
    sorted
        .iter()
        .position(|n| n.beat > beat)
        .unwrap_or(sorted.len())
}

/// Highlighted fretboard positions for the notes sounding at `beat`.
///
/// Unlabelled notes are named from the instrument's standard tuning.
pub fn highlighted_positions(notes: &[Note], beat: f64, instrument: Instrument) -> Vec<FretPosition> {
    active_notes(notes, beat)
        .into_iter()
        .map(|note| position_for(note, instrument).highlight())
        .collect()
}

fn position_for(note: &Note, instrument: Instrument) -> FretPosition {
    let pos = FretPosition::clamped(note.string, note.fret, "", instrument.string_count());
    let label = if note.label.is_empty() {
        instrument.note_at(pos.string, pos.fret).unwrap_or("?").to_string()
    } else {
        note.label.clone()
    };
    FretPosition { note: label, ..pos }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn note(string: i32, fret: i32, beat: f64, duration: f64) -> Note {
        Note::new(string, fret, beat, duration, "")
    }

    #[test]
    fn active_is_half_open() {
        let notes = vec![note(1, 0, 1.0, 2.0)];
        assert_eq!(active_notes(&notes, 1.0).len(), 1);
        assert_eq!(active_notes(&notes, 2.9).len(), 1);
        assert!(active_notes(&notes, 0.99).is_empty());
        assert!(active_notes(&notes, 3.0).is_empty());
    }

    #[test]
    fn overlapping_notes_are_all_active() {
        let notes = vec![note(1, 0, 0.0, 4.0), note(2, 2, 1.0, 1.0), note(3, 2, 3.0, 1.0)];
        let active = active_notes(&notes, 1.5);
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].string, 1);
        assert_eq!(active[1].string, 2);
    }

    #[test]
    fn total_beats_is_latest_end() {
        let notes = vec![note(1, 0, 0.0, 4.0), note(1, 0, 2.0, 0.5)];
        assert_approx_eq!(total_beats(&notes), 4.0);
        let notes = vec![note(1, 0, 3.0, 2.5), note(1, 0, 0.0, 1.0)];
        assert_approx_eq!(total_beats(&notes), 5.5);
    }

    #[test]
    fn empty_exercise_spans_one_bar() {
        assert_approx_eq!(total_beats(&[]), EMPTY_EXERCISE_BEATS);
    }

    #[test]
    fn progress_is_clamped() {
        assert_approx_eq!(progress(1.0, 4.0), 0.25);
        assert_approx_eq!(progress(9.0, 4.0), 1.0);
        assert_approx_eq!(progress(-1.0, 4.0), 0.0);
        assert_approx_eq!(progress(1.0, 0.0), 0.0);
        assert_approx_eq!(progress(1.0, -2.0), 0.0);
    }

    #[test]
    fn next_note_index_finds_first_later_start() {
        let notes = vec![note(1, 0, 0.0, 1.0), note(1, 0, 1.0, 1.0), note(1, 0, 2.0, 1.0)];
        assert_eq!(next_note_index(&notes, 0.0), 1);
        assert_eq!(next_note_index(&notes, 0.5), 1);
        assert_eq!(next_note_index(&notes, 1.0), 2);
        assert_eq!(next_note_index(&notes, 2.0), 3);
        assert_eq!(next_note_index(&notes, -0.5), 0);
    }

    #[test]
    fn sort_is_stable_for_equal_starts() {
        let notes = vec![
            Note::new(1, 5, 2.0, 1.0, "a"),
            Note::new(2, 5, 0.0, 1.0, "b"),
            Note::new(3, 5, 2.0, 1.0, "c"),
            Note::new(4, 5, 0.0, 1.0, "d"),
        ];
        let labels: Vec<_> = sorted_notes(&notes).into_iter().map(|n| n.label).collect();
        assert_eq!(labels, ["b", "d", "a", "c"]);
    }

    #[test]
    fn highlights_clamp_and_label() {
        let notes = vec![
            Note::new(1, 3, 0.0, 1.0, "G"),
            note(9, 40, 0.0, 1.0),
            note(2, 2, 0.0, 1.0),
        ];
        let hl = highlighted_positions(&notes, 0.5, Instrument::Bass);
        assert_eq!(hl.len(), 3);
        assert!(hl.iter().all(|p| p.highlighted));
        assert_eq!((hl[0].string, hl[0].fret, hl[0].note.as_str()), (1, 3, "G"));
        assert_eq!((hl[1].string, hl[1].fret), (4, 24));
        // A string, second fret.
        assert_eq!(hl[2].note, "B");
    }
}
