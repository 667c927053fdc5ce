//! Playback driver: quarter-beat time stepping over an exercise.
//!
//! [`Steps`] is the pure part. It walks the beat clock and yields one
//! [`Step`] per emitted snapshot together with the wall-clock pause that
//! should follow it, without ever sleeping itself. [`PlaybackDriver::drive`]
//! adds the pacing and cancellation on top and pushes snapshots into a sink.
//!
//! Step granularity is fixed at a quarter beat. Tempo only changes how long
//! each step lasts in wall-clock time.

use std::time::Duration;

use log::{debug, info, warn};

use super::cancel::CancelToken;
use super::error::PlaybackError;
use super::highlight::{highlighted_positions, next_note_index, progress, sorted_notes, total_beats};
use crate::exercise::{Exercise, Instrument, Note};
use crate::transport::{clamp_bpm, TransportState};

/// Beats advanced per step.
pub const STEP_BEATS: f64 = 0.25;

/// Default interval at which a sleeping driver checks for cancellation.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Wall-clock length of one quarter-beat step at `bpm` (clamped).
pub fn step_interval(bpm: u32) -> Duration {
    let bpm = clamp_bpm(i64::from(bpm));
    let beat = Duration::from_secs(60) / bpm;
    beat / 4
}

/// One emitted snapshot and the pause before the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub state: TransportState,
    pub pause: Duration,
}

/// How a drive that did not fail came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// A non-looping exercise ran past its last beat.
    Finished,
    /// The cancel token was observed.
    Cancelled,
}

#[derive(Debug)]
enum Phase {
    Start,
    Running,
    Failing(PlaybackError),
    Done,
}

/// Lazy step sequence for one playback run.
///
/// Yields `Ok` snapshots in emission order. A looping exercise never ends on
/// its own. On failure a final non-playing snapshot is yielded, then the
/// error, then nothing.
#[derive(Debug)]
pub struct Steps {
    notes: Vec<Note>,
    instrument: Instrument,
    total_beats: f64,
    state: TransportState,
    fault: Option<PlaybackError>,
    phase: Phase,
}

impl Steps {
    /// Prepare a run of `exercise` from `initial`.
    ///
    /// Tempo, loop, and metronome come from the exercise settings. Every other
    /// field starts from `initial`.
    pub fn new(exercise: &Exercise, initial: &TransportState) -> Self {
        let fault = exercise
            .notes
            .iter()
            .enumerate()
            .find_map(|(index, note)| {
                note.check()
                    .err()
                    .map(|fault| PlaybackError::MalformedNote { index, fault })
            })
            .or_else(|| {
                let beat = initial.current_beat;
                (!beat.is_finite()).then_some(PlaybackError::InvalidPosition(beat))
            });

        let notes = sorted_notes(&exercise.notes);
        let settings = &exercise.playback;
        Self {
            total_beats: total_beats(&notes),
            notes,
            instrument: exercise.instrument,
            state: TransportState {
                is_playing: true,
                current_beat: initial.current_beat.max(0.0),
                bpm: clamp_bpm(i64::from(settings.bpm)),
                loop_playback: settings.loop_playback,
                metronome: settings.metronome,
                ..initial.clone()
            },
            fault,
            phase: Phase::Start,
        }
    }

    /// Span of the exercise in beats.
    pub fn total_beats(&self) -> f64 {
        self.total_beats
    }

    /// Notes in playback order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Tempo the run uses, after clamping.
    pub fn bpm(&self) -> u32 {
        self.state.bpm
    }

    /// Recompute every beat-derived field at `beat`.
    fn snapshot_at(&self, beat: f64) -> TransportState {
        TransportState {
            current_beat: beat,
            current_note_index: next_note_index(&self.notes, beat),
            progress: progress(beat, self.total_beats),
            highlighted_positions: highlighted_positions(&self.notes, beat, self.instrument),
            ..self.state.clone()
        }
    }

    fn emit(&mut self, state: TransportState) -> Step {
        self.state = state;
        Step {
            pause: step_interval(self.state.bpm),
            state: self.state.clone(),
        }
    }

    fn finish(&mut self) -> Step {
        self.phase = Phase::Done;
        Step {
            state: TransportState {
                is_playing: false,
                current_beat: 0.0,
                current_note_index: self.notes.len(),
                progress: 1.0,
                highlighted_positions: Vec::new(),
                ..self.state.clone()
            },
            pause: Duration::ZERO,
        }
    }

    fn fail(&mut self, error: PlaybackError) -> Step {
        self.phase = Phase::Failing(error);
        Step {
            state: TransportState {
                is_playing: false,
                ..self.state.clone()
            },
            pause: Duration::ZERO,
        }
    }
}

impl Iterator for Steps {
    type Item = Result<Step, PlaybackError>;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.phase, Phase::Done) {
            Phase::Start => {
                if let Some(error) = self.fault.take() {
                    return Some(Ok(self.fail(error)));
                }
                self.phase = Phase::Running;
                let seed = self.snapshot_at(self.state.current_beat);
                Some(Ok(self.emit(seed)))
            }
            Phase::Running => {
                let next_beat = self.state.current_beat + STEP_BEATS;
                let beat = if next_beat < self.total_beats {
                    next_beat
                } else if self.state.loop_playback {
                    0.0
                } else {
                    return Some(Ok(self.finish()));
                };
                self.phase = Phase::Running;
                let state = self.snapshot_at(beat);
                Some(Ok(self.emit(state)))
            }
            Phase::Failing(error) => Some(Err(error)),
            Phase::Done => None,
        }
    }
}

/// The playback engine service. Holds configuration only, never run state,
/// so one instance can serve any number of sequential runs.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackDriver {
    poll_interval: Duration,
}

impl PlaybackDriver {
    pub fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Use a custom cancellation polling interval.
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// The step sequence for a run, without any wall-clock pacing.
    pub fn steps(&self, exercise: &Exercise, initial: &TransportState) -> Steps {
        Steps::new(exercise, initial)
    }

    /// Run `exercise` in real time, pushing each snapshot into `sink`.
    ///
    /// Blocks until the exercise ends, `cancel` fires, or stepping fails.
    /// Nothing is pushed once cancellation has been observed. On failure the
    /// final non-playing snapshot is pushed before the error is returned.
    pub fn drive<F>(
        &self,
        exercise: &Exercise,
        initial: &TransportState,
        cancel: &CancelToken,
        mut sink: F,
    ) -> Result<DriveOutcome, PlaybackError>
    where
        F: FnMut(TransportState),
    {
        let steps = self.steps(exercise, initial);
        info!(
            "playback start: '{}' ({} notes, {} beats) at {} bpm",
            exercise.title,
            steps.notes().len(),
            steps.total_beats(),
            steps.bpm()
        );

        for item in steps {
            let step = match item {
                Ok(step) => step,
                Err(e) => {
                    warn!("playback failed: {e}");
                    return Err(e);
                }
            };
            if cancel.is_cancelled() {
                info!("playback cancelled");
                return Ok(DriveOutcome::Cancelled);
            }
            debug!(
                "beat {:.2} progress {:.3} ({} sounding)",
                step.state.current_beat,
                step.state.progress,
                step.state.highlighted_positions.len()
            );
            let pause = step.pause;
            sink(step.state);
            if cancel.sleep(pause, self.poll_interval) {
                info!("playback cancelled");
                return Ok(DriveOutcome::Cancelled);
            }
        }

        info!("playback finished");
        Ok(DriveOutcome::Finished)
    }
}

impl Default for PlaybackDriver {
    fn default() -> Self {
        Self::new()
    }
}
