//! Errors raised while stepping an exercise.

use thiserror::Error;

use crate::exercise::NoteFault;

/// A failure that stopped a playback run.
///
/// The driver always emits a final non-playing state before returning one
/// of these, so the host never sees a run end while still "playing".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlaybackError {
    #[error("note {index} cannot be played: {fault}")]
    MalformedNote { index: usize, fault: NoteFault },
    #[error("cannot start playback from beat {0}")]
    InvalidPosition(f64),
}
