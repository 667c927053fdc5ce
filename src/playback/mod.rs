//! Exercise playback engine.
//!
//! The [`PlaybackDriver`] advances a beat clock over an exercise in
//! quarter-beat steps and emits a [`TransportState`](crate::transport::TransportState)
//! per step. The pure step sequence ([`Steps`]) is separate from the paced,
//! cancellable [`PlaybackDriver::drive`] loop, and [`PlaybackSession`] runs
//! that loop on its own thread for hosts that need to stay responsive.
//!
//! The beat-position queries in [`highlight`] are usable on their own.

pub mod cancel;
pub mod driver;
pub mod error;
pub mod highlight;
pub mod session;

pub use cancel::CancelToken;
pub use driver::{step_interval, DriveOutcome, PlaybackDriver, Step, Steps, STEP_BEATS};
pub use error::PlaybackError;
pub use highlight::{
    active_notes, highlighted_positions, next_note_index, progress, sorted_notes, total_beats,
};
pub use session::{update_channel, PlaybackSession, PlaybackUpdate, UpdateReceiver, UpdateSender};
