//! Playback session: one driver run on a dedicated thread.
//!
//! Snapshots travel to the host over an mpsc channel in emission order.
//! Stopping the session cancels the driver and joins the thread, so once
//! `stop` returns nothing further is sent. A driver thread that panics
//! closes the channel without a `Finished` or `Failed` message.

use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use super::cancel::CancelToken;
use super::driver::{DriveOutcome, PlaybackDriver};
use super::error::PlaybackError;
use crate::exercise::Exercise;
use crate::transport::TransportState;

/// Messages a running session sends to its host.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackUpdate {
    /// A new snapshot to apply.
    State(TransportState),
    /// The run ended without failing. Always the last message.
    Finished(DriveOutcome),
    /// The run failed. Always the last message.
    Failed(PlaybackError),
}

pub type UpdateSender = mpsc::Sender<PlaybackUpdate>;
pub type UpdateReceiver = mpsc::Receiver<PlaybackUpdate>;

/// Create a new update channel pair.
pub fn update_channel() -> (UpdateSender, UpdateReceiver) {
    mpsc::channel()
}

/// A driver run on a background thread.
pub struct PlaybackSession {
    cancel: CancelToken,
    thread: Option<JoinHandle<()>>,
}

impl PlaybackSession {
    /// Start driving `exercise` from `initial`, sending updates to `sender`.
    ///
    /// If the receiving end is dropped the session cancels itself.
    pub fn start(
        driver: PlaybackDriver,
        exercise: Exercise,
        initial: TransportState,
        sender: UpdateSender,
    ) -> Self {
        let cancel = CancelToken::new();
        let token = cancel.clone();

        let thread = thread::spawn(move || {
            let result = driver.drive(&exercise, &initial, &token, |state| {
                if sender.send(PlaybackUpdate::State(state)).is_err() {
                    debug!("update receiver gone, cancelling session");
                    token.cancel();
                }
            });
            let last = match result {
                Ok(outcome) => PlaybackUpdate::Finished(outcome),
                Err(e) => PlaybackUpdate::Failed(e),
            };
            let _ = sender.send(last);
        });

        Self {
            cancel,
            thread: Some(thread),
        }
    }

    /// Whether the driver thread is still running.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel the driver and wait for its thread to exit.
    pub fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("playback thread panicked before reporting an outcome");
            }
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.stop();
    }
}
