//! Player: the host side of the engine.
//!
//! A `Player` owns the one "current" [`TransportState`] for a screen, runs at
//! most one [`PlaybackSession`] at a time, and applies the session's updates
//! in emission order. Transport events go through the pure reducer first;
//! the player then starts or cancels the session as the new state requires.

use std::sync::mpsc::TryRecvError;

use log::{debug, info, warn};

use crate::exercise::Exercise;
use crate::playback::{
    update_channel, DriveOutcome, PlaybackDriver, PlaybackError, PlaybackSession, PlaybackUpdate,
    UpdateReceiver,
};
use crate::transport::{handle, TransportEvent, TransportState};

/// Live session plus the receiving end of its update channel.
struct Running {
    session: PlaybackSession,
    updates: UpdateReceiver,
}

/// Holds the current exercise and transport state for one screen.
pub struct Player {
    driver: PlaybackDriver,
    exercise: Option<Exercise>,
    state: TransportState,
    running: Option<Running>,
    failure: Option<PlaybackError>,
}

impl Player {
    pub fn new(driver: PlaybackDriver) -> Self {
        Self {
            driver,
            exercise: None,
            state: TransportState::default(),
            running: None,
            failure: None,
        }
    }

    /// The current transport snapshot.
    pub fn state(&self) -> &TransportState {
        &self.state
    }

    /// The selected exercise, including any tempo/loop/metronome overrides.
    pub fn exercise(&self) -> Option<&Exercise> {
        self.exercise.as_ref()
    }

    /// Whether a session is currently driving playback.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| r.session.is_running())
    }

    /// Select a new exercise. Any running session is cancelled and the
    /// transport starts over with the exercise's tempo.
    pub fn select(&mut self, exercise: Exercise) -> &TransportState {
        self.cancel_session();
        self.failure = None;
        info!("selected exercise '{}'", exercise.title);
        self.state = TransportState::for_exercise(&exercise);
        self.exercise = Some(exercise);
        &self.state
    }

    /// Apply a transport event and start or cancel playback to match.
    pub fn dispatch(&mut self, event: TransportEvent) -> &TransportState {
        debug!("transport event {event:?}");
        // A run that ended on its own may still have its final snapshot queued.
        self.drain();
        let was_running = self.is_running();

        match event {
            TransportEvent::Play => {
                if !was_running {
                    self.cancel_session();
                }
                self.state = handle(event, &self.state);
                if !was_running {
                    self.start_session();
                }
            }
            TransportEvent::Pause | TransportEvent::Stop | TransportEvent::Reset => {
                self.cancel_session();
                self.state = handle(event, &self.state);
            }
            TransportEvent::SeekTo(_) => {
                self.cancel_session();
                self.state = handle(event, &self.state);
                if was_running {
                    self.start_session();
                }
            }
            TransportEvent::SetBpm(_)
            | TransportEvent::SetLoop(_)
            | TransportEvent::SetMetronome(_) => {
                self.cancel_session();
                self.state = handle(event, &self.state);
                self.sync_exercise_settings();
                if was_running {
                    self.start_session();
                }
            }
        }
        &self.state
    }

    /// Apply every update the session has sent so far.
    ///
    /// Returns how many snapshots were applied, or the failure that ended
    /// the session. A failure is reported once.
    pub fn poll(&mut self) -> Result<usize, PlaybackError> {
        let applied = self.drain();
        match self.failure.take() {
            Some(e) => Err(e),
            None => Ok(applied),
        }
    }

    fn drain(&mut self) -> usize {
        let Some(running) = self.running.as_ref() else {
            return 0;
        };

        let mut applied = 0;
        let mut ended = false;
        loop {
            let update = match running.updates.try_recv() {
                Ok(update) => update,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !ended {
                        warn!("session ended without reporting an outcome");
                        self.state.is_playing = false;
                        ended = true;
                    }
                    break;
                }
            };
            match update {
                PlaybackUpdate::State(state) => {
                    self.state = state;
                    applied += 1;
                }
                PlaybackUpdate::Finished(outcome) => {
                    if outcome == DriveOutcome::Finished {
                        info!("exercise finished");
                    }
                    ended = true;
                }
                PlaybackUpdate::Failed(e) => {
                    warn!("session failed: {e}");
                    self.failure = Some(e);
                    ended = true;
                }
            }
        }
        if ended {
            self.running = None;
        }
        applied
    }

    fn start_session(&mut self) {
        let Some(exercise) = self.exercise.clone() else {
            debug!("play without an exercise, nothing to drive");
            return;
        };
        let (tx, rx) = update_channel();
        let session = PlaybackSession::start(self.driver, exercise, self.state.clone(), tx);
        self.running = Some(Running {
            session,
            updates: rx,
        });
    }

    /// Stop the session and apply what it emitted before stopping.
    fn cancel_session(&mut self) {
        if let Some(running) = self.running.as_mut() {
            running.session.stop();
            self.drain();
            self.running = None;
        }
    }

    /// The driver takes tempo, loop, and metronome from the exercise, so
    /// manual changes are written back into the selected exercise.
    fn sync_exercise_settings(&mut self) {
        if let Some(exercise) = self.exercise.as_mut() {
            exercise.playback.bpm = self.state.bpm;
            exercise.playback.loop_playback = self.state.loop_playback;
            exercise.playback.metronome = self.state.metronome;
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(PlaybackDriver::default())
    }
}
