//! Metronome: an on/off click pulse at a fixed tempo.
//!
//! Each beat is a short "on" pulse followed by an "off" pulse for the rest
//! of the beat. The pulse train never ends; [`Metronome::run`] stops when its
//! cancel token fires.

use std::time::Duration;

use crate::playback::CancelToken;
use crate::transport::clamp_bpm;

/// Default length of the audible click.
pub const DEFAULT_CLICK: Duration = Duration::from_millis(100);

/// One edge of the click signal and how long it lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulse {
    pub on: bool,
    pub hold: Duration,
}

/// Click generator for a single tempo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metronome {
    bpm: u32,
    click: Duration,
}

impl Metronome {
    /// A metronome at `bpm`, clamped to the transport's tempo range.
    pub fn new(bpm: u32) -> Self {
        Self {
            bpm: clamp_bpm(i64::from(bpm)),
            click: DEFAULT_CLICK,
        }
    }

    /// Override the click length. It never exceeds one beat.
    pub fn with_click(mut self, click: Duration) -> Self {
        self.click = click;
        self
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn beat_length(&self) -> Duration {
        Duration::from_secs(60) / self.bpm
    }

    /// Endless alternating on/off pulses, starting with a click.
    pub fn pulses(&self) -> impl Iterator<Item = Pulse> {
        let beat = self.beat_length();
        let click = self.click.min(beat);
        [
            Pulse {
                on: true,
                hold: click,
            },
            Pulse {
                on: false,
                hold: beat - click,
            },
        ]
        .into_iter()
        .cycle()
    }

    /// Push each pulse edge into `sink` in real time until `cancel` fires.
    ///
    /// Returns the number of clicks emitted.
    pub fn run<F>(&self, cancel: &CancelToken, poll: Duration, mut sink: F) -> u64
    where
        F: FnMut(bool),
    {
        let mut clicks = 0;
        for pulse in self.pulses() {
            if cancel.is_cancelled() {
                break;
            }
            if pulse.on {
                clicks += 1;
            }
            sink(pulse.on);
            if cancel.sleep(pulse.hold, poll) {
                break;
            }
        }
        clicks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn pulses_alternate_and_fill_the_beat() {
        let m = Metronome::new(120);
        let pulses: Vec<Pulse> = m.pulses().take(4).collect();
        assert!(pulses[0].on);
        assert!(!pulses[1].on);
        assert!(pulses[2].on);
        assert_eq!(pulses[0].hold, Duration::from_millis(100));
        assert_eq!(pulses[0].hold + pulses[1].hold, Duration::from_millis(500));
    }

    #[test]
    fn click_never_outlasts_the_beat() {
        let m = Metronome::new(300).with_click(Duration::from_secs(1));
        let pulses: Vec<Pulse> = m.pulses().take(2).collect();
        assert_eq!(pulses[0].hold, Duration::from_millis(200));
        assert_eq!(pulses[1].hold, Duration::ZERO);
    }

    #[test]
    fn tempo_is_clamped() {
        assert_eq!(Metronome::new(5).bpm(), 40);
        assert_eq!(Metronome::new(900).bpm(), 300);
    }

    #[test]
    fn run_stops_on_cancel() {
        let m = Metronome::new(300).with_click(Duration::from_millis(10));
        let token = CancelToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(450));
            remote.cancel();
        });
        let mut edges = Vec::new();
        let clicks = m.run(&token, Duration::from_millis(1), |on| edges.push(on));
        handle.join().unwrap();
        assert!(clicks >= 2, "only {clicks} clicks");
        assert!(edges[0]);
        assert!(edges.windows(2).all(|w| w[0] != w[1]));
    }
}
