//! Cancellation and single-driver guarantees under real threads.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use fretline::exercise::{Exercise, Note};
use fretline::playback::{
    step_interval, update_channel, CancelToken, DriveOutcome, PlaybackDriver, PlaybackSession,
    PlaybackUpdate,
};
use fretline::player::Player;
use fretline::transport::{TransportEvent, TransportState};

fn slow_loop() -> Exercise {
    Exercise::with_notes(vec![
        Note::new(1, 0, 0.0, 2.0, "E"),
        Note::new(2, 0, 2.0, 2.0, "A"),
    ])
    .bpm(40)
    .looping(true)
}

#[test]
fn cancel_stops_within_one_step_and_emits_nothing_after() {
    let ex = slow_loop();
    let token = CancelToken::new();
    let remote = token.clone();
    let (tx, rx) = mpsc::channel();

    let worker = thread::spawn(move || {
        PlaybackDriver::new().drive(&ex, &TransportState::default(), &remote, |s| {
            tx.send(s).unwrap();
        })
    });

    rx.recv_timeout(Duration::from_secs(1)).expect("no first state");
    let cancelled_at = Instant::now();
    token.cancel();
    let outcome = worker.join().unwrap().unwrap();
    let stopped_after = cancelled_at.elapsed();

    assert_eq!(outcome, DriveOutcome::Cancelled);
    assert!(
        stopped_after < step_interval(40),
        "took {stopped_after:?} to stop"
    );
    // The sender was dropped with the worker; anything left was sent before cancel.
    assert!(rx.try_iter().count() <= 1);
}

#[test]
fn dropping_a_session_joins_its_thread() {
    let (tx, rx) = update_channel();
    let session = PlaybackSession::start(
        PlaybackDriver::new(),
        slow_loop(),
        TransportState::default(),
        tx,
    );
    assert!(matches!(
        rx.recv_timeout(Duration::from_secs(1)),
        Ok(PlaybackUpdate::State(_))
    ));
    let start = Instant::now();
    drop(session);
    assert!(start.elapsed() < step_interval(40));

    let rest: Vec<_> = rx.try_iter().collect();
    assert_eq!(
        rest.last(),
        Some(&PlaybackUpdate::Finished(DriveOutcome::Cancelled))
    );
}

#[test]
fn selecting_a_new_exercise_cancels_the_old_run() {
    let mut player = Player::new(PlaybackDriver::new());
    player.select(slow_loop());
    player.dispatch(TransportEvent::Play);
    assert!(player.is_running());

    let start = Instant::now();
    let fresh = player.select(Exercise::default().bpm(150)).clone();
    assert!(start.elapsed() < step_interval(40));
    assert!(!player.is_running());
    assert!(!fresh.is_playing);
    assert_eq!(fresh.bpm, 150);

    // Nothing from the cancelled run may leak into the new state.
    thread::sleep(Duration::from_millis(50));
    assert_eq!(player.poll(), Ok(0));
    assert_eq!(player.state(), &fresh);
}

#[test]
fn play_twice_keeps_a_single_driver() {
    let mut player = Player::new(PlaybackDriver::with_poll_interval(Duration::from_millis(1)));
    player.select(slow_loop().bpm(300).looping(false));
    player.dispatch(TransportEvent::Play);
    player.dispatch(TransportEvent::Play);

    thread::sleep(Duration::from_millis(300));
    player.poll().unwrap();
    let beat = player.state().current_beat;
    // One driver at 300 bpm covers about 1.5 of the 4 beats in 300ms. Two
    // would interleave and the position would jump backwards between polls.
    let mut last = beat;
    for _ in 0..10 {
        thread::sleep(Duration::from_millis(20));
        player.poll().unwrap();
        let now = player.state().current_beat;
        assert!(
            now >= last || !player.state().is_playing,
            "position went from {last} to {now}"
        );
        last = now;
    }
    player.dispatch(TransportEvent::Stop);
    assert!(!player.is_running());
}
