//! fretline: play a practice exercise in the terminal.
//!
//! Prints one line per quarter-beat step with the position, a progress bar,
//! and the fretboard positions sounding at that moment. Ctrl-C stops playback.
//! The `scale`, `chords`, `arpeggio` and `random` commands generate an
//! exercise to print, save, or play.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

use clap::{Args, Parser, Subcommand};
use log::error;

use fretline::config::EngineConfig;
use fretline::exercise::generate::{Constraints, Recipe};
use fretline::exercise::{
    Chord, ChordType, Exercise, FretPosition, Instrument, PlaybackSettings, ScaleType,
};
use fretline::metronome::Metronome;
use fretline::playback::{sorted_notes, total_beats, CancelToken, DriveOutcome};
use fretline::transport::{handle, TransportEvent, TransportState};

const BAR_WIDTH: usize = 24;

#[derive(Parser)]
#[command(name = "fretline", version, about = "Guitar and bass exercise player")]
struct Cli {
    /// Config file (defaults to ~/.fretline/engine.yaml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play an exercise file in real time.
    Play {
        file: PathBuf,
        #[command(flatten)]
        transport: TransportArgs,
    },
    /// Print an exercise's notes in playback order.
    Show { file: PathBuf },
    /// Generate a scale exercise, e.g. `fretline scale A minor-pentatonic`.
    Scale {
        key: String,
        #[arg(default_value = "major")]
        scale: ScaleType,
        #[command(flatten)]
        generate: GenerateArgs,
    },
    /// Generate a chord progression, one bar per chord, e.g. `fretline chords C Am F G7`.
    Chords {
        #[arg(required = true)]
        chords: Vec<Chord>,
        #[command(flatten)]
        generate: GenerateArgs,
    },
    /// Generate an arpeggio up and back down a chord.
    Arpeggio {
        key: String,
        #[arg(default_value = "major")]
        kind: ChordType,
        #[command(flatten)]
        generate: GenerateArgs,
    },
    /// Generate random notes for sight reading.
    Random {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[command(flatten)]
        generate: GenerateArgs,
    },
}

/// Playback overrides shared by every command that plays.
#[derive(Args)]
struct TransportArgs {
    /// Override the exercise tempo.
    #[arg(long)]
    bpm: Option<i64>,
    /// Loop until interrupted.
    #[arg(long = "loop")]
    looping: bool,
    /// Ring the terminal bell on every beat.
    #[arg(long)]
    metronome: bool,
    /// Start beat.
    #[arg(long, default_value_t = 0.0)]
    from: f64,
}

#[derive(Args)]
struct GenerateArgs {
    #[arg(long, default_value = "guitar")]
    instrument: Instrument,
    #[arg(long, default_value_t = 0)]
    min_fret: u8,
    #[arg(long, default_value_t = 12)]
    max_fret: u8,
    /// Strings to use, e.g. `--strings 1,2,3`. Defaults to all.
    #[arg(long, value_delimiter = ',')]
    strings: Vec<u8>,
    /// Notes in scale and random exercises.
    #[arg(long, default_value_t = 8)]
    count: usize,
    /// Write the exercise as YAML instead of printing it.
    #[arg(long)]
    save: Option<PathBuf>,
    /// Play the exercise right away.
    #[arg(long)]
    play: bool,
    #[command(flatten)]
    transport: TransportArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match EngineConfig::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::load(),
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let result = match cli.command {
        Command::Play { file, transport } => Exercise::load(&file)
            .map_err(|e| e.to_string())
            .and_then(|exercise| play(&config, exercise, &file, &transport)),
        Command::Show { file } => show(file),
        Command::Scale {
            key,
            scale,
            generate,
        } => generated(&config, Recipe::Scale { key, scale }, &generate),
        Command::Chords { chords, generate } => {
            generated(&config, Recipe::Progression(chords), &generate)
        }
        Command::Arpeggio {
            key,
            kind,
            generate,
        } => generated(&config, Recipe::Arpeggio { key, kind }, &generate),
        Command::Random { seed, generate } => {
            generated(&config, Recipe::Random { seed }, &generate)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn play(
    config: &EngineConfig,
    mut exercise: Exercise,
    source: &Path,
    args: &TransportArgs,
) -> Result<(), String> {
    // Command-line overrides go through the same reducer the UI would use.
    let mut state = TransportState::for_exercise(&exercise);
    if let Some(bpm) = args.bpm {
        state = handle(TransportEvent::SetBpm(bpm), &state);
    }
    state = handle(
        TransportEvent::SetLoop(args.looping || exercise.playback.loop_playback),
        &state,
    );
    state = handle(
        TransportEvent::SetMetronome(args.metronome || exercise.playback.metronome),
        &state,
    );
    state = handle(TransportEvent::SeekTo(args.from), &state);
    state = handle(TransportEvent::Play, &state);
    exercise.playback.bpm = state.bpm;
    exercise.playback.loop_playback = state.loop_playback;
    exercise.playback.metronome = state.metronome;

    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    ctrlc::set_handler(move || on_interrupt.cancel()).map_err(|e| e.to_string())?;

    let click_stop = CancelToken::new();
    let clicker = state.metronome.then(|| {
        let metronome = Metronome::new(state.bpm).with_click(config.click());
        let token = click_stop.clone();
        let poll = config.poll_interval();
        thread::spawn(move || {
            metronome.run(&token, poll, |on| {
                if on {
                    let mut err = std::io::stderr();
                    let _ = err.write_all(b"\x07");
                    let _ = err.flush();
                }
            })
        })
    });

    println!(
        "{} ({:?}, {} bpm{})",
        display_title(&exercise, source),
        exercise.instrument,
        state.bpm,
        if state.loop_playback { ", looping" } else { "" }
    );

    let driver = config.driver();
    let result = driver.drive(&exercise, &state, &cancel, |s| println!("{}", render(&s)));

    click_stop.cancel();
    if let Some(handle) = clicker {
        let _ = handle.join();
    }

    match result.map_err(|e| format!("playback failed: {e}"))? {
        DriveOutcome::Finished => println!("done."),
        DriveOutcome::Cancelled => println!("stopped."),
    }
    Ok(())
}

fn show(file: PathBuf) -> Result<(), String> {
    let exercise = Exercise::load(&file).map_err(|e| e.to_string())?;
    print_exercise(&exercise, &file);
    Ok(())
}

fn generated(config: &EngineConfig, recipe: Recipe, args: &GenerateArgs) -> Result<(), String> {
    let constraints = Constraints::for_instrument(args.instrument)
        .frets(args.min_fret, args.max_fret)
        .strings(args.strings.clone())
        .note_count(args.count);
    let exercise = recipe
        .exercise(&constraints, PlaybackSettings::default())
        .map_err(|e| e.to_string())?;
    if exercise.notes.is_empty() {
        return Err(format!(
            "no notes of '{}' fit frets {}-{} on the chosen strings",
            exercise.title, args.min_fret, args.max_fret
        ));
    }

    let source = PathBuf::from(&exercise.id);
    match &args.save {
        Some(path) => {
            let yaml = serde_yaml::to_string(&exercise).map_err(|e| e.to_string())?;
            std::fs::write(path, yaml)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            println!("wrote {}", path.display());
        }
        None if !args.play => print_exercise(&exercise, &source),
        None => {}
    }
    if args.play {
        play(config, exercise, &source, &args.transport)?;
    }
    Ok(())
}

fn print_exercise(exercise: &Exercise, source: &Path) {
    let notes = sorted_notes(&exercise.notes);

    println!("{}", display_title(exercise, source));
    println!(
        "{:?}, {} strings, {} bpm",
        exercise.instrument,
        exercise.instrument.string_count(),
        exercise.playback.bpm
    );
    for (i, note) in notes.iter().enumerate() {
        println!(
            "{i:>3}  beat {:>6.2}  len {:>5.2}  string {} fret {:>2}  {}",
            note.beat, note.duration, note.string, note.fret, note.label
        );
    }
    println!("total: {} beats", total_beats(&notes));
}

fn display_title(exercise: &Exercise, file: &Path) -> String {
    if exercise.title.is_empty() {
        file.display().to_string()
    } else {
        exercise.title.clone()
    }
}

fn render(state: &TransportState) -> String {
    let filled = (state.progress * BAR_WIDTH as f64).round() as usize;
    let bar: String = (0..BAR_WIDTH)
        .map(|i| if i < filled { '#' } else { '.' })
        .collect();
    let sounding: Vec<String> = state
        .highlighted_positions
        .iter()
        .map(fret_label)
        .collect();
    format!(
        "{} beat {:>6.2} [{bar}] {:>3.0}%  {}",
        if state.is_playing { '>' } else { '|' },
        state.current_beat,
        state.progress * 100.0,
        sounding.join(" ")
    )
}

fn fret_label(pos: &FretPosition) -> String {
    format!("s{}f{}({})", pos.string, pos.fret, pos.note)
}
