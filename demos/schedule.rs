#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![forbid(unsafe_code)]

use byteorder::{ByteOrder as _, NativeEndian};
use bytesynth::{Command, DecodeError, LoopPlayer, MusicLibrary, PlayError, Recorder, Synth};
use colored::Colorize;
use error_iter::ErrorIter as _;
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing library-file argument\nUsage: schedule <library-file> [song-index] [seconds]")]
    MissingLibraryFilename,

    #[error("Invalid number `{0}`\nUsage: schedule <library-file> [song-index] [seconds]")]
    InvalidNumber(String),

    #[error("Library has no song {0}")]
    MissingSong(usize),

    #[error("Decode error")]
    Decode(#[from] DecodeError),

    #[error("Playback error")]
    Play(#[from] PlayError),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Random seed error: {0}")]
    Seed(String),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match schedule() {
        Err(e) => {
            eprintln!("{} {}", "error:".red(), e);

            for cause in e.sources().skip(1) {
                eprintln!("{} {}", "caused by:".bright_red(), cause);
            }

            ExitCode::FAILURE
        }
        Ok(()) => ExitCode::SUCCESS,
    }
}

fn parse<T: std::str::FromStr>(arg: Option<String>, default: T) -> Result<T, Error> {
    match arg {
        Some(arg) => arg.parse().map_err(|_| Error::InvalidNumber(arg)),
        None => Ok(default),
    }
}

fn schedule() -> Result<(), Error> {
    let mut args = std::env::args().skip(1);
    let filename = args.next().ok_or(Error::MissingLibraryFilename)?;
    let index = parse(args.next(), 0_usize)?;
    let seconds = parse(args.next(), 0.0_f64)?;

    let data = std::fs::read(filename)?;
    let library = MusicLibrary::from_slice(&data)?;
    let song = library.songs.get(index).ok_or(Error::MissingSong(index))?;
    println!(
        "{} {} tracks, {:.3} s per pass",
        "song:".green(),
        song.tracks.len(),
        song.loop_time()
    );

    // Create a seed for the PRNG
    let mut seed = [0_u8; 16];
    getrandom::getrandom(&mut seed).map_err(|e| Error::Seed(e.to_string()))?;
    let seed = (
        NativeEndian::read_u64(&seed[0..8]),
        NativeEndian::read_u64(&seed[8..16]),
    );
    let mut synth = Synth::new(&library, seed);

    // Step the recorder clock through the requested time, one 60 Hz frame at a time
    let mut graph = Recorder::new();
    let out = graph.destination();
    let mut player = LoopPlayer::new(index, 0.0, 0.1);
    let mut now = 0.0;
    loop {
        graph.set_now(now);
        player.update(&mut synth, &mut graph, out)?;
        now += 1.0 / 60.0;
        if now > seconds {
            break;
        }
    }

    for command in graph.commands() {
        match command {
            Command::Start { node, time } => {
                println!("{:>10.4} {} {:?}", time, "start".cyan(), graph.kind(*node));
            }
            Command::Stop { time, .. } => {
                println!("{:>10.4} {}", time, "stop".yellow());
            }
            _ => println!("{:>10} {:?}", "", command),
        }
    }
    println!(
        "{} {} passes, last note released at {:.3} s",
        "done:".green(),
        player.passes(),
        player.end_time()
    );

    Ok(())
}
