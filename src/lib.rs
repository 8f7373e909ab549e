//! Procedural music from compact bytecode.
//!
//! A `MusicLibrary` is decoded from a blob of bytes holding instrument
//! programs and songs. A `Synth` plays notes by running an instrument's program,
//! which builds a small graph of oscillators, filters, gains and panners on a
//! `Graph` backend and automates their parameters. Songs are scheduled one
//! pass at a time, and `LoopPlayer` keeps them looping against the backend
//! clock.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod consts;
mod cursor;
mod envelope;
mod graph;
mod library;
mod machine;
mod player;
mod program;
mod record;
mod sequencer;
mod synth;
pub mod value;

pub use consts::{ALPHABET, CENTER, MAX_VOICES, REST_CODE, TRACK_END};
pub use envelope::Adsr;
pub use graph::{Filter, Graph, NodeKind, Param, Waveform};
pub use library::{DecodeError, Instrument, MusicLibrary, Song, Track, Voice};
pub use machine::InterpreterError;
pub use player::LoopPlayer;
pub use program::{Opcode, ParamOpcode};
pub use record::{Command, NodeId, Recorder};
pub use sequencer::{PlayError, Timing};
pub use synth::{ErrorPolicy, Synth};
