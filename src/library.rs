use alloc::vec::Vec;
use arrayvec::ArrayVec;
use tracing::{debug, trace};

#[cfg(feature = "std")]
use thiserror::Error;

use crate::consts::*;
use crate::cursor::{Cursor, Overrun};
use crate::value;

/// Possible errors while decoding a library.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Error))]
pub enum DecodeError {
    #[cfg_attr(feature = "std", error("Unexpected end of data at offset {position}"))]
    Overrun { position: usize },

    #[cfg_attr(
        feature = "std",
        error("Track {track} of song {song} uses unknown instrument {instrument}")
    )]
    UnknownInstrument {
        song: usize,
        track: usize,
        instrument: u8,
    },

    #[cfg_attr(
        feature = "std",
        error("Pitch stream code {code} in the middle of a tick at offset {position}")
    )]
    PartialTick { code: u8, position: usize },

    #[cfg_attr(feature = "std", error("Invalid pitch stream code {code} at offset {position}"))]
    InvalidCode { code: u8, position: usize },
}

impl From<Overrun> for DecodeError {
    fn from(overrun: Overrun) -> Self {
        DecodeError::Overrun {
            position: overrun.position,
        }
    }
}

/// Everything decoded from one blob of music data: instrument programs, and
/// songs that play them.
///
/// A library is immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct MusicLibrary {
    pub instruments: Vec<Instrument>,
    pub songs: Vec<Song>,
}

/// Bytecode for one instrument. See the `program` module for the instruction
/// set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub program: Vec<u8>,
}

/// A `Song` is a set of `Track`s sharing one tick length.
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    /// Length of a tick, in seconds.
    pub tick_duration: f64,
    /// Nominal length of the song, in ticks. The next loop starts after this
    /// many ticks, even while notes are still releasing.
    pub duration: u32,
    pub tracks: Vec<Track>,
}

/// One instrument part of a song, possibly with several voices.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Index into `MusicLibrary::instruments`.
    pub instrument: usize,
    /// Linear gain.
    pub gain: f64,
    /// Stereo position, or `None` for a track with no stereo placement.
    pub pan: Option<f64>,
    /// Note length in ticks used in place of the event durations.
    pub constant_duration: Option<u8>,
    pub voices: ArrayVec<Voice, MAX_VOICES>,
    /// Duration of each event, in ticks, shared by all voices.
    pub durations: Vec<u8>,
}

/// A sequence of notes. `None` is a rest.
pub type Voice = Vec<Option<u8>>;

impl Track {
    /// Sum of all event durations, in ticks.
    pub fn length_ticks(&self) -> u32 {
        self.durations.iter().map(|&d| u32::from(d)).sum()
    }
}

impl Song {
    /// Time until the last event of the longest track has passed, in seconds.
    /// Release tails are not included.
    pub fn length(&self) -> f64 {
        let ticks = self.tracks.iter().map(Track::length_ticks).max().unwrap_or(0);
        f64::from(ticks) * self.tick_duration
    }

    /// Nominal loop length, in seconds.
    pub fn loop_time(&self) -> f64 {
        self.tick_duration * f64::from(self.duration)
    }
}

impl MusicLibrary {
    /// Decode a library from a byte slice.
    ///
    /// ```rust
    /// # use bytesynth::MusicLibrary;
    /// // 1 instrument with an empty program, 1 song with 1 empty track
    /// let data = [1, 1, 0, 1, 100, 0, 16, 0, 0, 62, 0, 124];
    /// let library = MusicLibrary::from_slice(&data)?;
    /// assert_eq!(library.songs[0].tracks.len(), 1);
    /// # Ok::<(), bytesynth::DecodeError>(())
    /// ```
    pub fn from_slice(slice: &[u8]) -> Result<MusicLibrary, DecodeError> {
        let mut cursor = Cursor::new(slice);
        let [num_instruments, num_songs] = cursor.array::<2>()?;

        let mut instruments = Vec::with_capacity(usize::from(num_instruments));
        for _ in 0..num_instruments {
            let length = cursor.byte()?;
            let program = cursor.bytes(usize::from(length))?.to_vec();
            instruments.push(Instrument { program });
        }

        let mut songs = Vec::with_capacity(usize::from(num_songs));
        for i in 0..usize::from(num_songs) {
            songs.push(load_song(&mut cursor, i, instruments.len())?);
        }

        // Pitch streams for every track of every song, then durations
        for track in songs.iter_mut().flat_map(|song| song.tracks.iter_mut()) {
            track.voices = load_voices(&mut cursor)?;
        }
        for track in songs.iter_mut().flat_map(|song| song.tracks.iter_mut()) {
            let length = track.voices.first().map_or(0, Vec::len);
            track.durations = cursor.bytes(length)?.to_vec();
        }

        if !cursor.is_empty() {
            debug!(trailing = cursor.remaining(), "Ignoring trailing music data");
        }
        debug!(
            instruments = instruments.len(),
            songs = songs.len(),
            "Loaded music library"
        );

        Ok(MusicLibrary { instruments, songs })
    }
}

/// Load a song header and its track headers. Voices and durations are filled
/// in later.
fn load_song(cursor: &mut Cursor, song: usize, num_instruments: usize) -> Result<Song, DecodeError> {
    let [num_tracks, tick_code, loop_hi, loop_lo] = cursor.array::<SONG_HEADER_LENGTH>()?;
    let duration = u32::from(loop_hi) * u32::from(ALPHABET) + u32::from(loop_lo);

    let mut tracks = Vec::with_capacity(usize::from(num_tracks));
    for track in 0..usize::from(num_tracks) {
        let [instrument, gain_code, pan_code, constant_duration] =
            cursor.array::<TRACK_LENGTH>()?;
        if usize::from(instrument) >= num_instruments {
            return Err(DecodeError::UnknownInstrument {
                song,
                track,
                instrument,
            });
        }

        tracks.push(Track {
            instrument: usize::from(instrument),
            gain: value::gain(gain_code),
            pan: if pan_code == CENTER {
                None
            } else {
                Some(value::pan(pan_code))
            },
            constant_duration: if constant_duration == 0 {
                None
            } else {
                Some(constant_duration)
            },
            voices: ArrayVec::new(),
            durations: Vec::new(),
        });
    }

    Ok(Song {
        tick_duration: value::tick_duration(tick_code),
        duration,
        tracks,
    })
}

/// Decode one track's pitch stream.
///
/// Each tick takes one delta per active voice, or a single rest code for the
/// whole tick. Voices that are not active get a rest, so all voices always
/// have the same length.
fn load_voices(cursor: &mut Cursor) -> Result<ArrayVec<Voice, MAX_VOICES>, DecodeError> {
    let mut voices = ArrayVec::<Voice, MAX_VOICES>::new();
    voices.push(Vec::new());
    let mut pitches = [INITIAL_PITCH; MAX_VOICES];
    let mut active = 1;
    let mut ticks = 0;

    // Next voice to receive a value in the current tick
    let mut lane = 0;

    loop {
        let position = cursor.position();
        let code = cursor.byte()?;

        match code {
            TRACK_END => {
                if lane != 0 {
                    return Err(DecodeError::PartialTick { code, position });
                }
                break;
            }
            REST_CODE => {
                for voice in &mut voices[lane..active] {
                    voice.push(None);
                }
                lane = active;
            }
            code if code > TRACK_END => {
                return Err(DecodeError::InvalidCode { code, position });
            }
            code if code > REST_CODE => {
                if lane != 0 {
                    return Err(DecodeError::PartialTick { code, position });
                }
                active = usize::from(code - REST_CODE);
                while voices.len() < active {
                    voices.push(alloc::vec![None; ticks]);
                }
                trace!(voices = active, position, "Voice count changed");
                continue;
            }
            delta => {
                let pitch = (pitches[lane] + delta) % PITCH_MODULUS;
                pitches[lane] = pitch;
                voices[lane].push(Some(pitch));
                lane += 1;
            }
        }

        if lane == active {
            for voice in &mut voices[active..] {
                voice.push(None);
            }
            ticks += 1;
            lane = 0;
        }
    }

    Ok(voices)
}
