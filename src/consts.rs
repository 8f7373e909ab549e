/// Number of distinct byte values the embedding layer can carry. Every byte in
/// a library is below this.
pub const ALPHABET: u8 = 125;

/// Raw value that decodes to zero for signed and pan parameters. As a track
/// pan code, it means no stereo placement.
pub const CENTER: u8 = (ALPHABET - 1) / 2;

pub(crate) const PITCH_MODULUS: u8 = ALPHABET - 6;

/// Pitch stream code for a rest on every voice not yet given a note this
/// tick. `REST_CODE + n` sets the number of active voices to `n`.
pub const REST_CODE: u8 = PITCH_MODULUS;

/// Pitch stream code ending a track.
pub const TRACK_END: u8 = ALPHABET - 1;

pub(crate) const INITIAL_PITCH: u8 = 60;

/// Most voices a track can have.
pub const MAX_VOICES: usize = (TRACK_END - REST_CODE - 1) as usize;

pub(crate) const SONG_HEADER_LENGTH: usize = 4;
pub(crate) const TRACK_LENGTH: usize = 4;

/// Tick duration codes are in units of 2 ms.
pub(crate) const TICKS_PER_SECOND: f64 = 500.0;
