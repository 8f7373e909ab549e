//! Decoding of the quantized values stored in libraries and programs.
//!
//! Most values are exponential: a byte `n` stands for `scale * EXPONENT^n`, so
//! each step is about 0.54 dB and the full alphabet spans roughly 66 dB.

use libm::pow;

use crate::consts::{ALPHABET, CENTER, TICKS_PER_SECOND};

pub const EXPONENT: f64 = 0.94;

/// Scale for frequencies, in Hz. Range: 9.3 Hz - 20 kHz.
pub const FREQUENCY_SCALE: f64 = 20e3;

/// Scale for times, in seconds. Range: 9.3 ms - 20 s.
pub const TIME_SCALE: f64 = 20.0;

pub const LINEAR_SCALE: f64 = 1.0;

/// Decode an exponentially quantized value.
pub fn decode(n: u8, scale: f64) -> f64 {
    scale * pow(EXPONENT, f64::from(n))
}

pub fn gain(n: u8) -> f64 {
    decode(n, LINEAR_SCALE)
}

pub fn time(n: u8) -> f64 {
    decode(n, TIME_SCALE)
}

pub fn frequency(n: u8) -> f64 {
    decode(n, FREQUENCY_SCALE)
}

/// The smallest value an exponential gain can take.
pub fn min_gain() -> f64 {
    gain(ALPHABET - 1)
}

/// Decode a signed integer centered in the alphabet.
pub fn signed(n: u8) -> f64 {
    f64::from(i16::from(n) - i16::from(CENTER))
}

/// Decode a stereo position, where -1 is fully left and 1 is fully right.
pub fn pan(n: u8) -> f64 {
    signed(n) / 60.0
}

/// Get the frequency of `note` shifted by the signed `offset` code, on the
/// 12-TET scale with A4 = 440 Hz at MIDI note 69.
pub fn note_frequency(note: u8, offset: u8) -> f64 {
    let semitones = f64::from(note) + signed(offset) - 69.0;
    440.0 * pow(2.0, semitones / 12.0)
}

/// Scale a uniform random number in `[0, 1)` to a bipolar jitter amount.
pub fn jitter(uniform: f64, n: u8) -> f64 {
    (uniform - 0.5) * 99.0 * pow(EXPONENT, f64::from(n))
}

pub fn tick_duration(code: u8) -> f64 {
    f64::from(code) / TICKS_PER_SECOND
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn decode_zero_is_scale() {
        assert_eq!(decode(0, 1.0), 1.0);
        assert_eq!(time(0), TIME_SCALE);
        assert_eq!(frequency(0), FREQUENCY_SCALE);
    }

    #[test]
    fn decode_is_exponential() {
        for n in 0..ALPHABET {
            assert_relative_eq!(
                decode(n, 7.5),
                7.5 * 0.94_f64.powi(i32::from(n)),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn decode_strictly_decreases() {
        for n in 1..ALPHABET {
            assert!(decode(n, 1.0) < decode(n - 1, 1.0));
        }
    }

    #[test]
    fn scale_ranges() {
        assert_relative_eq!(frequency(ALPHABET - 1), 9.3, epsilon = 0.05);
        assert_relative_eq!(time(ALPHABET - 1), 0.0093, epsilon = 0.00005);
    }

    #[test]
    fn signed_values() {
        assert_eq!(signed(CENTER), 0.0);
        assert_eq!(signed(0), -62.0);
        assert_eq!(signed(ALPHABET - 1), 62.0);
        assert_eq!(pan(CENTER), 0.0);
        assert_relative_eq!(pan(CENTER + 30), 0.5);
        assert_relative_eq!(pan(CENTER - 60), -1.0);
    }

    #[test]
    fn note_frequencies() {
        assert_relative_eq!(note_frequency(69, CENTER), 440.0);
        assert_relative_eq!(note_frequency(69, CENTER + 12), 880.0);
        assert_relative_eq!(note_frequency(57, CENTER), 220.0, max_relative = 1e-12);
    }

    #[test]
    fn jitter_is_bipolar() {
        assert_eq!(jitter(0.5, 0), 0.0);
        assert_relative_eq!(jitter(0.0, 0), -49.5);
        assert!(jitter(0.999, 10) > 0.0);
        assert!(jitter(0.999, 10) < jitter(0.999, 0));
    }
}
