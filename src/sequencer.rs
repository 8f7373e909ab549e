//! Scheduling whole songs.

use tracing::{debug, trace, warn};

#[cfg(feature = "std")]
use thiserror::Error;

use crate::graph::{Graph, NodeKind, Param};
use crate::library::{Song, Track};
use crate::machine::InterpreterError;
use crate::synth::{ErrorPolicy, Synth};

/// A note failed while playing a song with `ErrorPolicy::Abort`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Error))]
pub enum PlayError {
    #[cfg_attr(
        feature = "std",
        error("Instrument failed on track {track}, voice {voice}, event {index}")
    )]
    Note {
        track: usize,
        voice: usize,
        index: usize,
        #[cfg_attr(feature = "std", source)]
        source: InterpreterError,
    },
}

/// Times reported after scheduling a song.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Nominal length of one pass, in seconds. The next pass should start
    /// this long after the current one, even though notes may still be
    /// releasing then.
    pub loop_time: f64,
    /// Time the last note of this pass has fully released.
    pub end_time: f64,
}

impl<'a> Synth<'a> {
    /// Schedule one pass of `song` starting at `t0`, sending its output to
    /// `destination`.
    pub fn play_song<G: Graph>(
        &mut self,
        graph: &mut G,
        song: &Song,
        destination: G::Node,
        t0: f64,
    ) -> Result<Timing, PlayError> {
        let mut end_time = t0;

        for (i, track) in song.tracks.iter().enumerate() {
            let out = mix_stage(graph, track, destination);

            for (v, voice) in track.voices.iter().enumerate() {
                let mut t = t0;

                for (index, (&value, &ticks)) in voice.iter().zip(&track.durations).enumerate() {
                    // Rests and zero pitches are silent
                    if let Some(pitch) = value.filter(|&pitch| pitch > 0) {
                        let gate_ticks = track.constant_duration.unwrap_or(ticks);
                        let gate = f64::from(gate_ticks) * song.tick_duration;
                        trace!(track = i, voice = v, pitch, start = t, gate, "Note");

                        match self.play_note(graph, track.instrument, out, t, gate, pitch) {
                            Ok(end) => {
                                if end > end_time {
                                    end_time = end;
                                }
                            }
                            Err(source) if self.policy == ErrorPolicy::Skip => {
                                warn!(track = i, voice = v, index, error = ?source, "Skipping note");
                            }
                            Err(source) => {
                                return Err(PlayError::Note {
                                    track: i,
                                    voice: v,
                                    index,
                                    source,
                                });
                            }
                        }
                    }

                    t += f64::from(ticks) * song.tick_duration;
                }
            }
        }

        let timing = Timing {
            loop_time: song.loop_time(),
            end_time,
        };
        debug!(start = t0, loop_time = timing.loop_time, end_time, "Scheduled song");

        Ok(timing)
    }
}

/// Create the gain stage for a track, and a panner after it if the track is
/// placed in the stereo field.
fn mix_stage<G: Graph>(graph: &mut G, track: &Track, destination: G::Node) -> G::Node {
    let gain = graph.create(NodeKind::Gain);
    graph.set_value(gain, Param::Gain, track.gain);

    match track.pan {
        Some(pan) => {
            let panner = graph.create(NodeKind::StereoPanner);
            graph.set_value(panner, Param::Pan, pan);
            graph.connect(gain, panner);
            graph.connect(panner, destination);
        }
        None => graph.connect(gain, destination),
    }

    gain
}
