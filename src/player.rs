//! Looping playback against the backend clock.

use libm::ceil;
use tracing::debug;

use crate::graph::Graph;
use crate::sequencer::PlayError;
use crate::synth::Synth;

/// Plays a song over and over.
///
/// Call `update` regularly (e.g. once per frame). Each pass is scheduled
/// `lookahead` seconds before it starts, and starts exactly one loop time
/// after the previous pass, so release tails of one pass overlap the start of
/// the next. Passes whose start has already gone by when `update` is called
/// (after a stall) are skipped, and playback resumes on the next loop
/// boundary.
#[derive(Debug, Clone)]
pub struct LoopPlayer {
    song: usize,
    next_start: f64,
    end_time: f64,
    lookahead: f64,
    passes: u32,
    skipped: u32,
    finished: bool,
}

impl LoopPlayer {
    /// Create a player for the song at index `song` in the library, with the
    /// first pass starting at `start` on the backend clock.
    pub fn new(song: usize, start: f64, lookahead: f64) -> Self {
        LoopPlayer {
            song,
            next_start: start,
            end_time: start,
            lookahead,
            passes: 0,
            skipped: 0,
            finished: false,
        }
    }

    /// Start time of the next pass that has not been scheduled yet.
    pub fn next_start(&self) -> f64 {
        self.next_start
    }

    /// Time the latest scheduled note has fully released.
    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    /// Number of passes scheduled so far.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Number of passes dropped because their start was already in the past.
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    /// Schedule every pass that starts within the lookahead window. Returns
    /// whether anything was scheduled.
    ///
    /// A song without a positive loop time is only played once. A song index
    /// missing from the library plays nothing.
    pub fn update<G: Graph>(
        &mut self,
        synth: &mut Synth,
        graph: &mut G,
        destination: G::Node,
    ) -> Result<bool, PlayError> {
        let song = match synth.library().songs.get(self.song) {
            Some(song) => song,
            None => return Ok(false),
        };

        let loop_time = song.loop_time();
        let now = graph.now();
        if !self.finished && loop_time > 0.0 && self.next_start + loop_time <= now {
            // Jump to the first loop boundary at or after now
            let missed = ceil((now - self.next_start) / loop_time);
            self.next_start += missed * loop_time;
            self.skipped += missed as u32;
            debug!(song = self.song, missed, next_start = self.next_start, "Skipped late passes");
        }

        let mut scheduled = false;
        while !self.finished && graph.now() + self.lookahead >= self.next_start {
            let timing = synth.play_song(graph, song, destination, self.next_start)?;
            debug!(song = self.song, pass = self.passes, start = self.next_start, "Scheduled pass");

            if timing.end_time > self.end_time {
                self.end_time = timing.end_time;
            }
            self.passes += 1;
            scheduled = true;

            if timing.loop_time > 0.0 {
                self.next_start += timing.loop_time;
            } else {
                self.finished = true;
            }
        }

        Ok(scheduled)
    }
}
