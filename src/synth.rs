use randomize::PCG32;

use crate::graph::Graph;
use crate::library::MusicLibrary;
use crate::machine::{InterpreterError, Machine, NoteOn};

/// What to do when an instrument program fails while a song is playing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Log the error, leave the note silent, and keep playing.
    #[default]
    Skip,
    /// Stop scheduling the song and return the error.
    Abort,
}

/// The main struct for playing music from a `MusicLibrary`.
///
/// A `Synth` does not produce samples itself. It schedules nodes and
/// automation on a `Graph` backend, which renders them on its own clock.
pub struct Synth<'a> {
    pub(crate) library: &'a MusicLibrary,
    pub(crate) random: PCG32,
    pub(crate) policy: ErrorPolicy,
}

impl<'a> Synth<'a> {
    /// Create a `Synth` that plays from the provided library.
    /// The seed is used for the random parameters in instrument programs.
    ///
    /// ```rust
    /// # use bytesynth::{MusicLibrary, Recorder, Synth};
    /// # let library = MusicLibrary::from_slice(&[1, 0, 0]).unwrap();
    /// let mut synth = Synth::new(&library, (0x5467_3a19, 0x69d4_a7a8));
    /// let mut graph = Recorder::new();
    /// let out = graph.destination();
    /// let end = synth.play_note(&mut graph, 0, out, 0.5, 0.25, 60)?;
    /// assert_eq!(end, 0.75);
    /// # Ok::<(), bytesynth::InterpreterError>(())
    /// ```
    pub fn new(library: &'a MusicLibrary, seed: (u64, u64)) -> Self {
        Synth {
            library,
            random: PCG32::seed(seed.0, seed.1),
            policy: ErrorPolicy::default(),
        }
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn library(&self) -> &'a MusicLibrary {
        self.library
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Play one note on an instrument.
    ///
    /// Builds the instrument's nodes in front of `out`, starting at `t0` and
    /// held for `gate` seconds, and returns the time the note has fully
    /// released.
    pub fn play_note<G: Graph>(
        &mut self,
        graph: &mut G,
        instrument: usize,
        out: G::Node,
        t0: f64,
        gate: f64,
        pitch: u8,
    ) -> Result<f64, InterpreterError> {
        let library = self.library;
        let instrument = library
            .instruments
            .get(instrument)
            .ok_or(InterpreterError::UnknownInstrument(instrument))?;
        let note = NoteOn { t0, gate, pitch };

        Machine::new(&instrument.program, graph, &mut self.random, out, note).run()
    }
}
