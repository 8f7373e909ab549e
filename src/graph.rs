//! The interface to the audio backend.
//!
//! The backend owns a real-time node graph, in the style of the Web Audio API.
//! Everything the synthesizer does to it is a time-stamped command: nodes are
//! created, wired together, given parameter automation, and oscillators are
//! started and stopped at absolute times on the backend's clock.

/// Available filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    LowPass,
    HighPass,
    BandPass,
}

/// Available wave forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Square,
    Saw,
    Triangle,
}

/// Kinds of nodes the synthesizer creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Gain,
    StereoPanner,
    Filter(Filter),
    Oscillator(Waveform),
}

/// Automatable node parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    /// Linear gain of a gain node.
    Gain,
    /// Stereo position of a panner, in `[-1, 1]`.
    Pan,
    /// Frequency in Hz, for filters and oscillators.
    Frequency,
    /// Detune in cents, for filters and oscillators.
    Detune,
    /// Filter quality factor.
    Q,
}

impl NodeKind {
    /// The parameters exposed to instrument programs, in operand order.
    pub fn params(self) -> &'static [Param] {
        match self {
            NodeKind::Gain => &[Param::Gain],
            NodeKind::StereoPanner => &[Param::Pan],
            NodeKind::Filter(_) => &[Param::Frequency, Param::Detune, Param::Q],
            NodeKind::Oscillator(_) => &[Param::Frequency, Param::Detune],
        }
    }

    /// Whether the node processes an input signal. Sources have no inputs.
    pub fn has_input(self) -> bool {
        !matches!(self, NodeKind::Oscillator(_))
    }
}

/// A signal graph backend.
///
/// Nodes are never reused between notes: every note creates its own subtree,
/// and oscillators stop themselves at their scheduled stop time.
pub trait Graph {
    /// Handle to a node owned by the backend.
    type Node: Copy;

    /// Current time on the backend clock, in seconds.
    fn now(&self) -> f64;

    fn create(&mut self, kind: NodeKind) -> Self::Node;

    /// Send the output of `node` to `destination`.
    fn connect(&mut self, node: Self::Node, destination: Self::Node);

    /// Set the initial value of a parameter.
    fn set_value(&mut self, node: Self::Node, param: Param, value: f64);

    fn set_value_at_time(&mut self, node: Self::Node, param: Param, value: f64, time: f64);

    /// Ramp exponentially from the previous event to `value`, reaching it at
    /// `time`.
    fn exponential_ramp_to_value_at_time(
        &mut self,
        node: Self::Node,
        param: Param,
        value: f64,
        time: f64,
    );

    /// Approach `target` exponentially from `time` on, with the given time
    /// constant.
    fn set_target_at_time(
        &mut self,
        node: Self::Node,
        param: Param,
        target: f64,
        time: f64,
        time_constant: f64,
    );

    fn start(&mut self, node: Self::Node, time: f64);

    fn stop(&mut self, node: Self::Node, time: f64);
}
