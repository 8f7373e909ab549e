//! The instrument instruction set.
//!
//! A program is a flat byte sequence. Each instruction is an `Opcode` byte,
//! followed for node opcodes by one `ParamOpcode` (plus its operands) per
//! parameter the node exposes.

use crate::graph::{Filter, NodeKind, Waveform};

/// Instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// Start a loop. Operand: number of extra passes.
    Repeat,
    /// End a loop started with `Repeat`.
    EndRepeat,
    /// Restore the previous output node.
    Pop,
    /// Create a node.
    Node(NodeKind),
}

/// How a node parameter gets its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamOpcode {
    /// Leave the backend default.
    Default,
    /// Exponential constant on the linear scale.
    Gain,
    /// Exponential constant on the time scale.
    Time,
    /// Exponential constant on the frequency scale.
    Frequency,
    /// Signed integer constant.
    Integer,
    /// Stereo position constant.
    Pan,
    /// ADSR envelope over the full gain range. Operands: a, d, s, r.
    GainEnvelope,
    /// ADSR envelope between two frequencies. Operands: min, max, a, d, s, r.
    FrequencyEnvelope,
    /// Frequency of the played note. Operand: signed semitone offset.
    Note,
    /// Random bipolar value. Operand: exponential amplitude.
    RandomBipolar,
}

const NODES: [NodeKind; 8] = [
    NodeKind::Gain,
    NodeKind::StereoPanner,
    NodeKind::Filter(Filter::LowPass),
    NodeKind::Filter(Filter::HighPass),
    NodeKind::Filter(Filter::BandPass),
    NodeKind::Oscillator(Waveform::Square),
    NodeKind::Oscillator(Waveform::Saw),
    NodeKind::Oscillator(Waveform::Triangle),
];

const FIRST_NODE: u8 = 3;

const PARAMS: [ParamOpcode; 10] = [
    ParamOpcode::Default,
    ParamOpcode::Gain,
    ParamOpcode::Time,
    ParamOpcode::Frequency,
    ParamOpcode::Integer,
    ParamOpcode::Pan,
    ParamOpcode::GainEnvelope,
    ParamOpcode::FrequencyEnvelope,
    ParamOpcode::Note,
    ParamOpcode::RandomBipolar,
];

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        Some(match byte {
            0 => Opcode::Repeat,
            1 => Opcode::EndRepeat,
            2 => Opcode::Pop,
            _ => Opcode::Node(*NODES.get(usize::from(byte - FIRST_NODE))?),
        })
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Opcode::Repeat => 0,
            Opcode::EndRepeat => 1,
            Opcode::Pop => 2,
            Opcode::Node(kind) => {
                let index = match kind {
                    NodeKind::Gain => 0,
                    NodeKind::StereoPanner => 1,
                    NodeKind::Filter(Filter::LowPass) => 2,
                    NodeKind::Filter(Filter::HighPass) => 3,
                    NodeKind::Filter(Filter::BandPass) => 4,
                    NodeKind::Oscillator(Waveform::Square) => 5,
                    NodeKind::Oscillator(Waveform::Saw) => 6,
                    NodeKind::Oscillator(Waveform::Triangle) => 7,
                };
                FIRST_NODE + index
            }
        }
    }
}

impl ParamOpcode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        PARAMS.get(usize::from(byte)).copied()
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Number of operand bytes following the opcode.
    pub fn operands(self) -> usize {
        match self {
            ParamOpcode::Default => 0,
            ParamOpcode::GainEnvelope => 4,
            ParamOpcode::FrequencyEnvelope => 6,
            _ => 1,
        }
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> u8 {
        opcode.to_byte()
    }
}

impl From<NodeKind> for u8 {
    fn from(kind: NodeKind) -> u8 {
        Opcode::Node(kind).to_byte()
    }
}

impl From<ParamOpcode> for u8 {
    fn from(opcode: ParamOpcode) -> u8 {
        opcode.to_byte()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_bytes() {
        assert_eq!(Opcode::from_byte(0), Some(Opcode::Repeat));
        assert_eq!(Opcode::from_byte(2), Some(Opcode::Pop));
        assert_eq!(Opcode::from_byte(3), Some(Opcode::Node(NodeKind::Gain)));
        assert_eq!(
            Opcode::from_byte(9),
            Some(Opcode::Node(NodeKind::Oscillator(Waveform::Saw)))
        );
        assert_eq!(Opcode::from_byte(11), None);
        assert_eq!(u8::from(NodeKind::Oscillator(Waveform::Triangle)), 10);
        assert_eq!(u8::from(NodeKind::Filter(Filter::HighPass)), 6);

        for byte in 0..11 {
            let opcode = Opcode::from_byte(byte).unwrap();
            assert_eq!(opcode.to_byte(), byte);
        }
    }

    #[test]
    fn param_opcode_bytes() {
        assert_eq!(ParamOpcode::from_byte(0), Some(ParamOpcode::Default));
        assert_eq!(ParamOpcode::from_byte(9), Some(ParamOpcode::RandomBipolar));
        assert_eq!(ParamOpcode::from_byte(10), None);
        assert_eq!(u8::from(ParamOpcode::FrequencyEnvelope), 7);
        assert_eq!(ParamOpcode::FrequencyEnvelope.operands(), 6);
        assert_eq!(ParamOpcode::Default.operands(), 0);
    }
}
