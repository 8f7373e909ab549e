//! The instrument interpreter.
//!
//! A `Machine` runs one instrument program for one note. It scans the program
//! once, building a tree of nodes that ends at the output it was given.
//! Processing nodes (gains, filters, panners) become the new output for the
//! nodes after them, with the previous output saved on a stack. Oscillators
//! are leaves. Once the whole program has run, every oscillator is started at
//! the note start and stopped when the longest envelope has finished.

use alloc::vec::Vec;
use randomize::PCG32;

use crate::cursor::{Cursor, Overrun};
use crate::envelope::Adsr;
use crate::graph::{Graph, NodeKind, Param};
use crate::program::{Opcode, ParamOpcode};
use crate::value;

#[cfg(feature = "std")]
use thiserror::Error;

/// Errors raised while interpreting an instrument program.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Error))]
pub enum InterpreterError {
    #[cfg_attr(feature = "std", error("Unknown instrument {0}"))]
    UnknownInstrument(usize),

    #[cfg_attr(feature = "std", error("Invalid opcode {opcode} at offset {position}"))]
    InvalidOpcode { opcode: u8, position: usize },

    #[cfg_attr(
        feature = "std",
        error("Invalid parameter opcode {opcode} at offset {position}")
    )]
    InvalidParamOpcode { opcode: u8, position: usize },

    #[cfg_attr(feature = "std", error("Program overrun at offset {position}"))]
    Overrun { position: usize },

    #[cfg_attr(feature = "std", error("Cannot pop node at offset {position}"))]
    EmptyStack { position: usize },

    #[cfg_attr(feature = "std", error("Unexpected end repeat at offset {position}"))]
    UnexpectedEndRepeat { position: usize },

    #[cfg_attr(feature = "std", error("Negative repeat count at offset {position}"))]
    NegativeRepeatCount { position: usize },
}

impl From<Overrun> for InterpreterError {
    fn from(overrun: Overrun) -> Self {
        InterpreterError::Overrun {
            position: overrun.position,
        }
    }
}

/// State saved at the start of a loop.
#[derive(Debug, Clone)]
struct Repeat<N> {
    count: i32,
    resume: usize,
    out: N,
    stack: Vec<N>,
}

/// Note being rendered.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NoteOn {
    pub(crate) t0: f64,
    pub(crate) gate: f64,
    pub(crate) pitch: u8,
}

pub(crate) struct Machine<'a, 'g, G: Graph> {
    program: Cursor<'a>,
    graph: &'g mut G,
    random: &'g mut PCG32,
    note: NoteOn,

    // Interpreter state
    out: G::Node,
    stack: Vec<G::Node>,
    repeat: Option<Repeat<G::Node>>,
    sources: Vec<G::Node>,
    duration: f64,
}

impl<'a, 'g, G: Graph> Machine<'a, 'g, G> {
    pub(crate) fn new(
        program: &'a [u8],
        graph: &'g mut G,
        random: &'g mut PCG32,
        out: G::Node,
        note: NoteOn,
    ) -> Self {
        Machine {
            program: Cursor::new(program),
            graph,
            random,
            note,
            out,
            stack: Vec::new(),
            repeat: None,
            sources: Vec::new(),
            duration: note.gate,
        }
    }

    /// Run the program to completion and return the time the note ends.
    ///
    /// On error, no oscillator has been started, so the partial graph stays
    /// silent.
    pub(crate) fn run(mut self) -> Result<f64, InterpreterError> {
        while !self.program.is_empty() {
            let position = self.program.position();
            let byte = self.program.byte()?;
            let opcode = Opcode::from_byte(byte)
                .ok_or(InterpreterError::InvalidOpcode { opcode: byte, position })?;

            self.execute(opcode, position)?;
        }

        let t0 = self.note.t0;
        let end = t0 + self.duration;
        for &source in &self.sources {
            self.graph.start(source, t0);
            self.graph.stop(source, end);
        }

        Ok(end)
    }

    fn execute(&mut self, opcode: Opcode, position: usize) -> Result<(), InterpreterError> {
        match opcode {
            Opcode::Repeat => {
                let count = self.program.byte()?;
                self.repeat = Some(Repeat {
                    count: i32::from(count),
                    resume: self.program.position(),
                    out: self.out,
                    stack: self.stack.clone(),
                });
            }
            Opcode::EndRepeat => {
                let repeat = self
                    .repeat
                    .as_mut()
                    .ok_or(InterpreterError::UnexpectedEndRepeat { position })?;
                if repeat.count < 0 {
                    return Err(InterpreterError::NegativeRepeatCount { position });
                }

                self.out = repeat.out;
                self.stack.clone_from(&repeat.stack);
                if repeat.count > 0 {
                    self.program.seek(repeat.resume);
                }
                repeat.count -= 1;
            }
            Opcode::Pop => {
                self.out = self
                    .stack
                    .pop()
                    .ok_or(InterpreterError::EmptyStack { position })?;
            }
            Opcode::Node(kind) => self.add_node(kind)?,
        }

        Ok(())
    }

    fn add_node(&mut self, kind: NodeKind) -> Result<(), InterpreterError> {
        let node = self.graph.create(kind);
        for &param in kind.params() {
            self.set_param(node, param)?;
        }

        self.graph.connect(node, self.out);
        if kind.has_input() {
            self.stack.push(self.out);
            self.out = node;
        } else {
            self.sources.push(node);
        }

        Ok(())
    }

    fn set_param(&mut self, node: G::Node, param: Param) -> Result<(), InterpreterError> {
        let position = self.program.position();
        let byte = self.program.byte()?;
        let opcode = ParamOpcode::from_byte(byte)
            .ok_or(InterpreterError::InvalidParamOpcode { opcode: byte, position })?;

        let value = match opcode {
            ParamOpcode::Default => return Ok(()),
            ParamOpcode::Gain => value::gain(self.program.byte()?),
            ParamOpcode::Time => value::time(self.program.byte()?),
            ParamOpcode::Frequency => value::frequency(self.program.byte()?),
            ParamOpcode::Integer => value::signed(self.program.byte()?),
            ParamOpcode::Pan => value::pan(self.program.byte()?),
            ParamOpcode::GainEnvelope => {
                let adsr = Adsr::from_codes(self.program.array()?);
                self.envelope(node, param, adsr, value::min_gain(), 1.0);
                return Ok(());
            }
            ParamOpcode::FrequencyEnvelope => {
                let [min, max] = self.program.array::<2>()?;
                let adsr = Adsr::from_codes(self.program.array()?);
                let (x0, x1) = (value::frequency(min), value::frequency(max));
                self.envelope(node, param, adsr, x0, x1);
                return Ok(());
            }
            ParamOpcode::Note => value::note_frequency(self.note.pitch, self.program.byte()?),
            ParamOpcode::RandomBipolar => {
                let uniform = f64::from(self.random.next_u32()) / 4_294_967_296.0;
                value::jitter(uniform, self.program.byte()?)
            }
        };

        self.graph.set_value(node, param, value);

        Ok(())
    }

    fn envelope(&mut self, node: G::Node, param: Param, adsr: Adsr, x0: f64, x1: f64) {
        let NoteOn { t0, gate, .. } = self.note;
        let duration = adsr.schedule(self.graph, node, param, x0, x1, t0, gate);
        if duration > self.duration {
            self.duration = duration;
        }
    }
}
