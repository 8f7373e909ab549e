//! A `Graph` backend that only records the commands it receives.
//!
//! Useful for inspecting what a song or instrument would schedule without a
//! real audio backend, and as the backend in tests.

use alloc::vec::Vec;

use crate::graph::{Graph, NodeKind, Param};

/// Handle to a recorded node. The destination is always node 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// One command sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Create {
        node: NodeId,
        kind: NodeKind,
    },
    Connect {
        node: NodeId,
        destination: NodeId,
    },
    SetValue {
        node: NodeId,
        param: Param,
        value: f64,
    },
    SetValueAtTime {
        node: NodeId,
        param: Param,
        value: f64,
        time: f64,
    },
    ExponentialRamp {
        node: NodeId,
        param: Param,
        value: f64,
        time: f64,
    },
    SetTarget {
        node: NodeId,
        param: Param,
        target: f64,
        time: f64,
        time_constant: f64,
    },
    Start {
        node: NodeId,
        time: f64,
    },
    Stop {
        node: NodeId,
        time: f64,
    },
}

/// Records commands in the order they are issued.
#[derive(Debug, Default)]
pub struct Recorder {
    now: f64,
    kinds: Vec<NodeKind>,
    commands: Vec<Command>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The node standing for the backend output.
    pub fn destination(&self) -> NodeId {
        NodeId(0)
    }

    pub fn set_now(&mut self, now: f64) {
        self.now = now;
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Get the kind of a created node. The destination has no kind.
    pub fn kind(&self, node: NodeId) -> Option<NodeKind> {
        node.0
            .checked_sub(1)
            .and_then(|i| self.kinds.get(i))
            .copied()
    }

    /// Count the created nodes of the given kind.
    pub fn count(&self, kind: NodeKind) -> usize {
        self.kinds.iter().filter(|&&k| k == kind).count()
    }

    /// Total number of created nodes.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Get the node `node` is connected to, if any.
    pub fn destination_of(&self, node: NodeId) -> Option<NodeId> {
        self.commands.iter().find_map(|command| match *command {
            Command::Connect {
                node: n,
                destination,
            } if n == node => Some(destination),
            _ => None,
        })
    }

    /// Get the commands addressed to one parameter of one node.
    pub fn automation(&self, node: NodeId, param: Param) -> Vec<&Command> {
        self.commands
            .iter()
            .filter(|command| match **command {
                Command::SetValue { node: n, param: p, .. }
                | Command::SetValueAtTime { node: n, param: p, .. }
                | Command::ExponentialRamp { node: n, param: p, .. }
                | Command::SetTarget { node: n, param: p, .. } => n == node && p == param,
                _ => false,
            })
            .collect()
    }

    /// Get the `(start, stop)` times scheduled for a source.
    pub fn schedule(&self, node: NodeId) -> (Option<f64>, Option<f64>) {
        let mut start = None;
        let mut stop = None;
        for command in &self.commands {
            match *command {
                Command::Start { node: n, time } if n == node => start = Some(time),
                Command::Stop { node: n, time } if n == node => stop = Some(time),
                _ => {}
            }
        }

        (start, stop)
    }
}

impl Graph for Recorder {
    type Node = NodeId;

    fn now(&self) -> f64 {
        self.now
    }

    fn create(&mut self, kind: NodeKind) -> NodeId {
        self.kinds.push(kind);
        let node = NodeId(self.kinds.len());
        self.commands.push(Command::Create { node, kind });

        node
    }

    fn connect(&mut self, node: NodeId, destination: NodeId) {
        self.commands.push(Command::Connect { node, destination });
    }

    fn set_value(&mut self, node: NodeId, param: Param, value: f64) {
        self.commands.push(Command::SetValue { node, param, value });
    }

    fn set_value_at_time(&mut self, node: NodeId, param: Param, value: f64, time: f64) {
        self.commands.push(Command::SetValueAtTime {
            node,
            param,
            value,
            time,
        });
    }

    fn exponential_ramp_to_value_at_time(
        &mut self,
        node: NodeId,
        param: Param,
        value: f64,
        time: f64,
    ) {
        self.commands.push(Command::ExponentialRamp {
            node,
            param,
            value,
            time,
        });
    }

    fn set_target_at_time(
        &mut self,
        node: NodeId,
        param: Param,
        target: f64,
        time: f64,
        time_constant: f64,
    ) {
        self.commands.push(Command::SetTarget {
            node,
            param,
            target,
            time,
            time_constant,
        });
    }

    fn start(&mut self, node: NodeId, time: f64) {
        self.commands.push(Command::Start { node, time });
    }

    fn stop(&mut self, node: NodeId, time: f64) {
        self.commands.push(Command::Stop { node, time });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Waveform;

    #[test]
    fn records_nodes_and_wiring() {
        let mut graph = Recorder::new();
        let out = graph.destination();
        let gain = graph.create(NodeKind::Gain);
        let osc = graph.create(NodeKind::Oscillator(Waveform::Triangle));
        graph.connect(gain, out);
        graph.connect(osc, gain);
        graph.start(osc, 1.0);
        graph.stop(osc, 2.0);

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.kind(out), None);
        assert_eq!(graph.kind(gain), Some(NodeKind::Gain));
        assert_eq!(graph.count(NodeKind::Oscillator(Waveform::Triangle)), 1);
        assert_eq!(graph.destination_of(osc), Some(gain));
        assert_eq!(graph.destination_of(gain), Some(out));
        assert_eq!(graph.schedule(osc), (Some(1.0), Some(2.0)));
    }

    #[test]
    fn filters_automation_by_param() {
        let mut graph = Recorder::new();
        let gain = graph.create(NodeKind::Gain);
        let pan = graph.create(NodeKind::StereoPanner);
        graph.set_value(gain, Param::Gain, 0.5);
        graph.set_value(pan, Param::Pan, -0.5);
        graph.exponential_ramp_to_value_at_time(gain, Param::Gain, 1.0, 3.0);

        assert_eq!(graph.automation(gain, Param::Gain).len(), 2);
        assert_eq!(graph.automation(pan, Param::Pan).len(), 1);
        assert!(graph.automation(pan, Param::Gain).is_empty());
    }
}
