//! ADSR envelopes built from parameter automation.
//!
//! For a note held longer than the attack, the shape is:
//!
//! ```text
//! (t0, x0) -> (t0 + ta, x1) -> decay toward xs -> (t0 + gate, pinned) -> (t0 + gate + tr, x0)
//! ```
//!
//! The decay is an exponential approach toward the sustain level. Before the
//! release ramp starts, the parameter is pinned to the value the decay curve
//! has at gate close, so switching automation types does not jump.

use libm::{exp, pow};

use crate::consts::ALPHABET;
use crate::graph::{Graph, Param};
use crate::value;

/// A decoded envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adsr {
    /// Time to rise from the minimum to the peak, in seconds.
    pub attack: f64,
    /// Time constant of the decay toward the sustain level, in seconds.
    pub decay: f64,
    /// Sustain code. 0 sustains at the peak, `ALPHABET - 1` at the minimum.
    pub sustain: u8,
    /// Time to fall back to the minimum after the gate closes, in seconds.
    pub release: f64,
}

impl Adsr {
    pub fn from_codes([attack, decay, sustain, release]: [u8; 4]) -> Self {
        Adsr {
            attack: value::time(attack),
            decay: value::time(decay),
            sustain,
            release: value::time(release),
        }
    }

    /// Sustain plateau between minimum `x0` and peak `x1`.
    pub fn sustain_level(&self, x0: f64, x1: f64) -> f64 {
        let exponent = f64::from(self.sustain) / f64::from(ALPHABET - 1);
        x1 * pow(x0 / x1, exponent)
    }

    /// Value of the decay curve `elapsed` seconds after the attack ends.
    pub fn decay_value(&self, x0: f64, x1: f64, elapsed: f64) -> f64 {
        let xs = self.sustain_level(x0, x1);
        xs + (x1 - xs) / exp(elapsed / self.decay)
    }

    /// How long the envelope lasts, from note start, for a note held for
    /// `gate` seconds.
    pub fn duration(&self, gate: f64) -> f64 {
        if gate > self.attack {
            gate + self.release
        } else {
            self.attack + self.release
        }
    }

    /// Schedule the envelope on a parameter and return its duration.
    #[allow(clippy::too_many_arguments)]
    pub fn schedule<G: Graph>(
        &self,
        graph: &mut G,
        node: G::Node,
        param: Param,
        x0: f64,
        x1: f64,
        t0: f64,
        gate: f64,
    ) -> f64 {
        graph.set_value_at_time(node, param, x0, t0);
        graph.exponential_ramp_to_value_at_time(node, param, x1, t0 + self.attack);

        let held = gate - self.attack;
        if held > 0.0 {
            // Gate closes after the attack, so the decay stage happens.
            let xs = self.sustain_level(x0, x1);
            graph.set_target_at_time(node, param, xs, t0 + self.attack, self.decay);
            let pinned = self.decay_value(x0, x1, held);
            graph.set_value_at_time(node, param, pinned, t0 + gate);
            graph.exponential_ramp_to_value_at_time(node, param, x0, t0 + gate + self.release);
        } else {
            // Gate closes during the attack: release right after it.
            graph.exponential_ramp_to_value_at_time(
                node,
                param,
                x0,
                t0 + self.attack + self.release,
            );
        }

        self.duration(gate)
    }
}
