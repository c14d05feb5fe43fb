//! Read-only reports on the basis-state content of a register.

use std::fmt;
use num_complex::Complex64 as C64;
use crate::{ config::EPS, linalg };

/// A single nonzero basis-state term of a register, with selected groups of
/// qubits read out as binary strings and integers.
#[derive(Clone, Debug, PartialEq)]
pub struct State {
    /// Amplitude, with components within [`EPS`] of zero snapped to zero.
    pub amplitude: C64,
    /// Squared magnitude of the amplitude.
    pub probability: f64,
    /// For each requested group, the value of its qubits as an integer.
    pub int: Vec<usize>,
    /// For each requested group, the value of its qubits as a binary string.
    pub binary: Vec<String>,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.binary.join(" "))?;
        write!(f, "[")?;
        for (k, v) in self.int.iter().enumerate() {
            write!(f, "{:>3}", v)?;
            if k < self.int.len() - 1 { write!(f, " ")?; }
        }
        write!(f, "]")?;
        write!(
            f,
            "({:+.4} {:+.4}i): {:.4}",
            self.amplitude.re, self.amplitude.im, self.probability,
        )
    }
}

impl State {
    /// Build the report for basis index `index` of an `n`-qubit register.
    ///
    /// Each group's bits are read in the order given, first listed qubit most
    /// significant. Indices must already be validated.
    pub(crate) fn new(
        index: usize,
        n: usize,
        amp: C64,
        groups: &[&[usize]],
    ) -> Self
    {
        let (int, binary): (Vec<usize>, Vec<String>)
            = groups.iter()
            .map(|group| {
                let v = linalg::gather(index, n, group);
                let s: String
                    = group.iter()
                    .map(|&k| if linalg::bit(index, n, k) { '1' } else { '0' })
                    .collect();
                (v, s)
            })
            .unzip();
        Self { amplitude: round(amp), probability: amp.norm_sqr(), int, binary }
    }

    /// Return the `k`-th group's binary string, if it exists.
    pub fn binary_string(&self, k: usize) -> Option<&str> {
        self.binary.get(k).map(|s| s.as_str())
    }
}

/// Snap real and imaginary parts within [`EPS`] of zero to exactly zero.
pub fn round(a: C64) -> C64 {
    let snap = |x: f64| if x.abs() < EPS { 0.0 } else { x };
    C64::new(snap(a.re), snap(a.im))
}
