//! Numerical tolerances and per-register engine settings.

use num_complex::Complex64 as C64;
use rand::{ rngs::StdRng, SeedableRng };

/// Magnitude below which an amplitude component is reported as exactly zero.
pub const EPS: f64 = 1e-13;

/// Absolute/relative tolerance used for approximate comparisons.
///
/// Two values `a` and `b` compare equal when `|a - b| <= abs + rel * |b|`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tolerance {
    pub abs: f64,
    pub rel: f64,
}

/// Creates [`Tolerance::LOOSE`].
impl Default for Tolerance {
    fn default() -> Self { Self::LOOSE }
}

impl Tolerance {
    /// Purely absolute tolerance of `1e-13`.
    pub const STRICT: Self = Self { abs: EPS, rel: 0.0 };

    /// Absolute tolerance of `1e-8` with relative tolerance `1e-5`.
    pub const LOOSE: Self = Self { abs: 1e-8, rel: 1e-5 };

    /// Create a new purely absolute tolerance.
    pub fn abs(abs: f64) -> Self { Self { abs, rel: 0.0 } }

    /// Compare two real numbers.
    pub fn eq(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.abs + self.rel * b.abs()
    }

    /// Compare two complex numbers by the modulus of their difference.
    pub fn eq_c(&self, a: C64, b: C64) -> bool {
        (a - b).norm() <= self.abs + self.rel * b.norm()
    }

    /// Return `true` if `a` is within tolerance of zero.
    pub fn is_zero(&self, a: f64) -> bool { a.abs() <= self.abs }
}

/// Qubit count at and above which dense operators are applied in parallel.
pub const PAR_THRESHOLD: usize = 12;

/// Settings fixed for the lifetime of a register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Seed for the register's measurement generator; drawn from system
    /// entropy if `None`.
    pub seed: Option<u64>,
    /// Registers with at least this many qubits apply dense operators across
    /// output rows in parallel.
    pub par_threshold: usize,
}

impl Default for Config {
    fn default() -> Self { Self { seed: None, par_threshold: PAR_THRESHOLD } }
}

impl Config {
    /// Default settings with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed), ..Self::default() }
    }

    pub(crate) fn make_rng(&self) -> StdRng {
        self.seed
            .map(StdRng::seed_from_u64)
            .unwrap_or_else(StdRng::from_entropy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_tolerance_scales_with_magnitude() {
        let tol = Tolerance::LOOSE;
        assert!(tol.eq(1.0, 1.0 + 5e-6));
        assert!(!tol.eq(1.0, 1.0 + 1e-3));
        assert!(tol.eq(1e6, 1e6 + 5.0));
    }

    #[test]
    fn strict_tolerance_is_absolute() {
        let tol = Tolerance::STRICT;
        assert!(tol.eq(0.5, 0.5 + 1e-14));
        assert!(!tol.eq(1e6, 1e6 + 1e-6));
        assert!(tol.eq_c(C64::new(0.0, 1.0), C64::new(1e-14, 1.0)));
    }
}
