//! Density-matrix description of (possibly mixed) register states.
//!
//! A [`Density`] is built from a weighted ensemble of pure [`Qubit`]s as
//! `ρ = Σ p_i ∣ψ_i⟩⟨ψ_i∣` and supports unitary evolution, expectation values,
//! partial traces over arbitrary subsets of qubits, and a few simple
//! single-parameter noise channels.

use nalgebra as na;
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    config::Tolerance,
    error::{ Error, Result },
    gate::{ self, Mat2, Operator },
    linalg,
    qubit::{ Outcome, Qubit },
};

/// A `2^n × 2^n` density matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct Density {
    pub(crate) n: usize,
    pub(crate) rho: na::DMatrix<C64>,
}

impl From<&Qubit> for Density {
    fn from(q: &Qubit) -> Self {
        Self { n: q.n, rho: linalg::outer_prod(&q.amps, &q.amps) }
    }
}

fn check_probability(p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) { Ok(()) } else { Err(Error::InvalidProbability(p)) }
}

impl Density {
    /// Build the mixed state of an ensemble of pure states.
    ///
    /// Weights need not sum to 1 and are normalized first. All states must
    /// have the same number of qubits.
    pub fn from_ensemble(ensemble: &[(f64, &Qubit)]) -> Result<Self> {
        let Some((_, first)) = ensemble.first()
            else { return Err(Error::EmptyEnsemble); };
        let dim = first.dim();
        let mut total: f64 = 0.0;
        for (p, q) in ensemble.iter() {
            if !p.is_finite() || *p < 0.0 { return Err(Error::InvalidProbability(*p)); }
            if q.dim() != dim {
                return Err(Error::DimensionMismatch { expected: dim, actual: q.dim() });
            }
            total += p;
        }
        if total == 0.0 { return Err(Error::EmptyEnsemble); }
        let rho
            = ensemble.iter()
            .filter(|(p, _)| *p > 0.0)
            .fold(
                na::DMatrix::<C64>::zeros(dim, dim),
                |acc, (p, q)| {
                    acc + linalg::outer_prod(&q.amps, &q.amps) * C64::from(p / total)
                }
            );
        debug!(n = first.n, terms = ensemble.len(), "built density matrix");
        Ok(Self { n: first.n, rho })
    }

    /// Pure-state density matrix `∣ψ⟩⟨ψ∣`.
    pub fn from_qubit(q: &Qubit) -> Self { Self::from(q) }

    /// Wrap a matrix, checking that it is square with power-of-two size.
    ///
    /// No check is made that the matrix is a valid density matrix; see
    /// [`Self::is_valid`].
    pub fn from_matrix(rho: na::DMatrix<C64>) -> Result<Self> {
        if !rho.is_square() {
            return Err(Error::DimensionMismatch {
                expected: rho.nrows(),
                actual: rho.ncols(),
            });
        }
        let n = linalg::log2_dim(rho.nrows())?;
        Ok(Self { n, rho })
    }

    /// Return the number of qubits.
    pub fn num_qubits(&self) -> usize { self.n }

    /// Return the number of rows (and columns).
    pub fn dim(&self) -> usize { self.rho.nrows() }

    /// Return a reference to the underlying matrix.
    pub fn matrix(&self) -> &na::DMatrix<C64> { &self.rho }

    fn check_dim(&self, dim: usize) -> Result<()> {
        if dim == self.dim() {
            Ok(())
        } else {
            Err(Error::DimensionMismatch { expected: self.dim(), actual: dim })
        }
    }

    /// Evolve under a unitary, `ρ → U ρ U†`.
    pub fn apply(&mut self, op: &Operator) -> Result<&mut Self> {
        self.check_dim(op.dim())?;
        match op {
            Operator::Diagonal(d) => {
                self.rho.iter_mut()
                    .enumerate()
                    .for_each(|(k, r)| {
                        // column-major storage
                        let (i, j) = (k % d.len(), k / d.len());
                        *r *= d[i] * d[j].conj();
                    });
            },
            Operator::Dense(u) => {
                self.rho = u * &self.rho * u.adjoint();
            },
        }
        Ok(self)
    }

    /// Probability of finding the system in the pure state `q`,
    /// `Tr(ρ ∣q⟩⟨q∣) = ⟨q∣ρ∣q⟩`.
    pub fn probability(&self, q: &Qubit) -> Result<f64> {
        self.check_dim(q.dim())?;
        Ok(q.amps.dotc(&(&self.rho * &q.amps)).re)
    }

    /// Expectation value `Tr(ρ O)`, real part only.
    pub fn expectation(&self, op: &Operator) -> Result<f64> {
        self.check_dim(op.dim())?;
        let val: C64 = match op {
            Operator::Diagonal(d) => {
                self.rho.diagonal().iter().zip(d.iter()).map(|(r, o)| r * o).sum()
            },
            Operator::Dense(o) => linalg::trace(&(&self.rho * o)),
        };
        Ok(val.re)
    }

    /// Marginal probability of finding qubit `k` in `outcome`.
    pub fn measure_probability(&self, k: usize, outcome: Outcome) -> Result<f64> {
        linalg::check_qubit(self.n, k)?;
        let want = outcome.is_one();
        let p
            = self.rho.diagonal().iter().enumerate()
            .filter(|(i, _)| linalg::bit(*i, self.n, k) == want)
            .map(|(_, r)| r.re)
            .sum();
        Ok(p)
    }

    /// `Tr(ρ)`, real part only.
    pub fn trace(&self) -> f64 { linalg::trace(&self.rho).re }

    /// Purity `Tr(ρ²)`, real part only.
    pub fn purity(&self) -> f64 {
        // Tr(ρ²) = Σ_ij ρ_ij ρ_ji
        let d = self.dim();
        (0..d)
            .flat_map(|i| (0..d).map(move |j| (i, j)))
            .map(|(i, j)| (self.rho[(i, j)] * self.rho[(j, i)]).re)
            .sum()
    }

    /// Return `true` if `ρ = ρ†` within tolerance.
    pub fn is_hermitian(&self, tol: Option<Tolerance>) -> bool {
        linalg::is_hermitian(&self.rho, tol.unwrap_or_default())
    }

    /// Return `true` if `ρ` is Hermitian with unit trace and purity in
    /// `(0, 1]`, all within tolerance.
    pub fn is_valid(&self, tol: Option<Tolerance>) -> bool {
        let tol = tol.unwrap_or_default();
        let purity = self.purity();
        self.is_hermitian(Some(tol))
            && tol.eq(self.trace(), 1.0)
            && purity > 0.0
            && purity <= 1.0 + tol.abs
    }

    /// Trace out the listed qubits, returning the reduced state of the rest.
    ///
    /// The remaining qubits keep their relative order. The order of `traced`
    /// is irrelevant.
    pub fn partial_trace(&self, traced: &[usize]) -> Result<Self> {
        linalg::check_qubits(self.n, traced)?;
        let kept: Vec<usize>
            = (0..self.n).filter(|k| !traced.contains(k)).collect();
        let dk: usize = 1 << kept.len();
        let de: usize = 1 << traced.len();
        let full_index = |vk: usize, ve: usize| {
            linalg::scatter(vk, self.n, &kept) | linalg::scatter(ve, self.n, traced)
        };
        let mut out: na::DMatrix<C64> = na::DMatrix::zeros(dk, dk);
        for ((ik, jk), e) in
            (0..dk).flat_map(|i| (0..dk).map(move |j| (i, j)))
                .flat_map(|ij| (0..de).map(move |e| (ij, e)))
        {
            out[(ik, jk)] += self.rho[(full_index(ik, e), full_index(jk, e))];
        }
        debug!(n = self.n, ?traced, "partial trace");
        Ok(Self { n: kept.len(), rho: out })
    }

    /// Depolarizing channel on the whole register,
    /// `ρ → (1 - p) ρ + p I / 2^n`.
    pub fn depolarizing(&self, p: f64) -> Result<Self> {
        check_probability(p)?;
        let d = self.dim();
        let mixed: na::DMatrix<C64>
            = na::DMatrix::identity(d, d) * C64::from(p / d as f64);
        Ok(Self { n: self.n, rho: &self.rho * C64::from(1.0 - p) + mixed })
    }

    // ρ → (1 - p) ρ + p P ρ P† with P acting on qubit `k`
    fn flip(&self, p: f64, pauli: &Mat2, k: usize) -> Result<Self> {
        check_probability(p)?;
        let mut flipped = self.clone();
        flipped.apply(&gate::on(pauli, self.n, k)?)?;
        let rho = &self.rho * C64::from(1.0 - p) + flipped.rho * C64::from(p);
        Ok(Self { n: self.n, rho })
    }

    /// Bit-flip channel on qubit `k`: `X` is applied with probability `p`.
    pub fn bit_flip(&self, p: f64, k: usize) -> Result<Self> {
        self.flip(p, &gate::x(), k)
    }

    /// Phase-flip channel on qubit `k`: `Z` is applied with probability `p`.
    pub fn phase_flip(&self, p: f64, k: usize) -> Result<Self> {
        self.flip(p, &gate::z(), k)
    }

    /// Bit-phase-flip channel on qubit `k`: `Y` is applied with probability
    /// `p`.
    pub fn bit_phase_flip(&self, p: f64, k: usize) -> Result<Self> {
        self.flip(p, &gate::y(), k)
    }

    /// Element-wise approximate equality.
    pub fn approx_eq(&self, other: &Self, tol: Option<Tolerance>) -> bool {
        linalg::approx_eq_mat(&self.rho, &other.rho, tol.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use crate::gate::Gate;
    use super::*;

    fn tol() -> Option<Tolerance> { Some(Tolerance::abs(1e-9)) }

    fn bell() -> Qubit {
        let mut q = Qubit::zero(2);
        q.apply_gate(&Gate::H(0)).unwrap()
            .apply_gate(&Gate::CX(0, 1)).unwrap();
        q
    }

    #[test]
    fn ensemble_is_normalized() {
        let zero = Qubit::zero(1);
        let one = Qubit::one(1);
        let rho = Density::from_ensemble(&[(3.0, &zero), (1.0, &one)]).unwrap();
        assert!((rho.trace() - 1.0).abs() < 1e-12);
        assert!((rho.matrix()[(0, 0)].re - 0.75).abs() < 1e-12);
        assert!((rho.purity() - 0.625).abs() < 1e-12);
        assert!(rho.is_valid(tol()));
        assert!((rho.probability(&zero).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn ensemble_errors() {
        assert_eq!(Density::from_ensemble(&[]), Err(Error::EmptyEnsemble));
        let zero = Qubit::zero(1);
        let two = Qubit::zero(2);
        assert_eq!(
            Density::from_ensemble(&[(0.0, &zero)]),
            Err(Error::EmptyEnsemble),
        );
        assert_eq!(
            Density::from_ensemble(&[(0.5, &zero), (0.5, &two)]),
            Err(Error::DimensionMismatch { expected: 2, actual: 4 }),
        );
        assert_eq!(
            Density::from_ensemble(&[(-0.5, &zero)]),
            Err(Error::InvalidProbability(-0.5)),
        );
    }

    #[test]
    fn pure_state_has_unit_purity() {
        let rho = Density::from(&bell());
        assert!((rho.purity() - 1.0).abs() < 1e-12);
        assert!(rho.is_hermitian(tol()));
    }

    #[test]
    fn apply_matches_register_evolution() {
        let mut q = Qubit::zero(2);
        q.apply_gate(&Gate::XRot(0, 0.3)).unwrap();
        let ops = [
            gate::on(&gate::h(), 2, 1).unwrap(),
            gate::cr(0.9, 2, 1, 0).unwrap(),
            gate::on(&gate::u(0.2, 0.4, 1.3), 2, 0).unwrap(),
        ];
        let mut rho = Density::from(&q);
        for op in ops.iter() {
            q.apply(op).unwrap();
            rho.apply(op).unwrap();
        }
        assert!(rho.approx_eq(&Density::from(&q), tol()));
    }

    #[test]
    fn partial_trace_of_bell_is_maximally_mixed() {
        let rho = Density::from(&bell());
        for k in 0..2 {
            let red = rho.partial_trace(&[k]).unwrap();
            assert_eq!(red.num_qubits(), 1);
            assert!((red.trace() - 1.0).abs() < 1e-12);
            assert!((red.purity() - 0.5).abs() < 1e-12);
            assert!((red.matrix()[(0, 0)].re - 0.5).abs() < 1e-12);
            assert!(red.matrix()[(0, 1)].norm() < 1e-12);
        }
    }

    #[test]
    fn partial_trace_keeps_order_of_remaining_qubits() {
        // ∣0⟩ ⊗ ∣1⟩ ⊗ ∣+⟩, trace out the middle qubit
        let mut q = Qubit::from_binary_string("010").unwrap();
        q.apply_gate(&Gate::H(2)).unwrap();
        let red = Density::from(&q).partial_trace(&[1]).unwrap();
        let mut expect = Qubit::zero(2);
        expect.apply_gate(&Gate::H(1)).unwrap();
        assert!(red.approx_eq(&Density::from(&expect), tol()));
        assert!(Density::from(&q).partial_trace(&[1, 1]).is_err());
        assert!(Density::from(&q).partial_trace(&[3]).is_err());
    }

    #[test]
    fn full_partial_trace_leaves_scalar() {
        let rho = Density::from(&bell());
        let red = rho.partial_trace(&[1, 0]).unwrap();
        assert_eq!(red.dim(), 1);
        assert!((red.trace() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn expectation_values() {
        let rho = Density::from(&Qubit::zero(1));
        assert!((rho.expectation(&gate::lift(&gate::z(), 1)).unwrap() - 1.0).abs() < 1e-12);
        assert!(rho.expectation(&gate::lift(&gate::x(), 1)).unwrap().abs() < 1e-12);
        let bell = Density::from(&bell());
        let zz = gate::lift(&gate::z(), 2);
        assert!((bell.expectation(&zz).unwrap() - 1.0).abs() < 1e-12);
        assert!(
            (bell.measure_probability(1, Outcome::One).unwrap() - 0.5).abs() < 1e-12
        );
    }

    #[test]
    fn channels() {
        let rho = Density::from(&Qubit::zero(1));
        let dep = rho.depolarizing(1.0).unwrap();
        assert!((dep.purity() - 0.5).abs() < 1e-12);
        assert!((dep.trace() - 1.0).abs() < 1e-12);

        let bf = rho.bit_flip(0.25, 0).unwrap();
        assert!((bf.matrix()[(1, 1)].re - 0.25).abs() < 1e-12);
        let pf = rho.phase_flip(0.25, 0).unwrap();
        assert!(pf.approx_eq(&rho, tol()));
        let bpf = rho.bit_phase_flip(1.0, 0).unwrap();
        assert!((bpf.matrix()[(1, 1)].re - 1.0).abs() < 1e-12);

        assert_eq!(rho.depolarizing(1.5), Err(Error::InvalidProbability(1.5)));
        assert_eq!(rho.bit_flip(-0.1, 0), Err(Error::InvalidProbability(-0.1)));
        assert!(rho.phase_flip(0.1, 1).is_err());
    }

    #[test]
    fn phase_flip_kills_coherence() {
        let mut plus = Qubit::zero(1);
        plus.apply_gate(&Gate::H(0)).unwrap();
        let rho = Density::from(&plus).phase_flip(0.5, 0).unwrap();
        assert!(rho.matrix()[(0, 1)].norm() < 1e-12);
        assert!(rho.matrix()[(1, 0)].norm() < 1e-12);
        assert!((rho.purity() - 0.5).abs() < 1e-12);
    }
}
