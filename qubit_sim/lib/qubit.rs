//! Dense state-vector register of `n` qubits.
//!
//! A [`Qubit`] owns a complex amplitude vector of length `2^n`, with qubit 0
//! addressing the most significant bit of each basis index, plus a private
//! random number generator used only for measurement.
//!
//! Gates are applied in place and keep the vector normalized as long as they
//! are unitary. Measurement collapses the register in place and hands back a
//! separate [`Outcome`] value; the outcome never refers into the register.
//!
//! ```ignore
//! use qubit_sim::{ gate, qubit::Qubit };
//!
//! let mut q = Qubit::zero(2).with_seed(10546);
//! q.apply(&gate::on(&gate::h(), 2, 0)?)?
//!     .apply(&gate::cnot(2, 0, 1)?)?;
//! let m0 = q.measure(0)?;
//! let m1 = q.measure(1)?;
//! assert_eq!(m0, m1);
//! ```

use std::fmt;
use nalgebra as na;
use num_complex::Complex64 as C64;
use rand::{ rngs::StdRng, Rng, SeedableRng };
use rayon::prelude::*;
use tracing::{ debug, trace, warn };
use crate::{
    config::{ Config, Tolerance, EPS },
    error::{ Error, Result },
    gate::{ Gate, Mat2, Operator },
    linalg::{ self, ONE, ZERO },
    state::State,
};

/* Outcome ********************************************************************/

/// Result of measuring a single qubit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The qubit was found in ∣0⟩.
    Zero,
    /// The qubit was found in ∣1⟩.
    One,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Zero => write!(f, "0"),
            Self::One => write!(f, "1"),
        }
    }
}

impl From<bool> for Outcome {
    fn from(b: bool) -> Self { if b { Self::One } else { Self::Zero } }
}

impl Outcome {
    /// Return `true` if `self` is `Zero`.
    pub fn is_zero(&self) -> bool { matches!(self, Self::Zero) }

    /// Return `true` if `self` is `One`.
    pub fn is_one(&self) -> bool { matches!(self, Self::One) }

    /// Convert to a bit value.
    pub fn bit(&self) -> u8 { u8::from(self.is_one()) }

    /// Create a fresh single-qubit register in the observed basis state.
    pub fn to_qubit(&self) -> Qubit {
        match self {
            Self::Zero => Qubit::zero(1),
            Self::One => Qubit::one(1),
        }
    }
}

/* Qubit **********************************************************************/

/// A pure state of a register of `n` qubits.
///
/// Cloning copies the amplitudes and engine settings but gives the clone a
/// fresh generator drawn from system entropy, so that clones measured with
/// [`Self::measure`] sample independently. Use [`Self::fork`] for a copy whose
/// generator is derived reproducibly from this one.
#[derive(Debug)]
pub struct Qubit {
    pub(crate) n: usize,
    pub(crate) amps: na::DVector<C64>,
    rng: StdRng,
    par_threshold: usize,
}

impl Clone for Qubit {
    fn clone(&self) -> Self {
        Self {
            n: self.n,
            amps: self.amps.clone(),
            rng: StdRng::from_entropy(),
            par_threshold: self.par_threshold,
        }
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (i, a) in self.amps.iter().enumerate() {
            if a.norm() < EPS { continue; }
            if !first { write!(f, " ")?; }
            write!(f, "{:+.4}{:+.4}i∣{:0w$b}⟩", a.re, a.im, i, w = self.n)?;
            first = false;
        }
        Ok(())
    }
}

impl Qubit {
    fn from_raw(amps: na::DVector<C64>, config: Config) -> Self {
        let n = amps.len().trailing_zeros() as usize;
        Self {
            n,
            amps,
            rng: config.make_rng(),
            par_threshold: config.par_threshold,
        }
    }

    fn basis(n: usize, index: usize) -> Self {
        let mut amps = na::DVector::from_element(1 << n, ZERO);
        amps[index] = ONE;
        Self::from_raw(amps, Config::default())
    }

    /// Create a new `n`-qubit register initialized to ∣0...0⟩.
    pub fn zero(n: usize) -> Self { Self::basis(n, 0) }

    /// Create a new `n`-qubit register initialized to ∣1...1⟩.
    pub fn one(n: usize) -> Self { Self::basis(n, (1 << n) - 1) }

    /// Create a new `n`-qubit register in the computational basis state
    /// `index`.
    pub fn from_int(n: usize, index: usize) -> Result<Self> {
        if n >= usize::BITS as usize { return Err(Error::TooManyQubits(n)); }
        let dim: usize = 1 << n;
        if index >= dim { return Err(Error::BasisOutOfRange { index, dim }); }
        Ok(Self::basis(n, index))
    }

    /// Create a new register in the basis state labeled by a string of `0`s and
    /// `1`s, qubit 0 first.
    pub fn from_binary_string(s: &str) -> Result<Self> {
        if s.is_empty() { return Err(Error::InvalidBinaryString(s.to_string())); }
        let n = s.chars().count();
        if n >= usize::BITS as usize { return Err(Error::TooManyQubits(n)); }
        let index
            = s.chars()
            .try_fold(0_usize, |acc, c| match c {
                '0' => Some(acc << 1),
                '1' => Some((acc << 1) | 1),
                _ => None,
            })
            .ok_or_else(|| Error::InvalidBinaryString(s.to_string()))?;
        Self::from_int(n, index)
    }

    /// Create a new register from arbitrary amplitudes, normalizing them.
    ///
    /// The number of amplitudes must be a power of two.
    pub fn from_amplitudes<I>(amps: I) -> Result<Self>
    where I: IntoIterator<Item = C64>
    {
        let amps: Vec<C64> = amps.into_iter().collect();
        linalg::log2_dim(amps.len())?;
        let mut q = Self::from_raw(na::DVector::from_vec(amps), Config::default());
        q.normalize()?;
        Ok(q)
    }

    /// Replace the measurement generator and engine settings.
    pub fn with_config(mut self, config: Config) -> Self {
        self.rng = config.make_rng();
        self.par_threshold = config.par_threshold;
        self
    }

    /// Reseed the measurement generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Config::seeded(seed).make_rng();
        self
    }

    /// Replace the measurement generator.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Copy the register, seeding the copy's generator from this one's.
    ///
    /// Advances `self`'s generator, so successive forks differ while a seeded
    /// register still forks reproducibly.
    pub fn fork(&mut self) -> Self {
        let seed: u64 = self.rng.gen();
        Self {
            n: self.n,
            amps: self.amps.clone(),
            rng: StdRng::seed_from_u64(seed),
            par_threshold: self.par_threshold,
        }
    }

    /// Return the number of qubits.
    pub fn num_qubits(&self) -> usize { self.n }

    /// Return the length of the amplitude vector, `2^n`.
    pub fn dim(&self) -> usize { self.amps.len() }

    /// Return a reference to the amplitude vector.
    pub fn amplitudes(&self) -> &na::DVector<C64> { &self.amps }

    /// Return the probability of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amps.iter().map(|a| a.norm_sqr()).collect()
    }

    fn norm_sqr(&self) -> f64 { self.amps.iter().map(|a| a.norm_sqr()).sum() }

    /// Rescale the amplitudes to unit norm.
    pub fn normalize(&mut self) -> Result<&mut Self> {
        let norm = self.norm_sqr().sqrt();
        if norm == 0.0 { return Err(Error::ZeroNorm); }
        self.amps.unscale_mut(norm);
        Ok(self)
    }

    /// Return `true` if `self` is a single qubit found in ∣0⟩ with certainty.
    pub fn is_zero(&self, tol: Option<Tolerance>) -> bool {
        self.n == 1 && tol.unwrap_or_default().eq(self.amps[0].norm_sqr(), 1.0)
    }

    /// Return `true` if `self` is a single qubit found in ∣1⟩ with certainty.
    pub fn is_one(&self, tol: Option<Tolerance>) -> bool {
        self.n == 1 && tol.unwrap_or_default().eq(self.amps[1].norm_sqr(), 1.0)
    }

    /// Apply an operator.
    pub fn apply(&mut self, op: &Operator) -> Result<&mut Self> {
        if op.dim() != self.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                actual: op.dim(),
            });
        }
        let parallel = !op.is_diagonal() && self.n >= self.par_threshold;
        trace!(n = self.n, diagonal = op.is_diagonal(), parallel, "apply operator");
        self.amps = op.apply_to(&self.amps, parallel);
        Ok(self)
    }

    /// Apply a series of operators in order.
    pub fn apply_all<'a, I>(&mut self, ops: I) -> Result<&mut Self>
    where I: IntoIterator<Item = &'a Operator>
    {
        for op in ops { self.apply(op)?; }
        Ok(self)
    }

    /// Apply a single-qubit matrix to `target`, conditioned on all of
    /// `controls`, without building the full operator.
    pub fn apply_controlled(&mut self, u: &Mat2, controls: &[usize], target: usize)
        -> Result<&mut Self>
    {
        linalg::check_qubits(self.n, controls)?;
        linalg::check_qubit(self.n, target)?;
        if controls.contains(&target) { return Err(Error::DuplicateQubit(target)); }
        let cmask = linalg::mask_of(self.n, controls);
        let stride = linalg::mask(self.n, target);
        let u = *u;
        let kernel = move |(c, chunk): (usize, &mut [C64])| {
            let base = c * 2 * stride;
            let (lo, hi) = chunk.split_at_mut(stride);
            lo.iter_mut().zip(hi.iter_mut())
                .enumerate()
                .filter(|(j, _)| (base + j) & cmask == cmask)
                .for_each(|(_, (a0, a1))| {
                    let (b0, b1) = (*a0, *a1);
                    *a0 = u[(0, 0)] * b0 + u[(0, 1)] * b1;
                    *a1 = u[(1, 0)] * b0 + u[(1, 1)] * b1;
                });
        };
        let amps = self.amps.as_mut_slice();
        if self.n >= self.par_threshold {
            amps.par_chunks_mut(2 * stride).enumerate().for_each(kernel);
        } else {
            amps.chunks_mut(2 * stride).enumerate().for_each(kernel);
        }
        trace!(n = self.n, qubit = target, ?controls, "apply local gate");
        Ok(self)
    }

    /// Perform the action of a gate.
    ///
    /// Single-qubit and controlled gates are applied directly to the affected
    /// amplitude pairs; other gates are first built as full operators.
    pub fn apply_gate(&mut self, gate: &Gate) -> Result<&mut Self> {
        match gate.local() {
            Some((u, controls, target))
                => self.apply_controlled(&u, &controls, target),
            None => self.apply(&gate.operator(self.n)?),
        }
    }

    /// Perform a series of gates.
    pub fn apply_circuit<'a, I>(&mut self, gates: I) -> Result<&mut Self>
    where I: IntoIterator<Item = &'a Gate>
    {
        for gate in gates { self.apply_gate(gate)?; }
        Ok(self)
    }

    /// Append the qubits of `other` after those of `self`, replacing the state
    /// with `self ⊗ other`.
    pub fn tensor_product(&mut self, other: &Self) -> &mut Self {
        let n0 = self.n;
        self.amps = linalg::kron_vec(&self.amps, &other.amps);
        self.n += other.n;
        debug!(from = n0, to = self.n, "grew register");
        self
    }

    /// Return the probability of finding qubit `k` in `outcome`, without
    /// measuring.
    pub fn probability_of(&self, k: usize, outcome: Outcome) -> Result<f64> {
        linalg::check_qubit(self.n, k)?;
        let want = outcome.is_one();
        let p
            = self.amps.iter().enumerate()
            .filter(|(i, _)| linalg::bit(*i, self.n, k) == want)
            .map(|(_, a)| a.norm_sqr())
            .sum();
        Ok(p)
    }

    /// Perform a projective measurement on qubit `k`, using the register's own
    /// generator.
    ///
    /// See [`Self::measure_with`].
    pub fn measure(&mut self, k: usize) -> Result<Outcome> {
        linalg::check_qubit(self.n, k)?;
        let r: f64 = self.rng.gen();
        self.collapse(k, r)
    }

    /// Perform a projective measurement on qubit `k`, drawing the outcome from
    /// `rng`.
    ///
    /// The register is collapsed onto the subspace consistent with the outcome
    /// and renormalized before returning. The returned [`Outcome`] is
    /// independent of the register.
    pub fn measure_with<R>(&mut self, k: usize, rng: &mut R) -> Result<Outcome>
    where R: Rng + ?Sized
    {
        linalg::check_qubit(self.n, k)?;
        let r: f64 = rng.gen();
        self.collapse(k, r)
    }

    // project onto outcome 0 if `r < p(0) / (p(0) + p(1))`, else onto 1, then
    // renormalize
    fn collapse(&mut self, k: usize, r: f64) -> Result<Outcome> {
        let norm = self.norm_sqr();
        if !Tolerance::LOOSE.eq(norm, 1.0) {
            warn!(norm, "measuring a register that is not normalized");
        }
        let p0 = self.probability_of(k, Outcome::Zero)?;
        let p1 = self.probability_of(k, Outcome::One)?;
        if p0 + p1 <= 0.0 { return Err(Error::ZeroNorm); }
        let outcome
            = if p1 <= 0.0 {
                Outcome::Zero
            } else if p0 <= 0.0 {
                Outcome::One
            } else {
                Outcome::from(r * (p0 + p1) >= p0)
            };
        let n = self.n;
        self.amps.iter_mut().enumerate()
            .filter(|(i, _)| linalg::bit(*i, n, k) != outcome.is_one())
            .for_each(|(_, a)| { *a = ZERO; });
        self.normalize()?;
        debug!(qubit = k, p0, p1, %outcome, "measured");
        Ok(outcome)
    }

    /// Measure every qubit in order, returning the outcomes.
    pub fn measure_all(&mut self) -> Result<Vec<Outcome>> {
        (0..self.n).map(|k| self.measure(k)).collect()
    }

    /// Inner product ⟨self∣other⟩.
    pub fn inner(&self, other: &Self) -> Result<C64> {
        if self.dim() != other.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        Ok(self.amps.dotc(&other.amps))
    }

    /// Fidelity ∣⟨self∣other⟩∣².
    pub fn fidelity(&self, other: &Self) -> Result<f64> {
        Ok(self.inner(other)?.norm_sqr())
    }

    /// Trace distance between two pure states, `√(1 - F)`.
    pub fn trace_distance(&self, other: &Self) -> Result<f64> {
        Ok((1.0 - self.fidelity(other)?).max(0.0).sqrt())
    }

    /// Amplitude-wise approximate equality.
    pub fn approx_eq(&self, other: &Self, tol: Option<Tolerance>) -> bool {
        linalg::approx_eq_vec(&self.amps, &other.amps, tol.unwrap_or_default())
    }

    /// List every basis state with nonzero amplitude, reading out the listed
    /// groups of qubits for each.
    ///
    /// Groups may reorder, subset, or overlap the register's qubits. If no
    /// groups are given, all qubits are read out in order as a single group.
    pub fn state(&self, groups: &[&[usize]]) -> Result<Vec<State>> {
        for group in groups.iter() {
            for &k in group.iter() { linalg::check_qubit(self.n, k)?; }
        }
        let all: Vec<usize> = (0..self.n).collect();
        let default_group: [&[usize]; 1] = [&all];
        let groups = if groups.is_empty() { &default_group[..] } else { groups };
        let states
            = self.amps.iter().enumerate()
            .filter(|(_, a)| a.norm() > EPS)
            .map(|(i, a)| State::new(i, self.n, *a, groups))
            .collect();
        Ok(states)
    }
}

/// Kronecker product of several registers, first register on the leading
/// qubits.
///
/// The result takes the generator settings of the first register. Returns
/// `None` if `qubits` is empty.
pub fn tensor_product<'a, I>(qubits: I) -> Option<Qubit>
where I: IntoIterator<Item = &'a Qubit>
{
    let mut iter = qubits.into_iter();
    let mut acc = iter.next()?.clone();
    iter.for_each(|q| { acc.tensor_product(q); });
    Some(acc)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_1_SQRT_2;
    use rand::rngs::mock::StepRng;
    use crate::gate;
    use super::*;

    fn tol() -> Option<Tolerance> { Some(Tolerance::abs(1e-9)) }

    // `StepRng` yields raw `u64`s; `gen::<f64>` keeps the top 53 bits
    fn fixed_rng(r: f64) -> StepRng {
        StepRng::new((r * (1_u64 << 53) as f64) as u64 * (1 << 11), 0)
    }

    #[test]
    fn constructors() {
        assert_eq!(Qubit::zero(3).probabilities()[0], 1.0);
        assert_eq!(Qubit::one(3).probabilities()[7], 1.0);
        let q = Qubit::from_binary_string("0110").unwrap();
        assert_eq!(q.num_qubits(), 4);
        assert_eq!(q.probabilities()[6], 1.0);
        assert_eq!(
            Qubit::from_binary_string("01a").unwrap_err(),
            Error::InvalidBinaryString("01a".to_string()),
        );
        assert_eq!(
            Qubit::from_int(2, 4).unwrap_err(),
            Error::BasisOutOfRange { index: 4, dim: 4 },
        );
    }

    #[test]
    fn custom_amplitudes_are_normalized() {
        let q = Qubit::from_amplitudes([C64::from(3.0), C64::new(0.0, 4.0)])
            .unwrap();
        assert!((q.amplitudes()[0].re - 0.6).abs() < 1e-12);
        assert!((q.amplitudes()[1].im - 0.8).abs() < 1e-12);
        assert_eq!(
            Qubit::from_amplitudes([ONE, ONE, ONE]).unwrap_err(),
            Error::NotPowerOfTwo(3),
        );
        assert_eq!(
            Qubit::from_amplitudes([ZERO, ZERO]).unwrap_err(),
            Error::ZeroNorm,
        );
    }

    #[test]
    fn bell_state() {
        let mut q = Qubit::zero(2);
        let h_i = gate::lift(&gate::h(), 1).kron(&Operator::identity(1));
        q.apply(&h_i).unwrap()
            .apply(&gate::cnot(2, 0, 1).unwrap()).unwrap();
        let a = q.amplitudes();
        assert!((a[0].re - FRAC_1_SQRT_2).abs() < 1e-12);
        assert!((a[3].re - FRAC_1_SQRT_2).abs() < 1e-12);
        assert_eq!(a[1], ZERO);
        assert_eq!(a[2], ZERO);
    }

    #[test]
    fn wrong_size_operator_is_rejected() {
        let mut q = Qubit::zero(2);
        assert_eq!(
            q.apply(&gate::lift(&gate::x(), 3)).unwrap_err(),
            Error::DimensionMismatch { expected: 4, actual: 8 },
        );
    }

    #[test]
    fn local_kernel_matches_full_operator() {
        let prep = [Gate::H(0), Gate::XRot(1, 0.4), Gate::YRot(2, 1.3)];
        let gates = [
            Gate::Y(1), Gate::U(2, 0.5, 0.1, -0.9), Gate::CX(2, 0),
            Gate::CR(0, 1, 0.7), Gate::Toffoli(2, 1, 0), Gate::CS(1, 2),
        ];
        for g in gates.iter() {
            let mut a = Qubit::zero(3);
            a.apply_circuit(&prep).unwrap();
            let mut b = a.clone();
            a.apply_gate(g).unwrap();
            b.apply(&g.operator(3).unwrap()).unwrap();
            assert!(a.approx_eq(&b, tol()), "{}", g);
        }
    }

    #[test]
    fn parallel_paths_match_serial() {
        let prep = [Gate::H(0), Gate::H(2), Gate::CX(0, 1), Gate::T(1)];
        let mut a = Qubit::zero(3);
        a.apply_circuit(&prep).unwrap();
        let mut b = a.clone().with_config(Config { seed: None, par_threshold: 0 });
        let ops = [gate::qft(3).unwrap(), gate::on(&gate::ry(0.3), 3, 2).unwrap()];
        a.apply_all(&ops).unwrap().apply_gate(&Gate::CX(2, 0)).unwrap();
        b.apply_all(&ops).unwrap().apply_gate(&Gate::CX(2, 0)).unwrap();
        assert!(a.approx_eq(&b, tol()));
    }

    #[test]
    fn tensor_product_appends_qubits() {
        let mut q = Qubit::one(1);
        q.tensor_product(&Qubit::zero(2));
        assert_eq!(q.num_qubits(), 3);
        assert_eq!(q.probabilities()[0b100], 1.0);
        let r = tensor_product(&[Qubit::zero(1), Qubit::one(1), Qubit::zero(1)])
            .unwrap();
        assert_eq!(r.probabilities()[0b010], 1.0);
        assert!(tensor_product(&[]).is_none());
    }

    #[test]
    fn measurement_collapses_in_place() {
        let mut q = Qubit::zero(2);
        q.apply_gate(&Gate::H(0)).unwrap()
            .apply_gate(&Gate::CX(0, 1)).unwrap();

        // r = 0.75 >= p0 = 0.5 -> outcome 1
        let m = q.measure_with(0, &mut fixed_rng(0.75)).unwrap();
        assert!(m.is_one());
        assert!(m.to_qubit().is_one(None));
        let p = q.probabilities();
        assert!((p[3] - 1.0).abs() < 1e-12);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);

        // the partner qubit is now deterministic
        let m1 = q.measure_with(1, &mut fixed_rng(0.0)).unwrap();
        assert!(m1.is_one());
    }

    #[test]
    fn measurement_low_draw_gives_zero() {
        let mut q = Qubit::zero(1);
        q.apply_gate(&Gate::H(0)).unwrap();
        let m = q.measure_with(0, &mut fixed_rng(0.25)).unwrap();
        assert_eq!(m, Outcome::Zero);
        assert!(q.is_zero(None));
    }

    #[test]
    fn seeded_measurement_is_reproducible() {
        let run = |seed: u64| -> Vec<Outcome> {
            let mut q = Qubit::zero(4).with_seed(seed);
            q.apply(&gate::lift(&gate::h(), 4)).unwrap();
            q.measure_all().unwrap()
        };
        assert_eq!(run(12345), run(12345));
    }

    #[test]
    fn clone_is_independent() {
        let mut a = Qubit::zero(1);
        a.apply_gate(&Gate::H(0)).unwrap();
        let b = a.clone();
        a.measure_with(0, &mut fixed_rng(0.9)).unwrap();
        assert!(a.is_one(None));
        assert!((b.probabilities()[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn clones_sample_independently() {
        let mut q = Qubit::zero(1).with_seed(10546);
        q.apply_gate(&Gate::H(0)).unwrap();
        let ones
            = (0..200)
            .filter(|_| q.clone().measure(0).unwrap().is_one())
            .count();
        assert!(ones > 0 && ones < 200);
    }

    #[test]
    fn forks_are_reproducible_and_distinct() {
        let draws = |seed: u64| -> Vec<Outcome> {
            let mut q = Qubit::zero(1).with_seed(seed);
            q.apply_gate(&Gate::H(0)).unwrap();
            (0..64).map(|_| q.fork().measure(0).unwrap()).collect()
        };
        let a = draws(777);
        assert_eq!(a, draws(777));
        assert!(a.iter().any(|m| m.is_zero()));
        assert!(a.iter().any(|m| m.is_one()));
    }

    #[test]
    fn top_draw_never_selects_empty_branch() {
        // five equal amplitudes on even indices: qubit 5 is certainly 0, but
        // p(0) sums to just below 1
        let amps
            = (0..64)
            .map(|i| if i % 2 == 0 && i < 10 { ONE } else { ZERO });
        let mut q = Qubit::from_amplitudes(amps).unwrap();
        let m = q.measure_with(5, &mut StepRng::new(u64::MAX, 0)).unwrap();
        assert_eq!(m, Outcome::Zero);
        assert!((q.probabilities().iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((q.probabilities()[8] - 0.2).abs() < 1e-12);

        let mut one = Qubit::one(1);
        let m = one.measure_with(0, &mut StepRng::new(0, 0)).unwrap();
        assert_eq!(m, Outcome::One);
        assert!(one.is_one(None));
    }

    #[test]
    fn oversized_labels_are_rejected() {
        let long = "0".repeat(usize::BITS as usize);
        assert_eq!(
            Qubit::from_binary_string(&long).unwrap_err(),
            Error::TooManyQubits(usize::BITS as usize),
        );
        assert_eq!(
            Qubit::from_int(usize::BITS as usize + 3, 0).unwrap_err(),
            Error::TooManyQubits(usize::BITS as usize + 3),
        );
    }

    #[test]
    fn measure_rejects_bad_index() {
        let mut q = Qubit::zero(2);
        assert_eq!(
            q.measure(2).unwrap_err(),
            Error::QubitOutOfRange { index: 2, n: 2 },
        );
    }

    #[test]
    fn fidelity_and_distance() {
        let zero = Qubit::zero(1);
        let mut plus = Qubit::zero(1);
        plus.apply_gate(&Gate::H(0)).unwrap();
        assert!((zero.fidelity(&plus).unwrap() - 0.5).abs() < 1e-12);
        assert!((zero.trace_distance(&plus).unwrap() - FRAC_1_SQRT_2).abs() < 1e-12);
        assert!(zero.trace_distance(&zero).unwrap() < 1e-12);
    }

    #[test]
    fn state_groups_subregisters() {
        // ∣0⟩ ⊗ (∣01⟩ + ∣10⟩)/√2
        let mut q = Qubit::from_binary_string("001").unwrap();
        q.apply_gate(&Gate::H(1)).unwrap()
            .apply_gate(&Gate::CX(1, 2)).unwrap();
        let groups: [&[usize]; 2] = [&[0], &[2, 1]];
        let states = q.state(&groups).unwrap();
        assert_eq!(states.len(), 2);
        assert_eq!(states[0].binary, vec!["0", "10"]);
        assert_eq!(states[0].int, vec![0, 2]);
        assert_eq!(states[1].binary, vec!["0", "01"]);
        assert!((states[0].probability - 0.5).abs() < 1e-12);

        let all = q.state(&[]).unwrap();
        assert_eq!(all[0].binary, vec!["001"]);
        assert!(q.state(&[&[3]]).is_err());
    }
}
