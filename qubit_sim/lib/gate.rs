//! Unitary gates as explicit operators.
//!
//! Single-qubit gates are first built as fixed [`Mat2`]s and only become
//! register-sized [`Operator`]s through one of two explicit constructions:
//! - [`lift`] spreads the same gate over every qubit (`u ⊗ u ⊗ ... ⊗ u`);
//! - [`controlled`] (and [`on`], its control-free special case) places the gate
//!   on a single target inside a larger register, optionally conditioned on a
//!   set of control qubits.
//!
//! All operators act on column vectors, so that a register `∣ψ⟩` evolves as
//! `∣ψ⟩ → U∣ψ⟩` with rows of `U` indexed by the output basis state. Controlled
//! constructions whose target gate is diagonal are stored as
//! [`Operator::Diagonal`] and cost only `O(2^n)` to apply.

use std::{ f64::consts::{ FRAC_1_SQRT_2, FRAC_PI_4, PI }, fmt };
use nalgebra as na;
use num_complex::Complex64 as C64;
use crate::{
    config::Tolerance,
    error::{ Error, Result },
    linalg::{ self, ONE, ZERO },
    number,
};

/// A single-qubit gate matrix.
pub type Mat2 = na::Matrix2<C64>;

/* Single-qubit gates *********************************************************/

/// Identity.
pub fn i() -> Mat2 { Mat2::new(ONE, ZERO, ZERO, ONE) }

/// Pauli X.
pub fn x() -> Mat2 { Mat2::new(ZERO, ONE, ONE, ZERO) }

/// Pauli Y.
pub fn y() -> Mat2 { Mat2::new(ZERO, -C64::i(), C64::i(), ZERO) }

/// Pauli Z.
pub fn z() -> Mat2 { Mat2::new(ONE, ZERO, ZERO, -ONE) }

/// Hadamard.
pub fn h() -> Mat2 {
    let a = C64::from(FRAC_1_SQRT_2);
    Mat2::new(a, a, a, -a)
}

/// π/2 phase gate.
pub fn s() -> Mat2 { Mat2::new(ONE, ZERO, ZERO, C64::i()) }

/// π/4 phase gate.
pub fn t() -> Mat2 { Mat2::new(ONE, ZERO, ZERO, C64::cis(FRAC_PI_4)) }

/// General single-qubit unitary in the `U(θ, φ, λ)` parameterization:
///
/// ```text
/// [ cos(θ/2)          -e^iλ sin(θ/2)     ]
/// [ e^iφ sin(θ/2)      e^i(φ+λ) cos(θ/2) ]
/// ```
pub fn u(theta: f64, phi: f64, lambda: f64) -> Mat2 {
    let (s, c) = (theta / 2.0).sin_cos();
    Mat2::new(
        C64::from(c),            -C64::cis(lambda) * s,
        C64::cis(phi) * s,        C64::cis(phi + lambda) * c,
    )
}

/// Rotation about X.
pub fn rx(theta: f64) -> Mat2 {
    let (s, c) = (theta / 2.0).sin_cos();
    let offdiag = -C64::i() * s;
    Mat2::new(C64::from(c), offdiag, offdiag, C64::from(c))
}

/// Rotation about Y.
pub fn ry(theta: f64) -> Mat2 {
    let (s, c) = (theta / 2.0).sin_cos();
    Mat2::new(C64::from(c), C64::from(-s), C64::from(s), C64::from(c))
}

/// Rotation about Z.
pub fn rz(theta: f64) -> Mat2 {
    Mat2::new(C64::cis(-theta / 2.0), ZERO, ZERO, C64::cis(theta / 2.0))
}

/// Relative phase `θ` on ∣1⟩.
pub fn r(theta: f64) -> Mat2 { Mat2::new(ONE, ZERO, ZERO, C64::cis(theta)) }

/// `2π / 2^k`, the phase used by the `k`-th controlled rotation of a QFT.
pub fn theta(k: u32) -> f64 { 2.0 * PI / 2.0_f64.powi(k as i32) }

fn is_diagonal2(u: &Mat2) -> bool { u[(0, 1)] == ZERO && u[(1, 0)] == ZERO }

fn to_dmatrix(u: &Mat2) -> na::DMatrix<C64> {
    na::DMatrix::from_fn(2, 2, |i, j| u[(i, j)])
}

/* Operator *******************************************************************/

/// A `2^n × 2^n` operator on an `n`-qubit register.
///
/// Purely diagonal operators are kept as their diagonal.
#[derive(Clone, Debug, PartialEq)]
pub enum Operator {
    /// A general dense matrix.
    Dense(na::DMatrix<C64>),
    /// A diagonal matrix, stored as its diagonal.
    Diagonal(na::DVector<C64>),
}

impl From<Mat2> for Operator {
    fn from(u: Mat2) -> Self {
        if is_diagonal2(&u) {
            Self::Diagonal(na::DVector::from_vec(vec![u[(0, 0)], u[(1, 1)]]))
        } else {
            Self::Dense(to_dmatrix(&u))
        }
    }
}

impl Operator {
    /// The `n`-qubit identity.
    pub fn identity(n: usize) -> Self {
        Self::Diagonal(na::DVector::from_element(1 << n, ONE))
    }

    /// Wrap a dense matrix, checking that it is square with power-of-two size.
    pub fn from_matrix(m: na::DMatrix<C64>) -> Result<Self> {
        if !m.is_square() {
            return Err(Error::DimensionMismatch {
                expected: m.nrows(),
                actual: m.ncols(),
            });
        }
        linalg::log2_dim(m.nrows())?;
        Ok(Self::Dense(m))
    }

    /// Wrap a diagonal, checking that it has power-of-two length.
    pub fn from_diagonal(d: na::DVector<C64>) -> Result<Self> {
        linalg::log2_dim(d.len())?;
        Ok(Self::Diagonal(d))
    }

    /// Return the number of rows (and columns).
    pub fn dim(&self) -> usize {
        match self {
            Self::Dense(m) => m.nrows(),
            Self::Diagonal(d) => d.len(),
        }
    }

    /// Return the number of qubits acted on.
    pub fn num_qubits(&self) -> usize { self.dim().trailing_zeros() as usize }

    /// Return `true` if `self` is `Diagonal`.
    pub fn is_diagonal(&self) -> bool { matches!(self, Self::Diagonal(_)) }

    /// Return the `(i, j)`-th element.
    pub fn get(&self, i: usize, j: usize) -> C64 {
        match self {
            Self::Dense(m) => m[(i, j)],
            Self::Diagonal(d) => if i == j { d[i] } else { ZERO },
        }
    }

    /// Materialize as a dense matrix.
    pub fn to_matrix(&self) -> na::DMatrix<C64> {
        match self {
            Self::Dense(m) => m.clone(),
            Self::Diagonal(d) => na::DMatrix::from_diagonal(d),
        }
    }

    /// Conjugate transpose.
    pub fn dagger(&self) -> Self {
        match self {
            Self::Dense(m) => Self::Dense(m.adjoint()),
            Self::Diagonal(d) => Self::Diagonal(d.map(|a| a.conj())),
        }
    }

    /// Matrix product `self · rhs`.
    pub fn mul(&self, rhs: &Self) -> Result<Self> {
        if self.dim() != rhs.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                actual: rhs.dim(),
            });
        }
        let prod = match (self, rhs) {
            (Self::Diagonal(a), Self::Diagonal(b))
                => Self::Diagonal(a.component_mul(b)),
            (Self::Dense(a), Self::Diagonal(d)) => {
                let mut m = a.clone();
                m.column_iter_mut()
                    .zip(d.iter())
                    .for_each(|(mut col, dj)| { col *= *dj; });
                Self::Dense(m)
            },
            (Self::Diagonal(d), Self::Dense(b)) => {
                let mut m = b.clone();
                m.row_iter_mut()
                    .zip(d.iter())
                    .for_each(|(mut row, di)| { row *= *di; });
                Self::Dense(m)
            },
            (Self::Dense(a), Self::Dense(b)) => Self::Dense(a * b),
        };
        Ok(prod)
    }

    /// Return the operator that applies `self` and then `next`, i.e.
    /// `next · self`.
    pub fn then(&self, next: &Self) -> Result<Self> { next.mul(self) }

    /// Kronecker product `self ⊗ rhs`; qubits of `rhs` follow those of `self`.
    pub fn kron(&self, rhs: &Self) -> Self {
        match (self, rhs) {
            (Self::Diagonal(a), Self::Diagonal(b))
                => Self::Diagonal(linalg::kron_vec(a, b)),
            _ => Self::Dense(linalg::kron_mat(&self.to_matrix(), &rhs.to_matrix())),
        }
    }

    /// Return `true` if `U U† = I` within tolerance.
    pub fn is_unitary(&self, tol: Option<Tolerance>) -> bool {
        let tol = tol.unwrap_or_default();
        match self {
            Self::Dense(m) => linalg::is_unitary(m, tol),
            Self::Diagonal(d) => d.iter().all(|a| tol.eq(a.norm_sqr(), 1.0)),
        }
    }

    /// Element-wise approximate equality, regardless of storage.
    pub fn approx_eq(&self, other: &Self, tol: Option<Tolerance>) -> bool {
        let tol = tol.unwrap_or_default();
        match (self, other) {
            (Self::Diagonal(a), Self::Diagonal(b))
                => linalg::approx_eq_vec(a, b, tol),
            _ => linalg::approx_eq_mat(&self.to_matrix(), &other.to_matrix(), tol),
        }
    }

    /// Compute `self · v`. Dimensions must already agree.
    pub(crate) fn apply_to(&self, v: &na::DVector<C64>, parallel: bool)
        -> na::DVector<C64>
    {
        match self {
            Self::Dense(m) => linalg::mat_vec(m, v, parallel),
            Self::Diagonal(d) => v.component_mul(d),
        }
    }
}

/// Kronecker product of several operators, first operator on the leading
/// qubits.
///
/// Returns `None` if `ops` is empty.
pub fn tensor_product<'a, I>(ops: I) -> Option<Operator>
where I: IntoIterator<Item = &'a Operator>
{
    let mut iter = ops.into_iter();
    let first = iter.next()?.clone();
    Some(iter.fold(first, |acc, op| acc.kron(op)))
}

/* Lifted and controlled operators ********************************************/

/// Apply the same single-qubit gate to every one of `n` qubits.
pub fn lift(u: &Mat2, n: usize) -> Operator {
    let base = Operator::from(*u);
    (0..n).fold(Operator::identity(0), |acc, _| acc.kron(&base))
}

/// Apply a single-qubit gate to qubit `target` of an `n`-qubit register.
pub fn on(u: &Mat2, n: usize, target: usize) -> Result<Operator> {
    controlled(u, n, &[], target)
}

/// Apply a single-qubit gate to qubit `target` of an `n`-qubit register,
/// conditioned on every qubit in `controls` being ∣1⟩.
///
/// The order of `controls` is irrelevant. Outside the subspace where all
/// controls are set, the result acts as the identity.
pub fn controlled(u: &Mat2, n: usize, controls: &[usize], target: usize)
    -> Result<Operator>
{
    linalg::check_qubits(n, controls)?;
    linalg::check_qubit(n, target)?;
    if controls.contains(&target) { return Err(Error::DuplicateQubit(target)); }
    let cmask = linalg::mask_of(n, controls);
    let tmask = linalg::mask(n, target);
    let d: usize = 1 << n;
    if is_diagonal2(u) {
        let diag
            = na::DVector::from_fn(d, |i, _| {
                if i & cmask != cmask {
                    ONE
                } else if i & tmask != 0 {
                    u[(1, 1)]
                } else {
                    u[(0, 0)]
                }
            });
        Ok(Operator::Diagonal(diag))
    } else {
        let mut m: na::DMatrix<C64> = na::DMatrix::identity(d, d);
        for i0 in (0..d).filter(|i| i & cmask == cmask && i & tmask == 0) {
            let i1 = i0 | tmask;
            m[(i0, i0)] = u[(0, 0)];
            m[(i0, i1)] = u[(0, 1)];
            m[(i1, i0)] = u[(1, 0)];
            m[(i1, i1)] = u[(1, 1)];
        }
        Ok(Operator::Dense(m))
    }
}

/// Controlled-NOT.
pub fn cnot(n: usize, c: usize, t: usize) -> Result<Operator> {
    controlled(&x(), n, &[c], t)
}

/// Controlled-Z.
pub fn cz(n: usize, c: usize, t: usize) -> Result<Operator> {
    controlled(&z(), n, &[c], t)
}

/// Controlled-S.
pub fn cs(n: usize, c: usize, t: usize) -> Result<Operator> {
    controlled(&s(), n, &[c], t)
}

/// Controlled phase rotation by `theta`.
pub fn cr(theta: f64, n: usize, c: usize, t: usize) -> Result<Operator> {
    controlled(&r(theta), n, &[c], t)
}

/// Doubly controlled NOT.
pub fn toffoli(n: usize, c0: usize, c1: usize, t: usize) -> Result<Operator> {
    controlled(&x(), n, &[c0, c1], t)
}

/// Swap qubits `a` and `b`, built from three alternating CNOTs.
pub fn swap(n: usize, a: usize, b: usize) -> Result<Operator> {
    let ab = cnot(n, a, b)?;
    let ba = cnot(n, b, a)?;
    ab.then(&ba)?.then(&ab)
}

/// Quantum Fourier transform on all `n` qubits.
///
/// Built gate by gate: for each qubit `i`, a Hadamard on `i` followed by
/// controlled rotations `CR(2π/2^k)` from every later qubit `j` (`k = 2, 3,
/// ...`). No final bit-reversal swaps are applied.
pub fn qft(n: usize) -> Result<Operator> {
    let hadamard = h();
    let mut g = Operator::identity(n);
    for i in 0..n {
        g = g.then(&on(&hadamard, n, i)?)?;
        for (k, j) in (2..).zip(i + 1..n) {
            g = g.then(&cr(theta(k), n, j, i)?)?;
        }
    }
    Ok(g)
}

/// Inverse of [`qft`].
pub fn iqft(n: usize) -> Result<Operator> { Ok(qft(n)?.dagger()) }

/// Controlled modular exponentiation for order finding.
///
/// Acting on an `n`-qubit register, maps `∣1⟩_c ∣k⟩_t → ∣1⟩_c ∣a^(2^j) k mod
/// modulus⟩_t` for every `k < modulus`, where the target value `k` is read from
/// `targets` with the first listed qubit most significant. Basis states with
/// the control unset or with `k >= modulus` are left alone.
pub fn controlled_mod_exp2(
    n: usize,
    a: u64,
    j: u32,
    modulus: u64,
    control: usize,
    targets: &[usize],
) -> Result<Operator>
{
    linalg::check_qubits(n, targets)?;
    linalg::check_qubit(n, control)?;
    if targets.contains(&control) { return Err(Error::DuplicateQubit(control)); }
    let bits = targets.len();
    if modulus == 0 || u128::from(modulus) > 1_u128 << bits {
        return Err(Error::ModulusTooLarge { modulus, bits });
    }
    if number::gcd(a % modulus, modulus) != 1 {
        return Err(Error::NotCoprime { a, n: modulus });
    }
    let a2j = u128::from(number::mod_exp2(a, j, modulus));
    let cmask = linalg::mask(n, control);
    let tmask = linalg::mask_of(n, targets);
    let d: usize = 1 << n;
    let mut m: na::DMatrix<C64> = na::DMatrix::zeros(d, d);
    for i in 0..d {
        let k = linalg::gather(i, n, targets) as u64;
        let out
            = if i & cmask == 0 || k >= modulus {
                i
            } else {
                let ak = (a2j * u128::from(k) % u128::from(modulus)) as usize;
                (i & !tmask) | linalg::scatter(ak, n, targets)
            };
        m[(out, i)] = ONE;
    }
    Ok(Operator::Dense(m))
}

/* Gate descriptions **********************************************************/

/// Description of a single gate by the qubit indices it acts on.
///
/// Controlled variants list control qubits first.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Gate {
    /// Identity
    I(usize),
    /// Hadamard
    H(usize),
    /// π rotation about X
    X(usize),
    /// π rotation about Y
    Y(usize),
    /// π rotation about Z
    Z(usize),
    /// π/2 rotation about Z
    S(usize),
    /// -π/2 rotation about Z
    SInv(usize),
    /// π/4 rotation about Z
    T(usize),
    /// -π/4 rotation about Z
    TInv(usize),
    /// General unitary `U(θ, φ, λ)`
    U(usize, f64, f64, f64),
    /// Rotation about X
    XRot(usize, f64),
    /// Rotation about Y
    YRot(usize, f64),
    /// Rotation about Z
    ZRot(usize, f64),
    /// Relative phase on ∣1⟩
    R(usize, f64),
    /// Controlled X
    CX(usize, usize),
    /// Controlled Z
    CZ(usize, usize),
    /// Controlled S
    CS(usize, usize),
    /// Controlled S<sup>†</sup>
    CSInv(usize, usize),
    /// Controlled phase
    CR(usize, usize, f64),
    /// Doubly controlled X
    Toffoli(usize, usize, usize),
    /// Swap
    Swap(usize, usize),
    /// Fourier transform over the whole register
    QFT,
    /// Inverse Fourier transform over the whole register
    IQFT,
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::I(k) => write!(f, "I({})", k),
            Self::H(k) => write!(f, "H({})", k),
            Self::X(k) => write!(f, "X({})", k),
            Self::Y(k) => write!(f, "Y({})", k),
            Self::Z(k) => write!(f, "Z({})", k),
            Self::S(k) => write!(f, "S({})", k),
            Self::SInv(k) => write!(f, "S†({})", k),
            Self::T(k) => write!(f, "T({})", k),
            Self::TInv(k) => write!(f, "T†({})", k),
            Self::U(k, th, ph, la)
                => write!(f, "U({}; {:.4}, {:.4}, {:.4})", k, th, ph, la),
            Self::XRot(k, th) => write!(f, "RX({}; {:.4})", k, th),
            Self::YRot(k, th) => write!(f, "RY({}; {:.4})", k, th),
            Self::ZRot(k, th) => write!(f, "RZ({}; {:.4})", k, th),
            Self::R(k, th) => write!(f, "R({}; {:.4})", k, th),
            Self::CX(c, t) => write!(f, "CX({}, {})", c, t),
            Self::CZ(c, t) => write!(f, "CZ({}, {})", c, t),
            Self::CS(c, t) => write!(f, "CS({}, {})", c, t),
            Self::CSInv(c, t) => write!(f, "CS†({}, {})", c, t),
            Self::CR(c, t, th) => write!(f, "CR({}, {}; {:.4})", c, t, th),
            Self::Toffoli(c0, c1, t)
                => write!(f, "CCX({}, {}, {})", c0, c1, t),
            Self::Swap(a, b) => write!(f, "SWAP({}, {})", a, b),
            Self::QFT => write!(f, "QFT"),
            Self::IQFT => write!(f, "IQFT"),
        }
    }
}

impl Gate {
    /// Return `true` if `self` acts on exactly one qubit.
    pub fn is_single(&self) -> bool {
        matches!(
            self,
            Self::I(..) | Self::H(..) | Self::X(..) | Self::Y(..) | Self::Z(..)
            | Self::S(..) | Self::SInv(..) | Self::T(..) | Self::TInv(..)
            | Self::U(..) | Self::XRot(..) | Self::YRot(..) | Self::ZRot(..)
            | Self::R(..)
        )
    }

    /// Return `true` if `self` has at least one control qubit.
    pub fn is_controlled(&self) -> bool {
        matches!(
            self,
            Self::CX(..) | Self::CZ(..) | Self::CS(..) | Self::CSInv(..)
            | Self::CR(..) | Self::Toffoli(..)
        )
    }

    /// Return `true` if `self` is `Swap`.
    pub fn is_swap(&self) -> bool { matches!(self, Self::Swap(..)) }

    /// Decompose into a single-qubit matrix, its control qubits, and its
    /// target, if `self` has that form.
    pub fn local(&self) -> Option<(Mat2, Vec<usize>, usize)> {
        let local = match *self {
            Self::I(k) => (i(), vec![], k),
            Self::H(k) => (h(), vec![], k),
            Self::X(k) => (x(), vec![], k),
            Self::Y(k) => (y(), vec![], k),
            Self::Z(k) => (z(), vec![], k),
            Self::S(k) => (s(), vec![], k),
            Self::SInv(k) => (s().adjoint(), vec![], k),
            Self::T(k) => (t(), vec![], k),
            Self::TInv(k) => (t().adjoint(), vec![], k),
            Self::U(k, th, ph, la) => (u(th, ph, la), vec![], k),
            Self::XRot(k, th) => (rx(th), vec![], k),
            Self::YRot(k, th) => (ry(th), vec![], k),
            Self::ZRot(k, th) => (rz(th), vec![], k),
            Self::R(k, th) => (r(th), vec![], k),
            Self::CX(c, t) => (x(), vec![c], t),
            Self::CZ(c, t) => (z(), vec![c], t),
            Self::CS(c, t) => (s(), vec![c], t),
            Self::CSInv(c, t) => (s().adjoint(), vec![c], t),
            Self::CR(c, t, th) => (r(th), vec![c], t),
            Self::Toffoli(c0, c1, t) => (x(), vec![c0, c1], t),
            Self::Swap(..) | Self::QFT | Self::IQFT => { return None; },
        };
        Some(local)
    }

    /// Build the full operator for an `n`-qubit register.
    pub fn operator(&self, n: usize) -> Result<Operator> {
        match self.local() {
            Some((u, controls, target)) => controlled(&u, n, &controls, target),
            None => match *self {
                Self::Swap(a, b) => swap(n, a, b),
                Self::QFT => qft(n),
                _ => iqft(n),
            },
        }
    }

    /// Return the gate that undoes `self`.
    pub fn inverse(&self) -> Self {
        match *self {
            Self::S(k) => Self::SInv(k),
            Self::SInv(k) => Self::S(k),
            Self::T(k) => Self::TInv(k),
            Self::TInv(k) => Self::T(k),
            Self::U(k, th, ph, la) => Self::U(k, -th, -la, -ph),
            Self::XRot(k, th) => Self::XRot(k, -th),
            Self::YRot(k, th) => Self::YRot(k, -th),
            Self::ZRot(k, th) => Self::ZRot(k, -th),
            Self::R(k, th) => Self::R(k, -th),
            Self::CS(c, t) => Self::CSInv(c, t),
            Self::CSInv(c, t) => Self::CS(c, t),
            Self::CR(c, t, th) => Self::CR(c, t, -th),
            Self::QFT => Self::IQFT,
            Self::IQFT => Self::QFT,
            g => g,
        }
    }
}
