//! Thin layer over nalgebra's dense complex matrices and vectors, plus the
//! bit-addressing conventions shared by every register-sized object.
//!
//! Basis index `i` of an `n`-qubit object addresses the state whose `n`-bit
//! binary expansion equals `i`, with qubit 0 as the most significant bit.

use itertools::Itertools;
use nalgebra as na;
use num_complex::Complex64 as C64;
use rayon::prelude::*;
use crate::{
    config::Tolerance,
    error::{ Error, Result },
};

pub(crate) const ZERO: C64 = C64 { re: 0.0, im: 0.0 };
pub(crate) const ONE: C64 = C64 { re: 1.0, im: 0.0 };

/* Bit addressing *************************************************************/

/// Return `n` such that `dim == 2^n`.
pub fn log2_dim(dim: usize) -> Result<usize> {
    if dim.is_power_of_two() {
        Ok(dim.trailing_zeros() as usize)
    } else {
        Err(Error::NotPowerOfTwo(dim))
    }
}

/// Bit mask selecting qubit `k` of an `n`-qubit basis index.
///
/// `k` must be less than `n`; see [`check_qubit`].
#[inline]
pub fn mask(n: usize, k: usize) -> usize { 1 << (n - 1 - k) }

/// Return `true` if qubit `k` is `1` in basis index `i` of an `n`-qubit system.
#[inline]
pub fn bit(i: usize, n: usize, k: usize) -> bool { i & mask(n, k) != 0 }

/// Fail unless `k` addresses a qubit of an `n`-qubit system.
pub fn check_qubit(n: usize, k: usize) -> Result<()> {
    if k < n { Ok(()) } else { Err(Error::QubitOutOfRange { index: k, n }) }
}

/// Fail unless every index is in range and no index is repeated.
pub fn check_qubits(n: usize, ks: &[usize]) -> Result<()> {
    for (j, &k) in ks.iter().enumerate() {
        check_qubit(n, k)?;
        if ks[..j].contains(&k) { return Err(Error::DuplicateQubit(k)); }
    }
    Ok(())
}

/// OR together the masks of all listed qubits.
pub fn mask_of(n: usize, ks: &[usize]) -> usize {
    ks.iter().fold(0, |acc, &k| acc | mask(n, k))
}

/// Read the listed qubits of basis index `i` as an integer, taking the first
/// listed qubit as the most significant bit.
pub fn gather(i: usize, n: usize, ks: &[usize]) -> usize {
    ks.iter().fold(0, |acc, &k| (acc << 1) | usize::from(bit(i, n, k)))
}

/// Inverse of [`gather`]: write the bits of `v` into the listed qubits of an
/// otherwise-zero basis index.
pub fn scatter(v: usize, n: usize, ks: &[usize]) -> usize {
    let m = ks.len();
    ks.iter().enumerate()
        .filter(|(j, _)| v & (1 << (m - 1 - j)) != 0)
        .fold(0, |acc, (_, &k)| acc | mask(n, k))
}

/* Vector/matrix glue *********************************************************/

/// Kronecker product of two column vectors.
pub fn kron_vec(a: &na::DVector<C64>, b: &na::DVector<C64>) -> na::DVector<C64>
{
    na::DVector::from_iterator(
        a.len() * b.len(),
        a.iter().cartesian_product(b.iter()).map(|(ai, bj)| *ai * *bj),
    )
}

/// Kronecker product of two matrices.
pub fn kron_mat(a: &na::DMatrix<C64>, b: &na::DMatrix<C64>) -> na::DMatrix<C64>
{
    a.kronecker(b)
}

/// Outer product `∣a⟩⟨b∣`.
pub fn outer_prod(a: &na::DVector<C64>, b: &na::DVector<C64>)
    -> na::DMatrix<C64>
{
    na::DMatrix::from_fn(a.len(), b.len(), |i, j| a[i] * b[j].conj())
}

/// Conjugate transpose.
pub fn dagger(m: &na::DMatrix<C64>) -> na::DMatrix<C64> { m.adjoint() }

/// Trace of a square matrix.
pub fn trace(m: &na::DMatrix<C64>) -> C64 { m.diagonal().iter().sum() }

/// Element-wise approximate equality.
pub fn approx_eq_mat(
    a: &na::DMatrix<C64>,
    b: &na::DMatrix<C64>,
    tol: Tolerance,
) -> bool
{
    a.shape() == b.shape()
        && a.iter().zip(b.iter()).all(|(ai, bi)| tol.eq_c(*ai, *bi))
}

/// Element-wise approximate equality.
pub fn approx_eq_vec(
    a: &na::DVector<C64>,
    b: &na::DVector<C64>,
    tol: Tolerance,
) -> bool
{
    a.len() == b.len()
        && a.iter().zip(b.iter()).all(|(ai, bi)| tol.eq_c(*ai, *bi))
}

/// Return `true` if `m m† = I` within tolerance.
pub fn is_unitary(m: &na::DMatrix<C64>, tol: Tolerance) -> bool {
    m.is_square()
        && approx_eq_mat(
            &(m * m.adjoint()),
            &na::DMatrix::identity(m.nrows(), m.ncols()),
            tol,
        )
}

/// Return `true` if `m = m†` within tolerance.
pub fn is_hermitian(m: &na::DMatrix<C64>, tol: Tolerance) -> bool {
    m.is_square() && approx_eq_mat(m, &m.adjoint(), tol)
}

/// Compute `m v`, splitting output rows across the rayon pool if `parallel`.
///
/// The returned vector is complete before this function returns.
pub fn mat_vec(m: &na::DMatrix<C64>, v: &na::DVector<C64>, parallel: bool)
    -> na::DVector<C64>
{
    if parallel {
        let d = m.nrows();
        let rows: Vec<C64>
            = (0..d).into_par_iter()
            .map(|i| {
                (0..v.len())
                    .map(|j| m[(i, j)] * v[j])
                    .sum::<C64>()
            })
            .collect();
        na::DVector::from_vec(rows)
    } else {
        m * v
    }
}
