//! Error type shared by all register, gate, and density operations.

use thiserror::Error;

/// Returned by any fallible constructor or operation in this crate.
///
/// All variants describe programmer errors (bad indices, shapes, or
/// parameters); none of them are transient.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum Error {
    /// An operator or state had the wrong size for the register it was used
    /// with.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A vector or matrix dimension was not an exact power of two.
    #[error("dimension {0} is not a power of two")]
    NotPowerOfTwo(usize),

    /// A qubit index was not in `0..n`.
    #[error("qubit index {index} out of range for {n}-qubit register")]
    QubitOutOfRange { index: usize, n: usize },

    /// The same qubit was named twice where distinct qubits are required.
    #[error("qubit {0} used more than once in a single gate")]
    DuplicateQubit(usize),

    /// A channel parameter was not a valid probability.
    #[error("{0} is not a valid probability")]
    InvalidProbability(f64),

    /// Normalization was requested for a vector with zero norm.
    #[error("cannot normalize a zero-norm state")]
    ZeroNorm,

    /// A density matrix was requested from an ensemble with no weight.
    #[error("ensemble is empty or has zero total weight")]
    EmptyEnsemble,

    /// A basis-state label contained something other than `0` or `1`.
    #[error("invalid binary string {0:?}")]
    InvalidBinaryString(String),

    /// A register was requested with more qubits than a basis index can
    /// address.
    #[error("{0} qubits cannot be addressed by a machine-word basis index")]
    TooManyQubits(usize),

    /// A basis-state index was not in `0..dim`.
    #[error("basis index {index} out of range for dimension {dim}")]
    BasisOutOfRange { index: usize, dim: usize },

    /// Modular multiplication by `a` is not a permutation modulo `n`.
    #[error("{a} is not coprime to modulus {n}")]
    NotCoprime { a: u64, n: u64 },

    /// A modulus does not fit in the target register.
    #[error("modulus {modulus} does not fit in {bits} qubits")]
    ModulusTooLarge { modulus: u64, bits: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
