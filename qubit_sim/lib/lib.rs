#![allow(non_snake_case, non_upper_case_globals)]

//! Tools for simulating small registers of qubits exactly, as dense complex
//! state vectors or density matrices.
//!
//! Registers of `n` qubits are stored as `2^n` amplitudes with qubit 0 on the
//! most significant bit of every basis index. Any unitary can be applied, not
//! just Clifford-group gates, so the practical ceiling is roughly 20-24 qubits.

pub mod config;
pub mod error;
pub mod linalg;
pub mod number;
pub mod gate;
pub mod state;
pub mod qubit;
pub mod density;

pub use crate::{
    config::{ Config, Tolerance },
    density::Density,
    error::{ Error, Result },
    gate::{ Gate, Operator },
    qubit::{ Outcome, Qubit },
    state::State,
};
