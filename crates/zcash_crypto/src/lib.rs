//! Equihash(200,9) verification and solving for Zcash-style block headers.
//!
//! This crate exposes:
//! - Equihash (n=200,k=9) verification: `verify_equihash_solution`, `verify_equihash_solution_with_params`
//! - An Equihash(200,9) solver: `solver::Solver`
mod equihash;
pub mod solver;

pub use equihash::{verify_equihash_solution, verify_equihash_solution_with_params, Error, Kind};
pub use solver::{Backend, Solver, SolverConfig, SolverError};
