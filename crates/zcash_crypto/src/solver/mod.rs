//! Equihash(200,9) solver.
//!
//! Generates initial strings from a block header via Blake2b, reduces them
//! through 8 XOR-collision rounds plus a final step, and reconstructs
//! solutions from the surviving pair-link ancestry. Grounded throughout on
//! the original reference solver; see DESIGN.md for the module-by-module
//! mapping.
pub mod blake;
pub mod bucket;
pub mod config;
pub mod error;
pub mod pairlink;
pub mod pipeline;
pub mod reduction;
pub mod solution;
pub mod wire;
pub mod xstring;

pub use config::{Backend, SolverConfig};
pub use error::SolverError;
pub use pipeline::Solver;
