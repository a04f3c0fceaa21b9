//! Search algorithms that drive a solver state to a result.

pub mod gvns;

pub use gvns::Gvns;

use crate::models::SolverResult;
use crate::solver::{SolverError, State};

/// A search algorithm operating on a prepared solver state.
pub trait Solver {
    /// Runs the search to completion and returns the final result.
    fn solve(&self, state: &mut State) -> Result<SolverResult, SolverError>;
}
