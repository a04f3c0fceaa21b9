//! # spag-core: Student-Project Allocation with Group Building
//!
//! This crate solves the student-project allocation with group building
//! problem: given projects with group-count wishes, ideal/min/max group sizes
//! and penalty coefficients, and students with ranked project preferences and
//! a small list of desired partners, it builds groups of students within
//! projects so that a weighted objective is maximized. The objective trades
//! preference satisfaction and mutual-partner rewards against unassignment
//! and group shape penalties.
//!
//! The solver is a General Variable Neighborhood Search: a randomized shake,
//! a best-improvement Variable Neighborhood Descent with incremental
//! delta-evaluated relocations, and structural group founding/dissolution
//! moves, all coordinated by an outer schedule that reverts failed visits.
//! Runs are single-threaded and bit-identical for a fixed seed.
//!
//! ## Quick Example
//!
//! ```no_run
//! use spag_core::{run_solver, models::*};
//!
//! let input = ApiInput {
//!     problem: ProblemDefinition {
//!         projects: vec![ProjectSpec {
//!             name: "Databases".to_string(),
//!             desired_num_groups: 1,
//!             max_num_groups: 1,
//!             ideal_group_size: 2,
//!             min_group_size: 2,
//!             max_group_size: 2,
//!             penalty_extra_group: 0,
//!             penalty_deviation_from_ideal_group_size: 0,
//!         }],
//!         students: vec![
//!             StudentSpec {
//!                 name: "Ada".to_string(),
//!                 fav_partners: vec![1],
//!                 project_prefs: vec![3],
//!             },
//!             StudentSpec {
//!                 name: "Grace".to_string(),
//!                 fav_partners: vec![0],
//!                 project_prefs: vec![3],
//!             },
//!         ],
//!     },
//!     solver: SolverConfiguration {
//!         seed: Some(100),
//!         ..Default::default()
//!     },
//! };
//!
//! match run_solver(&input) {
//!     Ok(result) => {
//!         println!("Objective: {}", result.objective);
//!         println!("{}", result.display());
//!     }
//!     Err(e) => eprintln!("Error: {e}"),
//! }
//! ```

use crate::algorithms::{Gvns, Solver};
use crate::models::{ApiInput, SolverResult};
use crate::solver::{SolverError, State};

pub mod algorithms;
pub mod models;
pub mod solver;

/// Runs the solver on the given input.
///
/// This is the main entry point of the library: it validates the problem and
/// the configuration, builds the greedy initial solution, and hands the state
/// to the GVNS driver.
///
/// # Errors
///
/// Returns a [`SolverError::ValidationError`] when the instance or the
/// configuration is malformed: empty tables, inconsistent group size bounds,
/// preference rows of the wrong width, dangling partner ids, probabilities
/// outside `[0, 1]` or a neighborhood range outside the schedule. All
/// validation happens before any search state is produced.
pub fn run_solver(input: &ApiInput) -> Result<SolverResult, SolverError> {
    let mut state = State::new(input)?;
    let gvns = Gvns::new(&input.solver);
    gvns.solve(&mut state)
}
