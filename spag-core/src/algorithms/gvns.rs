//! General Variable Neighborhood Search.
//!
//! The driver walks a fixed neighborhood schedule. Each iteration optionally
//! applies the best structural bundle, optionally shakes, then runs the
//! descent. An improved cached objective is adopted and the schedule resets
//! to the smallest neighborhood; otherwise the reversal log is replayed and
//! the schedule advances (wrapping). Empty groups are pruned and the log is
//! cleared at every iteration boundary.

use super::Solver;
use crate::models::{
    ConsistencyReport, ImprovementRecord, ReportingMode, SearchStep, SolverConfiguration,
    SolverResult,
};
use crate::solver::{SolverError, State};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

/// Number of entries in the canonical neighborhood schedule.
pub(crate) const SCHEDULE_LEN: usize = 6;

/// Parameters of one neighborhood: how many students to move, whether moves
/// may cross project boundaries, and which steps run.
fn neighborhood_params(k: usize) -> (usize, bool, bool, bool) {
    match k {
        1 => (1, false, true, false),
        2 => (2, false, true, false),
        3 => (2, false, false, true),
        4 => (1, true, true, false),
        5 => (2, true, true, false),
        6 => (2, true, false, true),
        _ => unreachable!("neighborhood index {k} outside the schedule"),
    }
}

/// The GVNS driver, configured once per run.
pub struct Gvns {
    config: SolverConfiguration,
}

impl Gvns {
    pub fn new(config: &SolverConfiguration) -> Self {
        Gvns {
            config: config.clone(),
        }
    }

    fn audit(
        &self,
        state: &State,
        iteration: u64,
        step: SearchStep,
        neighborhood: usize,
    ) -> Option<ConsistencyReport> {
        let mut report = state.check_solution()?;
        report.iteration = iteration;
        report.step = Some(step);
        report.neighborhood = neighborhood;
        Some(report)
    }
}

impl Solver for Gvns {
    fn solve(&self, state: &mut State) -> Result<SolverResult, SolverError> {
        let config = &self.config;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let start = Instant::now();

        let demonstrating = config.mode == ReportingMode::Demonstration;
        let benchmarking = config.mode == ReportingMode::Benchmarking;
        let testing = config.mode == ReportingMode::Testing;

        let mut improvement_log: Vec<ImprovementRecord> = Vec::new();
        if benchmarking {
            improvement_log.push(ImprovementRecord {
                objective: state.objective,
                runtime_s: 0.0,
                neighborhood: 0,
            });
        }

        if demonstrating {
            info!("initial solution:\n{}", state.format_solution());
        }

        let k_min = config.min_neighborhood;
        let k_max = config.max_neighborhood;
        let mut k = k_min;
        let mut iteration: u64 = 0;
        let mut failure: Option<ConsistencyReport> = None;

        'search: loop {
            if let Some(limit) = config.stop_conditions.max_iterations {
                if iteration >= limit {
                    break;
                }
            }
            if let Some(limit) = config.stop_conditions.time_limit_seconds {
                if start.elapsed().as_secs() >= limit {
                    break;
                }
            }

            let (tuple_size, across_projects, do_shake, do_structural) = neighborhood_params(k);

            if do_structural {
                state.structural_move(&mut rng);
                if testing {
                    failure = self.audit(state, iteration, SearchStep::Structural, k);
                    if failure.is_some() {
                        break 'search;
                    }
                }
            }
            if do_shake {
                state.shake(
                    tuple_size,
                    across_projects,
                    config.assignment_bias,
                    config.unassignment_probability,
                    &mut rng,
                );
                if testing {
                    failure = self.audit(state, iteration, SearchStep::Shake, k);
                    if failure.is_some() {
                        break 'search;
                    }
                }
            }
            state.descend(tuple_size, across_projects);
            if testing {
                failure = self.audit(state, iteration, SearchStep::Descent, k);
                if failure.is_some() {
                    break 'search;
                }
            }

            if state.objective > state.best_objective {
                state.best_objective = state.objective;
                if demonstrating {
                    info!(
                        "iteration {}: neighborhood {k} improved the objective to {}",
                        iteration + 1,
                        state.objective
                    );
                }
                if benchmarking {
                    improvement_log.push(ImprovementRecord {
                        objective: state.objective,
                        runtime_s: start.elapsed().as_secs_f64(),
                        neighborhood: k,
                    });
                }
                k = k_min;
            } else {
                state.undo_visit();
                if demonstrating {
                    info!(
                        "iteration {}: neighborhood {k} brought no improvement, best stays at {}",
                        iteration + 1,
                        state.best_objective
                    );
                }
                k = if k >= k_max { k_min } else { k + 1 };
            }

            state.clear_reversal_log();
            state.prune_empty_groups();
            iteration += 1;
        }

        if demonstrating {
            info!("final solution:\n{}", state.format_solution());
        }

        Ok(state.to_solver_result(
            improvement_log,
            failure,
            iteration,
            start.elapsed().as_secs_f64(),
        ))
    }
}
