//! End-to-end scenarios through the public solver API.

mod common;

use common::{medium_instance, project, seeded_input, student};
use spag_core::algorithms::{Gvns, Solver};
use spag_core::models::{ProblemDefinition, ReportingMode, SolverConfiguration};
use spag_core::run_solver;
use spag_core::solver::State;

#[test]
fn minimal_feasible_instance_reaches_its_optimum() {
    let problem = ProblemDefinition {
        projects: vec![project("only", 1, 1, 2, 2, 2, 0, 0)],
        students: vec![
            student("a", vec![1], vec![3]),
            student("b", vec![0], vec![3]),
        ],
    };
    let result = run_solver(&seeded_input(problem, 100, ReportingMode::Silent)).unwrap();

    // Two preferences of 3 plus one seated mutual pair.
    assert_eq!(result.objective, 8);
    assert!(result.unassigned.is_empty());
    assert_eq!(result.assignment[0].groups.len(), 1);
}

#[test]
fn overflow_student_stays_unassigned() {
    let problem = ProblemDefinition {
        projects: vec![project("only", 1, 1, 2, 2, 2, 0, 0)],
        students: vec![
            student("a", vec![], vec![1]),
            student("b", vec![], vec![1]),
            student("c", vec![], vec![1]),
        ],
    };
    let result = run_solver(&seeded_input(problem, 100, ReportingMode::Silent)).unwrap();

    assert_eq!(result.objective, -1);
    assert_eq!(result.unassigned.len(), 1);
}

#[test]
fn bilateral_incentive_reaches_the_known_optimum() {
    let problem = ProblemDefinition {
        projects: vec![
            project("left", 1, 1, 2, 2, 2, 0, 0),
            project("right", 1, 1, 2, 2, 2, 0, 0),
        ],
        students: vec![
            student("a", vec![1], vec![3, 0]),
            student("b", vec![0], vec![3, 0]),
            student("c", vec![3], vec![0, 3]),
            student("d", vec![2], vec![0, 3]),
        ],
    };
    let result = run_solver(&seeded_input(problem, 100, ReportingMode::Silent)).unwrap();

    assert_eq!(result.objective, 16);
    assert!(result.unassigned.is_empty());
}

#[test]
fn failed_iterations_leave_an_optimal_state_untouched() {
    // The minimal instance is already at its optimum, so every neighborhood
    // visit must fail and be reverted; afterwards the state has to match the
    // freshly constructed one field by field.
    let problem = ProblemDefinition {
        projects: vec![project("only", 1, 1, 2, 2, 2, 0, 0)],
        students: vec![
            student("a", vec![1], vec![3]),
            student("b", vec![0], vec![3]),
        ],
    };
    let input = seeded_input(problem, 100, ReportingMode::Silent);

    let pristine = State::new(&input).unwrap();
    let mut state = State::new(&input).unwrap();
    Gvns::new(&input.solver).solve(&mut state).unwrap();

    assert_eq!(state.groups, pristine.groups);
    assert_eq!(state.unassigned, pristine.unassigned);
    assert_eq!(state.locations, pristine.locations);
    assert_eq!(state.objective, pristine.objective);
    assert_eq!(state.objective, state.best_objective);
}

#[test]
fn identical_seeds_give_identical_trajectories() {
    let run = || {
        run_solver(&seeded_input(
            medium_instance(),
            100,
            ReportingMode::Benchmarking,
        ))
        .unwrap()
    };
    let first = run();
    let second = run();

    assert_eq!(first.objective, second.objective);
    assert_eq!(first.assignment, second.assignment);
    assert_eq!(first.unassigned, second.unassigned);
    let trajectory = |result: &spag_core::models::SolverResult| {
        result
            .improvement_log
            .iter()
            .map(|r| (r.objective, r.neighborhood))
            .collect::<Vec<_>>()
    };
    assert_eq!(trajectory(&first), trajectory(&second));
}

#[test]
fn benchmark_log_starts_at_the_initial_solution_and_improves_monotonically() {
    let input = seeded_input(medium_instance(), 42, ReportingMode::Benchmarking);
    let initial_objective = State::new(&input).unwrap().objective;
    let result = run_solver(&input).unwrap();

    let log = &result.improvement_log;
    assert!(!log.is_empty());
    assert_eq!(log[0].neighborhood, 0);
    assert_eq!(log[0].objective, initial_objective);
    assert!(log.windows(2).all(|w| w[0].objective < w[1].objective));
    assert_eq!(log.last().unwrap().objective, result.objective);
}

#[test]
fn testing_mode_finds_no_inconsistencies_on_a_real_search() {
    let result = run_solver(&seeded_input(medium_instance(), 7, ReportingMode::Testing)).unwrap();
    assert!(
        result.consistency_failure.is_none(),
        "self-check failed: {:?}",
        result.consistency_failure
    );
}

#[test]
fn serialized_instances_solve_to_the_same_objective() {
    let input = seeded_input(medium_instance(), 13, ReportingMode::Silent);
    let json = serde_json::to_string(&input).unwrap();
    let reparsed: spag_core::models::ApiInput = serde_json::from_str(&json).unwrap();

    let direct = run_solver(&input).unwrap();
    let round_tripped = run_solver(&reparsed).unwrap();
    assert_eq!(direct.objective, round_tripped.objective);
    assert_eq!(direct.assignment, round_tripped.assignment);
}

#[test]
fn final_assignment_respects_group_shape_bounds() {
    let problem = medium_instance();
    let result = run_solver(&seeded_input(problem.clone(), 99, ReportingMode::Silent)).unwrap();

    let mut seen = vec![0usize; problem.students.len()];
    for (p_idx, assignment) in result.assignment.iter().enumerate() {
        let spec = &problem.projects[p_idx];
        assert!(assignment.groups.len() <= spec.max_num_groups as usize);
        for group in &assignment.groups {
            assert!(group.len() >= spec.min_group_size as usize);
            assert!(group.len() <= spec.max_group_size as usize);
            for member in group {
                seen[member.id] += 1;
            }
        }
    }
    for student in &result.unassigned {
        seen[student.id] += 1;
    }
    assert!(seen.iter().all(|&n| n == 1));
}

#[test]
fn neighborhood_range_outside_the_schedule_is_rejected() {
    let mut input = seeded_input(medium_instance(), 1, ReportingMode::Silent);
    input.solver.max_neighborhood = 7;
    let err = run_solver(&input).unwrap_err();
    assert!(err.to_string().contains("schedule"));

    let mut input = seeded_input(medium_instance(), 1, ReportingMode::Silent);
    input.solver.min_neighborhood = 0;
    assert!(run_solver(&input).is_err());
}

#[test]
fn unseeded_runs_still_complete() {
    let mut input = seeded_input(medium_instance(), 0, ReportingMode::Silent);
    input.solver.seed = None;
    input.solver.stop_conditions = spag_core::models::StopConditions {
        max_iterations: Some(5),
        time_limit_seconds: Some(30),
    };
    let result = run_solver(&input).unwrap();
    assert!(result.iterations_run <= 5);
}

#[test]
fn demonstration_mode_matches_silent_mode_state_for_state() {
    let silent = run_solver(&seeded_input(medium_instance(), 5, ReportingMode::Silent)).unwrap();
    let chatty = run_solver(&seeded_input(
        medium_instance(),
        5,
        ReportingMode::Demonstration,
    ))
    .unwrap();
    assert_eq!(silent.objective, chatty.objective);
    assert_eq!(silent.assignment, chatty.assignment);
}

#[test]
fn default_configuration_is_valid() {
    let config = SolverConfiguration::default();
    assert_eq!(config.reward_bilateral, 2);
    assert_eq!(config.penalty_non_assignment, 3);
    assert_eq!(config.min_neighborhood, 1);
    assert_eq!(config.max_neighborhood, 6);
    assert_eq!(config.assignment_bias, 10.0);
    assert_eq!(config.unassignment_probability, 0.05);
    assert_eq!(config.stop_conditions.max_iterations, Some(40));
    assert_eq!(config.stop_conditions.time_limit_seconds, Some(300));
}
