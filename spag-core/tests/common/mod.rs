//! Shared builders for the integration tests.

use spag_core::models::{
    ApiInput, ProblemDefinition, ProjectSpec, ReportingMode, SolverConfiguration, StudentSpec,
};

#[allow(clippy::too_many_arguments)]
pub fn project(
    name: &str,
    desired: u32,
    max_groups: u32,
    ideal: u32,
    min_size: u32,
    max_size: u32,
    pen_groups: i64,
    pen_size: i64,
) -> ProjectSpec {
    ProjectSpec {
        name: name.to_string(),
        desired_num_groups: desired,
        max_num_groups: max_groups,
        ideal_group_size: ideal,
        min_group_size: min_size,
        max_group_size: max_size,
        penalty_extra_group: pen_groups,
        penalty_deviation_from_ideal_group_size: pen_size,
    }
}

pub fn student(name: &str, fav_partners: Vec<usize>, prefs: Vec<i64>) -> StudentSpec {
    StudentSpec {
        name: name.to_string(),
        fav_partners,
        project_prefs: prefs,
    }
}

pub fn seeded_input(problem: ProblemDefinition, seed: u64, mode: ReportingMode) -> ApiInput {
    ApiInput {
        problem,
        solver: SolverConfiguration {
            seed: Some(seed),
            mode,
            ..Default::default()
        },
    }
}

/// A deterministic 3-project / 18-student instance, large enough that the
/// search has real work to do.
pub fn medium_instance() -> ProblemDefinition {
    let projects = vec![
        project("Compilers", 2, 3, 3, 2, 4, 2, 1),
        project("Databases", 1, 2, 2, 1, 3, 3, 2),
        project("Robotics", 2, 3, 2, 1, 3, 1, 1),
    ];
    let students = (0..18)
        .map(|i: usize| {
            let prefs = vec![
                ((i * 7 + 3) % 5) as i64,
                ((i * 5 + 1) % 4) as i64,
                ((i * 3 + 2) % 6) as i64,
            ];
            let partners = match i % 3 {
                0 => vec![(i + 1) % 18],
                1 => vec![(i + 17) % 18, (i + 2) % 18],
                _ => vec![],
            };
            student(&format!("student-{i}"), partners, prefs)
        })
        .collect();
    ProblemDefinition { projects, students }
}
