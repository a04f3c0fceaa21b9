//! Data models and types for the spag-core API.
//!
//! This module contains the public data structures used to define allocation
//! problems, configure the solver, and receive results. Everything is
//! serializable (JSON) so the solver can sit behind a CLI or a service without
//! further glue.

use serde::{Deserialize, Serialize};

/// Complete input specification for the solver.
///
/// The root structure pairing a problem definition (projects and students)
/// with the solver configuration.
///
/// # Example
///
/// ```no_run
/// use spag_core::models::*;
///
/// let input = ApiInput {
///     problem: ProblemDefinition {
///         projects: vec![ProjectSpec {
///             name: "Compilers".to_string(),
///             desired_num_groups: 1,
///             max_num_groups: 2,
///             ideal_group_size: 3,
///             min_group_size: 2,
///             max_group_size: 4,
///             penalty_extra_group: 2,
///             penalty_deviation_from_ideal_group_size: 1,
///         }],
///         students: vec![
///             StudentSpec {
///                 name: "Ada".to_string(),
///                 fav_partners: vec![1],
///                 project_prefs: vec![3],
///             },
///             StudentSpec {
///                 name: "Grace".to_string(),
///                 fav_partners: vec![0],
///                 project_prefs: vec![2],
///             },
///         ],
///     },
///     solver: SolverConfiguration::default(),
/// };
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiInput {
    /// The problem definition: projects on offer and students to place
    pub problem: ProblemDefinition,
    /// Solver configuration (defaults apply when omitted)
    #[serde(default)]
    pub solver: SolverConfiguration,
}

/// The two parallel tables that make up an instance.
///
/// Ordering is significant: the position of a project in `projects` is its
/// id, and likewise for students. A student's `project_prefs` must have one
/// entry per project, aligned by that id.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProblemDefinition {
    /// Projects on offer, index = project id
    pub projects: Vec<ProjectSpec>,
    /// Students to be placed, index = student id
    pub students: Vec<StudentSpec>,
}

/// One project on offer, with its group-shape wishes and penalty coefficients.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProjectSpec {
    /// Name/topic of the project
    pub name: String,
    /// How many groups the project wants to supervise
    pub desired_num_groups: u32,
    /// Maximum number of groups it is willing to supervise
    pub max_num_groups: u32,
    /// Number of students per group deemed ideal
    pub ideal_group_size: u32,
    /// Minimum number of students in any non-empty group
    pub min_group_size: u32,
    /// Maximum number of students in any group
    pub max_group_size: u32,
    /// Penalty for every group exceeding `desired_num_groups`
    pub penalty_extra_group: i64,
    /// Coefficient penalizing each unit of deviation from `ideal_group_size`
    pub penalty_deviation_from_ideal_group_size: i64,
}

/// One student, with ranked project preferences and desired partners.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StudentSpec {
    /// Name of the student
    pub name: String,
    /// Ids of other students this student would like to work with
    #[serde(default)]
    pub fav_partners: Vec<usize>,
    /// Preference weight per project, aligned with the project table
    pub project_prefs: Vec<i64>,
}

/// When the search loop gives up.
///
/// Both conditions are checked before each iteration; the first one reached
/// wins. A `None` disables that condition.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StopConditions {
    /// Maximum number of GVNS iterations
    pub max_iterations: Option<u64>,
    /// Wall-clock budget in seconds
    pub time_limit_seconds: Option<u64>,
}

impl Default for StopConditions {
    fn default() -> Self {
        StopConditions {
            max_iterations: Some(40),
            time_limit_seconds: Some(300),
        }
    }
}

/// Complete configuration for a solver run.
///
/// # Example
///
/// ```no_run
/// use spag_core::models::*;
///
/// let config = SolverConfiguration {
///     reward_bilateral: 2,
///     penalty_non_assignment: 3,
///     min_neighborhood: 1,
///     max_neighborhood: 6,
///     stop_conditions: StopConditions {
///         max_iterations: Some(30),
///         time_limit_seconds: None,
///     },
///     assignment_bias: 10.0,
///     unassignment_probability: 0.05,
///     seed: Some(100),
///     mode: ReportingMode::Demonstration,
/// };
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SolverConfiguration {
    /// Reward granted for every mutual partner pair seated in the same group
    #[serde(default = "default_reward_bilateral")]
    pub reward_bilateral: i64,
    /// Penalty charged for every student left unassigned
    #[serde(default = "default_penalty_non_assignment")]
    pub penalty_non_assignment: i64,
    /// Smallest neighborhood index of the schedule (k_min)
    #[serde(default = "default_min_neighborhood")]
    pub min_neighborhood: usize,
    /// Largest neighborhood index of the schedule (k_max)
    #[serde(default = "default_max_neighborhood")]
    pub max_neighborhood: usize,
    /// Conditions that determine when to stop searching
    #[serde(default)]
    pub stop_conditions: StopConditions,
    /// Bias toward picking unassigned students as shake departures
    #[serde(default = "default_assignment_bias")]
    pub assignment_bias: f64,
    /// Probability that a shaken group resident is sent to the unassigned pool
    #[serde(default = "default_unassignment_probability")]
    pub unassignment_probability: f64,
    /// Seed for the random generator; `None` draws one from OS entropy
    #[serde(default)]
    pub seed: Option<u64>,
    /// Reporting mode (defaults to `silent`)
    #[serde(default)]
    pub mode: ReportingMode,
}

fn default_reward_bilateral() -> i64 {
    2
}

fn default_penalty_non_assignment() -> i64 {
    3
}

fn default_min_neighborhood() -> usize {
    1
}

fn default_max_neighborhood() -> usize {
    6
}

fn default_assignment_bias() -> f64 {
    10.0
}

fn default_unassignment_probability() -> f64 {
    0.05
}

impl Default for SolverConfiguration {
    fn default() -> Self {
        SolverConfiguration {
            reward_bilateral: default_reward_bilateral(),
            penalty_non_assignment: default_penalty_non_assignment(),
            min_neighborhood: default_min_neighborhood(),
            max_neighborhood: default_max_neighborhood(),
            stop_conditions: StopConditions::default(),
            assignment_bias: default_assignment_bias(),
            unassignment_probability: default_unassignment_probability(),
            seed: None,
            mode: ReportingMode::default(),
        }
    }
}

/// How the solver reports while running.
///
/// - `Silent`: no output beyond the returned result.
/// - `Demonstration`: one log line per iteration.
/// - `Benchmarking`: record `{objective, runtime_s, neighborhood}` every time
///   the best objective improves, starting with the initial observation.
/// - `Testing`: run the full self-check after every step and abort the run
///   with a [`ConsistencyReport`] on the first violation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportingMode {
    #[default]
    Silent,
    Demonstration,
    Benchmarking,
    Testing,
}

/// A student as reported in results: dense id plus display name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StudentRef {
    pub id: usize,
    pub name: String,
}

/// Final group composition of one project.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectAssignment {
    /// Project name
    pub project: String,
    /// Non-empty groups with their members in seating order
    pub groups: Vec<Vec<StudentRef>>,
}

/// One entry of the benchmarking improvement log.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ImprovementRecord {
    /// Best objective value at this point
    pub objective: i64,
    /// Seconds elapsed since the run started
    pub runtime_s: f64,
    /// Neighborhood index that produced the improvement (0 = initial solution)
    pub neighborhood: usize,
}

/// Which step of an iteration the self-check ran after.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchStep {
    Structural,
    Shake,
    Descent,
}

/// Structured report produced when the testing-mode self-check fails.
///
/// Identifies the iteration, the step within it and the neighborhood index,
/// plus the specific violations found. Only produced in
/// [`ReportingMode::Testing`]; production runs never pay for the checks.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ConsistencyReport {
    /// Iteration index (0-based) in which the violation was found
    pub iteration: u64,
    /// Step after which the self-check fired
    pub step: Option<SearchStep>,
    /// Neighborhood index active at the time
    pub neighborhood: usize,
    /// Cached objective at the time of the check, if it disagreed
    pub claimed_obj: Option<i64>,
    /// Freshly recomputed objective, if it disagreed
    pub actual_obj: Option<i64>,
    /// Descriptions of non-empty groups below their project's minimum size
    #[serde(default)]
    pub groups_too_small: Vec<String>,
    /// Descriptions of groups above their project's maximum size
    #[serde(default)]
    pub groups_too_big: Vec<String>,
    /// Descriptions of projects with more non-empty groups than allowed
    #[serde(default)]
    pub too_many_groups: Vec<String>,
    /// Whether the student partition (groups + unassigned pool) is broken
    #[serde(default)]
    pub inconsistency_students: bool,
}

/// The result returned by the solver.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SolverResult {
    /// Final cached objective value
    pub objective: i64,
    /// Per-project group compositions (non-empty groups only)
    pub assignment: Vec<ProjectAssignment>,
    /// Students left without a group
    pub unassigned: Vec<StudentRef>,
    /// Improvement log (populated in benchmarking mode)
    #[serde(default)]
    pub improvement_log: Vec<ImprovementRecord>,
    /// Self-check failure (populated in testing mode, on failure only)
    #[serde(default)]
    pub consistency_failure: Option<ConsistencyReport>,
    /// Number of GVNS iterations actually performed
    pub iterations_run: u64,
    /// Wall-clock duration of the run in seconds
    pub elapsed_seconds: f64,
}

impl SolverResult {
    /// Formats the assignment as a human-readable string.
    ///
    /// Projects appear in id order, each with its groups and their members;
    /// the unassigned students and the objective value close the listing.
    pub fn display(&self) -> String {
        let mut output = String::new();
        for assignment in &self.assignment {
            output.push_str(&format!("Project: {}\n", assignment.project));
            for (group_idx, group) in assignment.groups.iter().enumerate() {
                output.push_str(&format!("  Group {}:\n", group_idx + 1));
                for member in group {
                    output.push_str(&format!("    {} ({})\n", member.name, member.id));
                }
            }
        }
        if self.unassigned.is_empty() {
            output.push_str("All students were assigned.\n");
        } else {
            output.push_str("Unassigned students:\n");
            for student in &self.unassigned {
                output.push_str(&format!("  {} ({})\n", student.name, student.id));
            }
        }
        output.push_str(&format!("Objective value: {}\n", self.objective));
        output
    }
}
