//! State construction: input validation and the initial greedy solution.
//!
//! Validation implements the fail-fast configuration error taxonomy: every
//! malformed input is rejected with a descriptive message before any search
//! state exists.

use super::moves::Location;
use super::{ProjectData, SolverError, State, StudentData};
use crate::algorithms::gvns::SCHEDULE_LEN;
use crate::models::{ApiInput, ProblemDefinition, SolverConfiguration};
use std::cmp::Reverse;
use std::collections::HashMap;

impl State {
    /// Creates a solver state from the API input.
    ///
    /// Validates the problem definition and the solver configuration,
    /// precomputes the mutual partner matrix and seeds the solution with the
    /// round-robin greedy construction: as long as any project can open
    /// another desired group and enough students remain, the project seats
    /// the top students of its waitlist as a new group of ideal size.
    /// Everyone left over starts in the unassigned pool.
    pub fn new(input: &ApiInput) -> Result<Self, SolverError> {
        validate_problem(&input.problem)?;
        validate_configuration(&input.solver)?;

        let projects: Vec<ProjectData> = input
            .problem
            .projects
            .iter()
            .map(|p| ProjectData {
                name: p.name.clone(),
                desired_num_groups: p.desired_num_groups as usize,
                max_num_groups: p.max_num_groups as usize,
                ideal_group_size: p.ideal_group_size as usize,
                min_group_size: p.min_group_size as usize,
                max_group_size: p.max_group_size as usize,
                penalty_extra_group: p.penalty_extra_group,
                penalty_size_deviation: p.penalty_deviation_from_ideal_group_size,
            })
            .collect();
        let students: Vec<StudentData> = input
            .problem
            .students
            .iter()
            .map(|s| StudentData {
                name: s.name.clone(),
                fav_partners: s.fav_partners.clone(),
                prefs: s.project_prefs.clone(),
            })
            .collect();

        let student_count = students.len();
        let mut mutual = vec![vec![false; student_count]; student_count];
        for (a, student) in students.iter().enumerate() {
            for &b in &student.fav_partners {
                if students[b].fav_partners.contains(&a) {
                    mutual[a][b] = true;
                    mutual[b][a] = true;
                }
            }
        }

        let mut state = State {
            groups: vec![Vec::new(); projects.len()],
            unassigned: Vec::new(),
            locations: vec![Location::Unassigned; student_count],
            projects,
            students,
            mutual,
            reward_bilateral: input.solver.reward_bilateral,
            penalty_non_assignment: input.solver.penalty_non_assignment,
            objective: 0,
            best_objective: 0,
            reversal_log: Vec::new(),
            combo_cache: HashMap::new(),
        };
        state.build_initial_solution();
        state.objective = state.recompute_objective();
        state.best_objective = state.objective;
        Ok(state)
    }

    fn build_initial_solution(&mut self) {
        // One waitlist per project: every student, ranked by preference for
        // that project descending, ties by id ascending.
        let waitlists: Vec<Vec<usize>> = (0..self.projects.len())
            .map(|p_idx| {
                let mut ids: Vec<usize> = (0..self.students.len()).collect();
                ids.sort_by_key(|&s| (Reverse(self.students[s].prefs[p_idx]), s));
                ids
            })
            .collect();

        let mut assigned = vec![false; self.students.len()];
        let mut remaining = self.students.len();
        let mut any_group_added = true;
        while remaining > 0 && any_group_added {
            any_group_added = false;
            for p_idx in 0..self.projects.len() {
                let project = &self.projects[p_idx];
                if self.groups[p_idx].len() >= project.desired_num_groups
                    || remaining < project.ideal_group_size
                {
                    continue;
                }
                let seats: Vec<usize> = waitlists[p_idx]
                    .iter()
                    .copied()
                    .filter(|&s| !assigned[s])
                    .take(project.ideal_group_size)
                    .collect();
                let g_idx = self.groups[p_idx].len();
                for &student in &seats {
                    assigned[student] = true;
                    self.locations[student] = Location::Group {
                        project: p_idx,
                        group: g_idx,
                    };
                }
                remaining -= seats.len();
                self.groups[p_idx].push(seats);
                any_group_added = true;
            }
        }

        self.unassigned = (0..self.students.len()).filter(|&s| !assigned[s]).collect();
    }
}

fn validate_problem(problem: &ProblemDefinition) -> Result<(), SolverError> {
    if problem.projects.is_empty() {
        return Err(SolverError::ValidationError(
            "the instance offers no projects".to_string(),
        ));
    }
    if problem.students.is_empty() {
        return Err(SolverError::ValidationError(
            "the instance contains no students".to_string(),
        ));
    }

    for (p_idx, project) in problem.projects.iter().enumerate() {
        if project.desired_num_groups < 1 {
            return Err(SolverError::ValidationError(format!(
                "project {p_idx} ({}): desired_num_groups must be at least 1",
                project.name
            )));
        }
        if project.max_num_groups < project.desired_num_groups {
            return Err(SolverError::ValidationError(format!(
                "project {p_idx} ({}): max_num_groups {} is below desired_num_groups {}",
                project.name, project.max_num_groups, project.desired_num_groups
            )));
        }
        if project.ideal_group_size < 1 {
            return Err(SolverError::ValidationError(format!(
                "project {p_idx} ({}): ideal_group_size must be at least 1",
                project.name
            )));
        }
        if project.min_group_size < 1 || project.min_group_size > project.ideal_group_size {
            return Err(SolverError::ValidationError(format!(
                "project {p_idx} ({}): min_group_size {} must lie in [1, {}]",
                project.name, project.min_group_size, project.ideal_group_size
            )));
        }
        if project.max_group_size < project.ideal_group_size {
            return Err(SolverError::ValidationError(format!(
                "project {p_idx} ({}): max_group_size {} is below ideal_group_size {}",
                project.name, project.max_group_size, project.ideal_group_size
            )));
        }
        if project.penalty_extra_group < 0 || project.penalty_deviation_from_ideal_group_size < 0 {
            return Err(SolverError::ValidationError(format!(
                "project {p_idx} ({}): penalty coefficients must be non-negative",
                project.name
            )));
        }
    }

    let project_count = problem.projects.len();
    let student_count = problem.students.len();
    for (s_idx, student) in problem.students.iter().enumerate() {
        if student.project_prefs.len() != project_count {
            return Err(SolverError::ValidationError(format!(
                "student {s_idx} ({}): {} project preferences given but there are {} projects",
                student.name,
                student.project_prefs.len(),
                project_count
            )));
        }
        for &partner in &student.fav_partners {
            if partner >= student_count {
                return Err(SolverError::ValidationError(format!(
                    "student {s_idx} ({}): favorite partner id {partner} does not exist",
                    student.name
                )));
            }
            if partner == s_idx {
                return Err(SolverError::ValidationError(format!(
                    "student {s_idx} ({}): students cannot list themselves as favorite partner",
                    student.name
                )));
            }
        }
    }
    Ok(())
}

fn validate_configuration(config: &SolverConfiguration) -> Result<(), SolverError> {
    if !(0.0..=1.0).contains(&config.unassignment_probability) {
        return Err(SolverError::ValidationError(format!(
            "unassignment_probability {} is outside [0, 1]",
            config.unassignment_probability
        )));
    }
    if !config.assignment_bias.is_finite() || config.assignment_bias < 0.0 {
        return Err(SolverError::ValidationError(format!(
            "assignment_bias {} must be a finite non-negative number",
            config.assignment_bias
        )));
    }
    if config.min_neighborhood < 1 {
        return Err(SolverError::ValidationError(
            "min_neighborhood must be at least 1".to_string(),
        ));
    }
    if config.max_neighborhood < config.min_neighborhood {
        return Err(SolverError::ValidationError(format!(
            "max_neighborhood {} is below min_neighborhood {}",
            config.max_neighborhood, config.min_neighborhood
        )));
    }
    if config.max_neighborhood > SCHEDULE_LEN {
        return Err(SolverError::ValidationError(format!(
            "max_neighborhood {} exceeds the neighborhood schedule length {SCHEDULE_LEN}",
            config.max_neighborhood
        )));
    }
    Ok(())
}
