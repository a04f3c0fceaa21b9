//! Core solver state management.
//!
//! This module contains the `State` struct which holds the immutable problem
//! instance (projects, students, mutual partner pairs) together with the
//! mutable solution: the projects→groups→students graph, the unassigned pool,
//! the cached objective and the reversal log of the current neighborhood
//! visit. All search moves go through the relocation primitive in
//! [`moves`], which keeps the cached objective and the reversal log honest.

mod construction;
mod display;
pub mod moves;
mod scoring;
mod validation;

use crate::models::{
    ConsistencyReport, ImprovementRecord, ProjectAssignment, SolverResult, StudentRef,
};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

pub use moves::Location;

/// Errors that can occur during solver operation.
///
/// All of these are configuration errors in the sense of the error taxonomy:
/// they are raised before any search state is produced. Internal consistency
/// violations never surface as errors; in testing mode they are reported as a
/// [`ConsistencyReport`] inside the result.
#[derive(Error, Debug, Serialize)]
pub enum SolverError {
    /// The problem definition or the solver configuration is invalid.
    #[error("Invalid problem or configuration: {0}")]
    ValidationError(String),
}

/// Immutable parameters of one project.
#[derive(Debug, Clone)]
pub struct ProjectData {
    pub name: String,
    pub desired_num_groups: usize,
    pub max_num_groups: usize,
    pub ideal_group_size: usize,
    pub min_group_size: usize,
    pub max_group_size: usize,
    pub penalty_extra_group: i64,
    pub penalty_size_deviation: i64,
}

/// Immutable data of one student.
#[derive(Debug, Clone)]
pub struct StudentData {
    pub name: String,
    pub fav_partners: Vec<usize>,
    /// Preference weight per project, aligned with the project table
    pub prefs: Vec<i64>,
}

/// One applied relocation, kept so the visit can be undone.
///
/// `from_pos` is the position the student occupied in the source container;
/// replaying the log in LIFO order and re-inserting at that position restores
/// the pre-visit state exactly, including container order.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MoveRecord {
    pub student: usize,
    pub from: Location,
    pub to: Location,
    pub from_pos: usize,
}

/// The internal state of the solver.
///
/// Students are stored in a contiguous pool and referenced everywhere by
/// their dense id; groups hold member ids, and `locations` gives the O(1)
/// reverse lookup. The cached `objective` is maintained incrementally by the
/// move layer and must always equal a full recomputation at the boundary of
/// every neighborhood visit.
#[derive(Debug, Clone)]
pub struct State {
    // === INSTANCE (never mutated after construction) ===
    pub projects: Vec<ProjectData>,
    pub students: Vec<StudentData>,
    /// Symmetric matrix of mutual partner pairs: `mutual[a][b]` iff a lists b
    /// and b lists a
    pub(crate) mutual: Vec<Vec<bool>>,
    /// Reward granted per mutual pair seated in the same group
    pub reward_bilateral: i64,
    /// Penalty charged per unassigned student
    pub penalty_non_assignment: i64,

    // === SOLUTION ===
    /// The assignment graph: `groups[project][group] = [student ids]`
    pub groups: Vec<Vec<Vec<usize>>>,
    /// Students currently without a group
    pub unassigned: Vec<usize>,
    /// Current location of every student, kept in sync with the containers
    pub locations: Vec<Location>,
    /// Cached objective value, updated by deltas
    pub objective: i64,
    /// Best objective seen so far
    pub best_objective: i64,

    // === SEARCH BOOKKEEPING ===
    /// Relocations applied during the current neighborhood visit, in order
    pub(crate) reversal_log: Vec<MoveRecord>,
    /// Student-id combinations per tuple size, grown on demand and reused
    /// across iterations
    pub(crate) combo_cache: HashMap<usize, Vec<Vec<usize>>>,
}

impl State {
    /// Number of non-empty groups of a project.
    pub fn non_empty_group_count(&self, project: usize) -> usize {
        self.groups[project].iter().filter(|g| !g.is_empty()).count()
    }

    /// Whether two students list each other as favorite partners.
    pub fn is_mutual_pair(&self, a: usize, b: usize) -> bool {
        self.mutual[a][b]
    }

    /// Undoes every relocation of the current visit in LIFO order and
    /// restores the cached objective from the best value.
    ///
    /// After a failed visit the best value equals the pre-visit cache, so
    /// this is exact.
    pub(crate) fn undo_visit(&mut self) {
        while let Some(record) = self.reversal_log.pop() {
            self.unrelocate(record);
        }
        self.objective = self.best_objective;
    }

    pub(crate) fn clear_reversal_log(&mut self) {
        self.reversal_log.clear();
    }

    /// Removes empty groups from every project and rebuilds the location
    /// index if anything changed.
    ///
    /// Empty groups are legal only within a neighborhood visit; the driver
    /// calls this at the end of every iteration.
    pub(crate) fn prune_empty_groups(&mut self) {
        let mut changed = false;
        for project_groups in &mut self.groups {
            if project_groups.iter().any(|g| g.is_empty()) {
                project_groups.retain(|g| !g.is_empty());
                changed = true;
            }
        }
        if changed {
            self.rebuild_locations();
        }
    }

    fn rebuild_locations(&mut self) {
        for (p_idx, project_groups) in self.groups.iter().enumerate() {
            for (g_idx, members) in project_groups.iter().enumerate() {
                for &student in members {
                    self.locations[student] = Location::Group {
                        project: p_idx,
                        group: g_idx,
                    };
                }
            }
        }
        for &student in &self.unassigned {
            self.locations[student] = Location::Unassigned;
        }
    }

    /// Converts the current state into the API result format.
    pub fn to_solver_result(
        &self,
        improvement_log: Vec<ImprovementRecord>,
        consistency_failure: Option<ConsistencyReport>,
        iterations_run: u64,
        elapsed_seconds: f64,
    ) -> SolverResult {
        let student_ref = |id: usize| StudentRef {
            id,
            name: self.students[id].name.clone(),
        };
        let assignment = self
            .projects
            .iter()
            .enumerate()
            .map(|(p_idx, project)| ProjectAssignment {
                project: project.name.clone(),
                groups: self.groups[p_idx]
                    .iter()
                    .filter(|members| !members.is_empty())
                    .map(|members| members.iter().map(|&s| student_ref(s)).collect())
                    .collect(),
            })
            .collect();
        let unassigned = self.unassigned.iter().map(|&s| student_ref(s)).collect();

        SolverResult {
            objective: self.objective,
            assignment,
            unassigned,
            improvement_log,
            consistency_failure,
            iterations_run,
            elapsed_seconds,
        }
    }
}
