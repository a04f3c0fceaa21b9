//! Self-check facility: audits the solution structure and the cached
//! objective against a full recomputation.
//!
//! The checks here are only reachable through solver bugs, never through bad
//! input, so production runs skip them entirely. Testing mode runs them
//! after every step and turns the first violation into a structured report.

use super::{Location, State};
use crate::models::ConsistencyReport;

impl State {
    /// Runs the full invariant suite once.
    ///
    /// Returns `None` when the solution is consistent, otherwise a report
    /// carrying the specific violations: non-empty groups outside their size
    /// bounds, projects exceeding their group cap, a broken student
    /// partition, or a cached objective that disagrees with the
    /// recomputation. Empty groups are ignored, they are legal within a
    /// neighborhood visit.
    pub fn check_solution(&self) -> Option<ConsistencyReport> {
        let mut report = ConsistencyReport::default();
        let mut dirty = false;

        for (p_idx, project) in self.projects.iter().enumerate() {
            for (g_idx, members) in self.groups[p_idx].iter().enumerate() {
                if members.is_empty() {
                    continue;
                }
                if members.len() < project.min_group_size {
                    report.groups_too_small.push(format!(
                        "group {g_idx} of project {} has {} members, minimum is {}",
                        project.name,
                        members.len(),
                        project.min_group_size
                    ));
                    dirty = true;
                }
                if members.len() > project.max_group_size {
                    report.groups_too_big.push(format!(
                        "group {g_idx} of project {} has {} members, maximum is {}",
                        project.name,
                        members.len(),
                        project.max_group_size
                    ));
                    dirty = true;
                }
            }
            let non_empty = self.non_empty_group_count(p_idx);
            if non_empty > project.max_num_groups {
                report.too_many_groups.push(format!(
                    "project {} has {non_empty} non-empty groups, maximum is {}",
                    project.name, project.max_num_groups
                ));
                dirty = true;
            }
        }

        if !self.students_partitioned() {
            report.inconsistency_students = true;
            dirty = true;
        }

        let actual = self.recompute_objective();
        if actual != self.objective {
            report.claimed_obj = Some(self.objective);
            report.actual_obj = Some(actual);
            dirty = true;
        }

        dirty.then_some(report)
    }

    /// Every student must appear exactly once across all groups and the
    /// unassigned pool, and the location index must agree with the
    /// containers.
    fn students_partitioned(&self) -> bool {
        let mut occurrences = vec![0u32; self.students.len()];
        for (p_idx, project_groups) in self.groups.iter().enumerate() {
            for (g_idx, members) in project_groups.iter().enumerate() {
                for &student in members {
                    occurrences[student] += 1;
                    if self.locations[student]
                        != (Location::Group {
                            project: p_idx,
                            group: g_idx,
                        })
                    {
                        return false;
                    }
                }
            }
        }
        for &student in &self.unassigned {
            occurrences[student] += 1;
            if self.locations[student] != Location::Unassigned {
                return false;
            }
        }
        occurrences.iter().all(|&n| n == 1)
    }
}
