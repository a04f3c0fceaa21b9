//! Randomized perturbation: move a handful of students to random feasible
//! destinations before the descent runs.
//!
//! Departures are drawn first, with a bias toward currently unassigned
//! students; each departure then gets an arrival drawn from the feasible
//! targets. Running out of candidates is not an error, the step simply
//! applies fewer relocations than requested.

use super::Location;
use crate::solver::State;
use rand::Rng;

impl State {
    /// Relocates up to `count` distinct students at random.
    ///
    /// With probability `min(1, unassigned_share * assignment_bias)` a
    /// departure is drawn from the unassigned pool; otherwise from a group
    /// that keeps its minimum size after all tentative departures. Group
    /// residents are sent to the unassigned pool with probability
    /// `unassignment_probability`, otherwise to another group of the same
    /// project (`across_projects = false`) or of a different project
    /// (`across_projects = true`).
    pub(crate) fn shake<R: Rng>(
        &mut self,
        count: usize,
        across_projects: bool,
        assignment_bias: f64,
        unassignment_probability: f64,
        rng: &mut R,
    ) {
        let student_count = self.students.len();
        let mut departing = vec![false; student_count];
        let mut departures: Vec<(Location, usize)> = Vec::with_capacity(count);

        while departures.len() < count {
            let pool: Vec<usize> = self
                .unassigned
                .iter()
                .copied()
                .filter(|&s| !departing[s])
                .collect();
            let pick_unassigned =
                ((pool.len() as f64 / student_count as f64) * assignment_bias).min(1.0);
            if !pool.is_empty() && rng.random_bool(pick_unassigned) {
                let student = pool[rng.random_range(0..pool.len())];
                departing[student] = true;
                departures.push((Location::Unassigned, student));
                continue;
            }

            // Groups that can still spare a member once the tentative
            // departures are taken out.
            let mut eligible: Vec<(usize, usize)> = Vec::new();
            for (p_idx, project) in self.projects.iter().enumerate() {
                for (g_idx, members) in self.groups[p_idx].iter().enumerate() {
                    let staying = members.iter().filter(|&&s| !departing[s]).count();
                    if staying > project.min_group_size {
                        eligible.push((p_idx, g_idx));
                    }
                }
            }
            if !eligible.is_empty() {
                let (p_idx, g_idx) = eligible[rng.random_range(0..eligible.len())];
                let staying: Vec<usize> = self.groups[p_idx][g_idx]
                    .iter()
                    .copied()
                    .filter(|&s| !departing[s])
                    .collect();
                let student = staying[rng.random_range(0..staying.len())];
                departing[student] = true;
                departures.push((
                    Location::Group {
                        project: p_idx,
                        group: g_idx,
                    },
                    student,
                ));
            } else if !pool.is_empty() {
                let student = pool[rng.random_range(0..pool.len())];
                departing[student] = true;
                departures.push((Location::Unassigned, student));
            } else {
                break;
            }
        }

        for (from, student) in departures {
            let to = match from {
                Location::Unassigned => self.draw_arrival_for_unassigned(rng),
                Location::Group { project, group } => {
                    if rng.random_bool(unassignment_probability) {
                        Location::Unassigned
                    } else {
                        self.draw_arrival_for_resident(project, group, across_projects, rng)
                    }
                }
            };
            self.apply_relocation(student, from, to);
        }
    }

    /// Uniform project with room, then uniform group within it. Falls back to
    /// staying unassigned when every group is full.
    fn draw_arrival_for_unassigned<R: Rng>(&self, rng: &mut R) -> Location {
        let open_projects: Vec<usize> = (0..self.projects.len())
            .filter(|&p_idx| {
                self.groups[p_idx]
                    .iter()
                    .any(|g| !g.is_empty() && g.len() < self.projects[p_idx].max_group_size)
            })
            .collect();
        if open_projects.is_empty() {
            return Location::Unassigned;
        }
        let p_idx = open_projects[rng.random_range(0..open_projects.len())];
        let open_groups: Vec<usize> = (0..self.groups[p_idx].len())
            .filter(|&g_idx| {
                let members = &self.groups[p_idx][g_idx];
                !members.is_empty() && members.len() < self.projects[p_idx].max_group_size
            })
            .collect();
        Location::Group {
            project: p_idx,
            group: open_groups[rng.random_range(0..open_groups.len())],
        }
    }

    /// Uniform non-empty group with room, other than the current one,
    /// restricted by project scope. Falls back to the unassigned pool.
    fn draw_arrival_for_resident<R: Rng>(
        &self,
        project: usize,
        group: usize,
        across_projects: bool,
        rng: &mut R,
    ) -> Location {
        let mut targets: Vec<(usize, usize)> = Vec::new();
        for (p_idx, params) in self.projects.iter().enumerate() {
            if across_projects == (p_idx == project) {
                continue;
            }
            for (g_idx, members) in self.groups[p_idx].iter().enumerate() {
                if p_idx == project && g_idx == group {
                    continue;
                }
                if !members.is_empty() && members.len() < params.max_group_size {
                    targets.push((p_idx, g_idx));
                }
            }
        }
        if targets.is_empty() {
            return Location::Unassigned;
        }
        let (p_idx, g_idx) = targets[rng.random_range(0..targets.len())];
        Location::Group {
            project: p_idx,
            group: g_idx,
        }
    }
}
