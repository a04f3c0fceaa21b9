//! Objective evaluation: full recomputation and the single-step delta
//! evaluators the search is built on.
//!
//! The full recomputation is used only to seed the cache and to audit it in
//! the self-check; everything on the hot path works with deltas. Composite
//! moves chain single-step deltas with intermediate container updates, so
//! each delta here must be exact for the state it is evaluated against.

use super::moves::Location;
use super::State;

impl State {
    /// Recomputes the objective of the current solution from scratch.
    ///
    /// Preference rewards and mutual-pair rewards per seated group, minus the
    /// unassignment penalty, the extra-group penalty per project and the
    /// size-deviation penalty per non-empty group. Empty groups contribute
    /// nothing.
    pub fn recompute_objective(&self) -> i64 {
        let mut total = 0i64;
        for (p_idx, project) in self.projects.iter().enumerate() {
            let mut non_empty = 0i64;
            for members in &self.groups[p_idx] {
                if members.is_empty() {
                    continue;
                }
                non_empty += 1;
                for &student in members {
                    total += self.students[student].prefs[p_idx];
                }
                for (i, &a) in members.iter().enumerate() {
                    for &b in &members[i + 1..] {
                        if self.mutual[a][b] {
                            total += self.reward_bilateral;
                        }
                    }
                }
                let deviation = (members.len() as i64 - project.ideal_group_size as i64).abs();
                total -= project.penalty_size_deviation * deviation;
            }
            let extra_groups = (non_empty - project.desired_num_groups as i64).max(0);
            total -= project.penalty_extra_group * extra_groups;
        }
        total -= self.penalty_non_assignment * self.unassigned.len() as i64;
        total
    }

    /// Objective change caused by `student` leaving `loc`.
    ///
    /// For a group location the student must currently be a member; the size
    /// term reflects a single-student step of the piecewise-linear deviation
    /// penalty.
    pub(crate) fn leaving_delta(&self, loc: Location, student: usize) -> i64 {
        match loc {
            Location::Unassigned => self.penalty_non_assignment,
            Location::Group { project, group } => {
                let members = &self.groups[project][group];
                let params = &self.projects[project];
                let mut delta = -self.students[student].prefs[project];
                delta -= self.reward_bilateral * self.mutual_partners_among(student, members);
                if members.len() > params.ideal_group_size {
                    delta += params.penalty_size_deviation;
                } else {
                    delta -= params.penalty_size_deviation;
                }
                delta
            }
        }
    }

    /// Objective change caused by `student` arriving at `loc`.
    ///
    /// For a group location the student must not yet be a member.
    pub(crate) fn arriving_delta(&self, loc: Location, student: usize) -> i64 {
        match loc {
            Location::Unassigned => -self.penalty_non_assignment,
            Location::Group { project, group } => {
                let members = &self.groups[project][group];
                let params = &self.projects[project];
                let mut delta = self.students[student].prefs[project];
                delta += self.reward_bilateral * self.mutual_partners_among(student, members);
                if members.len() < params.ideal_group_size {
                    delta += params.penalty_size_deviation;
                } else {
                    delta -= params.penalty_size_deviation;
                }
                delta
            }
        }
    }

    fn mutual_partners_among(&self, student: usize, members: &[usize]) -> i64 {
        members
            .iter()
            .filter(|&&other| other != student && self.mutual[student][other])
            .count() as i64
    }
}
