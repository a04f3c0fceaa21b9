//! Structural moves: founding a new group and dissolving an existing one.
//!
//! Each candidate is evaluated greedily as a composite bundle with a single
//! net delta, then reverted; the globally best bundle (random tie-break) is
//! applied permanently with every leg logged for reversal. The empty shell a
//! dissolution leaves behind, or that a reverted founding would leave, is
//! cleaned up by the driver's end-of-iteration pruning.

use super::{Location, Relocation};
use crate::solver::State;
use rand::Rng;

/// One evaluated composite move: the legs to replay, the net delta, and the
/// project that needs a fresh empty group opened first (founding only).
struct Bundle {
    legs: Vec<Relocation>,
    delta: i64,
    founds_group_in: Option<usize>,
}

impl State {
    /// Evaluates every founding and dissolution candidate, applies the bundle
    /// with the maximum net delta and returns that delta. Returns 0 when no
    /// candidate exists.
    pub(crate) fn structural_move<R: Rng>(&mut self, rng: &mut R) -> i64 {
        let mut bundles: Vec<Bundle> = Vec::new();
        for p_idx in 0..self.projects.len() {
            if self.groups[p_idx].len() < self.projects[p_idx].max_num_groups {
                if let Some(bundle) = self.evaluate_founding(p_idx, rng) {
                    bundles.push(bundle);
                }
            }
        }
        for p_idx in 0..self.projects.len() {
            for g_idx in 0..self.groups[p_idx].len() {
                if !self.groups[p_idx][g_idx].is_empty() {
                    bundles.push(self.evaluate_dissolution(p_idx, g_idx, rng));
                }
            }
        }
        if bundles.is_empty() {
            return 0;
        }

        let best_delta = bundles.iter().map(|b| b.delta).max().unwrap();
        let top: Vec<usize> = bundles
            .iter()
            .enumerate()
            .filter(|(_, b)| b.delta == best_delta)
            .map(|(i, _)| i)
            .collect();
        let chosen = &bundles[top[rng.random_range(0..top.len())]];

        if let Some(p_idx) = chosen.founds_group_in {
            self.groups[p_idx].push(Vec::new());
        }
        for leg in &chosen.legs {
            self.relocate_logged(leg.student, leg.from, leg.to);
        }
        self.objective += chosen.delta;
        chosen.delta
    }

    /// Opens a tentative empty group and fills it greedily with the best
    /// single-student additions until the marginal delta turns negative past
    /// the minimum size, the group is full, or donors run out. Keeps the
    /// bundle only if the group reaches the minimum size.
    fn evaluate_founding<R: Rng>(&mut self, p_idx: usize, rng: &mut R) -> Option<Bundle> {
        let ideal = self.projects[p_idx].ideal_group_size;
        let min_size = self.projects[p_idx].min_group_size;
        let max_size = self.projects[p_idx].max_group_size;

        // An empty group sits the full ideal size below its setpoint; the
        // extra-group charge counts the open group shells, empty or not.
        let mut delta = -self.projects[p_idx].penalty_size_deviation * ideal as i64;
        if self.groups[p_idx].len() >= self.projects[p_idx].desired_num_groups {
            delta -= self.projects[p_idx].penalty_extra_group;
        }

        let g_idx = self.groups[p_idx].len();
        self.groups[p_idx].push(Vec::new());
        let target = Location::Group {
            project: p_idx,
            group: g_idx,
        };

        let mut legs: Vec<Relocation> = Vec::new();
        let mut undo: Vec<(usize, Location, usize)> = Vec::new();
        while self.groups[p_idx][g_idx].len() < max_size {
            let mut moves: Vec<(Location, usize, i64)> = Vec::new();
            for &student in &self.unassigned {
                let gain = self.leaving_delta(Location::Unassigned, student)
                    + self.arriving_delta(target, student);
                moves.push((Location::Unassigned, student, gain));
            }
            for (dp_idx, donor_groups) in self.groups.iter().enumerate() {
                for (dg_idx, members) in donor_groups.iter().enumerate() {
                    if dp_idx == p_idx && dg_idx == g_idx {
                        continue;
                    }
                    if members.len() <= self.projects[dp_idx].min_group_size {
                        continue;
                    }
                    let donor = Location::Group {
                        project: dp_idx,
                        group: dg_idx,
                    };
                    for &student in members {
                        let gain = self.leaving_delta(donor, student)
                            + self.arriving_delta(target, student);
                        moves.push((donor, student, gain));
                    }
                }
            }
            let Some(best_gain) = moves.iter().map(|&(_, _, gain)| gain).max() else {
                break;
            };
            if best_gain < 0 && self.groups[p_idx][g_idx].len() >= min_size {
                break;
            }
            let top: Vec<&(Location, usize, i64)> =
                moves.iter().filter(|&&(_, _, gain)| gain == best_gain).collect();
            let &(from, student, _) = top[rng.random_range(0..top.len())];
            let pos = self.relocate(student, from, target);
            undo.push((student, from, pos));
            legs.push(Relocation {
                student,
                from,
                to: target,
            });
            delta += best_gain;
        }

        let reached_min = self.groups[p_idx][g_idx].len() >= min_size;
        for &(student, from, pos) in undo.iter().rev() {
            self.take_from(target, student);
            self.put_at(from, student, pos);
            self.locations[student] = from;
        }
        self.groups[p_idx].pop();

        reached_min.then_some(Bundle {
            legs,
            delta,
            founds_group_in: Some(p_idx),
        })
    }

    /// Empties one group, sending each member to its best arrival (other
    /// groups with spare capacity or the unassigned pool, random tie-break),
    /// and nets the bundle against the rewards and penalties the group
    /// carried.
    fn evaluate_dissolution<R: Rng>(&mut self, p_idx: usize, g_idx: usize, rng: &mut R) -> Bundle {
        let members = self.groups[p_idx][g_idx].clone();
        let source = Location::Group {
            project: p_idx,
            group: g_idx,
        };

        let mut delta = 0i64;
        for &student in &members {
            delta -= self.students[student].prefs[p_idx];
        }
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                if self.mutual[a][b] {
                    delta -= self.reward_bilateral;
                }
            }
        }
        if self.non_empty_group_count(p_idx) > self.projects[p_idx].desired_num_groups {
            delta += self.projects[p_idx].penalty_extra_group;
        }
        delta += self.projects[p_idx].penalty_size_deviation
            * (members.len() as i64 - self.projects[p_idx].ideal_group_size as i64).abs();

        let mut legs: Vec<Relocation> = Vec::new();
        let mut undo: Vec<(usize, Location, usize)> = Vec::new();
        for &student in &members {
            let mut arrivals: Vec<(Location, i64)> =
                vec![(Location::Unassigned, -self.penalty_non_assignment)];
            for (dp_idx, dest_groups) in self.groups.iter().enumerate() {
                for (dg_idx, dest_members) in dest_groups.iter().enumerate() {
                    if dp_idx == p_idx && dg_idx == g_idx {
                        continue;
                    }
                    if dest_members.is_empty()
                        || dest_members.len() >= self.projects[dp_idx].max_group_size
                    {
                        continue;
                    }
                    let dest = Location::Group {
                        project: dp_idx,
                        group: dg_idx,
                    };
                    arrivals.push((dest, self.arriving_delta(dest, student)));
                }
            }
            let best_gain = arrivals.iter().map(|&(_, gain)| gain).max().unwrap();
            let top: Vec<&(Location, i64)> = arrivals
                .iter()
                .filter(|&&(_, gain)| gain == best_gain)
                .collect();
            let &(to, _) = top[rng.random_range(0..top.len())];
            let pos = self.relocate(student, source, to);
            undo.push((student, to, pos));
            legs.push(Relocation {
                student,
                from: source,
                to,
            });
            delta += best_gain;
        }

        for &(student, to, pos) in undo.iter().rev() {
            self.take_from(to, student);
            self.put_at(source, student, pos);
            self.locations[student] = source;
        }

        Bundle {
            legs,
            delta,
            founds_group_in: None,
        }
    }
}
