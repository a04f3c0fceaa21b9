//! Variable Neighborhood Descent: best-improvement search over ordered
//! tuples of relocations.
//!
//! For a tuple size n the search enumerates every combination of n distinct
//! students (lexicographic by id) against every ordered choice of
//! destinations, evaluates the composite delta by temporarily applying the
//! legs, and commits the best strictly positive find. The tuple size expands
//! on non-improvement and resets to one on improvement, until it exceeds the
//! cap.
//!
//! All tie-breaking is by enumeration order, so the descent is fully
//! deterministic.

use super::{Location, Relocation};
use crate::solver::State;

impl State {
    /// Runs the descent with tuple sizes 1..=`max_to_move`.
    pub(crate) fn descend(&mut self, max_to_move: usize, across_projects: bool) {
        let mut tuple_size = 1;
        while tuple_size <= max_to_move {
            match self.best_tuple(tuple_size, across_projects) {
                Some((legs, delta)) => {
                    self.apply_legs(&legs);
                    self.objective += delta;
                    tuple_size = 1;
                }
                None => tuple_size += 1,
            }
        }
    }

    /// Finds the best strictly improving tuple of `tuple_size` relocations,
    /// or `None` when no tuple improves the objective.
    fn best_tuple(
        &mut self,
        tuple_size: usize,
        across_projects: bool,
    ) -> Option<(Vec<Relocation>, i64)> {
        let destinations = self.destination_list();
        // The combination list is taken out of the cache for the duration of
        // the scan so the state can be mutated while iterating it.
        let combos = self
            .combo_cache
            .remove(&tuple_size)
            .unwrap_or_else(|| all_combinations(self.students.len(), tuple_size));

        let mut best: Option<(Vec<Relocation>, i64)> = None;
        for combo in &combos {
            if !self.departures_feasible(combo) {
                continue;
            }
            self.scan_destination_tuples(combo, &destinations, across_projects, &mut best);
        }

        self.combo_cache.insert(tuple_size, combos);
        best
    }

    /// The active destination set: every non-empty group in (project, group)
    /// order, then the unassigned pool.
    fn destination_list(&self) -> Vec<Location> {
        let mut destinations: Vec<Location> = Vec::new();
        for (p_idx, project_groups) in self.groups.iter().enumerate() {
            for (g_idx, members) in project_groups.iter().enumerate() {
                if !members.is_empty() {
                    destinations.push(Location::Group {
                        project: p_idx,
                        group: g_idx,
                    });
                }
            }
        }
        destinations.push(Location::Unassigned);
        destinations
    }

    /// Cheap combination-level gate: a source group dropping below its
    /// minimum size can only be saved by arrivals from the other legs, so a
    /// deficit larger than the number of other legs is hopeless.
    fn departures_feasible(&self, combo: &[usize]) -> bool {
        let mut source_groups: Vec<(usize, usize, usize)> = Vec::new();
        for &student in combo {
            if let Location::Group { project, group } = self.locations[student] {
                match source_groups
                    .iter_mut()
                    .find(|(p, g, _)| *p == project && *g == group)
                {
                    Some(entry) => entry.2 += 1,
                    None => source_groups.push((project, group, 1)),
                }
            }
        }
        for &(project, group, leavers) in &source_groups {
            let staying = self.groups[project][group].len() as i64 - leavers as i64;
            let deficit = self.projects[project].min_group_size as i64 - staying;
            if deficit > (combo.len() - leavers) as i64 {
                return false;
            }
        }
        true
    }

    /// Enumerates all ordered destination tuples for one combination and
    /// keeps the best strictly positive delta found so far.
    fn scan_destination_tuples(
        &mut self,
        combo: &[usize],
        destinations: &[Location],
        across_projects: bool,
        best: &mut Option<(Vec<Relocation>, i64)>,
    ) {
        // Per-leg destination candidates: never the student's own location,
        // and same-project only when the descent is project-local. Unassigned
        // legs are permitted on both sides of that restriction.
        let mut candidates: Vec<Vec<Location>> = Vec::with_capacity(combo.len());
        for &student in combo {
            let current = self.locations[student];
            let options: Vec<Location> = destinations
                .iter()
                .copied()
                .filter(|&dest| {
                    if dest == current {
                        return false;
                    }
                    if !across_projects {
                        if let (
                            Location::Group {
                                project: current_project,
                                ..
                            },
                            Location::Group {
                                project: dest_project,
                                ..
                            },
                        ) = (current, dest)
                        {
                            return current_project == dest_project;
                        }
                    }
                    true
                })
                .collect();
            if options.is_empty() {
                return;
            }
            candidates.push(options);
        }

        let tuple_size = combo.len();
        let mut cursor = vec![0usize; tuple_size];
        loop {
            let dests: Vec<Location> = cursor
                .iter()
                .enumerate()
                .map(|(leg, &choice)| candidates[leg][choice])
                .collect();
            if let Some(delta) = self.evaluate_tuple(combo, &dests) {
                if delta > 0 && best.as_ref().is_none_or(|(_, b)| delta > *b) {
                    let legs = combo
                        .iter()
                        .zip(&dests)
                        .map(|(&student, &to)| Relocation {
                            student,
                            from: self.locations[student],
                            to,
                        })
                        .collect();
                    *best = Some((legs, delta));
                }
            }
            // advance the odometer, last leg fastest
            let mut leg = tuple_size;
            loop {
                if leg == 0 {
                    return;
                }
                leg -= 1;
                cursor[leg] += 1;
                if cursor[leg] < candidates[leg].len() {
                    break;
                }
                cursor[leg] = 0;
            }
        }
    }

    /// Computes the composite delta of one tuple by temporarily applying it:
    /// all removals first, then the arrivals in leg order so that capacity
    /// and bilateral rewards see the intermediate composition. Returns `None`
    /// when a destination overflows or a source group ends below its minimum
    /// size. The state is restored exactly before returning.
    fn evaluate_tuple(&mut self, combo: &[usize], dests: &[Location]) -> Option<i64> {
        let mut delta = 0i64;
        let mut lifted: Vec<(usize, Location, usize)> = Vec::with_capacity(combo.len());
        for &student in combo {
            let origin = self.locations[student];
            delta += self.leaving_delta(origin, student);
            let pos = self.take_from(origin, student);
            lifted.push((student, origin, pos));
        }

        let mut feasible = true;
        let mut placed: Vec<Location> = Vec::with_capacity(combo.len());
        for (leg, &student) in combo.iter().enumerate() {
            let dest = dests[leg];
            if let Location::Group { project, group } = dest {
                if self.groups[project][group].len() >= self.projects[project].max_group_size {
                    feasible = false;
                    break;
                }
            }
            delta += self.arriving_delta(dest, student);
            self.put_at_end(dest, student);
            placed.push(dest);
        }

        if feasible {
            for &(_, origin, _) in &lifted {
                if let Location::Group { project, group } = origin {
                    if self.groups[project][group].len() < self.projects[project].min_group_size {
                        feasible = false;
                        break;
                    }
                }
            }
        }

        for (leg, &dest) in placed.iter().enumerate().rev() {
            self.take_from(dest, combo[leg]);
        }
        for &(student, origin, pos) in lifted.iter().rev() {
            self.put_at(origin, student, pos);
        }

        feasible.then_some(delta)
    }

    /// Commits a tuple through the logged primitive, in the same two-phase
    /// order the evaluation used: every student out to the unassigned pool,
    /// then every student into its destination.
    fn apply_legs(&mut self, legs: &[Relocation]) {
        for leg in legs {
            self.relocate_logged(leg.student, leg.from, Location::Unassigned);
        }
        for leg in legs {
            self.relocate_logged(leg.student, Location::Unassigned, leg.to);
        }
    }
}

/// All k-element combinations of `0..pool_size` in lexicographic order.
fn all_combinations(pool_size: usize, tuple_size: usize) -> Vec<Vec<usize>> {
    let mut result = Vec::new();
    if tuple_size == 0 || tuple_size > pool_size {
        return result;
    }
    let mut current: Vec<usize> = (0..tuple_size).collect();
    loop {
        result.push(current.clone());
        let mut pos = tuple_size;
        while pos > 0 && current[pos - 1] == pool_size - tuple_size + pos - 1 {
            pos -= 1;
        }
        if pos == 0 {
            return result;
        }
        current[pos - 1] += 1;
        for follow in pos..tuple_size {
            current[follow] = current[follow - 1] + 1;
        }
    }
}
