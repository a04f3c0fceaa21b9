//! Move primitives for the solver.
//!
//! Everything the search does to a solution goes through the relocation
//! primitive defined here: moving one student between a group and the
//! unassigned pool, or between two groups. The richer moves (shake, descent
//! tuples, structural bundles) are composed from it in the sibling modules.

mod descent;
mod shake;
mod structural;

use super::{MoveRecord, State};

/// Where a student currently lives.
///
/// The unassigned pool is a first-class location, not a sentinel group;
/// comparing against it is a test on the enum tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Unassigned,
    Group { project: usize, group: usize },
}

/// One leg of a composite move: a student travelling from one location to
/// another.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Relocation {
    pub student: usize,
    pub from: Location,
    pub to: Location,
}

impl State {
    /// Moves a student from `from` to `to`, returning the position the
    /// student occupied in the source container.
    ///
    /// `Unassigned -> Unassigned` is a permitted no-op; any other violation
    /// of the contract (student not at `from`, destination group full, a
    /// "move" within one group) is a programmer error and is refused.
    pub(crate) fn relocate(&mut self, student: usize, from: Location, to: Location) -> usize {
        if from == Location::Unassigned && to == Location::Unassigned {
            return 0;
        }
        assert!(
            from != to,
            "relocation of student {student} within one group is not a move"
        );
        let from_pos = self.take_from(from, student);
        self.put_at_end(to, student);
        self.locations[student] = to;
        from_pos
    }

    /// Exact inverse of a recorded relocation: removes the student from the
    /// destination and re-inserts it at its original source position.
    pub(crate) fn unrelocate(&mut self, record: MoveRecord) {
        self.take_from(record.to, record.student);
        self.put_at(record.from, record.student, record.from_pos);
        self.locations[record.student] = record.from;
    }

    /// Relocates and appends the move to the reversal log.
    pub(crate) fn relocate_logged(&mut self, student: usize, from: Location, to: Location) {
        if from == Location::Unassigned && to == Location::Unassigned {
            return;
        }
        let from_pos = self.relocate(student, from, to);
        self.reversal_log.push(MoveRecord {
            student,
            from,
            to,
            from_pos,
        });
    }

    /// Applies a single relocation permanently: logs it for reversal and
    /// folds its delta into the cached objective. Returns the delta.
    pub(crate) fn apply_relocation(&mut self, student: usize, from: Location, to: Location) -> i64 {
        if from == to {
            return 0;
        }
        let delta = self.leaving_delta(from, student) + self.arriving_delta(to, student);
        self.relocate_logged(student, from, to);
        self.objective += delta;
        delta
    }

    fn take_from(&mut self, loc: Location, student: usize) -> usize {
        let container = self.container_mut(loc);
        let pos = container
            .iter()
            .position(|&s| s == student)
            .unwrap_or_else(|| panic!("student {student} is not at {loc:?}"));
        container.remove(pos);
        pos
    }

    fn put_at_end(&mut self, loc: Location, student: usize) {
        if let Location::Group { project, group } = loc {
            let capacity = self.projects[project].max_group_size;
            assert!(
                self.groups[project][group].len() < capacity,
                "group {group} of project {project} is already at maximum size"
            );
        }
        self.container_mut(loc).push(student);
    }

    fn put_at(&mut self, loc: Location, student: usize, pos: usize) {
        self.container_mut(loc).insert(pos, student);
    }

    fn container_mut(&mut self, loc: Location) -> &mut Vec<usize> {
        match loc {
            Location::Unassigned => &mut self.unassigned,
            Location::Group { project, group } => &mut self.groups[project][group],
        }
    }
}
