//! Formatting helpers for the solver state.

use super::State;

impl State {
    /// Formats the current solution in the shape of the demonstration
    /// printer: every project with its groups and members, then the
    /// unassigned students and the cached objective.
    pub fn format_solution(&self) -> String {
        let mut output = String::new();
        for (p_idx, project) in self.projects.iter().enumerate() {
            output.push_str(&format!("These are the groups in the project {}\n", project.name));
            for members in self.groups[p_idx].iter().filter(|m| !m.is_empty()) {
                output.push('\n');
                for &student in members {
                    output.push_str(&format!("  {} ({student})\n", self.students[student].name));
                }
            }
        }
        if self.unassigned.is_empty() {
            output.push_str("\nAll students were assigned.\n");
        } else {
            output.push_str("\nThese students were not assigned:\n");
            for &student in &self.unassigned {
                output.push_str(&format!("  {} ({student})\n", self.students[student].name));
            }
        }
        output.push_str(&format!("The objective value is: {}\n", self.objective));
        output
    }
}
