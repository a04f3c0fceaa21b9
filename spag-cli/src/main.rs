//! spag-cli: command-line interface for the SPAG group-building solver.
//!
//! # Commands
//!
//! - `solve`: run the solver on an instance and print or write the result
//! - `validate`: parse an instance and report validity without solving
//! - `check`: run the solver in testing mode and report the self-check verdict
//!
//! Instances are accepted either as a single JSON problem file or as the
//! classic CSV pair (one projects table, one students table with JSON-encoded
//! list columns).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use spag_core::models::{
    ApiInput, ProblemDefinition, ProjectSpec, ReportingMode, SolverConfiguration, StudentSpec,
};
use spag_core::run_solver;
use spag_core::solver::State;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "spag-cli")]
#[command(version = "0.1.0")]
#[command(about = "Student-project allocation with group building", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct InstanceArgs {
    /// Single JSON input file holding the problem and optional solver config
    #[arg(long, value_name = "FILE", conflicts_with_all = ["projects", "students"])]
    input: Option<PathBuf>,

    /// Projects CSV table (requires --students)
    #[arg(long, value_name = "FILE", requires = "students")]
    projects: Option<PathBuf>,

    /// Students CSV table (requires --projects)
    #[arg(long, value_name = "FILE", requires = "projects")]
    students: Option<PathBuf>,

    /// Solver configuration JSON file (CSV inputs only)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the solver on an instance
    Solve {
        #[command(flatten)]
        instance: InstanceArgs,

        /// Override the random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Override the iteration budget
        #[arg(long)]
        iterations: Option<u64>,

        /// Override the wall-time budget in seconds
        #[arg(long)]
        time_limit: Option<u64>,

        /// Log one message per iteration while solving
        #[arg(long)]
        demonstrate: bool,

        /// Collect and print the improvement log
        #[arg(long, conflicts_with = "demonstrate")]
        benchmark: bool,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Print the human-readable assignment instead of JSON
        #[arg(long, conflicts_with = "pretty")]
        text: bool,
    },

    /// Validate an instance without solving
    Validate {
        #[command(flatten)]
        instance: InstanceArgs,
    },

    /// Run the solver with the self-check armed and report the verdict
    Check {
        #[command(flatten)]
        instance: InstanceArgs,

        /// Random seed for the checked run
        #[arg(long, default_value = "100")]
        seed: u64,

        /// Iteration budget for the checked run
        #[arg(long, default_value = "40")]
        iterations: u64,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            instance,
            seed,
            iterations,
            time_limit,
            demonstrate,
            benchmark,
            output,
            pretty,
            text,
        } => {
            let mut input = load_instance(&instance)?;
            if let Some(seed) = seed {
                input.solver.seed = Some(seed);
            }
            if iterations.is_some() {
                input.solver.stop_conditions.max_iterations = iterations;
            }
            if time_limit.is_some() {
                input.solver.stop_conditions.time_limit_seconds = time_limit;
            }
            if demonstrate {
                input.solver.mode = ReportingMode::Demonstration;
            }
            if benchmark {
                input.solver.mode = ReportingMode::Benchmarking;
            }
            cmd_solve(&input, output, pretty, text)
        }
        Commands::Validate { instance } => cmd_validate(&load_instance(&instance)?),
        Commands::Check {
            instance,
            seed,
            iterations,
        } => {
            let mut input = load_instance(&instance)?;
            input.solver.seed = Some(seed);
            input.solver.stop_conditions.max_iterations = Some(iterations);
            input.solver.mode = ReportingMode::Testing;
            cmd_check(&input)
        }
    }
}

fn cmd_solve(input: &ApiInput, output: Option<PathBuf>, pretty: bool, text: bool) -> Result<()> {
    let result = run_solver(input).map_err(|e| anyhow::anyhow!("solver error: {e}"))?;

    let rendered = if text {
        result.display()
    } else if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };

    match output {
        Some(path) => {
            fs::write(&path, &rendered)
                .with_context(|| format!("failed to write output to {path:?}"))?;
            eprintln!("Result written to {path:?}");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn cmd_validate(input: &ApiInput) -> Result<()> {
    match State::new(input) {
        Ok(state) => {
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "projects": state.projects.len(),
                    "students": state.students.len(),
                    "initial_objective": state.objective,
                })
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", serde_json::json!({ "valid": false, "error": e.to_string() }));
            std::process::exit(1);
        }
    }
}

fn cmd_check(input: &ApiInput) -> Result<()> {
    let result = run_solver(input).map_err(|e| anyhow::anyhow!("solver error: {e}"))?;
    match &result.consistency_failure {
        None => {
            println!(
                "{}",
                serde_json::json!({
                    "consistent": true,
                    "iterations": result.iterations_run,
                    "objective": result.objective,
                })
            );
            Ok(())
        }
        Some(report) => {
            println!(
                "{}",
                serde_json::json!({ "consistent": false, "report": report })
            );
            std::process::exit(1);
        }
    }
}

fn load_instance(args: &InstanceArgs) -> Result<ApiInput> {
    if let Some(path) = &args.input {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {path:?}"))?;
        return serde_json::from_str(&json).context("failed to parse input JSON");
    }
    let (Some(projects_path), Some(students_path)) = (&args.projects, &args.students) else {
        bail!("provide either --input FILE or both --projects FILE and --students FILE");
    };

    let problem = ProblemDefinition {
        projects: read_projects_csv(projects_path)?,
        students: read_students_csv(students_path)?,
    };
    let solver = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {path:?}"))?;
            serde_json::from_str(&json).context("failed to parse config JSON")?
        }
        None => SolverConfiguration::default(),
    };
    Ok(ApiInput { problem, solver })
}

fn read_projects_csv(path: &Path) -> Result<Vec<ProjectSpec>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open projects table {path:?}"))?;
    let mut projects = Vec::new();
    for record in reader.deserialize() {
        let project: ProjectSpec = record.context("malformed projects row")?;
        projects.push(project);
    }
    Ok(projects)
}

/// Row shape of the students table: the list-valued columns arrive as
/// JSON-encoded strings inside their CSV cells.
#[derive(Deserialize)]
struct StudentRow {
    name: String,
    fav_partners: String,
    project_prefs: String,
}

fn read_students_csv(path: &Path) -> Result<Vec<StudentSpec>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open students table {path:?}"))?;
    let mut students = Vec::new();
    for record in reader.deserialize() {
        let row: StudentRow = record.context("malformed students row")?;
        students.push(StudentSpec {
            fav_partners: serde_json::from_str(&row.fav_partners)
                .with_context(|| format!("bad fav_partners list for student {}", row.name))?,
            project_prefs: serde_json::from_str(&row.project_prefs)
                .with_context(|| format!("bad project_prefs list for student {}", row.name))?,
            name: row.name,
        });
    }
    Ok(students)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_instance_files(dir: &Path) -> (PathBuf, PathBuf) {
        let projects_path = dir.join("projects.csv");
        let students_path = dir.join("students.csv");
        let mut projects = fs::File::create(&projects_path).unwrap();
        writeln!(
            projects,
            "name,desired_num_groups,max_num_groups,ideal_group_size,min_group_size,\
             max_group_size,penalty_extra_group,penalty_deviation_from_ideal_group_size"
        )
        .unwrap();
        writeln!(projects, "Compilers,1,2,2,1,3,2,1").unwrap();
        writeln!(projects, "Databases,1,1,2,2,2,0,0").unwrap();
        let mut students = fs::File::create(&students_path).unwrap();
        writeln!(students, "name,fav_partners,project_prefs").unwrap();
        writeln!(students, "Ada,\"[1]\",\"[3, 0]\"").unwrap();
        writeln!(students, "Grace,\"[0]\",\"[3, 1]\"").unwrap();
        writeln!(students, "Edsger,\"[]\",\"[0, 3]\"").unwrap();
        writeln!(students, "Barbara,\"[]\",\"[1, 3]\"").unwrap();
        (projects_path, students_path)
    }

    #[test]
    fn csv_pair_round_trips_through_the_loader() {
        let dir = tempfile::tempdir().unwrap();
        let (projects_path, students_path) = write_instance_files(dir.path());
        let args = InstanceArgs {
            input: None,
            projects: Some(projects_path),
            students: Some(students_path),
            config: None,
        };
        let input = load_instance(&args).unwrap();

        assert_eq!(input.problem.projects.len(), 2);
        assert_eq!(input.problem.projects[0].name, "Compilers");
        assert_eq!(input.problem.students.len(), 4);
        assert_eq!(input.problem.students[0].fav_partners, vec![1]);
        assert_eq!(input.problem.students[2].project_prefs, vec![0, 3]);

        let mut input = input;
        input.solver.seed = Some(100);
        let result = run_solver(&input).unwrap();
        // Both mutual pairs land on their preferred project.
        assert_eq!(result.objective, 14);
        assert!(result.unassigned.is_empty());
    }

    #[test]
    fn json_instance_loads_with_embedded_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("instance.json");
        fs::write(
            &path,
            r#"{
                "problem": {
                    "projects": [{
                        "name": "Solo",
                        "desired_num_groups": 1,
                        "max_num_groups": 1,
                        "ideal_group_size": 2,
                        "min_group_size": 2,
                        "max_group_size": 2,
                        "penalty_extra_group": 0,
                        "penalty_deviation_from_ideal_group_size": 0
                    }],
                    "students": [
                        {"name": "a", "fav_partners": [1], "project_prefs": [3]},
                        {"name": "b", "fav_partners": [0], "project_prefs": [3]}
                    ]
                },
                "solver": {"seed": 100, "mode": "silent"}
            }"#,
        )
        .unwrap();
        let args = InstanceArgs {
            input: Some(path),
            projects: None,
            students: None,
            config: None,
        };
        let input = load_instance(&args).unwrap();
        assert_eq!(input.solver.seed, Some(100));
        let result = run_solver(&input).unwrap();
        assert_eq!(result.objective, 8);
    }
}
