//! Task runner CLI.
//!
//! Loads task definitions from a resource directory (`task/<id>.json` plus
//! `task/transformer/<name>` resources), resolves them and walks them step by
//! step.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use task_runner::core::error::LoadError;
use task_runner::exit_codes;
use task_runner::io::config::{RunnerConfig, load_config};
use task_runner::io::registry::StepRegistry;
use task_runner::logging;
use task_runner::validate::{load_task, validate_task};
use task_runner::walk::walk_and_record;

#[derive(Parser)]
#[command(
    name = "task-runner",
    version,
    about = "Resolve and walk declarative research-study tasks"
)]
struct Cli {
    /// Config file (TOML). Defaults apply when it does not exist.
    #[arg(long, global = true, default_value = "task-runner.toml")]
    config: PathBuf,

    /// Resource root; overrides `resource_root` from the config.
    #[arg(long, global = true)]
    resources: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load, schema-check and resolve a task definition.
    Validate {
        /// Task identifier (`task/<task>.json`).
        task: String,
    },
    /// Print the fully resolved task as JSON.
    Resolve { task: String },
    /// Walk every step with empty results, printing progress.
    Walk {
        task: String,
        /// Write the final task result here.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = match configure(&cli.config, cli.resources.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    };
    logging::init(&config.log_filter);

    if let Err(err) = run(cli.command, &config) {
        eprintln!("{:#}", err);
        let code = if err.downcast_ref::<LoadError>().is_some() {
            exit_codes::INVALID
        } else {
            exit_codes::FAILED
        };
        std::process::exit(code);
    }
}

fn configure(path: &Path, resources: Option<&Path>) -> Result<RunnerConfig> {
    let mut config = load_config(path)?;
    if let Some(root) = resources {
        config.resource_root = root.to_path_buf();
    }
    config.validate()?;
    Ok(config)
}

fn run(command: Command, config: &RunnerConfig) -> Result<()> {
    let registry = StepRegistry::with_builtins();
    match command {
        Command::Validate { task } => cmd_validate(config, &registry, &task),
        Command::Resolve { task } => cmd_resolve(config, &registry, &task),
        Command::Walk { task, output } => cmd_walk(config, &registry, &task, output.as_deref()),
    }
}

fn cmd_validate(config: &RunnerConfig, registry: &StepRegistry, task: &str) -> Result<()> {
    let outcome = validate_task(config, registry, task)?;
    println!(
        "{}: ok ({} steps, {} sections, {} async actions)",
        outcome.task, outcome.leaves, outcome.sections, outcome.async_actions
    );
    for marker in &outcome.unknown_markers {
        println!("warning: progress marker '{marker}' matches no step");
    }
    Ok(())
}

fn cmd_resolve(config: &RunnerConfig, registry: &StepRegistry, task: &str) -> Result<()> {
    let task = load_task(config, registry, task)?;
    let payload = serde_json::to_string_pretty(&task).context("serialize resolved task")?;
    println!("{payload}");
    Ok(())
}

fn cmd_walk(
    config: &RunnerConfig,
    registry: &StepRegistry,
    task: &str,
    output: Option<&Path>,
) -> Result<()> {
    let task = load_task(config, registry, task)?;
    let outcome = walk_and_record(task, output, &mut io::stdout().lock())?;
    println!(
        "finished {} steps (run {})",
        outcome.visited.len(),
        outcome.task_result.task_run_uuid
    );
    Ok(())
}
