use std::path::PathBuf;
use std::process::Command;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{Result, TileforgeError};

/// A single external-tool invocation: program name plus argument list.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl std::fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Capability interface for running external tools. The contract with every
/// collaborator is the same: given these input paths, produce the expected
/// output path, or fail. Injectable so tests can record invocations instead
/// of shelling out.
pub trait ToolRunner: Send + Sync {
    fn run(&self, command: &ToolCommand) -> Result<()>;
}

/// Runs tools as child processes and surfaces stderr in the error.
pub struct ShellRunner;

impl ToolRunner for ShellRunner {
    fn run(&self, command: &ToolCommand) -> Result<()> {
        debug!(%command, "Running external tool");
        let output = Command::new(&command.program)
            .args(&command.args)
            .output()
            .map_err(|e| TileforgeError::ExternalTool {
                program: command.program.clone(),
                detail: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(TileforgeError::ExternalTool {
                program: command.program.clone(),
                detail: format!(
                    "exit status {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(())
    }
}

/// Run a command unless its expected output already exists.
///
/// Idempotence is the pipeline's primary resource-safety mechanism: every
/// stage checks for its output file and skips recomputation unless forced,
/// so a run is safely restartable after partial failure.
pub fn run_if_missing(
    runner: &dyn ToolRunner,
    command: &ToolCommand,
    expected_output: &PathBuf,
    force: bool,
) -> Result<bool> {
    if !force && expected_output.exists() {
        debug!(output = %expected_output.display(), "Output present, skipping");
        return Ok(false);
    }
    runner.run(command)?;
    if !expected_output.exists() {
        return Err(TileforgeError::ExternalTool {
            program: command.program.clone(),
            detail: format!(
                "completed without producing {}",
                expected_output.display()
            ),
        });
    }
    Ok(true)
}

/// One unit of fan-out work: a command and the output file it must produce.
#[derive(Clone, Debug)]
pub struct WorkItem {
    pub key: String,
    pub command: ToolCommand,
    pub expected_output: PathBuf,
}

/// Result of one dispatched work item.
#[derive(Debug)]
pub enum ItemOutcome {
    Completed,
    Skipped,
    Failed(TileforgeError),
}

impl ItemOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ItemOutcome::Failed(_))
    }
}

/// Fan a list of independent work items out to a bounded worker pool, or run
/// them serially when `workers <= 1`. Items whose output already exists are
/// skipped unless `force` is set. There are no retries and no cancellation;
/// each item fails or succeeds on its own.
pub fn run_items(
    runner: &dyn ToolRunner,
    items: &[WorkItem],
    workers: usize,
    force: bool,
) -> Result<Vec<(String, ItemOutcome)>> {
    let run_one = |item: &WorkItem| -> (String, ItemOutcome) {
        let outcome = match run_if_missing(runner, &item.command, &item.expected_output, force) {
            Ok(true) => ItemOutcome::Completed,
            Ok(false) => ItemOutcome::Skipped,
            Err(e) => {
                warn!(key = %item.key, error = %e, "Work item failed");
                ItemOutcome::Failed(e)
            }
        };
        (item.key.clone(), outcome)
    };

    if workers <= 1 {
        return Ok(items.iter().map(run_one).collect());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| TileforgeError::ExternalTool {
            program: "worker-pool".into(),
            detail: e.to_string(),
        })?;
    Ok(pool.install(|| items.par_iter().map(run_one).collect()))
}
