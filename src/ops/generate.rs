//! The generate operation: resolve the tool, invoke it, verify artifacts.
//!
//! This is the pipeline the CLI layer drives with a [`RunRequest`]. Tool
//! resolution may trigger acquisition; invocation blocks until the wrapped
//! generator exits; verification is advisory and never fails the run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::acquire::download::ProgressFn;
use crate::acquire::{locate, Acquirer};
use crate::core::{ExecutionResult, PipelineError, RunRequest, ToolReference};
use crate::ops::verify::{self, VerificationReport};
use crate::util::config::Config;
use crate::util::process::{find_executable, ProcessBuilder};
use crate::util::{fs, GlobalContext};

/// Everything the pipeline produced for one run.
#[derive(Debug)]
pub struct GenerateOutcome {
    /// The tool that was actually invoked.
    pub tool: ToolReference,
    /// Exit outcome of the generator.
    pub execution: ExecutionResult,
    /// Per-ID artifact verification.
    pub report: VerificationReport,
}

/// Run the full pipeline for one request.
///
/// `download_approved` carries the caller's auto-download decision;
/// `manual_path` is consulted only after acquisition fails or was declined.
pub fn generate(
    config: &Config,
    ctx: &GlobalContext,
    request: &RunRequest,
    download_approved: bool,
    progress: ProgressFn<'_>,
    manual_path: impl FnOnce() -> Option<PathBuf>,
) -> Result<GenerateOutcome> {
    if request.app_ids.is_empty() {
        return Err(PipelineError::InvalidInput.into());
    }

    let acquirer = Acquirer::new(config, ctx.scratch_dir());
    let sources = config.tool.sources();
    let tool = locate::resolve(
        &acquirer,
        &sources,
        ToolReference::new(&request.generator_path),
        download_approved,
        progress,
        manual_path,
    )?;

    fs::ensure_dir(&request.working_directory)?;

    info!(
        "invoking {} for {} App ID(s) in {}",
        tool.path.display(),
        request.app_ids.len(),
        request.working_directory.display()
    );
    let execution = run_generator(
        &tool.path,
        &request.generator_args(),
        &request.working_directory,
    )?;

    let report = verify::verify(&request.working_directory, &request.app_ids);

    Ok(GenerateOutcome {
        tool,
        execution,
        report,
    })
}

/// Launch the generator and capture its exit status.
///
/// A non-zero exit downgrades to a warning in the result: the generator's
/// exit code does not reliably reflect per-ID success. Failing to launch at
/// all is a fatal [`PipelineError::Execution`].
pub fn run_generator(
    tool: &Path,
    args: &[String],
    working_dir: &Path,
) -> Result<ExecutionResult, PipelineError> {
    let builder = command_for(tool, args, working_dir);

    let status = builder.status().map_err(|source| PipelineError::Execution {
        program: builder.get_program().to_path_buf(),
        source,
    })?;

    let result = ExecutionResult::from_status(status);
    if !result.succeeded {
        warn!(
            "generator exited with {:?}; its exit code does not reflect per-ID success",
            result.exit_code
        );
    }
    Ok(result)
}

/// Build the launch command, bridging Windows binaries through wine on
/// non-Windows hosts when wine is available.
fn command_for(tool: &Path, args: &[String], working_dir: &Path) -> ProcessBuilder {
    let is_windows_binary = tool
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("exe"));

    if cfg!(not(windows)) && is_windows_binary {
        match find_executable("wine") {
            Some(wine) => {
                info!("running Windows binary through wine");
                return ProcessBuilder::new(wine).arg(tool).args(args).cwd(working_dir);
            }
            None => warn!(
                "`{}` is a Windows executable and wine is not on PATH; attempting direct execution",
                tool.display()
            ),
        }
    }

    ProcessBuilder::new(tool).args(args).cwd(working_dir)
}

/// Acquisition without invocation (the `fetch` command).
pub fn fetch(
    config: &Config,
    ctx: &GlobalContext,
    tool_path: &Path,
    download_approved: bool,
    progress: ProgressFn<'_>,
    manual_path: impl FnOnce() -> Option<PathBuf>,
) -> Result<ToolReference> {
    let acquirer = Acquirer::new(config, ctx.scratch_dir());
    let sources = config.tool.sources();
    let tool = locate::resolve(
        &acquirer,
        &sources,
        ToolReference::new(tool_path),
        download_approved,
        progress,
        manual_path,
    )
    .context("could not provide the generator tool")?;
    Ok(tool)
}
