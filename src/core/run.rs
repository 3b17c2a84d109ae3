//! Run request and execution result types.

use std::path::PathBuf;
use std::process::ExitStatus;

use crate::core::app_ids::AppIdSet;

/// Everything the pipeline needs for one generator run.
///
/// The CLI layer constructs this and hands it to [`crate::ops::generate`];
/// the core never prompts or reads the environment itself.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Candidate path of the generator binary.
    pub generator_path: PathBuf,
    /// Pass the generator's `-d` debug flag.
    pub debug_enabled: bool,
    /// Directory the generator runs in and writes manifests to.
    pub working_directory: PathBuf,
    /// Validated App IDs, in input order.
    pub app_ids: AppIdSet,
}

impl RunRequest {
    /// Argument list for the wrapped generator.
    ///
    /// The generator's CLI contract is fixed: an optional `-d` flag followed
    /// by the IDs as positionals. IDs are passed through unmodified — they
    /// are all-digit tokens and cannot be mistaken for flags.
    pub fn generator_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.app_ids.len() + 1);
        if self.debug_enabled {
            args.push("-d".to_string());
        }
        args.extend(self.app_ids.iter().map(str::to_string));
        args
    }
}

/// Exit outcome of one generator invocation.
///
/// `exit_code` is `None` when the child was terminated by a signal. The
/// generator's exit code does not reliably reflect per-ID success, so a
/// non-zero code downgrades to `succeeded: false` plus a warning rather
/// than a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: Option<i32>,
    pub succeeded: bool,
}

impl ExecutionResult {
    /// Derive the result from a child's exit status.
    pub fn from_status(status: ExitStatus) -> Self {
        ExecutionResult {
            exit_code: status.code(),
            succeeded: status.success(),
        }
    }
}
