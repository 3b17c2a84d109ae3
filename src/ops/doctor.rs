//! Environment health checks.
//!
//! The `doctor` command reports which helper binaries the fallback
//! strategies can use. Everything external is optional — the built-in HTTP
//! client and archive readers always exist — but a machine with none of the
//! helpers has fewer fallbacks to lean on.
//!
//! ## Checks Performed
//!
//! - Transfer utilities (curl, wget)
//! - Extraction utilities (7z, unzip, tar)
//! - wine (needed to run the Windows generator on non-Windows hosts)
//! - Whether the generator binary is already installed

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::util::config::Config;
use crate::util::process::{find_executable, find_seven_zip, ProcessBuilder};
use crate::util::GlobalContext;

/// Result of a single health check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,

    /// Whether the check passed
    pub passed: bool,

    /// Human-readable status message
    pub message: String,

    /// Path to the tool (if applicable)
    pub path: Option<PathBuf>,

    /// Version string (if applicable)
    pub version: Option<String>,

    /// Whether this check is required or optional
    pub required: bool,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: true,
            message: message.into(),
            path: None,
            version: None,
            required: true,
        }
    }

    /// Create a failing check result.
    pub fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            passed: false,
            message: message.into(),
            path: None,
            version: None,
            required: true,
        }
    }

    /// Mark this check as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set the tool path.
    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Summary of all health checks.
#[derive(Debug, Clone, Default)]
pub struct DoctorReport {
    /// Individual check results
    pub checks: Vec<CheckResult>,

    /// Total time taken
    pub total_duration: Duration,
}

impl DoctorReport {
    /// Add a check result.
    pub fn add(&mut self, check: CheckResult) {
        self.checks.push(check);
    }

    /// Check if all required checks passed.
    pub fn all_required_passed(&self) -> bool {
        self.checks.iter().filter(|c| c.required).all(|c| c.passed)
    }

    /// Get the count of passed checks.
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Get the count of failed checks.
    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }
}

/// Run the doctor checks.
pub fn doctor(config: &Config, ctx: &GlobalContext) -> Result<DoctorReport> {
    let start = Instant::now();
    let mut report = DoctorReport::default();

    report.add(check_helper("curl", "transfer fallback"));
    report.add(check_helper("wget", "transfer fallback"));
    report.add(check_seven_zip());
    report.add(check_helper("unzip", "staged-copy extraction"));
    report.add(check_helper("tar", "last-resort extraction"));
    report.add(check_wine());
    report.add(check_tool_installed(config, ctx));

    report.total_duration = start.elapsed();
    Ok(report)
}

/// Check for a helper binary on PATH, grabbing its version when cheap.
fn check_helper(name: &str, purpose: &str) -> CheckResult {
    match find_executable(name) {
        Some(path) => {
            let mut result = CheckResult::pass(name, format!("available ({})", purpose))
                .with_path(path.clone())
                .optional();
            if let Some(version) = probe_version(&path) {
                result = result.with_version(version);
            }
            result
        }
        None => CheckResult::fail(name, format!("not found ({} unavailable)", purpose)).optional(),
    }
}

/// 7-Zip hides behind several binary names.
fn check_seven_zip() -> CheckResult {
    match find_seven_zip() {
        Some(path) => CheckResult::pass("7z", "available (password-capable extraction)")
            .with_path(path)
            .optional(),
        None => CheckResult::fail(
            "7z",
            "not found (password-protected archives cannot be extracted)",
        )
        .optional(),
    }
}

/// wine matters only when the host cannot run the .exe directly.
fn check_wine() -> CheckResult {
    if cfg!(windows) {
        return CheckResult::pass("wine", "not needed on Windows").optional();
    }
    match find_executable("wine") {
        Some(path) => CheckResult::pass("wine", "available (runs the Windows generator)")
            .with_path(path)
            .optional(),
        None => CheckResult::fail(
            "wine",
            "not found (the generator is a Windows executable and will not run directly)",
        )
        .optional(),
    }
}

/// Report whether the generator binary is already on disk.
fn check_tool_installed(config: &Config, ctx: &GlobalContext) -> CheckResult {
    let path = ctx.tool_path(config.tool.dir.as_deref(), &config.tool.file_name);
    if crate::util::fs::is_nonempty_file(&path) {
        CheckResult::pass("generator", "installed")
            .with_path(path)
            .optional()
    } else {
        CheckResult::fail(
            "generator",
            "not installed yet (will be downloaded on first run)",
        )
        .optional()
    }
}

/// First line of `<tool> --version`, when the tool cooperates.
fn probe_version(path: &PathBuf) -> Option<String> {
    let output = ProcessBuilder::new(path).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout.lines().next().map(|l| l.trim().to_string())
}

/// Format the doctor report for display.
pub fn format_report(report: &DoctorReport, verbose: bool) -> String {
    use std::fmt::Write;

    let mut output = String::new();

    writeln!(output, "acfgen doctor").unwrap();
    writeln!(output, "=============\n").unwrap();

    writeln!(output, "Checks:").unwrap();
    for check in &report.checks {
        let status = if check.passed { "[OK]" } else { "[!!]" };
        writeln!(output, "  {} {}", status, check.name).unwrap();

        if verbose {
            writeln!(output, "      {}", check.message).unwrap();
            if let Some(path) = &check.path {
                writeln!(output, "      Path: {}", path.display()).unwrap();
            }
            if let Some(version) = &check.version {
                writeln!(output, "      Version: {}", version).unwrap();
            }
        }
    }

    writeln!(output).unwrap();
    writeln!(
        output,
        "Summary: {} passed, {} failed",
        report.passed_count(),
        report.failed_count()
    )
    .unwrap();

    if report.failed_count() > 0 {
        writeln!(
            output,
            "\nMissing helpers only reduce the number of fallback strategies; \
             the built-in HTTP client and archive readers are always available."
        )
        .unwrap();
    } else {
        writeln!(output, "\nAll helpers available.").unwrap();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_result_builders() {
        let result = CheckResult::pass("curl", "ok").optional();
        assert!(result.passed);
        assert!(!result.required);

        let result = CheckResult::fail("wget", "missing");
        assert!(!result.passed);
        assert!(result.required);
    }

    #[test]
    fn test_report_counts() {
        let mut report = DoctorReport::default();
        report.add(CheckResult::pass("a", "ok"));
        report.add(CheckResult::fail("b", "missing").optional());

        assert!(report.all_required_passed());
        assert_eq!(report.passed_count(), 1);
        assert_eq!(report.failed_count(), 1);
    }

    #[test]
    fn test_doctor_runs() {
        let config = Config::default();
        let ctx = GlobalContext::new().unwrap();
        let report = doctor(&config, &ctx).unwrap();

        // Every check in this report is advisory.
        assert!(report.all_required_passed());
        assert_eq!(report.checks.len(), 7);
    }

    #[test]
    fn test_format_report() {
        let mut report = DoctorReport::default();
        report.add(CheckResult::pass("curl", "ok"));
        report.add(CheckResult::fail("7z", "missing").optional());

        let text = format_report(&report, false);
        assert!(text.contains("[OK] curl"));
        assert!(text.contains("[!!] 7z"));
        assert!(text.contains("1 passed, 1 failed"));
    }
}
