//! Subprocess execution utilities.
//!
//! Used for the wrapped generator itself and for the external helper
//! binaries (curl, wget, 7z, unzip, tar) the fallback strategies shell out
//! to. Arguments are always passed as a list, never through a shell.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Output, Stdio};

use anyhow::{bail, Context, Result};

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Get the program path.
    pub fn get_program(&self) -> &Path {
        &self.program
    }

    /// Get the arguments.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Build the Command.
    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }

    /// Run to completion with inherited stdio and return the exit status.
    ///
    /// The spawn error is surfaced untouched so callers can distinguish a
    /// missing binary from a run that merely exited non-zero.
    pub fn status(&self) -> std::io::Result<ExitStatus> {
        self.build_command().status()
    }

    /// Run to completion with captured stdout/stderr.
    pub fn output(&self) -> Result<Output> {
        self.build_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("failed to execute `{}`", self.program.display()))
    }

    /// Run with captured output and require a zero exit code.
    pub fn output_checked(&self) -> Result<Output> {
        let output = self.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "`{}` failed with exit code {:?}\n{}",
                self.display_command(),
                output.status.code(),
                stderr.trim()
            );
        }
        Ok(output)
    }

    /// Spawn without waiting, stdio silenced. Used by strategies that poll
    /// the child while watching the filesystem.
    pub fn spawn_quiet(&self) -> Result<Child> {
        self.build_command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to spawn `{}`", self.program.display()))
    }

    /// Display the command for log messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find a 7-Zip binary under any of its common names.
pub fn find_seven_zip() -> Option<PathBuf> {
    for name in ["7z", "7zz", "7za"] {
        if let Some(path) = find_executable(name) {
            return Some(path);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_captures_stdout() {
        let output = ProcessBuilder::new("echo").arg("hello").output().unwrap();

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("hello"));
    }

    #[test]
    fn test_status_missing_binary_is_spawn_error() {
        let result = ProcessBuilder::new("/nonexistent/binary/xyz").status();
        assert!(result.is_err());
    }

    #[test]
    fn test_display_command() {
        let pb = ProcessBuilder::new("curl").args(["-L", "--fail", "-o", "out.zip"]);
        assert_eq!(pb.display_command(), "curl -L --fail -o out.zip");
    }

    #[cfg(unix)]
    #[test]
    fn test_status_in_cwd() {
        let tmp = tempfile::TempDir::new().unwrap();
        let status = ProcessBuilder::new("sh")
            .args(["-c", "touch marker"])
            .cwd(tmp.path())
            .status()
            .unwrap();

        assert!(status.success());
        assert!(tmp.path().join("marker").exists());
    }
}
