//! Global context for acfgen operations.
//!
//! Centralizes the paths the pipeline works with: the working directory,
//! the platform config/cache locations, the scratch area for downloads,
//! and the default install location of the generator binary.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::util::config::TOOL_FILE_NAME;

/// Platform directories for acfgen.
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("io", "acfgen", "acfgen"));

/// Global context containing resolved paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Platform config directory for acfgen
    config_dir: PathBuf,

    /// Platform cache directory for acfgen
    cache_dir: PathBuf,

    /// Directory of the running executable, when resolvable
    exe_dir: Option<PathBuf>,
}

impl GlobalContext {
    /// Create a new context from the process environment.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let (config_dir, cache_dir) = if let Some(dirs) = PROJECT_DIRS.as_ref() {
            (dirs.config_dir().to_path_buf(), dirs.cache_dir().to_path_buf())
        } else {
            // Fallback to dotfiles in the home directory
            let home = directories::BaseDirs::new()
                .map(|b| b.home_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."));
            (home.join(".acfgen"), home.join(".acfgen").join("cache"))
        };

        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(Path::to_path_buf));

        Ok(GlobalContext {
            cwd,
            config_dir,
            cache_dir,
            exe_dir,
        })
    }

    /// Create a context with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Get the project-local configuration file path.
    pub fn project_config_path(&self) -> PathBuf {
        self.cwd.join(".acfgen").join("config.toml")
    }

    /// Get the scratch directory for in-flight downloads and extractions.
    pub fn scratch_dir(&self) -> PathBuf {
        self.cache_dir.join("scratch")
    }

    /// Default install directory for the generator binary.
    ///
    /// A fixed subdirectory next to the acfgen executable, falling back to
    /// the working directory when the executable path is unresolvable.
    pub fn default_tool_dir(&self) -> PathBuf {
        self.exe_dir
            .as_deref()
            .unwrap_or(&self.cwd)
            .join("tools")
            .join("SKSAppManifestGenerator")
    }

    /// Resolve the generator binary path from an optional configured
    /// directory and file name.
    pub fn tool_path(&self, configured_dir: Option<&Path>, file_name: &str) -> PathBuf {
        let dir = configured_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_tool_dir());
        let name = if file_name.is_empty() { TOOL_FILE_NAME } else { file_name };
        dir.join(name)
    }
}
