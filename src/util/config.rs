//! Configuration file support.
//!
//! acfgen reads two configuration locations:
//! - Global: `<config dir>/acfgen/config.toml` - user-wide defaults
//! - Project: `.acfgen/config.toml` - directory-specific overrides
//!
//! Project config takes precedence over global config; built-in defaults
//! fill everything else. The download endpoints are fixed defaults here,
//! never per-request parameters.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{DownloadSource, SourceKind, SourceRole};

/// Versioned release archive of SKSAppManifestGenerator.
pub const PRIMARY_URL: &str = "https://github.com/Sak32009/SKSAppManifestGenerator/releases/download/v2.0.3/SKSAppManifestGenerator_x64_v2.0.3.zip";

/// Raw-binary mirror, tried after the release archive.
pub const FALLBACK_URL: &str =
    "https://github.com/ahmed98Osama/Steam-acf-generator/raw/master/SKSAppManifestGenerator_x64.exe";

/// File name of the generator binary inside the release archive.
pub const TOOL_FILE_NAME: &str = "SKSAppManifestGenerator_x64.exe";

/// acfgen configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network settings
    pub net: NetConfig,

    /// Generator tool settings
    pub tool: ToolConfig,
}

/// Network-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Overall per-attempt download timeout in seconds
    pub timeout_secs: u64,

    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,

    /// Retry count handed to the external transfer utility
    pub retries: u32,

    /// Abort a transfer after this many seconds without byte progress
    pub stall_window_secs: u64,
}

impl Default for NetConfig {
    fn default() -> Self {
        NetConfig {
            timeout_secs: 600,
            connect_timeout_secs: 30,
            retries: 3,
            stall_window_secs: 15,
        }
    }
}

/// Generator tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Directory the binary is installed into (default: `tools/SKSAppManifestGenerator`
    /// next to the acfgen executable)
    pub dir: Option<PathBuf>,

    /// File name of the generator binary
    pub file_name: String,

    /// Release archive URL (primary source)
    pub primary_url: String,

    /// Raw-binary mirror URL (secondary source)
    pub fallback_url: String,

    /// Password tried first when extracting the release archive
    pub archive_password: Option<String>,

    /// Pinned SHA256 of the primary archive
    pub primary_sha256: Option<String>,

    /// Pinned SHA256 of the fallback binary
    pub fallback_sha256: Option<String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        ToolConfig {
            dir: None,
            file_name: TOOL_FILE_NAME.to_string(),
            primary_url: PRIMARY_URL.to_string(),
            fallback_url: FALLBACK_URL.to_string(),
            archive_password: None,
            primary_sha256: None,
            fallback_sha256: None,
        }
    }
}

impl ToolConfig {
    /// The fixed two-element source list, in fallback order.
    pub fn sources(&self) -> Vec<DownloadSource> {
        vec![
            DownloadSource {
                url: self.primary_url.clone(),
                kind: SourceKind::Archive,
                role: SourceRole::Primary,
                sha256: self.primary_sha256.clone(),
            },
            DownloadSource {
                url: self.fallback_url.clone(),
                kind: SourceKind::RawBinary,
                role: SourceRole::Secondary,
                sha256: self.fallback_sha256.clone(),
            },
        ]
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing
    /// or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let net_defaults = NetConfig::default();
        if other.net.timeout_secs != net_defaults.timeout_secs {
            self.net.timeout_secs = other.net.timeout_secs;
        }
        if other.net.connect_timeout_secs != net_defaults.connect_timeout_secs {
            self.net.connect_timeout_secs = other.net.connect_timeout_secs;
        }
        if other.net.retries != net_defaults.retries {
            self.net.retries = other.net.retries;
        }
        if other.net.stall_window_secs != net_defaults.stall_window_secs {
            self.net.stall_window_secs = other.net.stall_window_secs;
        }

        let tool_defaults = ToolConfig::default();
        if other.tool.dir.is_some() {
            self.tool.dir = other.tool.dir;
        }
        if other.tool.file_name != tool_defaults.file_name {
            self.tool.file_name = other.tool.file_name;
        }
        if other.tool.primary_url != tool_defaults.primary_url {
            self.tool.primary_url = other.tool.primary_url;
        }
        if other.tool.fallback_url != tool_defaults.fallback_url {
            self.tool.fallback_url = other.tool.fallback_url;
        }
        if other.tool.archive_password.is_some() {
            self.tool.archive_password = other.tool.archive_password;
        }
        if other.tool.primary_sha256.is_some() {
            self.tool.primary_sha256 = other.tool.primary_sha256;
        }
        if other.tool.fallback_sha256.is_some() {
            self.tool.fallback_sha256 = other.tool.fallback_sha256;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.acfgen/config.toml)
/// 2. Global config (<config dir>/acfgen/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.net.timeout_secs, 600);
        assert_eq!(config.net.stall_window_secs, 15);
        assert_eq!(config.tool.file_name, TOOL_FILE_NAME);
        assert!(config.tool.archive_password.is_none());
    }

    #[test]
    fn test_sources_order() {
        let sources = ToolConfig::default().sources();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].role, SourceRole::Primary);
        assert_eq!(sources[0].kind, SourceKind::Archive);
        assert_eq!(sources[1].role, SourceRole::Secondary);
        assert_eq!(sources[1].kind, SourceKind::RawBinary);
    }

    #[test]
    fn test_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");

        std::fs::write(&global, "[net]\ntimeout_secs = 120\nretries = 5\n").unwrap();
        std::fs::write(&project, "[net]\ntimeout_secs = 60\n").unwrap();

        let config = load_config(&global, &project);
        assert_eq!(config.net.timeout_secs, 60);
        assert_eq!(config.net.retries, 5);
    }

    #[test]
    fn test_missing_files_fall_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("nope.toml"), &tmp.path().join("also-nope.toml"));
        assert_eq!(config.net.timeout_secs, 600);
    }

    #[test]
    fn test_malformed_config_falls_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "not [valid toml").unwrap();

        let config = Config::load_or_default(&path);
        assert_eq!(config.net.timeout_secs, 600);
    }
}
