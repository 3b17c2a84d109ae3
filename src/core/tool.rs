//! Tool reference and download source definitions.

use std::path::{Path, PathBuf};

use url::Url;

/// Candidate location of the generator binary.
///
/// Created at startup from configuration; replaced only when acquisition
/// substitutes a freshly downloaded binary or an operator-supplied path.
#[derive(Debug, Clone)]
pub struct ToolReference {
    pub path: PathBuf,
    pub exists: bool,
}

impl ToolReference {
    /// Build a reference for `path`, probing whether a non-empty file is
    /// already there.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let exists = is_present(&path);
        ToolReference { path, exists }
    }

    /// Re-probe the filesystem for the referenced path.
    pub fn refresh(&mut self) {
        self.exists = is_present(&self.path);
    }
}

/// A zero-byte file does not count as a usable binary.
fn is_present(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file() && m.len() > 0).unwrap_or(false)
}

/// Payload shape of a download source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// An archive that contains the binary somewhere inside.
    Archive,
    /// The binary itself.
    RawBinary,
}

/// Position of a source in the fixed fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRole {
    Primary,
    Secondary,
}

/// One remote location the generator can be fetched from.
///
/// The source list is statically known and tried strictly in declared order.
#[derive(Debug, Clone)]
pub struct DownloadSource {
    pub url: String,
    pub kind: SourceKind,
    pub role: SourceRole,
    /// Optional pinned digest; verified after download when present.
    pub sha256: Option<String>,
}

impl DownloadSource {
    /// Last path segment of the URL, used to name the scratch download.
    pub fn file_name(&self) -> String {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| {
                u.path_segments()
                    .and_then(|mut segments| segments.next_back())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "download.bin".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_reference_probes_existence() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tool.exe");

        let reference = ToolReference::new(&path);
        assert!(!reference.exists);

        std::fs::write(&path, b"binary").unwrap();
        let mut reference = reference;
        reference.refresh();
        assert!(reference.exists);
    }

    #[test]
    fn test_reference_rejects_empty_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tool.exe");
        std::fs::write(&path, b"").unwrap();

        let reference = ToolReference::new(&path);
        assert!(!reference.exists);
    }

    #[test]
    fn test_source_file_name() {
        let source = DownloadSource {
            url: "https://example.com/releases/tool_v2.zip".to_string(),
            kind: SourceKind::Archive,
            role: SourceRole::Primary,
            sha256: None,
        };
        assert_eq!(source.file_name(), "tool_v2.zip");
    }

    #[test]
    fn test_source_file_name_ignores_query() {
        let source = DownloadSource {
            url: "https://example.com/raw/tool.exe?token=abc".to_string(),
            kind: SourceKind::RawBinary,
            role: SourceRole::Secondary,
            sha256: None,
        };
        assert_eq!(source.file_name(), "tool.exe");
    }

    #[test]
    fn test_source_file_name_fallback() {
        let source = DownloadSource {
            url: "not a url".to_string(),
            kind: SourceKind::RawBinary,
            role: SourceRole::Secondary,
            sha256: None,
        };
        assert_eq!(source.file_name(), "download.bin");
    }
}
