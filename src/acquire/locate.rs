//! Tool location and substitution.
//!
//! The locator is the boundary where recoverable download/extraction
//! failures become a hard `ToolNotFound`: an existing binary short-circuits
//! everything, an approved acquisition may substitute a fresh one, and an
//! operator-supplied path is the last resort.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::acquire::download::ProgressFn;
use crate::acquire::Acquirer;
use crate::core::{DownloadSource, PipelineError, ToolReference};

/// Resolve a usable generator binary.
///
/// `manual_path` is consulted only after acquisition fails or was declined;
/// interactive callers wire it to a prompt, non-interactive callers return
/// `None`.
pub fn resolve(
    acquirer: &Acquirer<'_>,
    sources: &[DownloadSource],
    mut reference: ToolReference,
    download_approved: bool,
    progress: ProgressFn<'_>,
    manual_path: impl FnOnce() -> Option<PathBuf>,
) -> Result<ToolReference, PipelineError> {
    reference.refresh();
    if reference.exists {
        debug!("generator already present at {}", reference.path.display());
        return Ok(reference);
    }

    let mut searched = vec![reference.path.clone()];

    if download_approved {
        info!(
            "generator missing at {}, starting acquisition",
            reference.path.display()
        );
        if acquirer.acquire(sources, &reference.path, progress) {
            reference.refresh();
            if reference.exists {
                return Ok(reference);
            }
            warn!("acquired file failed validation, treating as not found");
        }
    } else {
        info!("auto-download declined, falling back to a manual path");
    }

    match manual_path() {
        Some(path) => {
            let manual = ToolReference::new(&path);
            if manual.exists {
                info!("using operator-supplied generator at {}", path.display());
                Ok(manual)
            } else {
                searched.push(path);
                Err(PipelineError::ToolNotFound { searched })
            }
        }
        None => Err(PipelineError::ToolNotFound { searched }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::config::Config;
    use tempfile::TempDir;

    fn no_sources() -> Vec<DownloadSource> {
        Vec::new()
    }

    #[test]
    fn test_existing_tool_short_circuits() {
        let tmp = TempDir::new().unwrap();
        let tool = tmp.path().join("tool.exe");
        std::fs::write(&tool, b"binary").unwrap();

        let config = Config::default();
        let acquirer = Acquirer::new(&config, tmp.path().join("scratch"));

        let resolved = resolve(
            &acquirer,
            &no_sources(),
            ToolReference::new(&tool),
            false,
            &mut |_| {},
            || panic!("manual path must not be consulted"),
        )
        .unwrap();

        assert_eq!(resolved.path, tool);
        assert!(resolved.exists);
    }

    #[test]
    fn test_declined_download_uses_manual_path() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.exe");
        let manual = tmp.path().join("manual.exe");
        std::fs::write(&manual, b"binary").unwrap();

        let config = Config::default();
        let acquirer = Acquirer::new(&config, tmp.path().join("scratch"));

        let manual_clone = manual.clone();
        let resolved = resolve(
            &acquirer,
            &no_sources(),
            ToolReference::new(&missing),
            false,
            &mut |_| {},
            move || Some(manual_clone),
        )
        .unwrap();

        assert_eq!(resolved.path, manual);
    }

    #[test]
    fn test_everything_missing_is_tool_not_found() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.exe");
        let bad_manual = tmp.path().join("also-missing.exe");

        let config = Config::default();
        let acquirer = Acquirer::new(&config, tmp.path().join("scratch"));

        let result = resolve(
            &acquirer,
            &no_sources(),
            ToolReference::new(&missing),
            true,
            &mut |_| {},
            move || Some(bad_manual),
        );

        match result {
            Err(PipelineError::ToolNotFound { searched }) => {
                assert_eq!(searched.len(), 2);
            }
            other => panic!("expected ToolNotFound, got {:?}", other.map(|r| r.path)),
        }
    }

    #[test]
    fn test_no_manual_path_is_tool_not_found() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.exe");

        let config = Config::default();
        let acquirer = Acquirer::new(&config, tmp.path().join("scratch"));

        let result = resolve(
            &acquirer,
            &no_sources(),
            ToolReference::new(&missing),
            false,
            &mut |_| {},
            || None,
        );

        assert!(matches!(result, Err(PipelineError::ToolNotFound { .. })));
    }
}
