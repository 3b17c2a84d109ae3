//! Tool acquisition: multi-source download fallback, archive extraction,
//! and binary installation.
//!
//! Sources are tried strictly in declared order. Every source attempt works
//! inside its own scratch directory, which is removed on success and failure
//! alike; a failed primary can never leave artifacts behind for the
//! secondary to trip over.

pub mod download;
pub mod extract;
pub mod locate;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use crate::core::{DownloadSource, SourceKind};
use crate::util::config::Config;
use crate::util::{fs, hash};

use download::{Downloader, ProgressFn};

pub use download::{TransferUpdate, TransportStrategy};
pub use extract::ExtractionStrategy;

/// Try strategies in declared order, short-circuiting on the first success.
///
/// Each failure is logged as a warning before the next strategy runs. The
/// single combinator keeps adding or removing a strategy a one-line change.
pub(crate) fn first_success<S, T, F>(what: &str, strategies: &[S], mut attempt: F) -> Option<T>
where
    S: fmt::Display,
    F: FnMut(&S) -> Result<T>,
{
    for strategy in strategies {
        debug!("{}: trying {}", what, strategy);
        match attempt(strategy) {
            Ok(value) => {
                info!("{}: {} succeeded", what, strategy);
                return Some(value);
            }
            Err(e) => warn!("{}: {} failed: {:#}", what, strategy, e),
        }
    }
    None
}

/// Fetches the generator binary from an ordered source list.
pub struct Acquirer<'a> {
    config: &'a Config,
    scratch_base: PathBuf,
}

impl<'a> Acquirer<'a> {
    pub fn new(config: &'a Config, scratch_base: impl Into<PathBuf>) -> Self {
        Acquirer {
            config,
            scratch_base: scratch_base.into(),
        }
    }

    /// Try each source in order until one populates `target`.
    ///
    /// Returns `false` only after every source is exhausted, at which point
    /// the caller offers a manual path override.
    pub fn acquire(
        &self,
        sources: &[DownloadSource],
        target: &Path,
        progress: ProgressFn<'_>,
    ) -> bool {
        for source in sources {
            info!("trying {:?} source {}", source.role, source.url);
            match self.try_source(source, target, &mut *progress) {
                Ok(()) => {
                    info!("generator installed at {}", target.display());
                    return true;
                }
                Err(e) => warn!("source {} failed: {:#}", source.url, e),
            }
        }
        false
    }

    /// Handle one source end to end inside a scratch directory.
    ///
    /// The scratch directory (downloaded payload, extraction output) is
    /// dropped on every exit path.
    fn try_source(
        &self,
        source: &DownloadSource,
        target: &Path,
        progress: ProgressFn<'_>,
    ) -> Result<()> {
        fs::ensure_dir(&self.scratch_base)?;
        let scratch = tempfile::Builder::new()
            .prefix("acfgen-fetch-")
            .tempdir_in(&self.scratch_base)
            .context("failed to create scratch directory")?;

        let payload = scratch.path().join(source.file_name());
        Downloader::new(self.config.net.clone()).download(&source.url, &payload, progress)?;

        if let Some(expected) = &source.sha256 {
            hash::verify_sha256(&payload, expected)?;
        }

        match source.kind {
            SourceKind::Archive => {
                let extract_dir = scratch.path().join("extracted");
                extract::extract(
                    &payload,
                    &extract_dir,
                    self.config.tool.archive_password.as_deref(),
                )?;

                let file_name = &self.config.tool.file_name;
                let found = fs::find_file_recursive(&extract_dir, file_name)
                    .with_context(|| format!("`{}` not present in extracted archive", file_name))?;
                fs::install_executable(&found, target)?;
            }
            SourceKind::RawBinary => {
                if !fs::is_nonempty_file(&payload) {
                    bail!("downloaded binary is empty");
                }
                fs::install_executable(&payload, target)?;
            }
        }

        if !fs::is_nonempty_file(target) {
            bail!("installed binary failed validation");
        }
        Ok(())
    }
}
