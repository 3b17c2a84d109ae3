//! Pipeline error types.
//!
//! Download and extraction failures are recovered per source/strategy by the
//! acquirer; they surface here only once every option is exhausted. A missing
//! output artifact is never an error at all — the verifier reports it as a
//! per-ID warning.

use std::path::PathBuf;

use thiserror::Error;

/// Error raised by the acquisition/invocation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Every transport strategy failed for a download source.
    #[error("download failed for `{url}`: all transports exhausted")]
    Download { url: String },

    /// Every extraction strategy failed for an archive.
    #[error("could not extract `{}`: all strategies exhausted", .archive.display())]
    Extraction { archive: PathBuf },

    /// The generator binary could not be located, acquired, or substituted.
    #[error("generator tool not found")]
    ToolNotFound { searched: Vec<PathBuf> },

    /// No valid App IDs were supplied to the pipeline.
    #[error("no valid App IDs in input")]
    InvalidInput,

    /// The generator process could not be launched at all.
    #[error("failed to launch `{}`", .program.display())]
    Execution {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Paths that were checked before giving up on the tool.
    ///
    /// Empty for every variant except [`PipelineError::ToolNotFound`].
    pub fn searched_paths(&self) -> &[PathBuf] {
        match self {
            PipelineError::ToolNotFound { searched } => searched,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = PipelineError::Download {
            url: "https://example.com/tool.zip".to_string(),
        };
        assert!(err.to_string().contains("all transports exhausted"));

        let err = PipelineError::InvalidInput;
        assert!(err.to_string().contains("no valid App IDs"));
    }

    #[test]
    fn test_searched_paths() {
        let err = PipelineError::ToolNotFound {
            searched: vec![PathBuf::from("/tmp/tool.exe")],
        };
        assert_eq!(err.searched_paths().len(), 1);
        assert!(PipelineError::InvalidInput.searched_paths().is_empty());
    }
}
