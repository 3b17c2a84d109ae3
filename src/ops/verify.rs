//! Output artifact verification.
//!
//! After the generator runs, each requested App ID is checked against the
//! manifest naming conventions the tool is known to use. A miss is advisory:
//! the tool may pick a convention this layer does not anticipate, so the
//! verifier reports warnings, never failures.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::AppIdSet;

/// Location result for one requested App ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    /// Manifest located at this path.
    Found(PathBuf),
    /// No candidate path existed.
    NotFound,
}

/// Per-ID verification results, in request order.
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    entries: Vec<(String, ArtifactStatus)>,
}

impl VerificationReport {
    /// All entries, in request order.
    pub fn entries(&self) -> &[(String, ArtifactStatus)] {
        &self.entries
    }

    /// Status of the first entry for `id`.
    pub fn status_of(&self, id: &str) -> Option<&ArtifactStatus> {
        self.entries
            .iter()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(_, status)| status)
    }

    /// Number of located manifests.
    pub fn found_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, s)| matches!(s, ArtifactStatus::Found(_)))
            .count()
    }

    /// IDs with no located manifest, in request order.
    pub fn missing_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, s)| matches!(s, ArtifactStatus::NotFound))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Whether every requested ID produced a manifest.
    pub fn all_found(&self) -> bool {
        self.missing_ids().is_empty()
    }
}

/// Candidate manifest paths for an App ID, relative to the working
/// directory, in probe order: the flat conventions first, then the nested
/// steamapps layout.
fn candidate_paths(id: &str) -> [PathBuf; 3] {
    [
        PathBuf::from(format!("appmanifest_{}.acf", id)),
        PathBuf::from(format!("{}.acf", id)),
        Path::new("steamapps").join(format!("appmanifest_{}.acf", id)),
    ]
}

/// Check the working directory for the expected manifest of each ID.
pub fn verify(working_dir: &Path, app_ids: &AppIdSet) -> VerificationReport {
    let entries = app_ids
        .iter()
        .map(|id| {
            let status = candidate_paths(id)
                .into_iter()
                .map(|rel| working_dir.join(rel))
                .find(|p| p.is_file())
                .map(ArtifactStatus::Found)
                .unwrap_or(ArtifactStatus::NotFound);

            match &status {
                ArtifactStatus::Found(path) => {
                    debug!("manifest for {} at {}", id, path.display())
                }
                ArtifactStatus::NotFound => {
                    warn!("no manifest found for {} in {}", id, working_dir.display())
                }
            }

            (id.to_string(), status)
        })
        .collect();

    VerificationReport { entries }
}

/// Format the report for display.
pub fn format_report(report: &VerificationReport) -> String {
    use std::fmt::Write;

    let mut output = String::new();
    for (id, status) in report.entries() {
        match status {
            ArtifactStatus::Found(path) => {
                writeln!(output, "  [OK] {} -> {}", id, path.display()).unwrap();
            }
            ArtifactStatus::NotFound => {
                writeln!(output, "  [??] {} -> no manifest located", id).unwrap();
            }
        }
    }
    write!(
        output,
        "{} of {} manifests located",
        report.found_count(),
        report.entries().len()
    )
    .unwrap();
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_verify_flat_and_missing() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("appmanifest_570.acf"), "manifest").unwrap();

        let ids = AppIdSet::parse("570 730");
        let report = verify(tmp.path(), &ids);

        match report.status_of("570").unwrap() {
            ArtifactStatus::Found(path) => {
                assert!(path.ends_with("appmanifest_570.acf"));
            }
            ArtifactStatus::NotFound => panic!("570 should be found"),
        }
        assert_eq!(report.status_of("730"), Some(&ArtifactStatus::NotFound));
        assert_eq!(report.found_count(), 1);
        assert_eq!(report.missing_ids(), ["730"]);
        assert!(!report.all_found());
    }

    #[test]
    fn test_verify_bare_convention() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("440.acf"), "manifest").unwrap();

        let report = verify(tmp.path(), &AppIdSet::parse("440"));
        assert!(matches!(
            report.status_of("440"),
            Some(ArtifactStatus::Found(_))
        ));
    }

    #[test]
    fn test_verify_nested_convention() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("steamapps");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("appmanifest_10.acf"), "manifest").unwrap();

        let report = verify(tmp.path(), &AppIdSet::parse("10"));
        match report.status_of("10").unwrap() {
            ArtifactStatus::Found(path) => assert!(path.ends_with("steamapps/appmanifest_10.acf")),
            ArtifactStatus::NotFound => panic!("nested manifest should be found"),
        }
    }

    #[test]
    fn test_flat_convention_wins_over_nested() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("appmanifest_10.acf"), "flat").unwrap();
        let nested = tmp.path().join("steamapps");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("appmanifest_10.acf"), "nested").unwrap();

        let report = verify(tmp.path(), &AppIdSet::parse("10"));
        match report.status_of("10").unwrap() {
            ArtifactStatus::Found(path) => assert_eq!(path, &tmp.path().join("appmanifest_10.acf")),
            ArtifactStatus::NotFound => panic!("flat manifest should win"),
        }
    }

    #[test]
    fn test_report_preserves_request_order_and_duplicates() {
        let tmp = TempDir::new().unwrap();
        let ids = AppIdSet::parse("730 570 730");
        let report = verify(tmp.path(), &ids);

        let order: Vec<_> = report.entries().iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(order, ["730", "570", "730"]);
    }

    #[test]
    fn test_format_report() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("appmanifest_570.acf"), "m").unwrap();

        let report = verify(tmp.path(), &AppIdSet::parse("570 730"));
        let text = format_report(&report);
        assert!(text.contains("[OK] 570"));
        assert!(text.contains("[??] 730"));
        assert!(text.contains("1 of 2 manifests located"));
    }
}
