//! Archive extraction with ordered strategy fallback.
//!
//! Strategies are tried in a fixed order: a password-capable external
//! 7-Zip (only when a password is supplied), the native archive readers
//! (zip crate, tar + flate2), a staged copy through an external `unzip`
//! child polled against the archive's expected entry count, and finally an
//! external `tar`. A strategy failure logs a warning and falls through; only
//! total exhaustion is an error, at which point the destination contents
//! must not be trusted.

use std::fmt;
use std::fs::File;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context, Result};
use tracing::{info, warn};

use crate::acquire::first_success;
use crate::core::PipelineError;
use crate::util::fs::{count_entries, ensure_dir};
use crate::util::process::{find_executable, find_seven_zip, ProcessBuilder};

/// Bounded wait for the staged-copy strategy.
const STAGED_COPY_WINDOW: Duration = Duration::from_secs(10);

/// Poll interval while watching the staged copy fill the destination.
const STAGED_COPY_POLL: Duration = Duration::from_millis(250);

/// One way to unpack an archive into a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// External 7-Zip, the only strategy attempted for password handling.
    SevenZip,
    /// Native readers: zip crate for `.zip`, tar + flate2 for `.tar.gz`.
    NativeArchive,
    /// External `unzip` child copying into the destination, polled until
    /// the entry count matches or a bounded wait elapses.
    StagedCopy,
    /// External `tar` as last resort.
    TarUtility,
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtractionStrategy::SevenZip => "7z",
            ExtractionStrategy::NativeArchive => "native",
            ExtractionStrategy::StagedCopy => "staged-copy",
            ExtractionStrategy::TarUtility => "tar",
        };
        f.write_str(name)
    }
}

/// The fixed attempt order for one extraction.
///
/// The 7-Zip step only participates when a password was supplied; when the
/// binary cannot be located the step is skipped rather than failed.
pub fn plan(with_password: bool, seven_zip_available: bool) -> Vec<ExtractionStrategy> {
    let mut order = Vec::with_capacity(4);
    if with_password && seven_zip_available {
        order.push(ExtractionStrategy::SevenZip);
    }
    order.extend([
        ExtractionStrategy::NativeArchive,
        ExtractionStrategy::StagedCopy,
        ExtractionStrategy::TarUtility,
    ]);
    order
}

/// Extract `archive` into `dest`, trying each strategy in order.
///
/// On failure the destination may hold a partial subset; the returned
/// `Result`, not the directory state, is authoritative.
pub fn extract(archive: &Path, dest: &Path, password: Option<&str>) -> Result<(), PipelineError> {
    let fail = |_| PipelineError::Extraction {
        archive: archive.to_path_buf(),
    };

    ensure_dir(dest).map_err(fail)?;

    let seven_zip = find_seven_zip();
    if password.is_some() && seven_zip.is_none() {
        info!("password supplied but no 7-Zip binary on PATH, skipping password-capable extractor");
    }

    let order = plan(password.is_some(), seven_zip.is_some());
    let outcome = first_success("extract", &order, |strategy| match strategy {
        ExtractionStrategy::SevenZip => {
            let Some(bin) = seven_zip.as_deref() else {
                bail!("7-Zip binary unavailable");
            };
            via_seven_zip(bin, archive, dest, password.unwrap_or_default())
        }
        ExtractionStrategy::NativeArchive => via_native(archive, dest, password),
        ExtractionStrategy::StagedCopy => via_staged_copy(archive, dest),
        ExtractionStrategy::TarUtility => via_tar(archive, dest),
    });

    match outcome {
        Some(()) => Ok(()),
        None => Err(PipelineError::Extraction {
            archive: archive.to_path_buf(),
        }),
    }
}

/// External 7-Zip extraction, password supported via `-p`.
fn via_seven_zip(bin: &Path, archive: &Path, dest: &Path, password: &str) -> Result<()> {
    let mut builder = ProcessBuilder::new(bin)
        .arg("x")
        .arg(archive)
        .arg(format!("-o{}", dest.display()))
        .arg("-y");
    if !password.is_empty() {
        builder = builder.arg(format!("-p{}", password));
    }
    builder.output_checked()?;
    Ok(())
}

/// Native archive readers, dispatched on file extension.
fn via_native(archive: &Path, dest: &Path, password: Option<&str>) -> Result<()> {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if name.ends_with(".zip") {
        extract_zip(archive, dest, password)
    } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
        extract_tar_gz(archive, dest)
    } else {
        bail!("no native reader for `{}`", name);
    }
}

/// Unpack a ZIP archive with the zip crate, decrypting when a password is
/// set.
fn extract_zip(archive_path: &Path, dest: &Path, password: Option<&str>) -> Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("failed to open {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("failed to read ZIP archive {}", archive_path.display()))?;

    for i in 0..archive.len() {
        let mut entry = match password {
            Some(pw) => archive
                .by_index_decrypt(i, pw.as_bytes())
                .context("failed to read ZIP entry")?
                .map_err(|_| anyhow!("wrong password for {}", archive_path.display()))?,
            None => archive.by_index(i).context("failed to read ZIP entry")?,
        };

        let Some(rel) = entry.enclosed_name().map(Path::to_path_buf) else {
            warn!("skipping ZIP entry with unsafe path");
            continue;
        };
        let out_path = dest.join(rel);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)
                .with_context(|| format!("failed to create {}", out_path.display()))?;
        } else {
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            let mut out = File::create(&out_path)
                .with_context(|| format!("failed to create {}", out_path.display()))?;
            std::io::copy(&mut entry, &mut out)
                .with_context(|| format!("failed to extract {}", out_path.display()))?;
        }
    }

    Ok(())
}

/// Unpack a gzip-compressed tarball.
fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<()> {
    use flate2::read::GzDecoder;
    use tar::Archive;

    let file = File::open(archive_path)
        .with_context(|| format!("failed to open {}", archive_path.display()))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive
        .unpack(dest)
        .with_context(|| format!("failed to unpack {}", archive_path.display()))?;
    Ok(())
}

/// Entry count recorded in a ZIP central directory.
fn expected_entry_count(archive_path: &Path) -> Result<usize> {
    let file = File::open(archive_path)
        .with_context(|| format!("failed to open {}", archive_path.display()))?;
    let archive = zip::ZipArchive::new(file)
        .with_context(|| format!("failed to read ZIP archive {}", archive_path.display()))?;
    Ok(archive.len())
}

/// Staged copy through an external `unzip` child.
///
/// The destination is polled until the copied entry count reaches the
/// archive's expected count or the bounded window elapses.
fn via_staged_copy(archive: &Path, dest: &Path) -> Result<()> {
    let unzip = find_executable("unzip").context("unzip not found on PATH")?;
    let expected = expected_entry_count(archive)?;

    let mut child = ProcessBuilder::new(unzip)
        .args(["-o", "-q"])
        .arg(archive)
        .arg("-d")
        .arg(dest)
        .spawn_quiet()?;

    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait().context("failed to poll unzip")? {
            if !status.success() {
                bail!("unzip exited with {:?}", status.code());
            }
            break;
        }
        if count_entries(dest) >= expected {
            let _ = child.wait();
            break;
        }
        if started.elapsed() > STAGED_COPY_WINDOW {
            let _ = child.kill();
            let _ = child.wait();
            bail!(
                "staged copy did not complete within {}s",
                STAGED_COPY_WINDOW.as_secs()
            );
        }
        std::thread::sleep(STAGED_COPY_POLL);
    }

    if count_entries(dest) == 0 {
        bail!("staged copy produced no entries");
    }
    Ok(())
}

/// External `tar` as last resort; bsdtar also reads ZIP payloads.
fn via_tar(archive: &Path, dest: &Path) -> Result<()> {
    let tar = find_executable("tar").context("tar not found on PATH")?;
    ProcessBuilder::new(tar)
        .arg("-xf")
        .arg(archive)
        .arg("-C")
        .arg(dest)
        .output_checked()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_test_zip(path: &Path) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();

        writer.add_directory("inner/", options).unwrap();
        writer.start_file("inner/tool.exe", options).unwrap();
        writer.write_all(b"fake binary payload").unwrap();
        writer.start_file("readme.txt", options).unwrap();
        writer.write_all(b"docs").unwrap();
        writer.finish().unwrap();
    }

    #[test]
    fn test_plan_without_password() {
        let order = plan(false, true);
        assert_eq!(
            order,
            [
                ExtractionStrategy::NativeArchive,
                ExtractionStrategy::StagedCopy,
                ExtractionStrategy::TarUtility,
            ]
        );
    }

    #[test]
    fn test_plan_with_password() {
        let order = plan(true, true);
        assert_eq!(order[0], ExtractionStrategy::SevenZip);
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn test_plan_skips_seven_zip_when_missing() {
        let order = plan(true, false);
        assert_eq!(order[0], ExtractionStrategy::NativeArchive);
        assert_eq!(order.len(), 3);
    }

    #[test]
    fn test_extract_zip_natively() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("tool.zip");
        let dest = tmp.path().join("out");
        write_test_zip(&archive);

        extract(&archive, &dest, None).unwrap();

        assert_eq!(
            std::fs::read(dest.join("inner/tool.exe")).unwrap(),
            b"fake binary payload"
        );
        assert!(dest.join("readme.txt").exists());
    }

    #[test]
    fn test_extract_tar_gz_natively() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("tool.tar.gz");
        let dest = tmp.path().join("out");

        {
            let file = File::create(&archive).unwrap();
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            let mut builder = tar::Builder::new(encoder);

            let mut header = tar::Header::new_gnu();
            header.set_path("tool.exe").unwrap();
            header.set_size(4);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append(&header, std::io::Cursor::new(b"exec")).unwrap();
            builder.into_inner().unwrap().finish().unwrap();
        }

        extract(&archive, &dest, None).unwrap();
        assert_eq!(std::fs::read(dest.join("tool.exe")).unwrap(), b"exec");
    }

    #[test]
    fn test_corrupted_archive_exhausts_all_strategies() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("broken.zip");
        let dest = tmp.path().join("out");
        std::fs::write(&archive, b"this is not a zip archive").unwrap();

        let result = extract(&archive, &dest, None);

        // The Result is authoritative; directory state is not.
        assert!(matches!(result, Err(PipelineError::Extraction { .. })));
    }

    #[test]
    fn test_expected_entry_count() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("tool.zip");
        write_test_zip(&archive);

        assert_eq!(expected_entry_count(&archive).unwrap(), 3);
    }
}
