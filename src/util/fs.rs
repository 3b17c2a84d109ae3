//! Filesystem utilities.
//!
//! Every download and extraction in the pipeline goes through a scratch path
//! first; the helpers here enforce the "complete and non-empty, or absent"
//! rule for final destinations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Whether `path` is a regular file with at least one byte.
pub fn is_nonempty_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file() && m.len() > 0).unwrap_or(false)
}

/// Create a scratch file in the same directory as `dest`.
///
/// Keeping the scratch file next to its destination guarantees the final
/// rename stays on one filesystem and is atomic.
pub fn scratch_file_for(dest: &Path) -> Result<NamedTempFile> {
    let parent = dest.parent().unwrap_or_else(|| Path::new("."));
    ensure_dir(parent)?;
    tempfile::Builder::new()
        .prefix(".acfgen-part-")
        .tempfile_in(parent)
        .with_context(|| format!("failed to create scratch file in {}", parent.display()))
}

/// Atomically move a completed scratch file into place.
///
/// Fails (and discards the scratch file) when the payload is empty, so a
/// failed transfer can never leave a zero-byte or partial file at `dest`.
pub fn persist_nonempty(scratch: NamedTempFile, dest: &Path) -> Result<()> {
    let len = scratch
        .as_file()
        .metadata()
        .context("failed to stat scratch file")?
        .len();
    if len == 0 {
        bail!("refusing to persist empty download to {}", dest.display());
    }
    scratch
        .persist(dest)
        .with_context(|| format!("failed to move scratch file into {}", dest.display()))?;
    Ok(())
}

/// Search a directory tree for the first file with the given name.
pub fn find_file_recursive(root: &Path, file_name: &str) -> Option<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_file() && e.file_name() == file_name)
        .map(|e| e.into_path())
}

/// Copy a file into place and mark it executable.
pub fn install_executable(src: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(src, dest).with_context(|| {
        format!("failed to copy {} to {}", src.display(), dest.display())
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dest, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("failed to set mode on {}", dest.display()))?;
    }

    Ok(())
}

/// Count the entries (files and directories) under a directory tree.
///
/// The root itself is not counted. Used by the staged-copy extraction
/// strategy to poll progress against an archive's expected entry count.
pub fn count_entries(root: &Path) -> usize {
    if !root.exists() {
        return 0;
    }
    WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_persist_nonempty_moves_file() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out.bin");

        let mut scratch = scratch_file_for(&dest).unwrap();
        scratch.write_all(b"payload").unwrap();
        persist_nonempty(scratch, &dest).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"payload");
    }

    #[test]
    fn test_persist_rejects_empty_payload() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out.bin");

        let scratch = scratch_file_for(&dest).unwrap();
        assert!(persist_nonempty(scratch, &dest).is_err());
        assert!(!dest.exists());
    }

    #[test]
    fn test_find_file_recursive() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("tool.exe"), b"x").unwrap();
        fs::write(tmp.path().join("other.txt"), b"y").unwrap();

        let found = find_file_recursive(tmp.path(), "tool.exe").unwrap();
        assert!(found.ends_with("a/b/c/tool.exe"));
        assert!(find_file_recursive(tmp.path(), "missing.exe").is_none());
    }

    #[test]
    fn test_count_entries() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(count_entries(tmp.path()), 0);

        fs::create_dir_all(tmp.path().join("dir")).unwrap();
        fs::write(tmp.path().join("dir/file.txt"), b"x").unwrap();
        fs::write(tmp.path().join("top.txt"), b"y").unwrap();

        assert_eq!(count_entries(tmp.path()), 3);
        assert_eq!(count_entries(&tmp.path().join("missing")), 0);
    }

    #[test]
    fn test_is_nonempty_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("f");
        assert!(!is_nonempty_file(&path));

        fs::write(&path, b"").unwrap();
        assert!(!is_nonempty_file(&path));

        fs::write(&path, b"x").unwrap();
        assert!(is_nonempty_file(&path));
    }
}
