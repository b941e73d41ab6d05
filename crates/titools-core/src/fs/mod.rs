//! Filesystem plumbing: tree copies, non-following removal, and link
//! creation with a copy fallback for hosts that refuse symlinks.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;

/// How a skill link was materialized for a platform.
///
/// `CopiedFallback` is surfaced separately because a copy goes stale on
/// the next update unless re-synced, while a link never does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A symbolic link now points at the canonical skill directory.
    Linked,
    /// Symlinking was not permitted; a full recursive copy was made.
    CopiedFallback,
    Failed(String),
}

/// Remove a file, directory, or symlink without following links.
///
/// Missing paths are not an error.
pub fn remove_path(path: &Path) -> io::Result<()> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Recursively copy a directory tree, creating `dst` as needed.
pub fn copy_tree(src: &Path, dst: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("Failed to create directory: {}", dst.display()))?;
    for entry in
        fs::read_dir(src).with_context(|| format!("Failed to read dir: {}", src.display()))?
    {
        let entry =
            entry.with_context(|| format!("Failed to read dir entry: {}", src.display()))?;
        let ty = entry
            .file_type()
            .with_context(|| format!("Failed to stat dir entry: {}", entry.path().display()))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_tree(&from, &to)?;
        } else if ty.is_file() {
            fs::copy(&from, &to).with_context(|| {
                format!(
                    "Failed to copy file from {} to {}",
                    from.display(),
                    to.display()
                )
            })?;
        } else {
            anyhow::bail!("Unsupported filesystem entry type at {}", from.display());
        }
    }
    Ok(())
}

/// Create a symlink at `link_path` pointing to `target`, falling back to
/// a recursive copy when the host refuses symlinks.
///
/// Any existing entry at `link_path` is replaced. With `relative`, the
/// link target is expressed relative to the link's own directory so a
/// project tree stays relocatable.
pub fn link_or_copy(target: &Path, link_path: &Path, relative: bool) -> LinkOutcome {
    if let Some(parent) = link_path.parent()
        && let Err(err) = fs::create_dir_all(parent)
    {
        return LinkOutcome::Failed(format!(
            "Failed to create {}: {err}",
            parent.display()
        ));
    }

    if let Err(err) = remove_path(link_path) {
        return LinkOutcome::Failed(format!(
            "Failed to replace {}: {err}",
            link_path.display()
        ));
    }

    let final_target = if relative {
        match link_path.parent() {
            Some(parent) => relative_to(parent, target),
            None => target.to_path_buf(),
        }
    } else {
        target.to_path_buf()
    };

    match create_dir_symlink(&final_target, link_path) {
        Ok(()) => LinkOutcome::Linked,
        Err(err) if should_fall_back_to_copy(&err) => match copy_tree(target, link_path) {
            Ok(()) => LinkOutcome::CopiedFallback,
            Err(copy_err) => LinkOutcome::Failed(format!("Failed to copy: {copy_err}")),
        },
        Err(err) => LinkOutcome::Failed(format!("Failed to create symlink: {err}")),
    }
}

/// Express `target` relative to `from_dir` by component-wise difference.
///
/// Both paths must be in the same form (absolute or both scope-relative);
/// no filesystem access is performed.
pub fn relative_to(from_dir: &Path, target: &Path) -> PathBuf {
    let from: Vec<Component<'_>> = from_dir.components().collect();
    let to: Vec<Component<'_>> = target.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..from.len() {
        rel.push("..");
    }
    for component in &to[common..] {
        rel.push(component.as_os_str());
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    rel
}

fn should_fall_back_to_copy(err: &io::Error) -> bool {
    if cfg!(windows) {
        return true;
    }
    matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::Unsupported
    ) || is_cross_device_os_error(err)
}

fn is_cross_device_os_error(err: &io::Error) -> bool {
    let Some(code) = err.raw_os_error() else {
        return false;
    };

    #[cfg(unix)]
    {
        const EXDEV: i32 = 18;
        code == EXDEV
    }

    #[cfg(windows)]
    {
        const ERROR_NOT_SAME_DEVICE: i32 = 17;
        code == ERROR_NOT_SAME_DEVICE
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = code;
        false
    }
}

#[cfg(unix)]
fn create_dir_symlink(src_dir: &Path, dst_link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src_dir, dst_link)
}

#[cfg(windows)]
fn create_dir_symlink(src_dir: &Path, dst_link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src_dir, dst_link)
}

#[cfg(not(any(unix, windows)))]
fn create_dir_symlink(_src_dir: &Path, _dst_link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "Symlinks are not supported on this platform",
    ))
}
