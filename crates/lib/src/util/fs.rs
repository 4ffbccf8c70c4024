//! Directory helpers for scratch folders and bundle copies.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Delete `dir` if it exists, then create it empty.
pub fn recreate_dir(dir: &Path) -> io::Result<()> {
  if dir.exists() {
    debug!(path = %dir.display(), "removing existing directory");
    std::fs::remove_dir_all(dir)?;
  }
  std::fs::create_dir_all(dir)
}

/// Recursively copy `src` to `dst`, leaving out the entries listed in `skip`.
///
/// `skip` holds paths relative to `src`. Symlinks are recreated rather than
/// followed so framework bundles keep their layout.
pub fn copy_tree_except(src: &Path, dst: &Path, skip: &[PathBuf]) -> io::Result<()> {
  for entry in WalkDir::new(src).follow_links(false) {
    let entry = entry.map_err(io::Error::other)?;
    let relative = entry.path().strip_prefix(src).map_err(io::Error::other)?;

    if skip.iter().any(|s| s == relative) {
      debug!(path = %entry.path().display(), "skipping entry");
      continue;
    }

    let target = dst.join(relative);
    let file_type = entry.file_type();

    if file_type.is_dir() {
      std::fs::create_dir_all(&target)?;
    } else if file_type.is_symlink() {
      copy_symlink(entry.path(), &target)?;
    } else {
      if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
      }
      std::fs::copy(entry.path(), &target)?;
    }
  }
  Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
  let link = std::fs::read_link(src)?;
  std::os::unix::fs::symlink(link, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
  std::fs::copy(src, dst).map(|_| ())
}
