//! Workspace root holding every checkout and toolchain used by a build.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::platform::paths::storage_dir;

#[derive(Debug, Error)]
pub enum WorkspaceError {
  #[error("failed to create workspace folder {}: {source}", path.display())]
  Create { path: PathBuf, source: io::Error },

  #[error("failed to delete workspace folder {}: {source}", path.display())]
  Delete { path: PathBuf, source: io::Error },
}

/// The storage folder under which toolchain and source checkouts live.
#[derive(Debug, Clone)]
pub struct Workspace {
  root: PathBuf,
}

impl Workspace {
  /// Resolve the workspace under `user_path`, or under the default storage base.
  pub fn new(user_path: Option<&Path>) -> Self {
    Self {
      root: storage_dir(user_path),
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Create the workspace folder if it does not exist yet.
  pub fn ensure_folder(&self) -> Result<&Path, WorkspaceError> {
    if self.root.exists() {
      info!(path = %self.root.display(), "workspace folder already exists");
    } else {
      fs::create_dir_all(&self.root).map_err(|source| WorkspaceError::Create {
        path: self.root.clone(),
        source,
      })?;
      info!(path = %self.root.display(), "workspace folder created");
    }
    Ok(&self.root)
  }

  /// Remove the workspace folder and everything in it. Missing folders are ignored.
  pub fn delete_folder(&self) -> Result<(), WorkspaceError> {
    if !self.root.exists() {
      info!(path = %self.root.display(), "workspace folder does not exist, nothing to delete");
      return Ok(());
    }

    fs::remove_dir_all(&self.root).map_err(|source| WorkspaceError::Delete {
      path: self.root.clone(),
      source,
    })?;
    info!(path = %self.root.display(), "workspace folder deleted");
    Ok(())
  }
}
