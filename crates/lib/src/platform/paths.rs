use crate::consts::{STORAGE_ENV_VAR, STORAGE_FOLDER_NAME};
use std::path::{Path, PathBuf};

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> PathBuf {
  let userprofile = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
  PathBuf::from(userprofile)
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> PathBuf {
  let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
  PathBuf::from(home)
}

/// Returns the base directory the storage folder is created in.
///
/// `ANGLE_BUILDER_STORAGE` takes precedence over the home directory.
pub fn storage_base_dir() -> PathBuf {
  if let Ok(path) = std::env::var(STORAGE_ENV_VAR) {
    return PathBuf::from(path);
  }

  home_dir()
}

/// Returns the storage folder path for an optional user-supplied base.
pub fn storage_dir(user_path: Option<&Path>) -> PathBuf {
  match user_path {
    Some(base) => base.join(STORAGE_FOLDER_NAME),
    None => storage_base_dir().join(STORAGE_FOLDER_NAME),
  }
}
