//! Deliverable archiving.
//!
//! Writes `<output>/angle-<mode>.tar.gz` holding the fused artifacts at the
//! archive root, the ANGLE `include/` tree and its `LICENSE`. The archive is
//! staged next to its destination and renamed into place once complete.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::Builder;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::fusion::ArtifactSet;
use crate::target::OutputArtifactMode;

#[derive(Debug, Error)]
pub enum PackageError {
  #[error("cannot package missing path: {}", path.display())]
  MissingInput { path: PathBuf },

  #[error("failed to write archive {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Everything that goes into one archive.
#[derive(Debug, Clone)]
pub struct PackageInputs<'a> {
  pub artifacts: &'a ArtifactSet,
  pub include_dir: &'a Path,
  pub license_file: &'a Path,
}

impl PackageInputs<'_> {
  fn check(&self) -> Result<(), PackageError> {
    let required = self
      .artifacts
      .paths()
      .iter()
      .map(PathBuf::as_path)
      .chain([self.include_dir, self.license_file]);

    for path in required {
      if !path.exists() {
        return Err(PackageError::MissingInput { path: path.to_path_buf() });
      }
    }
    Ok(())
  }
}

/// Archive `inputs` into `output_folder` and return the archive path.
pub fn package(
  inputs: &PackageInputs<'_>,
  output_folder: &Path,
  mode: OutputArtifactMode,
) -> Result<PathBuf, PackageError> {
  inputs.check()?;

  fs::create_dir_all(output_folder).map_err(|source| PackageError::Io {
    path: output_folder.to_path_buf(),
    source,
  })?;

  let archive_path = output_folder.join(mode.archive_file_name());
  info!(archive = %archive_path.display(), "packaging artifacts");

  let mut staged = NamedTempFile::new_in(output_folder).map_err(|source| PackageError::Io {
    path: output_folder.to_path_buf(),
    source,
  })?;
  write_archive(inputs, staged.as_file_mut()).map_err(|source| PackageError::Io {
    path: archive_path.clone(),
    source,
  })?;
  staged.persist(&archive_path).map_err(|err| PackageError::Io {
    path: archive_path.clone(),
    source: err.error,
  })?;

  info!(archive = %archive_path.display(), "archive written");
  Ok(archive_path)
}

fn write_archive(inputs: &PackageInputs<'_>, file: &mut File) -> io::Result<()> {
  let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
  let mut builder = Builder::new(encoder);
  builder.follow_symlinks(false);

  for artifact in inputs.artifacts.paths() {
    let name = artifact
      .file_name()
      .ok_or_else(|| io::Error::other(format!("artifact has no file name: {}", artifact.display())))?;
    append(&mut builder, artifact, Path::new(name))?;
  }
  append(&mut builder, inputs.include_dir, Path::new("include"))?;
  append(&mut builder, inputs.license_file, Path::new("LICENSE"))?;

  let mut writer = builder.into_inner()?.finish()?;
  writer.flush()
}

fn append<W: Write>(builder: &mut Builder<W>, path: &Path, name: &Path) -> io::Result<()> {
  debug!(path = %path.display(), name = %name.display(), "adding to archive");
  if path.is_dir() {
    builder.append_dir_all(name, path)
  } else {
    builder.append_path_with_name(path, name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use flate2::read::GzDecoder;
  use std::collections::BTreeSet;
  use tar::Archive;
  use tempfile::TempDir;

  struct Fixture {
    temp: TempDir,
    artifacts: ArtifactSet,
  }

  impl Fixture {
    fn new(artifacts: &[&str]) -> Self {
      let temp = TempDir::new().unwrap();
      let checkout = temp.path().join("angle");
      fs::create_dir_all(checkout.join("include/EGL")).unwrap();
      fs::write(checkout.join("include/EGL/egl.h"), "// egl").unwrap();
      fs::write(checkout.join("LICENSE"), "BSD").unwrap();

      let out = checkout.join("out/mode");
      let mut paths = Vec::new();
      for name in artifacts {
        let path = out.join(name);
        if name.ends_with("work") {
          fs::create_dir_all(path.join("Headers")).unwrap();
          fs::write(path.join("Info.plist"), "<plist/>").unwrap();
        } else {
          fs::create_dir_all(&out).unwrap();
          fs::write(&path, "dylib").unwrap();
        }
        paths.push(path);
      }

      Self {
        temp,
        artifacts: ArtifactSet(paths),
      }
    }

    fn inputs(&self) -> (PathBuf, PathBuf) {
      let checkout = self.temp.path().join("angle");
      (checkout.join("include"), checkout.join("LICENSE"))
    }

    fn output(&self) -> PathBuf {
      self.temp.path().join("artifacts")
    }
  }

  fn entry_names(archive: &Path) -> BTreeSet<String> {
    let decoder = GzDecoder::new(File::open(archive).unwrap());
    Archive::new(decoder)
      .entries()
      .unwrap()
      .map(|e| e.unwrap().path().unwrap().to_string_lossy().trim_end_matches('/').to_string())
      .collect()
  }

  #[test]
  fn archives_dylibs_headers_and_license() {
    let fx = Fixture::new(&["libEGL.dylib", "libGLESv2.dylib"]);
    let (include, license) = fx.inputs();
    let inputs = PackageInputs {
      artifacts: &fx.artifacts,
      include_dir: &include,
      license_file: &license,
    };

    let archive = package(&inputs, &fx.output(), OutputArtifactMode::MacosUniversal).unwrap();

    assert_eq!(archive, fx.output().join("angle-macos-universal.tar.gz"));
    let names = entry_names(&archive);
    for expected in ["libEGL.dylib", "libGLESv2.dylib", "include/EGL/egl.h", "LICENSE"] {
      assert!(names.contains(expected), "missing {expected} in {names:?}");
    }
  }

  #[test]
  fn archives_bundle_directories_as_trees() {
    let fx = Fixture::new(&["libEGL.xcframework"]);
    let (include, license) = fx.inputs();
    let inputs = PackageInputs {
      artifacts: &fx.artifacts,
      include_dir: &include,
      license_file: &license,
    };

    let archive = package(&inputs, &fx.output(), OutputArtifactMode::IphoneallUniversal).unwrap();

    let names = entry_names(&archive);
    assert!(names.contains("libEGL.xcframework/Info.plist"));
    assert!(names.contains("libEGL.xcframework/Headers"));
  }

  #[test]
  fn creates_missing_output_folder() {
    let fx = Fixture::new(&["libEGL.dylib"]);
    let (include, license) = fx.inputs();
    let output = fx.output().join("nested/deeper");
    let inputs = PackageInputs {
      artifacts: &fx.artifacts,
      include_dir: &include,
      license_file: &license,
    };

    let archive = package(&inputs, &output, OutputArtifactMode::MacosX64).unwrap();

    assert!(archive.is_file());
    assert_eq!(archive.parent(), Some(output.as_path()));
  }

  #[test]
  fn missing_license_is_rejected_before_writing() {
    let fx = Fixture::new(&["libEGL.dylib"]);
    let (include, license) = fx.inputs();
    fs::remove_file(&license).unwrap();
    let inputs = PackageInputs {
      artifacts: &fx.artifacts,
      include_dir: &include,
      license_file: &license,
    };

    let err = package(&inputs, &fx.output(), OutputArtifactMode::MacosX64).unwrap_err();

    assert!(matches!(err, PackageError::MissingInput { ref path } if *path == license));
    assert!(!fx.output().exists());
  }

  #[test]
  #[cfg(unix)]
  fn symlinks_are_kept_as_links() {
    let fx = Fixture::new(&["libEGL.framework"]);
    let framework = &fx.artifacts.paths()[0];
    std::os::unix::fs::symlink("Info.plist", framework.join("Current")).unwrap();
    let (include, license) = fx.inputs();
    let inputs = PackageInputs {
      artifacts: &fx.artifacts,
      include_dir: &include,
      license_file: &license,
    };

    let archive = package(&inputs, &fx.output(), OutputArtifactMode::IphoneosArm64).unwrap();

    let decoder = GzDecoder::new(File::open(&archive).unwrap());
    let mut tar = Archive::new(decoder);
    let link = tar
      .entries()
      .unwrap()
      .map(|e| e.unwrap())
      .find(|e| e.path().unwrap().ends_with("Current"))
      .unwrap();
    assert!(link.header().entry_type().is_symlink());
  }

  fn folder_entries(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
      .unwrap()
      .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
      .collect()
  }

  #[test]
  fn output_folder_holds_only_the_archive() {
    let fx = Fixture::new(&["libEGL.dylib", "libGLESv2.dylib"]);
    let (include, license) = fx.inputs();
    let inputs = PackageInputs {
      artifacts: &fx.artifacts,
      include_dir: &include,
      license_file: &license,
    };

    package(&inputs, &fx.output(), OutputArtifactMode::MacosArm64).unwrap();

    assert_eq!(folder_entries(&fx.output()), ["angle-macos-arm64.tar.gz"]);
  }

  #[test]
  #[cfg(unix)]
  fn failed_write_keeps_previous_archive() {
    let fx = Fixture::new(&[]);
    let (include, license) = fx.inputs();
    // Exists, but has no file name to archive it under.
    let artifacts = ArtifactSet(vec![PathBuf::from("/")]);
    let inputs = PackageInputs {
      artifacts: &artifacts,
      include_dir: &include,
      license_file: &license,
    };
    let previous = fx.output().join("angle-macos-x64.tar.gz");
    fs::create_dir_all(fx.output()).unwrap();
    fs::write(&previous, "previous").unwrap();

    let err = package(&inputs, &fx.output(), OutputArtifactMode::MacosX64).unwrap_err();

    assert!(matches!(err, PackageError::Io { ref path, .. } if *path == previous));
    assert_eq!(fs::read_to_string(&previous).unwrap(), "previous");
    assert_eq!(folder_entries(&fx.output()), ["angle-macos-x64.tar.gz"]);
  }
}
