//! angle-builder-lib: building ANGLE for Apple platforms
//!
//! This crate holds everything the `angle-builder` binary does:
//! - `target`: output modes and the per-architecture build targets they need
//! - `workspace`, `toolchain`, `source`: the storage folder, depot_tools and the ANGLE checkout
//! - `build`: `gn gen` / `autoninja` for each planned target
//! - `fusion`: merging per-architecture outputs into fat dylibs or xcframeworks
//! - `package`: the final `.tar.gz` archive
//! - `pipeline`: all of the above in order
//!
//! External tools are never spawned directly; every call goes through an
//! [`exec::CommandRunner`].

pub mod build;
pub mod consts;
pub mod exec;
pub mod fusion;
pub mod package;
pub mod pipeline;
pub mod platform;
pub mod source;
pub mod target;
pub mod toolchain;
pub mod util;
pub mod workspace;

pub use pipeline::{BuildOptions, BuildReport, PipelineError, run};
pub use target::{OutputArtifactMode, ParseModeError};
