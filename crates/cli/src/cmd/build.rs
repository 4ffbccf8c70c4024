//! Implementation of the `angle-builder <mode>` command.
//!
//! Runs the build pipeline and prints a summary, either as colored text or
//! as a JSON report.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use angle_builder_lib::exec::{CommandRunner, DryRunRunner, SystemRunner};
use angle_builder_lib::{BuildOptions, BuildReport, run};

use crate::output::{
  OutputFormat, format_elapsed, print_info, print_json, print_stat, print_success, print_warning, symbols,
};

#[derive(Serialize)]
struct BuildOutput<'a> {
  #[serde(flatten)]
  report: &'a BuildReport,
  elapsed_ms: u64,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  commands: Vec<String>,
}

/// Execute a build for `options`.
///
/// With `dry_run` set, tool invocations are recorded instead of run and the
/// recorded command lines are printed.
pub fn cmd_build(options: &BuildOptions, output: OutputFormat) -> Result<()> {
  let start = Instant::now();

  let dry_runner = DryRunRunner::new();
  let runner: &dyn CommandRunner = if options.dry_run { &dry_runner } else { &SystemRunner };
  debug!(dry_run = options.dry_run, mode = %options.mode, "starting build");

  let report = run(options, runner).with_context(|| format!("Failed to build {}", options.mode))?;
  let elapsed = start.elapsed();

  let commands: Vec<String> = dry_runner.invocations().iter().map(|i| i.command_line()).collect();

  if output.is_json() {
    return print_json(&BuildOutput {
      report: &report,
      elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
      commands,
    });
  }

  print_text(&report, elapsed, &commands);
  Ok(())
}

fn print_text(report: &BuildReport, elapsed: Duration, commands: &[String]) {
  if report.dry_run {
    print_warning("Dry run - nothing was executed");
    for command in commands {
      println!("  {} {}", symbols::ARROW, command);
    }
    println!();
  }

  let verb = if report.dry_run { "Planned" } else { "Built" };
  print_success(&format!("{} {} in {}", verb, report.mode, format_elapsed(elapsed)));

  print_stat("Branch", &report.branch);
  if let Some(revision) = &report.revision {
    print_stat("Revision", revision);
  }
  print_stat("Workspace", &report.workspace.display().to_string());

  let targets: Vec<&str> = report.targets.iter().map(|t| t.name.as_str()).collect();
  print_stat("Targets", &targets.join(", "));

  for artifact in report.artifacts.paths() {
    print_info(&artifact.display().to_string());
  }
  if let Some(archive) = &report.archive {
    print_stat("Archive", &archive.display().to_string());
  }
}
