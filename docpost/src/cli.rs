use std::path::PathBuf;

use clap::Parser;

/// Command line interface for docpost
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "docpost: post-process the HTML output of a documentation build"
)]
pub struct Cli {
  /// Directory holding the rendered HTML pages
  #[arg(short, long)]
  pub output_dir: Option<PathBuf>,

  /// Builder that produced the output (html, dirhtml, singlehtml, ...).
  /// Defaults to `html`.
  #[arg(short, long)]
  pub builder: Option<String>,

  /// Only process the output of these documents (can be used multiple times)
  #[arg(long = "changed", value_name = "DOC", action = clap::ArgAction::Append)]
  pub changed: Vec<String>,

  /// Read changed document names from a file, one per line. Blank lines and
  /// lines starting with `#` are ignored
  #[arg(long = "changed-from", value_name = "FILE")]
  pub changed_from: Option<PathBuf>,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times) Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(short = 'c', long = "config-file", action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,

  /// Number of files to process in parallel. 0 uses every CPU
  #[arg(short, long)]
  pub jobs: Option<usize>,

  /// Do not draw a progress bar
  #[arg(long)]
  pub no_progress: bool,

  /// Report the build as failed with this message, leaving the output alone
  #[arg(long = "fail-build", value_name = "MESSAGE")]
  pub fail_build: Option<String>,

  /// Enable verbose debug logging
  #[arg(short, long)]
  pub verbose: bool,
}

impl Cli {
  /// Parse command line arguments
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
