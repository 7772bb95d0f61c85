use color_eyre::eyre::Result;
use docpost::cli::Cli;
use docpost_pipeline::RunOutcome;
use log::{LevelFilter, info};

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  // Per-file failures were already reported by the pipeline and do not
  // change the exit status.
  match docpost::run(&cli)? {
    RunOutcome::Completed(report) => {
      info!(
        "Done: {} processed, {} failed",
        report.processed.len(),
        report.failures.len()
      );
    },
    RunOutcome::Aborted | RunOutcome::Skipped { .. } => {},
  }

  Ok(())
}
