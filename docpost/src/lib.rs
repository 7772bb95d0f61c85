//! Expose docpost's standalone runner for use in integration tests. The
//! binary is a thin wrapper around [`run`].
pub mod adapter;
pub mod cli;

use std::{cell::RefCell, rc::Rc};

use color_eyre::eyre::{Context, Result, bail, eyre};
use docpost_config::Config;
use docpost_icons::IconRegistry;
use docpost_pipeline::{BuildError, BuildHooks, Pipeline, RunOutcome};
use log::{debug, info};

use crate::{
  adapter::{StandaloneAdapter, read_document_list},
  cli::Cli,
};

/// Resolve configuration from config files, overrides and flags. Flags win.
///
/// # Errors
///
/// Returns an error if a config file cannot be loaded or an override is
/// invalid.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
  let mut config = Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")?;

  if let Some(ref output_dir) = cli.output_dir {
    config.output_dir = Some(output_dir.clone());
  }
  if let Some(ref builder) = cli.builder {
    config.builder = Some(builder.clone());
  }
  if let Some(jobs) = cli.jobs {
    config.jobs = Some(jobs);
  }
  if cli.no_progress {
    config.show_progress = Some(false);
  }

  Ok(config)
}

/// Run the pipeline once over an existing output directory.
///
/// The pipeline is registered as a build-finished hook and the event is
/// fired as a build system would, failed if `--fail-build` was given.
///
/// # Errors
///
/// Returns an error for invalid configuration or command line input. Files
/// that fail to process are reported in the returned outcome instead.
pub fn run(cli: &Cli) -> Result<RunOutcome> {
  let config = resolve_config(cli)?;

  let Some(output_dir) = config.output_dir.clone() else {
    bail!(
      "No output directory given. Pass --output-dir or set output_dir in a \
       config file."
    );
  };
  if !output_dir.is_dir() {
    bail!("Output directory does not exist: {}", output_dir.display());
  }

  let mut changed = cli.changed.clone();
  if let Some(ref list) = cli.changed_from {
    changed.extend(read_document_list(list).wrap_err_with(|| {
      format!("Failed to read document list: {}", list.display())
    })?);
  }

  let builder = config.builder.clone().unwrap_or_else(|| "html".to_string());
  info!("Output directory: {} ({builder})", output_dir.display());

  let adapter = StandaloneAdapter::new(output_dir, builder)
    .with_changed(changed)
    .with_transforms(config.transforms.clone());

  let pipeline = Pipeline::from_adapter(&adapter, IconRegistry::builtin())
    .with_jobs(config.jobs.unwrap_or(1))
    .with_progress(config.show_progress.unwrap_or(true));
  debug!("Enabled transforms: {:?}", pipeline.options().enabled_keys());

  let outcome = Rc::new(RefCell::new(None));
  let mut hooks = BuildHooks::new();
  {
    let outcome = Rc::clone(&outcome);
    hooks.on_build_finished(move |adapter, failure| {
      *outcome.borrow_mut() = Some(pipeline.on_build_finished(adapter, failure));
    });
  }

  let failure = cli.fail_build.as_deref().map(BuildError::new);
  hooks.emit_build_finished(&adapter, failure.as_ref());

  let result = outcome.borrow_mut().take();
  result.ok_or_else(|| eyre!("The build-finished hook did not run"))
}
