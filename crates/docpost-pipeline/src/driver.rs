use std::{
  fs,
  io::{self, Write},
  path::{Path, PathBuf},
};

use docpost_dom::{
  Document,
  DomError,
  TransformContext,
  TransformOptions,
  transforms,
};
use docpost_icons::IconRegistry;
use indicatif::{
  ParallelProgressIterator,
  ProgressBar,
  ProgressIterator,
  ProgressStyle,
};
use log::{debug, error, info, trace, warn};
use rayon::prelude::*;
use tempfile::NamedTempFile;

use crate::{
  adapter::{BuildAdapter, BuildError, is_html_builder},
  error::PipelineError,
  files::FileSet,
};

/// How a build-finished event was handled.
#[derive(Debug)]
pub enum RunOutcome {
  /// The build failed, so nothing was touched.
  Aborted,

  /// The builder does not produce HTML pages.
  Skipped { builder: String },

  Completed(RunReport),
}

impl RunOutcome {
  #[must_use]
  pub const fn report(&self) -> Option<&RunReport> {
    match self {
      Self::Completed(report) => Some(report),
      _ => None,
    }
  }
}

/// Result of processing a [`FileSet`].
#[derive(Debug, Default)]
pub struct RunReport {
  /// Files transformed successfully, in processing order.
  pub processed: Vec<PathBuf>,

  /// One entry per file that could not be processed.
  pub failures: Vec<PipelineError>,
}

impl RunReport {
  #[must_use]
  pub fn is_success(&self) -> bool {
    self.failures.is_empty()
  }

  #[must_use]
  pub fn total(&self) -> usize {
    self.processed.len() + self.failures.len()
  }
}

/// Runs the transforms over a build's HTML output.
#[derive(Debug, Clone)]
pub struct Pipeline {
  options:       TransformOptions,
  icons:         IconRegistry,
  jobs:          usize,
  show_progress: bool,
}

impl Pipeline {
  /// A serial pipeline with a progress bar.
  #[must_use]
  pub fn new(options: TransformOptions, icons: IconRegistry) -> Self {
    Self {
      options,
      icons,
      jobs: 1,
      show_progress: true,
    }
  }

  /// A pipeline whose options come from the adapter's configuration.
  #[must_use]
  pub fn from_adapter(adapter: &dyn BuildAdapter, icons: IconRegistry) -> Self {
    Self::new(adapter.transform_options(), icons)
  }

  /// Number of files processed at once. `0` uses one worker per CPU.
  #[must_use]
  pub fn with_jobs(mut self, jobs: usize) -> Self {
    self.jobs = if jobs == 0 { num_cpus::get() } else { jobs };
    self
  }

  #[must_use]
  pub fn with_progress(mut self, show_progress: bool) -> Self {
    self.show_progress = show_progress;
    self
  }

  #[must_use]
  pub const fn options(&self) -> &TransformOptions {
    &self.options
  }

  #[must_use]
  pub const fn jobs(&self) -> usize {
    self.jobs
  }

  /// Handle the end of a build.
  ///
  /// A failed build or a builder that does not emit HTML pages leaves the
  /// output alone. Otherwise every page in the [`FileSet`] is processed, and
  /// failures are collected into the report rather than stopping the run.
  pub fn on_build_finished(
    &self,
    adapter: &dyn BuildAdapter,
    outcome: Option<&BuildError>,
  ) -> RunOutcome {
    if let Some(error) = outcome {
      warn!("{error}; skipping HTML post-processing");
      return RunOutcome::Aborted;
    }

    let builder = adapter.builder_kind();
    if !is_html_builder(builder) {
      info!("Builder '{builder}' does not produce HTML pages, nothing to do");
      return RunOutcome::Skipped {
        builder: builder.to_string(),
      };
    }

    match FileSet::compute(adapter) {
      Ok(files) => RunOutcome::Completed(self.run(&files)),
      Err(e) => {
        warn!("{e}");
        RunOutcome::Completed(RunReport {
          processed: Vec::new(),
          failures:  vec![e],
        })
      },
    }
  }

  /// Process every file in `files`.
  pub fn run(&self, files: &FileSet) -> RunReport {
    info!("Post-processing {} HTML file(s)", files.len());
    let ctx = TransformContext::new(&self.options, &self.icons);
    let progress = self.progress_bar(files.len());

    let results: Vec<(PathBuf, Result<(), PipelineError>)> =
      if self.jobs > 1 && files.len() > 1 {
        match rayon::ThreadPoolBuilder::new().num_threads(self.jobs).build() {
          Ok(pool) => {
            debug!("Processing on {} threads", self.jobs);
            pool.install(|| {
              files
                .paths()
                .par_iter()
                .progress_with(progress.clone())
                .map(|path| (path.clone(), process_file(path, &ctx)))
                .collect()
            })
          },
          Err(e) => {
            warn!("Failed to build thread pool, processing serially: {e}");
            Self::run_serial(files, &ctx, &progress)
          },
        }
      } else {
        Self::run_serial(files, &ctx, &progress)
      };
    progress.finish_and_clear();

    let mut report = RunReport::default();
    for (path, result) in results {
      match result {
        Ok(()) => report.processed.push(path),
        Err(e) => {
          if e.is_programming_error() {
            error!("{e}");
          } else {
            warn!("{e}");
          }
          report.failures.push(e);
        },
      }
    }

    if report.is_success() {
      info!("Post-processed {} file(s)", report.processed.len());
    } else {
      warn!(
        "{} of {} file(s) could not be post-processed:",
        report.failures.len(),
        report.total()
      );
      for failure in &report.failures {
        warn!("  {}", failure.path().display());
      }
    }
    report
  }

  fn run_serial(
    files: &FileSet,
    ctx: &TransformContext<'_>,
    progress: &ProgressBar,
  ) -> Vec<(PathBuf, Result<(), PipelineError>)> {
    files
      .paths()
      .iter()
      .progress_with(progress.clone())
      .map(|path| (path.clone(), process_file(path, ctx)))
      .collect()
  }

  fn progress_bar(&self, len: usize) -> ProgressBar {
    if !self.show_progress {
      return ProgressBar::hidden();
    }
    let style = ProgressStyle::with_template(
      "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} \
       {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    let bar = ProgressBar::new(u64::try_from(len).unwrap_or(u64::MAX)).with_style(style);
    bar.set_message("post-processing");
    bar
  }
}

/// Parse, transform and serialize one page's HTML.
///
/// # Errors
///
/// Returns an error if parsing, a transform or serialization fails.
pub fn process_html(
  html: &str,
  ctx: &TransformContext<'_>,
) -> Result<String, DomError> {
  transforms::postprocess(html, ctx)
}

/// Rewrite one file in place.
///
/// The file is only written when the output differs from the input, and the
/// write goes through a temporary file in the same directory so readers never
/// see a partial page.
///
/// # Errors
///
/// Returns an error if the file cannot be read, processed or written back.
pub fn process_file(
  path: &Path,
  ctx: &TransformContext<'_>,
) -> Result<(), PipelineError> {
  trace!("Processing {}", path.display());
  let raw = fs::read(path).map_err(|source| {
    PipelineError::FileRead {
      path: path.to_path_buf(),
      source,
    }
  })?;

  let document_error = |source: DomError| {
    PipelineError::Document {
      path: path.to_path_buf(),
      source,
    }
  };
  let document = Document::parse_bytes(&raw).map_err(document_error)?;
  transforms::apply_all(&document, ctx).map_err(document_error)?;
  let html = document.serialize().map_err(document_error)?;

  if html.as_bytes() == raw.as_slice() {
    trace!("{} unchanged", path.display());
    return Ok(());
  }

  write_atomic(path, html.as_bytes()).map_err(|source| {
    PipelineError::FileWrite {
      path: path.to_path_buf(),
      source,
    }
  })
}

/// Replace `path` with `contents`, keeping its permissions.
fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
  let dir = path
    .parent()
    .filter(|parent| !parent.as_os_str().is_empty())
    .unwrap_or_else(|| Path::new("."));

  let mut temp = NamedTempFile::new_in(dir)?;
  temp.write_all(contents)?;
  if let Ok(metadata) = fs::metadata(path) {
    temp.as_file().set_permissions(metadata.permissions())?;
  }
  temp.persist(path).map_err(|e| e.error)?;
  Ok(())
}
