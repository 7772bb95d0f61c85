use std::{
  collections::HashSet,
  path::{Path, PathBuf},
};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::{adapter::BuildAdapter, error::PipelineError};

/// The de-duplicated list of pages one run processes, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
  paths: Vec<PathBuf>,
}

impl FileSet {
  /// Work out which pages to process.
  ///
  /// If the adapter reports changed documents, only their output files are
  /// processed; pages that do not exist on disk are dropped. Otherwise every
  /// `.html` file under the output directory is processed.
  ///
  /// # Errors
  ///
  /// Returns [`PipelineError::Walk`] if the output directory cannot be
  /// walked.
  pub fn compute(adapter: &dyn BuildAdapter) -> Result<Self, PipelineError> {
    if let Some(changed) = adapter
      .changed_documents()
      .filter(|documents| !documents.is_empty())
    {
      debug!("Build reported {} changed document(s)", changed.len());
      return Ok(Self::from_paths(changed.iter().filter_map(|document| {
        let path = adapter.resolve_output_path(document);
        if path.is_file() {
          Some(path)
        } else {
          debug!(
            "No output file for changed document '{document}' at {}",
            path.display()
          );
          None
        }
      })));
    }

    Self::walk(adapter.output_dir())
  }

  /// Every `.html` file under `dir`, sorted.
  ///
  /// Entries below `dir` that cannot be read, such as dangling symlinks, are
  /// logged and skipped.
  ///
  /// # Errors
  ///
  /// Returns [`PipelineError::Walk`] if `dir` itself cannot be read.
  pub fn walk(dir: &Path) -> Result<Self, PipelineError> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
      let entry = match entry {
        Ok(entry) => entry,
        Err(source) if source.depth() == 0 => {
          return Err(PipelineError::Walk {
            path: dir.to_path_buf(),
            source,
          });
        },
        Err(e) => {
          warn!("Skipping unreadable entry under {}: {e}", dir.display());
          continue;
        },
      };
      if entry.file_type().is_file() && is_html(entry.path()) {
        paths.push(entry.into_path());
      }
    }
    paths.sort();
    Ok(Self::from_paths(paths))
  }

  /// Keep the first occurrence of every path.
  pub fn from_paths<I>(paths: I) -> Self
  where
    I: IntoIterator<Item = PathBuf>,
  {
    let mut seen = HashSet::new();
    Self {
      paths: paths
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect(),
    }
  }

  #[must_use]
  pub fn paths(&self) -> &[PathBuf] {
    &self.paths
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.paths.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.paths.is_empty()
  }
}

fn is_html(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
}
