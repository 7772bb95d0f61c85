use std::{
  io,
  path::{Path, PathBuf},
};

use docpost_dom::DomError;
use thiserror::Error;

/// A failure confined to one file (or to enumerating the output directory).
///
/// None of these stop a run. They are collected into the
/// [`RunReport`](crate::RunReport).
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Failed to read {}: {source}", path.display())]
  FileRead {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to write {}: {source}", path.display())]
  FileWrite {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to process {}: {source}", path.display())]
  Document {
    path:   PathBuf,
    #[source]
    source: DomError,
  },

  #[error("Failed to walk {}: {source}", path.display())]
  Walk {
    path:   PathBuf,
    #[source]
    source: walkdir::Error,
  },
}

impl PipelineError {
  /// The file (or directory) the error is about.
  #[must_use]
  pub fn path(&self) -> &Path {
    match self {
      Self::FileRead { path, .. }
      | Self::FileWrite { path, .. }
      | Self::Document { path, .. }
      | Self::Walk { path, .. } => path,
    }
  }

  /// Whether this points at a bug rather than a bad input file.
  #[must_use]
  pub const fn is_programming_error(&self) -> bool {
    matches!(
      self,
      Self::Document {
        source: DomError::UnknownIcon(_) | DomError::InvalidSelector(_),
        ..
      }
    )
  }
}
