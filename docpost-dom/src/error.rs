use std::io;

use docpost_icons::UnknownIconError;
use thiserror::Error;

/// Errors raised while parsing, transforming or serializing a document.
#[derive(Debug, Error)]
pub enum DomError {
  #[error("Malformed document: {reason}")]
  MalformedDocument { reason: String },

  #[error("Invalid selector: {0}")]
  InvalidSelector(String),

  #[error(transparent)]
  UnknownIcon(#[from] UnknownIconError),

  #[error("Serialization error: {0}")]
  Serialize(#[from] io::Error),
}

impl From<std::string::FromUtf8Error> for DomError {
  fn from(e: std::string::FromUtf8Error) -> Self {
    Self::Serialize(io::Error::other(e.to_string()))
  }
}
