use std::{
  fs,
  io,
  path::{Path, PathBuf},
};

use docpost_config::TransformsConfig;
use docpost_dom::Feature;
use docpost_pipeline::BuildAdapter;
use serde_json::Value;

/// A [`BuildAdapter`] over an output directory that some other tool already
/// built.
#[derive(Debug, Clone)]
pub struct StandaloneAdapter {
  output_dir: PathBuf,
  builder:    String,
  changed:    Option<Vec<String>>,
  transforms: TransformsConfig,
}

impl StandaloneAdapter {
  pub fn new(output_dir: impl Into<PathBuf>, builder: impl Into<String>) -> Self {
    Self {
      output_dir: output_dir.into(),
      builder:    builder.into(),
      changed:    None,
      transforms: TransformsConfig::default(),
    }
  }

  /// Restrict the run to these documents. An empty list means "everything".
  #[must_use]
  pub fn with_changed(mut self, documents: Vec<String>) -> Self {
    self.changed = (!documents.is_empty()).then_some(documents);
    self
  }

  #[must_use]
  pub fn with_transforms(mut self, transforms: TransformsConfig) -> Self {
    self.transforms = transforms;
    self
  }
}

impl BuildAdapter for StandaloneAdapter {
  fn builder_kind(&self) -> &str {
    &self.builder
  }

  fn output_dir(&self) -> &Path {
    &self.output_dir
  }

  fn changed_documents(&self) -> Option<Vec<String>> {
    self.changed.clone()
  }

  /// `dirhtml` writes `doc` to `doc/index.html`, except for index pages.
  /// Every other builder writes `doc.html`.
  fn resolve_output_path(&self, document: &str) -> PathBuf {
    let document = document.trim_matches('/');
    let document = document.strip_suffix(".html").unwrap_or(document);
    let is_index = document == "index" || document.ends_with("/index");

    if self.builder == "dirhtml" && !is_index {
      self.output_dir.join(document).join("index.html")
    } else {
      self.output_dir.join(format!("{document}.html"))
    }
  }

  fn config_value(&self, name: &str) -> Option<Value> {
    let feature = Feature::from_key(name)?;
    self.transforms.get(feature).map(Value::Bool)
  }
}

/// Read a newline separated list of document names. Blank lines and `#`
/// comments are skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn read_document_list(path: &Path) -> io::Result<Vec<String>> {
  Ok(
    fs::read_to_string(path)?
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty() && !line.starts_with('#'))
      .map(ToString::to_string)
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]
  use super::*;

  #[test]
  fn test_resolve_html() {
    let adapter = StandaloneAdapter::new("/out", "html");
    assert_eq!(
      adapter.resolve_output_path("guide/install"),
      PathBuf::from("/out/guide/install.html")
    );
    assert_eq!(
      adapter.resolve_output_path("index"),
      PathBuf::from("/out/index.html")
    );
  }

  #[test]
  fn test_resolve_dirhtml() {
    let adapter = StandaloneAdapter::new("/out", "dirhtml");
    assert_eq!(
      adapter.resolve_output_path("guide/install"),
      PathBuf::from("/out/guide/install/index.html")
    );
    assert_eq!(
      adapter.resolve_output_path("index"),
      PathBuf::from("/out/index.html")
    );
    assert_eq!(
      adapter.resolve_output_path("guide/index"),
      PathBuf::from("/out/guide/index.html")
    );
  }

  #[test]
  fn test_config_value_only_reports_set_flags() {
    let adapter = StandaloneAdapter::new("/out", "html").with_transforms(
      TransformsConfig {
        code_headers: Some(false),
        ..Default::default()
      },
    );

    assert_eq!(adapter.config_value("code_headers"), Some(Value::Bool(false)));
    assert_eq!(
      adapter.config_value("enable-code-headers"),
      Some(Value::Bool(false))
    );
    assert_eq!(adapter.config_value("strip_comments"), None);
    assert_eq!(adapter.config_value("html_theme"), None);
  }

  #[test]
  fn test_with_changed_empty_means_all() {
    let adapter = StandaloneAdapter::new("/out", "html").with_changed(Vec::new());
    assert_eq!(adapter.changed_documents(), None);
  }
}
