//! The narrow interface a build system exposes to the pipeline.
use std::{
  fmt,
  path::{Path, PathBuf},
};

use docpost_dom::TransformOptions;
use serde_json::Value;
use thiserror::Error;

/// Builder kinds whose output is a tree of HTML pages.
pub const HTML_BUILDERS: [&str; 3] = ["html", "dirhtml", "singlehtml"];

#[must_use]
pub fn is_html_builder(kind: &str) -> bool {
  HTML_BUILDERS.contains(&kind)
}

/// An upstream build failure, handed to build-finished hooks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Build failed: {message}")]
pub struct BuildError {
  pub message: String,
}

impl BuildError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

/// What the pipeline needs to know about a finished build.
pub trait BuildAdapter {
  /// Name of the builder that produced the output, e.g. `html`.
  fn builder_kind(&self) -> &str;

  fn output_dir(&self) -> &Path;

  /// Documents rebuilt by this build, if the build system tracks them.
  ///
  /// `None` (or an empty list) makes the pipeline fall back to every HTML
  /// file under [`BuildAdapter::output_dir`].
  fn changed_documents(&self) -> Option<Vec<String>>;

  /// Output file a document name was rendered to.
  fn resolve_output_path(&self, document: &str) -> PathBuf;

  /// A raw configuration value, looked up by name.
  fn config_value(&self, name: &str) -> Option<Value>;

  /// Transform flags resolved from [`BuildAdapter::config_value`].
  ///
  /// Both canonical keys and their `enable-...` aliases are looked up.
  /// Values that are not booleans are ignored.
  fn transform_options(&self) -> TransformOptions {
    TransformOptions::from_lookup(|name| {
      self.config_value(name).as_ref().and_then(value_as_bool)
    })
  }
}

/// Read a configuration value as a flag. Accepts JSON booleans and the
/// strings `true`/`false`.
fn value_as_bool(value: &Value) -> Option<bool> {
  match value {
    Value::Bool(enabled) => Some(*enabled),
    Value::String(text) => text.trim().parse().ok(),
    _ => None,
  }
}

pub type BuildFinishedHook =
  Box<dyn FnMut(&dyn BuildAdapter, Option<&BuildError>)>;

/// Build lifecycle hooks. Hooks run in registration order.
#[derive(Default)]
pub struct BuildHooks {
  build_finished: Vec<BuildFinishedHook>,
}

impl fmt::Debug for BuildHooks {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("BuildHooks")
      .field("build_finished", &self.build_finished.len())
      .finish()
  }
}

impl BuildHooks {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a hook fired once the build is over, successful or not.
  pub fn on_build_finished<F>(&mut self, hook: F)
  where
    F: FnMut(&dyn BuildAdapter, Option<&BuildError>) + 'static,
  {
    self.build_finished.push(Box::new(hook));
  }

  pub fn emit_build_finished(
    &mut self,
    adapter: &dyn BuildAdapter,
    outcome: Option<&BuildError>,
  ) {
    log::debug!(
      "Firing {} build-finished hook(s)",
      self.build_finished.len()
    );
    for hook in &mut self.build_finished {
      hook(adapter, outcome);
    }
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.build_finished.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.build_finished.is_empty()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]
  use std::{cell::RefCell, collections::HashMap, rc::Rc};

  use serde_json::json;

  use super::*;

  struct FakeAdapter {
    config: HashMap<&'static str, Value>,
  }

  impl BuildAdapter for FakeAdapter {
    fn builder_kind(&self) -> &str {
      "html"
    }

    fn output_dir(&self) -> &Path {
      Path::new("/nonexistent")
    }

    fn changed_documents(&self) -> Option<Vec<String>> {
      None
    }

    fn resolve_output_path(&self, document: &str) -> PathBuf {
      self.output_dir().join(format!("{document}.html"))
    }

    fn config_value(&self, name: &str) -> Option<Value> {
      self.config.get(name).cloned()
    }
  }

  #[test]
  fn test_is_html_builder() {
    assert!(is_html_builder("dirhtml"));
    assert!(!is_html_builder("latex"));
    assert!(!is_html_builder("HTML"));
  }

  #[test]
  fn test_transform_options_from_config_values() {
    let adapter = FakeAdapter {
      config: HashMap::from([
        ("enable-external-link-icons", json!(true)),
        ("code_headers", json!("false")),
        ("strip_comments", json!(3)),
      ]),
    };
    let options = adapter.transform_options();

    assert!(options.external_link_icons);
    assert!(!options.code_headers);
    assert!(options.strip_comments);
  }

  #[test]
  fn test_hooks_fire_in_order() {
    let adapter = FakeAdapter {
      config: HashMap::new(),
    };
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut hooks = BuildHooks::new();

    for id in 0..3 {
      let seen = Rc::clone(&seen);
      hooks.on_build_finished(move |adapter, outcome| {
        seen.borrow_mut().push((
          id,
          adapter.builder_kind().to_string(),
          outcome.map(|e| e.message.clone()),
        ));
      });
    }
    assert_eq!(hooks.len(), 3);

    hooks.emit_build_finished(&adapter, Some(&BuildError::new("boom")));
    let seen = seen.borrow();
    assert_eq!(seen.iter().map(|(id, ..)| *id).collect::<Vec<_>>(), vec![
      0, 1, 2
    ]);
    assert!(
      seen
        .iter()
        .all(|(_, kind, msg)| kind == "html" && msg.as_deref() == Some("boom"))
    );
  }
}
