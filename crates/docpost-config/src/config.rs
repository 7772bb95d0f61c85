use std::{
  fs,
  path::{Path, PathBuf},
};

use docpost_dom::{Feature, TransformOptions};
use serde::{Deserialize, Serialize};

use crate::{
  error::ConfigError,
  transforms::{TransformsConfig, parse_bool},
};

/// File names tried, in order, when no config file is given explicitly.
pub const CONFIG_FILENAMES: [&str; 6] = [
  "docpost.toml",
  "docpost.json",
  ".docpost.toml",
  ".docpost.json",
  ".config/docpost.toml",
  ".config/docpost.json",
];

/// Settings for a standalone docpost run.
///
/// Every top-level field is optional so that merging several files, and then
/// command line flags, only replaces what each source actually sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Directory holding the rendered HTML
  pub output_dir: Option<PathBuf>,

  /// Builder name the pages were rendered with, e.g. `html` or `dirhtml`
  pub builder: Option<String>,

  /// Number of files processed in parallel. `0` means one per CPU.
  pub jobs: Option<usize>,

  /// Whether to draw a progress bar
  pub show_progress: Option<bool>,

  /// Per-transform switches
  pub transforms: TransformsConfig,
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
      return Err(ConfigError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )));
    };

    match ext.to_lowercase().as_str() {
      "json" => {
        serde_json::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse JSON config from {}: {}",
            path.display(),
            e
          ))
        })
      },
      "toml" => {
        toml::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse TOML config from {}: {}",
            path.display(),
            e
          ))
        })
      },
      _ => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from the given files, or a discovered one, then apply
  /// `KEY=VALUE` overrides.
  ///
  /// Explicit files are merged in order, later files winning. When none are
  /// given, [`Config::find_config_file`] is consulted.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded or an override is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if config_files.is_empty() {
      match Self::find_config_file() {
        Some(discovered) => {
          log::info!("Using discovered config file: {}", discovered.display());
          Self::from_file(&discovered)?
        },
        None => Self::default(),
      }
    } else {
      let mut merged = Self::default();
      for path in config_files {
        merged.merge(Self::from_file(path)?);
      }
      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }
      merged
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// ```rust, ignore
  /// config.apply_overrides(&vec![
  ///     "jobs=4".to_string(),
  ///     "transforms.code_headers=false".to_string(),
  /// ])?;
  /// ```
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Apply a single override. Transform flags are addressed as
  /// `transforms.<flag>`, or directly by their `enable-...` alias.
  ///
  /// # Errors
  ///
  /// Returns an error for unknown keys or unparsable values.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    match key {
      "output_dir" => {
        self.output_dir = (!value.is_empty()).then(|| PathBuf::from(value));
      },
      "builder" => {
        self.builder = (!value.is_empty()).then(|| value.to_string());
      },
      "jobs" => {
        self.jobs = if value.is_empty() {
          None
        } else {
          Some(value.parse().map_err(|_| {
            ConfigError::Config(format!(
              "Invalid value for 'jobs': '{value}'. Expected a non-negative \
               integer"
            ))
          })?)
        };
      },
      "show_progress" => {
        self.show_progress = if value.is_empty() {
          None
        } else {
          Some(parse_bool(key, value)?)
        };
      },
      _ => {
        if let Some(flag) = key.strip_prefix("transforms.") {
          return self.transforms.apply_override(flag, value);
        }
        if key.starts_with("enable-") && Feature::from_key(key).is_some() {
          return self.transforms.apply_override(key, value);
        }
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'. See documentation for \
           supported keys."
        )));
      },
    }
    Ok(())
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// [`Option`] fields are replaced only when `other` sets them, and the
  /// transform table is merged flag by flag.
  pub fn merge(&mut self, other: Self) {
    if other.output_dir.is_some() {
      self.output_dir = other.output_dir;
    }
    if other.builder.is_some() {
      self.builder = other.builder;
    }
    if other.jobs.is_some() {
      self.jobs = other.jobs;
    }
    if other.show_progress.is_some() {
      self.show_progress = other.show_progress;
    }
    self.transforms.merge(&other.transforms);
  }

  /// Search for config files in common locations under the current directory.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    let current_dir = std::env::current_dir().ok()?;
    Self::find_config_file_in(&current_dir)
  }

  /// Search for config files under `dir`.
  #[must_use]
  pub fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
      .iter()
      .map(|filename| dir.join(filename))
      .find(|path| path.is_file())
  }

  /// Transform flags resolved against their defaults.
  #[must_use]
  pub fn transform_options(&self) -> TransformOptions {
    self.transforms.resolve()
  }
}
