use docpost_dom::{Feature, TransformOptions};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// The `[transforms]` table.
///
/// Every flag is optional so that a later config file (or a `--config`
/// override) only changes the flags it mentions. Unset flags fall back to
/// [`TransformOptions::default`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransformsConfig {
  /// Rewrite `div.section` and `div.figure` into semantic elements
  #[serde(skip_serializing_if = "Option::is_none")]
  pub semantic_markup: Option<bool>,

  /// Add expand toggles to navigation items with nested lists
  #[serde(skip_serializing_if = "Option::is_none")]
  pub collapsible_navigation: Option<bool>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub expand_current: Option<bool>,

  /// Decorate external links with an icon
  #[serde(
    alias = "enable-external-link-icons",
    skip_serializing_if = "Option::is_none"
  )]
  pub external_link_icons: Option<bool>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub remove_empty_toctrees: Option<bool>,

  /// Turn `¶` permalinks into copy-link buttons
  #[serde(
    alias = "enable-permalink-enhancement",
    skip_serializing_if = "Option::is_none"
  )]
  pub permalink_enhancement: Option<bool>,

  /// Wrap heading text in a link so keyboard users can focus headings
  #[serde(skip_serializing_if = "Option::is_none")]
  pub heading_focus: Option<bool>,

  /// Add a language label and copy button above code blocks
  #[serde(alias = "enable-code-headers", skip_serializing_if = "Option::is_none")]
  pub code_headers: Option<bool>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub unwrap_pre_spans: Option<bool>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub strip_comments: Option<bool>,
}

impl TransformsConfig {
  #[must_use]
  pub const fn get(&self, feature: Feature) -> Option<bool> {
    match feature {
      Feature::SemanticMarkup => self.semantic_markup,
      Feature::CollapsibleNavigation => self.collapsible_navigation,
      Feature::ExpandCurrent => self.expand_current,
      Feature::ExternalLinkIcons => self.external_link_icons,
      Feature::RemoveEmptyToctrees => self.remove_empty_toctrees,
      Feature::PermalinkEnhancement => self.permalink_enhancement,
      Feature::HeadingFocus => self.heading_focus,
      Feature::CodeHeaders => self.code_headers,
      Feature::UnwrapPreSpans => self.unwrap_pre_spans,
      Feature::StripComments => self.strip_comments,
    }
  }

  pub const fn set(&mut self, feature: Feature, enabled: Option<bool>) {
    let slot = match feature {
      Feature::SemanticMarkup => &mut self.semantic_markup,
      Feature::CollapsibleNavigation => &mut self.collapsible_navigation,
      Feature::ExpandCurrent => &mut self.expand_current,
      Feature::ExternalLinkIcons => &mut self.external_link_icons,
      Feature::RemoveEmptyToctrees => &mut self.remove_empty_toctrees,
      Feature::PermalinkEnhancement => &mut self.permalink_enhancement,
      Feature::HeadingFocus => &mut self.heading_focus,
      Feature::CodeHeaders => &mut self.code_headers,
      Feature::UnwrapPreSpans => &mut self.unwrap_pre_spans,
      Feature::StripComments => &mut self.strip_comments,
    };
    *slot = enabled;
  }

  /// Apply a `KEY=VALUE` override. The key may use any spelling
  /// [`Feature::from_key`] accepts, and an empty value unsets the flag.
  ///
  /// # Errors
  ///
  /// Returns an error for unknown keys or values that are not booleans.
  pub fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
    let feature = Feature::from_key(key).ok_or_else(|| {
      ConfigError::Config(format!(
        "Unknown configuration key: 'transforms.{key}'. See documentation for \
         supported keys."
      ))
    })?;

    let enabled = if value.is_empty() {
      None
    } else {
      Some(parse_bool(feature.key(), value)?)
    };
    self.set(feature, enabled);
    Ok(())
  }

  /// Merge another table into this one. Flags set in `other` win.
  pub fn merge(&mut self, other: &Self) {
    for feature in Feature::ALL {
      if let Some(enabled) = other.get(feature) {
        self.set(feature, Some(enabled));
      }
    }
  }

  /// Resolve against the built-in defaults.
  #[must_use]
  pub fn resolve(&self) -> TransformOptions {
    let mut options = TransformOptions::default();
    for feature in Feature::ALL {
      if let Some(enabled) = self.get(feature) {
        options.set(feature, enabled);
      }
    }
    options
  }
}

/// Parse a boolean override value.
///
/// # Errors
///
/// Returns an error unless the value is one of true/false, yes/no or 1/0.
pub fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "1" => Ok(true),
    "false" | "no" | "0" => Ok(false),
    _ => {
      Err(ConfigError::Config(format!(
        "Invalid boolean value for '{key}': '{value}'. Expected true/false, \
         yes/no, or 1/0"
      )))
    },
  }
}
