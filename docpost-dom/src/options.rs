use serde::{Deserialize, Serialize};

/// Individually switchable transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
  SemanticMarkup,
  CollapsibleNavigation,
  ExpandCurrent,
  ExternalLinkIcons,
  RemoveEmptyToctrees,
  PermalinkEnhancement,
  HeadingFocus,
  CodeHeaders,
  UnwrapPreSpans,
  StripComments,
}

impl Feature {
  pub const ALL: [Self; 10] = [
    Self::SemanticMarkup,
    Self::CollapsibleNavigation,
    Self::ExpandCurrent,
    Self::ExternalLinkIcons,
    Self::RemoveEmptyToctrees,
    Self::PermalinkEnhancement,
    Self::HeadingFocus,
    Self::CodeHeaders,
    Self::UnwrapPreSpans,
    Self::StripComments,
  ];

  /// Canonical snake_case option key.
  #[must_use]
  pub const fn key(self) -> &'static str {
    match self {
      Self::SemanticMarkup => "semantic_markup",
      Self::CollapsibleNavigation => "collapsible_navigation",
      Self::ExpandCurrent => "expand_current",
      Self::ExternalLinkIcons => "external_link_icons",
      Self::RemoveEmptyToctrees => "remove_empty_toctrees",
      Self::PermalinkEnhancement => "permalink_enhancement",
      Self::HeadingFocus => "heading_focus",
      Self::CodeHeaders => "code_headers",
      Self::UnwrapPreSpans => "unwrap_pre_spans",
      Self::StripComments => "strip_comments",
    }
  }

  /// Resolve an option key.
  ///
  /// Accepts the canonical key, its hyphenated form and the `enable-`
  /// prefixed form theme configurations use, e.g. `enable-code-headers`.
  #[must_use]
  pub fn from_key(key: &str) -> Option<Self> {
    let normalized = key.trim().to_ascii_lowercase().replace('-', "_");
    let normalized = normalized.strip_prefix("enable_").unwrap_or(&normalized);
    Self::ALL
      .into_iter()
      .find(|feature| feature.key() == normalized)
  }

  /// The `enable-...` alias for this feature.
  #[must_use]
  pub fn alias(self) -> String {
    format!("enable-{}", self.key().replace('_', "-"))
  }
}

/// Which transforms run. Every flag defaults to on except external link
/// icons, which themes opt into.
#[allow(
  clippy::struct_excessive_bools,
  reason = "Each flag is an independent switch"
)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
  pub semantic_markup:        bool,
  pub collapsible_navigation: bool,
  pub expand_current:         bool,
  #[serde(alias = "enable-external-link-icons", alias = "external-link-icons")]
  pub external_link_icons:    bool,
  pub remove_empty_toctrees:  bool,
  #[serde(alias = "enable-permalink-enhancement", alias = "permalink-enhancement")]
  pub permalink_enhancement:  bool,
  pub heading_focus:          bool,
  #[serde(alias = "enable-code-headers", alias = "code-headers")]
  pub code_headers:           bool,
  pub unwrap_pre_spans:       bool,
  pub strip_comments:         bool,
}

impl Default for TransformOptions {
  fn default() -> Self {
    Self {
      semantic_markup:        true,
      collapsible_navigation: true,
      expand_current:         true,
      external_link_icons:    false,
      remove_empty_toctrees:  true,
      permalink_enhancement:  true,
      heading_focus:          true,
      code_headers:           true,
      unwrap_pre_spans:       true,
      strip_comments:         true,
    }
  }
}

impl TransformOptions {
  /// Every transform disabled.
  #[must_use]
  pub fn none() -> Self {
    let mut options = Self::default();
    for feature in Feature::ALL {
      options.set(feature, false);
    }
    options
  }

  #[must_use]
  pub const fn is_enabled(&self, feature: Feature) -> bool {
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

  pub const fn set(&mut self, feature: Feature, enabled: bool) {
    let flag = match feature {
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
    *flag = enabled;
  }

  /// Build options from a key lookup, such as a build system's
  /// configuration table.
  ///
  /// For each feature the canonical key is tried first, then its `enable-`
  /// alias. Features the lookup knows nothing about keep their default.
  #[must_use]
  pub fn from_lookup<F>(lookup: F) -> Self
  where
    F: Fn(&str) -> Option<bool>,
  {
    let mut options = Self::default();
    for feature in Feature::ALL {
      if let Some(enabled) =
        lookup(feature.key()).or_else(|| lookup(&feature.alias()))
      {
        options.set(feature, enabled);
      }
    }
    options
  }

  /// Canonical keys of the enabled features, in declaration order.
  #[must_use]
  pub fn enabled_keys(&self) -> Vec<&'static str> {
    Feature::ALL
      .into_iter()
      .filter(|feature| self.is_enabled(*feature))
      .map(Feature::key)
      .collect()
  }
}
