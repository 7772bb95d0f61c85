//! Icons are from the Material Design icon set, embedded at compile time.
use std::{collections::HashMap, fmt};

use thiserror::Error;

pub const EXTERNAL_LINK_SVG: &str = include_str!("../icons/external-link.svg");
pub const CHEVRON_RIGHT_SVG: &str = include_str!("../icons/chevron-right.svg");
pub const LINK_SVG: &str = include_str!("../icons/link.svg");
pub const COPY_SVG: &str = include_str!("../icons/copy.svg");

/// Raised when a transform asks for an icon the registry does not carry.
///
/// The set of names is closed, so hitting this is a bug in the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown icon: {name}")]
pub struct UnknownIconError {
  pub name: String,
}

/// Symbolic names of every icon the transforms inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
  /// North-east arrow appended to external references
  ExternalLink,
  /// Expand marker for collapsible navigation entries
  ChevronRight,
  /// Permalink icon replacing the pilcrow in header links
  Link,
  /// Copy-to-clipboard icon in code block headers
  Copy,
}

impl Icon {
  pub const ALL: [Self; 4] =
    [Self::ExternalLink, Self::ChevronRight, Self::Link, Self::Copy];

  #[must_use]
  pub const fn name(self) -> &'static str {
    match self {
      Self::ExternalLink => "external-link",
      Self::ChevronRight => "chevron-right",
      Self::Link => "link",
      Self::Copy => "copy",
    }
  }

  /// Look up an icon by its symbolic name. Underscores are accepted in place
  /// of dashes.
  #[must_use]
  pub fn from_name(name: &str) -> Option<Self> {
    let normalized = name.trim().replace('_', "-");
    Self::ALL.into_iter().find(|icon| icon.name() == normalized)
  }

  const fn markup(self) -> &'static str {
    match self {
      Self::ExternalLink => EXTERNAL_LINK_SVG,
      Self::ChevronRight => CHEVRON_RIGHT_SVG,
      Self::Link => LINK_SVG,
      Self::Copy => COPY_SVG,
    }
  }
}

impl fmt::Display for Icon {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// Immutable mapping from icon name to SVG markup.
///
/// Constructed once per run and handed to the transforms by reference.
#[derive(Debug, Clone)]
pub struct IconRegistry {
  icons: HashMap<&'static str, &'static str>,
}

impl IconRegistry {
  /// The full built-in icon set.
  #[must_use]
  pub fn builtin() -> Self {
    Self::with_icons(Icon::ALL)
  }

  /// A registry carrying only the given icons. Mostly useful for exercising
  /// the unknown-icon path.
  #[must_use]
  pub fn with_icons<I>(icons: I) -> Self
  where
    I: IntoIterator<Item = Icon>,
  {
    Self {
      icons: icons
        .into_iter()
        .map(|icon| (icon.name(), icon.markup()))
        .collect(),
    }
  }

  /// Return the SVG markup registered under `name`.
  ///
  /// # Errors
  ///
  /// Returns [`UnknownIconError`] if no icon is registered under `name`.
  pub fn get(&self, name: &str) -> Result<&'static str, UnknownIconError> {
    self.icons.get(name).copied().ok_or_else(|| {
      UnknownIconError {
        name: name.to_string(),
      }
    })
  }

  /// Same as [`IconRegistry::get`], keyed by [`Icon`].
  ///
  /// # Errors
  ///
  /// Returns [`UnknownIconError`] if this registry was built without `icon`.
  pub fn icon(&self, icon: Icon) -> Result<&'static str, UnknownIconError> {
    self.get(icon.name())
  }

  /// Registered icon names, sorted.
  #[must_use]
  pub fn names(&self) -> Vec<&'static str> {
    let mut names: Vec<_> = self.icons.keys().copied().collect();
    names.sort_unstable();
    names
  }
}

impl Default for IconRegistry {
  fn default() -> Self {
    Self::builtin()
  }
}
