//! The ordered set of tree transforms.
//!
//! Each transform is idempotent: running it on its own output leaves the tree
//! unchanged. Later transforms may rely on the markup earlier ones produce.
//! Permalink labelling, for instance, looks for the `<figcaption>` that
//! semantic markup creates. [`canonical`] therefore fixes the order.
mod code;
mod links;
mod navigation;
mod structure;

use docpost_icons::IconRegistry;
use log::trace;

pub use self::{
  code::{code_headers, literal_blocks, unwrap_pre_spans},
  links::{external_links, heading_focus, permalinks},
  navigation::{collapsible_navigation, expand_current},
  structure::{
    remove_empty_toctrees,
    semantic_figures,
    semantic_sections,
    strip_comments,
  },
};
use crate::{
  dom::Document,
  error::DomError,
  options::{Feature, TransformOptions},
};

/// Read-only state shared by every transform of a run.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
  pub options: &'a TransformOptions,
  pub icons:   &'a IconRegistry,
}

impl<'a> TransformContext<'a> {
  #[must_use]
  pub const fn new(options: &'a TransformOptions, icons: &'a IconRegistry) -> Self {
    Self { options, icons }
  }
}

/// A single in-place rewrite of a [`Document`].
pub trait DomTransform {
  /// Stable name, used in logs.
  fn name(&self) -> &'static str;

  fn is_enabled(&self, options: &TransformOptions) -> bool;

  /// Apply the transform.
  ///
  /// # Errors
  ///
  /// Returns an error if the transform needs an icon the registry lacks, or
  /// if one of its selectors fails to compile.
  fn apply(
    &self,
    document: &Document,
    ctx: &TransformContext<'_>,
  ) -> Result<(), DomError>;
}

type TransformFn = fn(&Document, &TransformContext<'_>) -> Result<(), DomError>;

/// A built-in transform gated by a [`Feature`] flag.
#[derive(Clone, Copy)]
pub struct Step {
  name:    &'static str,
  feature: Feature,
  run:     TransformFn,
}

impl std::fmt::Debug for Step {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Step")
      .field("name", &self.name)
      .field("feature", &self.feature)
      .finish_non_exhaustive()
  }
}

impl Step {
  #[must_use]
  pub const fn feature(&self) -> Feature {
    self.feature
  }
}

impl DomTransform for Step {
  fn name(&self) -> &'static str {
    self.name
  }

  fn is_enabled(&self, options: &TransformOptions) -> bool {
    options.is_enabled(self.feature)
  }

  fn apply(
    &self,
    document: &Document,
    ctx: &TransformContext<'_>,
  ) -> Result<(), DomError> {
    (self.run)(document, ctx)
  }
}

/// Every built-in transform in the order they must run.
static CANONICAL: [Step; 12] = [
  Step {
    name:    "semantic-sections",
    feature: Feature::SemanticMarkup,
    run:     semantic_sections,
  },
  Step {
    name:    "semantic-figures",
    feature: Feature::SemanticMarkup,
    run:     semantic_figures,
  },
  Step {
    name:    "collapsible-navigation",
    feature: Feature::CollapsibleNavigation,
    run:     collapsible_navigation,
  },
  Step {
    name:    "expand-current",
    feature: Feature::ExpandCurrent,
    run:     expand_current,
  },
  Step {
    name:    "external-links",
    feature: Feature::ExternalLinkIcons,
    run:     external_links,
  },
  Step {
    name:    "remove-empty-toctrees",
    feature: Feature::RemoveEmptyToctrees,
    run:     remove_empty_toctrees,
  },
  Step {
    name:    "heading-focus",
    feature: Feature::HeadingFocus,
    run:     heading_focus,
  },
  Step {
    name:    "permalinks",
    feature: Feature::PermalinkEnhancement,
    run:     permalinks,
  },
  Step {
    name:    "code-headers",
    feature: Feature::CodeHeaders,
    run:     code_headers,
  },
  Step {
    name:    "literal-blocks",
    feature: Feature::CodeHeaders,
    run:     literal_blocks,
  },
  Step {
    name:    "unwrap-pre-spans",
    feature: Feature::UnwrapPreSpans,
    run:     unwrap_pre_spans,
  },
  Step {
    name:    "strip-comments",
    feature: Feature::StripComments,
    run:     strip_comments,
  },
];

/// The built-in transforms, in canonical order.
#[must_use]
pub fn canonical() -> &'static [Step] {
  &CANONICAL
}

/// Run `transforms` in order, skipping disabled ones.
///
/// # Errors
///
/// Stops at and returns the first transform error.
pub fn apply_transforms<'t, I, T>(
  transforms: I,
  document: &Document,
  ctx: &TransformContext<'_>,
) -> Result<(), DomError>
where
  I: IntoIterator<Item = &'t T>,
  T: DomTransform + ?Sized + 't,
{
  for transform in transforms {
    if !transform.is_enabled(ctx.options) {
      trace!("Skipping disabled transform {}", transform.name());
      continue;
    }
    trace!("Applying transform {}", transform.name());
    transform.apply(document, ctx)?;
  }
  Ok(())
}

/// Run every enabled built-in transform in canonical order.
///
/// # Errors
///
/// Stops at and returns the first transform error.
pub fn apply_all(
  document: &Document,
  ctx: &TransformContext<'_>,
) -> Result<(), DomError> {
  apply_transforms(canonical(), document, ctx)
}

/// Parse `html`, apply every enabled transform and serialize the result.
///
/// # Errors
///
/// Returns an error if parsing, a transform or serialization fails.
pub fn postprocess(html: &str, ctx: &TransformContext<'_>) -> Result<String, DomError> {
  let document = Document::parse(html)?;
  apply_all(&document, ctx)?;
  document.serialize()
}
