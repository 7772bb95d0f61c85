use log::debug;

use super::TransformContext;
use crate::{
  dom::{Document, ElementExt, Selector},
  error::DomError,
};

/// Turn `<div class="section">` into `<section>`, dropping the now redundant
/// class token.
///
/// # Errors
///
/// Only fails if the built-in selector does not compile.
pub fn semantic_sections(
  document: &Document,
  _ctx: &TransformContext<'_>,
) -> Result<(), DomError> {
  let selector = Selector::parse("div.section")?;
  let divs = document.find_all(&selector);
  debug!("Converting {} section div(s)", divs.len());

  for div in divs {
    if let Some(section) = div.rename("section") {
      section.remove_class("section");
    }
  }
  Ok(())
}

/// Turn `<div class="figure">` into `<figure>` and its first
/// `<p class="caption">` into `<figcaption>`.
///
/// # Errors
///
/// Only fails if a built-in selector does not compile.
pub fn semantic_figures(
  document: &Document,
  _ctx: &TransformContext<'_>,
) -> Result<(), DomError> {
  let figures = Selector::parse("div.figure")?;
  let captions = Selector::parse("p.caption")?;

  for div in document.find_all(&figures) {
    let Some(figure) = div.rename("figure") else {
      continue;
    };
    figure.remove_class("figure");

    if let Some(caption) = captions.find_all(&figure).into_iter().next()
      && let Some(figcaption) = caption.rename("figcaption")
    {
      figcaption.remove_class("caption");
    }
  }
  Ok(())
}

/// Remove `div.toctree-wrapper` containers with nothing but whitespace or
/// comments inside.
///
/// # Errors
///
/// Only fails if the built-in selector does not compile.
pub fn remove_empty_toctrees(
  document: &Document,
  _ctx: &TransformContext<'_>,
) -> Result<(), DomError> {
  let selector = Selector::parse("div.toctree-wrapper")?;
  for wrapper in document.find_all(&selector) {
    let is_empty = wrapper
      .children()
      .all(|child| child.is_blank_text() || child.as_comment().is_some());
    if is_empty {
      debug!("Removing empty toctree wrapper");
      wrapper.detach();
    }
  }
  Ok(())
}

/// Remove every comment node.
///
/// # Errors
///
/// Never fails; the signature matches the other transforms.
pub fn strip_comments(
  document: &Document,
  _ctx: &TransformContext<'_>,
) -> Result<(), DomError> {
  let comments = document.comments();
  debug!("Stripping {} comment(s)", comments.len());
  for comment in comments {
    comment.detach();
  }
  Ok(())
}
