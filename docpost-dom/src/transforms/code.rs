use std::sync::LazyLock;

use docpost_icons::Icon;
use kuchikikiki::NodeRef;
use log::{debug, error, trace};
use regex::Regex;

use super::TransformContext;
use crate::{
  dom::{Document, ElementExt, Selector, icon_node, new_element, new_text},
  error::DomError,
};

/// Stimulus action the theme's clipboard controller listens for.
pub const COPY_CODE_ACTION: &str = "click->clipboard#copyCode";

/// Pygments wraps each block in `div.highlight-<lang>`.
static LANGUAGE_CLASS: LazyLock<Option<Regex>> = LazyLock::new(|| {
  Regex::new(r"^highlight-([A-Za-z0-9_+#.\-]+)$")
    .map_err(|e| error!("Failed to compile LANGUAGE_CLASS regex: {e}"))
    .ok()
});

/// Language named by a block's `highlight-<lang>` class, if any.
fn block_language(block: &NodeRef) -> Option<String> {
  let regex = LANGUAGE_CLASS.as_ref()?;
  block.class_tokens().iter().find_map(|token| {
    regex
      .captures(token)
      .and_then(|captures| captures.get(1))
      .map(|lang| lang.as_str().to_string())
  })
}

fn language_label(language: &str) -> NodeRef {
  let label = new_element("span", &[("class", "code-lang")]);
  label.append(new_text(language));
  label
}

fn copy_button(ctx: &TransformContext<'_>) -> Result<NodeRef, DomError> {
  let button = new_element("button", &[
    ("class", "copy tooltipped tooltipped-nw"),
    ("type", "button"),
    ("aria-label", "Copy this code"),
    ("data-action", COPY_CODE_ACTION),
  ]);
  button.append(icon_node(ctx.icons, Icon::Copy)?);
  Ok(button)
}

/// The `div.code-block-caption` leading an existing
/// `div.literal-block-wrapper` around `block`.
fn existing_caption(block: &NodeRef) -> Option<NodeRef> {
  let parent = block.parent()?;
  if !parent.has_class("literal-block-wrapper") {
    return None;
  }
  parent
    .first_element_child()
    .filter(|child| child.is_tag("div") && child.has_class("code-block-caption"))
}

/// Give every highlighted code block a header showing its language and a
/// copy button.
///
/// Blocks that already sit in a captioned `div.literal-block-wrapper` reuse
/// that caption as the header. Other blocks are wrapped in a new
/// `div.literal-block-wrapper` whose first child is the header.
///
/// # Errors
///
/// Returns [`DomError::UnknownIcon`] if the copy icon is missing.
pub fn code_headers(
  document: &Document,
  ctx: &TransformContext<'_>,
) -> Result<(), DomError> {
  let candidates = Selector::parse(r#"div[class*="highlight-"]"#)?;
  let label_selector = Selector::parse("span.code-lang")?;
  let mut added = 0usize;

  for block in document.find_all(&candidates) {
    let Some(language) = block_language(&block) else {
      trace!("Skipping block without a language class");
      continue;
    };
    if block.parent().is_none() {
      continue;
    }

    if let Some(caption) = existing_caption(&block) {
      if !label_selector.find_all(&caption).is_empty() {
        continue;
      }
      caption.add_class("code-header");
      caption.prepend(language_label(&language));
      caption.append(copy_button(ctx)?);
    } else {
      let header = new_element("div", &[("class", "code-block-caption code-header")]);
      header.append(language_label(&language));
      header.append(copy_button(ctx)?);

      let wrapper = block.wrap_in(new_element("div", &[(
        "class",
        "literal-block-wrapper code-wrapper",
      )]));
      wrapper.prepend(header);
    }
    added += 1;
  }

  debug!("Added {added} code header(s)");
  Ok(())
}

/// Give reST literal blocks (`pre.literal-block`) a header holding only a
/// copy button, since they carry no language.
///
/// A block already inside a captioned `div.literal-block-wrapper` gets the
/// button on that caption. Any other block is wrapped the way
/// [`code_headers`] wraps highlighted blocks.
///
/// # Errors
///
/// Returns [`DomError::UnknownIcon`] if the copy icon is missing.
pub fn literal_blocks(
  document: &Document,
  ctx: &TransformContext<'_>,
) -> Result<(), DomError> {
  let blocks = Selector::parse("pre.literal-block")?;
  let copy_buttons = Selector::parse("button.copy")?;
  let mut added = 0usize;

  for block in document.find_all(&blocks) {
    if block.parent().is_none() {
      continue;
    }

    if let Some(caption) = existing_caption(&block) {
      if !copy_buttons.find_all(&caption).is_empty() {
        continue;
      }
      caption.add_class("code-header");
      caption.append(copy_button(ctx)?);
    } else {
      let header = new_element("div", &[("class", "code-block-caption code-header")]);
      header.append(copy_button(ctx)?);

      let wrapper = block.wrap_in(new_element("div", &[(
        "class",
        "literal-block-wrapper code-wrapper",
      )]));
      wrapper.prepend(header);
    }
    added += 1;
  }

  debug!("Added {added} literal block header(s)");
  Ok(())
}

/// Replace `<span class="pre">` inside `<code>` with its text and drop the
/// `class` attribute of inline `<code>`.
///
/// # Errors
///
/// Only fails if a built-in selector does not compile.
pub fn unwrap_pre_spans(
  document: &Document,
  _ctx: &TransformContext<'_>,
) -> Result<(), DomError> {
  let spans = Selector::parse("code span.pre")?;
  for span in document.find_all(&spans) {
    span.unwrap_element();
  }

  let code = Selector::parse("code[class]")?;
  for element in document.find_all(&code) {
    if element.ancestors().any(|ancestor| ancestor.is_tag("pre")) {
      continue;
    }
    element.remove_attr("class");
  }
  Ok(())
}
