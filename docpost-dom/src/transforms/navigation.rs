use docpost_icons::Icon;
use kuchikikiki::NodeRef;
use log::debug;

use super::TransformContext;
use crate::{
  dom::{Document, ElementExt, Selector, icon_node, new_element},
  error::DomError,
};

/// Stimulus action the theme's navigation controller listens for.
pub const EXPAND_ACTION: &str = "click->collapsible-nav#expand";

fn is_expand_button(node: &NodeRef) -> bool {
  node.is_tag("button") && node.has_class("expand")
}

/// Give navigation items that carry a nested list an expand toggle.
///
/// The toggle is a `<button class="expand">` holding the chevron icon,
/// inserted right after the item's link. Items already carrying a toggle are
/// left alone.
///
/// # Errors
///
/// Returns [`DomError::UnknownIcon`] if the chevron icon is missing.
pub fn collapsible_navigation(
  document: &Document,
  ctx: &TransformContext<'_>,
) -> Result<(), DomError> {
  let selector = Selector::parse("nav li")?;
  let mut added = 0usize;

  for item in document.find_all(&selector) {
    let children = item.element_children();
    let Some(link) = children.iter().find(|child| child.is_tag("a")) else {
      continue;
    };
    let has_sublist = children
      .iter()
      .any(|child| child.is_tag("ul") || child.is_tag("ol"));
    if !has_sublist || children.iter().any(is_expand_button) {
      continue;
    }

    item.add_class("has-children");
    let expanded = item.has_class("current") || item.has_class("expanded");
    let button = new_element("button", &[
      ("class", "expand"),
      ("type", "button"),
      ("aria-label", "Expand this section"),
      ("aria-expanded", if expanded { "true" } else { "false" }),
      ("data-action", EXPAND_ACTION),
    ]);
    button.append(icon_node(ctx.icons, Icon::ChevronRight)?);
    link.insert_after(button);
    added += 1;
  }

  debug!("Added {added} navigation toggle(s)");
  Ok(())
}

/// Mark `li.current` items as expanded so the page's own branch of the
/// navigation starts open.
///
/// # Errors
///
/// Only fails if the built-in selector does not compile.
pub fn expand_current(
  document: &Document,
  _ctx: &TransformContext<'_>,
) -> Result<(), DomError> {
  let selector = Selector::parse("li.current")?;
  for item in document.find_all(&selector) {
    item.add_class("expanded");
    for button in item
      .element_children()
      .into_iter()
      .filter(is_expand_button)
    {
      button.set_attr("aria-expanded", "true");
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]
  use docpost_icons::IconRegistry;

  use super::*;
  use crate::options::TransformOptions;

  const NAV: &str = r#"<nav class="sidebar"><ul>
<li class="toctree-l1"><a href="a.html">Link 1</a><ul><li><a href="a1.html">Sub</a></li></ul>
<li class="toctree-l1"><a href="b.html">Link 2</a></li>
</ul></nav><ul><li><a href="x.html">Outside</a><ul><li>y</li></ul></li></ul>"#;

  fn count(document: &Document, selector: &'static str) -> usize {
    document.find_all(&Selector::parse(selector).unwrap()).len()
  }

  #[test]
  fn test_toggle_only_for_items_with_children() {
    let options = TransformOptions::default();
    let icons = IconRegistry::builtin();
    let ctx = TransformContext::new(&options, &icons);
    let doc = Document::parse(NAV).unwrap();

    collapsible_navigation(&doc, &ctx).unwrap();

    assert_eq!(count(&doc, "button.expand"), 1);
    assert_eq!(count(&doc, r#"svg[data-icon="chevron-right"]"#), 1);
    assert_eq!(count(&doc, "nav li.has-children > a + button.expand"), 1);
    assert_eq!(count(&doc, r#"button[aria-expanded="false"]"#), 1);

    // Second run is a no-op.
    collapsible_navigation(&doc, &ctx).unwrap();
    assert_eq!(count(&doc, "button.expand"), 1);
  }

  #[test]
  fn test_current_item_expanded() {
    let options = TransformOptions::default();
    let icons = IconRegistry::builtin();
    let ctx = TransformContext::new(&options, &icons);
    let doc = Document::parse(
      r#"<nav><ul><li class="current"><a href="a.html">A</a><ul><li><a href="b.html">B</a></li></ul></li></ul></nav>"#,
    )
    .unwrap();

    collapsible_navigation(&doc, &ctx).unwrap();
    expand_current(&doc, &ctx).unwrap();
    expand_current(&doc, &ctx).unwrap();

    let item = doc.find_all(&Selector::parse("li.current").unwrap()).remove(0);
    assert_eq!(item.attr("class").as_deref(), Some("current has-children expanded"));
    assert_eq!(count(&doc, r#"li.current > button[aria-expanded="true"]"#), 1);
  }

  #[test]
  fn test_missing_chevron_icon() {
    let options = TransformOptions::default();
    let icons = IconRegistry::with_icons([Icon::Copy]);
    let ctx = TransformContext::new(&options, &icons);
    let doc = Document::parse(NAV).unwrap();

    let err = collapsible_navigation(&doc, &ctx).unwrap_err();
    assert!(matches!(err, DomError::UnknownIcon(_)));
  }
}
