//! Thin helpers over the `kuchikikiki` tree.
//!
//! Transforms never talk to the parser directly. They go through
//! [`Document`], [`Selector`] and the [`ElementExt`] trait so that tag and
//! class handling stay consistent across the crate.
use std::{
  fmt,
  panic::{AssertUnwindSafe, catch_unwind},
};

use docpost_icons::{Icon, IconRegistry};
use kuchikikiki::{
  Attribute,
  ExpandedName,
  NodeRef,
  Selectors,
  iter::NodeIterator,
};
use log::trace;
use markup5ever::{LocalName, QualName};

use crate::error::DomError;

/// A parsed HTML page.
///
/// The wrapped tree is mutated in place by transforms and serialized once
/// every enabled transform has run.
#[derive(Clone)]
pub struct Document {
  root: NodeRef,
}

impl fmt::Debug for Document {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Document").finish_non_exhaustive()
  }
}

impl Document {
  /// Parse a full HTML document.
  ///
  /// The HTML parser recovers from almost everything, so this only fails if
  /// the parser itself gives up.
  ///
  /// # Errors
  ///
  /// Returns [`DomError::MalformedDocument`] if the input cannot be turned
  /// into a tree.
  pub fn parse(raw: &str) -> Result<Self, DomError> {
    use tendril::TendrilSink;

    let root = catch_unwind(AssertUnwindSafe(|| kuchikikiki::parse_html().one(raw)))
      .map_err(|_| {
        DomError::MalformedDocument {
          reason: "HTML parser panicked".to_string(),
        }
      })?;

    Ok(Self { root })
  }

  /// Parse a document from raw bytes, which must be valid UTF-8.
  ///
  /// # Errors
  ///
  /// Returns [`DomError::MalformedDocument`] for invalid UTF-8 or a failed
  /// parse.
  pub fn parse_bytes(raw: &[u8]) -> Result<Self, DomError> {
    let text = std::str::from_utf8(raw).map_err(|e| {
      DomError::MalformedDocument {
        reason: format!("invalid UTF-8: {e}"),
      }
    })?;
    Self::parse(text)
  }

  /// The document node. Every other node descends from it.
  #[must_use]
  pub const fn root(&self) -> &NodeRef {
    &self.root
  }

  /// All elements matching `selector`, in document order.
  #[must_use]
  pub fn find_all(&self, selector: &Selector) -> Vec<NodeRef> {
    selector.find_all(&self.root)
  }

  /// All comment nodes, including those outside the `<html>` element.
  #[must_use]
  pub fn comments(&self) -> Vec<NodeRef> {
    self
      .root
      .descendants()
      .filter(|node| node.as_comment().is_some())
      .collect()
  }

  /// Serialize the tree back to HTML text.
  ///
  /// # Errors
  ///
  /// Returns [`DomError::Serialize`] if the serializer fails or produces
  /// invalid UTF-8.
  pub fn serialize(&self) -> Result<String, DomError> {
    let mut out = Vec::new();
    self.root.serialize(&mut out)?;
    Ok(String::from_utf8(out)?)
  }
}

/// A compiled CSS selector.
pub struct Selector {
  source:   &'static str,
  compiled: Selectors,
}

impl fmt::Debug for Selector {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Selector").field(&self.source).finish()
  }
}

impl Selector {
  /// Compile a selector.
  ///
  /// # Errors
  ///
  /// Returns [`DomError::InvalidSelector`] when the source does not parse.
  pub fn parse(source: &'static str) -> Result<Self, DomError> {
    Selectors::compile(source)
      .map(|compiled| Self { source, compiled })
      .map_err(|()| DomError::InvalidSelector(source.to_string()))
  }

  #[must_use]
  pub const fn source(&self) -> &'static str {
    self.source
  }

  /// Whether `node` is an element matched by this selector.
  #[must_use]
  pub fn matches(&self, node: &NodeRef) -> bool {
    node
      .clone()
      .into_element_ref()
      .is_some_and(|element| self.compiled.matches(&element))
  }

  /// Matching elements in `root` and its descendants, in document order.
  ///
  /// The result is collected up front so callers may mutate the tree while
  /// iterating.
  #[must_use]
  pub fn find_all(&self, root: &NodeRef) -> Vec<NodeRef> {
    let matches: Vec<NodeRef> = root
      .inclusive_descendants()
      .elements()
      .filter(|element| self.compiled.matches(element))
      .map(|element| element.as_node().clone())
      .collect();
    trace!("Selector `{}` matched {} element(s)", self.source, matches.len());
    matches
  }
}

/// Create a detached HTML element with the given attributes.
#[must_use]
pub fn new_element(tag: &str, attributes: &[(&str, &str)]) -> NodeRef {
  NodeRef::new_element(
    QualName::new(None, markup5ever::ns!(html), LocalName::from(tag)),
    attributes.iter().map(|(name, value)| {
      (ExpandedName::new("", *name), Attribute {
        prefix: None,
        value:  (*value).to_string(),
      })
    }),
  )
}

/// Create a detached text node.
#[must_use]
pub fn new_text(text: &str) -> NodeRef {
  NodeRef::new_text(text)
}

/// Build a detached `<svg>` node for `icon`, tagged with a `data-icon`
/// attribute so later passes can tell it was already inserted.
///
/// # Errors
///
/// Returns [`DomError::UnknownIcon`] when the registry lacks the icon and
/// [`DomError::MalformedDocument`] when its markup has no `<svg>` root.
pub fn icon_node(registry: &IconRegistry, icon: Icon) -> Result<NodeRef, DomError> {
  use tendril::TendrilSink;

  let markup = registry.icon(icon)?;
  let fragment = kuchikikiki::parse_html().one(markup);
  let svg = fragment.select_first("svg").map_err(|()| {
    DomError::MalformedDocument {
      reason: format!("icon `{icon}` has no <svg> root"),
    }
  })?;

  let node = svg.as_node().clone();
  node.detach();
  node.set_attr("data-icon", icon.name());
  Ok(node)
}

/// Collapse runs of whitespace into single spaces and trim the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Element-level conveniences on [`NodeRef`].
///
/// Every method is a no-op (or returns an empty value) on non-element nodes.
pub trait ElementExt {
  /// Local tag name, lowercase for HTML elements.
  fn tag_name(&self) -> Option<String>;
  fn is_tag(&self, tag: &str) -> bool;
  fn attr(&self, name: &str) -> Option<String>;
  fn set_attr(&self, name: &str, value: &str);
  fn remove_attr(&self, name: &str) -> Option<String>;
  fn class_tokens(&self) -> Vec<String>;
  fn has_class(&self, class: &str) -> bool;

  /// Add a class token, returning `false` if it was already present.
  fn add_class(&self, class: &str) -> bool;

  /// Remove a class token. Drops the `class` attribute once it is empty.
  fn remove_class(&self, class: &str) -> bool;
  fn element_children(&self) -> Vec<NodeRef>;
  fn first_element_child(&self) -> Option<NodeRef>;

  /// Insert `wrapper` where `self` is and move `self` inside it.
  fn wrap_in(&self, wrapper: NodeRef) -> NodeRef;

  /// Replace this element with a new one named `tag`, keeping attributes and
  /// children. Returns the replacement.
  fn rename(&self, tag: &str) -> Option<NodeRef>;

  /// Replace this element with its children.
  fn unwrap_element(&self);
  fn remove_children(&self);
  fn is_blank_text(&self) -> bool;
}

impl ElementExt for NodeRef {
  fn tag_name(&self) -> Option<String> {
    self.as_element().map(|element| element.name.local.to_string())
  }

  fn is_tag(&self, tag: &str) -> bool {
    self
      .as_element()
      .is_some_and(|element| (*element.name.local).eq_ignore_ascii_case(tag))
  }

  fn attr(&self, name: &str) -> Option<String> {
    self
      .as_element()
      .and_then(|element| element.attributes.borrow().get(name).map(ToString::to_string))
  }

  fn set_attr(&self, name: &str, value: &str) {
    if let Some(element) = self.as_element() {
      element
        .attributes
        .borrow_mut()
        .insert(name, value.to_string());
    }
  }

  fn remove_attr(&self, name: &str) -> Option<String> {
    self.as_element().and_then(|element| {
      element
        .attributes
        .borrow_mut()
        .remove(name)
        .map(|attribute| attribute.value)
    })
  }

  fn class_tokens(&self) -> Vec<String> {
    self
      .attr("class")
      .map(|class| class.split_whitespace().map(ToString::to_string).collect())
      .unwrap_or_default()
  }

  fn has_class(&self, class: &str) -> bool {
    self.class_tokens().iter().any(|token| token == class)
  }

  fn add_class(&self, class: &str) -> bool {
    if self.as_element().is_none() {
      return false;
    }
    let mut tokens = self.class_tokens();
    if tokens.iter().any(|token| token == class) {
      return false;
    }
    tokens.push(class.to_string());
    self.set_attr("class", &tokens.join(" "));
    true
  }

  fn remove_class(&self, class: &str) -> bool {
    let mut tokens = self.class_tokens();
    let before = tokens.len();
    tokens.retain(|token| token != class);
    if tokens.len() == before {
      return false;
    }
    if tokens.is_empty() {
      self.remove_attr("class");
    } else {
      self.set_attr("class", &tokens.join(" "));
    }
    true
  }

  fn element_children(&self) -> Vec<NodeRef> {
    self
      .children()
      .filter(|child| child.as_element().is_some())
      .collect()
  }

  fn first_element_child(&self) -> Option<NodeRef> {
    self.children().find(|child| child.as_element().is_some())
  }

  fn wrap_in(&self, wrapper: NodeRef) -> NodeRef {
    self.insert_before(wrapper.clone());
    wrapper.append(self.clone());
    wrapper
  }

  fn rename(&self, tag: &str) -> Option<NodeRef> {
    let element = self.as_element()?;
    let attributes: Vec<(ExpandedName, Attribute)> = element
      .attributes
      .borrow()
      .map
      .iter()
      .map(|(name, attribute)| (name.clone(), attribute.clone()))
      .collect();

    let renamed = NodeRef::new_element(
      QualName::new(None, element.name.ns.clone(), LocalName::from(tag)),
      attributes,
    );
    for child in self.children().collect::<Vec<_>>() {
      renamed.append(child);
    }
    self.insert_before(renamed.clone());
    self.detach();
    Some(renamed)
  }

  fn unwrap_element(&self) {
    for child in self.children().collect::<Vec<_>>() {
      self.insert_before(child);
    }
    self.detach();
  }

  fn remove_children(&self) {
    for child in self.children().collect::<Vec<_>>() {
      child.detach();
    }
  }

  fn is_blank_text(&self) -> bool {
    self
      .as_text()
      .is_some_and(|text| text.borrow().trim().is_empty())
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]
  use super::*;

  fn body_html(doc: &Document) -> String {
    let body = Selector::parse("body").unwrap();
    let node = doc.find_all(&body).remove(0);
    let mut out = Vec::new();
    for child in node.children() {
      child.serialize(&mut out).unwrap();
    }
    String::from_utf8(out).unwrap()
  }

  #[test]
  fn test_parse_recovers_unclosed_tags() {
    let doc = Document::parse("<p>one<p>two").unwrap();
    let p = Selector::parse("p").unwrap();
    assert_eq!(doc.find_all(&p).len(), 2);
  }

  #[test]
  fn test_parse_bytes_rejects_invalid_utf8() {
    let err = Document::parse_bytes(&[0x3c, 0x70, 0xff, 0xfe]).unwrap_err();
    assert!(matches!(err, DomError::MalformedDocument { .. }));
  }

  #[test]
  fn test_invalid_selector() {
    let err = Selector::parse("div[").unwrap_err();
    assert!(matches!(err, DomError::InvalidSelector(s) if s == "div["));
  }

  #[test]
  fn test_class_helpers() {
    let doc = Document::parse(r#"<div class="a  b"></div>"#).unwrap();
    let div = doc.find_all(&Selector::parse("div").unwrap()).remove(0);

    assert_eq!(div.class_tokens(), vec!["a", "b"]);
    assert!(!div.add_class("a"));
    assert!(div.add_class("c"));
    assert_eq!(div.attr("class").as_deref(), Some("a b c"));

    assert!(div.remove_class("a"));
    assert!(div.remove_class("b"));
    assert!(div.remove_class("c"));
    assert!(div.attr("class").is_none());
  }

  #[test]
  fn test_rename_keeps_attributes_and_children() {
    let doc =
      Document::parse(r#"<div id="x" class="section"><p>hi</p></div>"#).unwrap();
    let div = doc.find_all(&Selector::parse("div").unwrap()).remove(0);
    let section = div.rename("section").unwrap();

    assert!(section.is_tag("section"));
    assert_eq!(section.attr("id").as_deref(), Some("x"));
    assert_eq!(body_html(&doc), r#"<section id="x" class="section"><p>hi</p></section>"#);
  }

  #[test]
  fn test_is_tag_ignores_case() {
    let doc = Document::parse("<main><SECTION><p>x</p></SECTION></main>").unwrap();
    let section = doc.find_all(&Selector::parse("section").unwrap()).remove(0);
    assert!(section.is_tag("section"));
    assert!(section.is_tag("SECTION"));
    assert!(!section.is_tag("sect"));
    assert!(!new_text("section").is_tag("section"));
    assert_eq!(new_element("Div", &[]).tag_name().as_deref(), Some("Div"));
  }

  #[test]
  fn test_element_children_skip_text() {
    let doc = Document::parse("<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>").unwrap();
    let ul = doc.find_all(&Selector::parse("ul").unwrap()).remove(0);
    assert_eq!(ul.element_children().len(), 2);
    let first = ul.first_element_child().unwrap();
    assert_eq!(first.text_contents(), "a");
    assert!(first.first_element_child().is_none());
  }

  #[test]
  fn test_wrap_and_unwrap() {
    let doc = Document::parse("<p><b>x</b></p>").unwrap();
    let b = doc.find_all(&Selector::parse("b").unwrap()).remove(0);
    b.wrap_in(new_element("span", &[("class", "w")]));
    assert_eq!(body_html(&doc), r#"<p><span class="w"><b>x</b></span></p>"#);

    let span = doc.find_all(&Selector::parse("span.w").unwrap()).remove(0);
    span.unwrap_element();
    assert_eq!(body_html(&doc), "<p><b>x</b></p>");
  }

  #[test]
  fn test_icon_node_is_marked() {
    let registry = IconRegistry::builtin();
    let svg = icon_node(&registry, Icon::Copy).unwrap();
    assert!(svg.is_tag("svg"));
    assert_eq!(svg.attr("data-icon").as_deref(), Some("copy"));
    assert!(svg.parent().is_none());
  }

  #[test]
  fn test_icon_node_unknown_icon() {
    let registry = IconRegistry::with_icons([Icon::Copy]);
    let err = icon_node(&registry, Icon::Link).unwrap_err();
    assert!(matches!(err, DomError::UnknownIcon(_)));
  }

  #[test]
  fn test_collapse_whitespace() {
    assert_eq!(collapse_whitespace("  a \n  b\tc "), "a b c");
    assert_eq!(collapse_whitespace(" \n "), "");
  }
}
