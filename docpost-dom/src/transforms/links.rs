use docpost_icons::Icon;
use kuchikikiki::{NodeRef, iter::NodeIterator};
use log::debug;

use super::TransformContext;
use crate::{
  dom::{
    Document,
    ElementExt,
    Selector,
    collapse_whitespace,
    icon_node,
    new_element,
  },
  error::DomError,
};

const REL_TOKENS: [&str; 2] = ["nofollow", "noopener"];

/// Stimulus action the theme's clipboard controller listens for.
pub const COPY_LINK_ACTION: &str = "click->clipboard#copyHeaderLink";

/// Decorate `a.reference.external` links with the external-link icon and a
/// `rel` that includes `nofollow noopener`.
///
/// # Errors
///
/// Returns [`DomError::UnknownIcon`] if the external-link icon is missing.
pub fn external_links(
  document: &Document,
  ctx: &TransformContext<'_>,
) -> Result<(), DomError> {
  let links = Selector::parse("a.reference.external")?;
  let existing_icon = Selector::parse(r#"svg[data-icon="external-link"]"#)?;

  for link in document.find_all(&links) {
    if existing_icon.find_all(&link).is_empty() {
      link.append(icon_node(ctx.icons, Icon::ExternalLink)?);
    }

    let mut rel: Vec<String> = link
      .attr("rel")
      .map(|rel| rel.split_whitespace().map(ToString::to_string).collect())
      .unwrap_or_default();
    for token in REL_TOKENS {
      if !rel.iter().any(|existing| existing.eq_ignore_ascii_case(token)) {
        rel.push(token.to_string());
      }
    }
    link.set_attr("rel", &rel.join(" "));
  }
  Ok(())
}

/// Where a permalink sits, which decides how it is announced.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Anchor {
  Section(String),
  CodeBlock,
  Image,
  Table,
  Definition,
  Element,
}

impl Anchor {
  fn of(link: &NodeRef) -> Self {
    for ancestor in link.ancestors() {
      let Some(tag) = ancestor.tag_name() else {
        continue;
      };
      match tag.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
          return Self::Section(heading_title(&ancestor, link));
        },
        "figcaption" => return Self::Image,
        "caption" => return Self::Table,
        "dt" => return Self::Definition,
        "div" if ancestor.has_class("code-block-caption") => {
          return Self::CodeBlock;
        },
        "p" if ancestor.has_class("caption") => return Self::Image,
        "body" | "section" | "article" | "main" => break,
        _ => {},
      }
    }
    Self::Element
  }

  fn label(&self) -> String {
    match self {
      Self::Section(title) if title.is_empty() => {
        "Copy link to this section.".to_string()
      },
      Self::Section(title) => format!("Copy link to this section: {title}"),
      Self::CodeBlock => "Copy link to this code block.".to_string(),
      Self::Image => "Copy link to this image.".to_string(),
      Self::Table => "Copy link to this table.".to_string(),
      Self::Definition => "Copy link to this definition.".to_string(),
      Self::Element => "Copy link to this element.".to_string(),
    }
  }
}

/// Heading text without the permalink's own content.
fn heading_title(heading: &NodeRef, link: &NodeRef) -> String {
  let text: String = heading
    .descendants()
    .text_nodes()
    .filter(|text| !text.as_node().ancestors().any(|ancestor| &ancestor == link))
    .map(|text| text.borrow().clone())
    .collect();
  collapse_whitespace(&text)
}

/// Turn Sphinx's `¶` permalinks into accessible copy-link buttons.
///
/// The link loses its `title`, gains an `aria-label` describing what it
/// points at, button semantics, tooltip classes and the clipboard action.
/// Its content is replaced by the link icon.
///
/// # Errors
///
/// Returns [`DomError::UnknownIcon`] if the link icon is missing.
pub fn permalinks(
  document: &Document,
  ctx: &TransformContext<'_>,
) -> Result<(), DomError> {
  let selector = Selector::parse("a.headerlink")?;
  let mut rewritten = 0usize;

  for link in document.find_all(&selector) {
    let action = link.attr("data-action").unwrap_or_default();
    if action.contains("clipboard#copyHeaderLink") {
      continue;
    }

    let label = Anchor::of(&link).label();
    link.remove_attr("title");
    link.set_attr("aria-label", &label);
    link.set_attr("role", "button");
    link.add_class("tooltipped");
    link.add_class("tooltipped-ne");
    if action.trim().is_empty() {
      link.set_attr("data-action", COPY_LINK_ACTION);
    } else {
      link.set_attr("data-action", &format!("{} {COPY_LINK_ACTION}", action.trim()));
    }

    link.remove_children();
    link.append(icon_node(ctx.icons, Icon::Link)?);
    rewritten += 1;
  }

  debug!("Rewrote {rewritten} permalink(s)");
  Ok(())
}

/// Anything permalinked that should be reachable with the keyboard.
const FOCUSABLE_TITLES: &str = "main h1, main h2, main h3, main h4, main h5, \
                                main h6, .admonition-title, figcaption, \
                                p.caption, .code-block-caption, table caption";

/// Whether `node` is an `<a>` or holds one. Anchors cannot nest, so such
/// content is never wrapped.
fn contains_link(node: &NodeRef) -> bool {
  node.inclusive_descendants().any(|descendant| descendant.is_tag("a"))
}

/// Wrap the text of permalinked headings and captions in a link to the same
/// target, so they can take focus.
///
/// Captions wrap their `span.caption-text`. Everything else wraps the
/// content in front of the first `a.headerlink`. Content that already is, or
/// holds, a link is left alone.
///
/// # Errors
///
/// Only fails if a built-in selector does not compile.
pub fn heading_focus(
  document: &Document,
  _ctx: &TransformContext<'_>,
) -> Result<(), DomError> {
  let titles = Selector::parse(FOCUSABLE_TITLES)?;
  let headerlinks = Selector::parse("a.headerlink")?;
  let caption_text = Selector::parse("span.caption-text")?;
  let mut wrapped = 0usize;

  for title in document.find_all(&titles) {
    let Some(headerlink) = headerlinks.find_all(&title).into_iter().next() else {
      continue;
    };
    let (Some(href), Some(container)) = (headerlink.attr("href"), headerlink.parent())
    else {
      continue;
    };

    let content: Vec<NodeRef> =
      match caption_text.find_all(&title).into_iter().next() {
        Some(text) => vec![text],
        None => {
          container
            .children()
            .take_while(|child| child != &headerlink)
            .collect()
        },
      };
    if content.iter().all(ElementExt::is_blank_text)
      || content.iter().any(contains_link)
      || content
        .first()
        .and_then(|node| node.parent())
        .is_some_and(|parent| parent.is_tag("a"))
    {
      debug!("Heading already focusable or empty, skipping");
      continue;
    }

    let link = new_element("a", &[("href", href.as_str())]);
    if let Some(first) = content.first() {
      first.insert_before(link.clone());
    }
    for node in content {
      link.append(node);
    }
    wrapped += 1;
  }

  debug!("Made {wrapped} heading(s) focusable");
  Ok(())
}
