#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  clippy::panic,
  reason = "Fine in tests"
)]
use docpost_dom::{
  Document,
  ElementExt,
  Feature,
  Selector,
  TransformContext,
  TransformOptions,
  transforms,
};
use docpost_icons::IconRegistry;

/// A trimmed down page as Sphinx writes it.
const PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Guide</title><!-- generated --></head>
<body>
<nav class="sidebar">
  <ul>
    <li class="toctree-l1 current"><a class="reference internal current" href="#">Guide</a>
      <ul>
        <li class="toctree-l2"><a class="reference internal" href="#install">Install</a></li>
      </ul>
    </li>
    <li class="toctree-l1"><a class="reference internal" href="api.html">API</a></li>
  </ul>
</nav>
<main>
<div class="section" id="guide">
<h1>Guide<a class="headerlink" href="#guide" title="Link to this heading">¶</a></h1>
<p>See <a class="reference external" href="https://example.com">Example</a> and
<a class="reference internal" href="api.html">the API</a>.</p>
<div class="toctree-wrapper compound">
</div>
<div class="figure align-default" id="fig">
<img alt="diagram" src="diagram.png">
<p class="caption"><span class="caption-text">Diagram</span><a class="headerlink" href="#fig" title="Link to this image">¶</a></p>
</div>
<div class="highlight-rust notranslate"><div class="highlight"><pre><span></span>fn main() {}</pre></div></div>
<p>Call <code class="docutils literal notranslate"><span class="pre">main()</span></code>.</p>
<pre class="literal-block">cargo run</pre>
</div>
</main>
</body>
</html>
"##;

fn assert_html_contains(html: &str, expected: &[&str]) {
  for &needle in expected {
    assert!(
      html.contains(needle),
      "Expected HTML to contain '{needle}', but it did not.\nFull \
       HTML:\n{html}"
    );
  }
}

fn count(html: &str, selector: &'static str) -> usize {
  let doc = Document::parse(html).unwrap();
  doc.find_all(&Selector::parse(selector).unwrap()).len()
}

fn process(options: &TransformOptions) -> String {
  let icons = IconRegistry::builtin();
  let ctx = TransformContext::new(options, &icons);
  transforms::postprocess(PAGE, &ctx).expect("page should process")
}

#[test]
fn test_full_page_with_defaults() {
  let html = process(&TransformOptions::default());

  assert_eq!(count(&html, "div.section"), 0);
  assert_eq!(count(&html, "section#guide > h1"), 1);
  assert_eq!(count(&html, "figure#fig > figcaption"), 1);
  assert_eq!(count(&html, "div.toctree-wrapper"), 0);
  assert_eq!(count(&html, "li.current.expanded.has-children > button.expand"), 1);
  assert_eq!(count(&html, "div.code-header > span.code-lang"), 1);
  assert_eq!(count(&html, "code span.pre"), 0);
  assert_eq!(count(&html, "div.code-wrapper > div.code-header + pre.literal-block"), 1);
  assert_eq!(count(&html, r##"main h1 > a[href="#guide"]:not(.headerlink)"##), 1);
  assert_eq!(count(&html, r##"figcaption > a[href="#fig"] > span.caption-text"##), 1);
  assert!(!html.contains("<!--"));
  assert!(!html.contains('¶'));

  // External link icons are opt-in.
  assert_eq!(count(&html, "a.external svg"), 0);

  assert_html_contains(&html, &[
    r#"aria-label="Copy link to this section: Guide""#,
    r#"aria-label="Copy link to this image.""#,
    r#"<span class="code-lang">rust</span>"#,
    "<code>main()</code>",
  ]);
}

#[test]
fn test_external_link_icons_when_enabled() {
  let options = TransformOptions {
    external_link_icons: true,
    ..TransformOptions::default()
  };
  let html = process(&options);

  assert_eq!(count(&html, r#"a.external > svg[data-icon="external-link"]"#), 1);
  assert_eq!(count(&html, "a.internal svg[data-icon]"), 0);
  assert_html_contains(&html, &[r#"rel="nofollow noopener""#]);
}

#[test]
fn test_each_flag_gates_its_transform() {
  // Disabling a feature should leave behind markup only its transform
  // touches: (feature, selector, matches expected when disabled).
  let cases: [(Feature, &'static str, bool); 11] = [
    (Feature::SemanticMarkup, "div.section", true),
    (Feature::CollapsibleNavigation, "li.has-children", false),
    (Feature::ExpandCurrent, "li.current:not(.expanded)", true),
    (Feature::ExternalLinkIcons, "a.external:not([rel])", true),
    (Feature::RemoveEmptyToctrees, "div.toctree-wrapper", true),
    (Feature::PermalinkEnhancement, "a.headerlink[title]", true),
    (Feature::HeadingFocus, "h1 > a:not(.headerlink)", false),
    (Feature::CodeHeaders, "span.code-lang", false),
    (Feature::CodeHeaders, "div.code-wrapper > pre.literal-block", false),
    (Feature::UnwrapPreSpans, "code span.pre", true),
    (Feature::StripComments, "head > title", true),
  ];

  for (feature, selector, present) in cases {
    let mut options = TransformOptions {
      external_link_icons: true,
      ..TransformOptions::default()
    };
    options.set(feature, false);
    let html = process(&options);

    assert_eq!(count(&html, selector) > 0, present, "{feature:?} still ran");
    if feature == Feature::StripComments {
      assert!(html.contains("<!-- generated -->"));
    } else {
      assert!(!html.contains("<!--"));
    }
  }
}

#[test]
fn test_nothing_enabled_changes_nothing_structural() {
  let html = process(&TransformOptions::none());
  let reparsed = Document::parse(PAGE).unwrap().serialize().unwrap();
  assert_eq!(html, reparsed);
}

#[test]
fn test_selector_precision() {
  let options = TransformOptions {
    external_link_icons: true,
    ..TransformOptions::default()
  };
  let icons = IconRegistry::builtin();
  let ctx = TransformContext::new(&options, &icons);
  let html = transforms::postprocess(
    r#"<div class="sections"><a class="external" href="https://x.org">x</a><a class="reference" href="y.html">y</a><div class="highlight"><pre>z</pre></div><span class="pre">p</span><ul><li class="current"><a href="a.html">a</a><ul><li>b</li></ul></li></ul></div>"#,
    &ctx,
  )
  .unwrap();

  assert_eq!(count(&html, "section"), 0);
  assert_eq!(count(&html, "svg"), 0);
  assert_eq!(count(&html, "[rel]"), 0);
  assert_eq!(count(&html, "span.code-lang"), 0);
  assert_eq!(count(&html, "span.pre"), 1);
  assert_eq!(count(&html, "button.expand"), 0);
  // `li.current` is matched anywhere, not only inside <nav>.
  assert_eq!(count(&html, "li.current.expanded"), 1);
}

#[test]
fn test_current_class_is_not_duplicated() {
  let icons = IconRegistry::builtin();
  let options = TransformOptions::default();
  let ctx = TransformContext::new(&options, &icons);

  let doc = Document::parse(PAGE).unwrap();
  transforms::apply_all(&doc, &ctx).unwrap();
  transforms::apply_all(&doc, &ctx).unwrap();

  for item in doc.find_all(&Selector::parse("li.current").unwrap()) {
    let tokens = item.class_tokens();
    for token in ["current", "expanded", "has-children"] {
      assert_eq!(
        tokens.iter().filter(|t| *t == token).count(),
        1,
        "duplicate {token} in {tokens:?}"
      );
    }
  }
}
