#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  reason = "Fine in benchmarks"
)]
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use docpost_dom::{
  Document,
  TransformContext,
  TransformOptions,
  transforms::{self, DomTransform},
};
use docpost_icons::IconRegistry;

const PAGE_SMALL: &str = r##"<!DOCTYPE html>
<html lang="en">
  <head><meta charset="utf-8"><title>Small</title></head>
  <body>
    <div class="section" id="intro">
      <h1>Intro<a class="headerlink" href="#intro" title="Link to this heading">¶</a></h1>
      <p>Some text with <code class="literal"><span class="pre">code</span></code>.</p>
    </div>
  </body>
</html>"##;

/// A page with a deep navigation tree and many blocks, built once.
fn large_page() -> String {
  let mut nav = String::from("<nav class=\"sidebar\"><ul>");
  let mut body = String::new();
  for i in 0..50 {
    nav.push_str(&format!(
      "<li class=\"toctree-l1\"><a class=\"reference internal\" \
       href=\"p{i}.html\">Page {i}</a><ul><li class=\"toctree-l2\"><a \
       href=\"p{i}.html#a\">A</a></li></ul></li>"
    ));
    body.push_str(&format!(
      "<div class=\"section\" id=\"s{i}\"><h2>Section {i}<a \
       class=\"headerlink\" href=\"#s{i}\">¶</a></h2><p>See <a \
       class=\"reference external\" href=\"https://example.com/{i}\">example</a> \
       and <code class=\"literal\"><span class=\"pre\">x</span> <span \
       class=\"pre\">=</span></code>.</p><!-- c{i} --><div \
       class=\"highlight-python notranslate\"><div \
       class=\"highlight\"><pre>print({i})</pre></div></div></div>"
    ));
  }
  nav.push_str("</ul></nav>");
  format!("<!DOCTYPE html><html><head><title>Large</title></head><body>{nav}<main>{body}</main></body></html>")
}

fn bench_postprocess(c: &mut Criterion) {
  let mut group = c.benchmark_group("postprocess");
  let icons = IconRegistry::builtin();
  let disabled = TransformOptions::none();
  let enabled = TransformOptions {
    external_link_icons: true,
    ..TransformOptions::default()
  };
  let large = large_page();

  for (size, page) in [("small", PAGE_SMALL), ("large", large.as_str())] {
    group.bench_with_input(BenchmarkId::new("disabled", size), &page, |b, html| {
      let ctx = TransformContext::new(&disabled, &icons);
      b.iter(|| transforms::postprocess(black_box(html), black_box(&ctx)).unwrap());
    });

    group.bench_with_input(BenchmarkId::new("enabled", size), &page, |b, html| {
      let ctx = TransformContext::new(&enabled, &icons);
      b.iter(|| transforms::postprocess(black_box(html), black_box(&ctx)).unwrap());
    });
  }

  group.finish();
}

fn bench_single_transforms(c: &mut Criterion) {
  let mut group = c.benchmark_group("transform");
  let icons = IconRegistry::builtin();
  let options = TransformOptions {
    external_link_icons: true,
    ..TransformOptions::default()
  };
  let ctx = TransformContext::new(&options, &icons);
  let large = large_page();

  for step in transforms::canonical() {
    group.bench_function(step.name(), |b| {
      b.iter(|| {
        let document = Document::parse(black_box(&large)).unwrap();
        transforms::apply_transforms([step], &document, &ctx).unwrap();
        document
      });
    });
  }

  group.finish();
}

criterion_group!(benches, bench_postprocess, bench_single_transforms);
criterion_main!(benches);
