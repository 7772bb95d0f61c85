//! HTML tree transforms for generated documentation pages.
//!
//! A page is parsed into a [`Document`], rewritten in place by the
//! [`transforms`] enabled in [`TransformOptions`], and serialized again.
//! Every transform is idempotent, so pages can be processed any number of
//! times without accumulating markup.
//!
//! ```no_run
//! use docpost_dom::{TransformContext, TransformOptions, transforms};
//! use docpost_icons::IconRegistry;
//!
//! let options = TransformOptions::default();
//! let icons = IconRegistry::builtin();
//! let ctx = TransformContext::new(&options, &icons);
//!
//! let html = transforms::postprocess("<div class=\"section\"></div>", &ctx)?;
//! assert!(html.contains("<section>"));
//! # Ok::<(), docpost_dom::DomError>(())
//! ```
pub mod dom;
pub mod error;
pub mod options;
pub mod transforms;

pub use crate::{
  dom::{Document, ElementExt, Selector},
  error::DomError,
  options::{Feature, TransformOptions},
  transforms::{DomTransform, TransformContext},
};
