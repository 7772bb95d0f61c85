//! Drives the docpost transforms over a finished build.
//!
//! A build system implements [`BuildAdapter`] and fires
//! [`Pipeline::on_build_finished`] (directly or through [`BuildHooks`]) once
//! its HTML output is on disk. The pipeline works out which pages to touch,
//! rewrites each one atomically and reports per-file failures without
//! stopping.
pub mod adapter;
pub mod driver;
pub mod error;
pub mod files;

pub use adapter::{BuildAdapter, BuildError, BuildHooks, is_html_builder};
pub use driver::{Pipeline, RunOutcome, RunReport, process_file, process_html};
pub use error::PipelineError;
pub use files::FileSet;
