//! Per-torrent subtitle catalog records.
//!
//! A [`Pipeline`] classifies each linked file, resolves its track languages
//! and hands the result to the [`Synthesizer`], which decides which
//! individual attachments and archives a torrent exposes. Finished
//! [`CatalogRecord`](models::CatalogRecord)s go to a [`CatalogSink`](sink::CatalogSink).

pub mod error;
mod index;
pub mod models;
mod pipeline;
pub mod sink;
mod summary;
mod synth;
mod url;

pub use crate::index::LanguageIndex;
pub use crate::pipeline::Pipeline;
pub use crate::summary::BuildSummary;
pub use crate::synth::{COMPLETE_PACK_LABEL, PackPolicy, Synthesizer};
pub use crate::url::{DEFAULT_BASE_URL, Urls, slug};
