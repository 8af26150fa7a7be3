//! Filename classification for subtitle-bearing release files.
//!
//! Two pure, independent operations:
//!
//! - [`classify`] turns a release filename into an episode [`Classification`]
//!   (single episode, range, special or nothing at all), and
//! - [`Lexicon::resolve`] turns an undetermined subtitle language tag into a
//!   concrete language using the torrent title and filename as context.
//!
//! Neither touches I/O or shared mutable state, so both are safe to call from
//! any number of worker threads.

mod consts;
mod episode;
pub mod error;
pub mod language;

pub use crate::episode::{Classification, classify};
pub use crate::language::Lexicon;
