//! Data model shared by the pipeline stages.
//!
//! Raw recognizer output goes in as [`RawText`]; the pipeline's only output is
//! a [`StatMap`] of label/value pairs.

mod raw_text;
mod stat_map;

pub use raw_text::*;
pub use stat_map::*;

/// An ordered sequence of text lines. Adjacency is meaningful (label rows are
/// followed by their value rows), so order is preserved between stages.
pub type LineSequence = Vec<String>;
