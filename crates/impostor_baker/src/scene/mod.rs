//! Source scene description
//!
//! The baker reads objects as a tree of [`SourceNode`]s. This is the read-only
//! input side of a bake: the pipeline never mutates a source tree, it builds a
//! separate render proxy from it.

pub mod bounds;
pub mod source;

pub use bounds::Bounds;
pub use source::{Drawable, SourceNode};
