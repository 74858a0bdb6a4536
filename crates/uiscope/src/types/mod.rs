/*! Core types for uiscope.

Regenerate TypeScript types: `cargo test -p uiscope export_bindings`
*/

#![allow(missing_docs)]

mod error;
mod event;
mod geometry;
mod node;
mod selection;

pub use error::{ScopeError, ScopeResult};
pub use event::Event;
pub use geometry::{Bounds, PixelRect, Point, Rect, Size};
pub use node::{
  Descendants, Node, NodeKey, Properties, CLASS, CLICKABLE, CONTENT_DESC, RESOURCE_ID, TEXT,
};
pub use selection::SelectionState;

#[cfg(test)]
pub(crate) use node::test_support;
