/*! Events emitted when session state changes. */

use super::{NodeKey, Size};
use serde::Serialize;
use ts_rs::TS;

/// Events emitted when session state changes.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(tag = "event", content = "data")]
#[ts(export)]
pub enum Event {
  // Hierarchy lifecycle
  #[serde(rename = "hierarchy:loaded")]
  HierarchyLoaded { root: NodeKey, node_count: usize },
  #[serde(rename = "hierarchy:unavailable")]
  HierarchyUnavailable { reason: String },
  #[serde(rename = "hierarchy:cleared")]
  HierarchyCleared,

  // Layout
  #[serde(rename = "viewport:changed")]
  ViewportChanged { display: Option<Size> },

  // Selection (one per effective transition)
  #[serde(rename = "selection:hovered")]
  Hovered { key: Option<NodeKey> },
  #[serde(rename = "selection:selected")]
  Selected {
    key: Option<NodeKey>,
    locator: Option<String>,
  },
}
