/*!
Chat-assistant context payloads.

A trimmed description of the selected element and a one-line summary of the
hierarchy, small enough to embed in a prompt.
*/

use serde::Serialize;
use ts_rs::TS;

use crate::hierarchy::HierarchyTree;
use crate::locator;
use crate::types::{Node, Point, Properties, Rect, CLASS, CLICKABLE, CONTENT_DESC, RESOURCE_ID, TEXT};
use crate::viewport::ViewportState;

/// Properties that survive into [`ElementContext`], in output order.
pub const CONTEXT_PROPERTIES: [&str; 7] = [
  RESOURCE_ID,
  TEXT,
  CONTENT_DESC,
  CLASS,
  "package",
  CLICKABLE,
  "enabled",
];

/// The selected element, as sent to the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ElementContext {
  /// Node name (usually the class).
  pub name: String,
  #[ts(type = "Record<string, string>")]
  /// The identifying properties that are present.
  pub properties: Properties,
  /// Device-pixel rectangle, when the dump has one.
  pub rect: Option<Rect>,
  /// Best-effort locator.
  #[serde(rename = "generatedXPath")]
  pub generated_xpath: String,
  /// Center of the element in screenshot pixels.
  pub tap_point: Option<Point>,
}

impl ElementContext {
  /// Describe `node`, mapping its tap point through `viewport`.
  pub fn from_node(node: &Node, viewport: &ViewportState) -> Self {
    let properties = CONTEXT_PROPERTIES
      .iter()
      .filter_map(|&key| node.properties.get(key).map(|value| (key, value)))
      .collect();
    let tap_point = node
      .valid_bounds()
      .and_then(|bounds| viewport.to_image_pixels(bounds.center()));

    Self {
      name: node.name.clone(),
      properties,
      rect: node.rect,
      generated_xpath: locator::generate(node),
      tap_point,
    }
  }
}

/// Root name and direct child count; the full tree is too large for a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct HierarchyOverview {
  /// Root name, or its key when unnamed.
  pub root_name: String,
  /// Direct children of the root.
  pub child_count: usize,
  /// Every indexed node.
  pub node_count: usize,
}

impl HierarchyOverview {
  /// Summarize `tree`.
  pub fn of(tree: &HierarchyTree) -> Self {
    let root = tree.root();
    Self {
      root_name: root.name.clone(),
      child_count: root.children.len(),
      node_count: tree.node_count(),
    }
  }
}
