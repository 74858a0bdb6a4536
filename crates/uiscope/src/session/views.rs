/*!
Views the session fans selection changes out to.

Views only ever receive data. None of them gets a handle back to the
session, so a view update can't re-enter it.
*/

use serde::Serialize;
use ts_rs::TS;

use crate::locator;
use crate::types::{Bounds, Node, NodeKey, Point, Properties, Rect, Size};

/// Tree-view highlight state after a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct TreeHighlight {
  /// Selected row.
  pub selected: Option<NodeKey>,
  /// Row under the pointer.
  pub hovered: Option<NodeKey>,
  /// Ancestors of the selection, root first, to expand.
  pub expand: Vec<NodeKey>,
}

/// What the properties panel and locator field display.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct NodeDetails {
  /// Node key.
  pub key: NodeKey,
  /// Node name.
  pub name: String,
  /// All properties, in document order.
  #[ts(type = "Record<string, string>")]
  pub properties: Properties,
  /// Normalized bounds.
  pub bounds: Option<Bounds>,
  /// Device-pixel rectangle.
  pub rect: Option<Rect>,
  /// Generated locator.
  pub locator: String,
}

impl NodeDetails {
  /// Everything the panel shows for `node`.
  pub fn of(node: &Node) -> Self {
    Self {
      key: node.key.clone(),
      name: node.name.clone(),
      properties: node.properties.clone(),
      bounds: node.bounds,
      rect: node.rect,
      locator: locator::generate(node),
    }
  }
}

/// A short label for the node under the pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct TooltipContent {
  /// Node the tooltip describes.
  pub key: NodeKey,
  /// Display text.
  pub label: String,
}

impl TooltipContent {
  /// Simple class name, plus the first of text / content-desc / resource-id.
  pub fn of(node: &Node) -> Self {
    let class = node.class_name().unwrap_or("?");
    let simple = class.rsplit('.').next().unwrap_or(class);
    let label = match node
      .text()
      .or_else(|| node.content_desc())
      .or_else(|| node.resource_id())
    {
      Some(detail) => format!("{simple} \u{201c}{detail}\u{201d}"),
      None => simple.to_owned(),
    };
    Self {
      key: node.key.clone(),
      label,
    }
  }
}

/// Where a tooltip goes, in surface pixels.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct TooltipPlacement {
  /// What to show.
  pub content: TooltipContent,
  /// Top-left corner.
  pub position: Point,
}

/// Hierarchy tree panel.
pub trait TreeView: Send {
  /// Mark rows and expand ancestors.
  fn highlight(&mut self, highlight: &TreeHighlight);
}

/// Properties panel plus the locator field.
pub trait PropertiesPanel: Send {
  /// `None` empties the panel.
  fn show(&mut self, details: Option<&NodeDetails>);
}

/// Pointer tooltip.
pub trait Tooltip: Send {
  /// Rendered size of `content`, used to keep the tooltip inside the
  /// container. The default assumes a single line of ~7px glyphs.
  fn measure(&self, content: &TooltipContent) -> Size {
    #[allow(clippy::cast_precision_loss)]
    let chars = content.label.chars().count() as f64;
    Size::new(chars.mul_add(7.0, 16.0), 24.0)
  }

  /// Show or move the tooltip.
  fn show(&mut self, placement: &TooltipPlacement);

  /// Hide the tooltip.
  fn hide(&mut self);
}

/// A view that ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullView;

impl TreeView for NullView {
  fn highlight(&mut self, _highlight: &TreeHighlight) {}
}

impl PropertiesPanel for NullView {
  fn show(&mut self, _details: Option<&NodeDetails>) {}
}

impl Tooltip for NullView {
  fn show(&mut self, _placement: &TooltipPlacement) {}

  fn hide(&mut self) {}
}
