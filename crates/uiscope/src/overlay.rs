/*!
Overlay rendering.

Every redraw is a pure function of `(tree, viewport, selection)`: the surface
is cleared, then each node with usable bounds is stroked exactly once, in
pre-order, with the style its selection state calls for.

Drawing goes through the [`Surface`] trait. [`DisplayList`] records the
strokes instead of rasterizing them; the WebSocket frontend replays it onto
a canvas.
*/

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::hierarchy::HierarchyTree;
use crate::types::{NodeKey, PixelRect, SelectionState, Size};
use crate::viewport::ViewportState;

/// Which of the three box styles a node gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum StrokeStyle {
  /// Neither hovered nor selected.
  Default,
  /// Under the pointer.
  Hovered,
  /// Selected; wins over hovered.
  Selected,
}

impl StrokeStyle {
  /// Style for `key`. Selected beats hovered.
  pub fn for_key(key: &NodeKey, selection: &SelectionState) -> Self {
    if selection.selected.as_ref() == Some(key) {
      Self::Selected
    } else if selection.hovered.as_ref() == Some(key) {
      Self::Hovered
    } else {
      Self::Default
    }
  }
}

/// Colour (any CSS colour string) and line width in surface pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Stroke {
  /// CSS colour.
  pub color: String,
  /// Line width in surface pixels.
  pub width: f64,
}

impl Stroke {
  /// Stroke of `color` and `width`.
  pub fn new(color: impl Into<String>, width: f64) -> Self {
    Self {
      color: color.into(),
      width,
    }
  }
}

/// One [`Stroke`] per [`StrokeStyle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct OverlayTheme {
  /// Nodes that are neither hovered nor selected.
  pub default: Stroke,
  /// The node under the pointer.
  pub hovered: Stroke,
  /// The selected node.
  pub selected: Stroke,
}

impl Default for OverlayTheme {
  fn default() -> Self {
    Self {
      default: Stroke::new("rgba(0, 150, 255, 0.55)", 1.0),
      hovered: Stroke::new("#ff9800", 2.0),
      selected: Stroke::new("#e53935", 3.0),
    }
  }
}

impl OverlayTheme {
  /// The stroke for `style`.
  pub const fn stroke(&self, style: StrokeStyle) -> &Stroke {
    match style {
      StrokeStyle::Default => &self.default,
      StrokeStyle::Hovered => &self.hovered,
      StrokeStyle::Selected => &self.selected,
    }
  }
}

/// A drawing target sized to the displayed screenshot.
pub trait Surface: Send {
  /// Erase everything and resize to `size`.
  fn clear(&mut self, size: Size);

  /// Outline `key`'s rectangle.
  fn stroke_rect(&mut self, key: &NodeKey, rect: PixelRect, style: StrokeStyle);

  /// The frame is complete.
  fn present(&mut self) {}
}

/// A recorded stroke.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct DrawCommand {
  /// Node the stroke outlines.
  pub key: NodeKey,
  /// Rectangle in surface pixels.
  pub rect: PixelRect,
  /// Which theme entry applied.
  pub style: StrokeStyle,
  /// Resolved colour.
  pub color: String,
  /// Resolved line width.
  pub line_width: f64,
}

/// A finished frame: the surface size and its strokes in paint order.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct OverlayFrame {
  /// Surface size.
  pub size: Size,
  /// Strokes in paint order.
  pub commands: Vec<DrawCommand>,
}

/// [`Surface`] that records strokes, resolving colours from an [`OverlayTheme`].
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
  theme: OverlayTheme,
  size: Option<Size>,
  commands: Vec<DrawCommand>,
  frames: usize,
}

impl DisplayList {
  /// Empty list that paints with `theme`.
  pub const fn with_theme(theme: OverlayTheme) -> Self {
    Self {
      theme,
      size: None,
      commands: Vec::new(),
      frames: 0,
    }
  }

  /// Current theme.
  pub const fn theme(&self) -> &OverlayTheme {
    &self.theme
  }

  /// Colours for the next frame.
  pub fn set_theme(&mut self, theme: OverlayTheme) {
    self.theme = theme;
  }

  /// Strokes recorded since the last clear.
  pub fn commands(&self) -> &[DrawCommand] {
    &self.commands
  }

  /// Number of presented frames.
  pub const fn frames(&self) -> usize {
    self.frames
  }

  /// The current frame, or `None` before the first clear.
  pub fn frame(&self) -> Option<OverlayFrame> {
    Some(OverlayFrame {
      size: self.size?,
      commands: self.commands.clone(),
    })
  }
}

impl Surface for DisplayList {
  fn clear(&mut self, size: Size) {
    self.size = Some(size);
    self.commands.clear();
  }

  fn stroke_rect(&mut self, key: &NodeKey, rect: PixelRect, style: StrokeStyle) {
    let stroke = self.theme.stroke(style);
    self.commands.push(DrawCommand {
      key: key.clone(),
      rect,
      style,
      color: stroke.color.clone(),
      line_width: stroke.width,
    });
  }

  fn present(&mut self) {
    self.frames += 1;
  }
}

/// Repaint the overlay. Returns the number of boxes drawn.
///
/// Does nothing (the surface is left untouched) while the viewport has no
/// layout. With no tree, the surface is cleared and left empty.
pub fn redraw<S: Surface + ?Sized>(
  surface: &mut S,
  tree: Option<&HierarchyTree>,
  viewport: &ViewportState,
  selection: &SelectionState,
) -> usize {
  let Some(display) = viewport.display() else {
    log::trace!("redraw skipped: viewport not laid out");
    return 0;
  };

  surface.clear(display);
  let mut drawn = 0;
  if let Some(tree) = tree {
    for node in tree.iter() {
      let Some(bounds) = node.valid_bounds() else {
        continue;
      };
      let rect = bounds.to_pixels(display);
      if !rect.has_positive_area() {
        continue;
      }
      surface.stroke_rect(&node.key, rect, StrokeStyle::for_key(&node.key, selection));
      drawn += 1;
    }
  }
  surface.present();
  drawn
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::test_support::{leaf, with_children};

  fn tree() -> HierarchyTree {
    HierarchyTree::from_root(with_children(
      leaf("root", [0.0, 0.0, 1.0, 1.0], &[]),
      vec![
        with_children(
          leaf("a", [0.1, 0.1, 0.5, 0.5], &[]),
          vec![leaf("b", [0.2, 0.2, 0.3, 0.3], &[])],
        ),
        leaf("broken", [0.6, 0.6, 0.4, 0.9], &[]),
        leaf("line", [0.0, 0.7, 1.0, 0.7], &[]),
      ],
    ))
  }

  fn viewport() -> ViewportState {
    let mut viewport = ViewportState::new();
    viewport.image_loaded(Size::new(1080.0, 1920.0));
    viewport.container_resized(Size::new(400.0, 400.0));
    viewport
  }

  fn styles(list: &DisplayList) -> Vec<(&str, StrokeStyle)> {
    list
      .commands()
      .iter()
      .map(|c| (c.key.as_str(), c.style))
      .collect()
  }

  #[test]
  fn draws_valid_boxes_in_pre_order() {
    let mut list = DisplayList::default();
    let drawn = redraw(&mut list, Some(&tree()), &viewport(), &SelectionState::default());
    assert_eq!(drawn, 3);
    assert_eq!(
      styles(&list),
      vec![
        ("root", StrokeStyle::Default),
        ("a", StrokeStyle::Default),
        ("b", StrokeStyle::Default),
      ]
    );
  }

  #[test]
  fn scales_to_display_size() {
    let mut list = DisplayList::default();
    redraw(&mut list, Some(&tree()), &viewport(), &SelectionState::default());
    let frame = list.frame().unwrap();
    assert_eq!(frame.size, Size::new(225.0, 400.0));
    let a = &frame.commands[1];
    assert!((a.rect.x - 22.5).abs() < 1e-9);
    assert!((a.rect.y - 40.0).abs() < 1e-9);
    assert!((a.rect.width - 90.0).abs() < 1e-9);
    assert!((a.rect.height - 160.0).abs() < 1e-9);
  }

  #[test]
  fn selected_takes_precedence_over_hovered() {
    let selection = SelectionState {
      selected: Some(NodeKey::from("b")),
      hovered: Some(NodeKey::from("b")),
    };
    let mut list = DisplayList::default();
    redraw(&mut list, Some(&tree()), &viewport(), &selection);
    let b_strokes: Vec<_> = styles(&list).into_iter().filter(|(k, _)| *k == "b").collect();
    assert_eq!(b_strokes, vec![("b", StrokeStyle::Selected)]);
  }

  #[test]
  fn hovered_and_selected_on_different_nodes() {
    let selection = SelectionState {
      selected: Some(NodeKey::from("a")),
      hovered: Some(NodeKey::from("b")),
    };
    let mut list = DisplayList::default();
    redraw(&mut list, Some(&tree()), &viewport(), &selection);
    assert_eq!(
      styles(&list),
      vec![
        ("root", StrokeStyle::Default),
        ("a", StrokeStyle::Selected),
        ("b", StrokeStyle::Hovered),
      ]
    );
    assert_eq!(list.commands()[1].color, OverlayTheme::default().selected.color);
  }

  #[test]
  fn not_laid_out_is_a_no_op() {
    let mut list = DisplayList::default();
    let mut viewport = ViewportState::new();
    viewport.image_loaded(Size::new(1080.0, 1920.0));
    assert_eq!(redraw(&mut list, Some(&tree()), &viewport, &SelectionState::default()), 0);
    assert!(list.frame().is_none());
    assert_eq!(list.frames(), 0);
  }

  #[test]
  fn no_tree_clears() {
    let mut list = DisplayList::default();
    redraw(&mut list, Some(&tree()), &viewport(), &SelectionState::default());
    redraw(&mut list, None, &viewport(), &SelectionState::default());
    assert!(list.commands().is_empty());
    assert_eq!(list.frames(), 2);
  }

  #[test]
  fn theme_resolves_strokes() {
    let theme = OverlayTheme {
      hovered: Stroke::new("lime", 4.0),
      ..OverlayTheme::default()
    };
    let selection = SelectionState {
      selected: None,
      hovered: Some(NodeKey::from("root")),
    };
    let mut list = DisplayList::with_theme(theme);
    redraw(&mut list, Some(&tree()), &viewport(), &selection);
    assert_eq!(list.commands()[0].color, "lime");
    assert_eq!(list.commands()[0].line_width, 4.0);
  }
}
