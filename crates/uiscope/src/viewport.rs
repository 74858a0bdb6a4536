/*!
Viewport mapping between the screenshot, its displayed size, and the pointer.

The screenshot is drawn aspect-fit inside a container. Its intrinsic size
comes from the decoded image; the container size comes from layout. Until
both are known and non-zero there is no layout, and every consumer treats
hit-testing and drawing as no-ops.
*/

use crate::types::{Point, Size};

/// Aspect-fit `natural` into `container`.
///
/// An image relatively wider than the container fits to the container width;
/// otherwise it fits to the container height. Returns `None` while either
/// size is unknown or zero.
pub fn compute_layout(natural: Size, container: Size) -> Option<Size> {
  if !natural.is_usable() || !container.is_usable() {
    return None;
  }

  let image_ratio = natural.width / natural.height;
  let container_ratio = container.width / container.height;

  let display = if image_ratio > container_ratio {
    Size::new(container.width, container.width / image_ratio)
  } else {
    Size::new(container.height * image_ratio, container.height)
  };
  Some(display)
}

/// Surface pixels → normalized coordinates. Not clamped: a pointer outside
/// the image maps outside `[0, 1]` and simply matches nothing.
///
/// Returns `None` for a zero or non-finite surface.
pub fn to_normalized(pointer: Point, surface: Size) -> Option<Point> {
  if !surface.is_usable() {
    return None;
  }
  Some(Point::new(pointer.x / surface.width, pointer.y / surface.height))
}

/// Screenshot and container sizes, and the derived display size.
///
/// Recomputed (never merged) on every image load and container resize.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportState {
  natural: Option<Size>,
  container: Option<Size>,
  display: Option<Size>,
}

impl ViewportState {
  /// Nothing loaded or measured yet.
  pub const fn new() -> Self {
    Self {
      natural: None,
      container: None,
      display: None,
    }
  }

  /// A new screenshot finished decoding. Returns `true` if the display size changed.
  pub fn image_loaded(&mut self, natural: Size) -> bool {
    self.natural = Some(natural);
    self.relayout()
  }

  /// The container was resized. Returns `true` if the display size changed.
  pub fn container_resized(&mut self, container: Size) -> bool {
    self.container = Some(container);
    self.relayout()
  }

  fn relayout(&mut self) -> bool {
    let display = match (self.natural, self.container) {
      (Some(natural), Some(container)) => compute_layout(natural, container),
      _ => None,
    };
    let changed = display != self.display;
    self.display = display;
    changed
  }

  /// Intrinsic screenshot size, once an image has loaded.
  pub const fn natural(&self) -> Option<Size> {
    self.natural
  }

  /// Last measured container size.
  pub const fn container(&self) -> Option<Size> {
    self.container
  }

  /// Rendered image size. `None` means "not laid out yet".
  pub const fn display(&self) -> Option<Size> {
    self.display
  }

  /// Whether pointer positions can be mapped.
  pub const fn is_ready(&self) -> bool {
    self.display.is_some()
  }

  /// Pointer on the display surface → normalized point.
  pub fn normalize(&self, pointer: Point) -> Option<Point> {
    to_normalized(pointer, self.display?)
  }

  /// Normalized point → display surface pixels.
  pub fn to_surface(&self, rel: Point) -> Option<Point> {
    let display = self.display?;
    Some(Point::new(rel.x * display.width, rel.y * display.height))
  }

  /// Normalized point → intrinsic screenshot pixels.
  pub fn to_image_pixels(&self, rel: Point) -> Option<Point> {
    let natural = self.natural.filter(Size::is_usable)?;
    Some(Point::new(rel.x * natural.width, rel.y * natural.height))
  }
}


#[cfg(test)]
mod proptests {
  use super::*;
  use proptest::prelude::*;

  fn dimension() -> impl Strategy<Value = f64> {
    1.0..5000.0f64
  }

  proptest! {
    /// The fitted image never exceeds the container and keeps its aspect ratio.
    #[test]
    fn fit_is_contained_and_proportional(
      nw in dimension(), nh in dimension(), cw in dimension(), ch in dimension()
    ) {
      let display = compute_layout(Size::new(nw, nh), Size::new(cw, ch)).unwrap();
      prop_assert!(display.width <= cw * (1.0 + 1e-9));
      prop_assert!(display.height <= ch * (1.0 + 1e-9));
      let ratio = (display.width / display.height) / (nw / nh);
      prop_assert!((ratio - 1.0).abs() < 1e-9, "aspect ratio drifted: {}", ratio);
    }

    /// Normalizing then scaling back recovers the pointer.
    #[test]
    fn normalize_then_scale(px in 0.0..4000.0f64, py in 0.0..4000.0f64, w in dimension(), h in dimension()) {
      let surface = Size::new(w, h);
      let rel = to_normalized(Point::new(px, py), surface).unwrap();
      prop_assert!((rel.x * w - px).abs() < 1e-6);
      prop_assert!((rel.y * h - py).abs() < 1e-6);
    }
  }
}
