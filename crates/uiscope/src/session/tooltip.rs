//! Tooltip placement next to the pointer.

use crate::types::{Point, Size};

/// Gap between the pointer and the tooltip, in pixels.
pub const TOOLTIP_OFFSET: f64 = 12.0;

/// Top-left corner for a tooltip of `size` near `pointer`.
///
/// Below-right of the pointer by default. Flipped to the left when it would
/// overflow the container's right edge, and above when it would overflow the
/// bottom edge. Coordinates share the surface's origin.
pub fn place(pointer: Point, size: Size, container: Size) -> Point {
  let mut x = pointer.x + TOOLTIP_OFFSET;
  let mut y = pointer.y + TOOLTIP_OFFSET;
  if x + size.width > container.width {
    x = pointer.x - TOOLTIP_OFFSET - size.width;
  }
  if y + size.height > container.height {
    y = pointer.y - TOOLTIP_OFFSET - size.height;
  }
  Point::new(x.max(0.0), y.max(0.0))
}

#[cfg(test)]
mod tests {
  use super::*;

  const CONTAINER: Size = Size::new(400.0, 400.0);
  const TIP: Size = Size::new(100.0, 24.0);

  #[test]
  fn below_right_by_default() {
    assert_eq!(place(Point::new(50.0, 50.0), TIP, CONTAINER), Point::new(62.0, 62.0));
  }

  #[test]
  fn flips_left_at_right_edge() {
    assert_eq!(place(Point::new(350.0, 50.0), TIP, CONTAINER), Point::new(238.0, 62.0));
  }

  #[test]
  fn flips_up_at_bottom_edge() {
    assert_eq!(place(Point::new(50.0, 390.0), TIP, CONTAINER), Point::new(62.0, 354.0));
  }

  #[test]
  fn never_negative() {
    let tiny = Size::new(50.0, 20.0);
    let placed = place(Point::new(10.0, 10.0), TIP, tiny);
    assert!(placed.x >= 0.0 && placed.y >= 0.0);
  }
}
