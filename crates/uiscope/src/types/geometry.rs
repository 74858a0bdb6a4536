/*!
Geometry types for the three coordinate spaces the inspector juggles.

- Normalized space: `[0, 1]` relative to the full screenshot (`Bounds`, `Point`).
- Surface space: pixels of the displayed image (`PixelRect`, pointer `Point`s).
- Device space: absolute device pixels reported by the backend (`Rect`).
*/

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Normalized rectangle `[x1, y1, x2, y2]` relative to the full screenshot.
///
/// Inverted or non-finite bounds are representable on purpose: the backend
/// occasionally reports them, and they are excluded from hit-testing and
/// drawing rather than rejected at parse time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct Bounds {
  pub x1: f64,
  pub y1: f64,
  pub x2: f64,
  pub y2: f64,
}

impl Bounds {
  /// The whole screenshot.
  pub const FULL_SCREEN: Self = Self::new(0.0, 0.0, 1.0, 1.0);

  pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
    Self { x1, y1, x2, y2 }
  }

  /// Build from a `[x1, y1, x2, y2]` slice. Any other arity yields `None`.
  pub fn from_slice(values: &[f64]) -> Option<Self> {
    match *values {
      [x1, y1, x2, y2] => Some(Self::new(x1, y1, x2, y2)),
      _ => None,
    }
  }

  pub fn width(&self) -> f64 {
    self.x2 - self.x1
  }

  pub fn height(&self) -> f64 {
    self.y2 - self.y1
  }

  pub fn area(&self) -> f64 {
    self.width() * self.height()
  }

  /// All four values finite, and strictly positive width and height.
  pub fn is_well_formed(&self) -> bool {
    [self.x1, self.y1, self.x2, self.y2]
      .iter()
      .all(|v| v.is_finite())
      && self.width() > 0.0
      && self.height() > 0.0
  }

  /// Inclusive containment on all four edges.
  pub fn contains(&self, point: Point) -> bool {
    point.x >= self.x1 && point.x <= self.x2 && point.y >= self.y1 && point.y <= self.y2
  }

  /// Scale to a pixel rectangle on a surface of the given size.
  pub fn to_pixels(&self, surface: Size) -> PixelRect {
    PixelRect {
      x: self.x1 * surface.width,
      y: self.y1 * surface.height,
      width: self.width() * surface.width,
      height: self.height() * surface.height,
    }
  }

  /// Center point, in the same normalized space.
  pub fn center(&self) -> Point {
    Point::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
  }
}

/// A 2D point. Normalized or surface pixels depending on context.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub const fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct Size {
  pub width: f64,
  pub height: f64,
}

impl Size {
  pub const fn new(width: f64, height: f64) -> Self {
    Self { width, height }
  }

  /// Both dimensions finite and non-zero. Anything else means "not laid out yet".
  pub fn is_usable(&self) -> bool {
    self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
  }
}

/// Pixel rectangle on the rendering surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, TS)]
#[ts(export)]
pub struct PixelRect {
  pub x: f64,
  pub y: f64,
  pub width: f64,
  pub height: f64,
}

impl PixelRect {
  pub fn has_positive_area(&self) -> bool {
    self.width > 0.0 && self.height > 0.0 && (self.width * self.height).is_finite()
  }
}

/// Absolute device-pixel rectangle, as reported by the automation backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export)]
pub struct Rect {
  pub x: i32,
  pub y: i32,
  pub width: i32,
  pub height: i32,
}

#[cfg(test)]
mod tests {
  use super::*;

  mod bounds_well_formed {
    use super::*;

    #[test]
    fn regular_box() {
      assert!(Bounds::new(0.1, 0.1, 0.5, 0.5).is_well_formed());
    }

    #[test]
    fn zero_width_is_rejected() {
      assert!(!Bounds::new(0.3, 0.1, 0.3, 0.5).is_well_formed());
    }

    #[test]
    fn inverted_is_rejected() {
      assert!(
        !Bounds::new(0.5, 0.5, 0.1, 0.1).is_well_formed(),
        "x1 > x2 should not be hit-testable"
      );
    }

    #[test]
    fn nan_is_rejected() {
      assert!(!Bounds::new(f64::NAN, 0.0, 1.0, 1.0).is_well_formed());
      assert!(!Bounds::new(0.0, 0.0, f64::INFINITY, 1.0).is_well_formed());
    }
  }

  mod bounds_from_slice {
    use super::*;

    #[test]
    fn four_values() {
      assert_eq!(
        Bounds::from_slice(&[0.0, 0.1, 0.2, 0.3]),
        Some(Bounds::new(0.0, 0.1, 0.2, 0.3))
      );
    }

    #[test]
    fn wrong_arity() {
      assert_eq!(Bounds::from_slice(&[0.0, 0.1, 0.2]), None);
      assert_eq!(Bounds::from_slice(&[0.0, 0.1, 0.2, 0.3, 0.4]), None);
      assert_eq!(Bounds::from_slice(&[]), None);
    }
  }

  mod bounds_contains {
    use super::*;

    #[test]
    fn edges_are_inclusive() {
      let b = Bounds::new(0.1, 0.2, 0.5, 0.6);
      assert!(b.contains(Point::new(0.1, 0.2)), "top-left corner");
      assert!(b.contains(Point::new(0.5, 0.6)), "bottom-right corner");
      assert!(!b.contains(Point::new(0.51, 0.3)), "right of bounds");
      assert!(!b.contains(Point::new(0.3, 0.19)), "above bounds");
    }
  }

  mod bounds_to_pixels {
    use super::*;

    #[test]
    fn scales_by_surface() {
      let rect = Bounds::new(0.1, 0.25, 0.5, 0.75).to_pixels(Size::new(200.0, 400.0));
      assert_eq!(
        rect,
        PixelRect {
          x: 20.0,
          y: 100.0,
          width: 80.0,
          height: 200.0
        }
      );
      assert!(rect.has_positive_area());
    }

    #[test]
    fn zero_surface_has_no_area() {
      let rect = Bounds::FULL_SCREEN.to_pixels(Size::new(0.0, 0.0));
      assert!(!rect.has_positive_area());
    }
  }

  #[test]
  fn size_usable() {
    assert!(Size::new(10.0, 10.0).is_usable());
    assert!(!Size::new(0.0, 10.0).is_usable());
    assert!(!Size::new(10.0, f64::NAN).is_usable());
  }
}

#[cfg(test)]
mod proptests {
  use super::*;
  use proptest::prelude::*;

  fn unit() -> impl Strategy<Value = f64> {
    0.0..1.0f64
  }

  /// Strategy for well-formed normalized bounds.
  fn bounds() -> impl Strategy<Value = Bounds> {
    (unit(), unit(), 0.001..1.0f64, 0.001..1.0f64)
      .prop_map(|(x, y, w, h)| Bounds::new(x, y, x + w, y + h))
  }

  proptest! {
    /// Every point strictly inside well-formed bounds is contained.
    #[test]
    fn interior_points_contained(b in bounds(), fx in 0.01..0.99f64, fy in 0.01..0.99f64) {
      let p = Point::new(b.x1 + b.width() * fx, b.y1 + b.height() * fy);
      prop_assert!(b.is_well_formed());
      prop_assert!(b.contains(p), "interior point should be contained");
    }

    /// The center is always contained.
    #[test]
    fn center_contained(b in bounds()) {
      prop_assert!(b.contains(b.center()));
    }

    /// Pixel conversion preserves positivity on a usable surface.
    #[test]
    fn pixels_positive(b in bounds(), w in 1.0..4000.0f64, h in 1.0..4000.0f64) {
      prop_assert!(b.to_pixels(Size::new(w, h)).has_positive_area());
    }
  }
}
