/*!
Pointer → node resolution.

Two steps:

1. [`find_candidates`] collects every node whose bounds contain the point,
   descending only into nodes that contain it. Accessibility trees nest
   children inside their parents; a hierarchy that breaks this loses
   matches under the pruned parent.
2. [`select_best`] picks one candidate with the [`rules`] chain.
   Boolean rules pick a tier, then area and richness decide within it.

A non-root node with missing or malformed bounds is never a candidate, but
its children are still visited. A root without usable bounds covers the
whole screen.
*/

pub mod rules;

pub use rules::{HitTestConfig, AREA_EPSILON};

use std::cmp::Ordering;

use crate::types::{Bounds, Node, Point};

/// Every node containing `point`, in pre-order.
pub fn find_candidates(root: &Node, point: Point) -> Vec<&Node> {
  let mut out = Vec::new();
  if point.x.is_finite() && point.y.is_finite() {
    let bounds = root.valid_bounds().unwrap_or(Bounds::FULL_SCREEN);
    if bounds.contains(point) {
      out.push(root);
      for child in &root.children {
        collect(child, point, &mut out);
      }
    }
  }
  out
}

fn collect<'a>(node: &'a Node, point: Point, out: &mut Vec<&'a Node>) {
  match node.valid_bounds() {
    Some(bounds) if bounds.contains(point) => out.push(node),
    // Pruned: children are assumed to lie inside their parent.
    Some(_) => return,
    // Unknown geometry can't justify pruning.
    None => {}
  }
  for child in &node.children {
    collect(child, point, out);
  }
}

/// Best candidate under the rule chain. Ties keep the earliest candidate.
///
/// The epsilon band is not transitive, so it is measured from one anchor:
/// among candidates in the best [`rules::tier`], those within
/// `area_epsilon` of the smallest area compete on richness. The result does
/// not depend on candidate order beyond that final tie.
pub fn select_best<'a>(candidates: &[&'a Node], config: &HitTestConfig) -> Option<&'a Node> {
  let tier = candidates.iter().map(|n| rules::tier(n, config)).min()?;
  let contenders: Vec<&'a Node> = candidates
    .iter()
    .copied()
    .filter(|n| rules::tier(n, config) == tier)
    .collect();
  let anchor = contenders
    .iter()
    .filter_map(|n| n.valid_bounds())
    .map(|b| b.area())
    .fold(f64::INFINITY, f64::min);

  contenders
    .into_iter()
    .filter(|n| !matches!(n.valid_bounds(), Some(b) if b.area() - anchor > config.area_epsilon))
    .fold(None, |best: Option<&'a Node>, candidate| match best {
      Some(best) if rules::by_richness(candidate, best, config) != Ordering::Less => Some(best),
      _ => Some(candidate),
    })
}

/// [`find_candidates`] then [`select_best`].
pub fn resolve<'a>(root: &'a Node, point: Point, config: &HitTestConfig) -> Option<&'a Node> {
  let candidates = find_candidates(root, point);
  let best = select_best(&candidates, config);
  log::trace!(
    "hit test at ({:.4}, {:.4}): {} candidates, picked {:?}",
    point.x,
    point.y,
    candidates.len(),
    best.map(|n| n.key.as_str())
  );
  best
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::test_support::{leaf, with_children};
  use crate::types::{CLICKABLE, RESOURCE_ID, TEXT};

  fn keys(nodes: &[&Node]) -> Vec<String> {
    nodes.iter().map(|n| n.key.as_str().to_owned()).collect()
  }

  /// root [0,0,1,1] ⊃ a [0.1,0.1,0.5,0.5] ⊃ b [0.2,0.2,0.3,0.3]
  fn nested() -> Node {
    with_children(
      leaf("root", [0.0, 0.0, 1.0, 1.0], &[]),
      vec![with_children(
        leaf("a", [0.1, 0.1, 0.5, 0.5], &[]),
        vec![leaf("b", [0.2, 0.2, 0.3, 0.3], &[])],
      )],
    )
  }

  mod candidates {
    use super::*;

    #[test]
    fn nested_scenario() {
      let root = nested();
      let found = find_candidates(&root, Point::new(0.25, 0.25));
      assert_eq!(keys(&found), vec!["root", "a", "b"]);
      let best = select_best(&found, &HitTestConfig::default()).unwrap();
      assert_eq!(best.key.as_str(), "b");
    }

    #[test]
    fn prunes_non_containing_subtrees() {
      // "stray" lies outside its parent and is lost under pruning.
      let root = with_children(
        leaf("root", [0.0, 0.0, 1.0, 1.0], &[]),
        vec![with_children(
          leaf("a", [0.0, 0.0, 0.2, 0.2], &[]),
          vec![leaf("stray", [0.6, 0.6, 0.8, 0.8], &[])],
        )],
      );
      let found = find_candidates(&root, Point::new(0.7, 0.7));
      assert_eq!(keys(&found), vec!["root"]);
    }

    #[test]
    fn invalid_root_covers_screen() {
      let mut root = nested();
      root.bounds = None;
      let found = find_candidates(&root, Point::new(0.9, 0.9));
      assert_eq!(keys(&found), vec!["root"]);
    }

    #[test]
    fn outside_screen_matches_nothing() {
      let mut root = nested();
      root.bounds = None;
      assert!(find_candidates(&root, Point::new(1.5, 0.5)).is_empty());
      assert!(find_candidates(&root, Point::new(f64::NAN, 0.5)).is_empty());
    }

    #[test]
    fn malformed_node_is_skipped_but_children_visited() {
      let root = with_children(
        leaf("root", [0.0, 0.0, 1.0, 1.0], &[]),
        vec![
          with_children(
            leaf("broken", [0.5, 0.5, 0.1, 0.1], &[]),
            vec![leaf("inner", [0.2, 0.2, 0.4, 0.4], &[])],
          ),
          leaf("sibling", [0.0, 0.0, 0.5, 0.5], &[]),
        ],
      );
      let found = find_candidates(&root, Point::new(0.3, 0.3));
      assert_eq!(keys(&found), vec!["root", "inner", "sibling"]);
    }

    #[test]
    fn zero_area_is_not_a_candidate() {
      let root = with_children(
        leaf("root", [0.0, 0.0, 1.0, 1.0], &[]),
        vec![leaf("line", [0.0, 0.5, 1.0, 0.5], &[])],
      );
      let found = find_candidates(&root, Point::new(0.5, 0.5));
      assert_eq!(keys(&found), vec!["root"]);
    }
  }

  mod best {
    use super::*;

    #[test]
    fn empty_is_none() {
      assert!(select_best(&[], &HitTestConfig::default()).is_none());
    }

    #[test]
    fn clickable_wins_regardless_of_area() {
      let big = leaf("big", [0.0, 0.0, 0.8, 0.8], &[(CLICKABLE, "true")]);
      let small = leaf("small", [0.1, 0.1, 0.2, 0.2], &[]);
      let best = select_best(&[&small, &big], &HitTestConfig::default()).unwrap();
      assert_eq!(best.key.as_str(), "big");
    }

    #[test]
    fn smaller_area_wins_when_equally_clickable() {
      let big = leaf("big", [0.0, 0.0, 0.8, 0.8], &[(CLICKABLE, "true")]);
      let small = leaf("small", [0.1, 0.1, 0.2, 0.2], &[(CLICKABLE, "true")]);
      let best = select_best(&[&big, &small], &HitTestConfig::default()).unwrap();
      assert_eq!(best.key.as_str(), "small");
    }

    #[test]
    fn denylisted_overlay_never_wins() {
      let config = HitTestConfig {
        denylist: vec!["com.tool:id/capture".to_owned()],
        ..HitTestConfig::default()
      };
      let overlay = leaf(
        "overlay",
        [0.0, 0.0, 0.1, 0.1],
        &[(RESOURCE_ID, "com.tool:id/capture"), (CLICKABLE, "true")],
      );
      let target = leaf("target", [0.0, 0.0, 0.5, 0.5], &[]);
      let best = select_best(&[&overlay, &target], &config).unwrap();
      assert_eq!(best.key.as_str(), "target");
    }

    #[test]
    fn full_ties_keep_pre_order() {
      let first = leaf("first", [0.0, 0.0, 0.5, 0.5], &[(TEXT, "x")]);
      let second = leaf("second", [0.5, 0.5, 1.0, 1.0], &[(TEXT, "y")]);
      let best = select_best(&[&first, &second], &HitTestConfig::default()).unwrap();
      assert_eq!(best.key.as_str(), "first");
    }

    #[test]
    fn area_band_is_anchored_at_smallest() {
      // Adjacent areas sit within epsilon of each other, the ends do not.
      let a = leaf("a", [0.0, 0.0, 0.1, 0.1], &[]);
      let b = leaf("b", [0.0, 0.0, 0.1, 0.100009], &[(TEXT, "b")]);
      let c = leaf("c", [0.0, 0.0, 0.1, 0.100018], &[(RESOURCE_ID, "id/c")]);
      let config = HitTestConfig::default();
      for order in [[&a, &b, &c], [&a, &c, &b], [&c, &b, &a], [&b, &c, &a]] {
        let best = select_best(&order, &config).unwrap();
        assert_eq!(best.key.as_str(), "b");
      }
    }

    #[test]
    fn richness_breaks_area_ties() {
      let plain = leaf("plain", [0.0, 0.0, 0.5, 0.5], &[]);
      let named = leaf("named", [0.5, 0.5, 1.0, 1.0], &[(RESOURCE_ID, "id/ok")]);
      let best = select_best(&[&plain, &named], &HitTestConfig::default()).unwrap();
      assert_eq!(best.key.as_str(), "named");
    }
  }

  #[test]
  fn resolve_outside_every_box() {
    let root = nested();
    assert!(resolve(&root, Point::new(-0.2, 0.5), &HitTestConfig::default()).is_none());
  }
}

#[cfg(test)]
mod proptests {
  use super::*;
  use crate::types::test_support::{leaf, with_children};
  use proptest::prelude::*;

  proptest! {
    /// A well-formed node under the root is found for any point strictly inside it.
    #[test]
    fn interior_point_finds_node(
      x in 0.0..0.9f64, y in 0.0..0.9f64,
      w in 0.01..0.1f64, h in 0.01..0.1f64,
      fx in 0.01..0.99f64, fy in 0.01..0.99f64,
    ) {
      let root = with_children(
        leaf("root", [0.0, 0.0, 1.0, 1.0], &[]),
        vec![leaf("target", [x, y, x + w, y + h], &[])],
      );
      let point = Point::new(x + w * fx, y + h * fy);
      let found = find_candidates(&root, point);
      prop_assert!(found.iter().any(|n| n.key.as_str() == "target"));
      let best = select_best(&found, &HitTestConfig::default());
      prop_assert_eq!(best.map(|n| n.key.as_str()), Some("target"));
    }
  }
}
