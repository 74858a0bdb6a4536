/*!
Candidate ordering rules.

Each rule compares two candidates and returns `Less` when the first one is
the better pick. [`compare`] walks [`CHAIN`] top to bottom and stops at the
first rule that tells them apart, so earlier rules dominate.

[`by_area`] treats areas within epsilon as equal, which is not transitive;
selection over many candidates anchors that band instead of folding
[`compare`] pairwise.
*/

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Node;

/// Areas closer than this (in normalized units²) count as equal.
pub const AREA_EPSILON: f64 = 1e-6;

/// Tunables for candidate ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct HitTestConfig {
  /// `resource-id`s of full-screen capture/overlay views that must never win.
  pub denylist: Vec<String>,
  /// Area-equality tolerance for the richness tie-break.
  pub area_epsilon: f64,
}

impl Default for HitTestConfig {
  fn default() -> Self {
    Self {
      denylist: Vec::new(),
      area_epsilon: AREA_EPSILON,
    }
  }
}

impl HitTestConfig {
  /// Whether `node`'s `resource-id` is on the denylist.
  pub fn is_denied(&self, node: &Node) -> bool {
    node
      .resource_id()
      .is_some_and(|id| self.denylist.iter().any(|denied| denied == id))
  }
}

/// Rank from the boolean rules: usable bounds, not denied, clickable.
/// Lower is better; these three rules order candidates transitively.
pub fn tier(node: &Node, config: &HitTestConfig) -> (bool, bool, bool) {
  (
    node.valid_bounds().is_none(),
    config.is_denied(node),
    !node.is_clickable(),
  )
}

/// A single ordering rule.
pub type Rule = fn(&Node, &Node, &HitTestConfig) -> Ordering;

/// The rule chain, in precedence order.
pub const CHAIN: [Rule; 5] = [
  by_valid_bounds,
  by_denylist,
  by_clickable,
  by_area,
  by_richness,
];

/// First non-equal verdict of [`CHAIN`].
pub fn compare(a: &Node, b: &Node, config: &HitTestConfig) -> Ordering {
  CHAIN
    .iter()
    .map(|rule| rule(a, b, config))
    .find(|ordering| ordering.is_ne())
    .unwrap_or(Ordering::Equal)
}

/// Well-formed bounds before missing, NaN, or empty ones.
pub fn by_valid_bounds(a: &Node, b: &Node, _config: &HitTestConfig) -> Ordering {
  let invalid = |n: &Node| n.valid_bounds().is_none();
  invalid(a).cmp(&invalid(b))
}

/// Denylisted overlays last.
pub fn by_denylist(a: &Node, b: &Node, config: &HitTestConfig) -> Ordering {
  config.is_denied(a).cmp(&config.is_denied(b))
}

/// `clickable == "true"` first.
pub fn by_clickable(a: &Node, b: &Node, _config: &HitTestConfig) -> Ordering {
  b.is_clickable().cmp(&a.is_clickable())
}

/// Smaller area first, unless the areas are within `area_epsilon`.
pub fn by_area(a: &Node, b: &Node, config: &HitTestConfig) -> Ordering {
  let (Some(a_bounds), Some(b_bounds)) = (a.valid_bounds(), b.valid_bounds()) else {
    return Ordering::Equal;
  };
  let (a_area, b_area) = (a_bounds.area(), b_bounds.area());
  if (a_area - b_area).abs() <= config.area_epsilon {
    return Ordering::Equal;
  }
  a_area.partial_cmp(&b_area).unwrap_or(Ordering::Equal)
}

/// Higher [`richness`] first.
pub fn by_richness(a: &Node, b: &Node, _config: &HitTestConfig) -> Ordering {
  richness(b).cmp(&richness(a))
}

/// How much identifying information a node carries.
///
/// `+2` resource-id, `+1` text, `+1` content-desc, `-1` generic container.
pub fn richness(node: &Node) -> i32 {
  let mut score = 0;
  if node.resource_id().is_some() {
    score += 2;
  }
  if node.text().is_some() {
    score += 1;
  }
  if node.content_desc().is_some() {
    score += 1;
  }
  if is_generic_container(node) {
    score -= 1;
  }
  score
}

/// Layout-only container types (Android layouts and view groups, the iOS
/// catch-all `XCUIElementTypeOther`).
pub fn is_generic_container(node: &Node) -> bool {
  [node.attr(crate::types::CLASS), Some(node.name.as_str())]
    .into_iter()
    .flatten()
    .any(is_generic_class)
}

fn is_generic_class(class: &str) -> bool {
  let simple = class.rsplit('.').next().unwrap_or(class);
  simple.ends_with("Layout")
    || simple.ends_with("ViewGroup")
    || simple == "XCUIElementTypeOther"
}
