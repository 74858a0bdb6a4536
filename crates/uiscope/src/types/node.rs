/*! Node type representing one element of a hierarchy snapshot. */

use super::{Bounds, Rect};
use derive_more::{Display, From, Into};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::sync::Arc;
use ts_rs::TS;

/// Property holding the platform view identifier.
pub const RESOURCE_ID: &str = "resource-id";
/// Property holding visible text.
pub const TEXT: &str = "text";
/// Property holding the accessibility description.
pub const CONTENT_DESC: &str = "content-desc";
/// Property holding the widget class.
pub const CLASS: &str = "class";
/// Property holding the clickable flag (`"true"` / `"false"`).
pub const CLICKABLE: &str = "clickable";

/// Identifies a node's position within one hierarchy snapshot.
///
/// Keys are only meaningful for the snapshot that produced them.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS, Display, From, Into,
)]
#[ts(export)]
pub struct NodeKey(pub String);

impl NodeKey {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<&str> for NodeKey {
  fn from(key: &str) -> Self {
    Self(key.to_owned())
  }
}

/// Ordered string properties with unique keys.
///
/// Serializes as a JSON object in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties(Vec<(String, String)>);

impl Properties {
  pub const fn new() -> Self {
    Self(Vec::new())
  }

  /// Raw value for `key`, empty strings included.
  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .0
      .iter()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v.as_str())
  }

  /// Insert or replace. A replaced key keeps its original position.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    let key = key.into();
    let value = value.into();
    match self.0.iter_mut().find(|(k, _)| *k == key) {
      Some(entry) => entry.1 = value,
      None => self.0.push((key, value)),
    }
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut props = Self::new();
    for (k, v) in iter {
      props.insert(k, v);
    }
    props
  }
}

impl Serialize for Properties {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.0.len()))?;
    for (k, v) in &self.0 {
      map.serialize_entry(k, v)?;
    }
    map.end()
  }
}

/// One element of the accessibility hierarchy.
///
/// Children are shared with the owning tree's index (`Arc`) but never with
/// another parent; there are no parent links.
/// Use [`HierarchyTree::path_to`](crate::HierarchyTree::path_to) to walk upwards.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct Node {
  pub key: NodeKey,
  /// Element type, usually the widget class.
  pub name: String,
  #[ts(type = "Record<string, string>")]
  pub properties: Properties,
  /// Normalized bounds. `None` when missing or malformed in the source document.
  pub bounds: Option<Bounds>,
  /// Device-pixel rectangle, when the backend reports one.
  pub rect: Option<Rect>,
  pub children: Vec<Arc<Node>>,
}

impl Node {
  /// Non-empty property value.
  pub fn attr(&self, key: &str) -> Option<&str> {
    self.properties.get(key).filter(|v| !v.is_empty())
  }

  pub fn resource_id(&self) -> Option<&str> {
    self.attr(RESOURCE_ID)
  }

  pub fn text(&self) -> Option<&str> {
    self.attr(TEXT)
  }

  pub fn content_desc(&self) -> Option<&str> {
    self.attr(CONTENT_DESC)
  }

  /// Widget class: the `class` property, falling back to `name`.
  pub fn class_name(&self) -> Option<&str> {
    self
      .attr(CLASS)
      .or_else(|| Some(self.name.as_str()).filter(|n| !n.is_empty()))
  }

  pub fn is_clickable(&self) -> bool {
    self.properties.get(CLICKABLE) == Some("true")
  }

  /// Bounds usable for hit-testing and drawing.
  pub fn valid_bounds(&self) -> Option<Bounds> {
    self.bounds.filter(Bounds::is_well_formed)
  }

  /// Pre-order traversal of this node and its descendants.
  pub fn descendants(&self) -> Descendants<'_> {
    Descendants { stack: vec![self] }
  }
}

/// Pre-order iterator over a subtree. See [`Node::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
  stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
  type Item = &'a Node;

  fn next(&mut self) -> Option<Self::Item> {
    let node = self.stack.pop()?;
    self.stack.extend(node.children.iter().rev().map(Arc::as_ref));
    Some(node)
  }
}
