/*!
Raw hierarchy document → `Node`.

Malformed input is handled per node: a bad `bounds` entry becomes `None`,
a non-object child is skipped, a duplicate `key` is replaced by a positional
one. Only a missing root fails the whole document.
*/

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::types::{Bounds, Node, NodeKey, Properties, Rect, ScopeError, ScopeResult};

/// Parse the root of a hierarchy document.
pub(super) fn parse_root(raw: &Value) -> ScopeResult<Node> {
  let obj = match raw {
    Value::Object(obj) => obj,
    Value::Null => {
      return Err(ScopeError::HierarchyUnavailable(
        "hierarchy document is null".to_owned(),
      ))
    }
    other => {
      return Err(ScopeError::HierarchyUnavailable(format!(
        "expected an object at the root, got {}",
        json_type(other)
      )))
    }
  };

  let has_identifier = [obj.get("name"), obj.get("key")]
    .into_iter()
    .flatten()
    .any(|v| v.as_str().is_some_and(|s| !s.is_empty()));
  if !has_identifier {
    return Err(ScopeError::HierarchyUnavailable(
      "root has neither a name nor a key".to_owned(),
    ));
  }

  let mut keys = KeyAllocator::default();
  Ok(parse_node(obj, "0", &mut keys))
}

/// Parse one node and its subtree. Keys are claimed in pre-order.
///
/// Depth is bounded by `serde_json`'s recursion limit on the input document.
fn parse_node(obj: &Map<String, Value>, path: &str, keys: &mut KeyAllocator) -> Node {
  let key = keys.claim(obj.get("key").and_then(Value::as_str), path);

  let name = obj
    .get("name")
    .and_then(Value::as_str)
    .unwrap_or_default()
    .to_owned();

  let properties = obj
    .get("properties")
    .and_then(Value::as_object)
    .map(parse_properties)
    .unwrap_or_default();

  let bounds = obj.get("bounds").and_then(|v| {
    let parsed = parse_bounds(v);
    if parsed.is_none() && !v.is_null() {
      log::debug!("node {key}: ignoring malformed bounds {v}");
    }
    parsed
  });

  let rect = obj
    .get("rect")
    .filter(|v| !v.is_null())
    .and_then(|v| serde_json::from_value::<Rect>(v.clone()).ok());

  let children = obj
    .get("children")
    .and_then(Value::as_array)
    .map(|items| {
      items
        .iter()
        .enumerate()
        .filter_map(|(i, child)| match child.as_object() {
          Some(child_obj) => Some(Arc::new(parse_node(child_obj, &format!("{path}-{i}"), keys))),
          None => {
            log::warn!("node {key}: skipping non-object child #{i}");
            None
          }
        })
        .collect()
    })
    .unwrap_or_default();

  Node {
    key,
    name,
    properties,
    bounds,
    rect,
    children,
  }
}

/// Stringify property values. Booleans and numbers come through as text;
/// `null` drops the entry.
fn parse_properties(obj: &Map<String, Value>) -> Properties {
  obj
    .iter()
    .filter_map(|(k, v)| {
      let value = match v {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => v.to_string(),
      };
      Some((k.clone(), value))
    })
    .collect()
}

/// `[x1, y1, x2, y2]` of numbers, else `None`.
fn parse_bounds(value: &Value) -> Option<Bounds> {
  let items = value.as_array()?;
  let numbers: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
  Bounds::from_slice(&numbers?)
}

const fn json_type(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

/// Hands out unique keys within one snapshot.
#[derive(Default)]
struct KeyAllocator {
  used: HashSet<String>,
}

impl KeyAllocator {
  /// Prefer the document's key; fall back to the positional path.
  fn claim(&mut self, supplied: Option<&str>, path: &str) -> NodeKey {
    if let Some(key) = supplied.filter(|k| !k.is_empty()) {
      if self.used.insert(key.to_owned()) {
        return NodeKey::from(key);
      }
      log::warn!("duplicate node key {key:?}, using positional key {path:?}");
    }

    let mut candidate = path.to_owned();
    let mut suffix = 1u32;
    while !self.used.insert(candidate.clone()) {
      candidate = format!("{path}~{suffix}");
      suffix += 1;
    }
    NodeKey(candidate)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  mod root {
    use super::*;

    #[test]
    fn null_is_unavailable() {
      assert!(matches!(
        parse_root(&Value::Null),
        Err(ScopeError::HierarchyUnavailable(_))
      ));
    }

    #[test]
    fn non_object_is_unavailable() {
      assert!(matches!(
        parse_root(&json!([1, 2, 3])),
        Err(ScopeError::HierarchyUnavailable(_))
      ));
    }

    #[test]
    fn missing_identifier_is_unavailable() {
      let raw = json!({ "properties": {}, "children": [] });
      assert!(matches!(
        parse_root(&raw),
        Err(ScopeError::HierarchyUnavailable(_))
      ));
    }

    #[test]
    fn key_alone_identifies_root() {
      let node = parse_root(&json!({ "key": "root" })).unwrap();
      assert_eq!(node.key.as_str(), "root");
      assert_eq!(node.name, "");
    }
  }

  mod keys {
    use super::*;

    #[test]
    fn positional_when_missing() {
      let node = parse_root(&json!({
        "name": "hierarchy",
        "children": [
          { "name": "a", "children": [{ "name": "a0" }] },
          { "name": "b" }
        ]
      }))
      .unwrap();
      let keys: Vec<_> = node.descendants().map(|n| n.key.as_str().to_owned()).collect();
      assert_eq!(keys, vec!["0", "0-0", "0-0-0", "0-1"]);
    }

    #[test]
    fn duplicates_fall_back_to_position() {
      let node = parse_root(&json!({
        "key": "k",
        "name": "root",
        "children": [{ "key": "k", "name": "dup" }]
      }))
      .unwrap();
      assert_eq!(node.key.as_str(), "k");
      assert_eq!(node.children[0].key.as_str(), "0-0");
    }

    #[test]
    fn positional_collision_gets_suffix() {
      let node = parse_root(&json!({
        "name": "root",
        "children": [
          { "key": "0-1", "name": "claims-sibling-path" },
          { "name": "positional" }
        ]
      }))
      .unwrap();
      assert_eq!(node.children[0].key.as_str(), "0-1");
      assert_eq!(node.children[1].key.as_str(), "0-1~1");
    }
  }

  mod fields {
    use super::*;

    #[test]
    fn properties_are_stringified_in_order() {
      let node = parse_root(&json!({
        "name": "n",
        "properties": {
          "resource-id": "com.app:id/btn",
          "clickable": true,
          "index": 3,
          "hint": null
        }
      }))
      .unwrap();
      let props: Vec<_> = node.properties.iter().collect();
      assert_eq!(
        props,
        vec![
          ("resource-id", "com.app:id/btn"),
          ("clickable", "true"),
          ("index", "3")
        ]
      );
      assert!(node.is_clickable());
    }

    #[test]
    fn malformed_bounds_are_absent() {
      let raw = json!({
        "name": "root",
        "children": [
          { "name": "short", "bounds": [0.1, 0.2, 0.3] },
          { "name": "text", "bounds": ["a", 0, 1, 1] },
          { "name": "ok", "bounds": [0.1, 0.2, 0.3, 0.4] }
        ]
      });
      let node = parse_root(&raw).unwrap();
      assert_eq!(node.children[0].bounds, None);
      assert_eq!(node.children[1].bounds, None);
      assert_eq!(node.children[2].bounds, Some(Bounds::new(0.1, 0.2, 0.3, 0.4)));
    }

    #[test]
    fn inverted_bounds_are_kept() {
      let node = parse_root(&json!({ "name": "n", "bounds": [0.5, 0.5, 0.1, 0.1] })).unwrap();
      let bounds = node.bounds.unwrap();
      assert!(!bounds.is_well_formed());
    }

    #[test]
    fn rect_is_parsed() {
      let node = parse_root(&json!({
        "name": "n",
        "rect": { "x": 10, "y": 20, "width": 100, "height": 50 }
      }))
      .unwrap();
      assert_eq!(
        node.rect,
        Some(Rect {
          x: 10,
          y: 20,
          width: 100,
          height: 50
        })
      );
    }

    #[test]
    fn non_object_children_are_skipped() {
      let node = parse_root(&json!({
        "name": "root",
        "children": [42, { "name": "real" }, null]
      }))
      .unwrap();
      assert_eq!(node.children.len(), 1);
      assert_eq!(node.children[0].name, "real");
      assert_eq!(node.children[0].key.as_str(), "0-1");
    }
  }
}
