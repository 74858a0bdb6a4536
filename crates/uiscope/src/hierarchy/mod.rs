/*!
Indexed hierarchy snapshot.

A `HierarchyTree` is immutable: each fetch from the device builds a new one
and the previous tree (with every key it handed out) is discarded.

## Invariants

1. **Unique keys**: every node in a snapshot has a distinct `NodeKey`.
2. **Complete index**: every node reachable from the root is in the index.
3. **Single parent**: each non-root node has exactly one parent entry.
*/

mod parse;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::types::{Descendants, Node, NodeKey, ScopeError, ScopeResult};

struct IndexEntry {
  node: Arc<Node>,
  parent: Option<NodeKey>,
}

/// Root node plus a `key → node` index.
pub struct HierarchyTree {
  root: Arc<Node>,
  index: HashMap<NodeKey, IndexEntry>,
}

impl std::fmt::Debug for HierarchyTree {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("HierarchyTree")
      .field("root", &self.root.key)
      .field("nodes", &self.index.len())
      .finish()
  }
}

impl HierarchyTree {
  /// Build from a raw hierarchy document.
  ///
  /// Fails with [`ScopeError::HierarchyUnavailable`] when the document is
  /// null or its root carries neither a `name` nor a `key`.
  pub fn build(raw: &Value) -> ScopeResult<Self> {
    let root = parse::parse_root(raw)?;
    Ok(Self::from_root(root))
  }

  /// Parse JSON text, then [`build`](Self::build).
  pub fn from_json(text: &str) -> ScopeResult<Self> {
    let raw: Value = serde_json::from_str(text)?;
    Self::build(&raw)
  }

  /// Index an already-built tree. Keys are expected to be unique; on a
  /// duplicate, the first node in pre-order wins the index slot.
  pub fn from_root(root: Node) -> Self {
    let root = Arc::new(root);
    let mut index = HashMap::new();

    // One pre-order pass. Iterative to avoid deep recursion.
    let mut stack: Vec<(Arc<Node>, Option<NodeKey>)> = vec![(Arc::clone(&root), None)];
    while let Some((node, parent)) = stack.pop() {
      for child in node.children.iter().rev() {
        stack.push((Arc::clone(child), Some(node.key.clone())));
      }
      if index.contains_key(&node.key) {
        log::warn!("duplicate node key {} in hierarchy, keeping first", node.key);
        continue;
      }
      index.insert(node.key.clone(), IndexEntry { node, parent });
    }

    log::debug!("indexed hierarchy: {} nodes under {}", index.len(), root.key);
    Self { root, index }
  }

  /// The root node.
  pub fn root(&self) -> &Node {
    &self.root
  }

  /// O(1) lookup by key.
  pub fn lookup(&self, key: &NodeKey) -> Option<&Node> {
    self.index.get(key).map(|entry| entry.node.as_ref())
  }

  /// Like [`lookup`](Self::lookup), but an error when absent.
  pub fn get(&self, key: &NodeKey) -> ScopeResult<&Node> {
    self
      .lookup(key)
      .ok_or_else(|| ScopeError::NodeNotFound(key.clone()))
  }

  /// Whether `key` is indexed.
  pub fn contains(&self, key: &NodeKey) -> bool {
    self.index.contains_key(key)
  }

  /// Number of indexed nodes.
  pub fn node_count(&self) -> usize {
    self.index.len()
  }

  /// Pre-order traversal from the root.
  pub fn iter(&self) -> Descendants<'_> {
    self.root.descendants()
  }

  /// Parent key, `None` for the root or an unknown key.
  pub fn parent(&self, key: &NodeKey) -> Option<&NodeKey> {
    self.index.get(key).and_then(|entry| entry.parent.as_ref())
  }

  /// Keys from the root down to `key` (inclusive). Tree views use this to
  /// expand every ancestor of a selection.
  pub fn path_to(&self, key: &NodeKey) -> Option<Vec<NodeKey>> {
    let mut entry = self.index.get(key)?;
    let mut path = vec![key.clone()];
    while let Some(parent) = &entry.parent {
      path.push(parent.clone());
      entry = self.index.get(parent)?;
    }
    path.reverse();
    Some(path)
  }
}
