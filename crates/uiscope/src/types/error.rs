/*! Error types for uiscope operations. */

use super::NodeKey;

/// Errors that can occur while building or querying an inspection session.
#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
  #[error("Hierarchy unavailable: {0}")]
  HierarchyUnavailable(String),

  #[error("Invalid hierarchy document: {0}")]
  InvalidHierarchy(#[from] serde_json::Error),

  #[error("Node not found: {0}")]
  NodeNotFound(NodeKey),
}

/// Result type for uiscope operations.
pub type ScopeResult<T> = Result<T, ScopeError>;
