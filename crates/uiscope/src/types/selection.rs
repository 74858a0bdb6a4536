/*! Hover and selection state shared by every view. */

use super::NodeKey;
use serde::Serialize;
use ts_rs::TS;

/// Hovered and selected node keys. Keys refer to the current snapshot only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct SelectionState {
  pub selected: Option<NodeKey>,
  pub hovered: Option<NodeKey>,
}

impl SelectionState {
  /// Node the properties panel describes: the selection, else the hover.
  pub fn focus(&self) -> Option<&NodeKey> {
    self.selected.as_ref().or(self.hovered.as_ref())
  }

  pub fn clear(&mut self) {
    self.selected = None;
    self.hovered = None;
  }
}
