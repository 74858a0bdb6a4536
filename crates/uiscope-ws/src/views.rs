/*!
Session views that forward their updates to connected clients as JSON.
*/

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use ts_rs::TS;
use uiscope::overlay::{DisplayList, OverlayFrame, OverlayTheme, StrokeStyle, Surface};
use uiscope::{
  NodeDetails, NodeKey, PixelRect, PropertiesPanel, SessionSnapshot, Size, Tooltip,
  TooltipPlacement, TreeHighlight, TreeView,
};

/// Messages pushed to clients alongside session events.
#[derive(Debug, Clone, Serialize, TS)]
#[serde(tag = "event", content = "data")]
#[ts(export)]
pub enum ServerMessage {
  /// Initial sync (on connection)
  #[serde(rename = "sync:init")]
  SyncInit(SessionSnapshot),

  /// A repainted overlay.
  #[serde(rename = "overlay:frame")]
  OverlayFrame(OverlayFrame),
  /// Tree rows to mark and expand.
  #[serde(rename = "tree:highlight")]
  TreeHighlight(TreeHighlight),
  /// Properties panel contents; `null` empties it.
  #[serde(rename = "properties:show")]
  PropertiesShow(Option<NodeDetails>),
  /// Tooltip content and position.
  #[serde(rename = "tooltip:show")]
  TooltipShow(TooltipPlacement),
  /// Hide the tooltip.
  #[serde(rename = "tooltip:hide")]
  TooltipHide,
}

/// Serialize and fan out to every connection. No receivers is fine.
pub(crate) fn send(sender: &broadcast::Sender<String>, message: &ServerMessage) {
  match serde_json::to_string(message) {
    Ok(json) => drop(sender.send(json)),
    Err(e) => log::error!("[ws] failed to serialize message: {e}"),
  }
}

/// Overlay surface that records a frame and sends it on present.
#[derive(Debug)]
pub(crate) struct RemoteSurface {
  list: DisplayList,
  sender: Arc<broadcast::Sender<String>>,
}

impl RemoteSurface {
  pub(crate) const fn new(theme: OverlayTheme, sender: Arc<broadcast::Sender<String>>) -> Self {
    Self {
      list: DisplayList::with_theme(theme),
      sender,
    }
  }
}

impl Surface for RemoteSurface {
  fn clear(&mut self, size: Size) {
    self.list.clear(size);
  }

  fn stroke_rect(&mut self, key: &NodeKey, rect: PixelRect, style: StrokeStyle) {
    self.list.stroke_rect(key, rect, style);
  }

  fn present(&mut self) {
    self.list.present();
    if let Some(frame) = self.list.frame() {
      send(&self.sender, &ServerMessage::OverlayFrame(frame));
    }
  }
}

/// Tree view, properties panel, and tooltip, all rendered client-side.
#[derive(Debug, Clone)]
pub(crate) struct RemoteView {
  sender: Arc<broadcast::Sender<String>>,
}

impl RemoteView {
  pub(crate) const fn new(sender: Arc<broadcast::Sender<String>>) -> Self {
    Self { sender }
  }
}

impl TreeView for RemoteView {
  fn highlight(&mut self, highlight: &TreeHighlight) {
    send(&self.sender, &ServerMessage::TreeHighlight(highlight.clone()));
  }
}

impl PropertiesPanel for RemoteView {
  fn show(&mut self, details: Option<&NodeDetails>) {
    send(&self.sender, &ServerMessage::PropertiesShow(details.cloned()));
  }
}

impl Tooltip for RemoteView {
  fn show(&mut self, placement: &TooltipPlacement) {
    send(&self.sender, &ServerMessage::TooltipShow(placement.clone()));
  }

  fn hide(&mut self) {
    send(&self.sender, &ServerMessage::TooltipHide);
  }
}
