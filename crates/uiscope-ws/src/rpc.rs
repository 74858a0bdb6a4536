/*!
RPC request/response types and dispatch.
*/

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use ts_rs::TS;
use uiscope::context::{ElementContext, HierarchyOverview};
use uiscope::{HitTestConfig, NodeKey, Point, Session, SessionSnapshot, Size};

/// RPC request.
#[derive(Debug, Deserialize, TS)]
#[serde(tag = "method", content = "args", rename_all = "snake_case")]
#[ts(export)]
pub enum RpcRequest {
  /// Replace the hierarchy with a raw dump.
  LoadHierarchy {
    #[ts(type = "unknown")]
    hierarchy: JsonValue,
  },
  /// Drop the hierarchy and selection.
  ClearHierarchy,
  /// Screenshot decoded at its intrinsic size.
  ImageLoaded { width: f64, height: f64 },
  /// Screenshot container resized.
  Resize { width: f64, height: f64 },
  /// Pointer moved over the screenshot (surface pixels).
  PointerMove { x: f64, y: f64 },
  /// Pointer left the screenshot.
  PointerLeave,
  /// Click on the screenshot (surface pixels).
  Click { x: f64, y: f64 },
  /// Tree-view selection. `null` deselects.
  Select {
    #[serde(default)]
    key: Option<NodeKey>,
  },
  /// Clear hover and selection.
  ClearSelection,
  /// Locator for the focused node.
  Locator,
  /// Assistant context for the focused node.
  Context,
  /// Get a snapshot of current state.
  Snapshot,
  /// Update hit-test tunables.
  Configure { config: HitTestConfig },
}

/// Assistant payload: the focused element and a hierarchy summary.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContextPayload {
  pub selected_element: Option<ElementContext>,
  pub ui_hierarchy: Option<HierarchyOverview>,
}

/// RPC response.
#[derive(Debug, Serialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum RpcResponse {
  /// Full state snapshot.
  Snapshot(Box<SessionSnapshot>),
  /// Node under the pointer, if any.
  Key(Option<NodeKey>),
  /// Whether the call changed anything.
  Changed(bool),
  /// Locator string, if a node is focused.
  Locator(Option<String>),
  Context(Box<ContextPayload>),
  /// No data.
  Null,
}

pub fn dispatch_json(session: &mut Session, method: &str, args: &JsonValue) -> JsonValue {
  let request_value = json!({ "method": method, "args": args });

  match serde_json::from_value::<RpcRequest>(request_value) {
    Ok(request) => match dispatch(session, request) {
      Ok(response) => json!({ "result": response }),
      Err(e) => {
        log::warn!("[rpc] {method} failed: {e}");
        json!({ "error": e })
      }
    },
    Err(e) => {
      log::warn!("[rpc] Invalid request for {method}: {e}");
      json!({ "error": format!("Invalid request: {}", e) })
    }
  }
}

pub fn dispatch(session: &mut Session, request: RpcRequest) -> Result<RpcResponse, String> {
  match request {
    RpcRequest::LoadHierarchy { hierarchy } => {
      session
        .load_hierarchy(&hierarchy)
        .map_err(|e| e.to_string())?;
      Ok(RpcResponse::Snapshot(Box::new(session.snapshot())))
    }

    RpcRequest::ClearHierarchy => {
      session.clear_hierarchy();
      Ok(RpcResponse::Null)
    }

    RpcRequest::ImageLoaded { width, height } => Ok(RpcResponse::Changed(
      session.image_loaded(Size::new(width, height)),
    )),

    RpcRequest::Resize { width, height } => Ok(RpcResponse::Changed(
      session.container_resized(Size::new(width, height)),
    )),

    RpcRequest::PointerMove { x, y } => Ok(RpcResponse::Key(session.pointer_move(Point::new(x, y)))),

    RpcRequest::PointerLeave => {
      session.pointer_leave();
      Ok(RpcResponse::Null)
    }

    RpcRequest::Click { x, y } => Ok(RpcResponse::Key(session.click(Point::new(x, y)))),

    RpcRequest::Select { key } => {
      let changed = match key {
        Some(key) => session.select_key(&key).map_err(|e| e.to_string())?,
        None => session.select(None),
      };
      Ok(RpcResponse::Changed(changed))
    }

    RpcRequest::ClearSelection => Ok(RpcResponse::Changed(session.clear_selection())),

    RpcRequest::Locator => Ok(RpcResponse::Locator(session.locator())),

    RpcRequest::Context => Ok(RpcResponse::Context(Box::new(ContextPayload {
      selected_element: session.element_context(),
      ui_hierarchy: session.overview(),
    }))),

    RpcRequest::Snapshot => Ok(RpcResponse::Snapshot(Box::new(session.snapshot()))),

    RpcRequest::Configure { config } => {
      session.configure(config);
      Ok(RpcResponse::Null)
    }
  }
}
