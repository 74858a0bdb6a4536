//! Standalone uiscope WebSocket server.
//!
//! `UISCOPE_WS_PORT` overrides the port. `UISCOPE_DENYLIST` takes a
//! comma-separated list of overlay `resource-id`s that never win a hit test.

use uiscope::overlay::OverlayTheme;
use uiscope::Session;
use uiscope_ws::{start_server, WebSocketState, DEFAULT_WS_PORT};

#[tokio::main]
async fn main() {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let port = match std::env::var("UISCOPE_WS_PORT") {
    Ok(raw) => raw.parse().unwrap_or_else(|e| {
      log::warn!("ignoring UISCOPE_WS_PORT={raw:?}: {e}");
      DEFAULT_WS_PORT
    }),
    Err(_) => DEFAULT_WS_PORT,
  };

  let builder = std::env::var("UISCOPE_DENYLIST")
    .unwrap_or_default()
    .split(',')
    .map(str::trim)
    .filter(|id| !id.is_empty())
    .fold(Session::builder(), |builder, id| {
      log::debug!("denying resource-id {id}");
      builder.deny_resource_id(id)
    });

  start_server(WebSocketState::with_builder(builder, OverlayTheme::default(), port)).await;
}
