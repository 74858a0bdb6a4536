/*!
WebSocket server implementation.
*/

use async_broadcast::RecvError;
use axum::{
  extract::{
    ws::{Message, WebSocket, WebSocketUpgrade},
    State,
  },
  response::Response,
  routing::get,
  Router,
};
use log::error;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use uiscope::overlay::OverlayTheme;
use uiscope::{Event, Session, SessionBuilder};

use crate::views::{self, RemoteSurface, RemoteView, ServerMessage};

/// Default WebSocket server port.
pub const DEFAULT_WS_PORT: u16 = 3131;
const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// WebSocket state.
#[derive(Clone)]
pub struct WebSocketState {
  session: Arc<Mutex<Session>>,
  json_sender: Arc<broadcast::Sender<String>>,
  port: u16,
}

impl std::fmt::Debug for WebSocketState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("WebSocketState")
      .field("port", &self.port)
      .finish_non_exhaustive()
  }
}

impl Default for WebSocketState {
  fn default() -> Self {
    Self::new()
  }
}

impl WebSocketState {
  /// Create with default port and session configuration.
  pub fn new() -> Self {
    Self::with_port(DEFAULT_WS_PORT)
  }

  /// Create with custom port.
  pub fn with_port(port: u16) -> Self {
    Self::with_builder(Session::builder(), OverlayTheme::default(), port)
  }

  /// Create from a configured session builder. Its views are replaced with
  /// ones that forward to connected clients.
  pub fn with_builder(builder: SessionBuilder, theme: OverlayTheme, port: u16) -> Self {
    let (json_tx, _) = broadcast::channel::<String>(DEFAULT_CHANNEL_CAPACITY);
    let json_sender = Arc::new(json_tx);
    let view = RemoteView::new(Arc::clone(&json_sender));
    let session = builder
      .surface(RemoteSurface::new(theme, Arc::clone(&json_sender)))
      .tree_view(view.clone())
      .properties_panel(view.clone())
      .tooltip(view)
      .build();
    Self {
      session: Arc::new(Mutex::new(session)),
      json_sender,
      port,
    }
  }

  /// Port the server binds to.
  pub const fn port(&self) -> u16 {
    self.port
  }

  /// Push a message to every connected client.
  pub fn broadcast(&self, message: &ServerMessage) {
    views::send(&self.json_sender, message);
  }
}

/// Start the WebSocket server.
pub async fn start_server(ws_state: WebSocketState) {
  let port = ws_state.port;
  let sender = ws_state.json_sender.clone();
  let rx = ws_state.session.lock().subscribe();
  tokio::spawn(forward_events(rx, sender));

  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods(Any)
    .allow_headers(Any);

  let app = Router::new()
    .route("/ws", get(websocket_handler))
    .layer(cors)
    .with_state(ws_state);

  let addr = format!("127.0.0.1:{port}");
  let listener = match tokio::net::TcpListener::bind(&addr).await {
    Ok(l) => l,
    Err(e) => {
      error!("Failed to bind WebSocket server to {addr}: {e}");
      std::process::exit(1);
    }
  };

  log::info!("WebSocket server: ws://{addr}/ws");

  if let Err(e) = axum::serve(listener, app).await {
    error!("WebSocket server failed: {e}");
    std::process::exit(1);
  }
}

/// Relay session events to the client channel until the session is dropped.
async fn forward_events(
  mut rx: async_broadcast::Receiver<Event>,
  sender: Arc<broadcast::Sender<String>>,
) {
  loop {
    match rx.recv().await {
      Ok(event) => match serde_json::to_string(&event) {
        Ok(json) => drop(sender.send(json)),
        Err(e) => error!("[ws] failed to serialize event: {e}"),
      },
      Err(RecvError::Overflowed(n)) => {
        log::warn!("[ws] event forwarder lagged, skipped {n} events");
      }
      Err(RecvError::Closed) => break,
    }
  }
}

async fn websocket_handler(
  ws: WebSocketUpgrade,
  State(ws_state): State<WebSocketState>,
) -> Response {
  ws.on_upgrade(|socket| handle_websocket(socket, ws_state))
}

async fn handle_websocket(mut socket: WebSocket, ws_state: WebSocketState) {
  let mut rx = ws_state.json_sender.subscribe();
  let session = Arc::clone(&ws_state.session);
  let init_result = tokio::task::spawn_blocking(move || session.lock().snapshot()).await;

  let Ok(init) = init_result else {
    return;
  };

  if let Ok(msg) = serde_json::to_string(&ServerMessage::SyncInit(init)) {
    if socket.send(Message::Text(msg)).await.is_err() {
      return;
    }
  }

  // Bring the new client's views up to date.
  let session = Arc::clone(&ws_state.session);
  drop(tokio::task::spawn_blocking(move || session.lock().render()).await);

  loop {
    tokio::select! {
        msg = socket.recv() => {
            match msg {
                Some(Ok(Message::Text(text))) => {
                    let response = handle_request_async(&text, &ws_state).await;
                    while let Ok(event_json) = rx.try_recv() {
                        drop(socket.send(Message::Text(event_json)).await);
                    }
                    drop(socket.send(Message::Text(response)).await);
                }
                Some(Ok(Message::Close(_))) => {
                    log::info!("[client] closed connection");
                    break;
                }
                Some(Err(e)) => {
                    log::warn!("WebSocket error: {e}");
                    break;
                }
                None => {
                    log::info!("[client] disconnected");
                    break;
                }
                _ => {}
            }
        }

        broadcast = rx.recv() => {
            match broadcast {
                Ok(event_json) => {
                    if socket.send(Message::Text(event_json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    log::warn!("[ws] Client lagged, dropped {n} messages - client needs resync");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
  }
}

async fn handle_request_async(request: &str, ws_state: &WebSocketState) -> String {
  let parsed: Result<Value, _> = serde_json::from_str(request);

  let req = match parsed {
    Ok(v) => v,
    Err(e) => return json!({ "error": format!("Invalid JSON: {}", e) }).to_string(),
  };

  let id = req.get("id").cloned().unwrap_or(Value::Null);
  let method = req
    .get("method")
    .and_then(Value::as_str)
    .unwrap_or("")
    .to_string();
  let args = req.get("args").cloned().unwrap_or(Value::Null);

  let session = Arc::clone(&ws_state.session);
  let dispatch_result = tokio::task::spawn_blocking(move || {
    crate::rpc::dispatch_json(&mut session.lock(), &method, &args)
  })
  .await;

  let mut response = match dispatch_result {
    Ok(r) => r,
    Err(_) => json!({ "error": "RPC task panicked" }),
  };
  if let Some(obj) = response.as_object_mut() {
    obj.insert("id".to_string(), id);
  }
  response.to_string()
}
