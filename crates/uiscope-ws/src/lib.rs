/*! uiscope JSON-RPC over WebSocket. */

mod rpc;
mod server;
mod views;

pub use rpc::{dispatch, dispatch_json, ContextPayload, RpcRequest, RpcResponse};
pub use server::{start_server, WebSocketState, DEFAULT_WS_PORT};
pub use views::ServerMessage;
