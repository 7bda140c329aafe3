mod dispatch;
mod event;
mod handler;
mod operation;
mod session;

use crate::AppState;
use axum::{routing::get, Router};
pub use dispatch::Dispatcher;
use std::sync::Arc;

// ========================// WebSocket Router //======================== //

/// Create ws router
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ws", get(handler::ws_handler))
}
