use super::session::Session;
use crate::{conn::Client, extractor::SocketGuard, AppState};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::{sync::mpsc, time};

// ========================// Websocket Handler //======================== //

/// Handler of the websocket router
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    skg: SocketGuard,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| websocket(socket, state, skg))
}

/// Actual websocket statemachine
async fn websocket(socket: WebSocket, state: Arc<AppState>, skg: SocketGuard) {
    // create a mpsc channel for passing message
    let capacity = state.config.user_channel_capacity;
    let (tx, mut rx) = mpsc::channel(capacity);

    let client = Client::new(skg.user_id, tx);
    let session = Session::open(&state, client.clone(), skg.token).await;

    // by splitting, we can send and receive at the same time
    let (mut sender, receiver) = socket.split();

    // this task will receive message from mpsc channel and send to client
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            // the task will be terminated if the closing signal is sent
            if let Message::Close(_) = msg {
                let _ = sender.send(msg).await;
                break;
            };

            if sender.send(msg).await.is_err() {
                break;
            }
        }
        tracing::debug!("Close socket from send task");
    });

    // this task pings the client and stops once the hub has evicted it
    let mut heart_task = {
        let state = state.clone();
        tokio::spawn(async move {
            let mut interval = time::interval(state.config.heartbeat_interval);
            loop {
                interval.tick().await;
                if !state.hub.is_registered(&client).await {
                    break;
                }
                if !client.send(Message::Ping(Vec::new())).await {
                    break;
                }
            }
            tracing::debug!("Close socket from heart task");
        })
    };

    // the socket is done once the writer or the heartbeat stops
    let closed = async {
        tokio::select! {
            _ = (&mut send_task) => {}
            _ = (&mut heart_task) => {}
        }
    };

    // read client messages here, deregistering from the hub when done
    match session.run(&state, receiver, closed).await {
        Ok(()) => tracing::debug!("Close socket from recv task"),
        Err(e) => tracing::debug!("Close socket from recv task: {}", e),
    }

    send_task.abort();
    heart_task.abort();
    tracing::debug!(
        "Disconnect WebSocket {} {}",
        session.user_id(),
        session.client().id()
    );
}
