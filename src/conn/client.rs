use axum::extract::ws::{CloseFrame, Message};
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A connected user as seen by the hub.
///
/// Cloning is cheap: every clone shares the same outbound queue, which the
/// connection's writer task drains into the socket.
#[derive(Clone, Debug)]
pub struct Client {
    id: Uuid,
    user_id: Uuid,
    tx: mpsc::Sender<Message>,
}

impl Client {
    pub fn new(user_id: Uuid, tx: mpsc::Sender<Message>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            tx,
        }
    }

    /// Identifies this connection, unlike `user_id` which survives reconnects
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub async fn send(&self, msg: Message) -> bool {
        self.tx.send(msg).await.is_ok()
    }

    /// Enqueue a frame, giving up if the queue stays full for `timeout`
    pub async fn send_timeout(&self, msg: Message, timeout: Duration) -> bool {
        self.tx.send_timeout(msg, timeout).await.is_ok()
    }

    /// Ask the writer task to close the socket
    pub async fn close(&self, reason: &'static str, timeout: Duration) -> bool {
        let msg = Message::Close(Some(CloseFrame {
            code: 1000,
            reason: reason.into(),
        }));
        self.send_timeout(msg, timeout).await
    }
}
