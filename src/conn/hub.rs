use super::{client::Client, state::HubState};
use crate::api::HubStatusResponse;
use crate::core::Error;
use axum::extract::ws::Message;
use futures::future::join_all;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Registry of connected clients and the chats they are in.
///
/// The lock is never held across a socket write: `broadcast` snapshots the
/// members, releases the lock, then delivers.
pub struct Hub {
    inner: RwLock<HubState>,
    send_timeout: Duration,
}

impl Hub {
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            inner: RwLock::new(HubState::default()),
            send_timeout,
        }
    }

    /// Register a new connection, returning the stale one it replaced
    pub async fn register(&self, client: Client) -> Option<Client> {
        let mut inner = self.inner.write().await;
        inner.register_client(client)
    }

    /// Remove the connection and its chat membership; a no-op if the
    /// connection is no longer registered
    pub async fn deregister(&self, client: &Client) -> bool {
        let mut inner = self.inner.write().await;
        inner.unregister_client(client)
    }

    pub async fn is_member(&self, user_id: Uuid, room_id: Uuid) -> bool {
        let inner = self.inner.read().await;
        inner.is_user_in(&user_id, &room_id)
    }

    /// Move the connection into the room; fails once the connection has
    /// been replaced or evicted
    pub async fn join(&self, client: &Client, room_id: Uuid) -> Result<(), Error> {
        let mut inner = self.inner.write().await;
        inner.join_room(client, room_id)
    }

    pub async fn leave(&self, client: &Client) -> Result<Uuid, Error> {
        let mut inner = self.inner.write().await;
        inner.leave_room(client)
    }

    pub async fn lookup(&self, user_id: Uuid) -> Option<Client> {
        let inner = self.inner.read().await;
        inner.client(&user_id)
    }

    /// Whether this exact connection is still the one registered for its user
    pub async fn is_registered(&self, client: &Client) -> bool {
        let inner = self.inner.read().await;
        inner
            .client(&client.user_id())
            .is_some_and(|c| c.id() == client.id())
    }

    pub async fn user_room(&self, user_id: Uuid) -> Option<Uuid> {
        let inner = self.inner.read().await;
        inner.user_room(&user_id)
    }

    pub async fn status(&self) -> HubStatusResponse {
        let inner = self.inner.read().await;
        inner.status()
    }

    /// Send the payload to every member of the room, returning how many
    /// members it reached.
    ///
    /// A member whose queue is closed or stays full is evicted; the others
    /// still receive the payload.
    pub async fn broadcast<T: Serialize>(
        &self,
        room_id: Uuid,
        payload: &T,
    ) -> Result<usize, Error> {
        let msg = Message::Text(serde_json::to_string(payload)?);

        let members = {
            let inner = self.inner.read().await;
            inner.members(&room_id)?
        };

        let results = join_all(members.iter().map(|client| {
            let msg = msg.clone();
            async move { client.send_timeout(msg, self.send_timeout).await }
        }))
        .await;

        let mut delivered = 0;
        for (client, ok) in members.iter().zip(results) {
            if ok {
                delivered += 1;
                continue;
            }
            tracing::warn!(
                "failed to send message to client {} in chat {}, removing client",
                client.user_id(),
                room_id
            );
            self.deregister(client).await;
        }

        Ok(delivered)
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

// ============================== // tests // ============================== //
