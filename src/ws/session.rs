use super::event::{Envelope, ErrorEvent};
use crate::core::constant::CLOSE_REASON_REPLACED;
use crate::{conn::Client, core::Error, AppState};
use axum::extract::ws::Message;
use futures::{Stream, StreamExt};
use std::{fmt::Display, future::Future};
use uuid::Uuid;

/// Identity and credential of one connection, fixed at upgrade time
pub struct Session {
    client: Client,
    token: String,
}

impl Session {
    pub fn new(client: Client, token: String) -> Self {
        Self { client, token }
    }

    /// Register the connection, closing the one it supersedes
    pub async fn open(state: &AppState, client: Client, token: String) -> Self {
        if let Some(stale) = state.hub.register(client.clone()).await {
            stale
                .close(CLOSE_REASON_REPLACED, state.config.send_timeout)
                .await;
        }
        Self::new(client, token)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn user_id(&self) -> Uuid {
        self.client.user_id()
    }

    /// Bearer token forwarded to the chat and messenger services
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Serve the connection until it ends or `closed` resolves, then
    /// deregister it.
    ///
    /// `closed` completes when the writer side of the connection has gone.
    pub async fn run<S, E, F>(
        &self,
        state: &AppState,
        receiver: S,
        closed: F,
    ) -> Result<(), Error>
    where
        S: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
        F: Future<Output = ()>,
    {
        let res = tokio::select! {
            res = self.serve(state, receiver) => res,
            _ = closed => Ok(()),
        };

        state.hub.deregister(&self.client).await;
        res
    }

    /// Relay inbound frames to the dispatcher until the connection ends.
    ///
    /// Returns `Ok` on a clean close, and the transport or protocol error
    /// that ended the connection otherwise.
    pub async fn serve<S, E>(&self, state: &AppState, mut receiver: S) -> Result<(), Error>
    where
        S: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
    {
        while let Some(frame) = receiver.next().await {
            let msg = frame.map_err(|e| {
                tracing::debug!("websocket read error: {}", e);
                Error::ReadMessage
            })?;

            let envelope = match msg {
                Message::Text(text) => Envelope::decode(text.as_bytes())?,
                Message::Binary(data) => Envelope::decode(&data)?,
                Message::Close(_) => {
                    tracing::debug!("Receive close message from client");
                    return Ok(());
                }
                Message::Ping(_) | Message::Pong(_) => continue,
            };

            // a replaced or evicted connection must not act for its user
            if !state.hub.is_registered(&self.client).await {
                tracing::debug!("client {} is no longer registered", self.client.id());
                return Err(Error::ClientNotFound);
            }

            self.handle(state, envelope).await?;
        }
        Ok(())
    }

    /// Dispatch one envelope and report business errors back to the client
    async fn handle(&self, state: &AppState, envelope: Envelope) -> Result<(), Error> {
        let kind = envelope.kind.clone();

        let err = match state.dispatcher.dispatch(state, self, envelope).await {
            Ok(()) => return Ok(()),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => err,
        };

        tracing::debug!("{} from client {} failed: {}", kind, self.user_id(), err);
        let msg = ErrorEvent::from(&err).to_msg()?;
        if !self.client.send(msg).await {
            return Err(Error::SendMessage);
        }
        Ok(())
    }
}

// ============================== // tests // ============================== //
