//! Clients of the services that own chats and messages.
//!
//! The relay only asks two questions of them: whether a user belongs to a
//! chat, and to persist a message before it is broadcast.

mod chat;
mod messenger;

// Generated from proto/*.proto by build.rs
pub mod proto {
    pub mod chat {
        tonic::include_proto!("chat");
    }
    pub mod messenger {
        tonic::include_proto!("messenger");
    }
}

pub use chat::GrpcChatClient;
pub use messenger::GrpcMessengerClient;

use crate::core::{constant::BEARER_PREFIX, Error};
use async_trait::async_trait;
use std::time::Duration;
use time::OffsetDateTime;
use tonic::transport::{Channel, Endpoint};
use uuid::Uuid;

/// Decides who participates in which chat
#[async_trait]
pub trait ChatAuthority: Send + Sync {
    async fn user_chat_exists(
        &self,
        user_id: Uuid,
        chat_id: Uuid,
        token: &str,
    ) -> Result<bool, Error>;
}

/// Durable storage for chat messages
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist the message and return its id
    async fn send_message(&self, msg: &NewMessage, token: &str) -> Result<String, Error>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub sent_at: OffsetDateTime,
}

/// Create a channel that connects on first use
pub fn connect(addr: &str, timeout: Duration) -> Result<Channel, Error> {
    let channel = Endpoint::from_shared(addr.to_owned())?
        .connect_timeout(timeout)
        .timeout(timeout)
        .connect_lazy();
    Ok(channel)
}

/// Wrap the message in a request carrying the caller's bearer token
fn authorized<T>(message: T, token: &str) -> Result<tonic::Request<T>, Error> {
    let mut request = tonic::Request::new(message);
    let value = format!("{}{}", BEARER_PREFIX, token)
        .parse()
        .map_err(|_| Error::Unauthorized)?;
    request.metadata_mut().insert("authorization", value);
    Ok(request)
}

// ============================== // mock // ============================== //


// ============================== // tests // ============================== //
