mod router;
mod status;

pub use router::make_app;

use crate::conn::Hub;
use crate::core::Error;
use crate::rpc::{self, ChatAuthority, GrpcChatClient, GrpcMessengerClient, MessageStore};
use crate::util::token::JwtToken;
use crate::ws::Dispatcher;
use crate::Config;
use serde::Serialize;
use std::sync::Arc;

// ========================// AppState //======================== //

/// Shared state of every handler and connection
pub struct AppState {
    pub config: Config,
    pub hub: Hub,
    pub dispatcher: Dispatcher,
    pub jwt: JwtToken,
    pub chats: Arc<dyn ChatAuthority>,
    pub messages: Arc<dyn MessageStore>,
}

impl AppState {
    /// Build the state with gRPC clients for the chat and messenger services
    pub fn new(config: Config) -> Result<Arc<Self>, Error> {
        let chat_channel = rpc::connect(&config.chat_service_addr, config.rpc_timeout)?;
        let message_channel = rpc::connect(&config.message_service_addr, config.rpc_timeout)?;

        let chats = Arc::new(GrpcChatClient::new(chat_channel));
        let messages = Arc::new(GrpcMessengerClient::new(message_channel));
        Ok(Self::with_services(config, chats, messages))
    }

    pub fn with_services(
        config: Config,
        chats: Arc<dyn ChatAuthority>,
        messages: Arc<dyn MessageStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            hub: Hub::new(config.send_timeout),
            dispatcher: Dispatcher::new(),
            jwt: JwtToken::new(&config),
            config,
            chats,
            messages,
        })
    }
}

// ========================// Status //======================== //

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubStatusResponse {
    pub num_clients: usize,
    pub num_rooms: usize,
}
