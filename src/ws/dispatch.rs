use super::{event::Envelope, operation, session::Session};
use crate::core::constant::{TYPE_CONNECT, TYPE_DISCONNECT, TYPE_SEND};
use crate::{core::Error, AppState};
use std::collections::HashMap;

/// The message types a client may send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Connect,
    Send,
    Disconnect,
}

impl MessageKind {
    pub const ALL: [MessageKind; 3] = [
        MessageKind::Connect,
        MessageKind::Send,
        MessageKind::Disconnect,
    ];

    /// The `type` tag used on the wire
    pub fn tag(self) -> &'static str {
        match self {
            MessageKind::Connect => TYPE_CONNECT,
            MessageKind::Send => TYPE_SEND,
            MessageKind::Disconnect => TYPE_DISCONNECT,
        }
    }
}

/// Routes an inbound envelope to the operation registered for its type
pub struct Dispatcher {
    routes: HashMap<&'static str, MessageKind>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let routes = MessageKind::ALL
            .into_iter()
            .map(|kind| (kind.tag(), kind))
            .collect();
        Self { routes }
    }

    pub fn route(&self, tag: &str) -> Result<MessageKind, Error> {
        self.routes
            .get(tag)
            .copied()
            .ok_or_else(|| Error::UnsupportedType(tag.to_owned()))
    }

    pub async fn dispatch(
        &self,
        state: &AppState,
        session: &Session,
        envelope: Envelope,
    ) -> Result<(), Error> {
        match self.route(&envelope.kind)? {
            MessageKind::Connect => operation::connect(state, session, envelope).await,
            MessageKind::Send => operation::send_message(state, session, envelope).await,
            MessageKind::Disconnect => operation::disconnect(state, session, envelope).await,
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

// ============================== // tests // ============================== //
