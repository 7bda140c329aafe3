//! Operations a client can trigger over its connection.
//!
//! Each one validates its input, checks the user's participation with the
//! chat service, then touches the hub.

use super::event::{
    ConnectRequest, DisconnectRequest, Envelope, OutgoingMessage, SendMessageRequest,
};
use super::session::Session;
use crate::rpc::NewMessage;
use crate::{core::Error, AppState};
use time::OffsetDateTime;
use validator::Validate;

/// Join the chat named in the envelope
pub async fn connect(state: &AppState, session: &Session, envelope: Envelope) -> Result<(), Error> {
    let req = ConnectRequest::try_from(envelope)?;
    req.validate()?;
    let user_id = session.user_id();

    // check whether the user is a participant of the chat
    let exists = state
        .chats
        .user_chat_exists(user_id, req.chat_id, session.token())
        .await?;
    if !exists {
        return Err(Error::NotParticipant);
    }

    state.hub.join(session.client(), req.chat_id).await
}

/// Persist a message, then fan it out to the chat
pub async fn send_message(
    state: &AppState,
    session: &Session,
    envelope: Envelope,
) -> Result<(), Error> {
    let req = SendMessageRequest::try_from(envelope)?;
    req.validate()?;
    let user_id = session.user_id();

    // check whether the user is a participant of the chat
    let exists = state
        .chats
        .user_chat_exists(user_id, req.chat_id, session.token())
        .await?;
    if !exists {
        return Err(Error::NotParticipant);
    }

    // a participant may still not have this chat open
    if !state.hub.is_member(user_id, req.chat_id).await {
        return Err(Error::NotConnected);
    }

    // store the message before anyone sees it
    let msg = NewMessage {
        chat_id: req.chat_id,
        user_id,
        text: req.text,
        sent_at: OffsetDateTime::now_utc(),
    };
    let id = state.messages.send_message(&msg, session.token()).await?;

    let out = OutgoingMessage::new(id, msg);
    let delivered = state.hub.broadcast(out.chat_id, &out).await?;
    tracing::debug!(
        "message {} from {} delivered to {} clients in chat {}",
        out.id,
        user_id,
        delivered,
        out.chat_id
    );

    Ok(())
}

/// Leave whatever chat the user is in
pub async fn disconnect(
    state: &AppState,
    session: &Session,
    envelope: Envelope,
) -> Result<(), Error> {
    let req = DisconnectRequest::from(envelope);
    let room_id = state.hub.leave(session.client()).await?;

    if req.chat_id.is_some_and(|id| id != room_id) {
        tracing::debug!(
            "client {} asked to leave chat {:?} but was in {}",
            session.user_id(),
            req.chat_id,
            room_id
        );
    }
    Ok(())
}

// ============================== // tests // ============================== //
