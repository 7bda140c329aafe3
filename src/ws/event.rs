//! Frames exchanged over the WebSocket

use crate::core::validator as VAL;
use crate::core::{Error, ErrorKind};
use crate::rpc::NewMessage;
use axum::extract::ws::Message;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

// ============================== // Inbound // ============================== //

/// One inbound frame.
///
/// `kind` is kept as a raw string so that unknown types still decode and can
/// be rejected by the dispatcher without dropping the connection.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl Envelope {
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(data).map_err(|e| {
            tracing::debug!("failed to decode frame: {}", e);
            Error::Protocol
        })
    }

    fn chat_id(&self) -> Result<Uuid, Error> {
        let raw = self.chat_id.as_deref().ok_or(Error::InvalidChatId)?;
        Uuid::parse_str(raw).map_err(|_| Error::InvalidChatId)
    }
}

#[derive(Debug, Validate)]
pub struct ConnectRequest {
    #[validate(custom = "VAL::validate_chat_id")]
    pub chat_id: Uuid,
}

impl TryFrom<Envelope> for ConnectRequest {
    type Error = Error;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        Ok(Self {
            chat_id: envelope.chat_id()?,
        })
    }
}

#[derive(Debug, Validate)]
pub struct SendMessageRequest {
    #[validate(custom = "VAL::validate_chat_id")]
    pub chat_id: Uuid,
    #[validate(
        length(min = 1, max = 500, message = "Must be between 1 and 500 characters"),
        custom = "VAL::validate_not_blank"
    )]
    pub text: String,
}

impl TryFrom<Envelope> for SendMessageRequest {
    type Error = Error;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let chat_id = envelope.chat_id()?;
        Ok(Self {
            chat_id,
            text: envelope.text.unwrap_or_default(),
        })
    }
}

/// The chat id of a disconnect is informational; the hub knows the room
#[derive(Debug)]
pub struct DisconnectRequest {
    pub chat_id: Option<Uuid>,
}

impl From<Envelope> for DisconnectRequest {
    fn from(envelope: Envelope) -> Self {
        Self {
            chat_id: envelope.chat_id().ok(),
        }
    }
}

// ============================== // Outbound // ============================== //

/// A chat message fanned out to the members of a chat
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub id: String,
    pub chat_id: Uuid,
    pub sender_id: Uuid,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
}

impl OutgoingMessage {
    /// Build the frame for a persisted message
    pub fn new(id: String, msg: NewMessage) -> Self {
        let id = if id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            id
        };
        Self {
            id,
            chat_id: msg.chat_id,
            sender_id: msg.user_id,
            text: msg.text,
            sent_at: msg.sent_at,
        }
    }
}

/// A request failed; the connection stays open
#[derive(Serialize, Debug)]
pub struct ErrorEvent {
    pub error: ErrorBody,
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorEvent {
    pub fn to_msg(&self) -> Result<Message, Error> {
        serde_json::to_string(self)
            .map(Message::Text)
            .map_err(|_| Error::SerializeMessage)
    }
}

impl From<&Error> for ErrorEvent {
    fn from(err: &Error) -> Self {
        Self {
            error: ErrorBody {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }
}

// ============================== // tests // ============================== //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn decode_envelope() {
        let chat_id = Uuid::new_v4();
        let data = json!({ "type": "sendMessage", "chatId": chat_id, "text": "hi" }).to_string();

        let envelope = Envelope::decode(data.as_bytes()).unwrap();
        assert_eq!(envelope.kind, "sendMessage");

        let req = SendMessageRequest::try_from(envelope).unwrap();
        assert_eq!(req.chat_id, chat_id);
        assert_eq!(req.text, "hi");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn unknown_type_still_decodes() {
        let envelope = Envelope::decode(br#"{"type":"typing"}"#).unwrap();
        assert_eq!(envelope.kind, "typing");
        assert!(envelope.chat_id.is_none());
    }

    #[test]
    fn malformed_frames() {
        assert!(matches!(Envelope::decode(b"hello"), Err(Error::Protocol)));
        assert!(matches!(Envelope::decode(br#"{"chatId":"x"}"#), Err(Error::Protocol)));
        assert!(matches!(Envelope::decode(br#"[1,2]"#), Err(Error::Protocol)));
    }

    #[test]
    fn malformed_chat_id_is_a_validation_error() {
        let data = br#"{"type":"connectUserToChat","chatId":"nope"}"#;
        let envelope = Envelope::decode(data).unwrap();
        let err = ConnectRequest::try_from(envelope).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let envelope = Envelope::decode(br#"{"type":"connectUserToChat"}"#).unwrap();
        assert!(matches!(
            ConnectRequest::try_from(envelope),
            Err(Error::InvalidChatId)
        ));
    }

    #[test]
    fn nil_chat_id_fails_validation() {
        let req = ConnectRequest {
            chat_id: Uuid::nil(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn text_limits() {
        let chat_id = Uuid::new_v4();
        let blank = SendMessageRequest {
            chat_id,
            text: "   ".into(),
        };
        assert!(blank.validate().is_err());

        let empty = SendMessageRequest {
            chat_id,
            text: String::new(),
        };
        assert!(empty.validate().is_err());

        let long = SendMessageRequest {
            chat_id,
            text: "x".repeat(501),
        };
        assert!(long.validate().is_err());

        let max = SendMessageRequest {
            chat_id,
            text: "é".repeat(500),
        };
        assert!(max.validate().is_ok());
    }

    #[test]
    fn outgoing_message_shape() {
        let msg = NewMessage {
            chat_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            text: "hi".into(),
            sent_at: OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        };
        let out = OutgoingMessage::new("42".into(), msg.clone());

        let value: Value = serde_json::to_value(&out).unwrap();
        assert_eq!(value["id"], "42");
        assert_eq!(value["chatId"], msg.chat_id.to_string());
        assert_eq!(value["senderId"], msg.user_id.to_string());
        assert_eq!(value["text"], "hi");
        assert_eq!(value["sentAt"], "2023-11-14T22:13:20Z");

        let out = OutgoingMessage::new(String::new(), msg);
        assert!(Uuid::parse_str(&out.id).is_ok());
    }

    #[test]
    fn error_frame_shape() {
        let msg = ErrorEvent::from(&Error::NotConnected).to_msg().unwrap();
        let Message::Text(text) = msg else {
            panic!("expected a text frame");
        };
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["error"]["kind"], "state");
        assert_eq!(
            value["error"]["message"],
            "Client is not connected to this chat"
        );
    }
}
