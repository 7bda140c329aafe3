use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::typed_header::TypedHeaderRejection;
use serde::Serialize;
use tokio::sync::mpsc;

/// A common error type that can be used throughout the App
#[derive(thiserror::Error, Debug)]
pub enum Error {
    // Validation
    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),
    #[error("Invalid chat ID")]
    InvalidChatId,

    // Authorization
    #[error("Token is expired")]
    ExpiredToken,
    #[error("Authentication required")]
    Unauthorized,
    #[error("User is not a participant of this chat")]
    NotParticipant,

    // NotFound
    #[error("Client not found")]
    ClientNotFound,
    #[error("Chat not found")]
    ChatNotFound,

    // State
    #[error("Client is not connected to any chat")]
    NotInRoom,
    #[error("Client is not connected to this chat")]
    NotConnected,

    // Dispatcher
    #[error("Unsupported message type: {0}")]
    UnsupportedType(String),

    // Upstream
    #[error("Upstream service error: {}", .0.message())]
    Upstream(#[from] tonic::Status),
    #[error("Upstream service rejected the message")]
    Rejected,

    // Transport
    #[error("Failed to send websocket message")]
    SendMessage,
    #[error("Failed to read websocket message")]
    ReadMessage,
    #[error("Malformed websocket message")]
    Protocol,

    // Internal
    #[error(transparent)]
    QueryRejection(#[from] QueryRejection),
    #[error(transparent)]
    TypedHeaderRejection(#[from] TypedHeaderRejection),
    #[error(transparent)]
    RpcTransport(#[from] tonic::transport::Error),
    #[error("Failed to serialize websocket message")]
    SerializeMessage,
}

/// Error categories reported back to the client
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Authorization,
    NotFound,
    State,
    Unsupported,
    Upstream,
    Transport,
    Internal,
}

// Convert mpsc send error to Error
impl<T> From<mpsc::error::SendError<T>> for Error {
    fn from(_: mpsc::error::SendError<T>) -> Self {
        Self::SendMessage
    }
}

impl From<serde_json::Error> for Error {
    fn from(_: serde_json::Error) -> Self {
        Self::SerializeMessage
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::InvalidChatId => ErrorKind::Validation,
            Error::ExpiredToken | Error::Unauthorized | Error::NotParticipant => {
                ErrorKind::Authorization
            }
            Error::ClientNotFound | Error::ChatNotFound => ErrorKind::NotFound,
            Error::NotInRoom | Error::NotConnected => ErrorKind::State,
            Error::UnsupportedType(_) => ErrorKind::Unsupported,
            Error::Upstream(_) | Error::Rejected => ErrorKind::Upstream,
            Error::SendMessage | Error::ReadMessage | Error::Protocol => ErrorKind::Transport,
            Error::QueryRejection(_)
            | Error::TypedHeaderRejection(_)
            | Error::RpcTransport(_)
            | Error::SerializeMessage => ErrorKind::Internal,
        }
    }

    /// Whether the connection must be torn down after this error
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::Internal)
    }

    pub fn into_error(self) -> (StatusCode, String) {
        let status = match self {
            // 401
            Error::ExpiredToken => StatusCode::UNAUTHORIZED,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::TypedHeaderRejection(_) => StatusCode::UNAUTHORIZED,
            // 403
            Error::NotParticipant => StatusCode::FORBIDDEN,
            // 422
            Error::QueryRejection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => {
                tracing::error!("{}", self.to_string());
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server internal error".into(),
                );
            }
        };
        (status, self.to_string())
    }
}

// Axum allows you to return Error which impl IntoResponse
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_error().into_response()
    }
}

// ============================== // tests // ============================== //
