pub const TOKEN_QUERY_KEY: &str = "token";
pub const BEARER_PREFIX: &str = "Bearer ";

// Inbound message types
pub const TYPE_CONNECT: &str = "connectUserToChat";
pub const TYPE_SEND: &str = "sendMessage";
pub const TYPE_DISCONNECT: &str = "disconnectUserFromChat";

pub const CLOSE_REASON_REPLACED: &str = "You have connected elsewhere";
