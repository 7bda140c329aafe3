use super::proto::messenger::{messenger_client::MessengerClient, SendMessageRequest};
use super::{authorized, MessageStore, NewMessage};
use crate::core::Error;
use async_trait::async_trait;
use time::OffsetDateTime;
use tonic::transport::Channel;

/// Client of `messenger.Messenger`
#[derive(Clone)]
pub struct GrpcMessengerClient {
    inner: MessengerClient<Channel>,
}

impl GrpcMessengerClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: MessengerClient::new(channel),
        }
    }
}

#[async_trait]
impl MessageStore for GrpcMessengerClient {
    async fn send_message(&self, msg: &NewMessage, token: &str) -> Result<String, Error> {
        let req = SendMessageRequest {
            sent_at: Some(timestamp(msg.sent_at)),
            text: msg.text.clone(),
            user_id: msg.user_id.to_string(),
            chat_id: msg.chat_id.to_string(),
        };
        let request = authorized(req, token)?;

        let rsp = self.inner.clone().send_message(request).await?.into_inner();
        if !rsp.success {
            return Err(Error::Rejected);
        }
        Ok(rsp.id)
    }
}

fn timestamp(dt: OffsetDateTime) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: dt.unix_timestamp(),
        nanos: dt.nanosecond() as i32,
    }
}

// ============================== // tests // ============================== //
