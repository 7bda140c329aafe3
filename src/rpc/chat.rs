use super::proto::chat::{chat_service_client::ChatServiceClient, UserChatExistsRequest};
use super::{authorized, ChatAuthority};
use crate::core::Error;
use async_trait::async_trait;
use tonic::transport::Channel;
use uuid::Uuid;

/// Client of `chat.ChatService`
#[derive(Clone)]
pub struct GrpcChatClient {
    inner: ChatServiceClient<Channel>,
}

impl GrpcChatClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: ChatServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl ChatAuthority for GrpcChatClient {
    async fn user_chat_exists(
        &self,
        user_id: Uuid,
        chat_id: Uuid,
        token: &str,
    ) -> Result<bool, Error> {
        let req = UserChatExistsRequest {
            user_id: user_id.to_string(),
            chat_id: chat_id.to_string(),
        };
        let request = authorized(req, token)?;

        let rsp = self.inner.clone().user_chat_exists(request).await?;
        Ok(rsp.into_inner().exists)
    }
}
