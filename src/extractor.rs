use crate::core::{constant::TOKEN_QUERY_KEY, Error};
use crate::AppState;
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    typed_header::TypedHeaderRejectionReason,
    TypedHeader,
};
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

// ========================// SocketGuard //======================== //

/// Provide authentication for websocket connection.
///
/// The token comes from the `Authorization` header, or from the `token`
/// query parameter when the header is absent.
pub struct SocketGuard {
    pub user_id: Uuid,
    pub token: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for SocketGuard {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
        {
            Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_owned(),
            Err(e) if matches!(e.reason(), TypedHeaderRejectionReason::Missing) => {
                token_from_query(parts, state).await?
            }
            Err(e) => return Err(e.into()),
        };

        let claims = state.jwt.verify(&token)?;
        Ok(SocketGuard {
            user_id: claims.sub,
            token,
        })
    }
}

// Browsers cannot set headers on a websocket handshake
async fn token_from_query(parts: &mut Parts, state: &Arc<AppState>) -> Result<String, Error> {
    let Query(mut query) =
        Query::<HashMap<String, String>>::from_request_parts(parts, state).await?;
    query
        .remove(TOKEN_QUERY_KEY)
        .filter(|token| !token.is_empty())
        .ok_or(Error::Unauthorized)
}

// ============================== // tests // ============================== //
