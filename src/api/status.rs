//! Handlers for hub diagnostics

use super::{AppState, HubStatusResponse};
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(hub_status))
}

async fn hub_status(State(state): State<Arc<AppState>>) -> Json<HubStatusResponse> {
    Json(state.hub.status().await)
}

// ============================== // tests // ============================== //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conn::Client;
    use crate::rpc::mock::{MockChats, MockMessages};
    use crate::Config;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    #[tokio::test]
    async fn status_counts_clients_and_rooms() {
        let state = AppState::with_services(
            Config::default(),
            Arc::new(MockChats::default()),
            Arc::new(MockMessages::default()),
        );
        let (a, b, r1) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (tx, _rx) = mpsc::channel(8);
        let ca = Client::new(a, tx.clone());
        state.hub.register(ca.clone()).await;
        state.hub.register(Client::new(b, tx)).await;
        state.hub.join(&ca, r1).await.unwrap();

        let Json(rsp) = hub_status(State(state)).await;
        assert_eq!((rsp.num_clients, rsp.num_rooms), (2, 1));

        let body = serde_json::to_value(&rsp).unwrap();
        assert_eq!(body, serde_json::json!({ "numClients": 2, "numRooms": 1 }));
    }
}
