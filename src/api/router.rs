//! Defines the router of the server.

use super::{status, AppState};
use crate::{core::Error, ws, Config};
use axum::{http::header::AUTHORIZATION, Router};
use std::iter::once;
use tower_http::{sensitive_headers::SetSensitiveRequestHeadersLayer, trace::TraceLayer};

/// Create router of the application.
///
/// - `config`: The global configure of the application.
pub async fn make_app(config: Config) -> Result<Router, Error> {
    let state = AppState::new(config)?;

    let app = Router::new()
        .merge(ws::router())
        .nest("/api", status::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveRequestHeadersLayer::new(once(AUTHORIZATION)));
    Ok(app)
}
