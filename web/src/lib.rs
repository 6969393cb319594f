use axum::Router;
use log::*;
use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use tower_http::cors::CorsLayer;

pub use self::error::{Error, Result};
pub use service::AppState;

mod controller;
pub mod error;
pub mod router;
mod signature;

/// Binds the configured interface/port and serves the API router until the
/// process is stopped.
pub async fn init_server(app_state: AppState) -> Result<()> {
    let interface = app_state
        .config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = app_state.config.port;
    let listen_addr = format!("{interface}:{port}");

    info!("Server starting... listening for connections on http://{listen_addr}");

    let allowed_origins: Vec<HeaderValue> = app_state
        .config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| {
                    warn!("Skipping invalid allowed origin '{origin}': {e}");
                    e
                })
                .ok()
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_origin(allowed_origins);

    let router: Router = router::define_routes(app_state).layer(cors);

    let addr = SocketAddr::from_str(&listen_addr).map_err(|e| {
        error!("Invalid listen address '{listen_addr}': {e}");
        domain::error::Error {
            source: Some(Box::new(e)),
            error_kind: domain::error::DomainErrorKind::Internal(
                domain::error::InternalErrorKind::Config,
            ),
        }
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind {listen_addr}: {e}");
        domain::error::Error {
            source: Some(Box::new(e)),
            error_kind: domain::error::DomainErrorKind::Internal(
                domain::error::InternalErrorKind::Config,
            ),
        }
    })?;

    axum::serve(listener, router).await.map_err(|e| {
        error!("Server error: {e}");
        domain::error::Error {
            source: Some(Box::new(e)),
            error_kind: domain::error::DomainErrorKind::Internal(
                domain::error::InternalErrorKind::Other("server terminated".to_string()),
            ),
        }
    })?;

    Ok(())
}
