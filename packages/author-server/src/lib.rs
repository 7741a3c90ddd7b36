//! Author-mode HTTP server
//!
//! Exposes view resolution and structural editing of the views config as a
//! REST API, plus a server-sent event stream of committed changes.
//!
//! # Architecture
//!
//! The server is organized into endpoint modules merged into one router:
//! - `view_endpoints`: view lookup, resolution and view CRUD
//! - `node_endpoints`: node CRUD, moves and the integrity report
//! - `event_endpoints`: `GET /api/events` domain event stream
//!
//! All state lives in the core [`SiteService`]; handlers are thin adapters that
//! map [`ViewServiceError`](viewtree_core::ViewServiceError) codes to HTTP
//! statuses through [`HttpError`].
//!
//! # Security
//!
//! - CORS restricted to local dev origins (override with `CORS_ALLOW_ORIGIN`)
//! - No authentication; meant to run on the author's machine

use axum::{
    http::{header, Method},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use viewtree_core::SiteService;

mod event_endpoints;
mod http_error;
mod node_endpoints;
mod view_endpoints;

pub use http_error::HttpError;

/// Application state shared across all endpoints
///
/// Reads take a snapshot from the pipeline and never block writers; every
/// mutation serializes on the pipeline's own writer lock.
#[derive(Clone)]
pub struct AppState {
    pub site: SiteService,
}

impl AppState {
    pub fn new(site: SiteService) -> Self {
        Self { site }
    }
}

/// Create the application router with all endpoint modules
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(view_endpoints::routes(state.clone()))
        .merge(node_endpoints::routes(state.clone()))
        .merge(event_endpoints::routes(state))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// CORS layer for the authoring UI
///
/// Default origins cover the common Vite ports. `CORS_ALLOW_ORIGIN` replaces
/// them with a single origin; an unparseable value is ignored with a warning.
fn cors_layer() -> CorsLayer {
    let default_origins = ["http://localhost:5173", "http://localhost:4321"];

    let custom = std::env::var("CORS_ALLOW_ORIGIN").ok().and_then(|origin| {
        match origin.parse::<header::HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS_ALLOW_ORIGIN '{}': {}", origin, e);
                None
            }
        }
    });
    let origins: Vec<header::HeaderValue> = match custom {
        Some(origin) => vec![origin],
        None => default_origins
            .iter()
            .filter_map(|o| o.parse::<header::HeaderValue>().ok())
            .collect(),
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
        .allow_credentials(false)
}

/// Bind to `127.0.0.1:<port>` and serve until the process exits
///
/// # Errors
///
/// Returns error if the server fails to bind or start.
pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("127.0.0.1:{}", port);
    tracing::info!("Author server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
