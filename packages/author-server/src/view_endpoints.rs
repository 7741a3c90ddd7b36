//! View Endpoints
//!
//! - `GET /api/health` - Health check
//! - `GET /api/views` - Registered view paths
//! - `GET /api/views/resolved?path=` - Render-ready tree for a path
//! - `GET /api/views/all` - Every resolvable view, in path order
//! - `GET /api/views/lookup?path=` - View metadata for a path
//! - `POST /api/views` - Create a view
//! - `PATCH /api/views?path=` - Update a view's metadata or path
//! - `DELETE /api/views?path=` - Delete a view (its nodes stay)
//! - `PUT /api/views/home` - Set the default home view

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use viewtree_core::{NewView, ResolvedView, View, ViewPatch};

use crate::{AppState, HttpError};

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    path: String,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub mode: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewList {
    pub paths: Vec<String>,
    pub default_home_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HomeRequest {
    pub path: String,
}

/// Health check
///
/// ```bash
/// curl http://localhost:3001/api/health
/// ```
async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: state.site.pipeline().config().mode.to_string(),
    })
}

async fn list_views(State(state): State<AppState>) -> Json<ViewList> {
    Json(ViewList {
        paths: state.site.list_view_paths(),
        default_home_path: state.site.default_home_path(),
    })
}

/// Resolve a path into its render-ready tree
///
/// Unknown paths and views that fail integrity checks both answer 404; the
/// latter are logged server-side.
///
/// ```bash
/// curl "http://localhost:3001/api/views/resolved?path=/blog"
/// ```
async fn get_resolved_view(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<ResolvedView>, HttpError> {
    state
        .site
        .get_resolved_view_by_path(&query.path)
        .map(Json)
        .ok_or_else(|| HttpError::not_found(format!("view '{}'", query.path)))
}

async fn get_all_views_resolved(State(state): State<AppState>) -> Json<Vec<ResolvedView>> {
    Json(state.site.get_all_views_resolved())
}

async fn lookup_view(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<View>, HttpError> {
    state
        .site
        .resolve_view_by_path(&query.path)
        .map(Json)
        .ok_or_else(|| HttpError::not_found(format!("view '{}'", query.path)))
}

/// Create a view
///
/// ```bash
/// curl -X POST http://localhost:3001/api/views \
///   -H "Content-Type: application/json" \
///   -d '{"path": "/about", "title": "About"}'
/// ```
async fn create_view(
    State(state): State<AppState>,
    Json(new): Json<NewView>,
) -> Result<(StatusCode, Json<View>), HttpError> {
    let view = state.site.pipeline().create_view(new).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn update_view(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
    Json(patch): Json<ViewPatch>,
) -> Result<Json<View>, HttpError> {
    if patch.is_empty() {
        return Err(HttpError::new("Empty view patch", "INVALID_INPUT"));
    }
    let view = state.site.pipeline().update_view(&query.path, patch).await?;
    Ok(Json(view))
}

async fn delete_view(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<View>, HttpError> {
    let view = state.site.pipeline().delete_view(&query.path).await?;
    Ok(Json(view))
}

async fn set_default_home(
    State(state): State<AppState>,
    Json(request): Json<HomeRequest>,
) -> Result<Json<HomeRequest>, HttpError> {
    let path = state.site.pipeline().set_default_home(&request.path).await?;
    Ok(Json(HomeRequest { path }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route(
            "/api/views",
            get(list_views)
                .post(create_view)
                .patch(update_view)
                .delete(delete_view),
        )
        .route("/api/views/resolved", get(get_resolved_view))
        .route("/api/views/all", get(get_all_views_resolved))
        .route("/api/views/lookup", get(lookup_view))
        .route("/api/views/home", put(set_default_home))
        .with_state(state)
}
