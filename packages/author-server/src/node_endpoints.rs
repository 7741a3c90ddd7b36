//! Node Endpoints
//!
//! - `POST /api/nodes` - Create a node under an existing parent
//! - `GET /api/nodes/:id` - Get a node
//! - `GET /api/nodes/:id/children` - Ordered children
//! - `GET /api/nodes/:id/resolved` - Render-ready subtree below a node
//! - `PATCH /api/nodes/:id/config` - Shallow-merge a config patch
//! - `PUT /api/nodes/:id/move` - Move under a new parent
//! - `DELETE /api/nodes/:id?cascade=` - Delete a node (subtree by default)
//! - `GET /api/integrity` - Structural findings over the whole config

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use viewtree_core::{
    CreateNodeParams, IntegrityIssue, MoveNodeParams, Node, NodeId, ResolvedNode,
};

use crate::{AppState, HttpError};

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default = "default_cascade")]
    cascade: bool,
}

fn default_cascade() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub deleted: Vec<NodeId>,
}

/// Create a node
///
/// ```bash
/// curl -X POST http://localhost:3001/api/nodes \
///   -H "Content-Type: application/json" \
///   -d '{"parentId": "<root>", "type": "Markdown", "config": {"content": "# Hi"}}'
/// ```
async fn create_node(
    State(state): State<AppState>,
    Json(params): Json<CreateNodeParams>,
) -> Result<(StatusCode, Json<Node>), HttpError> {
    let node = state.site.pipeline().create_node(params).await?;
    Ok((StatusCode::CREATED, Json(node)))
}

async fn get_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Node>, HttpError> {
    state
        .site
        .pipeline()
        .get_node(&id)
        .map(Json)
        .ok_or_else(|| HttpError::not_found(format!("node '{}'", id)))
}

async fn get_children(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Node>>, HttpError> {
    Ok(Json(state.site.pipeline().get_children(&id)?))
}

/// Resolve the subtree below a node
///
/// ```bash
/// curl http://localhost:3001/api/nodes/<id>/resolved
/// ```
async fn get_resolved_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResolvedNode>, HttpError> {
    state
        .site
        .resolve_node(&id)
        .map(Json)
        .ok_or_else(|| HttpError::not_found(format!("node '{}'", id)))
}

async fn update_config(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> Result<Json<Node>, HttpError> {
    Ok(Json(state.site.pipeline().update_config(&id, patch).await?))
}

async fn move_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(params): Json<MoveNodeParams>,
) -> Result<Json<Node>, HttpError> {
    let node = state
        .site
        .pipeline()
        .move_node(&id, &params.new_parent_id, params.index)
        .await?;
    Ok(Json(node))
}

async fn delete_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeleteResult>, HttpError> {
    let deleted = state.site.pipeline().delete_node(&id, query.cascade).await?;
    Ok(Json(DeleteResult { deleted }))
}

async fn integrity_report(State(state): State<AppState>) -> Json<Vec<IntegrityIssue>> {
    Json(state.site.integrity_report())
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/nodes", post(create_node))
        .route("/api/nodes/:id", get(get_node).delete(delete_node))
        .route("/api/nodes/:id/children", get(get_children))
        .route("/api/nodes/:id/resolved", get(get_resolved_node))
        .route("/api/nodes/:id/config", patch(update_config))
        .route("/api/nodes/:id/move", put(move_node))
        .route("/api/integrity", get(integrity_report))
        .with_state(state)
}
