//! Read-only component catalog routes.

use super::api_error::ApiError;
use super::state::{GuardedComponentStore, ServerState};
use crate::catalog_store::ComponentKind;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

fn parse_kind(segment: &str) -> Result<ComponentKind, ApiError> {
    ComponentKind::from_path_segment(segment).ok_or_else(|| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "unknown_component_kind",
            format!(
                "Unknown component kind '{}', expected one of: tonearm, cartridge, sut, phono-preamp",
                segment
            ),
        )
    })
}

async fn list_components(
    State(store): State<GuardedComponentStore>,
    Path(kind): Path<String>,
) -> Result<Response, ApiError> {
    let kind = parse_kind(&kind)?;
    let summaries = store.list_components(kind).map_err(ApiError::internal)?;
    Ok(Json(summaries).into_response())
}

async fn get_component(
    State(store): State<GuardedComponentStore>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let kind = parse_kind(&kind)?;
    match store.get_component(kind, &id).map_err(ApiError::internal)? {
        Some(component) => Ok(Json(component).into_response()),
        None => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "component_not_found",
            format!("{} '{}' not found", kind, id),
        )),
    }
}

pub fn make_catalog_routes(state: ServerState) -> Router {
    Router::new()
        .route("/{kind}", get(list_components))
        .route("/{kind}/{id}", get(get_component))
        .with_state(state)
}
