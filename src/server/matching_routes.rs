//! Compatibility matching route.

use super::api_error::ApiError;
use super::metrics::{record_error, record_matching, record_sut_skipped};
use super::state::{GuardedMatchingHandler, ServerState};
use crate::matching::{MatcherRequest, MatcherResponse};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use std::time::Instant;
use tracing::debug;

async fn post_matching(
    State(handler): State<GuardedMatchingHandler>,
    payload: Result<Json<MatcherRequest>, JsonRejection>,
) -> Result<Json<MatcherResponse>, ApiError> {
    let start = Instant::now();
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Rejected match request body: {}", rejection.body_text());
            record_matching("invalid_request", start.elapsed());
            record_error("invalid_request", "/v1/matching");
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "invalid_request",
                rejection.body_text(),
            ));
        }
    };
    match handler.calculate_matching(&request) {
        Ok(response) => {
            record_matching(
                &response.matching.overall_compatibility.to_string(),
                start.elapsed(),
            );
            if response.components.sut.is_some() && response.matching.sut.is_none() {
                record_sut_skipped();
            }
            Ok(Json(response))
        }
        Err(err) => {
            debug!("Match request {:?} failed: {}", request, err);
            record_matching(err.code(), start.elapsed());
            record_error(err.code(), "/v1/matching");
            Err(err.into())
        }
    }
}

pub fn make_matching_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", post(post_matching))
        .with_state(state)
}
