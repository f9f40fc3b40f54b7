//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all catalog-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Server
    // ========================================================================

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    // ========================================================================
    // Catalog Endpoints
    // ========================================================================

    /// GET /v1/catalog/{kind}
    pub async fn list_components(&self, kind: &str) -> Response {
        self.client
            .get(format!("{}/v1/catalog/{}", self.base_url, kind))
            .send()
            .await
            .expect("List components request failed")
    }

    /// GET /v1/catalog/{kind}/{id}
    pub async fn get_component(&self, kind: &str, id: &str) -> Response {
        self.client
            .get(format!("{}/v1/catalog/{}/{}", self.base_url, kind, id))
            .send()
            .await
            .expect("Get component request failed")
    }

    // ========================================================================
    // Matching Endpoints
    // ========================================================================

    /// POST /v1/matching with only the two required components
    pub async fn match_components(&self, tonearm_id: &str, cartridge_id: &str) -> Response {
        self.post_matching(json!({
            "tonearmId": tonearm_id,
            "cartridgeId": cartridge_id,
        }))
        .await
    }

    /// POST /v1/matching with a SUT in the chain
    pub async fn match_with_sut(
        &self,
        tonearm_id: &str,
        cartridge_id: &str,
        sut_id: &str,
    ) -> Response {
        self.post_matching(json!({
            "tonearmId": tonearm_id,
            "cartridgeId": cartridge_id,
            "sutId": sut_id,
        }))
        .await
    }

    /// POST /v1/matching with a raw JSON-typed body, valid or not
    pub async fn post_matching_raw(&self, body: &str) -> Response {
        self.client
            .post(format!("{}/v1/matching", self.base_url))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Matching request failed")
    }

    /// POST /v1/matching with an arbitrary body
    pub async fn post_matching(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/v1/matching", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Matching request failed")
    }
}
