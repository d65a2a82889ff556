//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per directory endpoint.
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

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

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    async fn post(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST request failed")
    }

    async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE request failed")
    }

    pub async fn get_stats(&self) -> Response {
        self.get("/").await
    }

    // ========================================================================
    // Venue Endpoints
    // ========================================================================

    pub async fn list_venues(&self) -> Response {
        self.get("/venues").await
    }

    pub async fn search_venues(&self, term: &str) -> Response {
        self.post("/venues/search", &json!({ "search_term": term }))
            .await
    }

    pub async fn get_venue(&self, id: i64) -> Response {
        self.get(&format!("/venues/{}", id)).await
    }

    pub async fn get_venue_for_edit(&self, id: i64) -> Response {
        self.get(&format!("/venues/{}/edit", id)).await
    }

    pub async fn create_venue(&self, venue: &Value) -> Response {
        self.post("/venues", venue).await
    }

    pub async fn edit_venue(&self, id: i64, update: &Value) -> Response {
        self.post(&format!("/venues/{}/edit", id), update).await
    }

    pub async fn delete_venue(&self, id: i64) -> Response {
        self.delete(&format!("/venues/{}", id)).await
    }

    // ========================================================================
    // Artist Endpoints
    // ========================================================================

    pub async fn list_artists(&self) -> Response {
        self.get("/artists").await
    }

    pub async fn search_artists(&self, term: &str) -> Response {
        self.post("/artists/search", &json!({ "search_term": term }))
            .await
    }

    pub async fn get_artist(&self, id: i64) -> Response {
        self.get(&format!("/artists/{}", id)).await
    }

    pub async fn get_artist_for_edit(&self, id: i64) -> Response {
        self.get(&format!("/artists/{}/edit", id)).await
    }

    pub async fn create_artist(&self, artist: &Value) -> Response {
        self.post("/artists", artist).await
    }

    pub async fn edit_artist(&self, id: i64, update: &Value) -> Response {
        self.post(&format!("/artists/{}/edit", id), update).await
    }

    pub async fn delete_artist(&self, id: i64) -> Response {
        self.delete(&format!("/artists/{}", id)).await
    }

    // ========================================================================
    // Show Endpoints
    // ========================================================================

    pub async fn list_shows(&self) -> Response {
        self.get("/shows").await
    }

    pub async fn create_show(&self, venue_id: i64, artist_id: i64, start_time: &str) -> Response {
        self.post(
            "/shows",
            &json!({
                "venue_id": venue_id,
                "artist_id": artist_id,
                "start_time": start_time,
            }),
        )
        .await
    }
}
