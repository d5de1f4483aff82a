//! Qdrant REST client
//!
//! Thin wrapper over the collection endpoints the pipeline needs:
//! - `GET /collections` to discover existing collections
//! - `PUT /collections/{name}` to create one (cosine distance)
//! - `PUT /collections/{name}/points` to upsert fact vectors
//! - `POST /collections/{name}/points/search` for nearest-neighbor retrieval
//!
//! Point payloads carry the fact text plus subject/topic/grade/curriculum
//! metadata so retrieved hits can be rendered directly into prompts.

use crate::types::AppError;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("Qdrant request failed: {0}")]
    RequestFailed(String),

    #[error("Qdrant returned status {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Failed to parse Qdrant response: {0}")]
    ParseError(String),
}

impl From<VectorStoreError> for AppError {
    fn from(err: VectorStoreError) -> Self {
        AppError::VectorStore(err.to_string())
    }
}

/// A single fact ready for upsert
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgePoint {
    pub id: uuid::Uuid,
    pub vector: Vec<f32>,
    pub payload: Value,
}

/// One nearest-neighbor hit
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub text: String,
    pub score: f32,
}

pub struct VectorStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    collection: String,
}

impl VectorStore {
    pub fn new(base_url: &str, api_key: Option<String>, collection: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            collection: collection.to_string(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }

    async fn read_ok_json(response: reqwest::Response) -> Result<Value, VectorStoreError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| VectorStoreError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(VectorStoreError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| VectorStoreError::ParseError(e.to_string()))
    }

    /// Create the collection if it does not exist yet
    pub async fn ensure_collection(&self, vector_size: usize) -> Result<(), VectorStoreError> {
        let url = format!("{}/collections", self.base_url);
        let response = self
            .request(self.client.get(&url))
            .send()
            .await
            .map_err(|e| VectorStoreError::RequestFailed(e.to_string()))?;
        let body = Self::read_ok_json(response).await?;

        let exists = body
            .get("result")
            .and_then(|r| r.get("collections"))
            .and_then(|c| c.as_array())
            .map(|collections| {
                collections
                    .iter()
                    .filter_map(|c| c.get("name").and_then(|n| n.as_str()))
                    .any(|name| name == self.collection)
            })
            .unwrap_or(false);

        if exists {
            debug!(collection = %self.collection, "Collection already present");
            return Ok(());
        }

        info!(collection = %self.collection, vector_size, "Creating Qdrant collection");

        let url = format!("{}/collections/{}", self.base_url, self.collection);
        let create_body = serde_json::json!({
            "vectors": { "size": vector_size, "distance": "Cosine" }
        });

        let response = self
            .request(self.client.put(&url))
            .json(&create_body)
            .send()
            .await
            .map_err(|e| VectorStoreError::RequestFailed(e.to_string()))?;
        Self::read_ok_json(response).await?;
        Ok(())
    }

    /// Upsert fact points, waiting for the write to be applied
    pub async fn upsert(&self, points: &[KnowledgePoint]) -> Result<(), VectorStoreError> {
        if points.is_empty() {
            return Ok(());
        }

        let url = format!(
            "{}/collections/{}/points?wait=true",
            self.base_url, self.collection
        );
        let body = serde_json::json!({ "points": points });

        let response = self
            .request(self.client.put(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| VectorStoreError::RequestFailed(e.to_string()))?;
        Self::read_ok_json(response).await?;

        debug!(count = points.len(), collection = %self.collection, "Upserted knowledge points");
        Ok(())
    }

    /// Nearest-neighbor search, returning payload text with scores
    pub async fn search(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchHit>, VectorStoreError> {
        let url = format!(
            "{}/collections/{}/points/search",
            self.base_url, self.collection
        );
        let body = serde_json::json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });

        let response = self
            .request(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| VectorStoreError::RequestFailed(e.to_string()))?;
        let body = Self::read_ok_json(response).await?;

        let hits = body
            .get("result")
            .and_then(|r| r.as_array())
            .map(|results| {
                results
                    .iter()
                    .filter_map(|hit| {
                        let text = hit
                            .get("payload")
                            .and_then(|p| p.get("text"))
                            .and_then(|t| t.as_str())?
                            .to_string();
                        let score = hit.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0) as f32;
                        Some(SearchHit { text, score })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_collection_skips_existing() {
        let mut server = mockito::Server::new_async().await;
        let list = server
            .mock("GET", "/collections")
            .with_status(200)
            .with_body(r#"{"result": {"collections": [{"name": "story_knowledge_base"}]}}"#)
            .create_async()
            .await;
        // No PUT mock: an unexpected create request would come back 501 and fail

        let store = VectorStore::new(&server.url(), None, "story_knowledge_base");
        store
            .ensure_collection(1536)
            .await
            .expect("existing collection should be a no-op");
        list.assert_async().await;
    }

    #[tokio::test]
    async fn test_ensure_collection_creates_missing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/collections")
            .with_status(200)
            .with_body(r#"{"result": {"collections": []}}"#)
            .create_async()
            .await;
        let create = server
            .mock("PUT", "/collections/story_knowledge_base")
            .with_status(200)
            .with_body(r#"{"result": true, "status": "ok"}"#)
            .create_async()
            .await;

        let store = VectorStore::new(&server.url(), None, "story_knowledge_base");
        store.ensure_collection(1536).await.expect("create should succeed");
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_parses_hits_and_skips_textless_payloads() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/collections/kb/points/search")
            .with_status(200)
            .with_body(
                r#"{"result": [
                    {"id": 1, "score": 0.91, "payload": {"text": "A fraction names part of a whole.", "subject": "Mathematics"}},
                    {"id": 2, "score": 0.80, "payload": {"subject": "Mathematics"}},
                    {"id": 3, "score": 0.75, "payload": {"text": "Equivalent fractions have the same value."}}
                ]}"#,
            )
            .create_async()
            .await;

        let store = VectorStore::new(&server.url(), None, "kb");
        let hits = store.search(&[0.1, 0.2], 5).await.expect("search should parse");

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "A fraction names part of a whole.");
        assert!((hits[0].score - 0.91).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_bad_status_surfaces_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/collections/kb/points/search")
            .with_status(503)
            .with_body("service unavailable")
            .create_async()
            .await;

        let store = VectorStore::new(&server.url(), None, "kb");
        let err = store.search(&[0.1], 5).await.expect_err("503 should fail");
        assert!(err.to_string().contains("503"));
    }
}
