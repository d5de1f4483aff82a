// Embeddings client
// API Reference: https://platform.openai.com/docs/api-reference/embeddings
//
// Fact texts and retrieval queries share the same model so the vectors live
// in one space; the collection dimension follows whatever the model returns.

use crate::types::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

pub struct EmbeddingClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self::with_base_url(api_key, model, OPENAI_API_BASE)
    }

    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Embed a batch of texts, preserving input order
    pub async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Embedding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding(format!(
                "Embedding API error ({}): {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to parse embeddings: {}", e)))?;

        if embedding_response.data.len() != texts.len() {
            return Err(AppError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embedding_response.data.len()
            )));
        }

        let mut data = embedding_response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    /// Embed a single query string
    pub async fn embed_one(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| AppError::Embedding("Embedding API returned no vector".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embeddings_ordered_by_index() {
        let mut server = mockito::Server::new_async().await;
        // Out-of-order indices must be reassembled into input order
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_body(
                r#"{"data": [
                    {"index": 1, "embedding": [0.5, 0.5]},
                    {"index": 0, "embedding": [0.1, 0.2]}
                ]}"#,
            )
            .create_async()
            .await;

        let client = EmbeddingClient::with_base_url("test-key", "text-embedding-3-small", &server.url());
        let vectors = client
            .embed(&["first".to_string(), "second".to_string()])
            .await
            .expect("embeddings should parse");

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0], vec![0.1, 0.2]);
        assert_eq!(vectors[1], vec![0.5, 0.5]);
    }

    #[tokio::test]
    async fn test_empty_input_short_circuits() {
        // No server: the call must not hit the network at all
        let client = EmbeddingClient::with_base_url("test-key", "m", "http://127.0.0.1:1");
        let vectors = client.embed(&[]).await.expect("empty input is fine");
        assert!(vectors.is_empty());
    }

    #[tokio::test]
    async fn test_count_mismatch_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_body(r#"{"data": [{"index": 0, "embedding": [0.1]}]}"#)
            .create_async()
            .await;

        let client = EmbeddingClient::with_base_url("test-key", "m", &server.url());
        let err = client
            .embed(&["a".to_string(), "b".to_string()])
            .await
            .expect_err("mismatch should fail");
        assert!(err.to_string().contains("Expected 2 embeddings"));
    }
}
