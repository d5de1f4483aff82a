use crate::jobs::run_story_job;
use crate::models::{AppState, StoryRecord, StoryRequest, StorySummary};
use crate::types::{AppError, AppResult};
use axum::{
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
    Json, Router,
};
use tracing::info;
use uuid::Uuid;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/generate-story", post(generate_story))
        .route("/story/{story_id}", get(get_story))
        .route("/stories", get(list_stories))
        .with_state(state)
}

/// Accept a story request, spawn the pipeline, and return the initial record
async fn generate_story(
    State(state): State<AppState>,
    Json(request): Json<StoryRequest>,
) -> AppResult<ResponseJson<StoryRecord>> {
    if request.subject.trim().is_empty() || request.topic.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Subject and topic are required".to_string(),
        ));
    }

    let story_id = Uuid::new_v4();
    let record = StoryRecord::new(story_id, &request);
    state.jobs.insert(record.clone()).await;

    info!(%story_id, subject = %request.subject, topic = %request.topic, "Accepted story request");

    // Fire-and-forget: the client polls GET /story/{id} for progress
    tokio::spawn(run_story_job(state.clone(), story_id, request));

    Ok(Json(record))
}

async fn get_story(
    State(state): State<AppState>,
    Path(story_id): Path<Uuid>,
) -> AppResult<ResponseJson<StoryRecord>> {
    state
        .jobs
        .get(story_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No story with id {}", story_id)))
}

async fn list_stories(State(state): State<AppState>) -> ResponseJson<Vec<StorySummary>> {
    Json(state.jobs.list().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, GenerationConfig, LLMConfig, QdrantConfig, ServerConfig};
    use crate::embeddings::EmbeddingClient;
    use crate::jobs::JobStore;
    use crate::knowledge::{KnowledgeBaseSeeder, VectorStore};
    use crate::llm::{LLMAdapter, LLM};
    use crate::models::StoryStatus;
    use crate::story::StoryGenerator;
    use crate::types::{LLMRequest, LLMResponse};
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::Arc;

    /// Adapter that refuses every call; validation tests never reach it
    struct OfflineAdapter;

    #[async_trait]
    impl LLMAdapter for OfflineAdapter {
        async fn create_chat_completion(&self, _request: &LLMRequest) -> AppResult<LLMResponse> {
            Err(AppError::LLMApi("no backend in tests".to_string()))
        }
    }

    fn test_state() -> AppState {
        let config = Config {
            server: ServerConfig {
                port: 0,
                host: "127.0.0.1".to_string(),
            },
            llm: LLMConfig {
                api_key: String::new(),
                base_url: "http://127.0.0.1:1".to_string(),
                model: "test-model".to_string(),
                embedding_model: "test-embedding".to_string(),
                image_model: "test-image".to_string(),
                images_enabled: false,
            },
            qdrant: QdrantConfig {
                url: "http://127.0.0.1:1".to_string(),
                api_key: None,
                collection: "kb".to_string(),
            },
            generation: GenerationConfig {
                scene_count: 3,
                facts_per_seed: 10,
                context_limit: 5,
                max_tokens: 512,
                temperature: 0.7,
            },
        };

        let llm = Arc::new(LLM::from_adapter(Box::new(OfflineAdapter), "test-model"));
        let embeddings =
            EmbeddingClient::with_base_url("", "test-embedding", "http://127.0.0.1:1");
        let store = VectorStore::new("http://127.0.0.1:1", None, "kb");
        let seeder = Arc::new(KnowledgeBaseSeeder::new(llm.clone(), embeddings, store, 10, 5));
        let generator = Arc::new(StoryGenerator::new(llm, None, config.generation.clone()));

        AppState {
            config,
            jobs: JobStore::new(),
            seeder,
            generator,
        }
    }

    fn request_with(subject: &str, topic: &str) -> StoryRequest {
        StoryRequest {
            subject: subject.to_string(),
            topic: topic.to_string(),
            grade: "grade_6".to_string(),
            curriculum: "CBSE".to_string(),
            specific_area: None,
        }
    }

    #[tokio::test]
    async fn test_generate_story_rejects_blank_subject() {
        let err = generate_story(State(test_state()), Json(request_with("   ", "fractions")))
            .await
            .expect_err("blank subject should be rejected");
        assert!(matches!(err, AppError::InvalidRequest(_)));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should read");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("body should be JSON");
        assert_eq!(body["detail"], "Subject and topic are required");
        assert!(body.get("example").is_some());
    }

    #[tokio::test]
    async fn test_generate_story_rejects_blank_topic() {
        let err = generate_story(State(test_state()), Json(request_with("Mathematics", "")))
            .await
            .expect_err("blank topic should be rejected");
        assert!(matches!(err, AppError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_generate_story_accepts_and_tracks_request() {
        let state = test_state();
        let Json(record) = generate_story(
            State(state.clone()),
            Json(request_with("Mathematics", "fractions")),
        )
        .await
        .expect("valid request should be accepted");

        assert_eq!(record.status, StoryStatus::Processing);
        assert!(state.jobs.get(record.story_id).await.is_some());
    }
}
