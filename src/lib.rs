// Storyweaver - educational story generation service
//
// Pipeline: seed a Qdrant knowledge base with curriculum facts, retrieve
// context, prompt an LLM for an outline, expand it scene by scene.

pub mod config;
pub mod models;
pub mod types;
pub mod llm;
pub mod embeddings;
pub mod knowledge;
pub mod story;
pub mod jobs;
pub mod routes;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
