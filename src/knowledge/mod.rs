// Knowledge base: Qdrant-backed fact storage and retrieval

pub mod seeder;
pub mod vector_store;

pub use seeder::KnowledgeBaseSeeder;
pub use vector_store::{KnowledgePoint, SearchHit, VectorStore, VectorStoreError};
