use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub qdrant: QdrantConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub embedding_model: String,
    pub image_model: String,
    pub images_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub scene_count: usize,
    pub facts_per_seed: usize,
    pub context_limit: usize,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            },
            llm: LLMConfig {
                api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                base_url: env::var("OPENAI_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                model: env::var("STORY_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                embedding_model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
                image_model: env::var("IMAGE_MODEL").unwrap_or_else(|_| "dall-e-3".to_string()),
                images_enabled: env::var("GENERATE_IMAGES")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()?,
            },
            qdrant: QdrantConfig {
                url: env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6333".to_string()),
                api_key: env::var("QDRANT_API_KEY").ok().filter(|k| !k.is_empty()),
                collection: env::var("QDRANT_COLLECTION")
                    .unwrap_or_else(|_| "story_knowledge_base".to_string()),
            },
            generation: GenerationConfig {
                scene_count: env::var("SCENE_COUNT")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse::<usize>()?
                    .clamp(1, 10),
                facts_per_seed: env::var("FACTS_PER_SEED")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
                context_limit: env::var("CONTEXT_LIMIT")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()?,
                max_tokens: env::var("MAX_OUTPUT_TOKENS")
                    .unwrap_or_else(|_| "2048".to_string())
                    .parse()?,
                temperature: env::var("LLM_TEMPERATURE")
                    .unwrap_or_else(|_| "0.7".to_string())
                    .parse()?,
            },
        })
    }
}
