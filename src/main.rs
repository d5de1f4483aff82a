use std::net::SocketAddr;
use std::sync::Arc;
use storyweaver::config::Config;
use storyweaver::embeddings::EmbeddingClient;
use storyweaver::jobs::JobStore;
use storyweaver::knowledge::{KnowledgeBaseSeeder, VectorStore};
use storyweaver::llm::{ImageClient, LLM};
use storyweaver::models::AppState;
use storyweaver::story::StoryGenerator;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storyweaver=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    // Wire up the pipeline clients
    let llm = Arc::new(LLM::from_config(&config.llm));
    let embeddings = EmbeddingClient::with_base_url(
        &config.llm.api_key,
        &config.llm.embedding_model,
        &config.llm.base_url,
    );
    let vector_store = VectorStore::new(
        &config.qdrant.url,
        config.qdrant.api_key.clone(),
        &config.qdrant.collection,
    );
    let seeder = Arc::new(KnowledgeBaseSeeder::new(
        llm.clone(),
        embeddings,
        vector_store,
        config.generation.facts_per_seed,
        config.generation.context_limit,
    ));

    let images = config.llm.images_enabled.then(|| {
        ImageClient::with_base_url(&config.llm.api_key, &config.llm.image_model, &config.llm.base_url)
    });
    let generator = Arc::new(StoryGenerator::new(llm, images, config.generation.clone()));

    // Create shared state
    let state = AppState {
        config: config.clone(),
        jobs: JobStore::new(),
        seeder,
        generator,
    };

    // Create router
    let app = storyweaver::create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
