//! Story generator
//!
//! Drives the LLM through outline and scene generation. The caller (the job
//! worker) owns progress reporting; this type only talks to the model.

use crate::config::GenerationConfig;
use crate::llm::{ImageClient, LLM};
use crate::models::{Scene, StoryRequest};
use crate::story::{parser, prompts, StoryOutline};
use crate::types::{AppResult, LLMMessage, LLMRequest};
use crate::utils::with_retry;
use std::sync::Arc;
use tracing::{info, warn};

const MAX_RETRIES: u32 = 3;

pub struct StoryGenerator {
    llm: Arc<LLM>,
    images: Option<ImageClient>,
    generation: GenerationConfig,
}

impl StoryGenerator {
    pub fn new(llm: Arc<LLM>, images: Option<ImageClient>, generation: GenerationConfig) -> Self {
        Self {
            llm,
            images,
            generation,
        }
    }

    pub fn scene_count(&self) -> usize {
        self.generation.scene_count
    }

    fn request_for(&self, prompt: String) -> LLMRequest {
        LLMRequest {
            model: self.llm.default_model().to_string(),
            messages: vec![
                LLMMessage::system(prompts::STORYTELLER_SYSTEM),
                LLMMessage::user(prompt),
            ],
            max_tokens: Some(self.generation.max_tokens),
            temperature: Some(self.generation.temperature),
        }
    }

    /// Generate the story outline for a request, grounded in retrieved facts
    pub async fn generate_outline(
        &self,
        request: &StoryRequest,
        context: &[String],
    ) -> AppResult<StoryOutline> {
        let prompt = prompts::outline_prompt(
            &request.subject,
            &request.full_topic(),
            &request.grade,
            &request.curriculum,
            context,
            self.generation.scene_count,
        );

        let llm_request = self.request_for(prompt);
        let response =
            with_retry(|| self.llm.create_chat_completion(&llm_request), MAX_RETRIES).await?;

        let outline = parser::parse_outline(&response.content, self.generation.scene_count.max(1));
        info!(
            title = %outline.title,
            scenes = outline.scene_summaries.len(),
            "Generated story outline"
        );
        Ok(outline)
    }

    /// Expand one outline entry into a full scene
    pub async fn generate_scene(
        &self,
        outline: &StoryOutline,
        scene_number: usize,
        summary: &str,
        request: &StoryRequest,
        context: &[String],
    ) -> AppResult<Scene> {
        let prompt = prompts::scene_prompt(
            &outline.title,
            summary,
            scene_number,
            outline.scene_summaries.len(),
            &request.full_topic(),
            &request.grade,
            context,
        );

        let llm_request = self.request_for(prompt);
        let response =
            with_retry(|| self.llm.create_chat_completion(&llm_request), MAX_RETRIES).await?;

        let mut scene = parser::parse_scene(&response.content, scene_number, summary);
        self.illustrate(&mut scene).await;
        Ok(scene)
    }

    /// Render the scene's image prompt when image generation is enabled.
    /// A failed render leaves the scene without a URL; it never fails the job.
    async fn illustrate(&self, scene: &mut Scene) {
        let Some(images) = &self.images else {
            return;
        };

        match images.generate(&scene.image_prompt).await {
            Ok(url) => scene.image_url = Some(url),
            Err(e) => {
                warn!(scene = scene.scene_number, error = %e, "Image generation failed");
            }
        }
    }
}
