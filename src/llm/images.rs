// OpenAI image-generation client
// API Reference: https://platform.openai.com/docs/api-reference/images
//
// Optional pipeline step: when GENERATE_IMAGES is enabled each scene's
// image_prompt is rendered and the returned URL is stored on the scene.

use crate::types::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

pub struct ImageClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ImageRequest {
    model: String,
    prompt: String,
    n: u32,
    size: String,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}

impl ImageClient {
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

    /// Render one image for the prompt and return its URL
    pub async fn generate(&self, prompt: &str) -> AppResult<String> {
        let url = format!("{}/images/generations", self.base_url);

        let request = ImageRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: "1024x1024".to_string(),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::LLMApi(format!("Image request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::LLMApi(format!(
                "Image API error ({}): {}",
                status, error_text
            )));
        }

        let image_response: ImageResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLMApi(format!("Failed to parse image response: {}", e)))?;

        image_response
            .data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .ok_or_else(|| AppError::LLMApi("Image API returned no URL".to_string()))
    }
}
