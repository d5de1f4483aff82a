use crate::config::Config;
use crate::jobs::JobStore;
use crate::knowledge::KnowledgeBaseSeeder;
use crate::story::StoryGenerator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub jobs: JobStore,
    pub seeder: Arc<KnowledgeBaseSeeder>,
    pub generator: Arc<StoryGenerator>,
}

/// Lifecycle of a story job. Transitions are monotonic: a record never
/// moves backwards, and terminal states are never overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    Processing,
    SeedingKnowledgeBase,
    GeneratingOutline,
    GeneratingScenes,
    Completed,
    Failed,
}

impl StoryStatus {
    /// Ordering used to enforce forward-only transitions
    pub fn rank(&self) -> u8 {
        match self {
            StoryStatus::Processing => 0,
            StoryStatus::SeedingKnowledgeBase => 1,
            StoryStatus::GeneratingOutline => 2,
            StoryStatus::GeneratingScenes => 3,
            StoryStatus::Completed => 4,
            StoryStatus::Failed => 4,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StoryStatus::Completed | StoryStatus::Failed)
    }

    /// Stage label stored in the progress block (snake_case, as serialized)
    pub fn stage(&self) -> &'static str {
        match self {
            StoryStatus::Processing => "initializing",
            StoryStatus::SeedingKnowledgeBase => "seeding_knowledge_base",
            StoryStatus::GeneratingOutline => "generating_outline",
            StoryStatus::GeneratingScenes => "generating_scenes",
            StoryStatus::Completed => "completed",
            StoryStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.stage())
    }
}

// API Request/Response types

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoryRequest {
    pub subject: String,
    pub topic: String,
    #[serde(default = "default_grade")]
    pub grade: String,
    #[serde(default = "default_curriculum")]
    pub curriculum: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_area: Option<String>,
}

fn default_grade() -> String {
    "grade_6".to_string()
}

fn default_curriculum() -> String {
    "CBSE".to_string()
}

impl StoryRequest {
    /// Topic string used for seeding and retrieval, including the optional
    /// specific area ("fractions - comparing fractions")
    pub fn full_topic(&self) -> String {
        match self.specific_area.as_deref().map(str::trim) {
            Some(area) if !area.is_empty() => format!("{} - {}", self.topic, area),
            _ => self.topic.clone(),
        }
    }
}

/// One scene of the generated story
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    pub scene_number: usize,
    pub title: String,
    /// Story text for this scene
    pub narrative: String,
    /// The concept the scene teaches, in plain language
    pub explanation: String,
    /// Prompt for the image-generation endpoint
    pub image_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Progress {
    pub current_scene: usize,
    pub total_scenes: usize,
    pub current_stage: String,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            current_scene: 0,
            total_scenes: 0,
            current_stage: StoryStatus::Processing.stage().to_string(),
        }
    }
}

/// Full job record, returned by POST /generate-story and GET /story/{id}
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoryRecord {
    pub story_id: uuid::Uuid,
    pub status: StoryStatus,
    pub subject: String,
    pub topic: String,
    pub grade: String,
    pub curriculum: String,
    pub started_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenes: Option<Vec<Scene>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub progress: Progress,
}

impl StoryRecord {
    pub fn new(story_id: uuid::Uuid, request: &StoryRequest) -> Self {
        Self {
            story_id,
            status: StoryStatus::Processing,
            subject: request.subject.clone(),
            topic: request.topic.clone(),
            grade: request.grade.clone(),
            curriculum: request.curriculum.clone(),
            started_at: chrono::Utc::now().to_rfc3339(),
            outline: None,
            scenes: None,
            completed_at: None,
            error: None,
            progress: Progress::default(),
        }
    }
}

/// Condensed listing entry for GET /stories
#[derive(Debug, Clone, serde::Serialize)]
pub struct StorySummary {
    pub story_id: uuid::Uuid,
    pub status: StoryStatus,
    pub subject: String,
    pub topic: String,
    pub grade: String,
    pub started_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl From<&StoryRecord> for StorySummary {
    fn from(record: &StoryRecord) -> Self {
        Self {
            story_id: record.story_id,
            status: record.status,
            subject: record.subject.clone(),
            topic: record.topic.clone(),
            grade: record.grade.clone(),
            started_at: record.started_at.clone(),
            completed_at: record.completed_at.clone(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub stories_tracked: usize,
}
