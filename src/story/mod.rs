// Story generation: prompts, LLM-output parsing, and orchestration

pub mod generator;
pub mod parser;
pub mod prompts;

pub use generator::StoryGenerator;

/// Parsed story outline: a title plus one summary per planned scene
#[derive(Debug, Clone)]
pub struct StoryOutline {
    pub title: String,
    pub scene_summaries: Vec<String>,
    /// Original model output, kept verbatim on the job record
    pub raw: String,
}
