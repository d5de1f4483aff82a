//! Prompt builders for outline and scene generation

pub const STORYTELLER_SYSTEM: &str = "You are an educational storyteller. You write engaging, \
age-appropriate stories that teach real curriculum concepts accurately. You always respond in \
the exact output format requested.";

fn format_context(context: &[String]) -> String {
    if context.is_empty() {
        "No reference facts available; rely on well-established curriculum knowledge.".to_string()
    } else {
        context
            .iter()
            .map(|fact| format!("- {}", fact))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Prompt for the story outline (title + scene summaries)
pub fn outline_prompt(
    subject: &str,
    topic: &str,
    grade: &str,
    curriculum: &str,
    context: &[String],
    scene_count: usize,
) -> String {
    let facts = format_context(context);

    format!(
        r#"Design an educational story for a {grade} student ({curriculum} curriculum) that teaches "{topic}" in {subject}.

REFERENCE FACTS:
{facts}

TASK:
Create a story outline with exactly {scene_count} scenes. Each scene should advance both the story and the student's understanding of the topic.

GUIDELINES:
- Use characters and settings a {grade} student relates to
- Each scene must teach one concrete aspect of "{topic}"
- Scenes build on each other; the final scene resolves the story and recaps the concept
- Ground the teaching in the reference facts above

OUTPUT FORMAT:
Respond with a single JSON object, no other text:
{{
  "title": "Story title",
  "scenes": ["One-sentence summary of scene 1", "One-sentence summary of scene 2", ...]
}}"#,
        grade = grade,
        curriculum = curriculum,
        topic = topic,
        subject = subject,
        facts = facts,
        scene_count = scene_count,
    )
}

/// Prompt for expanding one outline entry into a full scene
pub fn scene_prompt(
    story_title: &str,
    scene_summary: &str,
    scene_number: usize,
    total_scenes: usize,
    topic: &str,
    grade: &str,
    context: &[String],
) -> String {
    let facts = format_context(context);

    format!(
        r#"You are writing scene {scene_number} of {total_scenes} for the educational story "{story_title}" about "{topic}" (audience: {grade}).

SCENE SUMMARY: {scene_summary}

REFERENCE FACTS:
{facts}

TASK:
Write the full scene.

GUIDELINES:
- The narrative is 2-4 paragraphs of story text, in simple language for {grade}
- The explanation restates the concept this scene teaches, outside the story voice
- The image prompt describes one vivid illustration for the scene: setting, characters, style, no text in the image

OUTPUT FORMAT:
Respond with a single JSON object, no other text:
{{
  "title": "Scene title",
  "narrative": "...",
  "explanation": "...",
  "image_prompt": "..."
}}"#,
        scene_number = scene_number,
        total_scenes = total_scenes,
        story_title = story_title,
        topic = topic,
        grade = grade,
        scene_summary = scene_summary,
        facts = facts,
    )
}
