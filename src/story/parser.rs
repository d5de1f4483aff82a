//! Parsing of LLM output into outlines and scenes
//!
//! Models are asked for bare JSON but routinely wrap it in code fences or
//! surround it with prose. Parsing is therefore layered: strip fences, pull
//! out the first balanced JSON object, and fall back to plain-text heuristics
//! so a malformed response degrades the story instead of failing the job.

use crate::models::Scene;
use crate::story::StoryOutline;
use serde::Deserialize;
use tracing::warn;

/// Remove a surrounding markdown code fence (``` or ```json), if present
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    match rest.rfind("```") {
        Some(idx) => rest[..idx].trim(),
        None => rest.trim(),
    }
}

/// Extract the first balanced JSON object from the text, respecting strings
/// and escapes
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Deserialize)]
struct OutlineJson {
    title: String,
    scenes: Vec<OutlineScene>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OutlineScene {
    Summary(String),
    Detailed { summary: String },
}

impl OutlineScene {
    fn into_summary(self) -> String {
        match self {
            OutlineScene::Summary(s) => s,
            OutlineScene::Detailed { summary } => summary,
        }
    }
}

/// Parse an outline response. JSON first; otherwise the first line becomes
/// the title and list-like lines become scene summaries.
pub fn parse_outline(text: &str, max_scenes: usize) -> StoryOutline {
    let cleaned = strip_code_fences(text);

    if let Some(json) = extract_json_object(cleaned) {
        if let Ok(outline) = serde_json::from_str::<OutlineJson>(json) {
            let scene_summaries: Vec<String> = outline
                .scenes
                .into_iter()
                .map(OutlineScene::into_summary)
                .filter(|s| !s.trim().is_empty())
                .take(max_scenes)
                .collect();
            if !scene_summaries.is_empty() {
                return StoryOutline {
                    title: outline.title.trim().to_string(),
                    scene_summaries,
                    raw: text.to_string(),
                };
            }
        }
    }

    warn!("Outline was not valid JSON, falling back to line heuristics");
    parse_outline_lines(cleaned, max_scenes, text)
}

fn parse_outline_lines(cleaned: &str, max_scenes: usize, raw: &str) -> StoryOutline {
    let mut lines = cleaned.lines().map(str::trim).filter(|l| !l.is_empty());

    let title = lines
        .next()
        .map(clean_title)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "Untitled Story".to_string());

    let body: Vec<&str> = lines.collect();

    let mut scene_summaries: Vec<String> = body
        .iter()
        .filter_map(|line| list_item_text(line))
        .take(max_scenes)
        .collect();

    if scene_summaries.is_empty() {
        // No recognizable list: the lines after the title become a single
        // scene. A title-only response falls back to the full text.
        let remainder = body.join(" ");
        scene_summaries = if remainder.is_empty() {
            vec![cleaned.to_string()]
        } else {
            vec![remainder]
        };
    }

    StoryOutline {
        title,
        scene_summaries,
        raw: raw.to_string(),
    }
}

fn clean_title(line: &str) -> String {
    line.trim_start_matches('#')
        .trim()
        .trim_start_matches("Title:")
        .trim()
        .trim_matches('"')
        .to_string()
}

/// Return the text of a list-like line ("1. ...", "- ...", "Scene 3: ...")
fn list_item_text(line: &str) -> Option<String> {
    let line = line.trim();

    if let Some(rest) = line.strip_prefix('-').or_else(|| line.strip_prefix('*')) {
        let rest = rest.trim();
        return (!rest.is_empty()).then(|| rest.to_string());
    }

    let lowered = line.to_lowercase();
    if lowered.starts_with("scene") {
        if let Some(idx) = line.find(':') {
            let rest = line[idx + 1..].trim();
            return (!rest.is_empty()).then(|| rest.to_string());
        }
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            let rest = rest.trim();
            return (!rest.is_empty()).then(|| rest.to_string());
        }
    }

    None
}

#[derive(Deserialize)]
struct SceneJson {
    #[serde(default)]
    title: Option<String>,
    narrative: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    image_prompt: Option<String>,
}

/// Parse a scene response. A response that is not valid scene JSON becomes a
/// narrative-only scene so one bad completion cannot fail the whole story.
pub fn parse_scene(text: &str, scene_number: usize, summary: &str) -> Scene {
    let cleaned = strip_code_fences(text);

    if let Some(json) = extract_json_object(cleaned) {
        if let Ok(scene) = serde_json::from_str::<SceneJson>(json) {
            return Scene {
                scene_number,
                title: scene
                    .title
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| format!("Scene {}", scene_number)),
                narrative: scene.narrative,
                explanation: scene.explanation,
                image_prompt: scene
                    .image_prompt
                    .filter(|p| !p.trim().is_empty())
                    .unwrap_or_else(|| default_image_prompt(summary)),
                image_url: None,
            };
        }
    }

    warn!(scene_number, "Scene was not valid JSON, using raw text as narrative");
    Scene {
        scene_number,
        title: format!("Scene {}", scene_number),
        narrative: cleaned.to_string(),
        explanation: String::new(),
        image_prompt: default_image_prompt(summary),
        image_url: None,
    }
}

fn default_image_prompt(summary: &str) -> String {
    format!(
        "A warm, colorful children's book illustration of: {}",
        summary
    )
}
