//! CLI client for the Storyweaver API
//!
//! Submits a story request, polls until the job reaches a terminal status,
//! and saves the finished story as JSON.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "storyweaver-client",
    about = "Client for the Storyweaver educational story API"
)]
struct Args {
    /// Subject for the story (e.g. Mathematics)
    #[arg(short, long)]
    subject: String,

    /// Topic for the story (e.g. Fractions)
    #[arg(short, long)]
    topic: String,

    /// Grade level (e.g. grade_6)
    #[arg(short, long, default_value = "grade_6")]
    grade: String,

    /// Curriculum to follow (e.g. CBSE)
    #[arg(short, long, default_value = "General")]
    curriculum: String,

    /// Specific area within the topic
    #[arg(short = 'a', long)]
    specific_area: Option<String>,

    /// Output file name (derived from the request if omitted)
    #[arg(short, long)]
    output: Option<String>,

    /// Polling interval in seconds
    #[arg(short = 'i', long, default_value_t = 10)]
    poll_interval: u64,

    /// Give up after this many polls
    #[arg(long, default_value_t = 30)]
    max_attempts: u32,

    /// Base URL of the API server
    #[arg(long, default_value = "http://localhost:8000")]
    base_url: String,
}

async fn generate_story(client: &reqwest::Client, args: &Args) -> Result<Value> {
    let mut payload = serde_json::json!({
        "subject": args.subject,
        "topic": args.topic,
        "grade": args.grade,
        "curriculum": args.curriculum,
    });
    if let Some(area) = &args.specific_area {
        payload["specific_area"] = Value::String(area.clone());
    }

    let response = client
        .post(format!("{}/generate-story", args.base_url))
        .json(&payload)
        .send()
        .await
        .context("failed to reach the API server")?
        .error_for_status()
        .context("story request rejected")?;

    response.json().await.context("invalid response body")
}

async fn check_story_status(
    client: &reqwest::Client,
    base_url: &str,
    story_id: &str,
) -> Result<Value> {
    let response = client
        .get(format!("{}/story/{}", base_url, story_id))
        .send()
        .await
        .context("status request failed")?
        .error_for_status()
        .context("status request rejected")?;

    response.json().await.context("invalid status body")
}

async fn wait_for_completion(
    client: &reqwest::Client,
    args: &Args,
    story_id: &str,
) -> Result<Value> {
    for attempt in 1..=args.max_attempts {
        let story = check_story_status(client, &args.base_url, story_id).await?;
        let status = story.get("status").and_then(|s| s.as_str()).unwrap_or("");

        match status {
            "completed" => {
                println!("Story generation completed.");
                return Ok(story);
            }
            "failed" => {
                let error = story
                    .get("error")
                    .and_then(|e| e.as_str())
                    .unwrap_or("unknown error");
                bail!("story generation failed: {}", error);
            }
            stage => {
                let progress = story
                    .get("progress")
                    .and_then(|p| p.get("current_scene"))
                    .and_then(|s| s.as_u64())
                    .unwrap_or(0);
                let total = story
                    .get("progress")
                    .and_then(|p| p.get("total_scenes"))
                    .and_then(|s| s.as_u64())
                    .unwrap_or(0);
                if total > 0 {
                    println!(
                        "Status: {} (scene {}/{}, attempt {}/{})",
                        stage, progress, total, attempt, args.max_attempts
                    );
                } else {
                    println!("Status: {} (attempt {}/{})", stage, attempt, args.max_attempts);
                }
            }
        }

        tokio::time::sleep(Duration::from_secs(args.poll_interval)).await;
    }

    bail!("timed out waiting for story completion")
}

/// Derive an output filename: subject_topic_grade_firstidchars.json
fn default_output_name(story: &Value) -> String {
    let field = |key: &str, fallback: &str| -> String {
        story
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or(fallback)
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    };

    let id_prefix: String = story
        .get("story_id")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .chars()
        .take(8)
        .collect();

    format!(
        "{}_{}_{}_{}.json",
        field("subject", "subject"),
        field("topic", "topic"),
        field("grade", "grade"),
        id_prefix
    )
}

fn save_story_to_file(story: &Value, output: Option<&str>) -> Result<String> {
    let filename = output
        .map(String::from)
        .unwrap_or_else(|| default_output_name(story));

    let pretty = serde_json::to_string_pretty(story)?;
    std::fs::write(&filename, pretty).with_context(|| format!("could not write {}", filename))?;
    Ok(filename)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = reqwest::Client::new();

    println!(
        "Requesting story for {} - {} (grade: {})",
        args.subject, args.topic, args.grade
    );

    let initial = generate_story(&client, &args).await?;
    let story_id = initial
        .get("story_id")
        .and_then(|v| v.as_str())
        .context("response did not contain a story_id")?
        .to_string();
    println!("Story generation started with id {}", story_id);

    println!("Waiting for completion...");
    let story = wait_for_completion(&client, &args, &story_id).await?;

    let filename = save_story_to_file(&story, args.output.as_deref())?;
    println!("Story saved to {}", filename);

    println!("\nStory summary:");
    println!("  Title: {}: {}", args.subject, args.topic);
    if let Some(area) = &args.specific_area {
        println!("  Specific area: {}", area);
    }
    let scene_count = story
        .get("scenes")
        .and_then(|s| s.as_array())
        .map(|s| s.len())
        .unwrap_or(0);
    println!("  Scenes: {}", scene_count);

    Ok(())
}
