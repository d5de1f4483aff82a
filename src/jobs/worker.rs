//! Story pipeline worker
//!
//! One fire-and-forget task per accepted request: seed the knowledge base,
//! retrieve context, generate the outline, expand scenes, finish the record.
//! Any stage error marks the job failed; the HTTP layer never sees it.

use crate::models::{AppState, StoryRequest, StoryStatus};
use crate::types::AppResult;
use tracing::{error, info};
use uuid::Uuid;

pub async fn run_story_job(state: AppState, story_id: Uuid, request: StoryRequest) {
    info!(
        %story_id,
        subject = %request.subject,
        topic = %request.topic,
        grade = %request.grade,
        "Story job started"
    );

    if let Err(e) = execute(&state, story_id, &request).await {
        error!(%story_id, error = %e, "Story job failed");
        state.jobs.fail(story_id, e.to_string()).await;
    }
}

async fn execute(state: &AppState, story_id: Uuid, request: &StoryRequest) -> AppResult<()> {
    let jobs = &state.jobs;
    let full_topic = request.full_topic();

    jobs.transition(story_id, StoryStatus::SeedingKnowledgeBase).await;
    state
        .seeder
        .seed(&request.subject, &full_topic, &request.grade, &request.curriculum)
        .await?;

    jobs.transition(story_id, StoryStatus::GeneratingOutline).await;
    let query = format!("{} {} {}", request.subject, full_topic, request.grade);
    let context = state.seeder.retrieve_context(&query).await?;
    let outline = state.generator.generate_outline(request, &context).await?;

    jobs.transition(story_id, StoryStatus::GeneratingScenes).await;
    jobs.set_total_scenes(story_id, outline.scene_summaries.len()).await;

    let mut scenes = Vec::with_capacity(outline.scene_summaries.len());
    for (idx, summary) in outline.scene_summaries.iter().enumerate() {
        let scene_number = idx + 1;
        jobs.set_current_scene(story_id, scene_number).await;

        let scene = state
            .generator
            .generate_scene(&outline, scene_number, summary, request, &context)
            .await?;
        scenes.push(scene);
    }

    jobs.complete(story_id, outline.raw.clone(), scenes).await;
    info!(%story_id, "Story job completed");
    Ok(())
}
