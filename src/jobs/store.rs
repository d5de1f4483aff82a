//! In-memory job store
//!
//! Story records live in a map behind an async RwLock, keyed by story id.
//! Status moves forward only: updates against a terminal record, or to a
//! lower-ranked status, are ignored rather than applied.

use crate::models::{Scene, StoryRecord, StoryStatus, StorySummary};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct JobStore {
    inner: Arc<RwLock<HashMap<Uuid, StoryRecord>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: StoryRecord) {
        self.inner.write().await.insert(record.story_id, record);
    }

    pub async fn get(&self, story_id: Uuid) -> Option<StoryRecord> {
        self.inner.read().await.get(&story_id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Summaries of all known jobs, newest first
    pub async fn list(&self) -> Vec<StorySummary> {
        let map = self.inner.read().await;
        let mut summaries: Vec<StorySummary> = map.values().map(StorySummary::from).collect();
        summaries.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        summaries
    }

    /// Advance the status. Returns false when the record is unknown, already
    /// terminal, or the new status would move backwards.
    pub async fn transition(&self, story_id: Uuid, status: StoryStatus) -> bool {
        let mut map = self.inner.write().await;
        let Some(record) = map.get_mut(&story_id) else {
            return false;
        };
        if record.status.is_terminal() || status.rank() <= record.status.rank() {
            return false;
        }
        record.status = status;
        record.progress.current_stage = status.stage().to_string();
        true
    }

    pub async fn set_total_scenes(&self, story_id: Uuid, total: usize) {
        let mut map = self.inner.write().await;
        if let Some(record) = map.get_mut(&story_id) {
            if !record.status.is_terminal() {
                record.progress.total_scenes = total;
            }
        }
    }

    pub async fn set_current_scene(&self, story_id: Uuid, current: usize) {
        let mut map = self.inner.write().await;
        if let Some(record) = map.get_mut(&story_id) {
            if !record.status.is_terminal() {
                record.progress.current_scene = current;
            }
        }
    }

    /// Finish the job with its outline and scenes
    pub async fn complete(&self, story_id: Uuid, outline: String, scenes: Vec<Scene>) {
        let mut map = self.inner.write().await;
        let Some(record) = map.get_mut(&story_id) else {
            return;
        };
        if record.status.is_terminal() {
            return;
        }
        record.status = StoryStatus::Completed;
        record.outline = Some(outline);
        record.progress.current_scene = scenes.len();
        record.progress.total_scenes = scenes.len();
        record.progress.current_stage = StoryStatus::Completed.stage().to_string();
        record.scenes = Some(scenes);
        record.completed_at = Some(chrono::Utc::now().to_rfc3339());
    }

    /// Mark the job failed with an error message
    pub async fn fail(&self, story_id: Uuid, error: String) {
        let mut map = self.inner.write().await;
        let Some(record) = map.get_mut(&story_id) else {
            return;
        };
        if record.status.is_terminal() {
            return;
        }
        record.status = StoryStatus::Failed;
        record.error = Some(error);
        record.progress.current_stage = StoryStatus::Failed.stage().to_string();
        record.completed_at = Some(chrono::Utc::now().to_rfc3339());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StoryRequest;

    fn sample_record() -> StoryRecord {
        let request = StoryRequest {
            subject: "Mathematics".to_string(),
            topic: "fractions".to_string(),
            grade: "grade_6".to_string(),
            curriculum: "CBSE".to_string(),
            specific_area: None,
        };
        StoryRecord::new(Uuid::new_v4(), &request)
    }

    fn sample_scene(n: usize) -> Scene {
        Scene {
            scene_number: n,
            title: format!("Scene {}", n),
            narrative: "text".to_string(),
            explanation: "concept".to_string(),
            image_prompt: "illustration".to_string(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = JobStore::new();
        let record = sample_record();
        let id = record.story_id;

        store.insert(record).await;
        let fetched = store.get(id).await.expect("record should exist");
        assert_eq!(fetched.status, StoryStatus::Processing);
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_transitions_are_forward_only() {
        let store = JobStore::new();
        let record = sample_record();
        let id = record.story_id;
        store.insert(record).await;

        assert!(store.transition(id, StoryStatus::SeedingKnowledgeBase).await);
        assert!(store.transition(id, StoryStatus::GeneratingOutline).await);

        // Backwards and same-rank transitions are rejected
        assert!(!store.transition(id, StoryStatus::SeedingKnowledgeBase).await);
        assert!(!store.transition(id, StoryStatus::GeneratingOutline).await);

        let record = store.get(id).await.unwrap();
        assert_eq!(record.status, StoryStatus::GeneratingOutline);
        assert_eq!(record.progress.current_stage, "generating_outline");
    }

    #[tokio::test]
    async fn test_terminal_status_is_never_overwritten() {
        let store = JobStore::new();
        let record = sample_record();
        let id = record.story_id;
        store.insert(record).await;

        store.complete(id, "outline".to_string(), vec![sample_scene(1)]).await;

        // Neither fail nor further transitions may touch a completed record
        store.fail(id, "late error".to_string()).await;
        assert!(!store.transition(id, StoryStatus::GeneratingScenes).await);

        let record = store.get(id).await.unwrap();
        assert_eq!(record.status, StoryStatus::Completed);
        assert!(record.error.is_none());
        assert!(record.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_complete_fills_scenes_and_progress() {
        let store = JobStore::new();
        let record = sample_record();
        let id = record.story_id;
        store.insert(record).await;

        store
            .complete(id, "raw outline".to_string(), vec![sample_scene(1), sample_scene(2)])
            .await;

        let record = store.get(id).await.unwrap();
        assert_eq!(record.outline.as_deref(), Some("raw outline"));
        assert_eq!(record.scenes.as_ref().unwrap().len(), 2);
        assert_eq!(record.progress.current_scene, 2);
        assert_eq!(record.progress.total_scenes, 2);
    }

    #[tokio::test]
    async fn test_fail_records_error() {
        let store = JobStore::new();
        let record = sample_record();
        let id = record.story_id;
        store.insert(record).await;

        store.fail(id, "Qdrant unreachable".to_string()).await;

        let record = store.get(id).await.unwrap();
        assert_eq!(record.status, StoryStatus::Failed);
        assert_eq!(record.error.as_deref(), Some("Qdrant unreachable"));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = JobStore::new();
        let mut first = sample_record();
        first.started_at = "2026-01-01T00:00:00+00:00".to_string();
        let mut second = sample_record();
        second.started_at = "2026-02-01T00:00:00+00:00".to_string();
        let second_id = second.story_id;

        store.insert(first).await;
        store.insert(second).await;

        let listed = store.list().await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].story_id, second_id);
    }
}
