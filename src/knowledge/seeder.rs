//! Knowledge base seeder
//!
//! Asks the LLM for curriculum-appropriate facts about a topic, embeds them,
//! and upserts them into the Qdrant collection. Retrieval embeds the query
//! and returns the nearest fact texts for prompt context.

use crate::embeddings::EmbeddingClient;
use crate::knowledge::vector_store::{KnowledgePoint, VectorStore};
use crate::llm::LLM;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest};
use crate::utils::with_retry;
use std::sync::Arc;
use tracing::{info, warn};

const MAX_RETRIES: u32 = 3;

pub struct KnowledgeBaseSeeder {
    llm: Arc<LLM>,
    embeddings: EmbeddingClient,
    store: VectorStore,
    facts_per_seed: usize,
    context_limit: usize,
}

impl KnowledgeBaseSeeder {
    pub fn new(
        llm: Arc<LLM>,
        embeddings: EmbeddingClient,
        store: VectorStore,
        facts_per_seed: usize,
        context_limit: usize,
    ) -> Self {
        Self {
            llm,
            embeddings,
            store,
            facts_per_seed,
            context_limit,
        }
    }

    /// Seed the collection with facts for the topic. Returns how many facts
    /// were stored.
    pub async fn seed(
        &self,
        subject: &str,
        topic: &str,
        grade: &str,
        curriculum: &str,
    ) -> AppResult<usize> {
        info!(subject, topic, grade, curriculum, "Seeding knowledge base");

        let prompt = facts_prompt(subject, topic, grade, curriculum, self.facts_per_seed);
        let request = LLMRequest {
            model: self.llm.default_model().to_string(),
            messages: vec![
                LLMMessage::system(
                    "You are a curriculum expert. State facts plainly, one per line.",
                ),
                LLMMessage::user(prompt),
            ],
            max_tokens: Some(1024),
            temperature: Some(0.3),
        };

        let response = with_retry(|| self.llm.create_chat_completion(&request), MAX_RETRIES).await?;

        let facts = parse_facts(&response.content);
        if facts.is_empty() {
            return Err(AppError::LLMApi(
                "Fact generation returned no usable lines".to_string(),
            ));
        }

        let vectors = with_retry(|| self.embeddings.embed(&facts), MAX_RETRIES).await?;
        let dimension = vectors
            .first()
            .map(|v| v.len())
            .ok_or_else(|| AppError::Embedding("No vectors returned for facts".to_string()))?;

        self.store.ensure_collection(dimension).await?;

        let points: Vec<KnowledgePoint> = facts
            .iter()
            .zip(vectors)
            .map(|(text, vector)| KnowledgePoint {
                id: uuid::Uuid::new_v4(),
                vector,
                payload: serde_json::json!({
                    "text": text,
                    "subject": subject,
                    "topic": topic,
                    "grade": grade,
                    "curriculum": curriculum,
                }),
            })
            .collect();

        self.store.upsert(&points).await?;

        info!(count = points.len(), collection = %self.store.collection(), "Knowledge base seeded");
        Ok(points.len())
    }

    /// Retrieve the nearest fact texts for a query. An empty result is not
    /// an error; generation degrades to an uncontextualized prompt.
    pub async fn retrieve_context(&self, query: &str) -> AppResult<Vec<String>> {
        let vector = with_retry(|| self.embeddings.embed_one(query), MAX_RETRIES).await?;

        let hits = self.store.search(&vector, self.context_limit).await?;
        if hits.is_empty() {
            warn!(query, "No knowledge base hits for query");
        }

        Ok(hits.into_iter().map(|h| h.text).collect())
    }
}

fn facts_prompt(
    subject: &str,
    topic: &str,
    grade: &str,
    curriculum: &str,
    count: usize,
) -> String {
    format!(
        r#"List {count} key facts a {grade} student following the {curriculum} curriculum should learn about "{topic}" in {subject}.

GUIDELINES:
- One fact per line, no numbering or bullets
- Each fact must be a complete, standalone sentence
- Keep the language appropriate for {grade}
- Cover definitions, properties, and one or two real-world connections"#,
        count = count,
        grade = grade,
        curriculum = curriculum,
        topic = topic,
        subject = subject,
    )
}

/// Split an LLM fact listing into clean fact strings. Tolerates numbering,
/// bullets, and stray headers even though the prompt asks for bare lines.
pub fn parse_facts(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| strip_list_marker(line.trim()).to_string())
        .filter(|line| line.len() >= 15 && !line.ends_with(':'))
        .collect()
}

/// Remove a leading bullet or "1." / "1)" marker, but leave sentences that
/// merely start with a number ("12 months make a year") intact.
fn strip_list_marker(line: &str) -> &str {
    let line = line.trim_start_matches(['-', '*', '•']).trim_start();
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim_start();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_facts_plain_lines() {
        let text = "A fraction names part of a whole.\nThe top number is the numerator.\n";
        let facts = parse_facts(text);
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0], "A fraction names part of a whole.");
    }

    #[test]
    fn test_parse_facts_strips_numbering_and_bullets() {
        let text = r#"Key facts:
1. A fraction names part of a whole.
2) The denominator counts equal parts.
- Fractions can be shown on a number line.
* Equivalent fractions have the same value."#;
        let facts = parse_facts(text);
        assert_eq!(facts.len(), 4);
        assert!(facts.iter().all(|f| !f.starts_with(['1', '2', '-', '*'])));
    }

    #[test]
    fn test_parse_facts_keeps_leading_numbers_in_sentences() {
        let facts = parse_facts("12 months make up one year.");
        assert_eq!(facts, vec!["12 months make up one year.".to_string()]);
    }

    #[test]
    fn test_parse_facts_drops_short_fragments() {
        let text = "Fractions\n\nA fraction names part of a whole.\nOk.";
        let facts = parse_facts(text);
        assert_eq!(facts, vec!["A fraction names part of a whole.".to_string()]);
    }

    #[test]
    fn test_facts_prompt_mentions_inputs() {
        let prompt = facts_prompt("Mathematics", "fractions", "grade_6", "CBSE", 10);
        assert!(prompt.contains("Mathematics"));
        assert!(prompt.contains("fractions"));
        assert!(prompt.contains("grade_6"));
        assert!(prompt.contains("CBSE"));
        assert!(prompt.contains("10"));
    }
}
