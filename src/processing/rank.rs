//! Relevance ranking of pooled sections against a persona/task query.

use super::types::{RankedSection, RankingError, Section};
use crate::embedding::EmbeddingClient;
use std::cmp::Ordering;

/// Build the query text embedded for a persona and task.
pub fn build_query(persona: &str, task: &str) -> String {
    format!("{persona} needs to {task}")
}

/// Cosine similarity of two vectors; `0.0` when either is all zeros or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Order indices by descending score; equal scores keep their input order.
///
/// NaN scores sort last.
pub fn rank_order(scores: &[f32]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&left, &right| descending(scores[left], scores[right]));
    order
}

fn descending(left: f32, right: f32) -> Ordering {
    match (left.is_nan(), right.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => right.partial_cmp(&left).unwrap_or(Ordering::Equal),
    }
}

/// Scores sections by semantic similarity to the query built from a persona and task.
///
/// The embedding client is borrowed for the ranker's lifetime so one client serves the whole run.
pub struct RelevanceRanker<'a> {
    client: &'a dyn EmbeddingClient,
}

impl<'a> RelevanceRanker<'a> {
    /// Create a ranker using `client` for all embedding calls.
    pub fn new(client: &'a dyn EmbeddingClient) -> Self {
        Self { client }
    }

    /// Rank `sections` and return the `top_k` most relevant, with ranks `1..=top_k`.
    ///
    /// Makes exactly two embedding calls: one for the query and one batch for every section.
    /// Ranks cover the whole pool before truncation, so the returned ranks are `1..=min(top_k, n)`.
    pub async fn rank(
        &self,
        sections: Vec<Section>,
        persona: &str,
        task: &str,
        top_k: usize,
    ) -> Result<Vec<RankedSection>, RankingError> {
        if sections.is_empty() {
            return Err(RankingError::EmptyPool);
        }

        let query = build_query(persona, task);
        tracing::debug!(query = %query, sections = sections.len(), "Ranking sections");

        let mut query_vectors = self.client.generate_embeddings(vec![query]).await?;
        if query_vectors.len() != 1 {
            return Err(RankingError::CountMismatch {
                expected: 1,
                actual: query_vectors.len(),
            });
        }
        let query_vector = query_vectors.swap_remove(0);

        let texts: Vec<String> = sections.iter().map(|section| section.text.clone()).collect();
        let section_vectors = self.client.generate_embeddings(texts).await?;
        if section_vectors.len() != sections.len() {
            return Err(RankingError::CountMismatch {
                expected: sections.len(),
                actual: section_vectors.len(),
            });
        }

        let expected = query_vector.len();
        if let Some(vector) = section_vectors.iter().find(|vector| vector.len() != expected) {
            return Err(RankingError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }

        let scores: Vec<f32> = section_vectors
            .iter()
            .map(|vector| cosine_similarity(&query_vector, vector))
            .collect();

        let mut slots: Vec<Option<Section>> = sections.into_iter().map(Some).collect();
        let ranked: Vec<RankedSection> = rank_order(&scores)
            .into_iter()
            .take(top_k)
            .enumerate()
            .filter_map(|(position, index)| {
                let section = slots[index].take()?;
                tracing::debug!(
                    rank = position + 1,
                    score = scores[index],
                    document = %section.document,
                    title = %section.title,
                    "Ranked section"
                );
                Some(RankedSection {
                    section,
                    rank: position + 1,
                })
            })
            .collect();

        Ok(ranked)
    }
}
