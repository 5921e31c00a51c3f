//! Rerank-and-compress stage for hybrid candidate pools.

use tracing::debug;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::inmemory::cosine_similarity;
use crate::reranker::Reranker;
use crate::result::Candidate;

/// Scores, filters, sorts, and truncates a candidate pool against a query.
///
/// Scoring uses the supplied [`Reranker`] when present, otherwise cosine
/// similarity between the query embedding and each candidate's embedding.
/// Candidates below `min_score` are dropped, but only when `min_score` is
/// non-zero — a zero threshold disables filtering entirely. Surviving
/// candidates are sorted by descending score (ties keep their input
/// order), truncated to `top_n`, and their metadata gains a `"score"` key.
#[derive(Debug, Clone)]
pub struct RerankCompressor {
    top_n: usize,
    min_score: f32,
}

impl RerankCompressor {
    /// Create a compressor keeping at most `top_n` candidates at or above
    /// `min_score` (`0.0` disables the threshold).
    pub fn new(top_n: usize, min_score: f32) -> Self {
        Self { top_n, min_score }
    }

    /// Score `candidates` against `query` and return the compressed pool,
    /// descending by score.
    pub async fn compress(
        &self,
        mut candidates: Vec<Candidate>,
        query: &str,
        reranker: Option<&dyn Reranker>,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Vec<Candidate>> {
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();

        let scores = match reranker {
            Some(reranker) => reranker.predict(query, &texts).await?,
            None => {
                let query_embedding = embedder.embed(query).await?;
                let document_embeddings = embedder.embed_batch(&texts).await?;
                document_embeddings
                    .iter()
                    .map(|doc| cosine_similarity(&query_embedding, doc))
                    .collect()
            }
        };

        for (candidate, score) in candidates.iter_mut().zip(scores) {
            candidate.score = score;
        }

        if self.min_score != 0.0 {
            candidates.retain(|c| c.score >= self.min_score);
        }

        // Stable sort keeps input order for equal scores.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(self.top_n);

        for candidate in &mut candidates {
            candidate.metadata.insert(
                "score".to_string(),
                serde_json::Number::from_f64(f64::from(candidate.score))
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
            );
        }

        debug!(survivors = candidates.len(), "compressed candidate pool");
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::result::Metadata;

    struct FixedScores(Vec<f32>);

    #[async_trait]
    impl Reranker for FixedScores {
        async fn predict(&self, _query: &str, _texts: &[&str]) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    struct UnitEmbedder;

    #[async_trait]
    impl EmbeddingProvider for UnitEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }
    }

    fn candidates(n: usize) -> Vec<Candidate> {
        (0..n).map(|i| Candidate::new(format!("doc {i}"), Metadata::new())).collect()
    }

    #[tokio::test]
    async fn threshold_drops_low_scores() {
        let compressor = RerankCompressor::new(10, 0.5);
        let reranker = FixedScores(vec![0.9, 0.4, 0.1]);

        let result = compressor
            .compress(candidates(3), "q", Some(&reranker), &UnitEmbedder)
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "doc 0");
    }

    #[tokio::test]
    async fn zero_threshold_disables_filtering() {
        let compressor = RerankCompressor::new(10, 0.0);
        let reranker = FixedScores(vec![0.9, -0.4, 0.1]);

        let result = compressor
            .compress(candidates(3), "q", Some(&reranker), &UnitEmbedder)
            .await
            .unwrap();

        assert_eq!(result.len(), 3);
    }

    #[tokio::test]
    async fn truncates_to_top_n_descending() {
        let compressor = RerankCompressor::new(2, 0.0);
        let reranker = FixedScores(vec![0.2, 0.9, 0.5, 0.7, 0.1]);

        let result = compressor
            .compress(candidates(5), "q", Some(&reranker), &UnitEmbedder)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].text, "doc 1");
        assert_eq!(result[1].text, "doc 3");
    }

    #[tokio::test]
    async fn equal_scores_keep_input_order() {
        let compressor = RerankCompressor::new(10, 0.0);
        let reranker = FixedScores(vec![0.5, 0.5, 0.5]);

        let result = compressor
            .compress(candidates(3), "q", Some(&reranker), &UnitEmbedder)
            .await
            .unwrap();

        let texts: Vec<&str> = result.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["doc 0", "doc 1", "doc 2"]);
    }

    #[tokio::test]
    async fn survivors_gain_score_metadata() {
        let compressor = RerankCompressor::new(10, 0.0);
        let reranker = FixedScores(vec![0.25]);

        let result = compressor
            .compress(candidates(1), "q", Some(&reranker), &UnitEmbedder)
            .await
            .unwrap();

        let score = result[0].metadata["score"].as_f64().unwrap();
        assert!((score - 0.25).abs() < 1e-6);
    }

    #[tokio::test]
    async fn cosine_fallback_scores_without_reranker() {
        let compressor = RerankCompressor::new(10, 0.0);

        let result =
            compressor.compress(candidates(2), "q", None, &UnitEmbedder).await.unwrap();

        // Identical unit embeddings: every candidate scores 1.0.
        assert_eq!(result.len(), 2);
        assert!((result[0].score - 1.0).abs() < 1e-6);
    }
}
