//! Reranker trait for cross-encoder style scoring.

use async_trait::async_trait;

use crate::error::Result;

/// A scorer for (query, document) pairs.
///
/// Implementations can wrap cross-encoder models, hosted rerank APIs, or
/// other strategies to improve precision beyond initial retrieval scores.
/// When no reranker is configured, the
/// [`RerankCompressor`](crate::compressor::RerankCompressor) falls back to
/// cosine similarity between query and document embeddings.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Score every `(query, text)` pair, returning one score per text in
    /// input order. Higher means more relevant.
    async fn predict(&self, query: &str, texts: &[&str]) -> Result<Vec<f32>>;
}
