//! In-memory vector store using cosine distance.
//!
//! This module provides [`InMemoryVectorStore`], a zero-dependency vector
//! store backed by a `HashMap` protected by a `tokio::sync::RwLock`. It is
//! suitable for development, testing, and small-scale use cases.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Result, RetrievalError};
use crate::result::{Metadata, QueryResult, StoredDocuments};
use crate::vectorstore::VectorStore;

/// One embedded document held by the in-memory store.
#[derive(Debug, Clone)]
struct StoredChunk {
    document: String,
    metadata: Metadata,
    embedding: Vec<f32>,
}

/// An in-memory vector store using cosine distance for search.
///
/// Collections are stored as `HashMap`s keyed by collection name. Search
/// reports `1.0 - cosine_similarity` as the distance, so results are
/// ordered ascending (closest first) like any distance-metric store.
///
/// # Example
///
/// ```rust,ignore
/// use ragfuse::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.add("docs", "hello world", metadata, embedding).await;
/// let results = store.search("docs", &query_embedding, 5).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Vec<StoredChunk>>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one embedded document to a collection, creating the collection
    /// if it does not exist.
    pub async fn add(
        &self,
        collection: &str,
        document: impl Into<String>,
        metadata: Metadata,
        embedding: Vec<f32>,
    ) {
        let mut collections = self.collections.write().await;
        collections.entry(collection.to_string()).or_default().push(StoredChunk {
            document: document.into(),
            metadata,
            embedding,
        });
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<QueryResult> {
        let collections = self.collections.read().await;
        let chunks =
            collections.get(collection).ok_or_else(|| RetrievalError::VectorStoreError {
                backend: "InMemory".to_string(),
                message: format!("collection '{collection}' does not exist"),
            })?;

        let mut scored: Vec<(f32, &StoredChunk)> = chunks
            .iter()
            .map(|chunk| (1.0 - cosine_similarity(&chunk.embedding, embedding), chunk))
            .collect();

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(limit);

        let mut result = QueryResult::with_capacity(scored.len());
        for (distance, chunk) in scored {
            result.push(distance, chunk.document.clone(), chunk.metadata.clone());
        }
        Ok(result)
    }

    async fn get(&self, collection: &str) -> Result<StoredDocuments> {
        let collections = self.collections.read().await;
        let chunks =
            collections.get(collection).ok_or_else(|| RetrievalError::VectorStoreError {
                backend: "InMemory".to_string(),
                message: format!("collection '{collection}' does not exist"),
            })?;

        Ok(StoredDocuments {
            documents: chunks.iter().map(|c| c.document.clone()).collect(),
            metadatas: chunks.iter().map(|c| c.metadata.clone()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![0.6, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn search_orders_by_ascending_distance() {
        let store = InMemoryVectorStore::new();
        store.add("docs", "far", Metadata::new(), vec![0.0, 1.0]).await;
        store.add("docs", "near", Metadata::new(), vec![1.0, 0.0]).await;

        let result = store.search("docs", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(result.documents, vec!["near", "far"]);
        assert!(result.distances[0] <= result.distances[1]);
    }

    #[tokio::test]
    async fn search_missing_collection_errors() {
        let store = InMemoryVectorStore::new();
        let result = store.search("nope", &[1.0], 5).await;
        assert!(matches!(result, Err(RetrievalError::VectorStoreError { .. })));
    }

    #[tokio::test]
    async fn get_returns_everything_in_storage_order() {
        let store = InMemoryVectorStore::new();
        store.add("docs", "a", Metadata::new(), vec![1.0]).await;
        store.add("docs", "b", Metadata::new(), vec![0.5]).await;

        let dump = store.get("docs").await.unwrap();
        assert_eq!(dump.documents, vec!["a", "b"]);
        assert_eq!(dump.metadatas.len(), 2);
    }
}
