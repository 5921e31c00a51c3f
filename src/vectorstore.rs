//! Vector store trait for nearest-neighbor search and bulk retrieval.

use async_trait::async_trait;

use crate::error::Result;
use crate::result::{QueryResult, StoredDocuments};

/// A storage backend holding named collections of embedded chunks.
///
/// The pipeline requires two capabilities from a store: nearest-neighbor
/// [`search`](VectorStore::search) for plain retrieval, and a bulk
/// [`get`](VectorStore::get) dump used to build the lexical side of a
/// hybrid query.
///
/// # Example
///
/// ```rust,ignore
/// use ragfuse::{VectorStore, InMemoryVectorStore};
///
/// let store = InMemoryVectorStore::new();
/// let results = store.search("docs", &query_embedding, 5).await?;
/// let everything = store.get("docs").await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Search for the `limit` nearest chunks to the given embedding.
    ///
    /// Returns results ordered by ascending distance (closest first); the
    /// `distances` field carries the store's distance metric, where lower
    /// means more similar.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        limit: usize,
    ) -> Result<QueryResult>;

    /// Return every document and metadata entry stored in a collection.
    async fn get(&self, collection: &str) -> Result<StoredDocuments>;
}
