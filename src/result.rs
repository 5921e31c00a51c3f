//! Data types for retrieval results and rerank candidates.

use serde::{Deserialize, Serialize};

/// Key-value metadata attached to a retrieved chunk.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// One logical retrieval result set: three parallel, same-length,
/// ordered sequences.
///
/// Invariant: for any index `i`, `distances[i]`, `documents[i]`, and
/// `metadatas[i]` describe the same retrieved item. The arrays are never
/// re-ordered independently; use [`push`](QueryResult::push) to append.
///
/// Plain vector search populates `distances` with distances (lower is
/// closer); hybrid search populates it with relevance scores (higher is
/// better). Fusion must be told which metric it is sorting — see
/// [`SortOrder`](crate::fusion::SortOrder).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    /// Distance or relevance score per retrieved item.
    pub distances: Vec<f32>,
    /// Document text per retrieved item.
    pub documents: Vec<String>,
    /// Metadata per retrieved item.
    pub metadatas: Vec<Metadata>,
}

impl QueryResult {
    /// Create an empty result set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty result set with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            distances: Vec::with_capacity(capacity),
            documents: Vec::with_capacity(capacity),
            metadatas: Vec::with_capacity(capacity),
        }
    }

    /// Append one retrieved item, keeping the three arrays parallel.
    pub fn push(&mut self, distance: f32, document: String, metadata: Metadata) {
        self.distances.push(distance);
        self.documents.push(document);
        self.metadatas.push(metadata);
    }

    /// Number of retrieved items.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the result set contains no items.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// The full stored contents of a collection, as returned by
/// [`VectorStore::get`](crate::vectorstore::VectorStore::get).
///
/// A bulk dump carries no distances; `documents` and `metadatas` are
/// parallel arrays.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoredDocuments {
    /// All document texts in the collection, in storage order.
    pub documents: Vec<String>,
    /// Metadata parallel to `documents`.
    pub metadatas: Vec<Metadata>,
}

/// An ephemeral (text, metadata, score) triple used during reranking.
///
/// Candidates are created per query invocation and never persisted. Once
/// reranked, the winning score is also written into `metadata` under the
/// `"score"` key so it survives the repack into [`QueryResult`].
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The candidate document text.
    pub text: String,
    /// Metadata carried from the store; gains a `"score"` key on rerank.
    pub metadata: Metadata,
    /// The relevance score assigned by the compressor.
    pub score: f32,
}

impl Candidate {
    /// Create an unscored candidate.
    pub fn new(text: impl Into<String>, metadata: Metadata) -> Self {
        Self { text: text.into(), metadata, score: 0.0 }
    }
}
