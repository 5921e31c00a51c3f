//! Retrieval orchestrator.
//!
//! The [`Retriever`] composes a [`VectorStore`], an [`EmbeddingProvider`],
//! a [`LexicalRetriever`], and an optional [`Reranker`] into the query-time
//! retrieval pipeline: single-collection nearest-neighbor queries, hybrid
//! ensemble queries, and multi-collection fan-out with rank fusion.
//!
//! # Example
//!
//! ```rust,ignore
//! use ragfuse::{Retriever, RetrievalConfig, InMemoryVectorStore};
//!
//! let retriever = Retriever::builder()
//!     .config(RetrievalConfig::default())
//!     .vector_store(Arc::new(store))
//!     .embedding_provider(Arc::new(embedder))
//!     .build()?;
//!
//! let fused = retriever.query_collection(&names, &query_embedding).await?;
//! ```

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::compressor::RerankCompressor;
use crate::config::RetrievalConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, RetrievalError};
use crate::fusion::{merge_and_sort, SortOrder};
use crate::lexical::{Bm25Retriever, LexicalRetriever};
use crate::reranker::Reranker;
use crate::result::{Candidate, QueryResult};
use crate::vectorstore::VectorStore;

/// The retrieval pipeline orchestrator.
///
/// Construct one via [`Retriever::builder()`]. All retrieval entry points
/// are request-scoped and side-effect free besides logging; per-collection
/// failures never abort a fan-out batch (see the individual methods for
/// the exact policy).
pub struct Retriever {
    config: RetrievalConfig,
    vector_store: Arc<dyn VectorStore>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    lexical_retriever: Arc<dyn LexicalRetriever>,
    reranker: Option<Arc<dyn Reranker>>,
}

/// The outcome of querying one collection during a fan-out.
type CollectionOutcome = (String, Result<QueryResult>);

impl Retriever {
    /// Create a new [`RetrieverBuilder`].
    pub fn builder() -> RetrieverBuilder {
        RetrieverBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedding_provider
    }

    /// Query one collection for the `top_k` nearest neighbors of a
    /// pre-computed query embedding.
    ///
    /// # Errors
    ///
    /// Store failures are logged and propagated. A failure here is fatal
    /// to this call only; the multi-collection fan-out catches it and
    /// continues with the remaining collections.
    pub async fn query_one(
        &self,
        collection: &str,
        query_embedding: &[f32],
    ) -> Result<QueryResult> {
        let result = self
            .vector_store
            .search(collection, query_embedding, self.config.top_k)
            .await
            .map_err(|e| {
                error!(collection, error = %e, "vector store search failed");
                e
            })?;

        debug!(collection, result_count = result.len(), "queried collection");
        Ok(result)
    }

    /// Query one collection with the hybrid lexical + vector ensemble.
    ///
    /// Fetches the collection's entire stored document set, pools the
    /// lexical top-k with the vector top-k (duplicates retrieved by both
    /// paths are kept), rerank-compresses the pool against the query, and
    /// repacks the survivors with their relevance score in `distances`.
    ///
    /// # Errors
    ///
    /// Any store, embedding, or reranker failure propagates unchanged;
    /// falling back to plain search is the caller's responsibility.
    pub async fn hybrid_query(&self, collection: &str, query: &str) -> Result<QueryResult> {
        let k = self.config.top_k;
        let stored = self.vector_store.get(collection).await?;

        let lexical = self.lexical_retriever.top_k(
            &stored.documents,
            &stored.metadatas,
            query,
            k,
        );

        let query_embedding = self.embedding_provider.embed(query).await?;
        let vector = self.vector_store.search(collection, &query_embedding, k).await?;

        let mut pool: Vec<Candidate> = Vec::with_capacity(lexical.len() + vector.len());
        for (text, metadata) in lexical {
            pool.push(Candidate { text, metadata, score: 0.0 });
        }
        for (document, metadata) in vector.documents.into_iter().zip(vector.metadatas) {
            pool.push(Candidate { text: document, metadata, score: 0.0 });
        }

        let compressor = RerankCompressor::new(k, self.config.min_score);
        let survivors = compressor
            .compress(
                pool,
                query,
                self.reranker.as_deref(),
                self.embedding_provider.as_ref(),
            )
            .await?;

        let mut result = QueryResult::with_capacity(survivors.len());
        for candidate in survivors {
            result.push(candidate.score, candidate.text, candidate.metadata);
        }

        debug!(collection, result_count = result.len(), "hybrid queried collection");
        Ok(result)
    }

    /// Fan a pre-computed query embedding out across collections and fuse
    /// the results ascending by distance.
    ///
    /// Empty collection names are skipped silently. Per-collection
    /// failures are logged and that collection's contribution is simply
    /// absent from the fused result; this method itself never fails.
    pub async fn query_collection(
        &self,
        collection_names: &[String],
        query_embedding: &[f32],
    ) -> Result<QueryResult> {
        let mut outcomes: Vec<CollectionOutcome> = Vec::with_capacity(collection_names.len());
        for name in collection_names {
            if name.is_empty() {
                continue;
            }
            let outcome = self.query_one(name, query_embedding).await;
            outcomes.push((name.clone(), outcome));
        }

        let mut results = Vec::with_capacity(outcomes.len());
        for (name, outcome) in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => warn!(collection = %name, error = %e, "skipping failed collection"),
            }
        }

        Ok(merge_and_sort(results, self.config.top_k, SortOrder::Ascending))
    }

    /// Fan a query out across collections in hybrid mode and fuse the
    /// results descending by relevance score.
    ///
    /// Per-collection failures are logged and the remaining collections
    /// are still attempted.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::HybridSearchFailed`] when every attempted
    /// collection failed, so the caller can fall back to plain search.
    pub async fn query_collection_hybrid(
        &self,
        collection_names: &[String],
        query: &str,
    ) -> Result<QueryResult> {
        let mut outcomes: Vec<CollectionOutcome> = Vec::with_capacity(collection_names.len());
        for name in collection_names {
            if name.is_empty() {
                continue;
            }
            let outcome = self.hybrid_query(name, query).await;
            outcomes.push((name.clone(), outcome));
        }

        let attempted = outcomes.len();
        let mut results = Vec::with_capacity(attempted);
        for (name, outcome) in outcomes {
            match outcome {
                Ok(result) => results.push(result),
                Err(e) => warn!(collection = %name, error = %e, "hybrid search failed"),
            }
        }

        if attempted > 0 && results.is_empty() {
            return Err(RetrievalError::HybridSearchFailed);
        }

        info!(attempted, succeeded = results.len(), "hybrid fan-out complete");
        Ok(merge_and_sort(results, self.config.top_k, SortOrder::Descending))
    }
}

/// Builder for constructing a [`Retriever`].
///
/// `vector_store` and `embedding_provider` are required; the lexical
/// retriever defaults to [`Bm25Retriever`] and the reranker is optional.
#[derive(Default)]
pub struct RetrieverBuilder {
    config: Option<RetrievalConfig>,
    vector_store: Option<Arc<dyn VectorStore>>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    lexical_retriever: Option<Arc<dyn LexicalRetriever>>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl RetrieverBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RetrievalConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the lexical retriever used by hybrid queries.
    pub fn lexical_retriever(mut self, retriever: Arc<dyn LexicalRetriever>) -> Self {
        self.lexical_retriever = Some(retriever);
        self
    }

    /// Set an optional reranker for hybrid result scoring.
    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Build the [`Retriever`], validating that all required fields are
    /// set.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::ConfigError`] if a required field is
    /// missing.
    pub fn build(self) -> Result<Retriever> {
        let vector_store = self
            .vector_store
            .ok_or_else(|| RetrievalError::ConfigError("vector_store is required".to_string()))?;
        let embedding_provider = self.embedding_provider.ok_or_else(|| {
            RetrievalError::ConfigError("embedding_provider is required".to_string())
        })?;

        Ok(Retriever {
            config: self.config.unwrap_or_default(),
            vector_store,
            embedding_provider,
            lexical_retriever: self
                .lexical_retriever
                .unwrap_or_else(|| Arc::new(Bm25Retriever::new())),
            reranker: self.reranker,
        })
    }
}
