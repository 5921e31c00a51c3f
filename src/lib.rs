//! # ragfuse
//!
//! Query-time retrieval pipeline for retrieval-augmented generation:
//! given a conversational query and a set of referenced sources (full
//! files, text snippets, or indexed collections), produce a ranked,
//! size-bounded context for a generation prompt and a citation list
//! tracing every context chunk back to its source and score.
//!
//! ## Overview
//!
//! The pipeline is composed of small, independently testable stages:
//!
//! - [`Retriever::query_one`] — nearest-neighbor query against a single
//!   collection.
//! - [`Retriever::hybrid_query`] — BM25 + vector ensemble over one
//!   collection, rerank-compressed against the query.
//! - [`RerankCompressor`] — cross-encoder scoring (or cosine fallback),
//!   threshold filter, descending sort, top-n truncation.
//! - [`merge_and_sort`] — fuses per-collection result sets into one
//!   globally ranked, k-bounded [`QueryResult`].
//! - [`Retriever::query_collection`] / [`Retriever::query_collection_hybrid`]
//!   — sequential multi-collection fan-out with per-collection failure
//!   isolation and a hybrid-to-plain fallback seam.
//! - [`Retriever::get_context`] — turns sources plus a conversation into
//!   context strings and [`Citation`]s.
//! - [`rag_template`] — injection-safe substitution of context and query
//!   into a prompt template.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragfuse::{InMemoryVectorStore, RetrievalConfig, Retriever};
//!
//! let retriever = Retriever::builder()
//!     .config(RetrievalConfig::builder().top_k(5).hybrid_search(true).build()?)
//!     .vector_store(Arc::new(store))
//!     .embedding_provider(Arc::new(embedder))
//!     .build()?;
//!
//! let (contexts, citations) = retriever.get_context(&sources, &messages).await;
//! let prompt = ragfuse::rag_template("", &contexts.join("\n\n"), query);
//! ```
//!
//! ## Failure policy
//!
//! Retrieval degradation is invisible by design: a failed collection is
//! skipped (plain mode) or accumulated (hybrid mode, surfacing
//! [`RetrievalError::HybridSearchFailed`] only when every collection
//! failed), and the context assembler silently downgrades hybrid search
//! to plain vector search. Only configuration errors propagate eagerly.

pub mod compressor;
pub mod config;
pub mod context;
pub mod embedding;
pub mod error;
pub mod fusion;
pub mod inmemory;
pub mod lexical;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod reranker;
pub mod result;
pub mod template;
pub mod vectorstore;

pub use compressor::RerankCompressor;
pub use config::{RetrievalConfig, RetrievalConfigBuilder};
pub use context::{
    last_user_message, Citation, ContextMode, FileData, Message, Source, SourceKind,
};
pub use embedding::{EmbeddingEngine, EmbeddingProvider};
pub use error::{Result, RetrievalError};
pub use fusion::{merge_and_sort, SortOrder};
pub use inmemory::InMemoryVectorStore;
pub use lexical::{Bm25Retriever, LexicalRetriever};
#[cfg(feature = "openai")]
pub use openai::OpenAiEmbeddingProvider;
pub use pipeline::{Retriever, RetrieverBuilder};
pub use reranker::Reranker;
pub use result::{Candidate, Metadata, QueryResult, StoredDocuments};
pub use template::{rag_template, DEFAULT_RAG_TEMPLATE};
pub use vectorstore::VectorStore;
